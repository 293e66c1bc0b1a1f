use std::env;
use std::fs::File;
use std::process;

use axiscope::{Axis, AxiscopeError, AxisType, ColorTable, Dataset};
use log::{error, info};

const USE_MESSAGE : &str = "\x1b[31mUsage: reorder_axes <dims> <order> \
    [-l <lut_path>] [-v]\n  e.g. reorder_axes X=4,Y=3,C=2,Z=5,T=1 X,Y,T,C,Z\x1b[0m";

macro_rules! send_use_msg {
    () => {{
        eprintln!("{}", USE_MESSAGE);
        process::exit(2)
    }};
}

/// Parses `X=4,Y=3,C=2` into axes and dims
fn parse_dims(spec : &str) -> Option<(Vec<Axis>, Vec<usize>)> {
    spec.split(',')
        .map(|entry| {
            let (label, dim) = entry.split_once('=')?;
            Some((Axis::new(AxisType::from_label(label)), dim.trim().parse::<usize>().ok()?))
        })
        .collect::<Option<Vec<_>>>()
        .map(|pairs| pairs.into_iter().unzip())
}

/// Builds a dataset whose samples count up in storage order,
/// reorders it and reports where everything ended up.
fn run(dims_spec : &str, order_spec : &str, lut_path : Option<&str>) -> Result<(), AxiscopeError> {
    let (axes, dims) = parse_dims(dims_spec).unwrap_or_else(|| send_use_msg!());
    let n_samples : usize = dims.iter().product();
    let mut dataset = Dataset::from_shape_vec(
        "synthetic",
        axes,
        &dims,
        (0..n_samples).map(|i| i as f64).collect(),
    )?;

    if let Some(path) = lut_path {
        let table = ColorTable::read_raw(&mut File::open(path).map_err(binrw::Error::Io)?)?;
        info!("Attaching {} to plane 0", path);
        dataset.set_color_table(0, Some(table))?;
    }

    let labels : Vec<&str> = order_spec.split(',').map(str::trim).collect();
    let before = dataset.axis_types();
    dataset.reorder_by_labels(&labels)?;

    println!(
        "{:?} {:?} -> {:?} {:?}",
        before.iter().map(|a| a.label()).collect::<Vec<_>>(),
        dims,
        dataset.axis_types().iter().map(|a| a.label()).collect::<Vec<_>>(),
        dataset.dims(),
    );
    if let Some(plane) = (0..dataset.plane_count()).find(|&p| dataset.color_table(p).is_some()) {
        println!("Color table now on plane {} {:?}", plane, dataset.plane_position(plane));
    }
    Ok(())
}

/// Reorders the axes of a synthetic dataset
///
/// `-l` attaches a raw 768-byte LUT to the first plane
/// so its relocation can be followed. `-v` logs at debug
/// level.
///
/// # Example
///
/// ```
/// reorder_axes X=4,Y=3,C=2,Z=5,T=1 X,Y,T,C,Z -l fire.lut
/// ```
fn main() {
    let args : Vec<String> = env::args().collect();
    if args.len() < 3 { send_use_msg!(); }

    let mut lut_path = None;
    let mut level = log::LevelFilter::Info;
    let mut rest = args[3..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "-l" => {
                lut_path = Some(rest.next().unwrap_or_else(|| send_use_msg!()).as_str());
            },
            "-v" => level = log::LevelFilter::Debug,
            _ => send_use_msg!(),
        }
    }

    if let Err(err) = simple_logger::SimpleLogger::new().with_level(level).init() {
        eprintln!("Could not initialize logging: {}", err);
    }

    if let Err(err) = run(&args[1], &args[2], lut_path) {
        error!("{}", err);
        process::exit(1);
    }
}
