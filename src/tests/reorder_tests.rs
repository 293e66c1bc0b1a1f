use std::sync::Arc;

use axiscope::{
    display::{BoundedRegion, Display, DisplayEvent, EventBus, ViewData},
    reorder::{PermutationError, ReorderConfig},
    reorder_display_view,
    Axis, AxisType, ColorTable, Dataset, ReorderError, Rgb,
};
use axiscope::AxisType::*;
use parking_lot::Mutex;
use proptest::prelude::*;

const TYPES : [AxisType; 6] = [X, Y, Channel, Z, Time, Lifetime];

fn random_dataset(types : &[AxisType], dims : &[usize]) -> Dataset {
    let n_samples : usize = dims.iter().product();
    let samples = (0..n_samples).map(|_| rand::random::<f64>()).collect();
    let axes = types.iter().cloned().map(Axis::new).collect();
    let mut dataset = Dataset::from_shape_vec("random", axes, dims, samples).unwrap();
    for plane in (0..dataset.plane_count()).step_by(2) {
        let mut table = ColorTable::gray();
        table.set(0, Rgb::new(plane as u8, 1, 2));
        dataset.set_color_table(plane, Some(table)).unwrap();
    }
    dataset
}

/// Every coordinate of `dims`, first axis slowest
fn coordinates(dims : &[usize]) -> Vec<Vec<usize>> {
    dims.iter().fold(vec![vec![]], |coords, &dim| {
        coords.into_iter()
            .flat_map(|prefix| (0..dim).map(move |i| {
                let mut next = prefix.clone();
                next.push(i);
                next
            }))
            .collect()
    })
}

#[test]
fn plane_remap_example() {
    let mut dataset = random_dataset(&[X, Y, Channel, Z, Time], &[4, 3, 2, 5, 1]);
    let blue = ColorTable::ramp(Rgb::new(0, 0, 255));
    let old_plane = dataset.plane_index(&[1, 2, 0]).unwrap();
    dataset.set_color_table(old_plane, Some(blue.clone())).unwrap();

    let reordered = axiscope::reorder(&dataset, &[X, Y, Time, Channel, Z]).unwrap();
    assert_eq!(reordered.dims(), &[4, 3, 1, 2, 5]);

    for pos in coordinates(dataset.dims()) {
        let (x, y, c, z, t) = (pos[0], pos[1], pos[2], pos[3], pos[4]);
        assert_eq!(dataset.sample(&pos), reordered.sample(&[x, y, t, c, z]));
    }
    for plane in 0..dataset.plane_count() {
        let position = dataset.plane_position(plane);
        let (c, z, t) = (position[0], position[1], position[2]);
        assert_eq!(
            dataset.color_table(plane),
            reordered.color_table(reordered.plane_index(&[t, c, z]).unwrap())
        );
    }
    assert_eq!(reordered.color_table(reordered.plane_index(&[0, 1, 2]).unwrap()), Some(&blue));
}

#[test]
fn rejected_orders_change_nothing() {
    let mut dataset = random_dataset(&[X, Y, Channel, Z], &[3, 2, 2, 4]);
    let before = dataset.clone();

    let bad_orders : [&[AxisType]; 4] = [
        &[X, Y, Z, Z],
        &[X, Y, Z],
        &[X, Y, Z, Time],
        &[X, Y, Channel, Z, Time],
    ];
    for order in bad_orders.iter() {
        assert!(matches!(
            dataset.reorder(order),
            Err(ReorderError::InvalidPermutation(_))
        ));
        assert_eq!(dataset, before);
    }

    let err = axiscope::reorder(&dataset, &[X, Y, Z, Z]).unwrap_err();
    assert!(matches!(err, ReorderError::InvalidPermutation(PermutationError::DuplicateAxis(Z))));
    assert!(err.to_string().contains("repeated"));
}

#[test]
fn capacity_guard_is_opt_in() {
    let dataset = random_dataset(&[X, Y, Z], &[8, 8, 8]);
    assert!(axiscope::reorder_with_config(&dataset, &[Z, X, Y], &ReorderConfig::default()).is_ok());
    let limited = ReorderConfig::default().with_max_samples(100);
    assert!(matches!(
        axiscope::reorder_with_config(&dataset, &[Z, X, Y], &limited),
        Err(ReorderError::CapacityExceeded { requested : 512, limit : 100 })
    ));
}

#[test]
fn display_bounds_and_clamping() {
    let bus = Arc::new(EventBus::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    bus.subscribe(Arc::new(move |event : &DisplayEvent| sink.lock().push(event.clone())));

    let z_axis = vec![Axis::new(Z)];
    let first : Arc<dyn ViewData> = Arc::new(BoundedRegion::new("v1", z_axis.clone(), vec![(0.0, 4.0)]).unwrap());
    let second : Arc<dyn ViewData> = Arc::new(BoundedRegion::new("v2", z_axis, vec![(2.0, 9.0)]).unwrap());
    let display = Display::with_views("display", bus.clone(), vec![first, second]).unwrap();

    let interval = display.interval();
    assert_eq!((interval.min(0), interval.max(0)), (0, 9));

    assert_eq!(display.set_position(&Z, 100).unwrap(), 9);
    assert_eq!(display.get_position(&Z), 9);
    assert_eq!(display.set_position(&Z, -5).unwrap(), 0);
    assert_eq!(display.get_position(&Z), 0);
    assert_eq!(display.get_position(&Time), 0);

    // only the activation has been delivered so far
    assert_eq!(events.lock().len(), 1);
    bus.flush();
    assert_eq!(events.lock().len(), 3);
}

#[test]
fn reordering_a_displayed_dataset() {
    let dataset = random_dataset(&[X, Y, Channel, Z, Time], &[4, 3, 2, 5, 3]);
    let display = Display::new("", Arc::new(EventBus::new()));
    display.add_view(Arc::new(dataset.clone())).unwrap();
    display.set_position(&Z, 3).unwrap();
    display.set_position(&Time, 2).unwrap();
    display.set_active_axis(&Time).unwrap();

    let reordered = reorder_display_view(&display, 0, &dataset, &[X, Y, Time, Z, Channel]).unwrap();
    assert_eq!(display.interval().dims(), reordered.dims().to_vec());
    // positions follow the axes, not their indices
    assert_eq!(display.position_snapshot(), vec![(Time, 2), (Z, 3), (Channel, 0)]);
    assert_eq!(display.active_axis(), Some(Time));

    // a rejected order leaves both the data and the display alone
    assert!(reorder_display_view(&display, 0, &reordered, &[X, Y]).is_err());
    assert_eq!(display.interval().dims(), reordered.dims().to_vec());
}

fn dataset_and_order() -> impl Strategy<Value = (Vec<AxisType>, Vec<usize>, Vec<AxisType>)> {
    (1usize..=TYPES.len()).prop_flat_map(|rank| {
        let types = TYPES[..rank].to_vec();
        (
            Just(types.clone()).prop_shuffle(),
            prop::collection::vec(1usize..4, rank),
            Just(types).prop_shuffle(),
        )
    })
}

proptest! {
    #[test]
    fn round_trip_restores_the_dataset((types, dims, order) in dataset_and_order()) {
        let dataset = random_dataset(&types, &dims);
        let reordered = axiscope::reorder(&dataset, &order).unwrap();
        prop_assert_eq!(reordered.axis_types(), order);
        prop_assert_eq!(reordered.sample_count(), dataset.sample_count());

        let restored = axiscope::reorder(&reordered, &types).unwrap();
        prop_assert_eq!(restored, dataset);
    }

    #[test]
    fn identity_is_a_no_op((types, dims, _order) in dataset_and_order()) {
        let dataset = random_dataset(&types, &dims);
        prop_assert_eq!(axiscope::reorder(&dataset, &types).unwrap(), dataset);
    }

    #[test]
    fn chunking_never_changes_the_result(
        (types, dims, order) in dataset_and_order(),
        chunk_size in 1usize..5,
    ) {
        let dataset = random_dataset(&types, &dims);
        let config = ReorderConfig::default().with_chunk_size(chunk_size);
        prop_assert_eq!(
            axiscope::reorder_with_config(&dataset, &order, &config).unwrap(),
            axiscope::reorder(&dataset, &order).unwrap()
        );
    }
}
