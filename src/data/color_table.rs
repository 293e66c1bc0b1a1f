//! Per-plane color lookup tables.
//!
//! A `ColorTable` maps an 8-bit index to an RGB color. Tables
//! are stored on disk in the raw 768-byte layout (256 reds, then
//! 256 greens, then 256 blues) that most microscopy tools read and
//! write, parsed with `binrw`.

use binrw::{
    io::{Read, Seek, Write},
    BinRead,
    BinWrite,
};
use bytemuck::{Pod, Zeroable};

/// Number of entries in every table
pub const TABLE_SIZE : usize = 256;

/// One color table entry. `repr(C)` and `Pod` so a whole table
/// can be viewed as interleaved RGB bytes without copying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Rgb {
    pub r : u8,
    pub g : u8,
    pub b : u8,
}

impl Rgb {
    pub const fn new(r : u8, g : u8, b : u8) -> Rgb {
        Rgb { r, g, b }
    }
}

/// The on-disk layout of a table: three planar channels.
#[derive(BinRead, BinWrite)]
#[brw(little)]
struct RawTable {
    reds : [u8; TABLE_SIZE],
    greens : [u8; TABLE_SIZE],
    blues : [u8; TABLE_SIZE],
}

/// A 256-entry RGB lookup table attached to one plane
/// of a `Dataset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    entries : [Rgb; TABLE_SIZE],
}

impl Default for ColorTable {
    fn default() -> Self {
        ColorTable::gray()
    }
}

impl ColorTable {
    pub fn from_entries(entries : [Rgb; TABLE_SIZE]) -> ColorTable {
        ColorTable { entries }
    }

    /// Linear ramp from black to white
    pub fn gray() -> ColorTable {
        ColorTable::ramp(Rgb::new(255, 255, 255))
    }

    /// Linear ramp from black to `color`, e.g. the usual
    /// red / green / blue channel tables.
    pub fn ramp(color : Rgb) -> ColorTable {
        let mut entries = [Rgb::default(); TABLE_SIZE];
        entries.iter_mut().enumerate().for_each(|(i, entry)| {
            let scale = |c : u8| ((c as usize * i) / (TABLE_SIZE - 1)) as u8;
            *entry = Rgb::new(scale(color.r), scale(color.g), scale(color.b));
        });
        ColorTable { entries }
    }

    pub fn get(&self, index : u8) -> Rgb {
        self.entries[index as usize]
    }

    pub fn set(&mut self, index : u8, color : Rgb) {
        self.entries[index as usize] = color;
    }

    pub fn entries(&self) -> &[Rgb; TABLE_SIZE] {
        &self.entries
    }

    /// Maps a real-valued sample into the table given the
    /// display range `[min, max]`. Values outside the range
    /// saturate at the first or last entry.
    pub fn lookup(&self, value : f64, min : f64, max : f64) -> Rgb {
        if !(max > min) || value.is_nan() {
            return self.entries[0];
        }
        let fraction = ((value - min) / (max - min)).clamp(0.0, 1.0);
        self.entries[(fraction * (TABLE_SIZE - 1) as f64).round() as usize]
    }

    /// The table as interleaved `r, g, b` bytes (768 of them).
    pub fn as_rgb_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.entries)
    }

    /// Reads a table in the raw planar layout from the
    /// current position of `reader`.
    ///
    /// ## Arguments
    ///
    /// * `reader` - Anything implementing `Read` + `Seek`
    /// positioned at the start of the table
    ///
    /// ## Example
    ///
    /// ```rust, ignore
    /// let mut f = std::fs::File::open("fire.lut")?;
    /// let table = ColorTable::read_raw(&mut f)?;
    /// ```
    pub fn read_raw<ReaderT : Read + Seek>(reader : &mut ReaderT) -> binrw::BinResult<ColorTable> {
        let raw = RawTable::read(reader)?;
        let mut entries = [Rgb::default(); TABLE_SIZE];
        for (i, entry) in entries.iter_mut().enumerate() {
            *entry = Rgb::new(raw.reds[i], raw.greens[i], raw.blues[i]);
        }
        Ok(ColorTable { entries })
    }

    /// Writes the table in the raw planar layout.
    pub fn write_raw<WriterT : Write + Seek>(&self, writer : &mut WriterT) -> binrw::BinResult<()> {
        let mut raw = RawTable {
            reds : [0; TABLE_SIZE],
            greens : [0; TABLE_SIZE],
            blues : [0; TABLE_SIZE],
        };
        for (i, entry) in self.entries.iter().enumerate() {
            raw.reds[i] = entry.r;
            raw.greens[i] = entry.g;
            raw.blues[i] = entry.b;
        }
        raw.write(writer)
    }
}
