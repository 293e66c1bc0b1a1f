//! `Data`
//!
//! The data model: calibrated axes, per-plane color tables
//! and the `Dataset` that owns a sample buffer addressed by them.

pub mod axis;
pub mod color_table;
pub mod dataset;
pub mod planes;
pub mod subrange;

pub use axis::{Axis, AxisType, Calibration, KNOWN_AXES};
pub use color_table::{ColorTable, Rgb};
pub use dataset::{Dataset, DatasetError};
pub use subrange::{AxisSubrange, SubrangeError};
