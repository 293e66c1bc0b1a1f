//! `axiscope`
//!
//! The coordinate model of a multidimensional image viewer:
//! datasets addressed by named, calibrated axes, displays that
//! merge several views into one navigable space, and an engine
//! for changing the order in which a dataset's axes are stored.

use std::sync::Arc;

pub mod data;
pub mod display;
pub mod reorder;
mod utils;

pub use data::{Axis, AxisSubrange, AxisType, Calibration, ColorTable, Dataset, DatasetError, Rgb};
pub use display::{Display, DisplayError, DisplayEvent, EventBus};
pub use reorder::{reorder, reorder_with_config, ReorderConfig, ReorderError};

/// Any error this crate can produce, for callers that
/// don't care which part of it failed.
#[derive(Debug, thiserror::Error)]
pub enum AxiscopeError {
    #[error("DatasetError: {0}")]
    Dataset(#[from] DatasetError),

    #[error("ReorderError: {0}")]
    Reorder(#[from] ReorderError),

    #[error("DisplayError: {0}")]
    Display(#[from] DisplayError),

    #[error("BinrwError: {0}")]
    Binrw(#[from] binrw::Error),
}

/// `reorder_display_view(display, view_index, dataset, order)`
/// reorders `dataset`, shows the result in place of view
/// `view_index`, and returns it.
///
/// Nothing changes if the order is rejected or the reordered
/// data can't be shown.
///
/// ## Arguments
///
/// * `display` - The display showing `dataset`
/// * `view_index` - Which of the display's views to replace
/// * `dataset` - The dataset to reorder (left untouched)
/// * `order` - Every axis type of `dataset`, exactly once
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use axiscope::{reorder_display_view, Axis, AxisType::*, Dataset, Display, EventBus};
///
/// let axes = [X, Y, Channel, Z].into_iter().map(Axis::new).collect();
/// let dataset = Dataset::zeros("stack", axes, &[4, 3, 2, 5]).unwrap();
/// let display = Display::new("stack", Arc::new(EventBus::new()));
/// display.add_view(Arc::new(dataset.clone())).unwrap();
///
/// let reordered = reorder_display_view(&display, 0, &dataset, &[X, Y, Z, Channel]).unwrap();
/// assert_eq!(reordered.dims(), &[4, 3, 5, 2]);
/// assert_eq!(display.interval().dims(), vec![4, 3, 5, 2]);
/// ```
pub fn reorder_display_view(
    display : &Display,
    view_index : usize,
    dataset : &Dataset,
    order : &[AxisType],
) -> Result<Arc<Dataset>, AxiscopeError> {
    let reordered = Arc::new(reorder(dataset, order)?);
    display.restructure(view_index, reordered.clone())?;
    Ok(reordered)
}
