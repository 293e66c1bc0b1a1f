//! `Reorder`
//!
//! Changes the storage order of the samples of a `Dataset`, e.g.
//! from `[X, Y, Channel, Z, Time]` to `[X, Y, Time, Channel, Z]`.
//! Samples, axes (with their calibration) and per-plane color
//! tables are all rearranged to match the new order. The source
//! dataset is never modified: a new one is produced, and a failed
//! request leaves everything as it was.

mod permutation;
mod remap;

pub use permutation::{Permutation, PermutationError};
pub use remap::{ColorTableRemapper, PermutationRemap, RemapAlgorithm};

use log::{debug, info, warn};
use ndarray::prelude::*;
use ndarray::IxDyn;
use rayon::prelude::*;

use crate::data::{
    axis::AxisType,
    dataset::{Dataset, DatasetError},
    planes,
};
use crate::utils::{default_chunk_size, outermost_split_axis, parallelize_op};

/// Errors that can occur reordering a dataset. A rejected
/// request never modifies the source.
#[derive(Debug, thiserror::Error)]
pub enum ReorderError {
    #[error("Invalid axis order: {0}")]
    InvalidPermutation(#[from] PermutationError),

    #[error("Reordering {requested} samples exceeds the configured limit of {limit}")]
    CapacityExceeded { requested : usize, limit : usize },

    #[error("DatasetError: {0}")]
    Dataset(#[from] DatasetError),
}

/// Tuning for `reorder_with_config`.
///
/// * `chunk_size` - Number of destination slices (along the outermost
/// non-singleton axis) copied per parallel task. `None` picks one
/// from the number of rayon threads.
/// * `max_samples` - Refuse to reorder datasets with more samples
/// than this. `None` (the default) imposes no limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorderConfig {
    pub chunk_size : Option<usize>,
    pub max_samples : Option<usize>,
}

impl ReorderConfig {
    pub fn with_chunk_size(mut self, chunk_size : usize) -> Self {
        self.chunk_size = Some(chunk_size.max(1));
        self
    }

    pub fn with_max_samples(mut self, max_samples : usize) -> Self {
        self.max_samples = Some(max_samples);
        self
    }
}

/// `reorder(dataset, order)` returns a copy of `dataset`
/// with its axes stored in `order`, using the default
/// `ReorderConfig`.
///
/// ## Arguments
///
/// * `dataset` - The dataset to reorder (left untouched)
/// * `order` - Every axis type of `dataset`, exactly once, in the
/// desired order
///
/// ## Example
///
/// ```
/// use axiscope::{reorder, Axis, AxisType::*, Dataset};
///
/// let axes = [X, Y, Channel, Z, Time].into_iter().map(Axis::new).collect();
/// let mut dataset = Dataset::zeros("stack", axes, &[4, 3, 2, 5, 1]).unwrap();
/// dataset.set_sample(&[3, 1, 1, 4, 0], 42.0).unwrap();
///
/// let reordered = reorder(&dataset, &[X, Y, Time, Channel, Z]).unwrap();
/// assert_eq!(reordered.dims(), &[4, 3, 1, 2, 5]);
/// assert_eq!(reordered.sample(&[3, 1, 0, 1, 4]), Some(42.0));
///
/// // repeated axes are rejected
/// assert!(reorder(&dataset, &[X, Y, Z, Z, Time]).is_err());
/// ```
pub fn reorder(dataset : &Dataset, order : &[AxisType]) -> Result<Dataset, ReorderError> {
    reorder_with_config(dataset, order, &ReorderConfig::default())
}

/// As `reorder`, but axes are named by label ("X", "Time", "C", ...)
/// the way an axis-order dialog reports them.
pub fn reorder_by_labels<S : AsRef<str>>(dataset : &Dataset, labels : &[S])
    -> Result<Dataset, ReorderError> {
    let order : Vec<AxisType> = labels.iter()
        .map(|label| AxisType::from_label(label.as_ref()))
        .collect();
    reorder(dataset, &order)
}

/// Reorders `dataset` into a newly allocated dataset.
///
/// Validation runs before anything is allocated. Then, with
/// `perm[i]` the new index of axis `i`:
///
/// * `new_dims[perm[i]] = dims[i]` and `new_axes[perm[i]] = axes[i]`
/// * every sample moves so that
/// `dataset.sample(pos) == reordered.sample(permute(pos))`
/// * every plane's color table follows its plane
/// * the composite channel count and name are carried over
///
/// ## Arguments
///
/// * `dataset` - The dataset to reorder (left untouched)
/// * `order` - Every axis type of `dataset`, exactly once
/// * `config` - Parallelism and capacity settings
pub fn reorder_with_config(dataset : &Dataset, order : &[AxisType], config : &ReorderConfig)
    -> Result<Dataset, ReorderError> {

    let permutation = Permutation::from_order(&dataset.axis_types(), order)
        .map_err(|err| {
            warn!("Not reordering {}: {}", dataset.name(), err);
            err
        })?;

    if let Some(limit) = config.max_samples {
        if dataset.sample_count() > limit {
            warn!(
                "Not reordering {}: {} samples exceeds limit {}",
                dataset.name(), dataset.sample_count(), limit
            );
            return Err(ReorderError::CapacityExceeded {
                requested : dataset.sample_count(),
                limit,
            });
        }
    }

    debug!("Permuting axes of {} by {:?}", dataset.name(), permutation.forward());

    let new_axes = permutation.permute(dataset.axes());
    let new_dims = permutation.permute(dataset.dims());
    let samples = permute_samples(dataset.samples(), &permutation, config)?;
    let n_planes = planes::plane_count(&planes::plane_dims(&new_axes, &new_dims));

    let mut reordered = Dataset::from_parts(
        dataset.name().to_string(),
        new_axes,
        samples,
        vec![None; n_planes],
        dataset.composite_channel_count(),
    );

    ColorTableRemapper::new(PermutationRemap::new(&permutation, dataset.axes()))
        .remap(dataset, &mut reordered)?;

    info!(
        "Reordered {} from {:?} to {:?}",
        dataset.name(),
        dataset.axis_types().iter().map(|axis| axis.label()).collect::<Vec<_>>(),
        order.iter().map(|axis| axis.label()).collect::<Vec<_>>(),
    );
    Ok(reordered)
}

/// Copies `source` into a new buffer with its axes permuted.
///
/// The permuted view of `source` has exactly the new shape,
/// with the element at `permute(pos)` being `source[pos]`, so
/// the copy is a plain assignment from that view. Destination
/// chunks are disjoint and the source is only read, so the
/// chunks are filled in parallel without any locking.
fn permute_samples(source : &ArrayD<f64>, permutation : &Permutation, config : &ReorderConfig)
    -> Result<ArrayD<f64>, ReorderError> {
    let permuted_view = source.view().permuted_axes(IxDyn(permutation.inverse()));
    let mut permuted = ArrayD::<f64>::zeros(permuted_view.raw_dim());

    // Nothing to split for scalars or empty buffers
    if permuted.ndim() == 0 || permuted.is_empty() {
        permuted.assign(&permuted_view);
        return Ok(permuted);
    }

    let split_axis = outermost_split_axis(permuted.shape());
    let chunk_size = config.chunk_size
        .unwrap_or_else(|| default_chunk_size(permuted.shape()[split_axis]))
        .max(1);

    parallelize_op!(
        (permuted, permuted_view),
        chunk_size,
        Axis(split_axis),
        |_chunk_idx, dest_chunk : &mut ArrayViewMutD<f64>, source_chunk : &ArrayViewD<f64>|
            -> Result<(), ReorderError> {
            dest_chunk.assign(source_chunk);
            Ok(())
        }
    )?;

    Ok(permuted)
}

impl Dataset {
    /// Replaces this dataset with its reordering (see
    /// `reorder_with_config`). On error `self` is unchanged.
    pub fn reorder(&mut self, order : &[AxisType]) -> Result<(), ReorderError> {
        self.reorder_with_config(order, &ReorderConfig::default())
    }

    pub fn reorder_with_config(&mut self, order : &[AxisType], config : &ReorderConfig)
        -> Result<(), ReorderError> {
        *self = reorder_with_config(self, order, config)?;
        Ok(())
    }

    /// Replaces this dataset with its reordering, with the axes
    /// named by label.
    pub fn reorder_by_labels<S : AsRef<str>>(&mut self, labels : &[S]) -> Result<(), ReorderError> {
        *self = reorder_by_labels(self, labels)?;
        Ok(())
    }
}
