//! Merges the axes and bounds of several views into a single
//! interval that a `Display` can navigate.

use std::fmt;
use std::sync::Arc;

use crate::data::{
    axis::{Axis, AxisType},
    dataset::{check_unique, Dataset, DatasetError},
};

/// Raised when the combined bounds can't be addressed by
/// integer positions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntervalError {
    #[error("Axis {axis} has non-integral bounds [{min}, {max}]")]
    NonDiscrete { axis : AxisType, min : f64, max : f64 },
}

/// Anything that can be shown in a `Display`: a named set of
/// axes, each with real-valued bounds.
pub trait ViewData : Send + Sync {
    fn name(&self) -> &str;

    fn axes(&self) -> &[Axis];

    /// Lowest coordinate along dimension `d`
    fn real_min(&self, d : usize) -> f64;

    /// Highest coordinate along dimension `d` (inclusive)
    fn real_max(&self, d : usize) -> f64;

    fn axis_index(&self, axis_type : &AxisType) -> Option<usize> {
        self.axes().iter().position(|axis| &axis.axis_type == axis_type)
    }
}

impl ViewData for Dataset {
    fn name(&self) -> &str {
        Dataset::name(self)
    }

    fn axes(&self) -> &[Axis] {
        Dataset::axes(self)
    }

    fn real_min(&self, _d : usize) -> f64 {
        0.0
    }

    fn real_max(&self, d : usize) -> f64 {
        self.dims()[d] as f64 - 1.0
    }

    fn axis_index(&self, axis_type : &AxisType) -> Option<usize> {
        Dataset::axis_index(self, axis_type)
    }
}

/// A view with explicitly specified bounds, e.g. a region
/// of interest overlaid on a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedRegion {
    name : String,
    axes : Vec<Axis>,
    bounds : Vec<(f64, f64)>,
}

impl BoundedRegion {
    /// ## Arguments
    ///
    /// * `name` - Name of the region
    /// * `axes` - The axes the region spans (unique types)
    /// * `bounds` - `(min, max)` along each axis, inclusive. Both
    /// must be finite, with `min <= max`.
    pub fn new(name : &str, axes : Vec<Axis>, bounds : Vec<(f64, f64)>)
        -> Result<BoundedRegion, DatasetError> {
        if axes.len() != bounds.len() {
            return Err(DatasetError::RankMismatch { axes : axes.len(), rank : bounds.len() });
        }
        check_unique(axes.iter().map(|axis| &axis.axis_type))?;
        if let Some((axis, &(min, max))) = axes.iter().zip(bounds.iter())
            .find(|(_, (min, max))| !(min.is_finite() && max.is_finite() && min <= max)) {
            return Err(DatasetError::InvalidBounds { axis : axis.axis_type.clone(), min, max });
        }
        Ok(BoundedRegion { name : name.to_string(), axes, bounds })
    }
}

impl ViewData for BoundedRegion {
    fn name(&self) -> &str {
        &self.name
    }

    fn axes(&self) -> &[Axis] {
        &self.axes
    }

    fn real_min(&self, d : usize) -> f64 {
        self.bounds[d].0
    }

    fn real_max(&self, d : usize) -> f64 {
        self.bounds[d].1
    }
}

/// The union of the axes of every contributing view.
///
/// Axes appear in the order they are first encountered. Along
/// each axis the bound is the tightest one enclosing every
/// contributor that *has* that axis: a view without a Z axis
/// does not pull the Z bounds towards 0.
#[derive(Clone, Default)]
pub struct CombinedInterval {
    contributors : Vec<Arc<dyn ViewData>>,
    axes : Vec<Axis>,
    real_min : Vec<f64>,
    real_max : Vec<f64>,
}

impl fmt::Debug for CombinedInterval {
    fn fmt(&self, f : &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CombinedInterval")
            .field("contributors", &self.contributors.iter().map(|c| c.name()).collect::<Vec<_>>())
            .field("axes", &self.axes)
            .field("real_min", &self.real_min)
            .field("real_max", &self.real_max)
            .finish()
    }
}

impl CombinedInterval {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a contributor. Bounds are not recomputed
    /// until `update` is called.
    pub fn add(&mut self, view : Arc<dyn ViewData>) {
        self.contributors.push(view);
    }

    pub fn clear(&mut self) {
        self.contributors.clear();
        self.axes.clear();
        self.real_min.clear();
        self.real_max.clear();
    }

    /// Recomputes the union of axes and their bounds.
    pub fn update(&mut self) {
        self.axes.clear();
        self.real_min.clear();
        self.real_max.clear();

        for view in self.contributors.iter() {
            for (d, axis) in view.axes().iter().enumerate() {
                let (lo, hi) = (view.real_min(d), view.real_max(d));
                match self.axes.iter().position(|known| known.axis_type == axis.axis_type) {
                    Some(i) => {
                        self.real_min[i] = self.real_min[i].min(lo);
                        self.real_max[i] = self.real_max[i].max(hi);
                    },
                    None => {
                        self.axes.push(axis.clone());
                        self.real_min.push(lo);
                        self.real_max.push(hi);
                    },
                }
            }
        }
    }

    /// Whether every bound is a finite integer.
    pub fn is_discrete(&self) -> bool {
        self.validate().is_ok()
    }

    /// As `is_discrete`, but names the first offending axis.
    pub fn validate(&self) -> Result<(), IntervalError> {
        let integral = |v : f64| v.is_finite() && v.fract() == 0.0;
        match (0..self.num_dimensions())
            .find(|&d| !integral(self.real_min[d]) || !integral(self.real_max[d])) {
            Some(d) => Err(IntervalError::NonDiscrete {
                axis : self.axes[d].axis_type.clone(),
                min : self.real_min[d],
                max : self.real_max[d],
            }),
            None => Ok(()),
        }
    }

    pub fn num_dimensions(&self) -> usize {
        self.axes.len()
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, d : usize) -> &Axis {
        &self.axes[d]
    }

    pub fn axis_index(&self, axis_type : &AxisType) -> Option<usize> {
        self.axes.iter().position(|axis| &axis.axis_type == axis_type)
    }

    pub fn contributors(&self) -> &[Arc<dyn ViewData>] {
        &self.contributors
    }

    pub fn real_min(&self, d : usize) -> f64 {
        self.real_min[d]
    }

    pub fn real_max(&self, d : usize) -> f64 {
        self.real_max[d]
    }

    pub fn min(&self, d : usize) -> i64 {
        self.real_min[d] as i64
    }

    pub fn max(&self, d : usize) -> i64 {
        self.real_max[d] as i64
    }

    /// Number of integer positions along `d`
    pub fn dimension(&self, d : usize) -> usize {
        (self.max(d) - self.min(d) + 1).max(0) as usize
    }

    pub fn dims(&self) -> Vec<usize> {
        (0..self.num_dimensions()).map(|d| self.dimension(d)).collect()
    }
}
