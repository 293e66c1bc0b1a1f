//! The `Dataset` struct: an ordered list of calibrated axes,
//! an N-dimensional buffer of real samples addressed by them,
//! and one (optional) color table per plane.

use std::collections::HashMap;

use itertools::Itertools;
use log::debug;
use ndarray::prelude::*;
use ndarray::{IxDyn, ShapeError};

use crate::data::{
    axis::{Axis, AxisType, Calibration},
    color_table::ColorTable,
    planes,
    subrange::{AxisSubrange, SubrangeError},
};

/// Things that can go wrong constructing or editing a `Dataset`.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("{axes} axes were given for a buffer of rank {rank}")]
    RankMismatch { axes : usize, rank : usize },

    #[error("Axis {0} appears more than once: axis designations must be mutually exclusive")]
    DuplicateAxis(AxisType),

    #[error("Position {position:?} is outside of dims {dims:?}")]
    OutOfBounds { position : Vec<usize>, dims : Vec<usize> },

    #[error("Plane {plane} requested but the dataset has {count} planes")]
    PlaneOutOfBounds { plane : usize, count : usize },

    #[error("Dataset has no {0} axis")]
    UnknownAxis(AxisType),

    #[error("Bounds [{min}, {max}] of axis {axis} are not a finite, ordered range")]
    InvalidBounds { axis : AxisType, min : f64, max : f64 },

    #[error("Subrange of axis {axis}: {source}")]
    Subrange { axis : AxisType, source : SubrangeError },

    #[error("ShapeError: {0}")]
    Shape(#[from] ShapeError),
}

/// An N-dimensional image. `dims()[i]` is the extent along
/// `axes()[i]`, and axis types are unique.
///
/// Datasets are edited in place for metadata (units, axis
/// designations, color tables) but replaced wholesale when
/// their storage order changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name : String,
    axes : Vec<Axis>,
    samples : ArrayD<f64>,
    color_tables : Vec<Option<ColorTable>>,
    composite_channel_count : usize,
}

/// Errors if any axis type repeats
pub(crate) fn check_unique<'a, I>(types : I) -> Result<(), DatasetError>
    where I : IntoIterator<Item = &'a AxisType> {
    match types.into_iter().duplicates().next() {
        Some(repeated) => Err(DatasetError::DuplicateAxis(repeated.clone())),
        None => Ok(()),
    }
}

impl Dataset {
    /// Wraps an existing buffer. Fails if the number of axes
    /// doesn't match the rank of `samples` or if any axis type
    /// repeats. Every plane starts without a color table.
    ///
    /// ## Arguments
    ///
    /// * `name` - Display name of the dataset
    /// * `axes` - One axis per dimension of `samples`
    /// * `samples` - The sample buffer
    ///
    /// ## Example
    ///
    /// ```
    /// use axiscope::{Axis, AxisType, Dataset};
    /// use ndarray::{ArrayD, IxDyn};
    ///
    /// let axes = vec![Axis::new(AxisType::X), Axis::new(AxisType::Y), Axis::new(AxisType::Z)];
    /// let dataset = Dataset::from_array("stack", axes, ArrayD::zeros(IxDyn(&[4, 3, 5]))).unwrap();
    /// assert_eq!(dataset.plane_count(), 5);
    /// ```
    pub fn from_array(name : &str, axes : Vec<Axis>, samples : ArrayD<f64>)
        -> Result<Dataset, DatasetError> {
        if axes.len() != samples.ndim() {
            return Err(DatasetError::RankMismatch { axes : axes.len(), rank : samples.ndim() });
        }
        check_unique(axes.iter().map(|axis| &axis.axis_type))?;

        let n_planes = planes::plane_count(&planes::plane_dims(&axes, samples.shape()));
        Ok(Dataset {
            name : name.to_string(),
            axes,
            samples,
            color_tables : vec![None; n_planes],
            composite_channel_count : 1,
        })
    }

    /// A zero-filled dataset with the given dims.
    pub fn zeros(name : &str, axes : Vec<Axis>, dims : &[usize]) -> Result<Dataset, DatasetError> {
        Dataset::from_array(name, axes, ArrayD::zeros(IxDyn(dims)))
    }

    /// A dataset from samples laid out in row-major (last axis
    /// fastest) order.
    pub fn from_shape_vec(name : &str, axes : Vec<Axis>, dims : &[usize], data : Vec<f64>)
        -> Result<Dataset, DatasetError> {
        let samples = ArrayD::from_shape_vec(IxDyn(dims), data)?;
        Dataset::from_array(name, axes, samples)
    }

    /// Assembles a dataset whose invariants the caller has
    /// already established.
    pub(crate) fn from_parts(
        name : String,
        axes : Vec<Axis>,
        samples : ArrayD<f64>,
        color_tables : Vec<Option<ColorTable>>,
        composite_channel_count : usize,
    ) -> Dataset {
        debug_assert_eq!(axes.len(), samples.ndim());
        Dataset { name, axes, samples, color_tables, composite_channel_count }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name : &str) {
        self.name = name.to_string();
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, d : usize) -> &Axis {
        &self.axes[d]
    }

    /// The axis types in storage order
    pub fn axis_types(&self) -> Vec<AxisType> {
        self.axes.iter().map(|axis| axis.axis_type.clone()).collect()
    }

    pub fn axis_index(&self, axis_type : &AxisType) -> Option<usize> {
        self.axes.iter().position(|axis| &axis.axis_type == axis_type)
    }

    pub fn rank(&self) -> usize {
        self.axes.len()
    }

    pub fn dims(&self) -> &[usize] {
        self.samples.shape()
    }

    /// Extent along the axis of type `axis_type`, if present
    pub fn dim_of(&self, axis_type : &AxisType) -> Option<usize> {
        self.axis_index(axis_type).map(|d| self.dims()[d])
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &ArrayD<f64> {
        &self.samples
    }

    /// Mutable access to the sample values. The buffer itself
    /// can't be replaced, so its shape always matches the axes.
    pub fn samples_mut(&mut self) -> ArrayViewMutD<'_, f64> {
        self.samples.view_mut()
    }

    /// The sample at `position`, or `None` if the position
    /// has the wrong rank or is out of bounds.
    pub fn sample(&self, position : &[usize]) -> Option<f64> {
        if position.len() != self.rank() {
            return None;
        }
        self.samples.get(IxDyn(position)).copied()
    }

    pub fn set_sample(&mut self, position : &[usize], value : f64) -> Result<(), DatasetError> {
        let dims = self.dims().to_vec();
        let out_of_bounds = || DatasetError::OutOfBounds {
            position : position.to_vec(),
            dims,
        };
        if position.len() != self.rank() {
            return Err(out_of_bounds());
        }
        match self.samples.get_mut(IxDyn(position)) {
            Some(sample) => {
                *sample = value;
                Ok(())
            },
            None => Err(out_of_bounds()),
        }
    }

    pub fn composite_channel_count(&self) -> usize {
        self.composite_channel_count
    }

    pub fn set_composite_channel_count(&mut self, count : usize) {
        self.composite_channel_count = count;
    }

    /// Extents of the non-planar axes, in axis order
    pub fn plane_dims(&self) -> Vec<usize> {
        planes::plane_dims(&self.axes, self.dims())
    }

    pub fn plane_count(&self) -> usize {
        self.color_tables.len()
    }

    /// Flattened index of a plane given its non-planar coordinates,
    /// or `None` if the position has the wrong length or lies
    /// outside the plane dims.
    pub fn plane_index(&self, plane_position : &[usize]) -> Option<usize> {
        let plane_dims = self.plane_dims();
        if plane_position.len() != plane_dims.len()
            || plane_position.iter().zip(plane_dims.iter()).any(|(p, d)| p >= d) {
            return None;
        }
        Some(planes::position_to_index(plane_position, &plane_dims))
    }

    /// Non-planar coordinates of the plane with the given index
    pub fn plane_position(&self, plane : usize) -> Vec<usize> {
        let plane_dims = self.plane_dims();
        let mut position = vec![0; plane_dims.len()];
        planes::index_to_position(plane, &plane_dims, &mut position);
        position
    }

    pub fn color_tables(&self) -> &[Option<ColorTable>] {
        &self.color_tables
    }

    pub fn color_table(&self, plane : usize) -> Option<&ColorTable> {
        self.color_tables.get(plane).and_then(|table| table.as_ref())
    }

    pub fn set_color_table(&mut self, plane : usize, table : Option<ColorTable>)
        -> Result<(), DatasetError> {
        let count = self.plane_count();
        match self.color_tables.get_mut(plane) {
            Some(slot) => {
                *slot = table;
                Ok(())
            },
            None => Err(DatasetError::PlaneOutOfBounds { plane, count }),
        }
    }

    /// Reassigns the axis designations without moving any
    /// samples (e.g. if imported data has the wrong axis types).
    /// Calibration and unit are kept for types the dataset
    /// already has; new types get an uncalibrated axis.
    ///
    /// On error the dataset is unchanged.
    pub fn set_axes(&mut self, axis_types : &[AxisType]) -> Result<(), DatasetError> {
        if axis_types.len() != self.rank() {
            return Err(DatasetError::RankMismatch {
                axes : axis_types.len(),
                rank : self.rank(),
            });
        }
        check_unique(axis_types.iter())?;

        let new_axes : Vec<Axis> = axis_types.iter().map(|axis_type| {
            match self.axis_index(axis_type) {
                Some(d) => self.axes[d].clone(),
                None => Axis {
                    axis_type : axis_type.clone(),
                    calibration : Calibration::default(),
                    unit : String::new(),
                },
            }
        }).collect();

        self.axes = new_axes;
        // planes may now be counted over different axes
        let n_planes = planes::plane_count(&self.plane_dims());
        self.color_tables.resize(n_planes, None);
        Ok(())
    }

    /// Sets the unit label of one axis
    pub fn set_unit(&mut self, axis_type : &AxisType, unit : &str) -> Result<(), DatasetError> {
        let d = self.axis_index(axis_type)
            .ok_or_else(|| DatasetError::UnknownAxis(axis_type.clone()))?;
        self.axes[d].unit = unit.to_string();
        Ok(())
    }

    pub fn set_calibration(&mut self, axis_type : &AxisType, calibration : Calibration)
        -> Result<(), DatasetError> {
        let d = self.axis_index(axis_type)
            .ok_or_else(|| DatasetError::UnknownAxis(axis_type.clone()))?;
        self.axes[d].calibration = calibration;
        Ok(())
    }

    /// A copy of part of the dataset: along each axis named in
    /// `subranges` only the listed indices are kept, in the order
    /// listed. Other axes are copied whole. Axes, calibration and
    /// the color table of every kept plane come along.
    ///
    /// ## Arguments
    ///
    /// * `name` - Name of the copy
    /// * `subranges` - Indices to keep, per axis type
    ///
    /// ## Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use axiscope::{Axis, AxisType::*, Dataset};
    /// use axiscope::data::subrange::AxisSubrange;
    ///
    /// let axes = [X, Y, Z, Time].into_iter().map(Axis::new).collect();
    /// let dataset = Dataset::zeros("movie", axes, &[4, 3, 10, 60]).unwrap();
    ///
    /// let subranges = HashMap::from([
    ///     (Z, AxisSubrange::parse("2-4", true).unwrap()),
    ///     (Time, AxisSubrange::parse("1-60-10", true).unwrap()),
    /// ]);
    /// let copy = dataset.duplicate("excerpt", &subranges).unwrap();
    /// assert_eq!(copy.dims(), &[4, 3, 3, 6]);
    /// ```
    pub fn duplicate(&self, name : &str, subranges : &HashMap<AxisType, AxisSubrange>)
        -> Result<Dataset, DatasetError> {
        let mut kept : Vec<Option<&[usize]>> = vec![None; self.rank()];
        for (axis_type, subrange) in subranges.iter() {
            let d = self.axis_index(axis_type)
                .ok_or_else(|| DatasetError::UnknownAxis(axis_type.clone()))?;
            subrange.check(self.dims()[d])
                .map_err(|source| DatasetError::Subrange { axis : axis_type.clone(), source })?;
            kept[d] = Some(subrange.indices());
        }

        let samples = kept.iter().enumerate()
            .filter_map(|(d, &indices)| indices.map(|indices| (d, indices)))
            .fold(self.samples.clone(), |samples, (d, indices)| {
                samples.select(ndarray::Axis(d), indices)
            });

        // each new plane takes the table of the plane it was cut from
        let old_plane_dims = self.plane_dims();
        let new_plane_dims = planes::plane_dims(&self.axes, samples.shape());
        let plane_kept : Vec<Option<&[usize]>> = self.axes.iter().zip(kept.iter())
            .filter(|(axis, _)| !axis.axis_type.is_xy())
            .map(|(_, &indices)| indices)
            .collect();
        let mut new_position = vec![0; new_plane_dims.len()];
        let color_tables = (0..planes::plane_count(&new_plane_dims)).map(|plane| {
            planes::index_to_position(plane, &new_plane_dims, &mut new_position);
            let old_position : Vec<usize> = new_position.iter().zip(plane_kept.iter())
                .map(|(&p, &indices)| indices.map_or(p, |indices| indices[p]))
                .collect();
            self.color_tables[planes::position_to_index(&old_position, &old_plane_dims)].clone()
        }).collect();

        let composite_channel_count = match self.dim_of(&AxisType::Channel) {
            Some(_) => {
                let channels = subranges.get(&AxisType::Channel)
                    .map_or(usize::MAX, AxisSubrange::len);
                self.composite_channel_count.min(channels).max(1)
            },
            None => self.composite_channel_count,
        };

        debug!(
            "Duplicated {} as {}: dims {:?} -> {:?}",
            self.name, name, self.dims(), samples.shape(),
        );
        Ok(Dataset::from_parts(
            name.to_string(),
            self.axes.clone(),
            samples,
            color_tables,
            composite_channel_count,
        ))
    }

    /// Real-world coordinates of a pixel position, one per axis.
    pub fn calibrated_position(&self, position : &[usize]) -> Vec<f64> {
        self.axes.iter().zip(position.iter())
            .map(|(axis, &p)| axis.calibration.forward(p as f64))
            .collect()
    }
}
