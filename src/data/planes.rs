//! Plane index arithmetic.
//!
//! A plane is one fixed combination of every non-planar (not X
//! or Y) coordinate. Planes are numbered by flattening that
//! combination with the first non-planar axis varying fastest.

use crate::data::axis::Axis;

/// The extents of the non-planar axes, in axis order.
pub fn plane_dims(axes : &[Axis], dims : &[usize]) -> Vec<usize> {
    axes.iter().zip(dims.iter())
        .filter(|(axis, _)| !axis.axis_type.is_xy())
        .map(|(_, &dim)| dim)
        .collect()
}

/// Number of planes spanned by `plane_dims`. A dataset with
/// only planar axes has exactly one plane.
pub fn plane_count(plane_dims : &[usize]) -> usize {
    plane_dims.iter().product()
}

/// Flattens a plane position (first coordinate fastest). The
/// position must lie within `dims`; `Dataset::plane_index` is the
/// checked form.
///
/// ## Example
///
/// ```
/// use axiscope::data::planes::position_to_index;
///
/// // dims (C:2, Z:5, T:1), position c=1, z=3, t=0
/// assert_eq!(position_to_index(&[1, 3, 0], &[2, 5, 1]), 1 + 2 * 3);
/// ```
pub fn position_to_index(position : &[usize], dims : &[usize]) -> usize {
    debug_assert_eq!(position.len(), dims.len());
    position.iter().zip(dims.iter()).rev()
        .fold(0, |index, (&pos, &dim)| index * dim + pos)
}

/// Inverse of `position_to_index`, writing into `position`.
pub fn index_to_position(mut index : usize, dims : &[usize], position : &mut [usize]) {
    debug_assert_eq!(position.len(), dims.len());
    for (pos, &dim) in position.iter_mut().zip(dims.iter()) {
        if dim == 0 {
            *pos = 0;
            continue;
        }
        *pos = index % dim;
        index /= dim;
    }
}
