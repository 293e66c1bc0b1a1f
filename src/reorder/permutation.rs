//! Builds the bijection between an existing axis order and a
//! requested one, and applies it to positions, dims and axes.

use itertools::Itertools;

use crate::data::axis::AxisType;

/// Reasons a requested axis order is not a permutation of
/// the dataset's axes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermutationError {
    #[error("at least one axis preference is repeated ({0}): axis preferences must be mutually exclusive")]
    DuplicateAxis(AxisType),

    #[error("axis {0} is not part of the dataset")]
    ForeignAxis(AxisType),

    #[error("axis {0} is missing from the requested order")]
    MissingAxis(AxisType),
}

/// `forward[i]` is the new index of the axis currently at
/// index `i`; `inverse` undoes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    forward : Vec<usize>,
    inverse : Vec<usize>,
}

impl Permutation {
    /// Builds the permutation taking `current` to `desired`.
    /// Validation happens entirely before anything is built,
    /// so a failure has no side effects.
    ///
    /// ## Arguments
    ///
    /// * `current` - The axis types in their present order
    /// * `desired` - The same axis types in the requested order
    ///
    /// ## Example
    ///
    /// ```
    /// use axiscope::AxisType::*;
    /// use axiscope::reorder::Permutation;
    ///
    /// let perm = Permutation::from_order(
    ///     &[X, Y, Channel, Z, Time],
    ///     &[X, Y, Time, Channel, Z],
    /// ).unwrap();
    /// assert_eq!(perm.forward(), &[0, 1, 3, 4, 2]);
    /// ```
    pub fn from_order(current : &[AxisType], desired : &[AxisType])
        -> Result<Permutation, PermutationError> {
        if let Some(repeated) = desired.iter().duplicates().next() {
            return Err(PermutationError::DuplicateAxis(repeated.clone()));
        }
        if let Some(foreign) = desired.iter().find(|axis| !current.contains(axis)) {
            return Err(PermutationError::ForeignAxis(foreign.clone()));
        }
        let forward = current.iter().map(|axis| {
            desired.iter().position(|wanted| wanted == axis)
                .ok_or_else(|| PermutationError::MissingAxis(axis.clone()))
        }).collect::<Result<Vec<usize>, PermutationError>>()?;

        Ok(Permutation::from_forward(forward))
    }

    pub fn identity(rank : usize) -> Permutation {
        Permutation::from_forward((0..rank).collect())
    }

    fn from_forward(forward : Vec<usize>) -> Permutation {
        let mut inverse = vec![0; forward.len()];
        forward.iter().enumerate().for_each(|(old, &new)| inverse[new] = old);
        Permutation { forward, inverse }
    }

    pub fn rank(&self) -> usize {
        self.forward.len()
    }

    pub fn forward(&self) -> &[usize] {
        &self.forward
    }

    /// `inverse()[j]` is the old index of the axis that
    /// ends up at index `j`.
    pub fn inverse(&self) -> &[usize] {
        &self.inverse
    }

    pub fn is_identity(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &p)| i == p)
    }

    /// The permutation that undoes this one.
    pub fn inverted(&self) -> Permutation {
        Permutation {
            forward : self.inverse.clone(),
            inverse : self.forward.clone(),
        }
    }

    /// `permuted[forward[i]] = original[i]`, for positions
    /// or any other per-axis list.
    pub fn permute_into<T : Copy>(&self, original : &[T], permuted : &mut [T]) {
        debug_assert_eq!(original.len(), self.rank());
        debug_assert_eq!(permuted.len(), self.rank());
        for (i, &value) in original.iter().enumerate() {
            permuted[self.forward[i]] = value;
        }
    }

    /// Allocating version of `permute_into` for non-`Copy`
    /// per-axis data (e.g. `Axis`).
    pub fn permute<T : Clone>(&self, original : &[T]) -> Vec<T> {
        debug_assert_eq!(original.len(), self.rank());
        self.inverse.iter().map(|&old| original[old].clone()).collect()
    }
}
