//! Keeps per-plane color tables attached to the right planes
//! when a dataset is restructured.
//!
//! Color tables are indexed by plane, i.e. by the flattened
//! combination of the non-planar coordinates. When the axes are
//! reordered, the plane a table belongs to gets a new index, so
//! each table is moved from its old plane index to the new one.

use crate::data::{
    axis::Axis,
    dataset::{Dataset, DatasetError},
    planes,
};
use crate::reorder::permutation::Permutation;

/// The strategy used by `ColorTableRemapper`.
pub trait RemapAlgorithm {
    /// Whether the table on source plane `plane` should be
    /// carried over at all.
    fn is_valid_source_plane(&self, plane : usize) -> bool;

    /// Maps a source plane position to its destination plane
    /// position.
    ///
    /// ## Arguments
    ///
    /// * `old_plane_dims` - Extents of the source non-planar axes
    /// * `old_plane_pos` - Position of the source plane
    /// * `new_plane_pos` - Filled with the destination plane position
    fn remap_plane_position(
        &mut self,
        old_plane_dims : &[usize],
        old_plane_pos : &[usize],
        new_plane_pos : &mut [usize],
    );
}

/// Moves color tables from one dataset to another using
/// a `RemapAlgorithm`.
pub struct ColorTableRemapper<A : RemapAlgorithm> {
    algorithm : A,
}

impl<A : RemapAlgorithm> ColorTableRemapper<A> {
    pub fn new(algorithm : A) -> Self {
        ColorTableRemapper { algorithm }
    }

    /// Copies every valid source plane's table onto the
    /// corresponding plane of `dest`. Planes of `dest` that
    /// nothing maps onto are left as they are.
    ///
    /// ## Arguments
    ///
    /// * `source` - The dataset whose tables are read
    /// * `dest` - The dataset receiving the tables
    ///
    /// ## Returns
    ///
    /// * `Err(DatasetError::PlaneOutOfBounds)` if the algorithm maps
    /// a plane outside of `dest`
    pub fn remap(&mut self, source : &Dataset, dest : &mut Dataset) -> Result<(), DatasetError> {
        let old_plane_dims = source.plane_dims();
        let new_plane_dims = dest.plane_dims();
        let mut old_plane_pos = vec![0; old_plane_dims.len()];
        let mut new_plane_pos = vec![0; new_plane_dims.len()];

        for (plane, table) in source.color_tables().iter().enumerate() {
            if !self.algorithm.is_valid_source_plane(plane) {
                continue;
            }
            planes::index_to_position(plane, &old_plane_dims, &mut old_plane_pos);
            self.algorithm.remap_plane_position(&old_plane_dims, &old_plane_pos, &mut new_plane_pos);
            let new_index = planes::position_to_index(&new_plane_pos, &new_plane_dims);
            dest.set_color_table(new_index, table.clone())?;
        }
        Ok(())
    }
}

/// The remap consistent with an axis reorder. Planar
/// axes are held at 0 while the full position is permuted,
/// then stripped back out.
pub struct PermutationRemap {
    permutation : Permutation,
    old_planar : Vec<bool>,
    new_planar : Vec<bool>,
    input_pos : Vec<usize>,
    output_pos : Vec<usize>,
}

impl PermutationRemap {
    /// ## Arguments
    ///
    /// * `permutation` - The permutation applied to the samples
    /// * `old_axes` - The axes of the source dataset, in source order
    pub fn new(permutation : &Permutation, old_axes : &[Axis]) -> PermutationRemap {
        let old_planar : Vec<bool> = old_axes.iter()
            .map(|axis| axis.axis_type.is_xy())
            .collect();
        let new_planar = permutation.permute(&old_planar);
        PermutationRemap {
            permutation : permutation.clone(),
            old_planar,
            new_planar,
            input_pos : vec![0; permutation.rank()],
            output_pos : vec![0; permutation.rank()],
        }
    }
}

impl RemapAlgorithm for PermutationRemap {
    fn is_valid_source_plane(&self, _plane : usize) -> bool {
        true
    }

    fn remap_plane_position(
        &mut self,
        _old_plane_dims : &[usize],
        old_plane_pos : &[usize],
        new_plane_pos : &mut [usize],
    ) {
        let mut plane_coords = old_plane_pos.iter();
        for (pos, &planar) in self.input_pos.iter_mut().zip(self.old_planar.iter()) {
            *pos = if planar { 0 } else { *plane_coords.next().unwrap_or(&0) };
        }

        self.permutation.permute_into(&self.input_pos, &mut self.output_pos);

        self.output_pos.iter().zip(self.new_planar.iter())
            .filter(|(_, &planar)| !planar)
            .zip(new_plane_pos.iter_mut())
            .for_each(|((&pos, _), new_pos)| *new_pos = pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AxisType, ColorTable, Rgb};

    /// Drops every other plane, to exercise the
    /// `is_valid_source_plane` hook.
    struct EvenPlanesOnly;

    impl RemapAlgorithm for EvenPlanesOnly {
        fn is_valid_source_plane(&self, plane : usize) -> bool {
            plane % 2 == 0
        }

        fn remap_plane_position(&mut self, _dims : &[usize], old : &[usize], new : &mut [usize]) {
            new.copy_from_slice(old);
        }
    }

    fn dataset(types : &[AxisType], dims : &[usize]) -> Dataset {
        Dataset::zeros("d", types.iter().cloned().map(Axis::new).collect(), dims).unwrap()
    }

    fn tagged(plane : usize) -> ColorTable {
        let mut table = ColorTable::gray();
        table.set(0, Rgb::new(plane as u8, 0, 0));
        table
    }

    #[test]
    fn permutation_remap_moves_tables_with_planes() {
        use crate::data::AxisType::*;
        let mut source = dataset(&[X, Y, Channel, Z, Time], &[4, 3, 2, 5, 1]);
        for plane in 0..source.plane_count() {
            source.set_color_table(plane, Some(tagged(plane))).unwrap();
        }
        let perm = Permutation::from_order(
            &source.axis_types(),
            &[X, Y, Time, Channel, Z]
        ).unwrap();
        let mut dest = dataset(&[X, Y, Time, Channel, Z], &[4, 3, 1, 2, 5]);

        ColorTableRemapper::new(PermutationRemap::new(&perm, source.axes()))
            .remap(&source, &mut dest).unwrap();

        for c in 0..2 {
            for z in 0..5 {
                let old = source.plane_index(&[c, z, 0]).unwrap();
                let new = dest.plane_index(&[0, c, z]).unwrap();
                assert_eq!(dest.color_table(new), source.color_table(old));
            }
        }
    }

    #[test]
    fn planar_axes_need_not_lead() {
        use crate::data::AxisType::*;
        // X and Y interleaved with the non-planar axes
        let mut source = dataset(&[Channel, X, Z, Y], &[2, 4, 3, 5]);
        for plane in 0..source.plane_count() {
            source.set_color_table(plane, Some(tagged(plane))).unwrap();
        }
        let perm = Permutation::from_order(&source.axis_types(), &[X, Y, Z, Channel]).unwrap();
        let mut dest = dataset(&[X, Y, Z, Channel], &[4, 5, 3, 2]);

        ColorTableRemapper::new(PermutationRemap::new(&perm, source.axes()))
            .remap(&source, &mut dest).unwrap();

        for c in 0..2 {
            for z in 0..3 {
                assert_eq!(
                    dest.color_table(dest.plane_index(&[z, c]).unwrap()),
                    source.color_table(source.plane_index(&[c, z]).unwrap())
                );
            }
        }
    }

    #[test]
    fn invalid_source_planes_are_skipped() {
        use crate::data::AxisType::*;
        let mut source = dataset(&[X, Y, Z], &[2, 2, 4]);
        for plane in 0..4 {
            source.set_color_table(plane, Some(tagged(plane))).unwrap();
        }
        let mut dest = dataset(&[X, Y, Z], &[2, 2, 4]);
        ColorTableRemapper::new(EvenPlanesOnly).remap(&source, &mut dest).unwrap();

        assert_eq!(dest.color_table(0), Some(&tagged(0)));
        assert_eq!(dest.color_table(1), None);
        assert_eq!(dest.color_table(2), Some(&tagged(2)));
        assert_eq!(dest.color_table(3), None);
    }
}
