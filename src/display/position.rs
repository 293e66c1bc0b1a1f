//! Per-axis cursor positions of a display.

use std::collections::HashMap;

use crate::data::axis::AxisType;
use crate::display::interval::CombinedInterval;

/// Tracks one integer position per non-planar axis, plus
/// which of those axes navigation currently acts on.
///
/// Every stored position lies within the bounds of its axis in
/// the interval last passed to `sync`, and the active axis (if
/// any) is always a tracked one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionTracker {
    positions : HashMap<AxisType, i64>,
    active : Option<AxisType>,
}

/// Clamps into `[min, max]`. An empty axis (`max < min`)
/// pins everything to `min`.
fn clamp(value : i64, min : i64, max : i64) -> i64 {
    value.min(max).max(min)
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracked(&self, axis : &AxisType) -> bool {
        self.positions.contains_key(axis)
    }

    pub fn get(&self, axis : &AxisType) -> Option<i64> {
        self.positions.get(axis).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Stores `value` clamped into `[min, max]` and returns
    /// what was stored.
    pub fn set_clamped(&mut self, axis : &AxisType, value : i64, min : i64, max : i64) -> i64 {
        let clamped = clamp(value, min, max);
        self.positions.insert(axis.clone(), clamped);
        clamped
    }

    pub fn active(&self) -> Option<&AxisType> {
        self.active.as_ref()
    }

    /// Makes `axis` the active axis. Returns `false` (and
    /// changes nothing) if the axis isn't tracked.
    pub fn set_active(&mut self, axis : &AxisType) -> bool {
        if !self.is_tracked(axis) {
            return false;
        }
        self.active = Some(axis.clone());
        true
    }

    /// Brings the tracked axes in line with `interval`:
    ///
    /// * axes no longer in the interval are forgotten (and stop
    /// being active)
    /// * new non-planar axes start at their minimum
    /// * surviving positions are clamped to the new bounds
    ///
    /// ## Returns
    ///
    /// The axis that became active, if there was no active axis
    /// and one could be chosen (the first non-planar axis).
    pub fn sync(&mut self, interval : &CombinedInterval) -> Option<AxisType> {
        self.positions.retain(|axis, _| interval.axis_index(axis).is_some());
        if let Some(active) = &self.active {
            if !self.positions.contains_key(active) {
                self.active = None;
            }
        }

        for (d, axis) in interval.axes().iter().enumerate() {
            if axis.axis_type.is_xy() {
                continue;
            }
            let (min, max) = (interval.min(d), interval.max(d));
            let position = self.positions.entry(axis.axis_type.clone()).or_insert(min);
            *position = clamp(*position, min, max);
        }

        if self.active.is_some() {
            return None;
        }
        self.active = interval.axes().iter()
            .map(|axis| &axis.axis_type)
            .find(|axis_type| !axis_type.is_xy())
            .cloned();
        self.active.clone()
    }

    /// Positions of the tracked axes, in the order of
    /// `interval`'s axes.
    pub fn snapshot(&self, interval : &CombinedInterval) -> Vec<(AxisType, i64)> {
        interval.axes().iter()
            .filter_map(|axis| {
                self.get(&axis.axis_type).map(|pos| (axis.axis_type.clone(), pos))
            })
            .collect()
    }
}
