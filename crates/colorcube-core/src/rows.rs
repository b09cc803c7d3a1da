use std::collections::BTreeSet;

use crate::types::{Axis, VoxelCoord};

/// Per-axis sets of row indices rendered at reduced opacity.
///
/// A voxel is transparent when its coordinate on any axis is a member of
/// that axis's set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransparentRows {
    sets: [BTreeSet<u32>; 3],
}

impl TransparentRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `axis`'s set with `0..threshold` ("reveal from row 0 upward").
    pub fn set_threshold(&mut self, axis: Axis, threshold: u32) {
        self.sets[axis.index()] = (0..threshold).collect();
    }

    /// Mark a single row transparent without touching the others.
    pub fn insert(&mut self, axis: Axis, row: u32) -> bool {
        self.sets[axis.index()].insert(row)
    }

    pub fn contains(&self, axis: Axis, row: u32) -> bool {
        self.sets[axis.index()].contains(&row)
    }

    pub fn rows(&self, axis: Axis) -> &BTreeSet<u32> {
        &self.sets[axis.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(BTreeSet::is_empty)
    }

    pub fn is_transparent(&self, coord: VoxelCoord) -> bool {
        Axis::ALL
            .iter()
            .any(|&axis| self.contains(axis, axis.component(coord)))
    }
}
