//! Application state: the current grid and the inputs it was built from.

use crate::config::ViewerConfig;
use crate::error::ColorCubeError;
use crate::grid::{self, GridConfig, VoxelGrid};
use crate::rows::TransparentRows;
use crate::types::Axis;

/// Owns the current grid and rebuilds it whenever an input changes.
///
/// Every rebuild drops the previous grid before the new one is installed and
/// bumps `generation`, which the renderer compares to decide when to
/// re-upload GPU buffers.
pub struct CubeState {
    shape: GridConfig,
    min_segments: u32,
    max_segments: u32,
    thresholds: [u32; 3],
    rows: TransparentRows,
    grid: Option<VoxelGrid>,
    generation: u64,
}

impl CubeState {
    /// Build the initial grid from `config`.
    pub fn new(config: &ViewerConfig) -> Result<Self, ColorCubeError> {
        config.validate()?;
        let mut state = Self {
            shape: config.grid_config(),
            min_segments: config.grid.min_segments,
            max_segments: config.grid.max_segments,
            thresholds: [0; 3],
            rows: TransparentRows::new(),
            grid: None,
            generation: 0,
        };
        state.rebuild()?;
        Ok(state)
    }

    pub fn segments(&self) -> u32 {
        self.shape.segments
    }

    pub fn segment_range(&self) -> (u32, u32) {
        (self.min_segments, self.max_segments)
    }

    pub fn threshold(&self, axis: Axis) -> u32 {
        self.thresholds[axis.index()]
    }

    pub fn rows(&self) -> &TransparentRows {
        &self.rows
    }

    pub fn grid(&self) -> Option<&VoxelGrid> {
        self.grid.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Change the segment count and rebuild.
    ///
    /// Any axis threshold that no longer fits (`>= segments`) is pulled back
    /// to `segments - 1`. Each axis is clamped on its own.
    pub fn set_segments(&mut self, segments: u32) -> Result<(), ColorCubeError> {
        if !(self.min_segments..=self.max_segments).contains(&segments) {
            return Err(ColorCubeError::SegmentsOutOfRange {
                value: segments,
                min: self.min_segments,
                max: self.max_segments,
            });
        }
        GridConfig {
            segments,
            ..self.shape
        }
        .validate()?;

        self.shape.segments = segments;
        for axis in Axis::ALL {
            let threshold = self.thresholds[axis.index()];
            if threshold >= segments {
                let clamped = segments.saturating_sub(1);
                log::debug!("clamping {} threshold {threshold} -> {clamped}", axis.label());
                self.thresholds[axis.index()] = clamped;
                self.rows.set_threshold(axis, clamped);
            }
        }
        self.rebuild()
    }

    /// Make rows `0..threshold` on `axis` transparent and rebuild.
    ///
    /// Thresholds past the last row are clamped to `segments`.
    pub fn set_transparent_rows(&mut self, axis: Axis, threshold: u32) -> Result<(), ColorCubeError> {
        let threshold = threshold.min(self.shape.segments);
        self.thresholds[axis.index()] = threshold;
        self.rows.set_threshold(axis, threshold);
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<(), ColorCubeError> {
        let next = grid::build(&self.shape, &self.rows)?;
        // Release the old grid before installing the new one.
        drop(self.grid.take());
        self.grid = Some(next);
        self.generation += 1;
        log::debug!(
            "grid generation {}: {} segments, thresholds {:?}",
            self.generation,
            self.shape.segments,
            self.thresholds
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> CubeState {
        CubeState::new(&ViewerConfig::default()).expect("default config is valid")
    }

    #[test]
    fn test_initial_grid_present() {
        let s = state();
        let grid = s.grid().expect("built on startup");
        assert_eq!(grid.len(), 125);
        assert_eq!(s.generation(), 1);
    }

    #[test]
    fn test_set_transparent_rows_rebuilds() {
        let mut s = state();
        s.set_transparent_rows(Axis::X, 2).expect("rebuild succeeds");
        assert_eq!(s.generation(), 2);

        let grid = s.grid().expect("grid present");
        for v in grid.voxels() {
            assert_eq!(v.transparent, v.coord.x < 2, "voxel {:?}", v.coord);
            let expected = if v.coord.x < 2 { 0.04 } else { 1.0 };
            assert_eq!(v.opacity, expected);
        }
    }

    #[test]
    fn test_axis_thresholds_independent() {
        let mut s = state();
        s.set_transparent_rows(Axis::Y, 3).expect("rebuild succeeds");
        s.set_transparent_rows(Axis::Z, 1).expect("rebuild succeeds");
        assert_eq!(s.threshold(Axis::X), 0);
        assert_eq!(s.threshold(Axis::Y), 3);
        assert_eq!(s.threshold(Axis::Z), 1);
        assert_eq!(s.rows().rows(Axis::Y).len(), 3);
        assert!(s.rows().rows(Axis::X).is_empty());
    }

    #[test]
    fn test_set_segments_rebuilds_with_new_size() {
        let mut s = state();
        s.set_segments(3).expect("in range");
        assert_eq!(s.segments(), 3);
        assert_eq!(s.grid().expect("grid present").len(), 27);
    }

    #[test]
    fn test_set_segments_clamps_each_axis_independently() {
        let mut s = state();
        s.set_transparent_rows(Axis::X, 4).expect("rebuild succeeds");
        s.set_transparent_rows(Axis::Y, 1).expect("rebuild succeeds");
        s.set_transparent_rows(Axis::Z, 3).expect("rebuild succeeds");

        s.set_segments(3).expect("in range");
        assert_eq!(s.threshold(Axis::X), 2);
        assert_eq!(s.threshold(Axis::Y), 1);
        assert_eq!(s.threshold(Axis::Z), 2);

        let grid = s.grid().expect("grid present");
        // x and z rows 0..2 are faint, so only x = z = 2 with y >= 1 stays opaque.
        assert_eq!(grid.opaque_count(), 2);
    }

    #[test]
    fn test_oversized_threshold_clamped_to_segments() {
        let mut s = state();
        s.set_transparent_rows(Axis::X, 20_000_000)
            .expect("rebuild succeeds");
        assert_eq!(s.threshold(Axis::X), 5);
        assert_eq!(s.rows().rows(Axis::X).len(), 5);
        let grid = s.grid().expect("grid present");
        assert_eq!(grid.transparent_count(), 125);

        s.set_transparent_rows(Axis::Y, u32::MAX).expect("rebuild succeeds");
        assert!(s.rows().rows(Axis::Y).len() <= s.segments() as usize);
    }

    #[test]
    fn test_set_segments_out_of_range() {
        let mut s = state();
        let before = s.generation();
        assert!(matches!(
            s.set_segments(1),
            Err(ColorCubeError::SegmentsOutOfRange { value: 1, .. })
        ));
        assert!(s.set_segments(99).is_err());
        assert_eq!(s.segments(), 5);
        assert_eq!(s.generation(), before);
    }

    #[test]
    fn test_same_inputs_same_grid() {
        let mut a = state();
        let mut b = state();
        a.set_transparent_rows(Axis::Z, 2).expect("rebuild succeeds");
        b.set_transparent_rows(Axis::Z, 2).expect("rebuild succeeds");
        assert_eq!(a.grid(), b.grid());
    }
}
