//! Voxel grid generation.
//!
//! A grid is an N×N×N arrangement of equal cubes centered on the origin,
//! separated by a constant gap. Each cube's color is its normalized
//! coordinate read as RGB, so the grid spans the whole RGB color cube.

use glam::{UVec3, Vec3};

use crate::constants::{
    DEFAULT_FAINT_OPACITY, DEFAULT_GAP, DEFAULT_SEGMENTS, DEFAULT_SIZE, MAX_SEGMENTS,
    NEUTRAL_CHANNEL, OPAQUE,
};
use crate::error::ColorCubeError;
use crate::rows::TransparentRows;
use crate::types::{Rgb, VoxelCoord};

/// Shape parameters for a grid build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// Voxels along each axis.
    pub segments: u32,
    /// Edge length of the whole cube, gaps included.
    pub size: f32,
    /// Spacing between adjacent voxel faces.
    pub gap: f32,
    /// Opacity assigned to voxels in a transparent row.
    pub faint_opacity: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS,
            size: DEFAULT_SIZE,
            gap: DEFAULT_GAP,
            faint_opacity: DEFAULT_FAINT_OPACITY,
        }
    }
}

impl GridConfig {
    pub fn new(segments: u32, size: f32, gap: f32) -> Self {
        Self {
            segments,
            size,
            gap,
            ..Self::default()
        }
    }

    pub fn with_faint_opacity(mut self, opacity: f32) -> Self {
        self.faint_opacity = opacity;
        self
    }

    /// Edge length of a single voxel: `(size - gap * (segments - 1)) / segments`.
    pub fn edge_length(&self) -> f32 {
        let n = self.segments as f32;
        (self.size - self.gap * (n - 1.0)) / n
    }

    /// Total voxels, `segments³`, or `None` if that overflows `usize`.
    pub fn voxel_count(&self) -> Option<usize> {
        (self.segments as usize).checked_pow(3)
    }

    pub fn validate(&self) -> Result<(), ColorCubeError> {
        if self.segments == 0 || self.segments > MAX_SEGMENTS {
            return Err(ColorCubeError::InvalidSegments(self.segments));
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(ColorCubeError::InvalidSize(self.size));
        }
        if !self.gap.is_finite() || self.gap < 0.0 || self.edge_length() <= 0.0 {
            return Err(ColorCubeError::InvalidGap {
                gap: self.gap,
                size: self.size,
                segments: self.segments,
            });
        }
        if !(0.0..=1.0).contains(&self.faint_opacity) {
            return Err(ColorCubeError::InvalidOpacity(self.faint_opacity));
        }
        Ok(())
    }

    /// World-space center along one axis for row `index`.
    pub fn axis_center(&self, index: u32) -> f32 {
        let edge = self.edge_length();
        -self.size / 2.0 + edge / 2.0 + index as f32 * (edge + self.gap)
    }

    /// Color channel for row `index`; `index / (segments - 1)`.
    pub fn channel(&self, index: u32) -> f32 {
        if self.segments <= 1 {
            NEUTRAL_CHANNEL
        } else {
            index as f32 / (self.segments - 1) as f32
        }
    }
}

/// One cube of the grid, ready to hand to a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voxel {
    pub coord: VoxelCoord,
    pub color: Rgb,
    pub center: Vec3,
    pub transparent: bool,
    pub opacity: f32,
}

/// A fully built grid. Voxels are stored x-major: `x * n² + y * n + z`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    config: GridConfig,
    edge: f32,
    voxels: Vec<Voxel>,
}

/// Build a grid from scratch. Pure: the same inputs always give the same grid.
pub fn build(config: &GridConfig, rows: &TransparentRows) -> Result<VoxelGrid, ColorCubeError> {
    config.validate()?;

    let n = config.segments;
    let edge = config.edge_length();
    let count = config
        .voxel_count()
        .ok_or(ColorCubeError::InvalidSegments(n))?;
    let mut voxels = Vec::with_capacity(count);

    for x in 0..n {
        for y in 0..n {
            for z in 0..n {
                let coord = UVec3::new(x, y, z);
                let transparent = rows.is_transparent(coord);
                voxels.push(Voxel {
                    coord,
                    color: Rgb::new(config.channel(x), config.channel(y), config.channel(z)),
                    center: Vec3::new(
                        config.axis_center(x),
                        config.axis_center(y),
                        config.axis_center(z),
                    ),
                    transparent,
                    opacity: if transparent {
                        config.faint_opacity
                    } else {
                        OPAQUE
                    },
                });
            }
        }
    }

    log::debug!(
        "built {}^3 grid: edge {:.4}, {} transparent",
        n,
        edge,
        voxels.iter().filter(|v| v.transparent).count()
    );

    Ok(VoxelGrid {
        config: *config,
        edge,
        voxels,
    })
}

impl VoxelGrid {
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn segments(&self) -> u32 {
        self.config.segments
    }

    pub fn edge_length(&self) -> f32 {
        self.edge
    }

    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    pub fn get(&self, coord: VoxelCoord) -> Option<&Voxel> {
        let n = self.config.segments;
        if coord.x >= n || coord.y >= n || coord.z >= n {
            return None;
        }
        let n = n as usize;
        let idx = coord.x as usize * n * n + coord.y as usize * n + coord.z as usize;
        self.voxels.get(idx)
    }

    pub fn transparent_count(&self) -> usize {
        self.voxels.iter().filter(|v| v.transparent).count()
    }

    pub fn opaque_count(&self) -> usize {
        self.len() - self.transparent_count()
    }

    /// Axis-aligned bounds `(min, max)` of one voxel.
    pub fn voxel_bounds(&self, voxel: &Voxel) -> (Vec3, Vec3) {
        let half = Vec3::splat(self.edge / 2.0);
        (voxel.center - half, voxel.center + half)
    }
}
