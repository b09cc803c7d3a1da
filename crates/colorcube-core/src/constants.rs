//! Shared constants. Values the viewer may want to tune live in
//! `config/default.ron`; these are the fixed ones.

/// Opacity of a voxel that is not in any transparent row.
pub const OPAQUE: f32 = 1.0;

/// Default opacity for voxels in a transparent row.
pub const DEFAULT_FAINT_OPACITY: f32 = 0.04;

/// Color given to every voxel when the grid has a single segment
/// (the per-axis normalization divides by `segments - 1`).
pub const NEUTRAL_CHANNEL: f32 = 0.5;

/// Largest segment count a grid may be built with.
pub const MAX_SEGMENTS: u32 = 256;

/// Default segment count on startup.
pub const DEFAULT_SEGMENTS: u32 = 5;

/// Default overall edge length of the whole cube in world units.
pub const DEFAULT_SIZE: f32 = 5.0;

/// Default spacing between adjacent voxel faces.
pub const DEFAULT_GAP: f32 = 0.05;

/// Distance below which ray/box parameters are treated as equal.
pub const RAY_EPSILON: f32 = 1e-6;
