use thiserror::Error;

/// Errors that can occur while configuring, building, or displaying the cube.
#[derive(Debug, Error)]
pub enum ColorCubeError {
    #[error("segment count must be at least 1, got {0}")]
    InvalidSegments(u32),

    #[error("segment count {value} outside allowed range {min}..={max}")]
    SegmentsOutOfRange { value: u32, min: u32, max: u32 },

    #[error("overall size must be positive and finite, got {0}")]
    InvalidSize(f32),

    #[error("gap {gap} leaves no room for {segments} segments in size {size}")]
    InvalidGap { gap: f32, size: f32, segments: u32 },

    #[error("opacity must lie in [0, 1], got {0}")]
    InvalidOpacity(f32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse config RON: {0}")]
    ConfigParse(String),

    #[error("DOM lookup failed: {0}")]
    Dom(String),

    #[error("WebGPU adapter not found: {0}")]
    AdapterNotFound(String),

    #[error("Failed to request GPU device: {0}")]
    DeviceRequestFailed(String),

    #[error("Surface configuration failed: {0}")]
    SurfaceConfigFailed(String),
}
