//! Viewer configuration, loaded from RON.

use serde::Deserialize;

use crate::constants::{
    DEFAULT_FAINT_OPACITY, DEFAULT_GAP, DEFAULT_SEGMENTS, DEFAULT_SIZE, MAX_SEGMENTS,
};
use crate::error::ColorCubeError;
use crate::grid::GridConfig;

/// The configuration bundled with the viewer.
pub const EMBEDDED_CONFIG: &str = include_str!("../../../config/default.ron");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridSection {
    pub segments: u32,
    pub size: f32,
    pub gap: f32,
    /// Slider range for the segment count.
    pub min_segments: u32,
    pub max_segments: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransparencySection {
    pub faint_opacity: f32,
    /// Whether the hover picker stops at transparent voxels.
    pub pick_transparent: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraSection {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub initial_eye: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of buffered orbit input applied per frame; 0 disables damping.
    pub damping: f32,
    pub flight_seconds: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraPreset {
    pub name: String,
    pub eye: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ViewerConfig {
    pub grid: GridSection,
    pub transparency: TransparencySection,
    pub camera: CameraSection,
    pub presets: Vec<CameraPreset>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let preset = |name: &str, eye: [f32; 3]| CameraPreset {
            name: name.to_string(),
            eye,
        };
        Self {
            grid: GridSection {
                segments: DEFAULT_SEGMENTS,
                size: DEFAULT_SIZE,
                gap: DEFAULT_GAP,
                min_segments: 2,
                max_segments: 12,
            },
            transparency: TransparencySection {
                faint_opacity: DEFAULT_FAINT_OPACITY,
                pick_transparent: true,
            },
            camera: CameraSection {
                fov_y_deg: 75.0,
                near: 0.1,
                far: 1000.0,
                initial_eye: [0.0, 0.0, 7.5],
                min_distance: 1.0,
                max_distance: 10.0,
                damping: 0.25,
                flight_seconds: 0.5,
            },
            presets: vec![
                preset("Front", [0.0, 0.0, 7.5]),
                preset("Top", [0.0, 7.5, 0.01]),
                preset("Side", [-7.5, 0.0, 0.0]),
            ],
        }
    }
}

impl ViewerConfig {
    /// Parse and validate a RON document.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, ColorCubeError> {
        let options = ron::Options::default();
        let config: ViewerConfig = options
            .from_str(ron_str)
            .map_err(|e| ColorCubeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The bundled `config/default.ron`.
    pub fn embedded() -> Result<Self, ColorCubeError> {
        Self::from_ron_str(EMBEDDED_CONFIG)
    }

    /// Grid shape at the configured starting segment count.
    pub fn grid_config(&self) -> GridConfig {
        GridConfig::new(self.grid.segments, self.grid.size, self.grid.gap)
            .with_faint_opacity(self.transparency.faint_opacity)
    }

    pub fn validate(&self) -> Result<(), ColorCubeError> {
        let g = &self.grid;
        if g.min_segments == 0 || g.min_segments > g.max_segments {
            return Err(ColorCubeError::InvalidConfig(format!(
                "segment range {}..={} is empty or starts at zero",
                g.min_segments, g.max_segments
            )));
        }
        if g.max_segments > MAX_SEGMENTS {
            return Err(ColorCubeError::InvalidConfig(format!(
                "max_segments {} exceeds {MAX_SEGMENTS}",
                g.max_segments
            )));
        }
        if !(g.min_segments..=g.max_segments).contains(&g.segments) {
            return Err(ColorCubeError::SegmentsOutOfRange {
                value: g.segments,
                min: g.min_segments,
                max: g.max_segments,
            });
        }
        // The largest segment count must still leave room between gaps.
        self.grid_config().validate()?;
        GridConfig::new(g.max_segments, g.size, g.gap).validate()?;

        let c = &self.camera;
        if !(c.fov_y_deg > 0.0 && c.fov_y_deg < 180.0) {
            return Err(ColorCubeError::InvalidConfig(format!(
                "fov_y_deg {} outside (0, 180)",
                c.fov_y_deg
            )));
        }
        if !(c.near > 0.0 && c.near < c.far) {
            return Err(ColorCubeError::InvalidConfig(format!(
                "clip planes near={} far={} must satisfy 0 < near < far",
                c.near, c.far
            )));
        }
        if !(c.min_distance > 0.0 && c.min_distance <= c.max_distance) {
            return Err(ColorCubeError::InvalidConfig(format!(
                "zoom range {}..={} is invalid",
                c.min_distance, c.max_distance
            )));
        }
        if !(0.0..1.0).contains(&c.damping) {
            return Err(ColorCubeError::InvalidConfig(format!(
                "damping {} outside [0, 1)",
                c.damping
            )));
        }
        if c.flight_seconds <= 0.0 {
            return Err(ColorCubeError::InvalidConfig(format!(
                "flight_seconds must be positive, got {}",
                c.flight_seconds
            )));
        }
        if self.presets.is_empty() {
            return Err(ColorCubeError::InvalidConfig(
                "at least one camera preset is required".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_parses() {
        let config = ViewerConfig::embedded().expect("bundled config is valid");
        assert_eq!(config.grid.segments, 5);
        assert_eq!(config.presets.len(), 3);
        assert_eq!(config.presets[1].name, "Top");
    }

    #[test]
    fn test_embedded_matches_default() {
        let config = ViewerConfig::embedded().expect("bundled config is valid");
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_default_validates() {
        ViewerConfig::default()
            .validate()
            .expect("default config is valid");
    }

    #[test]
    fn test_grid_config_carries_opacity() {
        let mut config = ViewerConfig::default();
        config.transparency.faint_opacity = 0.2;
        let grid = config.grid_config();
        assert_eq!(grid.segments, 5);
        assert_eq!(grid.faint_opacity, 0.2);
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        let err = ViewerConfig::from_ron_str("(grid: (segments: ");
        assert!(matches!(err, Err(ColorCubeError::ConfigParse(_))));
    }

    #[test]
    fn test_segments_outside_range_rejected() {
        let mut config = ViewerConfig::default();
        config.grid.segments = 40;
        assert!(matches!(
            config.validate(),
            Err(ColorCubeError::SegmentsOutOfRange { value: 40, .. })
        ));
    }

    #[test]
    fn test_gap_too_wide_for_max_segments() {
        let mut config = ViewerConfig::default();
        config.grid.gap = 0.5;
        config.grid.max_segments = 12;
        // 11 gaps of 0.5 exceed the size of 5.0.
        assert!(matches!(
            config.validate(),
            Err(ColorCubeError::InvalidGap { segments: 12, .. })
        ));
    }

    #[test]
    fn test_unbounded_max_segments_rejected() {
        let mut config = ViewerConfig::default();
        config.grid.gap = 0.0;
        config.grid.max_segments = 3_000_000;
        assert!(matches!(
            config.validate(),
            Err(ColorCubeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bad_damping_rejected() {
        let mut config = ViewerConfig::default();
        config.camera.damping = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ColorCubeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_presets_rejected() {
        let mut config = ViewerConfig::default();
        config.presets.clear();
        assert!(config.validate().is_err());
    }
}
