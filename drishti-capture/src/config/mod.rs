//! Capture configuration loaded from TOML with defaults for every field.
//!
//! ## Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`GridSection`] | Cell size and capture band |
//! | [`CameraSection`] | Field of view and JPEG quality |
//! | [`FootprintSection`] | Half-spans one photo marks as covered |
//! | [`AutoCaptureConfig`] | Stability, cooldown and overlap rules |
//! | [`GuideConfig`] | Frontier probe factors and global lattice |
//! | [`CompletionSection`] | Target coverage and minimum photo count |
//!
//! ## Example TOML
//!
//! ```toml
//! [grid]
//! cell_size_deg = 5.0
//! min_pitch = -55.0        # capture band
//! max_pitch = 55.0
//!
//! [camera]
//! h_fov_deg = 80.0
//! v_fov_deg = 100.0
//!
//! [footprint]
//! yaw_span_deg = 40.0      # half-spans
//! pitch_span_deg = 50.0
//!
//! [auto_capture]
//! stability_threshold_dps = 15.0
//! cooldown_ms = 1500
//!
//! [completion]
//! target_coverage = 0.85
//! min_photos = 6
//! ```

pub(crate) mod defaults;
mod sections;

pub use sections::{CameraSection, CompletionSection, FootprintSection, GridSection};

pub use crate::guide::GuideConfig;
pub use crate::scheduler::AutoCaptureConfig;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Full capture configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default)]
    pub grid: GridSection,

    #[serde(default)]
    pub camera: CameraSection,

    #[serde(default)]
    pub footprint: FootprintSection,

    #[serde(default)]
    pub auto_capture: AutoCaptureConfig,

    #[serde(default)]
    pub guides: GuideConfig,

    #[serde(default)]
    pub completion: CompletionSection,
}

impl CaptureConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the scheduler cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        let cell = self.grid.cell_size_deg;
        if !(cell > 0.0 && cell <= 90.0) {
            return invalid(format!("grid.cell_size_deg must be in (0, 90], got {cell}"));
        }
        if self.grid.min_pitch >= self.grid.max_pitch {
            return invalid(format!(
                "grid.min_pitch ({}) must be below grid.max_pitch ({})",
                self.grid.min_pitch, self.grid.max_pitch
            ));
        }
        if self.camera.h_fov_deg <= 0.0 || self.camera.v_fov_deg <= 0.0 {
            return invalid("camera field of view must be positive".to_string());
        }
        if !(1..=100).contains(&self.camera.jpeg_quality) {
            return invalid(format!(
                "camera.jpeg_quality must be 1-100, got {}",
                self.camera.jpeg_quality
            ));
        }
        if self.footprint.yaw_span_deg < 0.0 || self.footprint.pitch_span_deg < 0.0 {
            return invalid("footprint spans must not be negative".to_string());
        }
        let target = self.completion.target_coverage;
        if !(target > 0.0 && target <= 1.0) {
            return invalid(format!(
                "completion.target_coverage must be in (0, 1], got {target}"
            ));
        }
        if self.completion.min_photos == 0 {
            return invalid("completion.min_photos must be at least 1".to_string());
        }
        if self.guides.global_azimuths == 0 {
            return invalid("guides.global_azimuths must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CaptureConfig::default();
        assert_eq!(config.grid.cell_size_deg, 5.0);
        assert_eq!(config.completion.min_photos, 6);
        assert_eq!(config.auto_capture.cooldown_ms, 1500);
        assert_eq!(config.guides.global_elevations.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CaptureConfig::from_toml(
            r#"
            [grid]
            min_pitch = -55.0
            max_pitch = 55.0

            [footprint]
            yaw_span_deg = 40.0
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.cell_size_deg, 5.0);
        assert_eq!(config.grid.to_grid().rows(), 22);
        assert_eq!(config.footprint.yaw_span_deg, 40.0);
        assert_eq!(config.footprint.pitch_span_deg, 40.0);
        assert_eq!(config.camera.jpeg_quality, 92);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = CaptureConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed = CaptureConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.guides.dedup_radius_deg, config.guides.dedup_radius_deg);
        assert_eq!(parsed.auto_capture.tick_interval_ms, config.auto_capture.tick_interval_ms);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = CaptureConfig::from_toml("[completion]\ntarget_coverage = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = CaptureConfig::from_toml("[grid]\nmin_pitch = 10.0\nmax_pitch = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = CaptureConfig::from_toml("[grid\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
