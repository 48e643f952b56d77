//! Stitch configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::StitchConfigError;

/// Stitch orchestration settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StitchConfig {
    /// Output canvas width (pixels); must be twice the height
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,

    /// Output canvas height (pixels)
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,

    /// Output JPEG quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Pixels whose brightest channel is at or below this count as empty
    /// canvas when cropping
    #[serde(default = "default_black_threshold")]
    pub black_threshold: u8,

    /// Pitch bucket size for ordering and row fallback (degrees)
    #[serde(default = "default_row_bucket_deg")]
    pub row_bucket_deg: f32,

    /// External stitcher program; the in-memory stitcher is used without it
    #[serde(default)]
    pub command: Option<CommandConfig>,
}

/// External stitcher program settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Program to run
    pub program: PathBuf,

    /// Arguments placed before `--output <file> <inputs...>`
    #[serde(default)]
    pub args: Vec<String>,

    /// Parent directory for per-call working directories (system temp dir
    /// if unset)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            jpeg_quality: default_jpeg_quality(),
            black_threshold: default_black_threshold(),
            row_bucket_deg: default_row_bucket_deg(),
            command: None,
        }
    }
}

impl StitchConfig {
    /// Check the canvas is 2:1 and the numeric ranges make sense.
    pub fn validate(&self) -> Result<(), StitchConfigError> {
        if self.canvas_height == 0 || self.canvas_width != 2 * self.canvas_height {
            return Err(StitchConfigError::Canvas {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(StitchConfigError::JpegQuality(self.jpeg_quality));
        }
        if self.row_bucket_deg <= 0.0 {
            return Err(StitchConfigError::RowBucket(self.row_bucket_deg));
        }
        Ok(())
    }
}

// Default value functions
fn default_canvas_width() -> u32 {
    4096
}
fn default_canvas_height() -> u32 {
    2048
}
fn default_jpeg_quality() -> u8 {
    90
}
fn default_black_threshold() -> u8 {
    8
}
fn default_row_bucket_deg() -> f32 {
    30.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = StitchConfig::default();
        assert_eq!((config.canvas_width, config.canvas_height), (4096, 2048));
        assert_eq!(config.jpeg_quality, 90);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_equirectangular_canvas_rejected() {
        let config = StitchConfig {
            canvas_width: 4000,
            ..StitchConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(StitchConfigError::Canvas {
                width: 4000,
                height: 2048
            })
        );
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let config = StitchConfig {
            jpeg_quality: 0,
            ..StitchConfig::default()
        };
        assert_eq!(config.validate(), Err(StitchConfigError::JpegQuality(0)));

        let config = StitchConfig {
            row_bucket_deg: -5.0,
            ..StitchConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StitchConfigError::RowBucket(_))
        ));
    }
}
