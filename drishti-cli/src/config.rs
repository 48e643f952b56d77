//! Configuration loading for the drishti CLI

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use drishti_capture::CaptureConfig;
use drishti_stitch::StitchConfig;

use crate::error::{DrishtiError, Result};

/// Main configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DrishtiConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub stitch: StitchConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where finished sessions are sent
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// Stitch in-process
    #[default]
    Local,
    /// POST to a remote stitch service
    Http,
}

/// Stitch service settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub mode: UploadMode,

    /// Service base URL for http mode (default: http://127.0.0.1:8080)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deadline for health probe plus stitch request (default: 120000)
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

/// Output configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for panoramas and session manifests
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Directory the synthetic camera writes frames into
    #[serde(default = "default_frames_dir")]
    pub frames_dir: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            mode: UploadMode::default(),
            base_url: default_base_url(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            frames_dir: default_frames_dir(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}
fn default_deadline_ms() -> u64 {
    120_000
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_frames_dir() -> PathBuf {
    PathBuf::from("output/frames")
}

impl DrishtiConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: DrishtiConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.capture.validate()?;
        self.stitch.validate()?;
        if self.upload.deadline_ms == 0 {
            return Err(DrishtiError::Config(
                "upload.deadline_ms must be positive".to_string(),
            ));
        }
        if self.upload.mode == UploadMode::Http && self.upload.base_url.is_empty() {
            return Err(DrishtiError::Config(
                "upload.base_url is required in http mode".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = DrishtiConfig::from_toml("").unwrap();
        assert_eq!(config.upload.mode, UploadMode::Local);
        assert_eq!(config.upload.deadline_ms, 120_000);
        assert_eq!(config.output.dir, PathBuf::from("output"));
        assert_eq!(config.stitch.canvas_width, 4096);
        assert_eq!(config.capture.completion.min_photos, 6);
    }

    #[test]
    fn test_sections_parse() {
        let toml = r#"
            [capture.grid]
            min_pitch = -55.0
            max_pitch = 55.0

            [stitch]
            canvas_width = 1024
            canvas_height = 512

            [upload]
            mode = "http"
            base_url = "http://stitcher:9000"
            deadline_ms = 5000

            [output]
            dir = "/tmp/drishti"
        "#;
        let config = DrishtiConfig::from_toml(toml).unwrap();
        assert_eq!(config.capture.grid.max_pitch, 55.0);
        assert_eq!(config.stitch.canvas_height, 512);
        assert_eq!(config.upload.mode, UploadMode::Http);
        assert_eq!(config.upload.base_url, "http://stitcher:9000");
        assert_eq!(config.output.dir, PathBuf::from("/tmp/drishti"));
        assert_eq!(config.output.frames_dir, PathBuf::from("output/frames"));
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = DrishtiConfig::from_toml(include_str!("../../configs/drishti.toml")).unwrap();
        assert_eq!(config.capture.grid.min_pitch, -55.0);
        assert_eq!(config.capture.guides.global_elevations.len(), 5);
        assert!(config.stitch.command.is_none());
        assert_eq!(config.upload.mode, UploadMode::Local);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(DrishtiConfig::from_toml("[stitch]\ncanvas_width = 1000").is_err());
        assert!(DrishtiConfig::from_toml("[upload]\ndeadline_ms = 0").is_err());
        assert!(DrishtiConfig::from_toml("[upload]\nmode = \"carrier-pigeon\"").is_err());
    }
}
