//! Error types for the drishti CLI

use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum DrishtiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Replay error: {0}")]
    Replay(String),

    #[error("Capture error: {0}")]
    Capture(#[from] drishti_capture::SchedulerError),

    #[error("Stitch error: {0}")]
    Stitch(#[from] drishti_stitch::StitchError),

    #[error("Upload error: {0}")]
    Upload(#[from] drishti_stitch::UploadError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl From<toml::de::Error> for DrishtiError {
    fn from(e: toml::de::Error) -> Self {
        DrishtiError::Config(e.to_string())
    }
}

impl From<drishti_capture::ConfigError> for DrishtiError {
    fn from(e: drishti_capture::ConfigError) -> Self {
        DrishtiError::Config(e.to_string())
    }
}

impl From<drishti_stitch::StitchConfigError> for DrishtiError {
    fn from(e: drishti_stitch::StitchConfigError) -> Self {
        DrishtiError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DrishtiError>;
