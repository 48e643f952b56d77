//! Error types for capture guidance.

use thiserror::Error;

use crate::scheduler::CaptureState;

/// Camera failure while taking a photo.
///
/// Never fatal to the session: the in-flight flag clears and capturing
/// continues.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The shutter call failed
    #[error("Shutter failed: {0}")]
    Shutter(String),

    /// Camera access was refused
    #[error("Camera permission denied")]
    PermissionDenied,

    /// Writing or reading the captured frame failed
    #[error("Frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The orientation stream cannot provide a heading.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Orientation unavailable: reporting fallback orientation")]
pub struct OrientationUnavailable;

/// Finalizing a session with too few photos.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Need at least {minimum} photos to finish, have {photo_count}")]
pub struct ValidationError {
    pub photo_count: usize,
    pub minimum: usize,
}

/// Lifecycle errors from the capture scheduler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Operation not allowed in the current lifecycle state
    #[error("Cannot {op} while {state:?}")]
    InvalidState {
        op: &'static str,
        state: CaptureState,
    },

    /// Finalize rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A capture is already outstanding; the request was dropped
    #[error("Capture already in flight, request rejected")]
    CaptureInFlight,
}

/// Configuration load error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
