//! Error types for stitching and upload.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Typed failure reported by the stitching capability.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StitchFailure {
    /// Not enough feature matches between overlapping photos
    #[error("insufficient matches")]
    InsufficientMatches,

    /// Homography estimation failed
    #[error("homography failure")]
    HomographyFailure,

    /// Camera parameter adjustment failed
    #[error("camera parameter failure")]
    CameraParamFailure,

    /// Even the row-grouped fallback produced no image
    #[error("row fallback failure")]
    RowFallbackFailure,
}

impl StitchFailure {
    /// Wire code, as used in stitch responses.
    pub fn code(&self) -> &'static str {
        match self {
            StitchFailure::InsufficientMatches => "insufficient-matches",
            StitchFailure::HomographyFailure => "homography-failure",
            StitchFailure::CameraParamFailure => "camera-param-failure",
            StitchFailure::RowFallbackFailure => "row-fallback-failure",
        }
    }

    /// Parse a wire code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "insufficient-matches" => Some(StitchFailure::InsufficientMatches),
            "homography-failure" => Some(StitchFailure::HomographyFailure),
            "camera-param-failure" => Some(StitchFailure::CameraParamFailure),
            "row-fallback-failure" => Some(StitchFailure::RowFallbackFailure),
            _ => None,
        }
    }

    /// Map a stitcher process exit status (1 = matches, 2 = homography,
    /// 3 = camera params).
    pub fn from_exit_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(StitchFailure::InsufficientMatches),
            2 => Some(StitchFailure::HomographyFailure),
            3 => Some(StitchFailure::CameraParamFailure),
            _ => None,
        }
    }
}

/// Error from one call to a stitching capability.
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// The capability ran and reported a typed failure
    #[error("Stitching failed: {0}")]
    Failed(StitchFailure),

    /// The capability could not be run at all
    #[error("Stitcher unavailable: {0}")]
    Unavailable(String),

    #[error("Stitcher I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stitcher image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Invalid stitch configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StitchConfigError {
    #[error("canvas must be 2:1, got {width}x{height}")]
    Canvas { width: u32, height: u32 },

    #[error("jpeg_quality must be 1-100, got {0}")]
    JpegQuality(u8),

    #[error("row_bucket_deg must be positive, got {0}")]
    RowBucket(f32),
}

/// Orchestration error.
///
/// Only produced when no image at all could be made.
#[derive(Error, Debug)]
pub enum StitchError {
    #[error("Stitch failed: {}", .0.code())]
    Failure(StitchFailure),

    #[error("No photos to stitch")]
    NoPhotos,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Upload/stitch request error. The session returns to capturing.
#[derive(Error, Debug)]
pub enum UploadError {
    /// Service unreachable or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Deadline passed before a response arrived
    #[error("Stitch request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("Stitch request cancelled")]
    Cancelled,

    /// Service answered with a typed stitch failure
    #[error("Remote stitch failed: {}", .0.code())]
    Stitch(StitchFailure),

    /// Service answered with an untyped failure
    #[error("Stitch request rejected: {0}")]
    Rejected(String),

    #[error("Metadata serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StitchError>;
