//! Stitch request/response contract.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use drishti_capture::{OrientationRecord, StitchJob};

/// Capture type sent with every request.
pub const SPHERICAL_CAPTURE: &str = "spherical";

/// Metadata part of a stitch request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StitchMetadata {
    pub capture_type: String,
    pub photo_count: usize,
    pub orientations: Vec<OrientationRecord>,
    /// Request creation time (unix ms)
    pub timestamp: u64,
}

/// One image part of a stitch request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePart {
    /// Form field name, `image_<n>` with n from 1
    pub name: String,
    pub path: PathBuf,
}

impl ImagePart {
    /// MIME type from the file extension.
    pub fn content_type(&self) -> &'static str {
        match self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            _ => "application/octet-stream",
        }
    }

    /// File name sent with the part.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// A stitch request: one metadata part plus N image parts in capture order.
#[derive(Clone, Debug, PartialEq)]
pub struct StitchRequest {
    pub metadata: StitchMetadata,
    pub images: Vec<ImagePart>,
}

impl StitchRequest {
    /// Build the request from a finished session.
    ///
    /// The orientation list is the session's own record, unchanged.
    pub fn from_job(job: &StitchJob, timestamp: u64) -> Self {
        let images = job
            .photos
            .iter()
            .enumerate()
            .map(|(i, photo)| ImagePart {
                name: format!("image_{}", i + 1),
                path: photo.image.path().to_path_buf(),
            })
            .collect();
        Self {
            metadata: StitchMetadata {
                capture_type: SPHERICAL_CAPTURE.to_string(),
                photo_count: job.photos.len(),
                orientations: job.record.clone(),
                timestamp,
            },
            images,
        }
    }

    /// Serialized metadata part.
    pub fn metadata_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.metadata)
    }
}

/// Stitch response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StitchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StitchResponse {
    pub fn succeeded(output_ref: impl Into<String>) -> Self {
        Self {
            success: true,
            output_ref: Some(output_ref.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output_ref: None,
            error: Some(error.into()),
        }
    }
}

/// Health probe response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
