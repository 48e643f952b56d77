//! Camera capability.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

/// Reference to a captured image on durable storage.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(PathBuf);

impl ImageRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for ImageRef {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

/// Shutter capability.
///
/// Implementations block until the frame is written. The scheduler never
/// has more than one call outstanding.
pub trait Camera: Send {
    /// Take one picture at the given JPEG quality (1-100).
    fn take_picture(&mut self, quality: u8) -> Result<ImageRef, CaptureError>;
}

impl<C: Camera + ?Sized> Camera for Box<C> {
    fn take_picture(&mut self, quality: u8) -> Result<ImageRef, CaptureError> {
        (**self).take_picture(quality)
    }
}
