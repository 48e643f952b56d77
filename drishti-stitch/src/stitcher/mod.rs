//! Spherical stitching capability.
//!
//! The feature matching and homography math live outside this crate. The
//! orchestrator only needs "these photos in, one image or a typed failure
//! out", which [`SphericalStitcher`] captures.

mod command;
mod fake;

pub use command::CommandStitcher;
pub use fake::{FailurePolicy, FakeStitcher};

use image::RgbImage;

use crate::error::CapabilityError;

/// A black-box stitcher for overlapping photos.
pub trait SphericalStitcher: Send + Sync {
    /// Short name for logs and health reports.
    fn name(&self) -> &str;

    /// Stitch the images, given in stitch order, into one.
    fn stitch(&self, images: &[RgbImage]) -> Result<RgbImage, CapabilityError>;
}

impl<S: SphericalStitcher + ?Sized> SphericalStitcher for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn stitch(&self, images: &[RgbImage]) -> Result<RgbImage, CapabilityError> {
        (**self).stitch(images)
    }
}

impl<S: SphericalStitcher + ?Sized> SphericalStitcher for std::sync::Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn stitch(&self, images: &[RgbImage]) -> Result<RgbImage, CapabilityError> {
        (**self).stitch(images)
    }
}
