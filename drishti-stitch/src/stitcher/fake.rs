//! Deterministic in-memory stitcher.

use image::imageops::{self, FilterType};
use image::RgbImage;
use parking_lot::Mutex;

use super::SphericalStitcher;
use crate::error::{CapabilityError, StitchFailure};

/// When the fake stitcher reports failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Every call succeeds
    Never,
    /// Calls with at least `min_images` images fail with `failure`
    AtLeast {
        min_images: usize,
        failure: StitchFailure,
    },
    /// Every call fails with the given failure
    Always(StitchFailure),
}

/// Stitcher that concatenates images left to right.
///
/// Images are scaled to the smallest input height first. Every call's image
/// count is recorded so tests can check how the orchestrator used it.
#[derive(Debug)]
pub struct FakeStitcher {
    policy: FailurePolicy,
    calls: Mutex<Vec<usize>>,
}

impl FakeStitcher {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(FailurePolicy::Never)
    }

    /// Fail any call with `min_images` or more images.
    pub fn failing_at_least(min_images: usize, failure: StitchFailure) -> Self {
        Self::new(FailurePolicy::AtLeast {
            min_images,
            failure,
        })
    }

    pub fn always_failing(failure: StitchFailure) -> Self {
        Self::new(FailurePolicy::Always(failure))
    }

    /// Image counts of every call so far, in order.
    pub fn calls(&self) -> Vec<usize> {
        self.calls.lock().clone()
    }

    fn scripted_failure(&self, count: usize) -> Option<StitchFailure> {
        match self.policy {
            FailurePolicy::Never => None,
            FailurePolicy::AtLeast {
                min_images,
                failure,
            } if count >= min_images => Some(failure),
            FailurePolicy::AtLeast { .. } => None,
            FailurePolicy::Always(failure) => Some(failure),
        }
    }
}

impl SphericalStitcher for FakeStitcher {
    fn name(&self) -> &str {
        "concat"
    }

    fn stitch(&self, images: &[RgbImage]) -> Result<RgbImage, CapabilityError> {
        self.calls.lock().push(images.len());

        if let Some(failure) = self.scripted_failure(images.len()) {
            return Err(CapabilityError::Failed(failure));
        }
        let Some(height) = images.iter().map(|img| img.height()).min() else {
            return Err(CapabilityError::Failed(StitchFailure::InsufficientMatches));
        };
        let height = height.max(1);

        let scaled: Vec<RgbImage> = images
            .iter()
            .map(|img| {
                if img.height() == height {
                    img.clone()
                } else {
                    let width = scaled_width(img.width(), img.height(), height);
                    imageops::resize(img, width, height, FilterType::Triangle)
                }
            })
            .collect();

        let total_width = scaled.iter().map(|img| img.width()).sum();
        let mut out = RgbImage::new(total_width, height);
        let mut x = 0i64;
        for img in &scaled {
            imageops::replace(&mut out, img, x, 0);
            x += img.width() as i64;
        }
        Ok(out)
    }
}

fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    let w = (width as f64 * target_height as f64 / height.max(1) as f64).round() as u32;
    w.max(1)
}
