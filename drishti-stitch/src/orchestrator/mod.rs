//! Stitch orchestration.
//!
//! ## Pipeline
//!
//! 1. Order photos by (pitch bucket, yaw)
//! 2. Try the whole set in one stitcher call
//! 3. On failure, stitch each pitch bucket separately; a bucket that fails
//!    degrades to its first photo
//! 4. Stack row strips top to bottom at a common width
//! 5. Crop to non-black content
//! 6. Resize to the 2:1 canvas and encode JPEG

mod canvas;
mod ordering;

pub use canvas::{content_bounds, crop_to_content, encode_jpeg, fit_canvas, stack_rows};
pub use ordering::{pitch_bucket, row_buckets, stitch_order};

use image::RgbImage;

use drishti_capture::{CapturedPhoto, Orientation};

use crate::config::StitchConfig;
use crate::error::{CapabilityError, Result, StitchError, StitchFailure};
use crate::stitcher::SphericalStitcher;

/// A photo decoded into memory.
#[derive(Clone, Debug)]
pub struct LoadedPhoto {
    pub id: u32,
    pub orientation: Orientation,
    pub image: RgbImage,
}

impl LoadedPhoto {
    /// Decode a captured photo from its image reference.
    pub fn load(photo: &CapturedPhoto) -> Result<Self> {
        let image = image::open(photo.image.path())?.into_rgb8();
        Ok(Self {
            id: photo.id,
            orientation: photo.orientation,
            image,
        })
    }
}

/// How the output was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StitchStrategy {
    /// One stitcher call over the whole set
    Whole,
    /// Per-row stitching after the whole-set call failed
    RowFallback {
        rows: usize,
        /// Rows that fell back to their first photo
        degraded_rows: usize,
        /// Photos dropped by degraded rows
        discarded_photos: usize,
    },
}

/// Summary of a stitch run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StitchReport {
    pub strategy: StitchStrategy,
    pub photo_count: usize,
    /// Failure code of the whole-set attempt, if it failed
    pub whole_failure: Option<String>,
}

/// Encoded equirectangular output.
#[derive(Clone, Debug)]
pub struct EquirectangularImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub report: StitchReport,
}

/// Turns a photo set into one equirectangular JPEG.
pub struct StitchOrchestrator {
    stitcher: Box<dyn SphericalStitcher>,
    config: StitchConfig,
}

impl StitchOrchestrator {
    pub fn new(stitcher: Box<dyn SphericalStitcher>, config: StitchConfig) -> Self {
        Self { stitcher, config }
    }

    pub fn config(&self) -> &StitchConfig {
        &self.config
    }

    pub fn stitcher_name(&self) -> &str {
        self.stitcher.name()
    }

    /// Load photos from storage and stitch them.
    pub fn stitch(&self, photos: &[CapturedPhoto]) -> Result<EquirectangularImage> {
        if photos.is_empty() {
            return Err(StitchError::NoPhotos);
        }
        let loaded = photos
            .iter()
            .map(LoadedPhoto::load)
            .collect::<Result<Vec<_>>>()?;
        self.stitch_loaded(loaded)
    }

    /// Stitch photos already in memory.
    pub fn stitch_loaded(&self, photos: Vec<LoadedPhoto>) -> Result<EquirectangularImage> {
        if photos.is_empty() {
            return Err(StitchError::NoPhotos);
        }
        let photo_count = photos.len();
        let bucket_deg = self.config.row_bucket_deg;

        // Apply stitch order
        let keys: Vec<(f32, f32)> = photos
            .iter()
            .map(|p| (p.orientation.yaw, p.orientation.pitch))
            .collect();
        let order = stitch_order(&keys, bucket_deg);
        let mut slots: Vec<Option<LoadedPhoto>> = photos.into_iter().map(Some).collect();
        let (pitches, images): (Vec<f32>, Vec<RgbImage>) = order
            .iter()
            .filter_map(|&i| slots[i].take())
            .map(|p| (p.orientation.pitch, p.image))
            .unzip();

        tracing::info!(
            "Stitching {} photos with {}",
            photo_count,
            self.stitcher.name()
        );

        let (strips, strategy, whole_failure) = match self.stitcher.stitch(&images) {
            Ok(panorama) => (vec![panorama], StitchStrategy::Whole, None),
            Err(e) => {
                tracing::warn!("Whole-set stitch failed ({}), falling back to rows", e);
                let code = failure_code(&e);
                let (strips, strategy) = self.stitch_rows(&pitches, &images)?;
                (strips, strategy, Some(code))
            }
        };

        let stacked = stack_rows(&strips);
        let cropped = crop_to_content(stacked, self.config.black_threshold);
        let canvas = fit_canvas(
            &cropped,
            self.config.canvas_width,
            self.config.canvas_height,
        );
        let jpeg = encode_jpeg(&canvas, self.config.jpeg_quality)?;

        tracing::info!(
            "Stitched {}x{} equirectangular image ({} bytes)",
            canvas.width(),
            canvas.height(),
            jpeg.len()
        );

        Ok(EquirectangularImage {
            jpeg,
            width: canvas.width(),
            height: canvas.height(),
            report: StitchReport {
                strategy,
                photo_count,
                whole_failure,
            },
        })
    }

    /// Row-grouped fallback. Rows are returned top row first.
    fn stitch_rows(
        &self,
        pitches: &[f32],
        images: &[RgbImage],
    ) -> Result<(Vec<RgbImage>, StitchStrategy)> {
        let rows = row_buckets(pitches, self.config.row_bucket_deg);
        let mut strips = Vec::with_capacity(rows.len());
        let mut degraded_rows = 0;
        let mut discarded_photos = 0;

        for (bucket, range) in &rows {
            let row = &images[range.clone()];
            let strip = match row {
                [] => continue,
                [single] => single.clone(),
                _ => match self.stitcher.stitch(row) {
                    Ok(strip) => strip,
                    Err(e) => {
                        let dropped = row.len() - 1;
                        tracing::warn!(
                            "Row at pitch {} failed ({}), keeping first photo and discarding {}",
                            bucket,
                            e,
                            dropped
                        );
                        degraded_rows += 1;
                        discarded_photos += dropped;
                        row[0].clone()
                    }
                },
            };
            strips.push(strip);
        }

        if strips.is_empty() {
            return Err(StitchError::Failure(StitchFailure::RowFallbackFailure));
        }

        Ok((
            strips,
            StitchStrategy::RowFallback {
                rows: rows.len(),
                degraded_rows,
                discarded_photos,
            },
        ))
    }
}

fn failure_code(err: &CapabilityError) -> String {
    match err {
        CapabilityError::Failed(failure) => failure.code().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stitcher::FakeStitcher;
    use image::Rgb;

    fn photo(id: u32, yaw: f32, pitch: f32) -> LoadedPhoto {
        let shade = (id * 30) as u8 + 40;
        LoadedPhoto {
            id,
            orientation: Orientation::looking_at(yaw, pitch, 0),
            image: RgbImage::from_pixel(32, 24, Rgb([shade, shade, shade])),
        }
    }

    fn small_config() -> StitchConfig {
        StitchConfig {
            canvas_width: 128,
            canvas_height: 64,
            ..StitchConfig::default()
        }
    }

    #[test]
    fn test_no_photos() {
        let orchestrator =
            StitchOrchestrator::new(Box::new(FakeStitcher::succeeding()), small_config());
        assert!(matches!(
            orchestrator.stitch_loaded(Vec::new()),
            Err(StitchError::NoPhotos)
        ));
    }

    #[test]
    fn test_whole_set_success() {
        let orchestrator =
            StitchOrchestrator::new(Box::new(FakeStitcher::succeeding()), small_config());
        let out = orchestrator
            .stitch_loaded(vec![photo(1, 0.0, 0.0), photo(2, 90.0, 0.0)])
            .unwrap();
        assert_eq!((out.width, out.height), (128, 64));
        assert_eq!(out.report.strategy, StitchStrategy::Whole);
        assert_eq!(out.report.whole_failure, None);
    }
}
