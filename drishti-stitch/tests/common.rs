//! Test utilities for stitching and upload.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use image::{Rgb, RgbImage};
use parking_lot::Mutex;

use drishti_capture::{CapturedPhoto, ImageRef, Orientation, OrientationRecord, StitchJob};
use drishti_stitch::{
    CancelToken, CapabilityError, FakeStitcher, HealthStatus, SphericalStitcher, StitchConfig, StitchRequest, StitchResponse, StitchService,
    UploadError,
};

/// Small 2:1 canvas so tests stay fast.
pub fn small_config() -> StitchConfig {
    StitchConfig {
        canvas_width: 256,
        canvas_height: 128,
        ..StitchConfig::default()
    }
}

/// Write a flat-shaded PNG for photo `id` and return its captured record.
pub fn write_photo(dir: &Path, id: u32, yaw: f32, pitch: f32) -> CapturedPhoto {
    let shade = 40 + (id * 25 % 200) as u8;
    let image = RgbImage::from_pixel(64, 48, Rgb([shade, 255 - shade, 128]));
    let path = dir.join(format!("photo_{id:03}.png"));
    image.save(&path).unwrap();

    let captured_at_ms = 1_000 * id as u64;
    CapturedPhoto {
        id,
        image: ImageRef::new(path),
        orientation: Orientation::looking_at(yaw, pitch, captured_at_ms),
        captured_at_ms,
    }
}

/// Stitch job over photos written at the given (yaw, pitch) pairs.
pub fn job(dir: &Path, angles: &[(f32, f32)]) -> StitchJob {
    let photos: Vec<CapturedPhoto> = angles
        .iter()
        .enumerate()
        .map(|(i, &(yaw, pitch))| write_photo(dir, i as u32 + 1, yaw, pitch))
        .collect();
    let record = photos.iter().map(OrientationRecord::from).collect();
    StitchJob {
        epoch: 1,
        photos,
        record,
        coverage_ratio: 0.9,
    }
}

/// Three rows: 3 photos at the horizon, 2 looking up, 1 looking down.
pub fn three_row_angles() -> Vec<(f32, f32)> {
    vec![
        (0.0, 0.0),
        (120.0, 0.0),
        (240.0, 0.0),
        (60.0, 30.0),
        (180.0, 30.0),
        (90.0, -30.0),
    ]
}

/// Scripted service that counts calls and records the last request.
pub struct MockService {
    pub health: Result<HealthStatus, String>,
    pub response: StitchResponse,
    pub submit_delay: Duration,
    pub health_calls: AtomicUsize,
    pub submits: AtomicUsize,
    pub last_request: Mutex<Option<StitchRequest>>,
}

impl MockService {
    pub fn healthy(response: StitchResponse) -> Self {
        Self {
            health: Ok(HealthStatus {
                status: "ok".into(),
                capabilities: vec!["spherical-stitch".into()],
            }),
            response,
            submit_delay: Duration::ZERO,
            health_calls: AtomicUsize::new(0),
            submits: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            health: Err("connection refused".into()),
            ..Self::healthy(StitchResponse::succeeded("never"))
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            submit_delay: delay,
            ..Self::healthy(StitchResponse::succeeded("pano-slow"))
        }
    }

    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn health_count(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }
}

impl StitchService for MockService {
    fn health(&self) -> Result<HealthStatus, UploadError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.health.clone().map_err(UploadError::Network)
    }

    fn submit(
        &self,
        request: &StitchRequest,
        _cancel: &CancelToken,
    ) -> Result<StitchResponse, UploadError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());
        if !self.submit_delay.is_zero() {
            std::thread::sleep(self.submit_delay);
        }
        Ok(self.response.clone())
    }
}

/// Concatenating stitcher that takes `delay` per call and tracks overlap.
pub struct SlowStitcher {
    inner: FakeStitcher,
    delay: Duration,
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: AtomicUsize,
}

impl SlowStitcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: FakeStitcher::succeeding(),
            delay,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Largest number of calls that ran at the same time.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SphericalStitcher for SlowStitcher {
    fn name(&self) -> &str {
        "slow-concat"
    }

    fn stitch(&self, images: &[RgbImage]) -> Result<RgbImage, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        let result = self.inner.stitch(images);
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Files in `dir`, or none if it does not exist yet.
pub fn list_files(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}
