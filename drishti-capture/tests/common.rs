//! Test utilities for capture sessions.

#![allow(dead_code)]

use drishti_capture::{
    AngularRate, CaptureConfig, CaptureError, CaptureOutcome, CaptureScheduler, CaptureTicket,
    ImageRef, Orientation, OrientationSample,
};

/// Config for the six-photo horizon sweep: a ±55° capture band, 80×100°
/// field of view, and a 40°×50° half-span footprint.
pub fn sweep_config() -> CaptureConfig {
    let mut config = CaptureConfig::default();
    config.grid.min_pitch = -55.0;
    config.grid.max_pitch = 55.0;
    config.camera.h_fov_deg = 80.0;
    config.camera.v_fov_deg = 100.0;
    config.footprint.yaw_span_deg = 40.0;
    config.footprint.pitch_span_deg = 50.0;
    config.completion.target_coverage = 0.85;
    config.completion.min_photos = 6;
    config
}

/// Device held still at (yaw, pitch).
pub fn steady(yaw: f32, pitch: f32, timestamp_ms: u64) -> OrientationSample {
    OrientationSample::steady(Orientation::looking_at(yaw, pitch, timestamp_ms))
}

/// Device sweeping through (yaw, pitch) at `rate` deg/s.
pub fn sweeping(yaw: f32, pitch: f32, rate: f32, timestamp_ms: u64) -> OrientationSample {
    OrientationSample::moving(
        Orientation::looking_at(yaw, pitch, timestamp_ms),
        AngularRate::new(rate, 0.0),
    )
}

/// Image reference for the n-th fake frame.
pub fn frame(n: usize) -> Result<ImageRef, CaptureError> {
    Ok(ImageRef::new(format!("frames/frame_{n:03}.jpg")))
}

/// Take the manual first photo at (yaw, pitch).
pub fn manual_first(
    scheduler: &mut CaptureScheduler,
    yaw: f32,
    pitch: f32,
    now_ms: u64,
) -> CaptureOutcome {
    let ticket: CaptureTicket = scheduler
        .request_manual_capture(Orientation::looking_at(yaw, pitch, now_ms), now_ms)
        .unwrap();
    scheduler.complete_capture(&ticket, frame(1))
}
