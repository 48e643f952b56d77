//! # Drishti Capture
//!
//! Capture guidance for full-sphere photo sessions on a handheld device.
//!
//! ## Overview
//!
//! The library tracks which parts of the sphere have been photographed,
//! suggests where the next photo should be taken, and decides on its own when
//! the device is pointing somewhere worth capturing.
//!
//! - **Orientation tracking**: raw device rotation samples become yaw/pitch/roll
//!   relative to the heading at session start
//! - **Coverage grid**: a discretized sphere of fixed angular cells
//! - **Frontier guides**: "capture here next" directions around the last photo,
//!   plus a coarse global scan so sessions never stall
//! - **Capture scheduling**: manual first shot, automatic captures afterwards,
//!   and completion once coverage reaches the target
//!
//! ## Data Flow
//!
//! ```text
//!   RawRotation stream
//!          │ OrientationSubscription
//!          ▼
//!  ┌────────────────────┐
//!  │ OrientationTracker │── Orientation + AngularRate
//!  └─────────┬──────────┘
//!            │
//!            ▼
//!  ┌────────────────────┐     ┌──────────────────────┐
//!  │  CaptureScheduler  │────▶│  FrontierGuideEngine │
//!  │  (state machine)   │     └──────────────────────┘
//!  └─────────┬──────────┘
//!            │ owns
//!            ▼
//!  ┌────────────────────┐
//!  │   CaptureSession   │── CoverageGrid + CapturedPhoto list
//!  └─────────┬──────────┘
//!            │ StitchJob
//!            ▼
//!     stitch orchestration
//! ```
//!
//! ## Angle Conventions
//!
//! All angles are in degrees:
//! - **Yaw**: `[0, 360)`, wraps; increases clockwise when viewed from above
//! - **Pitch**: `[-90, 90]`, clamps; positive looks up
//! - **Roll**: raw lean reading, passed through
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use drishti_capture::{CaptureConfig, CaptureScheduler, OrientationTracker};
//!
//! let mut tracker = OrientationTracker::new();
//! let mut scheduler = CaptureScheduler::new(CaptureConfig::default());
//! scheduler.start(now_ms)?;
//!
//! tracker.update(&raw_sample);
//! let ticket = scheduler.request_manual_capture(tracker.current(), now_ms)?;
//! let outcome = scheduler.complete_capture(&ticket, camera.take_picture(92));
//!
//! let report = scheduler.tick(&tracker.sample(), now_ms);
//! if let Some(ticket) = report.capture {
//!     // hand the ticket to the camera worker
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod grid;
pub mod guide;
pub mod scheduler;
pub mod tracker;

pub use config::CaptureConfig;
pub use core::{AngularRate, Orientation, RawRotation, RotationRate};
pub use error::{
    CaptureError, ConfigError, OrientationUnavailable, Result, SchedulerError, ValidationError,
};
pub use grid::{CellIndex, CellState, CoverageGrid};
pub use guide::{
    FrontierGuide, FrontierGuideEngine, GuideDirection, GuideSource, ScreenPoint, Viewport,
};
pub use scheduler::{
    Camera, CaptureOutcome, CaptureResult, CaptureScheduler, CaptureSession, CaptureState,
    CaptureTicket, CaptureTrigger, CaptureWorker, CapturedPhoto, GuardDecision, HoldReason,
    ImageRef, OrientationRecord, StitchJob, TickReport,
};
pub use tracker::{
    OrientationFeed, OrientationSample, OrientationSubscription, OrientationTracker,
    orientation_channel,
};
