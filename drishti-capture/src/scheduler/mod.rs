//! Capture scheduling.
//!
//! [`CaptureScheduler`] owns the [`CaptureSession`] and moves it through
//! `Ready → Capturing → Processing → Done`. The first photo of a session is
//! always requested manually; after that the auto-capture guard fires
//! whenever the view straddles the edge of existing coverage while the
//! device is steady.
//!
//! Camera calls run on a [`CaptureWorker`] thread. At most one capture is in
//! flight per session; results carry the session epoch so a reset drops them.

mod camera;
mod guard;
mod machine;
mod session;
mod worker;

pub use camera::{Camera, ImageRef};
pub use guard::{
    AutoCaptureConfig, FovSamples, GuardDecision, GuardInput, HoldReason, evaluate_auto_capture,
    sample_field_of_view,
};
pub use machine::{
    CaptureOutcome, CaptureScheduler, CaptureState, CaptureTicket, CaptureTrigger, TickReport,
};
pub use session::{CaptureSession, CapturedPhoto, OrientationRecord, StitchJob};
pub use worker::{CaptureResult, CaptureWorker};
