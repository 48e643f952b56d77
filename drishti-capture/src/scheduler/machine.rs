//! Capture lifecycle state machine.

use super::camera::ImageRef;
use super::guard::{
    GuardDecision, GuardInput, HoldReason, evaluate_auto_capture, sample_field_of_view,
};
use super::session::{CaptureSession, StitchJob};
use crate::config::CaptureConfig;
use crate::core::Orientation;
use crate::error::{CaptureError, Result, SchedulerError, ValidationError};
use crate::guide::{FrontierGuide, FrontierGuideEngine};
use crate::tracker::OrientationSample;

/// Lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    /// No session
    Ready,
    /// Session open, taking photos
    Capturing,
    /// Photos handed to stitching
    Processing,
    /// Stitch output produced
    Done,
}

/// What triggered a capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureTrigger {
    Manual,
    Auto,
}

/// A granted capture request.
///
/// Carries the session epoch so results that arrive after a reset are
/// recognized and dropped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureTicket {
    pub epoch: u64,
    /// Orientation at trigger time; the photo is recorded with it
    pub orientation: Orientation,
    pub requested_at_ms: u64,
    pub trigger: CaptureTrigger,
}

/// Result of feeding a camera result back to the scheduler.
#[derive(Debug)]
pub enum CaptureOutcome {
    /// Photo stored, session continues
    Stored { photo_id: u32, coverage_ratio: f32 },
    /// Photo stored and the session reached its target; now Processing
    Completed { photo_id: u32, coverage_ratio: f32 },
    /// Camera failed; session continues
    Failed(CaptureError),
    /// Ticket belongs to an earlier session; nothing changed
    Discarded,
}

/// Output of one scheduler tick.
#[derive(Clone, Debug)]
pub struct TickReport {
    pub state: CaptureState,
    pub orientation: Orientation,
    pub coverage_ratio: f32,
    pub guides: Vec<FrontierGuide>,
    pub closest_guide: Option<FrontierGuide>,
    /// Guard verdict; `None` when not capturing
    pub decision: Option<GuardDecision>,
    /// Set when the guard fired; hand it to the camera worker
    pub capture: Option<CaptureTicket>,
}

/// Drives a capture session from start to stitch handoff.
#[derive(Debug)]
pub struct CaptureScheduler {
    config: CaptureConfig,
    guides: FrontierGuideEngine,
    state: CaptureState,
    session: Option<CaptureSession>,
    next_epoch: u64,
    output_ref: Option<String>,
}

impl CaptureScheduler {
    pub fn new(config: CaptureConfig) -> Self {
        let guides = FrontierGuideEngine::new(config.guides.clone(), &config.footprint);
        Self {
            config,
            guides,
            state: CaptureState::Ready,
            session: None,
            next_epoch: 1,
            output_ref: None,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// Coverage ratio of the open session, 0 without one.
    pub fn coverage_ratio(&self) -> f32 {
        self.session.as_ref().map_or(0.0, |s| s.coverage_ratio())
    }

    pub fn photo_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.photo_count())
    }

    /// Reference of the last successful stitch output.
    pub fn output_ref(&self) -> Option<&str> {
        self.output_ref.as_deref()
    }

    fn invalid(&self, op: &'static str) -> SchedulerError {
        SchedulerError::InvalidState {
            op,
            state: self.state,
        }
    }

    /// Open a new session. Returns its epoch.
    pub fn start(&mut self, now_ms: u64) -> Result<u64> {
        if self.state != CaptureState::Ready {
            return Err(self.invalid("start"));
        }
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        self.session = Some(CaptureSession::new(epoch, self.config.grid.to_grid()));
        self.output_ref = None;
        self.state = CaptureState::Capturing;
        tracing::info!("Capture session {} started at {} ms", epoch, now_ms);
        Ok(epoch)
    }

    /// Grant a user-triggered capture.
    ///
    /// Allowed while degraded; the photo is then recorded at the fallback
    /// orientation.
    pub fn request_manual_capture(
        &mut self,
        orientation: Orientation,
        now_ms: u64,
    ) -> Result<CaptureTicket> {
        if self.state != CaptureState::Capturing {
            return Err(self.invalid("capture"));
        }
        let Some(session) = self.session.as_mut() else {
            return Err(self.invalid("capture"));
        };
        if session.in_flight() {
            tracing::debug!("Manual capture rejected: capture in flight");
            return Err(SchedulerError::CaptureInFlight);
        }
        session.begin_capture(now_ms);
        Ok(CaptureTicket {
            epoch: session.epoch(),
            orientation,
            requested_at_ms: now_ms,
            trigger: CaptureTrigger::Manual,
        })
    }

    /// Evaluate guidance and the auto-capture guard for one tick.
    pub fn tick(&mut self, sample: &OrientationSample, now_ms: u64) -> TickReport {
        let orientation = sample.orientation;
        let mut report = TickReport {
            state: self.state,
            orientation,
            coverage_ratio: self.coverage_ratio(),
            guides: Vec::new(),
            closest_guide: None,
            decision: None,
            capture: None,
        };

        if self.state != CaptureState::Capturing {
            return report;
        }
        let Some(session) = self.session.as_mut() else {
            return report;
        };

        let camera = &self.config.camera;
        let samples = sample_field_of_view(
            session.grid(),
            &orientation,
            camera.h_fov_deg,
            camera.v_fov_deg,
            self.config.auto_capture.fov_sample_spread,
        );
        let input = GuardInput {
            samples,
            rate: sample.rate,
            since_last_capture_ms: session.since_last_trigger(now_ms),
            photo_count: session.photo_count(),
            capture_in_flight: session.in_flight(),
            degraded: sample.degraded,
        };
        let decision = evaluate_auto_capture(&input, &self.config.auto_capture);

        let last = session.last_photo().map(|p| p.orientation);
        report.guides = self.guides.compute_guides(last.as_ref(), session.grid());
        report.closest_guide =
            FrontierGuideEngine::closest_guide(&report.guides, &orientation).copied();
        report.decision = Some(decision);

        match decision {
            GuardDecision::Fire => {
                session.begin_capture(now_ms);
                tracing::info!(
                    "Auto-capture at yaw {:.1} pitch {:.1} ({} covered / {} uncovered samples)",
                    orientation.yaw,
                    orientation.pitch,
                    samples.covered,
                    samples.uncovered
                );
                report.capture = Some(CaptureTicket {
                    epoch: session.epoch(),
                    orientation,
                    requested_at_ms: now_ms,
                    trigger: CaptureTrigger::Auto,
                });
            }
            GuardDecision::Hold(HoldReason::OrientationUnavailable) => {
                tracing::trace!("Auto-capture suspended: orientation unavailable");
            }
            GuardDecision::Hold(_) => {}
        }

        report
    }

    /// Apply a camera result for a previously granted ticket.
    pub fn complete_capture(
        &mut self,
        ticket: &CaptureTicket,
        result: std::result::Result<ImageRef, CaptureError>,
    ) -> CaptureOutcome {
        let session = match self.session.as_mut() {
            Some(s) if s.epoch() == ticket.epoch && self.state == CaptureState::Capturing => s,
            _ => {
                tracing::debug!("Discarding capture result from session {}", ticket.epoch);
                return CaptureOutcome::Discarded;
            }
        };
        session.end_capture();

        let image = match result {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Capture failed, session continues: {}", e);
                return CaptureOutcome::Failed(e);
            }
        };

        let photo_id = session
            .add_photo(
                image,
                ticket.orientation,
                ticket.requested_at_ms,
                &self.config.footprint,
            )
            .id;
        let coverage_ratio = session.coverage_ratio();
        let photo_count = session.photo_count();

        let completion = &self.config.completion;
        if coverage_ratio >= completion.target_coverage && photo_count >= completion.min_photos {
            self.state = CaptureState::Processing;
            tracing::info!(
                "Coverage {:.3} reached with {} photos, processing",
                coverage_ratio,
                photo_count
            );
            CaptureOutcome::Completed {
                photo_id,
                coverage_ratio,
            }
        } else {
            CaptureOutcome::Stored {
                photo_id,
                coverage_ratio,
            }
        }
    }

    /// Finish capturing regardless of coverage.
    pub fn finish(&mut self) -> Result<()> {
        if self.state != CaptureState::Capturing {
            return Err(self.invalid("finish"));
        }
        let Some(session) = self.session.as_ref() else {
            return Err(self.invalid("finish"));
        };
        if session.in_flight() {
            return Err(SchedulerError::CaptureInFlight);
        }
        let minimum = self.config.completion.min_photos;
        if session.photo_count() < minimum {
            let err = ValidationError {
                photo_count: session.photo_count(),
                minimum,
            };
            tracing::warn!("{}", err);
            return Err(err.into());
        }
        self.state = CaptureState::Processing;
        tracing::info!("Session finished manually with {} photos", session.photo_count());
        Ok(())
    }

    /// Snapshot of the session for stitching.
    pub fn stitch_job(&self) -> Result<StitchJob> {
        match (&self.session, self.state) {
            (Some(session), CaptureState::Processing) => Ok(session.stitch_job()),
            _ => Err(self.invalid("build stitch job")),
        }
    }

    /// Stitching produced an output; the session is dropped.
    pub fn stitch_succeeded(&mut self, output_ref: impl Into<String>) -> Result<()> {
        if self.state != CaptureState::Processing {
            return Err(self.invalid("complete stitch"));
        }
        let output_ref = output_ref.into();
        tracing::info!("Stitch output {}", output_ref);
        self.output_ref = Some(output_ref);
        self.session = None;
        self.state = CaptureState::Done;
        Ok(())
    }

    /// Stitching failed; back to capturing with all photos kept.
    pub fn stitch_failed(&mut self, reason: &str) -> Result<()> {
        if self.state != CaptureState::Processing {
            return Err(self.invalid("fail stitch"));
        }
        tracing::warn!(
            "Stitch failed ({}), returning to capture with {} photos",
            reason,
            self.photo_count()
        );
        self.state = CaptureState::Capturing;
        Ok(())
    }

    /// Drop any session and return to Ready. In-flight captures are orphaned.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(
                "Session {} reset with {} photos",
                session.epoch(),
                session.photo_count()
            );
        }
        self.state = CaptureState::Ready;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> CaptureScheduler {
        let mut config = CaptureConfig::default();
        config.completion.min_photos = 2;
        CaptureScheduler::new(config)
    }

    fn photo(n: u32) -> std::result::Result<ImageRef, CaptureError> {
        Ok(ImageRef::new(format!("photo_{n}.jpg")))
    }

    #[test]
    fn test_start_only_from_ready() {
        let mut s = scheduler();
        assert_eq!(s.start(0), Ok(1));
        assert_eq!(s.state(), CaptureState::Capturing);
        assert!(matches!(
            s.start(0),
            Err(SchedulerError::InvalidState { op: "start", .. })
        ));
        s.reset();
        assert_eq!(s.start(0), Ok(2));
    }

    #[test]
    fn test_capture_requires_session() {
        let mut s = scheduler();
        let err = s.request_manual_capture(Orientation::FALLBACK, 0).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidState { .. }));
    }

    #[test]
    fn test_first_photo_is_manual() {
        let mut s = scheduler();
        s.start(0).unwrap();
        let report = s.tick(&OrientationSample::steady(Orientation::looking_at(0.0, 0.0, 0)), 10_000);
        assert_eq!(
            report.decision,
            Some(GuardDecision::Hold(HoldReason::AwaitingManualFirst))
        );
        assert!(report.capture.is_none());
        // Before any photo only global guides exist
        assert_eq!(report.guides.len(), 40);
    }

    #[test]
    fn test_second_request_rejected_while_in_flight() {
        let mut s = scheduler();
        s.start(0).unwrap();
        let o = Orientation::looking_at(0.0, 0.0, 0);
        let ticket = s.request_manual_capture(o, 0).unwrap();
        assert_eq!(
            s.request_manual_capture(o, 10),
            Err(SchedulerError::CaptureInFlight)
        );
        assert!(matches!(
            s.complete_capture(&ticket, photo(1)),
            CaptureOutcome::Stored { photo_id: 1, .. }
        ));
        assert!(s.request_manual_capture(o, 20).is_ok());
    }

    #[test]
    fn test_failed_capture_clears_in_flight() {
        let mut s = scheduler();
        s.start(0).unwrap();
        let o = Orientation::looking_at(0.0, 0.0, 0);
        let ticket = s.request_manual_capture(o, 0).unwrap();
        let outcome = s.complete_capture(&ticket, Err(CaptureError::PermissionDenied));
        assert!(matches!(outcome, CaptureOutcome::Failed(CaptureError::PermissionDenied)));
        assert_eq!(s.photo_count(), 0);
        assert_eq!(s.state(), CaptureState::Capturing);
        assert!(s.request_manual_capture(o, 1).is_ok());
    }

    #[test]
    fn test_finish_below_minimum_is_rejected() {
        let mut s = scheduler();
        s.start(0).unwrap();
        let ticket = s
            .request_manual_capture(Orientation::looking_at(0.0, 0.0, 0), 0)
            .unwrap();
        s.complete_capture(&ticket, photo(1));

        let err = s.finish().unwrap_err();
        assert_eq!(
            err,
            SchedulerError::Validation(ValidationError {
                photo_count: 1,
                minimum: 2
            })
        );
        assert_eq!(s.state(), CaptureState::Capturing);
    }

    #[test]
    fn test_stitch_failure_keeps_photos() {
        let mut s = scheduler();
        s.start(0).unwrap();
        for (i, yaw) in [0.0, 90.0].into_iter().enumerate() {
            let ticket = s
                .request_manual_capture(Orientation::looking_at(yaw, 0.0, 0), i as u64 * 2000)
                .unwrap();
            s.complete_capture(&ticket, photo(i as u32 + 1));
        }
        s.finish().unwrap();
        assert_eq!(s.state(), CaptureState::Processing);
        assert_eq!(s.stitch_job().unwrap().photos.len(), 2);

        s.stitch_failed("network unreachable").unwrap();
        assert_eq!(s.state(), CaptureState::Capturing);
        assert_eq!(s.photo_count(), 2);

        s.finish().unwrap();
        s.stitch_succeeded("pano-1").unwrap();
        assert_eq!(s.state(), CaptureState::Done);
        assert!(s.session().is_none());
        assert_eq!(s.output_ref(), Some("pano-1"));
        assert!(s.stitch_job().is_err());
    }

    #[test]
    fn test_tick_outside_capturing_is_inert() {
        let mut s = scheduler();
        let report = s.tick(&OrientationSample::unavailable(), 0);
        assert_eq!(report.state, CaptureState::Ready);
        assert!(report.decision.is_none());
        assert!(report.guides.is_empty());
    }
}
