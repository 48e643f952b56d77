//! Replay-driven capture session.
//!
//! Feeds recorded (or synthetic) orientation samples through the tracker's
//! subscription, ticks the scheduler at its configured interval and runs the
//! camera on the worker thread. The sample timestamps are the clock, so a
//! replay is deterministic.

use std::path::{Path, PathBuf};
use std::time::Duration;

use drishti_capture::{
    Camera, CaptureConfig, CaptureError, CaptureOutcome, CaptureScheduler, CaptureState,
    CaptureTicket, CaptureTrigger, CaptureWorker, GuardDecision, HoldReason, OrientationFeed,
    OrientationTracker, RawRotation, StitchJob, orientation_channel,
};

use crate::camera::Aim;
use crate::error::{DrishtiError, Result};

/// Queue depth of the orientation subscription.
const FEED_CAPACITY: usize = 64;

/// Counters for one session run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionStats {
    pub samples: usize,
    pub ticks: usize,
    pub manual_captures: usize,
    pub auto_captures: usize,
    pub failed_captures: usize,
    pub degraded_ticks: usize,
    /// Session reached its coverage target on its own
    pub completed: bool,
}

/// Finished session, ready for stitching.
#[derive(Debug)]
pub struct SessionSummary {
    pub job: StitchJob,
    pub stats: SessionStats,
}

/// Runs one capture session from a sample stream.
pub struct SessionDriver {
    scheduler: CaptureScheduler,
    tracker: OrientationTracker,
    feed: OrientationFeed,
    worker: CaptureWorker,
    aim: Option<Aim>,
    shutter_timeout: Duration,
    stats: SessionStats,
}

impl SessionDriver {
    /// Create a driver around a camera.
    ///
    /// `aim` is updated with each ticket's orientation before the shutter
    /// call, for cameras that render from it.
    pub fn new<C: Camera + 'static>(
        config: CaptureConfig,
        camera: C,
        aim: Option<Aim>,
    ) -> Result<Self> {
        let (feed, subscription) = orientation_channel(FEED_CAPACITY);
        let worker = CaptureWorker::spawn(camera, config.camera.jpeg_quality)?;
        Ok(Self {
            scheduler: CaptureScheduler::new(config),
            tracker: OrientationTracker::with_subscription(subscription),
            feed,
            worker,
            aim,
            shutter_timeout: Duration::from_secs(10),
            stats: SessionStats::default(),
        })
    }

    pub fn scheduler(&self) -> &CaptureScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut CaptureScheduler {
        &mut self.scheduler
    }

    /// Replay the samples through a new session.
    ///
    /// The first photo is taken manually as soon as the device is steady.
    /// If the stream ends before the coverage target, the session is
    /// finished by hand, which needs the minimum photo count.
    pub fn run(&mut self, samples: &[RawRotation]) -> Result<SessionSummary> {
        let Some(first) = samples.first() else {
            return Err(DrishtiError::Replay("no orientation samples".to_string()));
        };
        let epoch = self.scheduler.start(first.timestamp_ms)?;
        let tick_ms = self
            .scheduler
            .config()
            .auto_capture
            .tick_interval_ms
            .max(1);
        let mut next_tick = first.timestamp_ms;

        for raw in samples {
            if !self.feed.publish(*raw) {
                return Err(DrishtiError::Replay(
                    "orientation subscription closed".to_string(),
                ));
            }
            self.stats.samples += 1;
            // Degraded mode is reported through the tick's hold reason
            let _ = self.tracker.poll();

            let now = raw.timestamp_ms;
            if now < next_tick {
                continue;
            }
            next_tick = now + tick_ms;
            self.tick(now);

            if self.scheduler.state() != CaptureState::Capturing {
                break;
            }
        }

        if self.scheduler.state() == CaptureState::Capturing {
            tracing::info!(
                "Orientation stream ended at coverage {:.3}, finishing session",
                self.scheduler.coverage_ratio()
            );
            self.scheduler.finish()?;
        }

        let job = self.scheduler.stitch_job()?;
        tracing::info!(
            "Session {} captured {} photos ({} manual, {} auto, {} failed), coverage {:.3}",
            epoch,
            job.photos.len(),
            self.stats.manual_captures,
            self.stats.auto_captures,
            self.stats.failed_captures,
            job.coverage_ratio
        );
        Ok(SessionSummary {
            job,
            stats: self.stats.clone(),
        })
    }

    fn tick(&mut self, now: u64) {
        self.stats.ticks += 1;
        let sample = self.tracker.sample();
        let report = self.scheduler.tick(&sample, now);

        if let Some(guide) = report.closest_guide {
            tracing::trace!(
                "Next guide {} at yaw {:.0} pitch {:.0}",
                guide.direction,
                guide.yaw,
                guide.pitch
            );
        }

        match report.decision {
            Some(GuardDecision::Hold(HoldReason::AwaitingManualFirst)) => {
                let threshold = self.scheduler.config().auto_capture.stability_threshold_dps;
                if !sample.degraded && sample.rate.is_below(threshold) {
                    match self
                        .scheduler
                        .request_manual_capture(sample.orientation, now)
                    {
                        Ok(ticket) => self.shoot(ticket),
                        Err(e) => tracing::warn!("Manual capture refused: {}", e),
                    }
                }
            }
            Some(GuardDecision::Hold(HoldReason::OrientationUnavailable)) => {
                self.stats.degraded_ticks += 1;
            }
            _ => {}
        }

        if let Some(ticket) = report.capture {
            self.shoot(ticket);
        }
    }

    /// Run the shutter for a granted ticket and feed the result back.
    fn shoot(&mut self, ticket: CaptureTicket) {
        while let Some(stale) = self.worker.try_result() {
            tracing::debug!(
                "Dropping stale capture result from {} ms",
                stale.ticket.requested_at_ms
            );
        }
        if let Some(aim) = &self.aim {
            *aim.lock() = ticket.orientation;
        }

        let result = if self.worker.submit(ticket) {
            match self.worker.recv_timeout(self.shutter_timeout) {
                Some(done) => done.result,
                None => Err(CaptureError::Shutter("shutter timed out".to_string())),
            }
        } else {
            Err(CaptureError::Shutter("camera unavailable".to_string()))
        };

        match self.scheduler.complete_capture(&ticket, result) {
            CaptureOutcome::Stored {
                photo_id,
                coverage_ratio,
            } => {
                self.count(ticket.trigger);
                tracing::info!("Photo {} stored, coverage {:.3}", photo_id, coverage_ratio);
            }
            CaptureOutcome::Completed {
                photo_id,
                coverage_ratio,
            } => {
                self.count(ticket.trigger);
                self.stats.completed = true;
                tracing::info!(
                    "Photo {} completed the session, coverage {:.3}",
                    photo_id,
                    coverage_ratio
                );
            }
            CaptureOutcome::Failed(e) => {
                self.stats.failed_captures += 1;
                tracing::warn!("Capture failed: {}", e);
            }
            CaptureOutcome::Discarded => {}
        }
    }

    fn count(&mut self, trigger: CaptureTrigger) {
        match trigger {
            CaptureTrigger::Manual => self.stats.manual_captures += 1,
            CaptureTrigger::Auto => self.stats.auto_captures += 1,
        }
    }
}

/// Path of the manifest for a session epoch.
pub fn manifest_path(dir: &Path, epoch: u64) -> PathBuf {
    dir.join(format!("session-{epoch:04}.json"))
}

/// Write the stitch job as a JSON manifest.
pub fn write_manifest(dir: &Path, job: &StitchJob) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = manifest_path(dir, job.epoch);
    std::fs::write(&path, serde_json::to_vec_pretty(job)?)?;
    tracing::info!("Session manifest written to {:?}", path);
    Ok(path)
}

/// Read a manifest written by [`write_manifest`].
pub fn read_manifest(path: &Path) -> Result<StitchJob> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use drishti_capture::{Orientation, SchedulerError};
    use parking_lot::Mutex;

    use crate::camera::SyntheticCamera;
    use crate::replay::SweepPlan;

    fn sweep_config() -> CaptureConfig {
        let mut config = CaptureConfig::default();
        config.grid.min_pitch = -55.0;
        config.grid.max_pitch = 55.0;
        config.camera.h_fov_deg = 80.0;
        config.camera.v_fov_deg = 100.0;
        config.footprint.yaw_span_deg = 40.0;
        config.footprint.pitch_span_deg = 50.0;
        config
    }

    fn driver(dir: &Path, config: CaptureConfig) -> SessionDriver {
        let aim: Aim = Arc::new(Mutex::new(Orientation::FALLBACK));
        let camera = SyntheticCamera::new(dir.join("frames"), Arc::clone(&aim)).unwrap();
        SessionDriver::new(config, camera, Some(aim)).unwrap()
    }

    #[test]
    fn test_synthetic_sweep_completes_on_its_own() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = driver(dir.path(), sweep_config());

        let summary = driver.run(&SweepPlan::horizon(6, 3).samples()).unwrap();

        assert!(summary.stats.completed);
        assert_eq!(summary.stats.manual_captures, 1);
        assert_eq!(summary.stats.auto_captures, 5);
        assert_eq!(summary.job.photos.len(), 6);
        assert!(summary.job.coverage_ratio >= 0.85);
        assert_eq!(driver.scheduler().state(), CaptureState::Processing);

        // Photos are recorded near their sweep positions
        let positions = [0.0, 60.0, 120.0, 180.0, 240.0, 300.0];
        for (photo, expected) in summary.job.photos.iter().zip(positions) {
            assert!(photo.orientation.distance_to(expected, 0.0) < 2.0);
            assert!(photo.image.path().exists());
        }
    }

    #[test]
    fn test_short_stream_below_minimum_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = driver(dir.path(), sweep_config());

        let plan = SweepPlan::horizon(6, 3);
        let samples = plan.samples();
        // Stop while turning towards the second position
        let result = driver.run(&samples[..55]);

        assert!(matches!(
            result,
            Err(DrishtiError::Capture(SchedulerError::Validation(_)))
        ));
        assert_eq!(driver.scheduler().state(), CaptureState::Capturing);
        assert_eq!(driver.scheduler().photo_count(), 1);
    }

    #[test]
    fn test_unavailable_stream_never_captures() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = driver(dir.path(), sweep_config());

        let samples: Vec<RawRotation> = (0..40u64)
            .map(|i| RawRotation {
                alpha: None,
                ..RawRotation::at_rest(0.0, 90.0, 0.0, i * 50)
            })
            .collect();
        assert!(driver.run(&samples).is_err());
        assert_eq!(driver.scheduler().photo_count(), 0);
    }

    #[test]
    fn test_manifest_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = driver(dir.path(), sweep_config());
        let summary = driver.run(&SweepPlan::horizon(6, 5).samples()).unwrap();

        let path = write_manifest(dir.path(), &summary.job).unwrap();
        assert_eq!(path, dir.path().join("session-0001.json"));
        assert_eq!(read_manifest(&path).unwrap(), summary.job);
    }
}
