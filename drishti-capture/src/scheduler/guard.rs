//! Auto-capture guard.
//!
//! The decision to fire is a pure function of a [`GuardInput`] snapshot so it
//! can be tested without a running session.

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::core::{AngularRate, Orientation};
use crate::grid::{CellState, CoverageGrid};

/// Auto-capture configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AutoCaptureConfig {
    /// Both rotation rates must be below this to fire (deg/s)
    #[serde(default = "defaults::stability_threshold_dps")]
    pub stability_threshold_dps: f32,

    /// Time since the last capture must exceed this (ms)
    #[serde(default = "defaults::cooldown_ms")]
    pub cooldown_ms: u64,

    /// Field-of-view samples that must already be covered
    #[serde(default = "defaults::min_covered_samples")]
    pub min_covered_samples: usize,

    /// Field-of-view samples that must still be uncovered
    #[serde(default = "defaults::min_uncovered_samples")]
    pub min_uncovered_samples: usize,

    /// Sample offset as a fraction of the field of view
    #[serde(default = "defaults::fov_sample_spread")]
    pub fov_sample_spread: f32,

    /// Interval between scheduler ticks (ms)
    #[serde(default = "defaults::tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for AutoCaptureConfig {
    fn default() -> Self {
        Self {
            stability_threshold_dps: defaults::stability_threshold_dps(),
            cooldown_ms: defaults::cooldown_ms(),
            min_covered_samples: defaults::min_covered_samples(),
            min_uncovered_samples: defaults::min_uncovered_samples(),
            fov_sample_spread: defaults::fov_sample_spread(),
            tick_interval_ms: defaults::tick_interval_ms(),
        }
    }
}

/// Coverage classification of the five field-of-view samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FovSamples {
    pub covered: usize,
    pub uncovered: usize,
    /// Samples outside the grid's capture band
    pub outside: usize,
}

impl FovSamples {
    pub fn new(covered: usize, uncovered: usize) -> Self {
        Self {
            covered,
            uncovered,
            outside: 0,
        }
    }

    fn record(&mut self, state: CellState) {
        match state {
            CellState::Covered => self.covered += 1,
            CellState::Uncovered => self.uncovered += 1,
            CellState::Outside => self.outside += 1,
        }
    }
}

/// Classify the center of view and four offsets of `spread` × FOV.
pub fn sample_field_of_view(
    grid: &CoverageGrid,
    orientation: &Orientation,
    h_fov: f32,
    v_fov: f32,
    spread: f32,
) -> FovSamples {
    let dx = spread * h_fov;
    let dy = spread * v_fov;
    let offsets = [(0.0, 0.0), (-dx, 0.0), (dx, 0.0), (0.0, -dy), (0.0, dy)];

    let mut samples = FovSamples::default();
    for (d_yaw, d_pitch) in offsets {
        let (yaw, pitch) = orientation.offset(d_yaw, d_pitch);
        samples.record(grid.classify(yaw, pitch));
    }
    samples
}

/// Everything the guard looks at.
#[derive(Clone, Copy, Debug)]
pub struct GuardInput {
    pub samples: FovSamples,
    pub rate: AngularRate,
    /// Milliseconds since the last capture was triggered, `None` if never
    pub since_last_capture_ms: Option<u64>,
    pub photo_count: usize,
    pub capture_in_flight: bool,
    pub degraded: bool,
}

/// Why the guard did not fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldReason {
    /// No photo yet; the first one is always manual
    AwaitingManualFirst,
    CaptureInFlight,
    OrientationUnavailable,
    /// Device is rotating faster than the stability threshold
    Unstable,
    CoolingDown,
    /// Too few samples overlap existing coverage
    NoOverlap,
    /// Too few samples would add new coverage
    NoNewCoverage,
}

/// Guard verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Fire,
    Hold(HoldReason),
}

impl GuardDecision {
    pub fn fires(&self) -> bool {
        matches!(self, GuardDecision::Fire)
    }
}

/// Decide whether to trigger an automatic capture.
///
/// Fires only when the view straddles the coverage edge (enough covered
/// samples to overlap, enough uncovered to be worth it), the device is
/// steady, the cooldown has strictly elapsed, nothing is in flight, at least
/// one photo exists and orientation is trustworthy.
pub fn evaluate_auto_capture(input: &GuardInput, config: &AutoCaptureConfig) -> GuardDecision {
    use HoldReason::*;

    let hold = if input.photo_count == 0 {
        Some(AwaitingManualFirst)
    } else if input.capture_in_flight {
        Some(CaptureInFlight)
    } else if input.degraded {
        Some(OrientationUnavailable)
    } else if !input.rate.is_below(config.stability_threshold_dps) {
        Some(Unstable)
    } else if input
        .since_last_capture_ms
        .is_some_and(|elapsed| elapsed <= config.cooldown_ms)
    {
        Some(CoolingDown)
    } else if input.samples.covered < config.min_covered_samples {
        Some(NoOverlap)
    } else if input.samples.uncovered < config.min_uncovered_samples {
        Some(NoNewCoverage)
    } else {
        None
    };

    match hold {
        Some(reason) => GuardDecision::Hold(reason),
        None => GuardDecision::Fire,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(samples: FovSamples) -> GuardInput {
        GuardInput {
            samples,
            rate: AngularRate::ZERO,
            since_last_capture_ms: Some(5_000),
            photo_count: 1,
            capture_in_flight: false,
            degraded: false,
        }
    }

    #[test]
    fn test_fires_on_coverage_edge() {
        let config = AutoCaptureConfig::default();
        let decision = evaluate_auto_capture(&ready(FovSamples::new(1, 4)), &config);
        assert_eq!(decision, GuardDecision::Fire);
    }

    #[test]
    fn test_holds_without_overlap() {
        let config = AutoCaptureConfig::default();
        let decision = evaluate_auto_capture(&ready(FovSamples::new(0, 5)), &config);
        assert_eq!(decision, GuardDecision::Hold(HoldReason::NoOverlap));
    }

    #[test]
    fn test_holds_without_new_coverage() {
        let config = AutoCaptureConfig::default();
        let decision = evaluate_auto_capture(&ready(FovSamples::new(4, 1)), &config);
        assert_eq!(decision, GuardDecision::Hold(HoldReason::NoNewCoverage));
    }

    #[test]
    fn test_cooldown_must_be_exceeded() {
        let config = AutoCaptureConfig::default();
        let mut input = ready(FovSamples::new(2, 3));
        input.since_last_capture_ms = Some(config.cooldown_ms);
        assert_eq!(
            evaluate_auto_capture(&input, &config),
            GuardDecision::Hold(HoldReason::CoolingDown)
        );
        input.since_last_capture_ms = Some(config.cooldown_ms + 1);
        assert!(evaluate_auto_capture(&input, &config).fires());
    }

    #[test]
    fn test_unstable_device_holds() {
        let config = AutoCaptureConfig::default();
        let mut input = ready(FovSamples::new(1, 4));
        input.rate = AngularRate::new(2.0, 15.0);
        assert_eq!(
            evaluate_auto_capture(&input, &config),
            GuardDecision::Hold(HoldReason::Unstable)
        );
    }

    #[test]
    fn test_session_state_holds() {
        let config = AutoCaptureConfig::default();
        let base = ready(FovSamples::new(1, 4));

        let input = GuardInput { photo_count: 0, ..base };
        assert_eq!(
            evaluate_auto_capture(&input, &config),
            GuardDecision::Hold(HoldReason::AwaitingManualFirst)
        );

        let input = GuardInput { capture_in_flight: true, ..base };
        assert_eq!(
            evaluate_auto_capture(&input, &config),
            GuardDecision::Hold(HoldReason::CaptureInFlight)
        );

        let input = GuardInput { degraded: true, ..base };
        assert_eq!(
            evaluate_auto_capture(&input, &config),
            GuardDecision::Hold(HoldReason::OrientationUnavailable)
        );
    }

    #[test]
    fn test_sample_field_of_view() {
        let mut grid = CoverageGrid::new(5.0);
        grid.mark_covered(0.0, 0.0, 40.0, 50.0);

        let at_edge = Orientation::looking_at(60.0, 0.0, 0);
        assert_eq!(
            sample_field_of_view(&grid, &at_edge, 80.0, 100.0, 0.3),
            FovSamples::new(1, 4)
        );

        let outside = Orientation::looking_at(180.0, 0.0, 0);
        assert_eq!(
            sample_field_of_view(&grid, &outside, 80.0, 100.0, 0.3),
            FovSamples::new(0, 5)
        );
    }

    #[test]
    fn test_samples_outside_band() {
        let grid = CoverageGrid::with_band(5.0, -30.0, 30.0);
        let looking_up = Orientation::looking_at(0.0, 20.0, 0);
        let samples = sample_field_of_view(&grid, &looking_up, 60.0, 80.0, 0.3);
        assert_eq!(samples.outside, 1);
        assert_eq!(samples.uncovered, 4);
    }
}
