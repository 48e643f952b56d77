//! Orientation sources for the simulator.
//!
//! A recording is JSON Lines, one [`RawRotation`] per line:
//!
//! ```text
//! {"alpha":137.0,"beta":90.0,"gamma":0.4,"rotationRate":{"alpha":0.1,"beta":0.0,"gamma":0.0},"timestampMs":0}
//! {"alpha":136.2,"beta":90.1,"gamma":0.4,"rotationRate":{"alpha":18.0,"beta":0.3,"gamma":0.0},"timestampMs":50}
//! ```
//!
//! Without a recording, [`SweepPlan`] synthesizes a stop-and-go sweep through
//! a list of capture positions.

use std::io::BufRead;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use drishti_capture::core::{wrap_yaw, yaw_delta};
use drishti_capture::{RawRotation, RotationRate};

use crate::error::{DrishtiError, Result};

/// Load a JSON Lines recording.
pub fn load_recording(path: &Path) -> Result<Vec<RawRotation>> {
    let file = std::fs::File::open(path)?;
    let samples = parse_recording(std::io::BufReader::new(file))?;
    tracing::info!("Loaded {} orientation samples from {:?}", samples.len(), path);
    Ok(samples)
}

/// Parse JSON Lines. Blank lines and `#` comments are skipped.
pub fn parse_recording(reader: impl BufRead) -> Result<Vec<RawRotation>> {
    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let sample: RawRotation = serde_json::from_str(line)
            .map_err(|e| DrishtiError::Replay(format!("line {}: {}", index + 1, e)))?;
        if let Some(prev) = samples.last().map(|s: &RawRotation| s.timestamp_ms)
            && sample.timestamp_ms < prev
        {
            return Err(DrishtiError::Replay(format!(
                "line {}: timestamp {} goes backwards",
                index + 1,
                sample.timestamp_ms
            )));
        }
        samples.push(sample);
    }
    if samples.is_empty() {
        return Err(DrishtiError::Replay("recording has no samples".to_string()));
    }
    Ok(samples)
}

/// Synthetic stop-and-go sweep.
///
/// The device turns to each position, holds still, then turns to the next.
#[derive(Clone, Debug)]
pub struct SweepPlan {
    /// Capture positions as (yaw, pitch), visited in order
    pub positions: Vec<(f32, f32)>,
    /// Raw heading at yaw 0
    pub base_heading: f32,
    /// Sample period (ms)
    pub period_ms: u64,
    /// Time spent turning between positions (ms)
    pub move_ms: u64,
    /// Time held at each position (ms)
    pub hold_ms: u64,
    /// Hand tremor amplitude while holding (degrees)
    pub jitter_deg: f32,
    pub seed: u64,
}

impl SweepPlan {
    /// `count` positions evenly spaced around the horizon.
    pub fn horizon(count: usize, seed: u64) -> Self {
        let step = 360.0 / count.max(1) as f32;
        Self {
            positions: (0..count).map(|i| (i as f32 * step, 0.0)).collect(),
            base_heading: 137.0,
            period_ms: 50,
            move_ms: 1_000,
            hold_ms: 2_000,
            jitter_deg: 0.3,
            seed,
        }
    }

    /// Generate the raw sample stream.
    pub fn samples(&self) -> Vec<RawRotation> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let period = self.period_ms.max(1);
        let mut samples = Vec::new();
        let mut t = 0u64;

        let Some(&(first_yaw, first_pitch)) = self.positions.first() else {
            return samples;
        };
        // Exact first sample: it fixes the reference heading
        samples.push(self.raw(first_yaw, first_pitch, 0.0, RotationRate::default(), t));

        let mut from = (first_yaw, first_pitch);
        for (i, &to) in self.positions.iter().enumerate() {
            if i > 0 {
                let d_yaw = yaw_delta(from.0, to.0);
                let d_pitch = to.1 - from.1;
                let secs = self.move_ms as f32 / 1000.0;
                let rate = RotationRate {
                    alpha: d_yaw / secs,
                    beta: d_pitch / secs,
                    gamma: 0.0,
                };
                let steps = (self.move_ms / period).max(1);
                for step in 1..=steps {
                    t += period;
                    let f = step as f32 / steps as f32;
                    let yaw = from.0 + d_yaw * f;
                    let pitch = from.1 + d_pitch * f;
                    samples.push(self.raw(yaw, pitch, 0.0, rate, t));
                }
            }

            for _ in 0..(self.hold_ms / period) {
                t += period;
                let j = self.jitter_deg;
                let jitter = |rng: &mut StdRng| if j > 0.0 { rng.gen_range(-j..j) } else { 0.0 };
                let rate = RotationRate {
                    alpha: jitter(&mut rng) * 4.0,
                    beta: jitter(&mut rng) * 4.0,
                    gamma: 0.0,
                };
                let yaw = to.0 + jitter(&mut rng);
                let pitch = to.1 + jitter(&mut rng);
                let roll = jitter(&mut rng);
                samples.push(self.raw(yaw, pitch, roll, rate, t));
            }
            from = to;
        }
        samples
    }

    fn raw(&self, yaw: f32, pitch: f32, roll: f32, rate: RotationRate, t: u64) -> RawRotation {
        // Heading decreases as yaw increases
        RawRotation::at_rest(wrap_yaw(self.base_heading - yaw), pitch + 90.0, roll, t)
            .with_rate(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use drishti_capture::OrientationTracker;

    #[test]
    fn test_parse_recording() {
        let text = r#"
# device held upright
{"alpha":10.0,"beta":90.0,"gamma":0.0,"timestampMs":0}
{"beta":90.0,"gamma":0.0,"timestampMs":50}

{"alpha":350.0,"beta":100.0,"gamma":1.0,"rotationRate":{"alpha":5.0,"beta":0.0,"gamma":0.0},"timestampMs":100}
"#;
        let samples = parse_recording(text.as_bytes()).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[1].alpha, None);
        assert_eq!(samples[2].rotation_rate.map(|r| r.alpha), Some(5.0));
    }

    #[test]
    fn test_parse_errors_name_the_line() {
        let err = parse_recording("{\"beta\":1}\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 1"));

        let backwards = concat!(
            "{\"alpha\":0.0,\"beta\":90.0,\"gamma\":0.0,\"timestampMs\":100}\n",
            "{\"alpha\":0.0,\"beta\":90.0,\"gamma\":0.0,\"timestampMs\":50}\n",
        );
        let err = parse_recording(backwards.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));

        assert!(parse_recording("".as_bytes()).is_err());
    }

    #[test]
    fn test_sweep_visits_positions() {
        let plan = SweepPlan {
            jitter_deg: 0.0,
            ..SweepPlan::horizon(6, 1)
        };
        let samples = plan.samples();

        // 6 holds of 40 samples, 5 moves of 20, plus the first sample
        assert_eq!(samples.len(), 1 + 6 * 40 + 5 * 20);
        assert!(samples.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));

        // End of the third hold sits at yaw 120 in the tracker frame
        let mut tracker = OrientationTracker::new();
        let end_of_third_hold = 1 + 3 * 40 + 2 * 20;
        for raw in &samples[..end_of_third_hold] {
            tracker.update(raw);
        }
        assert_relative_eq!(tracker.current().yaw, 120.0, epsilon = 1e-3);
        assert_relative_eq!(tracker.current().pitch, 0.0, epsilon = 1e-3);
        assert!(tracker.angular_rate().is_below(1.0));
    }

    #[test]
    fn test_sweep_turns_fast_between_positions() {
        let plan = SweepPlan::horizon(6, 1);
        let samples = plan.samples();
        let moving = samples[1 + 40 + 10].rotation_rate.unwrap();
        assert_relative_eq!(moving.alpha.abs(), 60.0, epsilon = 1e-3);
    }

    #[test]
    fn test_sweep_is_seeded() {
        let a = SweepPlan::horizon(4, 9).samples();
        let b = SweepPlan::horizon(4, 9).samples();
        let c = SweepPlan::horizon(4, 10).samples();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
