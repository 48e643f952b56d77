//! Device orientation types.

use serde::{Deserialize, Serialize};

use super::angles::{angular_distance, clamp_pitch, wrap_yaw};

/// Device orientation relative to the session reference heading.
///
/// Yaw is always in `[0, 360)` and pitch in `[-90, 90]`; the constructor
/// normalizes both so no other code has to.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Heading in degrees, `[0, 360)`
    pub yaw: f32,
    /// Vertical tilt in degrees, `[-90, 90]`
    pub pitch: f32,
    /// Lean in degrees
    pub roll: f32,
    /// Sample timestamp in milliseconds
    pub timestamp_ms: u64,
}

impl Orientation {
    /// Fixed orientation reported while the orientation stream is unavailable.
    pub const FALLBACK: Orientation = Orientation {
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
        timestamp_ms: 0,
    };

    /// Create a normalized orientation.
    pub fn new(yaw: f32, pitch: f32, roll: f32, timestamp_ms: u64) -> Self {
        Self {
            yaw: wrap_yaw(yaw),
            pitch: clamp_pitch(pitch),
            roll,
            timestamp_ms,
        }
    }

    /// Orientation looking at (yaw, pitch) with no roll.
    pub fn looking_at(yaw: f32, pitch: f32, timestamp_ms: u64) -> Self {
        Self::new(yaw, pitch, 0.0, timestamp_ms)
    }

    /// Direction offset from this orientation, normalized into the domain.
    ///
    /// Returns `(yaw, pitch)`; yaw wraps, pitch clamps.
    #[inline]
    pub fn offset(&self, d_yaw: f32, d_pitch: f32) -> (f32, f32) {
        (wrap_yaw(self.yaw + d_yaw), clamp_pitch(self.pitch + d_pitch))
    }

    /// Great-circle distance to a direction, in degrees.
    #[inline]
    pub fn distance_to(&self, yaw: f32, pitch: f32) -> f32 {
        angular_distance(self.yaw, self.pitch, yaw, pitch)
    }
}

/// Unsmoothed rotation-rate magnitudes on the two rotation axes (deg/s).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AngularRate {
    /// Rotation rate about the vertical axis
    pub yaw_rate: f32,
    /// Rotation rate about the tilt axis
    pub pitch_rate: f32,
}

impl AngularRate {
    /// Device at rest.
    pub const ZERO: AngularRate = AngularRate {
        yaw_rate: 0.0,
        pitch_rate: 0.0,
    };

    pub fn new(yaw_rate: f32, pitch_rate: f32) -> Self {
        Self {
            yaw_rate: yaw_rate.abs(),
            pitch_rate: pitch_rate.abs(),
        }
    }

    /// True if both axes are strictly below `threshold` deg/s.
    #[inline]
    pub fn is_below(&self, threshold: f32) -> bool {
        self.yaw_rate < threshold && self.pitch_rate < threshold
    }
}

/// Raw per-axis rotation rates from the motion sensor (deg/s).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationRate {
    /// Rate about the heading axis
    pub alpha: f32,
    /// Rate about the tilt axis
    pub beta: f32,
    /// Rate about the lean axis
    pub gamma: f32,
}

/// One sample from the device orientation stream.
///
/// `alpha` is the compass-style heading; a sample without it means the
/// stream cannot provide orientation and the tracker degrades.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRotation {
    /// Heading (degrees), absent when the sensor is unavailable
    #[serde(default)]
    pub alpha: Option<f32>,
    /// Front-back tilt (degrees); 90 when held upright
    pub beta: f32,
    /// Left-right lean (degrees)
    pub gamma: f32,
    /// Optional rotation rate
    #[serde(default)]
    pub rotation_rate: Option<RotationRate>,
    /// Sample timestamp (milliseconds)
    pub timestamp_ms: u64,
}

impl RawRotation {
    /// Sample from a device held still at the given raw angles.
    pub fn at_rest(alpha: f32, beta: f32, gamma: f32, timestamp_ms: u64) -> Self {
        Self {
            alpha: Some(alpha),
            beta,
            gamma,
            rotation_rate: Some(RotationRate::default()),
            timestamp_ms,
        }
    }

    /// Attach a rotation rate.
    pub fn with_rate(mut self, rate: RotationRate) -> Self {
        self.rotation_rate = Some(rate);
        self
    }
}
