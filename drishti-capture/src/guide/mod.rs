//! "Capture here next" guidance.
//!
//! Guides come from two passes over the coverage grid:
//! 1. **Local**: eight probes around the last photo, so the user can grow
//!    coverage outward from what they just shot
//! 2. **Global**: a coarse azimuth × elevation lattice, so sessions never
//!    stall when the neighbourhood of the last photo is already covered
//!
//! Guides are recomputed every tick and never persisted.

mod frontier;
mod projection;

pub use frontier::FrontierGuideEngine;
pub use projection::{ScreenPoint, Viewport, hint_direction, project_guide};

use serde::{Deserialize, Serialize};

use crate::config::defaults;

/// Direction label pointing from one orientation toward another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GuideDirection {
    Right,
    UpRight,
    Up,
    UpLeft,
    Left,
    DownLeft,
    Down,
    DownRight,
}

impl GuideDirection {
    const OCTANTS: [GuideDirection; 8] = [
        GuideDirection::Right,
        GuideDirection::UpRight,
        GuideDirection::Up,
        GuideDirection::UpLeft,
        GuideDirection::Left,
        GuideDirection::DownLeft,
        GuideDirection::Down,
        GuideDirection::DownRight,
    ];

    /// Nearest of the eight octants for a (yaw, pitch) delta.
    ///
    /// Positive yaw is right, positive pitch is up. A zero delta maps to
    /// `Right`.
    pub fn from_delta(d_yaw: f32, d_pitch: f32) -> Self {
        let angle = d_pitch.atan2(d_yaw).to_degrees();
        let octant = (angle / 45.0).round().rem_euclid(8.0) as usize;
        Self::OCTANTS[octant % 8]
    }

    pub fn label(&self) -> &'static str {
        match self {
            GuideDirection::Right => "right",
            GuideDirection::UpRight => "up-right",
            GuideDirection::Up => "up",
            GuideDirection::UpLeft => "up-left",
            GuideDirection::Left => "left",
            GuideDirection::DownLeft => "down-left",
            GuideDirection::Down => "down",
            GuideDirection::DownRight => "down-right",
        }
    }
}

impl std::fmt::Display for GuideDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which pass produced a guide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuideSource {
    Local,
    Global,
}

/// A suggested direction for the next photo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrontierGuide {
    pub yaw: f32,
    pub pitch: f32,
    pub direction: GuideDirection,
    pub source: GuideSource,
}

/// Frontier guide configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuideConfig {
    /// Right/left/up/down probe distance as a fraction of the full footprint
    #[serde(default = "defaults::axis_probe_factor")]
    pub axis_probe_factor: f32,

    /// Diagonal probe distance as a fraction of the full footprint
    #[serde(default = "defaults::diagonal_probe_factor")]
    pub diagonal_probe_factor: f32,

    /// Number of azimuths in the global lattice
    #[serde(default = "defaults::global_azimuths")]
    pub global_azimuths: usize,

    /// Elevations of the global lattice (degrees)
    #[serde(default = "defaults::global_elevations")]
    pub global_elevations: Vec<f32>,

    /// Global guides closer than this to a local guide are dropped (degrees)
    #[serde(default = "defaults::dedup_radius_deg")]
    pub dedup_radius_deg: f32,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            axis_probe_factor: defaults::axis_probe_factor(),
            diagonal_probe_factor: defaults::diagonal_probe_factor(),
            global_azimuths: defaults::global_azimuths(),
            global_elevations: defaults::global_elevations(),
            dedup_radius_deg: defaults::dedup_radius_deg(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_octants() {
        assert_eq!(GuideDirection::from_delta(10.0, 0.0), GuideDirection::Right);
        assert_eq!(GuideDirection::from_delta(-10.0, 0.0), GuideDirection::Left);
        assert_eq!(GuideDirection::from_delta(0.0, 10.0), GuideDirection::Up);
        assert_eq!(GuideDirection::from_delta(0.0, -10.0), GuideDirection::Down);
        assert_eq!(GuideDirection::from_delta(10.0, 9.0), GuideDirection::UpRight);
        assert_eq!(GuideDirection::from_delta(-10.0, -9.0), GuideDirection::DownLeft);
        assert_eq!(GuideDirection::from_delta(10.0, -1.0), GuideDirection::Right);
        assert_eq!(GuideDirection::from_delta(0.0, 0.0), GuideDirection::Right);
    }

    #[test]
    fn test_labels() {
        assert_eq!(GuideDirection::DownRight.label(), "down-right");
        assert_eq!(GuideDirection::UpLeft.to_string(), "up-left");
    }
}
