//! Grid, camera, footprint and completion sections.

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::grid::CoverageGrid;

/// Coverage grid section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSection {
    /// Angular cell size (degrees)
    #[serde(default = "defaults::cell_size_deg")]
    pub cell_size_deg: f32,

    /// Lowest pitch of the capture band (degrees)
    #[serde(default = "defaults::min_pitch")]
    pub min_pitch: f32,

    /// Highest pitch of the capture band (degrees)
    #[serde(default = "defaults::max_pitch")]
    pub max_pitch: f32,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            cell_size_deg: defaults::cell_size_deg(),
            min_pitch: defaults::min_pitch(),
            max_pitch: defaults::max_pitch(),
        }
    }
}

impl GridSection {
    /// Build an empty grid for a new session.
    pub fn to_grid(&self) -> CoverageGrid {
        CoverageGrid::with_band(self.cell_size_deg, self.min_pitch, self.max_pitch)
    }
}

/// Camera section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraSection {
    /// Horizontal field of view (degrees)
    #[serde(default = "defaults::h_fov_deg")]
    pub h_fov_deg: f32,

    /// Vertical field of view (degrees)
    #[serde(default = "defaults::v_fov_deg")]
    pub v_fov_deg: f32,

    /// JPEG quality passed to the shutter (1-100)
    #[serde(default = "defaults::jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            h_fov_deg: defaults::h_fov_deg(),
            v_fov_deg: defaults::v_fov_deg(),
            jpeg_quality: defaults::jpeg_quality(),
        }
    }
}

/// Angular footprint one photo marks as covered.
///
/// Values are half-spans: a photo at yaw 0 with `yaw_span_deg = 30` covers
/// yaw 330..30.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FootprintSection {
    /// Yaw half-span (degrees)
    #[serde(default = "defaults::yaw_span_deg")]
    pub yaw_span_deg: f32,

    /// Pitch half-span (degrees)
    #[serde(default = "defaults::pitch_span_deg")]
    pub pitch_span_deg: f32,
}

impl Default for FootprintSection {
    fn default() -> Self {
        Self {
            yaw_span_deg: defaults::yaw_span_deg(),
            pitch_span_deg: defaults::pitch_span_deg(),
        }
    }
}

impl FootprintSection {
    /// Full yaw extent of the footprint.
    #[inline]
    pub fn full_yaw(&self) -> f32 {
        2.0 * self.yaw_span_deg
    }

    /// Full pitch extent of the footprint.
    #[inline]
    pub fn full_pitch(&self) -> f32 {
        2.0 * self.pitch_span_deg
    }
}

/// Session completion section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionSection {
    /// Coverage ratio that finishes the session automatically
    #[serde(default = "defaults::target_coverage")]
    pub target_coverage: f32,

    /// Minimum photos before the session may finish
    #[serde(default = "defaults::min_photos")]
    pub min_photos: usize,
}

impl Default for CompletionSection {
    fn default() -> Self {
        Self {
            target_coverage: defaults::target_coverage(),
            min_photos: defaults::min_photos(),
        }
    }
}
