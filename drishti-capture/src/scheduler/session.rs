//! Capture session state.

use serde::{Deserialize, Serialize};

use super::camera::ImageRef;
use crate::config::FootprintSection;
use crate::core::Orientation;
use crate::grid::CoverageGrid;

/// One photo of the session. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapturedPhoto {
    /// 1-based position in the session
    pub id: u32,
    pub image: ImageRef,
    /// Orientation when the capture was triggered
    pub orientation: Orientation,
    pub captured_at_ms: u64,
}

/// Serialized per-photo orientation entry of the stitch metadata.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationRecord {
    pub id: u32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub timestamp: u64,
}

impl From<&CapturedPhoto> for OrientationRecord {
    fn from(photo: &CapturedPhoto) -> Self {
        Self {
            id: photo.id,
            yaw: photo.orientation.yaw,
            pitch: photo.orientation.pitch,
            roll: photo.orientation.roll,
            timestamp: photo.captured_at_ms,
        }
    }
}

/// Snapshot of a finished session handed to stitching.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StitchJob {
    pub epoch: u64,
    pub photos: Vec<CapturedPhoto>,
    pub record: Vec<OrientationRecord>,
    pub coverage_ratio: f32,
}

/// State of one capture session.
///
/// Owns the coverage grid. Only the scheduler mutates it.
#[derive(Clone, Debug)]
pub struct CaptureSession {
    epoch: u64,
    grid: CoverageGrid,
    photos: Vec<CapturedPhoto>,
    record: Vec<OrientationRecord>,
    coverage_ratio: f32,
    last_trigger_ms: Option<u64>,
    in_flight: bool,
}

impl CaptureSession {
    pub(crate) fn new(epoch: u64, grid: CoverageGrid) -> Self {
        Self {
            epoch,
            grid,
            photos: Vec::new(),
            record: Vec::new(),
            coverage_ratio: 0.0,
            last_trigger_ms: None,
            in_flight: false,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn grid(&self) -> &CoverageGrid {
        &self.grid
    }

    pub fn photos(&self) -> &[CapturedPhoto] {
        &self.photos
    }

    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    pub fn last_photo(&self) -> Option<&CapturedPhoto> {
        self.photos.last()
    }

    /// Orientation record in capture order.
    pub fn record(&self) -> &[OrientationRecord] {
        &self.record
    }

    /// Highest coverage ratio reached; never decreases.
    pub fn coverage_ratio(&self) -> f32 {
        self.coverage_ratio
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Milliseconds since the last trigger, `None` before the first.
    pub fn since_last_trigger(&self, now_ms: u64) -> Option<u64> {
        self.last_trigger_ms
            .map(|last| now_ms.saturating_sub(last))
    }

    pub(crate) fn begin_capture(&mut self, now_ms: u64) {
        self.in_flight = true;
        self.last_trigger_ms = Some(now_ms);
    }

    pub(crate) fn end_capture(&mut self) {
        self.in_flight = false;
    }

    /// Store a photo and mark its footprint. Returns the new photo.
    pub(crate) fn add_photo(
        &mut self,
        image: ImageRef,
        orientation: Orientation,
        captured_at_ms: u64,
        footprint: &FootprintSection,
    ) -> &CapturedPhoto {
        let photo = CapturedPhoto {
            id: self.photos.len() as u32 + 1,
            image,
            orientation,
            captured_at_ms,
        };
        let newly = self.grid.mark_covered(
            orientation.yaw,
            orientation.pitch,
            footprint.yaw_span_deg,
            footprint.pitch_span_deg,
        );
        self.coverage_ratio = self.coverage_ratio.max(self.grid.coverage_ratio());
        tracing::debug!(
            "Photo {} at yaw {:.1} pitch {:.1}: {} new cells, coverage {:.3}",
            photo.id,
            orientation.yaw,
            orientation.pitch,
            newly,
            self.coverage_ratio
        );

        self.record.push(OrientationRecord::from(&photo));
        self.photos.push(photo);
        &self.photos[self.photos.len() - 1]
    }

    /// Snapshot for stitching.
    pub fn stitch_job(&self) -> StitchJob {
        StitchJob {
            epoch: self.epoch,
            photos: self.photos.clone(),
            record: self.record.clone(),
            coverage_ratio: self.coverage_ratio,
        }
    }
}
