//! Frontier guide computation.

use super::{FrontierGuide, GuideConfig, GuideDirection, GuideSource};
use crate::config::FootprintSection;
use crate::core::{Orientation, angular_distance, yaw_delta};
use crate::grid::{CellIndex, CellState, CoverageGrid};

/// Computes "capture here next" directions from the coverage grid.
#[derive(Clone, Debug)]
pub struct FrontierGuideEngine {
    config: GuideConfig,
    /// Full footprint of one photo (yaw, pitch), degrees
    footprint: (f32, f32),
}

impl FrontierGuideEngine {
    /// Create an engine for photos with the given footprint half-spans.
    pub fn new(config: GuideConfig, footprint: &FootprintSection) -> Self {
        Self {
            config,
            footprint: (footprint.full_yaw(), footprint.full_pitch()),
        }
    }

    /// Compute guides for the current grid.
    ///
    /// With no last photo only the global pass runs. Local guides come
    /// first, then global ones in lattice order (elevation, then azimuth).
    pub fn compute_guides(
        &self,
        last_photo: Option<&Orientation>,
        grid: &CoverageGrid,
    ) -> Vec<FrontierGuide> {
        let mut guides = match last_photo {
            Some(last) => self.local_guides(last, grid),
            None => Vec::new(),
        };
        let anchor = last_photo.copied().unwrap_or(Orientation::FALLBACK);
        let local_count = guides.len();

        let azimuth_step = 360.0 / self.config.global_azimuths.max(1) as f32;
        for &pitch in &self.config.global_elevations {
            for i in 0..self.config.global_azimuths {
                let yaw = i as f32 * azimuth_step;
                if grid.classify(yaw, pitch) != CellState::Uncovered {
                    continue;
                }
                let near_local = guides[..local_count].iter().any(|g| {
                    angular_distance(g.yaw, g.pitch, yaw, pitch) < self.config.dedup_radius_deg
                });
                if near_local {
                    continue;
                }
                guides.push(FrontierGuide {
                    yaw,
                    pitch,
                    direction: GuideDirection::from_delta(
                        yaw_delta(anchor.yaw, yaw),
                        pitch - anchor.pitch,
                    ),
                    source: GuideSource::Global,
                });
            }
        }

        guides
    }

    /// Eight probes around the last photo.
    fn local_guides(&self, last: &Orientation, grid: &CoverageGrid) -> Vec<FrontierGuide> {
        let (full_yaw, full_pitch) = self.footprint;
        let ax = self.config.axis_probe_factor;
        let dg = self.config.diagonal_probe_factor;

        let probes = [
            (ax * full_yaw, 0.0, GuideDirection::Right),
            (-ax * full_yaw, 0.0, GuideDirection::Left),
            (0.0, ax * full_pitch, GuideDirection::Up),
            (0.0, -ax * full_pitch, GuideDirection::Down),
            (dg * full_yaw, dg * full_pitch, GuideDirection::UpRight),
            (-dg * full_yaw, dg * full_pitch, GuideDirection::UpLeft),
            (dg * full_yaw, -dg * full_pitch, GuideDirection::DownRight),
            (-dg * full_yaw, -dg * full_pitch, GuideDirection::DownLeft),
        ];

        let mut seen: Vec<CellIndex> = Vec::with_capacity(probes.len());
        let mut guides = Vec::with_capacity(probes.len());
        for (d_yaw, d_pitch, direction) in probes {
            let (yaw, pitch) = last.offset(d_yaw, d_pitch);
            let Some(cell) = grid.cell_at(yaw, pitch) else {
                continue;
            };
            // Probes clamped against a pole can land in the same cell
            if grid.cell_covered(cell) || seen.contains(&cell) {
                continue;
            }
            seen.push(cell);
            guides.push(FrontierGuide {
                yaw,
                pitch,
                direction,
                source: GuideSource::Local,
            });
        }
        guides
    }

    /// Guide nearest to the current orientation by great-circle distance.
    pub fn closest_guide<'a>(
        guides: &'a [FrontierGuide],
        current: &Orientation,
    ) -> Option<&'a FrontierGuide> {
        guides.iter().min_by(|a, b| {
            current
                .distance_to(a.yaw, a.pitch)
                .total_cmp(&current.distance_to(b.yaw, b.pitch))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> FrontierGuideEngine {
        FrontierGuideEngine::new(
            GuideConfig::default(),
            &FootprintSection {
                yaw_span_deg: 30.0,
                pitch_span_deg: 40.0,
            },
        )
    }

    #[test]
    fn test_empty_grid_without_photo_is_global_lattice() {
        let grid = CoverageGrid::new(5.0);
        let guides = engine().compute_guides(None, &grid);
        assert_eq!(guides.len(), 40);
        assert!(guides.iter().all(|g| g.source == GuideSource::Global));
    }

    #[test]
    fn test_local_probes_around_last_photo() {
        let mut grid = CoverageGrid::new(5.0);
        let last = Orientation::looking_at(0.0, 0.0, 0);
        grid.mark_covered(last.yaw, last.pitch, 30.0, 40.0);

        let guides = engine().compute_guides(Some(&last), &grid);
        let local: Vec<_> = guides
            .iter()
            .filter(|g| g.source == GuideSource::Local)
            .collect();
        assert_eq!(local.len(), 8);

        let right = local
            .iter()
            .find(|g| g.direction == GuideDirection::Right)
            .unwrap();
        assert_eq!(right.yaw, 45.0);
        assert_eq!(right.pitch, 0.0);

        let up = local
            .iter()
            .find(|g| g.direction == GuideDirection::Up)
            .unwrap();
        assert_eq!(up.pitch, 60.0);
    }

    #[test]
    fn test_global_guides_skip_near_local() {
        let mut grid = CoverageGrid::new(5.0);
        let last = Orientation::looking_at(0.0, 0.0, 0);
        grid.mark_covered(0.0, 0.0, 30.0, 40.0);

        let guides = engine().compute_guides(Some(&last), &grid);
        let (local, global): (Vec<&FrontierGuide>, Vec<&FrontierGuide>) =
            guides.iter().partition(|g| g.source == GuideSource::Local);
        for g in &global {
            for l in &local {
                assert!(angular_distance(g.yaw, g.pitch, l.yaw, l.pitch) >= 30.0);
            }
        }
    }

    #[test]
    fn test_never_returns_covered_guides() {
        let mut grid = CoverageGrid::new(5.0);
        grid.mark_covered(0.0, 0.0, 90.0, 45.0);
        let last = Orientation::looking_at(10.0, 5.0, 0);
        let guides = engine().compute_guides(Some(&last), &grid);
        assert!(!guides.is_empty());
        assert!(guides.iter().all(|g| !grid.is_covered(g.yaw, g.pitch)));
    }

    #[test]
    fn test_closest_guide() {
        let guides = [
            FrontierGuide {
                yaw: 90.0,
                pitch: 0.0,
                direction: GuideDirection::Right,
                source: GuideSource::Global,
            },
            FrontierGuide {
                yaw: 350.0,
                pitch: 10.0,
                direction: GuideDirection::UpLeft,
                source: GuideSource::Local,
            },
        ];
        let current = Orientation::looking_at(5.0, 0.0, 0);
        let closest = FrontierGuideEngine::closest_guide(&guides, &current).unwrap();
        assert_eq!(closest.yaw, 350.0);
        assert!(FrontierGuideEngine::closest_guide(&[], &current).is_none());
    }
}
