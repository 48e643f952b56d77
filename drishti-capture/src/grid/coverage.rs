//! Coverage grid storage and footprint marking.

use super::{CellIndex, CellState};
use crate::core::{clamp_pitch, wrap_yaw, yaw_delta};

/// Boolean coverage over a grid of fixed angular cells.
///
/// Cells are stored row-major; `covered` tracks the number of set cells so
/// the ratio query is O(1).
#[derive(Clone, Debug)]
pub struct CoverageGrid {
    cols: usize,
    rows: usize,
    /// Column width in degrees of yaw
    col_width: f32,
    /// Row height in degrees of pitch
    row_height: f32,
    /// Pitch of the top edge of row 0
    max_pitch: f32,
    /// Pitch of the bottom edge of the last row
    min_pitch: f32,
    cells: Vec<bool>,
    covered: usize,
}

impl CoverageGrid {
    /// Full-sphere grid: `360/cell` columns by `180/cell` rows.
    pub fn new(cell_size_deg: f32) -> Self {
        Self::with_band(cell_size_deg, -90.0, 90.0)
    }

    /// Grid restricted to the pitch band `[min_pitch, max_pitch]`.
    ///
    /// Bounds are clamped to `[-90, 90]`. Directions outside the band have
    /// no cell.
    pub fn with_band(cell_size_deg: f32, min_pitch: f32, max_pitch: f32) -> Self {
        let cell = cell_size_deg.abs().max(f32::EPSILON);
        let lo = clamp_pitch(min_pitch.min(max_pitch));
        let hi = clamp_pitch(min_pitch.max(max_pitch));

        let cols = ((360.0 / cell).round() as usize).max(1);
        let rows = (((hi - lo) / cell).round() as usize).max(1);

        Self {
            cols,
            rows,
            col_width: 360.0 / cols as f32,
            row_height: (hi - lo).max(cell) / rows as f32,
            max_pitch: hi,
            min_pitch: lo,
            cells: vec![false; cols * rows],
            covered: 0,
        }
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn covered_count(&self) -> usize {
        self.covered
    }

    /// Pitch band `(min, max)` covered by the rows.
    pub fn pitch_band(&self) -> (f32, f32) {
        (self.min_pitch, self.max_pitch)
    }

    /// Covered / total cells, unweighted.
    pub fn coverage_ratio(&self) -> f32 {
        self.covered as f32 / self.cells.len() as f32
    }

    /// Cell containing a direction, or `None` outside the pitch band.
    pub fn cell_at(&self, yaw: f32, pitch: f32) -> Option<CellIndex> {
        let pitch = clamp_pitch(pitch);
        if pitch > self.max_pitch || pitch < self.min_pitch {
            return None;
        }
        let row = (((self.max_pitch - pitch) / self.row_height).floor() as usize).min(self.rows - 1);
        let col = ((wrap_yaw(yaw) / self.col_width).floor() as usize).min(self.cols - 1);
        Some(CellIndex { col, row })
    }

    /// Center direction `(yaw, pitch)` of a cell.
    pub fn cell_center(&self, cell: CellIndex) -> (f32, f32) {
        (
            (cell.col as f32 + 0.5) * self.col_width,
            self.row_center(cell.row),
        )
    }

    #[inline]
    fn row_center(&self, row: usize) -> f32 {
        self.max_pitch - (row as f32 + 0.5) * self.row_height
    }

    #[inline]
    fn index(&self, cell: CellIndex) -> usize {
        cell.row * self.cols + cell.col
    }

    /// Whether a cell is covered. Out-of-range indices are not.
    pub fn cell_covered(&self, cell: CellIndex) -> bool {
        cell.col < self.cols && cell.row < self.rows && self.cells[self.index(cell)]
    }

    /// Whether the cell containing a direction is covered.
    pub fn is_covered(&self, yaw: f32, pitch: f32) -> bool {
        self.cell_at(yaw, pitch)
            .is_some_and(|cell| self.cell_covered(cell))
    }

    /// Classify a direction.
    pub fn classify(&self, yaw: f32, pitch: f32) -> CellState {
        match self.cell_at(yaw, pitch) {
            None => CellState::Outside,
            Some(cell) if self.cell_covered(cell) => CellState::Covered,
            Some(_) => CellState::Uncovered,
        }
    }

    /// Set one cell; returns true if it was newly covered.
    fn set(&mut self, cell: CellIndex) -> bool {
        let idx = self.index(cell);
        if self.cells[idx] {
            return false;
        }
        self.cells[idx] = true;
        self.covered += 1;
        true
    }

    /// Mark the footprint of a photo.
    ///
    /// Every cell whose center lies within `h_span` degrees of yaw (wrapping)
    /// and `v_span` degrees of pitch of the clamped center is marked, plus the
    /// cell containing the center itself. Rows beyond the grid are skipped.
    ///
    /// Returns the number of newly covered cells.
    pub fn mark_covered(&mut self, yaw: f32, pitch: f32, h_span: f32, v_span: f32) -> usize {
        let yaw = wrap_yaw(yaw);
        let pitch = clamp_pitch(pitch);
        let h_span = h_span.abs();
        let v_span = v_span.abs();

        let mut newly = 0;
        for row in 0..self.rows {
            if (self.row_center(row) - pitch).abs() > v_span {
                continue;
            }
            for col in 0..self.cols {
                let center_yaw = (col as f32 + 0.5) * self.col_width;
                if yaw_delta(yaw, center_yaw).abs() <= h_span && self.set(CellIndex { col, row }) {
                    newly += 1;
                }
            }
        }

        if let Some(cell) = self.cell_at(yaw, pitch)
            && self.set(cell)
        {
            newly += 1;
        }

        newly
    }

    /// Iterate over covered cells in row-major order.
    pub fn covered_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, covered)| **covered)
            .map(|(idx, _)| CellIndex {
                col: idx % self.cols,
                row: idx / self.cols,
            })
    }
}
