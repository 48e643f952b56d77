//! Discretized sphere coverage.
//!
//! The sphere is split into fixed angular cells addressed by
//! `(col, row)`. Columns run with yaw from 0°; row 0 is the top of the grid
//! (highest pitch). A grid may cover the full sphere or only a band of
//! pitch rows, in which case directions outside the band have no cell.

mod coverage;

pub use coverage::CoverageGrid;

/// Address of one coverage cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellIndex {
    pub col: usize,
    pub row: usize,
}

impl CellIndex {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// Classification of a direction against the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    /// The direction's cell has been photographed
    Covered,
    /// The direction's cell has not been photographed yet
    Uncovered,
    /// The direction lies outside the grid's pitch band
    Outside,
}
