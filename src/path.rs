//! Path tracking for a single drag gesture.

use crate::grid::{DotColor, Grid, Pos};
use tracing::debug;

/// Result of a finished gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedPath {
    pub cells: Vec<Pos>,
    pub color: Option<DotColor>,
    pub is_square: bool,
}

/// Ordered selection of same-coloured, orthogonally adjacent cells.
#[derive(Debug, Clone, Default)]
pub struct PathTracker {
    cells: Vec<Pos>,
    /// Fixed for the whole gesture by the first cell.
    color: Option<DotColor>,
    is_square: bool,
}

impl PathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Pos] {
        &self.cells
    }

    pub fn color(&self) -> Option<DotColor> {
        self.color
    }

    pub fn is_square(&self) -> bool {
        self.is_square
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    /// Start a path on `pos`. Returns false if a gesture is already active
    /// or the cell holds no dot.
    pub fn begin(&mut self, grid: &Grid, pos: Pos) -> bool {
        if self.is_active() {
            return false;
        }
        let Some(color) = grid.color_at(pos) else {
            return false;
        };
        self.cells.push(pos);
        self.color = Some(color);
        self.is_square = false;
        debug!(%pos, ?color, "path started");
        true
    }

    /// Feed the next cell the pointer entered. Returns true if the path changed.
    pub fn extend(&mut self, grid: &Grid, pos: Pos) -> bool {
        if self.is_square {
            return false;
        }
        let (Some(&first), Some(&last)) = (self.cells.first(), self.cells.last()) else {
            return false;
        };
        if !grid.contains(pos) || !last.is_adjacent(pos) {
            return false;
        }
        if pos == first && self.cells.len() >= 3 {
            self.is_square = true;
            debug!(len = self.cells.len(), "loop closed");
            return true;
        }
        let n = self.cells.len();
        if n >= 2 && self.cells[n - 2] == pos {
            self.cells.pop();
            return true;
        }
        if self.contains(pos) {
            return false;
        }
        // self.color is always Some here, so an empty cell never matches
        if grid.color_at(pos) != self.color {
            return false;
        }
        self.cells.push(pos);
        true
    }

    /// Hand over the finished path and reset for the next gesture.
    pub fn end(&mut self) -> FinishedPath {
        let finished = FinishedPath {
            cells: std::mem::take(&mut self.cells),
            color: self.color.take(),
            is_square: self.is_square,
        };
        self.is_square = false;
        finished
    }
}
