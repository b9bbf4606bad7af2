//! Clear, gravity and refill.

use crate::grid::{DotFactory, Grid, Pos};
use std::collections::BTreeSet;
use tracing::debug;

/// What a cascade did to the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cascade {
    /// Dots actually removed.
    pub cleared: usize,
    /// Cells that received a freshly spawned dot, per column top-down.
    pub refilled: Vec<Pos>,
}

/// Remove the dots at `cells`, let each affected column fall, then refill from the top.
/// Duplicate or already-empty coordinates are not counted.
pub fn clear_and_cascade(grid: &mut Grid, cells: &[Pos], factory: &mut DotFactory) -> Cascade {
    let mut columns = BTreeSet::new();
    let mut cleared = 0;
    for &pos in cells {
        if grid.take(pos).is_some() {
            cleared += 1;
            columns.insert(pos.col);
        }
    }
    if cleared == 0 {
        return Cascade::default();
    }

    let mut refilled = Vec::new();
    for col in columns {
        let holes = apply_gravity(grid, col);
        for row in 0..holes {
            let pos = Pos::new(row, col);
            grid.set(pos, Some(factory.spawn()));
            refilled.push(pos);
        }
    }
    debug_assert!(grid.is_full());
    debug!(cleared, refilled = refilled.len(), "cascade finished");
    Cascade { cleared, refilled }
}

/// Compact one column downward, keeping the relative order of its dots.
/// Returns the number of empty cells left at the top.
fn apply_gravity(grid: &mut Grid, col: usize) -> usize {
    let mut blank_cells_below = 0;
    for row in (0..grid.rows()).rev() {
        let pos = Pos::new(row, col);
        match grid.take(pos) {
            Some(dot) => grid.set(Pos::new(row + blank_cells_below, col), Some(dot)),
            None => blank_cells_below += 1,
        }
    }
    blank_cells_below
}
