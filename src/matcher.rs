//! Deciding what a released path clears.

use crate::grid::{DotColor, Grid, Pos};
use crate::path::FinishedPath;

/// Shortest path that counts as a match.
pub const MIN_MATCH_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Exactly the dots on the drawn path.
    Line,
    /// Every dot of the path colour on the board.
    Loop,
}

/// A committed match, resolved to concrete coordinates against the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub kind: MatchKind,
    pub color: DotColor,
    pub cells: Vec<Pos>,
}

impl Match {
    pub fn is_loop(&self) -> bool {
        self.kind == MatchKind::Loop
    }
}

/// Judge a finished path. `None` means no match: nothing changes and no move is spent.
pub fn resolve(path: &FinishedPath, grid: &Grid) -> Option<Match> {
    if path.cells.len() < MIN_MATCH_LEN {
        return None;
    }
    let color = path.color?;
    if path.is_square {
        Some(Match {
            kind: MatchKind::Loop,
            color,
            cells: grid.positions_of(color),
        })
    } else {
        Some(Match {
            kind: MatchKind::Line,
            color,
            cells: path.cells.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::testing::scripted_factory;
    use DotColor::*;

    fn grid() -> Grid {
        let mut f = scripted_factory(vec![Red]);
        Grid::from_colors(
            &[
                &[Red, Red, Blue, Red],
                &[Red, Red, Blue, Green],
                &[Blue, Green, Red, Green],
            ],
            &mut f,
        )
    }

    fn finished(cells: Vec<Pos>, is_square: bool) -> FinishedPath {
        FinishedPath {
            cells,
            color: Some(Red),
            is_square,
        }
    }

    #[test]
    fn test_short_path_is_not_a_match() {
        let g = grid();
        assert_eq!(resolve(&finished(vec![], false), &g), None);
        assert_eq!(resolve(&finished(vec![Pos::new(0, 0)], false), &g), None);
    }

    #[test]
    fn test_line_match_is_exactly_the_path() {
        let g = grid();
        let cells = vec![Pos::new(0, 0), Pos::new(0, 1)];
        let m = resolve(&finished(cells.clone(), false), &g).unwrap();
        assert_eq!(m.kind, MatchKind::Line);
        assert_eq!(m.cells, cells);
        assert!(!m.is_loop());
    }

    #[test]
    fn test_loop_match_takes_every_dot_of_the_color() {
        let g = grid();
        let square = vec![Pos::new(0, 0), Pos::new(0, 1), Pos::new(1, 1), Pos::new(1, 0)];
        let m = resolve(&finished(square, true), &g).unwrap();
        assert_eq!(m.kind, MatchKind::Loop);
        assert_eq!(m.color, Red);
        assert_eq!(m.cells.len(), 6);
        assert!(m.cells.contains(&Pos::new(0, 3)));
        assert!(m.cells.contains(&Pos::new(2, 2)));
    }
}
