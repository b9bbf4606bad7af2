//! Game controller: press / drag / release cycle, commits, resets.

use crate::BoardSize;
use crate::cascade::clear_and_cascade;
use crate::grid::{ColorSource, DotColor, DotFactory, Grid, Pos};
use crate::matcher::{self, MatchKind};
use crate::path::PathTracker;
use crate::score::ScoreKeeper;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Gesture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dragging,
}

/// Notifications for the audio and persistence collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Matched {
        kind: MatchKind,
        cleared: usize,
        points: u32,
    },
    HighScoreChanged(u32),
    BoardResized(BoardSize),
    GameOver {
        score: u32,
    },
}

/// Fire-and-forget hook; the controller never looks at what the listener does.
pub trait GameListener {
    fn notify(&mut self, event: &GameEvent);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("unsupported board size: {0} (expected 6, 8 or 10)")]
    UnsupportedBoardSize(usize),
}

/// A committed match as seen by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub kind: MatchKind,
    pub color: DotColor,
    pub cleared: usize,
    pub points: u32,
}

/// Owns the single live grid, path and score of a game.
pub struct GameController {
    size: BoardSize,
    factory: DotFactory,
    grid: Grid,
    path: PathTracker,
    score: ScoreKeeper,
    /// Cells refilled by the most recent commit (for pop-in effects).
    refilled: Vec<Pos>,
    listener: Option<Box<dyn GameListener>>,
}

impl GameController {
    pub fn new(
        size: BoardSize,
        palette_size: usize,
        colors: Box<dyn ColorSource>,
        high_score: u32,
    ) -> Self {
        let mut factory = DotFactory::new(palette_size, colors);
        let grid = Grid::new(size.dim(), size.dim(), &mut factory);
        info!(size = size.dim(), palette = factory.palette().len(), "new game");
        Self {
            size,
            factory,
            grid,
            path: PathTracker::new(),
            score: ScoreKeeper::new(size, high_score),
            refilled: Vec::new(),
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: Box<dyn GameListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    fn emit(&mut self, event: GameEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener.notify(&event);
        }
    }

    pub fn phase(&self) -> Phase {
        if self.path.is_active() {
            Phase::Dragging
        } else {
            Phase::Idle
        }
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn path(&self) -> &[Pos] {
        self.path.cells()
    }

    pub fn is_square(&self) -> bool {
        self.path.is_square()
    }

    /// Colour of the gesture in progress.
    pub fn active_color(&self) -> Option<DotColor> {
        self.path.color()
    }

    pub fn scores(&self) -> &ScoreKeeper {
        &self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.score.is_game_over
    }

    pub fn refilled(&self) -> &[Pos] {
        &self.refilled
    }

    /// Idle -> Dragging. Ignored on game over, during a gesture or on an empty cell.
    pub fn press(&mut self, pos: Pos) -> bool {
        if self.score.is_game_over || self.phase() == Phase::Dragging {
            return false;
        }
        self.path.begin(&self.grid, pos)
    }

    /// Pointer entered a cell while dragging.
    pub fn enter(&mut self, pos: Pos) -> bool {
        if self.score.is_game_over || self.phase() == Phase::Idle {
            return false;
        }
        self.path.extend(&self.grid, pos)
    }

    /// Dragging -> Idle. Commits a match when the path forms one.
    pub fn release(&mut self) -> Option<Outcome> {
        if self.phase() == Phase::Idle {
            return None;
        }
        let finished = self.path.end();
        let Some(found) = matcher::resolve(&finished, &self.grid) else {
            debug!(len = finished.cells.len(), "gesture aborted");
            return None;
        };

        let cascade = clear_and_cascade(&mut self.grid, &found.cells, &mut self.factory);
        self.refilled = cascade.refilled;
        let best_before = self.score.high_score;
        let points = self.score.apply_match(cascade.cleared, found.is_loop());
        info!(
            kind = ?found.kind,
            color = ?found.color,
            cleared = cascade.cleared,
            points,
            moves_left = self.score.moves_left,
            "match committed"
        );

        self.emit(GameEvent::Matched {
            kind: found.kind,
            cleared: cascade.cleared,
            points,
        });
        if self.score.high_score != best_before {
            self.emit(GameEvent::HighScoreChanged(self.score.high_score));
        }
        if self.score.check_game_over() {
            self.emit(GameEvent::GameOver {
                score: self.score.score,
            });
        }

        Some(Outcome {
            kind: found.kind,
            color: found.color,
            cleared: cascade.cleared,
            points,
        })
    }

    /// Pointer left the board: same as a release.
    pub fn leave(&mut self) -> Option<Outcome> {
        self.release()
    }

    /// Start over, optionally on a new board size given as its edge length.
    /// An unsupported size leaves the current game untouched.
    pub fn reset(&mut self, size: Option<usize>) -> Result<(), GameError> {
        let size = match size {
            None => self.size,
            Some(n) => BoardSize::from_dim(n).ok_or_else(|| {
                warn!(size = n, "rejected reset to unsupported board size");
                GameError::UnsupportedBoardSize(n)
            })?,
        };
        self.reset_to(size);
        Ok(())
    }

    pub fn reset_to(&mut self, size: BoardSize) {
        let resized = size != self.size;
        self.size = size;
        self.grid = Grid::new(size.dim(), size.dim(), &mut self.factory);
        self.path = PathTracker::new();
        self.score.reset(size);
        self.refilled.clear();
        info!(size = size.dim(), resized, "game reset");
        if resized {
            self.emit(GameEvent::BoardResized(size));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::testing::Scripted;
    use crate::score::{LOOP_MULTIPLIER, POINTS_PER_DOT};
    use DotColor::*;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    const BOARD: [[DotColor; 6]; 6] = [
        [Red, Red, Blue, Green, Yellow, Blue],
        [Red, Red, Green, Yellow, Blue, Green],
        [Yellow, Green, Blue, Red, Green, Yellow],
        [Green, Blue, Yellow, Green, Red, Blue],
        [Blue, Yellow, Green, Blue, Yellow, Red],
        [Blue, Blue, Blue, Yellow, Green, Yellow],
    ];

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<GameEvent>>>);

    impl GameListener for Recorder {
        fn notify(&mut self, event: &GameEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    /// 6x6 game on BOARD; every later dot is Purple.
    fn game(high_score: u32) -> (GameController, Recorder) {
        let seq: Vec<DotColor> = BOARD.iter().flatten().copied().chain([Purple]).collect();
        let rec = Recorder::default();
        let ctl = GameController::new(BoardSize::Six, 6, Box::new(Scripted::new(seq)), high_score)
            .with_listener(Box::new(rec.clone()));
        (ctl, rec)
    }

    fn p(row: usize, col: usize) -> Pos {
        Pos::new(row, col)
    }

    fn assert_full_and_unique(ctl: &GameController) {
        assert!(ctl.grid().is_full());
        let ids: HashSet<u64> = ctl.grid().iter().map(|(_, d)| d.id).collect();
        let n = ctl.size().dim();
        assert_eq!(ids.len(), n * n);
    }

    #[test]
    fn test_board_is_built_from_scripted_colors() {
        let (ctl, _) = game(0);
        assert_eq!(ctl.grid().color_at(p(5, 2)), Some(Blue));
        assert_eq!(ctl.grid().positions_of(Red).len(), 7);
        assert_eq!(ctl.phase(), Phase::Idle);
    }

    #[test]
    fn test_straight_line_of_three() {
        let (mut ctl, rec) = game(0);
        assert!(ctl.press(p(5, 0)));
        assert_eq!(ctl.phase(), Phase::Dragging);
        assert!(ctl.enter(p(5, 1)));
        assert!(ctl.enter(p(5, 2)));
        let out = ctl.release().unwrap();
        assert_eq!(out.kind, MatchKind::Line);
        assert_eq!(out.cleared, 3);
        assert_eq!(ctl.scores().moves_left, 29);
        assert_eq!(ctl.scores().score, 3 * POINTS_PER_DOT);
        assert_eq!(ctl.phase(), Phase::Idle);
        assert_full_and_unique(&ctl);
        // bottom row now holds what was above it
        assert_eq!(ctl.grid().color_at(p(5, 0)), Some(Blue));
        assert_eq!(ctl.grid().color_at(p(5, 1)), Some(Yellow));
        assert_eq!(ctl.grid().color_at(p(5, 2)), Some(Green));
        assert_eq!(ctl.refilled(), &[p(0, 0), p(0, 1), p(0, 2)]);
        assert_eq!(
            rec.0.borrow().as_slice(),
            &[
                GameEvent::Matched {
                    kind: MatchKind::Line,
                    cleared: 3,
                    points: 30
                },
                GameEvent::HighScoreChanged(30),
            ]
        );
    }

    #[test]
    fn test_loop_clears_every_dot_of_the_color() {
        let (mut ctl, _) = game(0);
        ctl.press(p(0, 0));
        ctl.enter(p(0, 1));
        ctl.enter(p(1, 1));
        ctl.enter(p(1, 0));
        assert!(ctl.enter(p(0, 0)));
        assert!(ctl.is_square());
        let out = ctl.release().unwrap();
        assert_eq!(out.kind, MatchKind::Loop);
        assert_eq!(out.cleared, 7);
        assert_eq!(out.points, 7 * POINTS_PER_DOT * LOOP_MULTIPLIER);
        assert!(ctl.grid().positions_of(Red).is_empty());
        assert_eq!(ctl.scores().moves_left, 29);
        assert!(!ctl.is_square());
        assert_full_and_unique(&ctl);
    }

    #[test]
    fn test_loop_beats_line_of_same_color() {
        let (mut line, _) = game(0);
        line.press(p(0, 0));
        line.enter(p(0, 1));
        line.enter(p(1, 1));
        line.enter(p(1, 0));
        let l = line.release().unwrap();
        assert_eq!(l.cleared, 4);

        let (mut lp, _) = game(0);
        lp.press(p(0, 0));
        lp.enter(p(0, 1));
        lp.enter(p(1, 1));
        lp.enter(p(1, 0));
        lp.enter(p(0, 0));
        let o = lp.release().unwrap();
        assert!(o.cleared > l.cleared);
        assert!(o.points > l.points);
    }

    #[test]
    fn test_single_dot_release_spends_nothing() {
        let (mut ctl, rec) = game(0);
        let before = ctl.grid().clone();
        assert!(ctl.press(p(2, 2)));
        assert!(!ctl.enter(p(2, 3)));
        assert_eq!(ctl.release(), None);
        assert_eq!(ctl.phase(), Phase::Idle);
        assert_eq!(ctl.scores().moves_left, 30);
        assert_eq!(ctl.scores().score, 0);
        assert_eq!(ctl.grid(), &before);
        assert!(rec.0.borrow().is_empty());
    }

    #[test]
    fn test_press_on_empty_cell_keeps_idle() {
        let (mut ctl, _) = game(0);
        ctl.grid.take(p(3, 3));
        assert!(!ctl.press(p(3, 3)));
        assert!(!ctl.press(p(6, 0)));
        assert_eq!(ctl.phase(), Phase::Idle);
        assert!(ctl.path().is_empty());
    }

    #[test]
    fn test_second_press_during_gesture_is_ignored() {
        let (mut ctl, _) = game(0);
        ctl.press(p(5, 0));
        assert!(!ctl.press(p(0, 5)));
        assert_eq!(ctl.path(), &[p(5, 0)]);
    }

    #[test]
    fn test_release_and_enter_while_idle_are_no_ops() {
        let (mut ctl, _) = game(0);
        assert!(!ctl.enter(p(0, 0)));
        assert_eq!(ctl.release(), None);
        assert_eq!(ctl.leave(), None);
    }

    #[test]
    fn test_leave_commits_like_release() {
        let (mut ctl, _) = game(0);
        ctl.press(p(5, 0));
        ctl.enter(p(5, 1));
        let out = ctl.leave().unwrap();
        assert_eq!(out.cleared, 2);
        assert_eq!(ctl.phase(), Phase::Idle);
    }

    #[test]
    fn test_last_move_ends_the_game() {
        let (mut ctl, rec) = game(0);
        ctl.score.moves_left = 1;
        ctl.press(p(5, 0));
        ctl.enter(p(5, 1));
        ctl.release().unwrap();
        assert!(ctl.is_game_over());
        assert_eq!(ctl.scores().moves_left, 0);
        assert!(rec.0.borrow().contains(&GameEvent::GameOver { score: 20 }));

        let grid = ctl.grid().clone();
        assert!(!ctl.press(p(5, 3)));
        assert!(!ctl.enter(p(5, 4)));
        assert_eq!(ctl.release(), None);
        assert_eq!(ctl.grid(), &grid);
    }

    #[test]
    fn test_reset_to_ten() {
        let (mut ctl, rec) = game(500);
        ctl.press(p(5, 0));
        ctl.enter(p(5, 1));
        ctl.release();
        ctl.reset(Some(10)).unwrap();
        assert_eq!(ctl.size(), BoardSize::Ten);
        assert_eq!(ctl.grid().rows(), 10);
        assert_eq!(ctl.grid().cols(), 10);
        assert_full_and_unique(&ctl);
        assert_eq!(ctl.scores().score, 0);
        assert_eq!(ctl.scores().moves_left, BoardSize::Ten.moves());
        assert!(!ctl.is_game_over());
        assert_eq!(ctl.scores().high_score, 500);
        assert_eq!(ctl.phase(), Phase::Idle);
        assert_eq!(
            rec.0.borrow().last(),
            Some(&GameEvent::BoardResized(BoardSize::Ten))
        );
    }

    #[test]
    fn test_reset_clears_game_over() {
        let (mut ctl, _) = game(0);
        ctl.score.moves_left = 1;
        ctl.press(p(5, 0));
        ctl.enter(p(5, 1));
        ctl.release();
        assert!(ctl.is_game_over());
        ctl.reset(None).unwrap();
        assert!(!ctl.is_game_over());
        assert_eq!(ctl.size(), BoardSize::Six);
        assert!(ctl.press(p(0, 0)));
    }

    #[test]
    fn test_reset_with_unsupported_size_is_rejected() {
        let (mut ctl, rec) = game(0);
        let grid = ctl.grid().clone();
        assert_eq!(ctl.reset(Some(7)), Err(GameError::UnsupportedBoardSize(7)));
        assert_eq!(ctl.size(), BoardSize::Six);
        assert_eq!(ctl.grid(), &grid);
        assert!(rec.0.borrow().is_empty());
    }

    #[test]
    fn test_ids_survive_reset_without_reuse() {
        let (mut ctl, _) = game(0);
        let old: HashSet<u64> = ctl.grid().iter().map(|(_, d)| d.id).collect();
        ctl.reset(None).unwrap();
        assert!(ctl.grid().iter().all(|(_, d)| !old.contains(&d.id)));
    }
}
