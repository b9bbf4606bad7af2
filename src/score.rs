//! Score, best score, moves and game over.

use crate::BoardSize;
use tracing::info;

/// Points for every cleared dot.
pub const POINTS_PER_DOT: u32 = 10;
/// Loop clears multiply the per-dot award.
pub const LOOP_MULTIPLIER: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreKeeper {
    pub score: u32,
    pub high_score: u32,
    pub moves_left: u32,
    pub is_game_over: bool,
}

impl ScoreKeeper {
    pub fn new(size: BoardSize, high_score: u32) -> Self {
        Self {
            score: 0,
            high_score,
            moves_left: size.moves(),
            is_game_over: false,
        }
    }

    /// Points a clear of `cleared` dots is worth.
    pub fn points_for(cleared: usize, was_loop: bool) -> u32 {
        let base = (cleared as u32).saturating_mul(POINTS_PER_DOT);
        if was_loop {
            base.saturating_mul(LOOP_MULTIPLIER)
        } else {
            base
        }
    }

    /// Book a committed match. Returns the points awarded.
    pub fn apply_match(&mut self, cleared: usize, was_loop: bool) -> u32 {
        let points = Self::points_for(cleared, was_loop);
        self.score = self.score.saturating_add(points);
        self.moves_left = self.moves_left.saturating_sub(1);
        self.high_score = self.high_score.max(self.score);
        points
    }

    /// Flag game over once no moves remain. Returns the flag.
    pub fn check_game_over(&mut self) -> bool {
        if self.moves_left == 0 && !self.is_game_over {
            self.is_game_over = true;
            info!(score = self.score, "game over");
        }
        self.is_game_over
    }

    /// New game on `size`; the best score survives.
    pub fn reset(&mut self, size: BoardSize) {
        self.score = 0;
        self.moves_left = size.moves();
        self.is_game_over = false;
    }
}
