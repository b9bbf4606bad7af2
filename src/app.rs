//! App: terminal init, main loop, key and mouse handling.

use crate::game::{GameController, GameEvent, GameListener, Outcome, Phase};
use crate::grid::{Pos, RandomColors};
use crate::input::{Action, Pointer, key_to_action, mouse_to_pointer};
use crate::theme::Theme;
use crate::ui::{self, View};
use crate::{BoardSize, GameConfig, highscores};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{debug, warn};

/// ~60 FPS redraw.
const FRAME_MS: u64 = 16;

/// Persists new best scores and rings the terminal bell on matches and resizes.
pub struct Notifier {
    scores_file: PathBuf,
    sound: bool,
}

impl Notifier {
    pub fn new(scores_file: PathBuf, sound: bool) -> Self {
        Self { scores_file, sound }
    }

    fn bell(&self) {
        if self.sound {
            let mut out = std::io::stdout();
            let _ = out.write_all(b"\x07").and_then(|_| out.flush());
        }
    }
}

impl GameListener for Notifier {
    fn notify(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Matched { .. } | GameEvent::BoardResized(_) => self.bell(),
            GameEvent::HighScoreChanged(best) => {
                if let Err(e) = highscores::save_high_score(&self.scores_file, *best) {
                    warn!(error = %e, "could not save high score");
                }
            }
            GameEvent::GameOver { score } => debug!(score, "game over"),
        }
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    game: GameController,
    /// Keyboard cursor.
    cursor: Pos,
    /// Cursor is drawn once the keyboard has been used.
    show_cursor: bool,
    /// Shown in the sidebar until the next match or reset.
    last_match: Option<Outcome>,
    /// Last frame area, for mapping mouse coordinates to cells.
    area: Rect,
    /// TachyonFX pop-in for refilled cells (created on the first frame after a match).
    pop_in_effect: Option<Effect>,
    /// Last time we processed the pop-in effect (for delta).
    pop_in_process_time: Option<Instant>,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        let colors = match config.seed {
            Some(seed) => RandomColors::seeded(seed),
            None => RandomColors::from_entropy(),
        };
        let high_score = highscores::load_high_score(&config.scores_file);
        let notifier = Notifier::new(config.scores_file.clone(), config.sound);
        let game = GameController::new(config.size, config.colors, Box::new(colors), high_score)
            .with_listener(Box::new(notifier));
        Self {
            config,
            theme,
            game,
            cursor: Pos::new(0, 0),
            show_cursor: false,
            last_match: None,
            area: Rect::default(),
            pop_in_effect: None,
            pop_in_process_time: None,
        }
    }

    fn board_rect(&self) -> Rect {
        ui::board_rect(self.area, self.game.size())
    }

    /// Drop the previous pop-in so the next frame builds one for the new refill.
    fn restart_pop_in(&mut self) {
        self.pop_in_effect = None;
        self.pop_in_process_time = None;
    }

    fn committed(&mut self, outcome: Option<Outcome>) {
        if outcome.is_some() {
            self.last_match = outcome;
            self.restart_pop_in();
        }
    }

    fn release(&mut self) {
        let outcome = self.game.release();
        self.committed(outcome);
    }

    fn leave(&mut self) {
        let outcome = self.game.leave();
        self.committed(outcome);
    }

    fn resize(&mut self, size: BoardSize) {
        if size == self.game.size() {
            return;
        }
        self.game.reset_to(size);
        self.last_match = None;
        self.clamp_cursor();
        self.restart_pop_in();
    }

    fn restart(&mut self) {
        if let Err(e) = self.game.reset(None) {
            warn!(error = %e, "restart failed");
        }
        self.last_match = None;
        self.restart_pop_in();
    }

    fn clamp_cursor(&mut self) {
        let last = self.game.size().dim() - 1;
        self.cursor = Pos::new(self.cursor.row.min(last), self.cursor.col.min(last));
    }

    fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        let last = self.game.size().dim() as isize - 1;
        let row = (self.cursor.row as isize + d_row).clamp(0, last) as usize;
        let col = (self.cursor.col as isize + d_col).clamp(0, last) as usize;
        self.cursor = Pos::new(row, col);
        self.show_cursor = true;
        if self.game.phase() == Phase::Dragging {
            self.game.enter(self.cursor);
        }
    }

    /// Returns false when the app should exit.
    fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::CursorUp => self.move_cursor(-1, 0),
            Action::CursorDown => self.move_cursor(1, 0),
            Action::CursorLeft => self.move_cursor(0, -1),
            Action::CursorRight => self.move_cursor(0, 1),
            Action::Select => {
                self.show_cursor = true;
                match self.game.phase() {
                    Phase::Idle => {
                        self.game.press(self.cursor);
                    }
                    Phase::Dragging => self.release(),
                }
            }
            Action::Restart => self.restart(),
            Action::Resize(size) => self.resize(size),
            Action::None => {}
        }
        true
    }

    fn apply_pointer(&mut self, pointer: Pointer) {
        let board = self.board_rect();
        let size = self.game.size();
        match pointer {
            Pointer::Down { column, row } => {
                if let Some(pos) = ui::cell_at(board, size, column, row) {
                    self.cursor = pos;
                    self.game.press(pos);
                }
            }
            Pointer::Drag { column, row } => match ui::cell_at(board, size, column, row) {
                Some(pos) => {
                    self.cursor = pos;
                    self.game.enter(pos);
                }
                None => self.leave(),
            },
            Pointer::Up => self.release(),
            Pointer::None => {}
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            let view = View {
                game: &self.game,
                theme: &self.theme,
                cursor: self.cursor,
                show_cursor: self.show_cursor,
                no_animation: self.config.no_animation,
                last_match: self.last_match.as_ref(),
            };
            let mut area = self.area;
            terminal.draw(|f| {
                area = f.area();
                ui::draw(
                    f,
                    &view,
                    &mut self.pop_in_effect,
                    &mut self.pop_in_process_time,
                    now,
                )
            })?;
            self.area = area;

            let timeout = Duration::from_millis(FRAME_MS).saturating_sub(now.elapsed());
            if !event::poll(timeout)? {
                continue;
            }
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        let action = key_to_action(key);
                        if self.game.is_game_over()
                            && !matches!(action, Action::Quit | Action::Restart | Action::Resize(_))
                        {
                            continue;
                        }
                        if !self.apply_action(action) {
                            return Ok(());
                        }
                    }
                    Event::Mouse(mouse) => {
                        self.apply_pointer(mouse_to_pointer(mouse));
                    }
                    _ => {}
                }
            }
        }
    }
}
