//! Layout and drawing: board, connectors, sidebar, game over; pointer → cell mapping.

use crate::BoardSize;
use crate::game::{GameController, Outcome};
use crate::matcher::MatchKind;
use crate::grid::{DotColor, Pos};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal cells per grid cell. Column layout: cursor, dot, cursor, connector.
/// Row layout: dot, vertical connector.
const CELL_WIDTH: u16 = 4;
const CELL_HEIGHT: u16 = 2;

const SIDEBAR_WIDTH: u16 = 24;

/// Fade-in of refilled dots.
const POP_IN_MS: u32 = 250;

const DOT: &str = "●";
const DOT_SELECTED: &str = "◉";

/// Everything a frame needs besides the effect state.
pub struct View<'a> {
    pub game: &'a GameController,
    pub theme: &'a Theme,
    /// Keyboard cursor, drawn when `show_cursor`.
    pub cursor: Pos,
    pub show_cursor: bool,
    pub no_animation: bool,
    /// Most recent committed match of this game.
    pub last_match: Option<&'a Outcome>,
}

/// Board (border included) in terminal cells.
fn board_outer_size(size: BoardSize) -> (u16, u16) {
    let n = size.dim() as u16;
    (n * CELL_WIDTH + 2, n * CELL_HEIGHT + 2)
}

/// Board outer rect and sidebar rect, centred in `area`.
fn layout(area: Rect, size: BoardSize) -> (Rect, Rect) {
    let (bw, bh) = board_outer_size(size);
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bw + SIDEBAR_WIDTH),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(bh), Constraint::Fill(1)])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    (inner[0], inner[1])
}

/// Inner board rect (no border) for a frame of `area`.
pub fn board_rect(area: Rect, size: BoardSize) -> Rect {
    let (outer, _) = layout(area, size);
    Rect {
        x: outer.x + 1,
        y: outer.y + 1,
        width: outer.width.saturating_sub(2),
        height: outer.height.saturating_sub(2),
    }
}

/// Grid cell under a terminal position, or None outside the board.
pub fn cell_at(board: Rect, size: BoardSize, column: u16, row: u16) -> Option<Pos> {
    if !board.contains(Position::new(column, row)) {
        return None;
    }
    let pos = Pos::new(
        ((row - board.y) / CELL_HEIGHT) as usize,
        ((column - board.x) / CELL_WIDTH) as usize,
    );
    (pos.row < size.dim() && pos.col < size.dim()).then_some(pos)
}

/// Terminal position of a cell's dot glyph.
fn dot_cell(board: Rect, pos: Pos) -> (u16, u16) {
    (
        board.x + pos.col as u16 * CELL_WIDTH + 1,
        board.y + pos.row as u16 * CELL_HEIGHT,
    )
}

fn put(buf: &mut Buffer, board: Rect, x: u16, y: u16, symbol: &str, style: Style) {
    if board.contains(Position::new(x, y)) {
        buf[(x, y)].set_symbol(symbol).set_style(style);
    }
}

/// Draw the current frame. While refilled cells are fading in, `pop_in` holds the effect.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    pop_in: &mut Option<Effect>,
    pop_in_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    let (board_outer, sidebar) = layout(area, view.game.size());
    draw_board(frame, view, board_outer);
    draw_sidebar(frame, view, sidebar);
    if !view.no_animation && !view.game.refilled().is_empty() {
        apply_pop_in_effect(frame, view, area, pop_in, pop_in_time, now);
    }
    if view.game.is_game_over() {
        draw_game_over(frame, view, area);
    }
}

fn draw_board(frame: &mut Frame, view: &View, outer: Rect) {
    let game = view.game;
    let theme = view.theme;
    let title = format!(" dotstui {}x{} ", game.size().dim(), game.size().dim());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
        .title(Span::styled(title, theme.title));
    let board = block.inner(outer);
    block.render(outer, frame.buffer_mut());

    let path = game.path();
    let active = game.active_color();
    let loop_color = active.filter(|_| game.is_square());
    let buf = frame.buffer_mut();

    // connectors first so dots and cursor sit on top
    if let Some(color) = active {
        let style = Style::default()
            .fg(theme.dot_color(color))
            .bg(theme.bg)
            .add_modifier(Modifier::BOLD);
        for w in path.windows(2) {
            draw_connector(buf, board, w[0], w[1], style);
        }
        if let (true, Some(&first), Some(&last)) = (game.is_square(), path.first(), path.last()) {
            draw_connector(buf, board, last, first, style);
        }
    }

    for (pos, dot) in game.grid().iter() {
        let selected = path.contains(&pos) || loop_color == Some(dot.color);
        let (symbol, style) = dot_style(theme, dot.color, selected);
        let (x, y) = dot_cell(board, pos);
        put(buf, board, x, y, symbol, style);
    }

    if view.show_cursor {
        let (x, y) = dot_cell(board, view.cursor);
        let style = Style::default().fg(theme.main_fg).bg(theme.bg);
        put(buf, board, x - 1, y, "[", style);
        put(buf, board, x + 1, y, "]", style);
    }
}

fn dot_style(theme: &Theme, color: DotColor, selected: bool) -> (&'static str, Style) {
    let style = Style::default().fg(theme.dot_color(color)).bg(theme.bg);
    if selected {
        (DOT_SELECTED, style.add_modifier(Modifier::BOLD))
    } else {
        (DOT, style)
    }
}

/// Line between two orthogonally adjacent cells.
fn draw_connector(buf: &mut Buffer, board: Rect, a: Pos, b: Pos, style: Style) {
    let (ax, ay) = dot_cell(board, a);
    let (bx, by) = dot_cell(board, b);
    if ay == by {
        for x in ax.min(bx) + 1..ax.max(bx) {
            put(buf, board, x, ay, "─", style);
        }
    } else {
        for y in ay.min(by) + 1..ay.max(by) {
            put(buf, board, ax, y, "│", style);
        }
    }
}

/// Fade freshly refilled dots in from the background.
fn apply_pop_in_effect(
    frame: &mut Frame,
    view: &View,
    area: Rect,
    pop_in: &mut Option<Effect>,
    pop_in_time: &mut Option<Instant>,
    now: Instant,
) {
    let board = board_rect(area, view.game.size());
    let delta = pop_in_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *pop_in_time = Some(now);

    if pop_in.is_none() {
        let cells: HashSet<(u16, u16)> = view
            .game
            .refilled()
            .iter()
            .map(|&pos| dot_cell(board, pos))
            .collect();
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            cells.contains(&(pos.x, pos.y))
        }));
        let bg = view.theme.bg;
        let effect = fx::fade_from(bg, bg, (POP_IN_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board);
        *pop_in = Some(effect);
    }

    if let Some(effect) = pop_in {
        if !effect.done() {
            frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
        }
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let game = view.game;
    let theme = view.theme;
    let scores = game.scores();
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Score, Best, Moves, Path, Last
            Constraint::Length(3), // Colours
            Constraint::Min(0),    // Keys
        ])
        .split(area);

    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let stats = vec![
        stat("Score: ", scores.score.to_string()),
        stat("Best:  ", scores.high_score.to_string()),
        stat("Moves: ", scores.moves_left.to_string()),
        stat("Path:  ", path_label(game)),
        match view.last_match {
            Some(m) => Line::from(vec![
                Span::styled("Last:  ", title_style),
                Span::styled(
                    last_match_label(m),
                    Style::default().fg(theme.dot_color(m.color)),
                ),
            ]),
            None => stat("Last:  ", "-".to_string()),
        },
    ];
    Paragraph::new(stats)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[0], frame.buffer_mut());

    let palette = game_palette(game);
    let strip: Vec<Span> = palette
        .iter()
        .map(|&c| Span::styled(format!("{} ", DOT), Style::default().fg(theme.dot_color(c))))
        .collect();
    Paragraph::new(Line::from(strip))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled("Colours", title_style)),
        )
        .render(chunks[1], frame.buffer_mut());

    let hint = Style::default().fg(theme.inactive_fg);
    let keys = vec![
        Line::from(Span::styled("Drag with the mouse", hint)),
        Line::from(Span::styled("or arrows + Space", hint)),
        Line::from(Span::styled("6/8/0  board size", hint)),
        Line::from(Span::styled("R restart  Q quit", hint)),
    ];
    Paragraph::new(keys).render(chunks[2], frame.buffer_mut());
}

fn path_label(game: &GameController) -> String {
    match game.path().len() {
        0 => "-".to_string(),
        _ if game.is_square() => "LOOP".to_string(),
        n => n.to_string(),
    }
}

fn last_match_label(m: &Outcome) -> String {
    let kind = match m.kind {
        MatchKind::Line => "line",
        MatchKind::Loop => "loop",
    };
    format!("+{} {} x{}", m.points, kind, m.cleared)
}

/// Colours that can currently appear, in palette order.
fn game_palette(game: &GameController) -> Vec<DotColor> {
    let present: HashSet<DotColor> = game.grid().iter().map(|(_, d)| d.color).collect();
    DotColor::ALL.into_iter().filter(|c| present.contains(c)).collect()
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let scores = view.game.scores();
    let popup_w = 30u16;
    let popup_h = 9u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };
    let fg = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Out of moves ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", scores.score), fg)),
        Line::from(Span::styled(format!(" Best: {} ", scores.high_score), fg)),
    ];
    if scores.score > 0 && scores.score == scores.high_score {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(" R restart    Q quit ", fg)));
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .style(Style::default().bg(theme.bg))
                .title(Span::styled(" dotstui ", theme.title)),
        )
        .render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    #[test]
    fn test_board_rect_fits_grid() {
        for size in BoardSize::ALL {
            let b = board_rect(area(), size);
            let n = size.dim() as u16;
            assert_eq!(b.width, n * CELL_WIDTH);
            assert_eq!(b.height, n * CELL_HEIGHT);
        }
    }

    #[test]
    fn test_cell_at_maps_every_terminal_cell_of_a_grid_cell() {
        let b = board_rect(area(), BoardSize::Six);
        assert_eq!(cell_at(b, BoardSize::Six, b.x, b.y), Some(Pos::new(0, 0)));
        assert_eq!(
            cell_at(b, BoardSize::Six, b.x + CELL_WIDTH - 1, b.y + CELL_HEIGHT - 1),
            Some(Pos::new(0, 0))
        );
        assert_eq!(
            cell_at(b, BoardSize::Six, b.x + 2 * CELL_WIDTH, b.y + 5 * CELL_HEIGHT + 1),
            Some(Pos::new(5, 2))
        );
    }

    #[test]
    fn test_cell_at_outside_board() {
        let b = board_rect(area(), BoardSize::Eight);
        assert_eq!(cell_at(b, BoardSize::Eight, b.x.saturating_sub(1), b.y), None);
        assert_eq!(cell_at(b, BoardSize::Eight, b.x, b.y + b.height), None);
        assert_eq!(cell_at(b, BoardSize::Eight, b.x + b.width, b.y), None);
    }

    #[test]
    fn test_last_match_label() {
        let line = Outcome {
            kind: MatchKind::Line,
            color: DotColor::Red,
            cleared: 3,
            points: 30,
        };
        assert_eq!(last_match_label(&line), "+30 line x3");
        let looped = Outcome {
            kind: MatchKind::Loop,
            color: DotColor::Blue,
            cleared: 7,
            points: 140,
        };
        assert_eq!(last_match_label(&looped), "+140 loop x7");
    }

    #[test]
    fn test_dot_cell_round_trips_through_cell_at() {
        let b = board_rect(area(), BoardSize::Ten);
        for row in 0..10 {
            for col in 0..10 {
                let pos = Pos::new(row, col);
                let (x, y) = dot_cell(b, pos);
                assert_eq!(cell_at(b, BoardSize::Ten, x, y), Some(pos));
            }
        }
    }
}
