//! Key and mouse bindings.

use crate::BoardSize;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    /// Start a gesture at the cursor, or finish the one in progress.
    Select,
    Restart,
    Resize(BoardSize),
    Quit,
    None,
}

/// Map key event to an action. Arrows and vim keys both move the cursor.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => Action::CursorDown,
        KeyCode::Left | KeyCode::Char('h') => Action::CursorLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::CursorRight,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Char('6') => Action::Resize(BoardSize::Six),
        KeyCode::Char('8') => Action::Resize(BoardSize::Eight),
        KeyCode::Char('0') => Action::Resize(BoardSize::Ten),
        _ => Action::None,
    }
}

/// Left-button pointer activity in terminal coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    Down { column: u16, row: u16 },
    Drag { column: u16, row: u16 },
    Up,
    None,
}

pub fn mouse_to_pointer(ev: MouseEvent) -> Pointer {
    let (column, row) = (ev.column, ev.row);
    match ev.kind {
        MouseEventKind::Down(MouseButton::Left) => Pointer::Down { column, row },
        MouseEventKind::Drag(MouseButton::Left) => Pointer::Drag { column, row },
        MouseEventKind::Up(MouseButton::Left) => Pointer::Up,
        _ => Pointer::None,
    }
}
