//! Key event classification
//!
//! Maps a crossterm key event to what the shell should do with it. The shell
//! only ever sees [`KeyAction`]s; nothing else inspects raw key codes.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Recall the previous (older) history entry
    HistoryPrevious,
    /// Recall the next (newer) history entry
    HistoryNext,
    /// Ctrl+C: abandon the current line
    Interrupt,
    /// Ctrl+L: clear the screen
    ClearScreen,
    /// Ctrl+D: end the session
    Terminate,
    Backspace,
    /// Enter: submit the current line
    Submit,
    /// Append a printable character
    Insert(char),
    Ignore,
}

/// Modifiers that stop a character key from being typed
const COMMAND_MODIFIERS: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::META)
    .union(KeyModifiers::SUPER);

pub fn classify(event: &KeyEvent) -> KeyAction {
    if event.kind == KeyEventKind::Release {
        return KeyAction::Ignore;
    }

    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Up => KeyAction::HistoryPrevious,
        KeyCode::Down => KeyAction::HistoryNext,
        KeyCode::Backspace => KeyAction::Backspace,
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Char('c') if ctrl => KeyAction::Interrupt,
        KeyCode::Char('l') if ctrl => KeyAction::ClearScreen,
        KeyCode::Char('d') if ctrl => KeyAction::Terminate,
        KeyCode::Char(c)
            if !event.modifiers.intersects(COMMAND_MODIFIERS) && is_printable(c) =>
        {
            KeyAction::Insert(c)
        }
        _ => KeyAction::Ignore,
    }
}

/// Characters that may be typed into the input line
///
/// Space, letters and digits (keypad digits arrive as plain digits) and
/// ASCII punctuation. Control characters and other symbols are rejected.
pub fn is_printable(c: char) -> bool {
    c == ' ' || c.is_alphanumeric() || c.is_ascii_punctuation()
}
