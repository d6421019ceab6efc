//! Transient per-session state
//!
//! Owned by the [`Shell`](super::Shell) and exposed read-only so hosts and
//! tests can inspect where the session is.

use crate::commands::ProcessId;
use crate::input::LineEditor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Waiting for input
    Idle,
    /// A long-running command owns the terminal until it signals exit
    Busy(ProcessId),
    /// Ctrl+D was pressed; nothing is processed any more
    Terminated,
}

#[derive(Debug)]
pub struct SessionState {
    pub(super) editor: LineEditor,
    pub(super) history_cursor: usize,
    pub(super) mode: Mode,
}

impl SessionState {
    /// Fresh state with the history cursor past the newest entry
    pub(super) fn new(history_len: usize) -> Self {
        Self {
            editor: LineEditor::new(),
            history_cursor: history_len,
            mode: Mode::Idle,
        }
    }

    /// Characters typed since the last completed line
    pub fn pending_input(&self) -> &str {
        self.editor.as_str()
    }

    /// Index of the recalled history entry; the history length when not browsing
    pub fn history_cursor(&self) -> usize {
        self.history_cursor
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_idle(&self) -> bool {
        self.mode == Mode::Idle
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.mode, Mode::Busy(_))
    }

    pub fn is_terminated(&self) -> bool {
        self.mode == Mode::Terminated
    }

    /// The process that currently blocks input, if any
    pub fn active_process(&self) -> Option<&ProcessId> {
        match &self.mode {
            Mode::Busy(id) => Some(id),
            _ => None,
        }
    }
}
