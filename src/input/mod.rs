//! Keyboard input: key classification and the pending input line

pub mod keys;
pub mod line_editor;

pub use keys::{classify, is_printable, KeyAction};
pub use line_editor::LineEditor;
