//! Crossterm-backed display surface with a self-tracked cursor
//!
//! Asking a real terminal for its cursor position means reading a reply from
//! stdin, which races with the thread that reads key events. Instead the
//! surface keeps its own model of where the cursor is, updated from every
//! byte it writes and every cursor command it queues.

use crossterm::{cursor, queue, terminal};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use unicode_width::UnicodeWidthChar;

use super::surface::DisplaySurface;

const TAB_WIDTH: u16 = 8;

/// Cursor model for a terminal with pending-wrap semantics
///
/// `column == width` means the last cell of the row was just written and the
/// next printable character wraps to the following row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorTracker {
    column: u16,
    row: u16,
    width: u16,
    height: u16,
    escape: EscapeState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeState {
    Ground,
    Escape,
    Csi,
}

impl CursorTracker {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            column: 0,
            row: 0,
            width: width.max(1),
            height: height.max(1),
            escape: EscapeState::Ground,
        }
    }

    /// Position as a terminal would report it (never past the last column)
    pub fn position(&self) -> (u16, u16) {
        (self.column.min(self.width - 1), self.row)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.column = self.column.min(self.width);
        self.row = self.row.min(self.height - 1);
    }

    pub fn home(&mut self) {
        self.column = 0;
        self.row = 0;
    }

    pub fn move_up(&mut self, rows: u16) {
        self.column = self.column.min(self.width - 1);
        self.row = self.row.saturating_sub(rows);
    }

    pub fn move_to_column(&mut self, column: u16) {
        self.column = column.min(self.width - 1);
    }

    /// Advance the model over text written to the terminal
    pub fn advance(&mut self, text: &str) {
        for c in text.chars() {
            match self.escape {
                EscapeState::Escape => {
                    self.escape = if c == '[' {
                        EscapeState::Csi
                    } else {
                        EscapeState::Ground
                    };
                    continue;
                }
                EscapeState::Csi => {
                    if ('@'..='~').contains(&c) {
                        self.escape = EscapeState::Ground;
                    }
                    continue;
                }
                EscapeState::Ground => {}
            }

            match c {
                '\x1b' => self.escape = EscapeState::Escape,
                '\r' => self.column = 0,
                '\n' => self.line_feed(),
                '\x08' => {
                    self.column = self.column.min(self.width - 1).saturating_sub(1);
                }
                '\t' => {
                    let next = (self.column / TAB_WIDTH + 1) * TAB_WIDTH;
                    self.column = next.min(self.width - 1);
                }
                c => {
                    let cells = c.width().unwrap_or(0) as u16;
                    if cells == 0 {
                        continue;
                    }
                    if self.column + cells > self.width {
                        self.column = 0;
                        self.line_feed();
                    }
                    self.column += cells;
                }
            }
        }
    }

    fn line_feed(&mut self) {
        self.row = (self.row + 1).min(self.height - 1);
    }
}

/// A display surface writing crossterm control sequences to `W`
pub struct TrackedSurface<W: Write + Send> {
    out: W,
    cursor: CursorTracker,
}

impl TrackedSurface<io::Stdout> {
    /// Surface for the process's own terminal, sized from the tty
    pub fn stdout() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::new(io::stdout(), width, height))
    }
}

impl<W: Write + Send> TrackedSurface<W> {
    pub fn new(out: W, width: u16, height: u16) -> Self {
        Self {
            out,
            cursor: CursorTracker::new(width, height),
        }
    }

    pub fn tracker(&self) -> &CursorTracker {
        &self.cursor
    }
}

impl<W: Write + Send> DisplaySurface for TrackedSurface<W> {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.cursor.advance(text);
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        self.cursor.home();
        Ok(())
    }

    fn cursor_position(&self) -> io::Result<(u16, u16)> {
        Ok(self.cursor.position())
    }

    fn width(&self) -> io::Result<u16> {
        Ok(self.cursor.width())
    }

    fn move_up(&mut self, rows: u16) -> io::Result<()> {
        if rows > 0 {
            queue!(self.out, cursor::MoveUp(rows))?;
        }
        self.cursor.move_up(rows);
        Ok(())
    }

    fn move_to_column(&mut self, column: u16) -> io::Result<()> {
        queue!(self.out, cursor::MoveToColumn(column))?;
        self.cursor.move_to_column(column);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.cursor.resize(width, height);
    }
}

/// In-memory byte sink that stays readable after being handed to a surface
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn clear(&self) {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
