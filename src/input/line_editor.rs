//! Pending input line
//!
//! Append-only editing: characters go on the end and backspace takes them
//! off the end. Every change to the buffer is mirrored on the display as it
//! happens.

use std::io;
use unicode_width::UnicodeWidthChar;

use crate::view::{DisplaySurface, Terminal};

/// Erases the cell left of the cursor and steps back onto it
const ERASE_BACK: &str = "\x08 \x08";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append a character and echo it
    pub fn insert(&mut self, terminal: &Terminal, c: char) -> io::Result<()> {
        let mut encoded = [0; 4];
        terminal.write(c.encode_utf8(&mut encoded))?;
        self.buffer.push(c);
        Ok(())
    }

    /// Remove the last character and erase it from the display
    ///
    /// A wide character takes every cell it covers with it. When the cursor
    /// sits at column 0 below the first row, the input has wrapped and the
    /// cell to erase is at the end of the row above.
    pub fn delete_last(&mut self, terminal: &Terminal) -> io::Result<()> {
        let Some(c) = self.buffer.pop() else {
            return Ok(());
        };
        let cells = cell_width(c);
        terminal.with_surface(|surface| {
            for _ in 0..cells {
                erase_last_cell(surface)?;
            }
            Ok(())
        })
    }

    /// Erase the displayed input without touching the buffer
    pub fn clear_visual(&self, terminal: &Terminal) -> io::Result<()> {
        let cells: usize = self.buffer.chars().map(cell_width).sum();
        if cells == 0 {
            return Ok(());
        }
        terminal.with_surface(|surface| {
            for _ in 0..cells {
                erase_last_cell(surface)?;
            }
            Ok(())
        })
    }

    /// Swap the displayed input for `text`
    pub fn replace(&mut self, terminal: &Terminal, text: &str) -> io::Result<()> {
        self.clear_visual(terminal)?;
        self.buffer = text.to_string();
        terminal.write(&self.buffer)
    }

    /// Take the buffer, leaving it empty; the display is left as is
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

/// Display cells taken by `c`, as counted by the cursor tracker
fn cell_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

fn erase_last_cell(surface: &mut dyn DisplaySurface) -> io::Result<()> {
    let (column, row) = surface.cursor_position()?;
    if column == 0 && row > 0 {
        let last_column = surface.width()?.saturating_sub(1);
        surface.move_up(1)?;
        surface.move_to_column(last_column)?;
        surface.write(" ")?;
        surface.move_to_column(last_column)
    } else {
        surface.write(ERASE_BACK)
    }
}
