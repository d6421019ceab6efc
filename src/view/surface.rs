//! Display surface abstraction
//!
//! The shell never talks to a concrete rendering engine. Everything it needs
//! from the screen goes through [`DisplaySurface`]: writing text, clearing,
//! and the handful of cursor capabilities required to erase input that has
//! wrapped onto several rows.
//!
//! [`Terminal`] is the shared handle handed to the shell and to command
//! handlers. Long-running commands clone it into background tasks, so the
//! surface sits behind a mutex.

use std::borrow::Cow;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

/// Capabilities the shell needs from a rendering collaborator
pub trait DisplaySurface: Send {
    /// Write raw text (may contain control characters) at the cursor
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Clear the whole display and home the cursor
    fn clear(&mut self) -> io::Result<()>;

    /// Current cursor position as (column, row), both zero-based
    fn cursor_position(&self) -> io::Result<(u16, u16)>;

    /// Number of columns in a display row
    fn width(&self) -> io::Result<u16>;

    /// Move the cursor up by `rows`, keeping the column
    fn move_up(&mut self, rows: u16) -> io::Result<()>;

    /// Move the cursor to a zero-based column on the current row
    fn move_to_column(&mut self, column: u16) -> io::Result<()>;

    /// Flush buffered output
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Notify the surface that the display was resized
    fn resize(&mut self, _width: u16, _height: u16) {}
}

/// Shared, cloneable handle to the display surface
#[derive(Clone)]
pub struct Terminal {
    surface: Arc<Mutex<Box<dyn DisplaySurface>>>,
}

impl Terminal {
    /// Wrap a surface in a shared handle
    pub fn new(surface: impl DisplaySurface + 'static) -> Self {
        Self {
            surface: Arc::new(Mutex::new(Box::new(surface))),
        }
    }

    /// Run several surface operations under a single lock, then flush
    ///
    /// Used when a sequence of cursor moves and writes must not interleave
    /// with output from a background command.
    pub fn with_surface<R>(
        &self,
        f: impl FnOnce(&mut dyn DisplaySurface) -> io::Result<R>,
    ) -> io::Result<R> {
        let mut surface = self.surface.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(surface.as_mut())?;
        surface.flush()?;
        Ok(result)
    }

    /// Write text, translating bare `\n` into `\r\n`
    pub fn write(&self, text: &str) -> io::Result<()> {
        let text = normalize_newlines(text);
        self.with_surface(|surface| surface.write(&text))
    }

    /// Write text followed by a line break
    pub fn writeln(&self, text: &str) -> io::Result<()> {
        let text = normalize_newlines(text);
        self.with_surface(|surface| {
            surface.write(&text)?;
            surface.write("\r\n")
        })
    }

    pub fn clear(&self) -> io::Result<()> {
        self.with_surface(|surface| surface.clear())
    }

    pub fn cursor_position(&self) -> io::Result<(u16, u16)> {
        self.with_surface(|surface| surface.cursor_position())
    }

    pub fn width(&self) -> io::Result<u16> {
        self.with_surface(|surface| surface.width())
    }

    pub fn resize(&self, width: u16, height: u16) -> io::Result<()> {
        self.with_surface(|surface| {
            surface.resize(width, height);
            Ok(())
        })
    }
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal").finish_non_exhaustive()
    }
}

/// Raw-mode terminals do not return the carriage on `\n`
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\n') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    let mut prev = None;
    for c in text.chars() {
        if c == '\n' && prev != Some('\r') {
            out.push('\r');
        }
        out.push(c);
        prev = Some(c);
    }
    Cow::Owned(out)
}
