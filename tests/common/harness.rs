// Test harness driving a shell over a virtual terminal

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::{cursor, queue, terminal};
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use termshell::commands::CommandDescriptor;
use termshell::model::{KeyValueStore, MemoryStore};
use termshell::view::{DisplaySurface, Terminal};
use termshell::{Shell, ShellConfig};

/// Display surface backed by a vt100 emulator
///
/// Output is interpreted exactly as a terminal would, so tests can assert on
/// what the user actually sees.
pub struct VirtualSurface {
    parser: Arc<Mutex<vt100::Parser>>,
}

impl VirtualSurface {
    fn process(&mut self, bytes: &[u8]) {
        self.parser
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .process(bytes);
    }
}

impl DisplaySurface for VirtualSurface {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.process(text.as_bytes());
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        let mut bytes = Vec::new();
        queue!(
            bytes,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        self.process(&bytes);
        Ok(())
    }

    fn cursor_position(&self) -> io::Result<(u16, u16)> {
        let parser = self.parser.lock().unwrap_or_else(PoisonError::into_inner);
        let (row, col) = parser.screen().cursor_position();
        let (_, cols) = parser.screen().size();
        Ok((col.min(cols.saturating_sub(1)), row))
    }

    fn width(&self) -> io::Result<u16> {
        let parser = self.parser.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(parser.screen().size().1)
    }

    fn move_up(&mut self, rows: u16) -> io::Result<()> {
        if rows > 0 {
            let mut bytes = Vec::new();
            queue!(bytes, cursor::MoveUp(rows))?;
            self.process(&bytes);
        }
        Ok(())
    }

    fn move_to_column(&mut self, column: u16) -> io::Result<()> {
        let mut bytes = Vec::new();
        queue!(bytes, cursor::MoveToColumn(column))?;
        self.process(&bytes);
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.parser
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .screen_mut()
            .set_size(height, width);
    }
}

/// Drives a [`Shell`] with synthetic key events and inspects the screen
pub struct ShellTestHarness {
    shell: Shell,
    parser: Arc<Mutex<vt100::Parser>>,
    runtime: tokio::runtime::Runtime,
}

impl ShellTestHarness {
    /// Shell with the default config, an empty in-memory store and no extra commands
    pub fn new(width: u16, height: u16) -> io::Result<Self> {
        Self::with_store(width, height, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(width: u16, height: u16, store: Arc<dyn KeyValueStore>) -> io::Result<Self> {
        Self::with_setup(width, height, &ShellConfig::default(), store, Vec::new())
    }

    pub fn with_commands(
        width: u16,
        height: u16,
        commands: Vec<CommandDescriptor>,
    ) -> io::Result<Self> {
        Self::with_setup(
            width,
            height,
            &ShellConfig::default(),
            Arc::new(MemoryStore::new()),
            commands,
        )
    }

    pub fn with_setup(
        width: u16,
        height: u16,
        config: &ShellConfig,
        store: Arc<dyn KeyValueStore>,
        commands: Vec<CommandDescriptor>,
    ) -> io::Result<Self> {
        let parser = Arc::new(Mutex::new(vt100::Parser::new(height, width, 0)));
        let terminal = Terminal::new(VirtualSurface {
            parser: Arc::clone(&parser),
        });
        let shell = Shell::new(config, terminal, store, commands)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        // Paused clock: timers in long-running commands fire as soon as the
        // runtime has nothing else to do
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()?;

        shell.start()?;
        Ok(Self {
            shell,
            parser,
            runtime,
        })
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut Shell {
        &mut self.shell
    }

    pub fn send_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> io::Result<()> {
        let event = KeyEvent::new(code, modifiers);
        self.runtime.block_on(self.shell.handle_key(event))
    }

    pub fn type_text(&mut self, text: &str) -> io::Result<()> {
        for c in text.chars() {
            self.send_key(KeyCode::Char(c), KeyModifiers::NONE)?;
        }
        Ok(())
    }

    /// Type `line` and press Enter
    pub fn submit(&mut self, line: &str) -> io::Result<()> {
        self.type_text(line)?;
        self.send_key(KeyCode::Enter, KeyModifiers::NONE)
    }

    /// Wait for the next exit signal from a long-running command
    pub fn wait_for_exit(&mut self) -> io::Result<()> {
        self.runtime.block_on(self.shell.process_next_exit())
    }

    /// Wait for pending history writes
    pub fn flush_history(&mut self) {
        self.runtime.block_on(self.shell.shutdown());
    }

    pub fn pending_input(&self) -> &str {
        self.shell.state().pending_input()
    }

    pub fn screen_to_string(&self) -> String {
        let parser = self.parser.lock().unwrap_or_else(PoisonError::into_inner);
        parser.screen().contents()
    }

    /// One screen row, trailing blanks trimmed
    pub fn screen_row(&self, row: u16) -> String {
        let parser = self.parser.lock().unwrap_or_else(PoisonError::into_inner);
        let (_, cols) = parser.screen().size();
        let line = parser
            .screen()
            .rows(0, cols)
            .nth(row as usize)
            .unwrap_or_default();
        line.trim_end().to_string()
    }

    /// Cursor as (column, row)
    pub fn cursor(&self) -> (u16, u16) {
        let parser = self.parser.lock().unwrap_or_else(PoisonError::into_inner);
        let (row, col) = parser.screen().cursor_position();
        (col, row)
    }

    pub fn assert_screen_contains(&self, text: &str) {
        let screen = self.screen_to_string();
        assert!(
            screen.contains(text),
            "Expected screen to contain {:?}\nScreen:\n{}",
            text,
            screen
        );
    }

    pub fn assert_screen_not_contains(&self, text: &str) {
        let screen = self.screen_to_string();
        assert!(
            !screen.contains(text),
            "Expected screen not to contain {:?}\nScreen:\n{}",
            text,
            screen
        );
    }
}
