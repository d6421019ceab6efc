//! The interactive shell
//!
//! [`Shell`] receives every key event, routes it according to the current
//! [`Mode`], and owns the single-active-process gate. Key events are handled
//! one at a time: a submitted line is dispatched and its handler awaited
//! before the next key is looked at.
//!
//! Long-running commands release the gate through their exit handle. Exit
//! signals arrive on a channel owned by the shell and are processed by the
//! same loop as keys (see [`Shell::run`]).

mod session;

pub use session::{Mode, SessionState};

use crossterm::event::KeyEvent;
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::commands::dispatch;
use crate::commands::{CommandDescriptor, CommandRegistry, ExitChannel, ProcessId, RegistryError};
use crate::config::ShellConfig;
use crate::input::{classify, KeyAction};
use crate::model::{HistoryStore, KeyValueStore};
use crate::view::Terminal;

pub struct Shell {
    prompt: String,
    terminal: Terminal,
    registry: CommandRegistry,
    history: HistoryStore,
    state: SessionState,
    exits: ExitChannel,
    exit_rx: mpsc::UnboundedReceiver<ProcessId>,
}

impl Shell {
    /// Build a shell over `terminal`
    ///
    /// History is loaded from `store` right away. `extra` commands are
    /// registered after the built-ins; an id that is already taken is an
    /// error.
    pub fn new(
        config: &ShellConfig,
        terminal: Terminal,
        store: Arc<dyn KeyValueStore>,
        extra: impl IntoIterator<Item = CommandDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut registry = CommandRegistry::with_builtins();
        registry.extend(extra)?;

        let history = HistoryStore::load(store, &config.history_key, config.history_capacity);
        let state = SessionState::new(history.len());
        let (exits, exit_rx) = ExitChannel::new();

        Ok(Self {
            prompt: config.prompt.clone(),
            terminal,
            registry,
            history,
            state,
            exits,
            exit_rx,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Replace the prompt; takes effect at the next prompt
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Write the first prompt of the session
    pub fn start(&self) -> io::Result<()> {
        self.terminal.write(&self.prompt)
    }

    fn reprompt(&self) -> io::Result<()> {
        self.terminal.write(&format!("\r\n{}", self.prompt))
    }

    /// Process one key event
    pub async fn handle_key(&mut self, event: KeyEvent) -> io::Result<()> {
        match &self.state.mode {
            Mode::Idle => {}
            Mode::Busy(process) => {
                tracing::trace!("Dropping {:?}: {} is running", event.code, process);
                return Ok(());
            }
            Mode::Terminated => return Ok(()),
        }

        let action = classify(&event);
        tracing::debug!("Key {:?} -> {:?}", event.code, action);
        match action {
            KeyAction::HistoryPrevious => self.history_previous(),
            KeyAction::HistoryNext => self.history_next(),
            KeyAction::Interrupt => self.interrupt(),
            KeyAction::ClearScreen => self.clear_screen(),
            KeyAction::Terminate => self.terminate(),
            KeyAction::Backspace => self.state.editor.delete_last(&self.terminal),
            KeyAction::Submit => self.submit().await,
            KeyAction::Insert(c) => self.state.editor.insert(&self.terminal, c),
            KeyAction::Ignore => Ok(()),
        }
    }

    fn history_previous(&mut self) -> io::Result<()> {
        if self.history.is_empty() || self.state.history_cursor == 0 {
            return Ok(());
        }
        self.state.history_cursor -= 1;
        self.show_recalled()
    }

    fn history_next(&mut self) -> io::Result<()> {
        if self.state.history_cursor >= self.history.len() {
            return Ok(());
        }
        self.state.history_cursor += 1;
        self.show_recalled()
    }

    /// Put the entry under the history cursor in the input line
    ///
    /// The cursor at the history length recalls an empty line.
    fn show_recalled(&mut self) -> io::Result<()> {
        let entry = self
            .history
            .get(self.state.history_cursor)
            .unwrap_or_default();
        self.state.editor.replace(&self.terminal, entry)
    }

    fn interrupt(&mut self) -> io::Result<()> {
        self.state.editor.take();
        self.state.history_cursor = self.history.len();
        self.reprompt()
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.terminal.clear()?;
        self.terminal
            .write(&format!("{}{}", self.prompt, self.state.editor.as_str()))
    }

    fn terminate(&mut self) -> io::Result<()> {
        tracing::info!("Session terminated");
        self.state.mode = Mode::Terminated;
        self.terminal.writeln("terminating session...")
    }

    async fn submit(&mut self) -> io::Result<()> {
        let input = self.state.editor.take();
        let line = input.trim();
        if line.is_empty() {
            return self.reprompt();
        }

        self.terminal.writeln("")?;
        let process =
            match dispatch::exec(&self.registry, &self.terminal, line, &mut self.exits).await {
                Ok(process) => process,
                Err(e) => {
                    self.terminal.write(&e.to_string())?;
                    None
                }
            };

        self.history.push(line);
        self.state.history_cursor = self.history.len();

        match process {
            Some(process) => {
                tracing::debug!("{} is now in the foreground", process);
                self.state.mode = Mode::Busy(process);
                Ok(())
            }
            None => self.reprompt(),
        }
    }

    /// Handle an exit signal
    ///
    /// Only the active process can release the shell. Signals from earlier
    /// runs, or arriving while idle, are ignored.
    pub fn handle_exit(&mut self, process: ProcessId) -> io::Result<()> {
        if self.state.active_process() != Some(&process) {
            tracing::debug!(
                "Ignoring exit of {} (run {}) in mode {:?}",
                process,
                process.serial(),
                self.state.mode
            );
            return Ok(());
        }

        tracing::debug!("{} exited", process);
        self.state.mode = Mode::Idle;
        self.reprompt()
    }

    /// Handle every exit signal already queued, without waiting
    pub fn drain_exits(&mut self) -> io::Result<()> {
        while let Ok(process) = self.exit_rx.try_recv() {
            self.handle_exit(process)?;
        }
        Ok(())
    }

    /// Wait for the next exit signal and handle it
    pub async fn process_next_exit(&mut self) -> io::Result<()> {
        // The shell holds a sender, so the channel never closes
        if let Some(process) = self.exit_rx.recv().await {
            self.handle_exit(process)?;
        }
        Ok(())
    }

    /// Drive the session from a channel of key events
    ///
    /// Returns once the session is terminated or the key channel closes.
    /// Queued exit signals are handled before the next key. Keys that arrive
    /// while a submitted line is being dispatched are dropped.
    pub async fn run(&mut self, mut keys: mpsc::UnboundedReceiver<KeyEvent>) -> io::Result<()> {
        enum Next {
            Exit(ProcessId),
            Key(Option<KeyEvent>),
        }

        while !self.state.is_terminated() {
            let next = tokio::select! {
                biased;
                Some(process) = self.exit_rx.recv() => Next::Exit(process),
                key = keys.recv() => Next::Key(key),
            };

            match next {
                Next::Exit(process) => self.handle_exit(process)?,
                Next::Key(Some(event)) => {
                    let dispatches = classify(&event) == KeyAction::Submit
                        && self.state.is_idle()
                        && !self.state.pending_input().trim().is_empty();
                    self.handle_key(event).await?;
                    if dispatches {
                        discard_queued(&mut keys);
                    }
                }
                Next::Key(None) => {
                    tracing::debug!("Key channel closed");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Wait for pending history writes
    pub async fn shutdown(&mut self) {
        self.history.flush().await;
    }
}

/// Drop every key already queued on `keys`
fn discard_queued(keys: &mut mpsc::UnboundedReceiver<KeyEvent>) {
    let mut dropped = 0;
    while keys.try_recv().is_ok() {
        dropped += 1;
    }
    if dropped > 0 {
        tracing::debug!("Dropped {} keys typed during dispatch", dropped);
    }
}
