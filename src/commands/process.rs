//! Foreground process identity and exit signaling
//!
//! A long-running command keeps the shell busy until it calls
//! [`ExitHandle::exit`]. The handle carries the id of the run it belongs to,
//! so a late signal from an earlier run cannot release a later one.

use std::fmt;
use tokio::sync::mpsc;

/// Opaque id of one command run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessId {
    command: String,
    serial: u64,
}

impl ProcessId {
    pub fn new(command: impl Into<String>, serial: u64) -> Self {
        Self {
            command: command.into(),
            serial,
        }
    }

    /// Id of the command this run executes
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)
    }
}

/// Completion callback handed to every command handler
#[derive(Debug, Clone)]
pub struct ExitHandle {
    id: ProcessId,
    tx: mpsc::UnboundedSender<ProcessId>,
}

impl ExitHandle {
    pub fn id(&self) -> &ProcessId {
        &self.id
    }

    /// Signal that the command has finished
    pub fn exit(self) {
        if self.tx.send(self.id).is_err() {
            tracing::debug!("Exit signal dropped: session is gone");
        }
    }
}

/// Allocates process ids and the exit handles that report them back
#[derive(Debug)]
pub struct ExitChannel {
    tx: mpsc::UnboundedSender<ProcessId>,
    next_serial: u64,
}

impl ExitChannel {
    /// Create the channel; the receiver delivers exit signals in send order
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProcessId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, next_serial: 0 }, rx)
    }

    /// Exit handle for a fresh run of `command`
    pub fn handle_for(&mut self, command: &str) -> ExitHandle {
        let id = ProcessId::new(command, self.next_serial);
        self.next_serial += 1;
        ExitHandle {
            id,
            tx: self.tx.clone(),
        }
    }
}
