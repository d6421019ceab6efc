//! Command log layer for tracing
//!
//! Dispatch emits one event per submitted line on the "command" target with
//! structured fields:
//!
//! - `line`: the submitted line
//! - `outcome`: `started`, `ok` or `error`
//! - `process`: the process started by a long-running command
//! - `error`: the failure shown to the user
//!
//! This layer turns each into a single row of an audit file:
//!
//! ```text
//! 2026-10-19 12:00:01 INFO  sleep 5 -> started: sleep#1
//! 2026-10-19 12:00:09 WARN  bogus -> error: Command not found: bogus
//! ```

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Target of the events this layer records
pub const COMMAND_TARGET: &str = "command";

/// A tracing layer that appends dispatch outcomes to a file
pub struct CommandLogLayer {
    file: Arc<Mutex<File>>,
}

/// Handle returned from setup, containing the log path
#[derive(Debug, Clone)]
pub struct CommandLogHandle {
    pub path: PathBuf,
}

/// Create a command log layer writing to `path` (truncated)
pub fn create_with_path(path: PathBuf) -> std::io::Result<(CommandLogLayer, CommandLogHandle)> {
    let file = File::create(&path)?;

    let layer = CommandLogLayer {
        file: Arc::new(Mutex::new(file)),
    };

    Ok((layer, CommandLogHandle { path }))
}

impl<S> Layer<S> for CommandLogLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() != COMMAND_TARGET {
            return;
        }

        let mut record = CommandRecord::default();
        event.record(&mut record);

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let row = format!(
            "{} {:<5} {}\n",
            timestamp,
            metadata.level().as_str(),
            record
        );

        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(row.as_bytes());
            let _ = file.flush();
        }
    }
}

/// Fields of one dispatch event
#[derive(Debug, Default)]
struct CommandRecord {
    line: Option<String>,
    outcome: Option<String>,
    detail: Option<String>,
    message: Option<String>,
}

impl CommandRecord {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "line" => self.line = Some(value),
            "outcome" => self.outcome = Some(value),
            "process" | "error" => self.detail = Some(value),
            "message" => self.message = Some(value),
            _ => {}
        }
    }
}

impl Visit for CommandRecord {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.set(field.name(), format!("{:?}", value));
    }
}

impl fmt::Display for CommandRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(line) = &self.line else {
            // Free-form event on the command target
            return write!(f, "{}", self.message.as_deref().unwrap_or_default());
        };
        write!(f, "{} -> {}", line, self.outcome.as_deref().unwrap_or("?"))?;
        if let Some(detail) = &self.detail {
            // Keep one row per event
            write!(f, ": {}", detail.replace(['\r', '\n'], " "))?;
        }
        Ok(())
    }
}
