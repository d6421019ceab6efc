//! Command dispatch
//!
//! Turns a submitted line into a command run: split on whitespace, look the
//! id up, check the argument count, await the handler. Every failure comes
//! back as a [`DispatchError`] whose message is written to the terminal
//! verbatim.

use super::process::{ExitChannel, ProcessId};
use super::registry::{Arity, CommandContext, CommandRegistry};
use crate::view::Terminal;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Command not found. Type \"help\" to list available commands")]
    CommandNotFound { command: String },

    #[error("{command} does not accept arguments")]
    UnexpectedArguments { command: String },

    #[error("{}\n usage: {}", arity_problem(.expected, .given), .usage)]
    MissingArguments {
        command: String,
        usage: String,
        expected: Arity,
        given: usize,
    },

    #[error("{command}: {source:#}")]
    CommandFailed {
        command: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    /// Id of the command the line tried to run
    pub fn command(&self) -> &str {
        match self {
            DispatchError::CommandNotFound { command }
            | DispatchError::UnexpectedArguments { command }
            | DispatchError::MissingArguments { command, .. }
            | DispatchError::CommandFailed { command, .. } => command,
        }
    }
}

fn arity_problem(expected: &Arity, given: &usize) -> &'static str {
    match expected {
        Arity::Exactly(n) if given > n => "too many arguments",
        _ => "not enough arguments",
    }
}

/// Split a line into command id and arguments
///
/// Returns None for a line with no words.
pub fn parse_line(line: &str) -> Option<(&str, Vec<String>)> {
    let mut words = line.split_whitespace();
    let id = words.next()?;
    Some((id, words.map(str::to_string).collect()))
}

/// Run one submitted line
///
/// Returns the id of the started process if the command is long-running,
/// or None once a regular command has completed.
pub async fn exec(
    registry: &CommandRegistry,
    terminal: &Terminal,
    line: &str,
    exits: &mut ExitChannel,
) -> Result<Option<ProcessId>, DispatchError> {
    let result = run_line(registry, terminal, line, exits).await;
    match &result {
        Ok(Some(process)) => {
            tracing::info!(target: "command", line, outcome = "started", process = %process)
        }
        Ok(None) => tracing::info!(target: "command", line, outcome = "ok"),
        Err(e) => tracing::warn!(target: "command", line, outcome = "error", error = %e),
    }
    result
}

async fn run_line(
    registry: &CommandRegistry,
    terminal: &Terminal,
    line: &str,
    exits: &mut ExitChannel,
) -> Result<Option<ProcessId>, DispatchError> {
    let Some((id, args)) = parse_line(line) else {
        return Err(DispatchError::CommandNotFound {
            command: String::new(),
        });
    };
    let command = registry
        .find(id)
        .ok_or_else(|| DispatchError::CommandNotFound {
            command: id.to_string(),
        })?;

    let arity = command.arity();
    if arity == Arity::Exactly(0) && !args.is_empty() {
        return Err(DispatchError::UnexpectedArguments {
            command: id.to_string(),
        });
    }
    if !arity.accepts(args.len()) {
        return Err(DispatchError::MissingArguments {
            command: id.to_string(),
            usage: command.usage().to_string(),
            expected: arity,
            given: args.len(),
        });
    }

    let exit = exits.handle_for(id);
    let process = exit.id().clone();
    let ctx = CommandContext {
        terminal,
        args: &args,
        registry,
        exit,
    };
    command
        .handler()
        .run(ctx)
        .await
        .map_err(|source| DispatchError::CommandFailed {
            command: id.to_string(),
            source,
        })?;

    Ok(command.is_long_running().then_some(process))
}
