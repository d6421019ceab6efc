//! Command registry
//!
//! Maps command ids to descriptors. The registry starts with the built-ins
//! and takes caller-supplied commands at construction time; nothing is ever
//! removed. Ids are unique: registering an id twice is an error rather than
//! leaving an unreachable entry behind the first one.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use super::process::ExitHandle;
use crate::view::Terminal;

/// Number of arguments a command accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments
    Exactly(usize),
    /// One or more arguments
    AtLeastOne,
}

impl Arity {
    pub fn accepts(&self, given: usize) -> bool {
        match self {
            Arity::Exactly(n) => given == *n,
            Arity::AtLeastOne => given >= 1,
        }
    }
}

/// Everything a handler gets for one run
pub struct CommandContext<'a> {
    /// Display to write output to; clone it to keep writing after returning
    pub terminal: &'a Terminal,
    /// Arguments after the command id
    pub args: &'a [String],
    /// The registry the command was found in
    pub registry: &'a CommandRegistry,
    /// Completion callback; only long-running commands need to call it
    pub exit: ExitHandle,
}

/// The behaviour behind a command id
///
/// The shell awaits `run` before processing the next key. A long-running
/// command returns once it has started its work and calls
/// [`ExitHandle::exit`] when done.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: CommandContext<'_>) -> anyhow::Result<()>;
}

/// Static metadata plus handler for one command
#[derive(Clone)]
pub struct CommandDescriptor {
    id: String,
    usage: String,
    description: String,
    arity: Arity,
    long_running: bool,
    handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    /// A command taking no arguments, with its id as usage
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) -> Self {
        let id = id.into();
        Self {
            usage: id.clone(),
            id,
            description: description.into(),
            arity: Arity::Exactly(0),
            long_running: false,
            handler: Arc::new(handler),
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    /// Mark the command as holding the shell busy until it signals exit
    pub fn long_running(mut self) -> Self {
        self.long_running = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn is_long_running(&self) -> bool {
        self.long_running
    }

    pub fn handler(&self) -> &dyn CommandHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("id", &self.id)
            .field("usage", &self.usage)
            .field("description", &self.description)
            .field("arity", &self.arity)
            .field("long_running", &self.long_running)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("command \"{0}\" is already registered")]
    DuplicateId(String),
}

#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
}

impl CommandRegistry {
    /// Empty registry, without built-ins
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in commands
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for command in super::builtin::builtins() {
            // Built-in ids are distinct
            let _ = registry.register(command);
        }
        registry
    }

    pub fn register(&mut self, command: CommandDescriptor) -> Result<(), RegistryError> {
        if self.find(command.id()).is_some() {
            return Err(RegistryError::DuplicateId(command.id().to_string()));
        }
        tracing::debug!("Registered command {}", command.id());
        self.commands.push(command);
        Ok(())
    }

    /// Register several commands in order, stopping at the first duplicate
    pub fn extend(
        &mut self,
        commands: impl IntoIterator<Item = CommandDescriptor>,
    ) -> Result<(), RegistryError> {
        commands
            .into_iter()
            .try_for_each(|command| self.register(command))
    }

    pub fn find(&self, id: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|command| command.id() == id)
    }

    /// Commands in registration order
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
