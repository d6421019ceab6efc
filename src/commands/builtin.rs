//! Built-in commands: `id`, `man` and `help`

use async_trait::async_trait;

use super::registry::{Arity, CommandContext, CommandDescriptor, CommandHandler};

/// Identity reported by `id`
pub const IDENTITY: &str = "uid=001(anonymous)";

pub fn builtins() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("id", "returns user identity", IdCommand),
        CommandDescriptor::new("man", "show manual pages for a command", ManCommand)
            .with_usage("man command")
            .with_arity(Arity::Exactly(1)),
        CommandDescriptor::new("help", "list available commands", HelpCommand),
    ]
}

pub struct IdCommand;

#[async_trait]
impl CommandHandler for IdCommand {
    async fn run(&self, ctx: CommandContext<'_>) -> anyhow::Result<()> {
        ctx.terminal.writeln(IDENTITY)?;
        Ok(())
    }
}

/// Prints the manual page of another registered command
///
/// An unknown id is reported on the terminal, not returned as an error.
pub struct ManCommand;

#[async_trait]
impl CommandHandler for ManCommand {
    async fn run(&self, ctx: CommandContext<'_>) -> anyhow::Result<()> {
        let terminal = ctx.terminal;
        let Some(name) = ctx.args.first() else {
            anyhow::bail!("no command given");
        };
        let Some(command) = ctx.registry.find(name) else {
            terminal.writeln(&format!("[error]: command \"{}\" not found", name))?;
            return Ok(());
        };

        terminal.writeln("NAME")?;
        terminal.writeln(&format!("\t {} - {}", command.id(), command.description()))?;
        if !command.usage().is_empty() {
            terminal.writeln("\nSYNOPSIS")?;
            terminal.writeln(&format!("\t {}", command.usage()))?;
        }
        Ok(())
    }
}

pub struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn run(&self, ctx: CommandContext<'_>) -> anyhow::Result<()> {
        let width = ctx
            .registry
            .iter()
            .map(|command| command.id().len())
            .max()
            .unwrap_or(0);
        for command in ctx.registry.iter() {
            ctx.terminal.writeln(&format!(
                "{:<width$}  {}",
                command.id(),
                command.description(),
                width = width
            ))?;
        }
        ctx.terminal
            .writeln("Type \"man <command>\" for details on a command.")?;
        Ok(())
    }
}
