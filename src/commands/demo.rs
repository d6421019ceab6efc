//! Sample commands registered by the `termshell` binary
//!
//! `echo` shows a variadic command; `sleep` shows a long-running one that
//! keeps writing to the terminal after its handler has returned.

use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

use super::registry::{Arity, CommandContext, CommandDescriptor, CommandHandler};

pub fn commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("echo", "print the arguments", EchoCommand)
            .with_usage("echo text...")
            .with_arity(Arity::AtLeastOne),
        CommandDescriptor::new("sleep", "wait for a number of seconds", SleepCommand)
            .with_usage("sleep seconds")
            .with_arity(Arity::Exactly(1))
            .long_running(),
    ]
}

pub struct EchoCommand;

#[async_trait]
impl CommandHandler for EchoCommand {
    async fn run(&self, ctx: CommandContext<'_>) -> anyhow::Result<()> {
        ctx.terminal.writeln(&ctx.args.join(" "))?;
        Ok(())
    }
}

pub struct SleepCommand;

#[async_trait]
impl CommandHandler for SleepCommand {
    async fn run(&self, ctx: CommandContext<'_>) -> anyhow::Result<()> {
        let arg = ctx.args.first().map(String::as_str).unwrap_or_default();
        let seconds: f64 = arg
            .parse()
            .with_context(|| format!("invalid duration \"{}\"", arg))?;
        let duration = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("invalid duration \"{}\"", arg))?;

        let terminal = ctx.terminal.clone();
        let exit = ctx.exit;
        ctx.terminal.write(&format!("sleeping for {}s...", seconds))?;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Err(e) = terminal.writeln(" done") {
                tracing::warn!("sleep: failed to write to terminal: {}", e);
            }
            exit.exit();
        });
        Ok(())
    }
}
