//! termshell: run the interactive shell on the current terminal

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event, KeyEvent};
use crossterm::terminal;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use termshell::commands::demo;
use termshell::model::{FileStore, KeyValueStore, MemoryStore};
use termshell::services::command_log;
use termshell::view::{Terminal, TrackedSurface};
use termshell::{Shell, ShellConfig};

/// An interactive command shell with persisted history
#[derive(Parser, Debug)]
#[command(name = "termshell")]
struct Args {
    /// Config file (defaults to termshell/config.json in the config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Prompt text, overriding the config file
    #[arg(long)]
    prompt: Option<String>,

    /// File to persist command history in
    #[arg(long, value_name = "PATH")]
    history_file: Option<PathBuf>,

    /// Diagnostic log file (defaults to termshell.log in the temp directory)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Also record every dispatched command to this file
    #[arg(long, value_name = "PATH")]
    command_log: Option<PathBuf>,
}

/// Keeps the terminal in raw mode while alive
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Log to a file: stdout belongs to the shell
fn init_tracing(args: &Args) -> anyhow::Result<()> {
    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("termshell.log"));
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("failed to create log file {}", log_path.display()))?;

    let command_layer = match &args.command_log {
        Some(path) => {
            let (layer, _handle) = command_log::create_with_path(path.clone())
                .with_context(|| format!("failed to create command log {}", path.display()))?;
            Some(layer)
        }
        None => None,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false),
        )
        .with(command_layer)
        .init();
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<ShellConfig> {
    let mut config = match &args.config {
        Some(path) => ShellConfig::load(path)?,
        None => match ShellConfig::default_path() {
            Some(path) => ShellConfig::load_or_default(&path)?,
            None => ShellConfig::default(),
        },
    };
    if let Some(prompt) = &args.prompt {
        config.prompt = prompt.clone();
    }
    if let Some(path) = &args.history_file {
        config.history_file = Some(path.clone());
    }
    Ok(config)
}

/// Read terminal events on a dedicated thread
///
/// `event::read` blocks, so it cannot run on the runtime. The thread is
/// detached and dies with the process.
fn spawn_input_reader(terminal: Terminal) -> mpsc::UnboundedReceiver<KeyEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || loop {
        match event::read() {
            Ok(Event::Key(key)) => {
                if tx.send(key).is_err() {
                    break;
                }
            }
            Ok(Event::Resize(width, height)) => {
                if let Err(e) = terminal.resize(width, height) {
                    tracing::warn!("Failed to resize surface: {}", e);
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to read terminal event: {}", e);
                break;
            }
        }
    });
    rx
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;
    let config = load_config(&args)?;

    let store: Arc<dyn KeyValueStore> = match config.history_path() {
        Some(path) => {
            tracing::info!("Persisting history to {}", path.display());
            Arc::new(FileStore::new(path))
        }
        None => {
            tracing::warn!("No data directory; history will not outlive the session");
            Arc::new(MemoryStore::new())
        }
    };

    let _raw_mode = RawModeGuard::enable().context("failed to enable raw mode")?;
    let terminal = Terminal::new(TrackedSurface::stdout()?);
    // Start from a known cursor position
    terminal.clear()?;

    let mut shell = Shell::new(&config, terminal.clone(), store, demo::commands())?;
    let keys = spawn_input_reader(terminal);

    shell.start()?;
    let result = shell.run(keys).await;
    shell.shutdown().await;
    result?;
    Ok(())
}
