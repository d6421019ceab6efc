// Shell library - exposes all core modules for hosts and tests

// Core modules at root level
pub mod config;

// Organized modules
pub mod app;
pub mod commands;
pub mod input;
pub mod model;
#[cfg(feature = "runtime")]
pub mod services;
pub mod view;

pub use app::{Mode, SessionState, Shell};
pub use config::ShellConfig;
