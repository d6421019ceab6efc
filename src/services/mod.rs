//! Host-side services
//!
//! - `command_log.rs` - Tracing layer recording dispatched commands to a file

#[cfg(feature = "runtime")]
pub mod command_log;
