//! Commands and their dispatch
//!
//! - `registry.rs` - Command descriptors, the handler trait and the registry
//! - `dispatch.rs` - Line parsing, arity validation and handler invocation
//! - `process.rs` - Process ids and exit signaling for long-running commands
//! - `builtin.rs` - `id`, `man` and `help`
//! - `demo.rs` - Sample commands used by the binary

pub mod builtin;
pub mod demo;
pub mod dispatch;
pub mod process;
pub mod registry;

pub use dispatch::DispatchError;
pub use process::{ExitChannel, ExitHandle, ProcessId};
pub use registry::{
    Arity, CommandContext, CommandDescriptor, CommandHandler, CommandRegistry, RegistryError,
};
