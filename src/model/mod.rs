//! Persistent shell data
//!
//! - `history.rs` - Bounded command history with background write-back
//! - `store.rs` - Key-value storage backends the history persists to

pub mod history;
pub mod store;

pub use history::{HistoryStore, PersistenceError};
pub use store::{FileStore, KeyValueStore, MemoryStore};
