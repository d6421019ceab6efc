//! Command history
//!
//! A bounded, oldest-first list of submitted lines. Consecutive duplicates
//! are collapsed and the oldest entries are evicted once the capacity is
//! reached. Every mutation schedules a write-back to the key-value store on
//! a background task; the interactive loop never waits for storage.

use std::collections::VecDeque;
use std::sync::Arc;

use super::store::KeyValueStore;

/// Maximum number of entries kept by default
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Store key the history is persisted under by default
pub const DEFAULT_HISTORY_KEY: &str = "history";

/// Failure to read or write persisted history
///
/// Never surfaced to the user: it is logged and the shell carries on with
/// whatever is in memory.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("storage backend failed: {0:#}")]
    Backend(#[source] anyhow::Error),

    #[error("persisted history is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub struct HistoryStore {
    entries: VecDeque<String>,
    capacity: usize,
    key: String,
    store: Arc<dyn KeyValueStore>,
    pending_writes: Vec<tokio::task::JoinHandle<()>>,
}

impl HistoryStore {
    /// Load history from `store`
    ///
    /// Missing or malformed data yields an empty history. If more than
    /// `capacity` entries were persisted, only the newest are kept.
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>, capacity: usize) -> Self {
        let key = key.into();
        let mut entries = match read_entries(store.as_ref(), &key) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to load command history: {}", e);
                VecDeque::new()
            }
        };
        while entries.len() > capacity {
            entries.pop_front();
        }
        tracing::debug!("Loaded {} history entries", entries.len());

        Self {
            entries,
            capacity,
            key,
            store,
            pending_writes: Vec::new(),
        }
    }

    /// Append a submitted line
    ///
    /// Returns false (and schedules nothing) when `command` equals the most
    /// recent entry.
    pub fn push(&mut self, command: &str) -> bool {
        if self.entries.back().is_some_and(|last| last == command) {
            return false;
        }

        self.entries.push_back(command.to_string());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.schedule_write();
        true
    }

    /// Entry at `index` (0 is the oldest)
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries oldest-first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Wait for every scheduled write-back to finish
    pub async fn flush(&mut self) {
        for handle in self.pending_writes.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!("History write task failed: {}", e);
            }
        }
    }

    /// Snapshot the entries and hand the write to a background task
    ///
    /// Writes are not ordered relative to each other; each one carries a
    /// full snapshot, so the last to land wins.
    fn schedule_write(&mut self) {
        let data = match serde_json::to_string(&self.entries) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Failed to serialize command history: {}", e);
                return;
            }
        };
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let write = move || {
            if let Err(e) = store.set_item(&key, &data) {
                tracing::warn!(
                    "Failed to persist command history: {}",
                    PersistenceError::Backend(e)
                );
            }
        };

        self.pending_writes.retain(|handle| !handle.is_finished());
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => self.pending_writes.push(runtime.spawn_blocking(write)),
            Err(_) => {
                std::thread::spawn(write);
            }
        }
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("entries", &self.entries)
            .field("capacity", &self.capacity)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

fn read_entries(store: &dyn KeyValueStore, key: &str) -> Result<VecDeque<String>, PersistenceError> {
    let Some(data) = store.get_item(key).map_err(PersistenceError::Backend)? else {
        return Ok(VecDeque::new());
    };
    Ok(serde_json::from_str(&data)?)
}
