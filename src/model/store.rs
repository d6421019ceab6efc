//! Key-value storage backends
//!
//! Shell state that outlives a session (the command history) is persisted as
//! string values under fixed keys. The shell only depends on the
//! [`KeyValueStore`] trait; where the values live is up to the host.

use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Trait for pluggable storage backends
///
/// Implementations are called from background tasks, so they must be
/// shareable across threads.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or None if nothing is stored there
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// In-process store
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the shell wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one item
    pub fn with_item(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Snapshot of a stored value
    pub fn get(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.get(key))
    }

    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store: all items live in one JSON object on disk
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous document intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Default location under the platform data directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("termshell").join("store.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> anyhow::Result<HashMap<String, String>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        serde_json::from_str(&data).with_context(|| format!("parsing {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("Discarding unreadable store {}: {:#}", self.path.display(), e);
                HashMap::new()
            }
        };
        map.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&map)?)
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

/// Store wrapper that adds a fixed delay to every write
///
/// Used to check that storage latency never stalls the interactive loop.
#[cfg(test)]
pub struct SlowStore<T: KeyValueStore> {
    inner: T,
    write_delay: std::time::Duration,
    writes: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl<T: KeyValueStore> SlowStore<T> {
    pub fn new(inner: T, write_delay: std::time::Duration) -> Self {
        Self {
            inner,
            write_delay,
            writes: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of completed writes
    pub fn writes(&self) -> usize {
        self.writes.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl<T: KeyValueStore> KeyValueStore for SlowStore<T> {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        std::thread::sleep(self.write_delay);
        let result = self.inner.set_item(key, value);
        self.writes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        result
    }
}

/// Store whose every operation fails
#[cfg(test)]
pub struct FailingStore;

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get_item(&self, _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("storage unavailable")
    }

    fn set_item(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("storage unavailable")
    }
}
