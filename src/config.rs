//! Shell configuration
//!
//! Read from a JSON file; every field is optional. The binary applies its
//! command-line overrides on top of what is loaded here.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::history::{DEFAULT_HISTORY_CAPACITY, DEFAULT_HISTORY_KEY};
use crate::model::FileStore;

pub const DEFAULT_PROMPT: &str = "$ ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ShellConfig {
    /// Text written before every input line
    pub prompt: String,

    /// Maximum number of history entries kept
    pub history_capacity: usize,

    /// Key the history is stored under
    pub history_key: String,

    /// File backing the history store
    ///
    /// Defaults to `store.json` in the platform data directory.
    pub history_file: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            history_key: DEFAULT_HISTORY_KEY.to_string(),
            history_file: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ShellConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, falling back to defaults when the file does not exist
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// `config.json` in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("termshell").join("config.json"))
    }

    /// Where history is persisted: the configured file, else the default store
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file.clone().or_else(FileStore::default_path)
    }
}
