//! Key-value persistence collaborators for session state.
//!
//! The engine only needs `get`/`set` over strings; history encodes itself as
//! JSON before it gets here. Storage failures are reported but the engine
//! recovers from all of them by staying on its in-memory state.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Errors that can occur while persisting session state.
#[derive(Debug, Clone)]
pub enum StorageError {
    /// IO error (path, message).
    Io(String, String),
    /// The backing store refuses writes (quota, disabled storage).
    Disabled,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(path, msg) => write!(f, "IO error for '{}': {}", path, msg),
            StorageError::Disabled => write!(f, "storage is disabled"),
        }
    }
}

impl std::error::Error for StorageError {}

/// A string key-value store scoped to one session.
pub trait KeyValueStore: Send + Sync {
    /// Read the value for a key, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write the value for a key.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store that refuses every write, mimicking disabled browser storage.
///
/// Useful for verifying that persistence failures stay silent.
#[derive(Debug, Default)]
pub struct DisabledStore;

impl KeyValueStore for DisabledStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Disabled)
    }
}

/// File-backed store: one file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are session-scoped identifiers, not arbitrary paths.
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .map_err(|e| StorageError::Io(self.dir.display().to_string(), e.to_string()))?;
        }
        let path = self.path_for(key);
        fs::write(&path, value)
            .map_err(|e| StorageError::Io(path.display().to_string(), e.to_string()))
    }
}
