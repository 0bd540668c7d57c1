//! Key-value preference storage
//!
//! Mirrors browser LocalStorage: string keys mapped to string values, with an
//! explicit `save` that flushes to durable media. Backends:
//! - `MemoryStore`: in-process map (tests, ephemeral sessions)
//! - `FileStore`: one `<key>.json` file per key under a directory (native)
//! - `LocalStorageStore`: window.localStorage (wasm32)

use std::collections::HashMap;

#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure writing to (or reaching) a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize value for key `{key}`")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed preference storage
pub trait KeyValueStore {
    /// Read a value, `None` if the key was never written
    fn get_string(&self, key: &str) -> Option<String>;

    /// Stage a value; becomes durable on the next `save`
    fn set_string(&mut self, key: &str, value: &str);

    /// Flush staged values to durable media
    fn save(&mut self) -> Result<(), StorageError>;
}

/// In-memory store. `save` is a no-op.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store (e.g. to simulate data left by a previous session)
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.set_string(key, value);
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn save(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Directory-backed store, one file per key
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    /// Values written since the last save
    dirty: HashMap<String, String>,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            dirty: HashMap::new(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get_string(&self, key: &str) -> Option<String> {
        if let Some(value) = self.dirty.get(key) {
            return Some(value.clone());
        }
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.dirty.insert(key.to_string(), value.to_string());
    }

    fn save(&mut self) -> Result<(), StorageError> {
        if self.dirty.is_empty() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir)?;
        for (key, value) in &self.dirty {
            // Write to a temp file then rename so a crash never leaves half a file
            let path = self.path_for(key);
            let tmp = path.with_extension("json.tmp");
            std::fs::write(&tmp, value)?;
            std::fs::rename(&tmp, &path)?;
        }
        log::debug!("Flushed {} key(s) to {}", self.dirty.len(), self.dir.display());
        self.dirty.clear();
        Ok(())
    }
}

/// Turn writes rejected since the last flush into a save error
#[cfg(any(target_arch = "wasm32", test))]
fn take_rejected(rejected: &mut Vec<String>) -> Result<(), StorageError> {
    if rejected.is_empty() {
        return Ok(());
    }
    let keys = std::mem::take(rejected).join(", ");
    Err(StorageError::Unavailable(format!("writes rejected for {keys}")))
}

/// window.localStorage backend (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorageStore {
    /// Keys whose `set_item` failed (quota, private mode) since the last save
    rejected: Vec<String>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorageStore {
    fn get_string(&self, key: &str) -> Option<String> {
        Self::storage().and_then(|s| s.get_item(key).ok()).flatten()
    }

    fn set_string(&mut self, key: &str, value: &str) {
        match Self::storage() {
            Some(storage) => {
                if storage.set_item(key, value).is_err() {
                    log::error!("LocalStorage rejected write for key {key}");
                    self.rejected.push(key.to_string());
                }
            }
            None => {
                log::error!("LocalStorage unavailable, dropping write for key {key}");
                self.rejected.push(key.to_string());
            }
        }
    }

    fn save(&mut self) -> Result<(), StorageError> {
        // LocalStorage writes are durable on set_item
        take_rejected(&mut self.rejected)?;
        Self::storage()
            .map(|_| ())
            .ok_or_else(|| StorageError::Unavailable("window.localStorage".to_string()))
    }
}
