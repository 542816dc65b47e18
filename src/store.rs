//! Key-value persistence shared with the input and results pages.
//!
//! Two entries live here: the user's configuration and the latest
//! estimation result, both as plain JSON. Readers treat an absent or
//! unreadable entry as "no data" rather than an error.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{EstimatorError, Result};
use crate::models::{Configuration, EstimationResult};

pub const CONFIGURATION_KEY: &str = "userConfiguration";
pub const RESULT_KEY: &str = "estimationResult";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

// ─── In-memory store ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        if let Ok(map) = self.entries.read() {
            map.get(key).cloned()
        } else {
            None
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.entries.write().map_err(|_| lock_poisoned())?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.entries.write().map_err(|_| lock_poisoned())?;
        map.remove(key);
        Ok(())
    }
}

fn lock_poisoned() -> EstimatorError {
    EstimatorError::Storage("store lock poisoned".to_string())
}

// ─── File-backed store ───────────────────────────────────────────────────────

/// One `<key>.json` file per entry inside `dir`.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            EstimatorError::Storage(format!("cannot create {}: {}", self.dir.display(), e))
        })?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|e| {
            EstimatorError::Storage(format!("cannot write {}: {}", path.display(), e))
        })?;
        debug!("Stored {} ({} bytes)", path.display(), value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EstimatorError::Storage(format!(
                "cannot remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

// ─── Typed entries ───────────────────────────────────────────────────────────

pub fn load_configuration(store: &dyn KeyValueStore) -> Option<Configuration> {
    load_json(store, CONFIGURATION_KEY)
}

pub fn save_configuration(store: &dyn KeyValueStore, config: &Configuration) -> Result<()> {
    save_json(store, CONFIGURATION_KEY, config)
}

pub fn load_result(store: &dyn KeyValueStore) -> Option<EstimationResult> {
    load_json(store, RESULT_KEY)
}

pub fn save_result(store: &dyn KeyValueStore, result: &EstimationResult) -> Result<()> {
    save_json(store, RESULT_KEY, result)
}

fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring malformed '{}' entry: {}", key, e);
            None
        }
    }
}

fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| EstimatorError::Storage(format!("cannot serialize '{}': {}", key, e)))?;
    store.set(key, &raw)
}
