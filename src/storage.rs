//! Storage layer for tasktrack
//!
//! Persistent state is a tiny key-value store with two fixed keys:
//!
//! ```text
//! <data dir>/
//!   taskTracker_user            # Logged-in username (raw text)
//!   taskTracker_tasks           # JSON array of tasks
//!   config.toml                 # Optional configuration
//! ```
//!
//! Whether storage exists at all is a capability of the store: when no data
//! directory can be resolved the `UnavailableStore` answers every read with
//! "absent" and ignores writes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::Utc;
use serde_json::Value;

use crate::error::Result;
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};
use crate::normalize;
use crate::task::Task;

/// Key holding the logged-in username
pub const USER_KEY: &str = "taskTracker_user";

/// Key holding the serialized task collection
pub const TASKS_KEY: &str = "taskTracker_tasks";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TASKTRACK_DIR";

/// Synchronous key-value storage.
pub trait KeyValueStore: fmt::Debug {
    /// Whether this store can hold data at all.
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// One file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path to the file backing `key`
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        lock::read_locked_str(&path, self.lock_timeout_ms)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        tracing::debug!(key, bytes = value.len(), dir = %self.dir.display(), "store write");
        lock::write_atomic_locked(self.key_path(key), value.as_bytes(), self.lock_timeout_ms)
    }

    fn remove(&self, key: &str) -> Result<()> {
        tracing::debug!(key, dir = %self.dir.display(), "store remove");
        lock::remove_locked(self.key_path(key), self.lock_timeout_ms)
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// No storage-capable environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn is_available(&self) -> bool {
        false
    }

    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> Result<()> {
        tracing::debug!(key, "storage unavailable, write dropped");
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

/// Resolve the data directory: explicit flag, then `TASKTRACK_DIR`, then the
/// platform data directory. `None` means no storage is available.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = explicit {
        return Some(dir.to_path_buf());
    }
    if let Ok(value) = std::env::var(DATA_DIR_ENV) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    directories::ProjectDirs::from("", "", "tasktrack").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Username and task persistence over a `KeyValueStore`.
///
/// Cloning shares the underlying store.
#[derive(Debug, Clone)]
pub struct Persistence {
    store: Rc<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Rc::new(store),
        }
    }

    /// File-backed persistence for a resolved data directory, or the
    /// unavailable store when there is none.
    pub fn for_data_dir(dir: Option<PathBuf>) -> Self {
        match dir {
            Some(dir) => Self::new(FileStore::new(dir)),
            None => {
                tracing::warn!("no data directory available; changes will not be saved");
                Self::new(UnavailableStore)
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn is_available(&self) -> bool {
        self.store.is_available()
    }

    pub fn store_username(&self, name: &str) -> Result<()> {
        self.store.set(USER_KEY, name)
    }

    /// The stored username; absent when unset, blank, or unreadable.
    pub fn load_username(&self) -> Option<String> {
        if !self.store.is_available() {
            return None;
        }
        match self.store.get(USER_KEY) {
            Ok(Some(raw)) => {
                let name = raw.trim();
                if name.is_empty() {
                    None
                } else {
                    Some(name.to_string())
                }
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read stored username");
                None
            }
        }
    }

    pub fn clear_username(&self) -> Result<()> {
        self.store.remove(USER_KEY)
    }

    /// Overwrite the stored collection with `tasks`.
    pub fn store_tasks(&self, tasks: &[Task]) -> Result<()> {
        let payload = serde_json::to_string(tasks)?;
        self.store.set(TASKS_KEY, &payload)
    }

    /// Load and normalize the stored collection.
    ///
    /// Never fails: unreadable or corrupt payloads are logged and yield an
    /// empty collection.
    pub fn load_tasks(&self) -> Vec<Task> {
        if !self.store.is_available() {
            return Vec::new();
        }
        let raw = match self.store.get(TASKS_KEY) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return Vec::new(),
            Err(err) => {
                tracing::error!(error = %err, "failed to read stored tasks");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(records)) => normalize::normalize_all(&records, Utc::now()),
            Ok(other) => {
                tracing::error!(kind = json_kind(&other), "stored tasks are not an array");
                Vec::new()
            }
            Err(err) => {
                tracing::error!(error = %err, "error parsing stored tasks");
                Vec::new()
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
