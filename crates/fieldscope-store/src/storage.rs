//! The scoped key-value storage collaborator.
//!
//! Keys are flat strings scoped to the application; values are opaque
//! strings (the activity store writes JSON documents). Two backends are
//! provided: [`FileStorage`], which maps each key to a file under a root
//! directory and writes atomically via a temp-file rename, and
//! [`MemoryStorage`] for tests and ephemeral sessions.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::error::StoreError;

/// A scoped string key-value store whose values survive process restart.
///
/// All operations are synchronous; the activity store persists inside its
/// own mutation critical section so no partial-write state is observable.
pub trait ScopedStorage: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// File-backed storage: one file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory that holds one `<key>.json` file per key.
    root: PathBuf,
}

impl FileStorage {
    /// Create a file store rooted at `root`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl ScopedStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Backend(err)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Write-then-rename so a crash mid-write never leaves a truncated
        // value under the real key.
        let tmp = self.root.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path_for(key))?;
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    /// Backing map behind a mutex so the store is shareable across threads.
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScopedStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
