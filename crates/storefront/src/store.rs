//! Persistent local key-value store.
//!
//! The cart keeps a single key in here holding its JSON snapshot. Writes
//! replace the value wholesale; there are no partial or merging writes.
//!
//! # Backends
//!
//! - [`FileStore`] - one JSON object file on disk, rewritten on every `set`
//! - [`MemoryStore`] - in-process map for tests and embedders

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Errors that can occur reading or writing the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The entries could not be encoded for writing.
    #[error("store encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A string key-value store.
pub trait LocalStore: Send + Sync {
    /// Read the value under `key`, or `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// =============================================================================
// FileStore
// =============================================================================

/// A store backed by a single JSON object file.
///
/// A missing file reads as an empty store, and so does a file that is not a
/// JSON object of strings; the next write replaces it. Writes go to a sibling
/// `<name>.tmp` file which is then renamed over the original.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    /// Open a store at `path`. Nothing is touched on disk until the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring unreadable store file"
                );
                BTreeMap::new()
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, contents).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)?;
        tracing::debug!(key, path = %self.path.display(), "Store value written");
        Ok(())
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// An in-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get("cart").unwrap(), None);
    }

    #[test]
    fn test_file_store_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested/dir/store.json"));

        store.set("cart", "[1,2]").unwrap();
        store.set("other", "x").unwrap();
        store.set("cart", "[3]").unwrap();

        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[3]"));
        assert_eq!(store.get("other").unwrap().as_deref(), Some("x"));

        // A fresh handle on the same file sees the same data
        let reopened = FileStore::new(store.path());
        assert_eq!(reopened.get("cart").unwrap().as_deref(), Some("[3]"));
    }

    #[test]
    fn test_file_store_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::new(&path);
        store.set("cart", "[]").unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("store.json.tmp").exists());
    }

    #[test]
    fn test_file_store_temp_name_keeps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = FileStore::new(dir.path().join("cart.json"));
        let yaml = FileStore::new(dir.path().join("cart.yaml"));

        assert_eq!(json.tmp_path(), dir.path().join("cart.json.tmp"));
        assert_ne!(json.tmp_path(), yaml.tmp_path());
    }

    #[test]
    fn test_file_store_unreadable_file_is_empty_and_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        for contents in ["not json", r#"{"cart": 5}"#, "[1,2]"] {
            std::fs::write(&path, contents).unwrap();
            let store = FileStore::new(&path);

            assert_eq!(store.get("cart").unwrap(), None);
            store.set("cart", "[]").unwrap();
            assert_eq!(store.get("cart").unwrap().as_deref(), Some("[]"));
        }
    }

    #[test]
    fn test_file_store_read_failure_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file
        let store = FileStore::new(dir.path());
        assert!(matches!(store.get("cart"), Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::with_entry("cart", "[]");
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get("missing").unwrap(), None);
        store.set("cart", "[1]").unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[1]"));
    }
}
