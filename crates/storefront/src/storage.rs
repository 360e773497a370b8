//! Key-value storage the cart persists into.
//!
//! The [`Storage`] trait is narrow: a string value per string
//! key, read back with `get` and written best-effort with `set`. Callers decide
//! what a failed write means; the cart store logs it and carries on.
//!
//! Two backends are provided:
//! - [`MemoryStorage`] - a `HashMap`, with an optional byte quota for
//!   exercising write failures
//! - [`FileStorage`] - one JSON file per key under a data directory

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors a storage backend can report from `set`.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend refused the write because it is full.
    #[error("storage quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: usize, limit: usize },

    /// The key contains characters the backend cannot store.
    #[error("invalid storage key: `{0}`")]
    InvalidKey(String),

    /// Filesystem failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A string key-value slot store.
pub trait Storage {
    /// Read the value stored under `key`, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the backend could not record the value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: Storage + ?Sized> Storage for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

// =============================================================================
// In-memory backend
// =============================================================================

/// Storage held in a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty, unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects values longer than `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(bytes),
        }
    }

    /// Seed a value without going through the quota check.
    #[must_use]
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota.filter(|&limit| value.len() > limit) {
            return Err(StorageError::QuotaExceeded {
                needed: value.len(),
                limit,
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// File backend
// =============================================================================

/// Storage backed by one file per key.
///
/// Values live at `<dir>/<key>.json`. Writes go to `<key>.json.tmp` first and
/// are renamed into place, so a reader never sees a partially written value.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the storage directory. It is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file a key is stored in.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` unless the key is non-empty ASCII
    /// alphanumerics, `_` and `-`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key).ok()?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to read storage file; treating as absent"
                );
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, value)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_get_set() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("cart"), None);

        storage.set("cart", "[]").unwrap();
        assert_eq!(storage.get("cart").as_deref(), Some("[]"));

        storage.set("cart", "[1]").unwrap();
        assert_eq!(storage.get("cart").as_deref(), Some("[1]"));
    }

    #[test]
    fn test_memory_storage_quota_rejects_and_keeps_old_value() {
        let mut storage = MemoryStorage::with_quota(4);
        storage.set("cart", "[]").unwrap();

        let err = storage.set("cart", "[1,2,3]").unwrap_err();
        assert!(matches!(
            err,
            StorageError::QuotaExceeded {
                needed: 7,
                limit: 4
            }
        ));
        assert_eq!(storage.get("cart").as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("data"));

        assert_eq!(storage.get("mosslad_cart"), None);
        storage.set("mosslad_cart", r#"[{"id":1}]"#).unwrap();
        assert_eq!(storage.get("mosslad_cart").as_deref(), Some(r#"[{"id":1}]"#));

        // A second handle on the same directory sees the value.
        let reopened = FileStorage::new(dir.path().join("data"));
        assert_eq!(reopened.get("mosslad_cart").as_deref(), Some(r#"[{"id":1}]"#));
        assert!(!dir.path().join("data/mosslad_cart.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());

        assert!(matches!(
            storage.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.set("", "x"), Err(StorageError::InvalidKey(_))));
        assert_eq!(storage.get("../escape"), None);
    }

    #[test]
    fn test_file_storage_unwritable_directory_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let mut storage = FileStorage::new(&blocker);
        assert!(matches!(
            storage.set("mosslad_cart", "[]"),
            Err(StorageError::Io(_))
        ));
    }
}
