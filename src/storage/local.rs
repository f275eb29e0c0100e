//! Guarded storage handle
//!
//! [`LocalStorage`] is what the stores actually hold. It may have no backend
//! at all (headless contexts), in which case every read is absent and every
//! write is skipped. Backend failures are logged and swallowed: persistence
//! is best-effort and must never break the caller.

use crate::storage::backend::{KeyValueStore, MemoryStore};
use crate::storage::file::FileStore;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Cloneable handle to an optional key-value backend
#[derive(Clone, Default)]
pub struct LocalStorage {
    backend: Option<Arc<dyn KeyValueStore>>,
}

impl LocalStorage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A handle with no persistent storage behind it
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    /// Fresh in-memory storage
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// File-backed storage inside `data_dir`
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(Arc::new(FileStore::in_dir(data_dir)))
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Read a raw slot value
    pub fn get_item(&self, key: &str) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read storage slot");
                None
            }
        }
    }

    /// Write a raw slot value
    pub fn set_item(&self, key: &str, value: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        if let Err(e) = backend.set_item(key, value) {
            tracing::warn!(key = %key, error = %e, "Failed to write storage slot");
        }
    }

    /// Delete a slot
    pub fn remove_item(&self, key: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        if let Err(e) = backend.remove_item(key) {
            tracing::warn!(key = %key, error = %e, "Failed to remove storage slot");
        }
    }

    /// Read and decode a JSON slot. Malformed content reads as absent.
    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_item(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ignoring malformed storage slot");
                None
            }
        }
    }

    /// Encode a value as JSON and write it to a slot
    pub fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if !self.is_available() {
            return;
        }
        match serde_json::to_string(value) {
            Ok(raw) => self.set_item(key, &raw),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to encode storage slot");
            }
        }
    }
}

impl fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStorage")
            .field("available", &self.is_available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::error::{StorageError, StorageResult};

    /// Backend whose every call fails
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Lock("broken".to_string()))
        }
        fn set_item(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Lock("broken".to_string()))
        }
        fn remove_item(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Lock("broken".to_string()))
        }
    }

    #[test]
    fn test_unavailable_is_noop() {
        let storage = LocalStorage::unavailable();
        assert!(!storage.is_available());

        storage.set_item("k", "v");
        storage.write_json("list", &vec![1, 2, 3]);
        storage.remove_item("k");

        assert_eq!(storage.get_item("k"), None);
        assert_eq!(storage.read_json::<Vec<i32>>("list"), None);
    }

    #[test]
    fn test_json_round_trip() {
        let storage = LocalStorage::memory();
        storage.write_json("list", &vec!["a", "b"]);

        let read: Option<Vec<String>> = storage.read_json("list");
        assert_eq!(read, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_malformed_json_reads_absent() {
        let storage = LocalStorage::memory();
        storage.set_item("list", "[1, 2,");

        assert_eq!(storage.read_json::<Vec<i32>>("list"), None);
    }

    #[test]
    fn test_backend_errors_are_swallowed() {
        let storage = LocalStorage::new(Arc::new(BrokenStore));

        storage.set_item("k", "v");
        storage.remove_item("k");
        assert_eq!(storage.get_item("k"), None);
    }

    #[test]
    fn test_clones_share_backend() {
        let storage = LocalStorage::memory();
        let other = storage.clone();

        storage.set_item("sessionUserId", "3");
        assert_eq!(other.get_item("sessionUserId").as_deref(), Some("3"));
    }
}
