//! Key-value storage backends
//!
//! The [`KeyValueStore`] trait mirrors the browser local storage contract:
//! string slot names mapping to string values.

use crate::storage::error::{StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// A persistent string-to-string slot store
pub trait KeyValueStore: Send + Sync {
    /// Read a slot, `None` when it has never been written
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a slot, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a slot. Removing a missing slot is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// In-process store, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently held
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get_item("slot").unwrap(), None);

        store.set_item("slot", "value").unwrap();
        assert_eq!(store.get_item("slot").unwrap().as_deref(), Some("value"));
        assert_eq!(store.len(), 1);

        store.set_item("slot", "other").unwrap();
        assert_eq!(store.get_item("slot").unwrap().as_deref(), Some("other"));

        store.remove_item("slot").unwrap();
        assert_eq!(store.get_item("slot").unwrap(), None);
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove_item("never-written").is_ok());
    }
}
