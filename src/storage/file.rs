//! File-backed key-value store
//!
//! All slots live in a single JSON object file, e.g.
//!
//! ```text
//! { "commandQueue": "[{\"op\":\"reset\"}]", "sessionUserId": "42" }
//! ```
//!
//! Every operation re-reads the file, so a fresh handle always sees what was
//! last written. Writes go to a uniquely named temporary file in the same
//! directory which is then renamed over the original, so readers never see a
//! partial file and concurrent writers never fail on each other's temp file.
//!
//! Read-modify-write is serialized per handle only. Several handles or
//! processes writing the same file do not coordinate: each write succeeds and
//! the last rename wins.

use crate::storage::backend::KeyValueStore;
use crate::storage::error::{StorageError, StorageResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Default file name inside the data directory
pub const STATE_FILE_NAME: &str = "local_storage.json";

type SlotMap = BTreeMap<String, String>;

/// Key-value store persisted to a JSON file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    /// Open a store at an explicit file path. The file is created lazily.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Open the store file inside a data directory
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> StorageResult<SlotMap> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SlotMap::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(SlotMap::new());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::Corruption {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Read the map for a write. A corrupt file is replaced rather than
    /// blocking every future write.
    fn read_map_for_write(&self) -> StorageResult<SlotMap> {
        match self.read_map() {
            Err(StorageError::Corruption { path, reason }) => {
                tracing::warn!(path = ?path, reason = %reason, "Replacing corrupt storage file");
                Ok(SlotMap::new())
            }
            other => other,
        }
    }

    fn write_map(&self, map: &SlotMap) -> StorageResult<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let data = serde_json::to_vec_pretty(map)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::trace!(path = ?self.path, slots = map.len(), "Storage file written");
        Ok(())
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, ()>> {
        self.guard
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock()?;
        Ok(self.read_map()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock()?;
        let mut map = self.read_map_for_write()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let _guard = self.lock()?;
        let mut map = self.read_map_for_write()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}
