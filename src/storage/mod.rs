//! Local Storage
//!
//! Persistent key-value slots shared by the client-side stores:
//!
//! - **backend**: the [`KeyValueStore`] trait and an in-memory implementation
//! - **file**: JSON-file implementation, the on-disk analogue of browser local storage
//! - **local**: [`LocalStorage`], a guarded handle that may have no backend at all
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust
//! use provisio::storage::LocalStorage;
//!
//! let storage = LocalStorage::memory();
//! storage.write_json("commandQueue", &vec!["restart-mailbox"]);
//!
//! let queue: Option<Vec<String>> = storage.read_json("commandQueue");
//! assert_eq!(queue.unwrap().len(), 1);
//!
//! // Headless contexts have no storage; reads are absent, writes are skipped.
//! let headless = LocalStorage::unavailable();
//! headless.set_item("sessionUserId", "42");
//! assert_eq!(headless.get_item("sessionUserId"), None);
//! ```

pub mod backend;
pub mod error;
pub mod file;
pub mod local;

pub use backend::{KeyValueStore, MemoryStore};
pub use error::{StorageError, StorageResult};
pub use file::{FileStore, STATE_FILE_NAME};
pub use local::LocalStorage;
