//! Application Context
//!
//! Owns the storage handle and both stores. The shell creates one context,
//! passes it to whatever needs the stores, and calls [`AppContext::start`]
//! once to re-establish a persisted session.

use crate::command_queue::CommandQueue;
use crate::config::Config;
use crate::session::{HttpUserDirectory, LookupError, SessionStore, UserDirectory};
use crate::storage::LocalStorage;
use std::sync::Arc;

/// Client-side state shared by the application
#[derive(Clone, Debug)]
pub struct AppContext {
    /// Persistent slots behind both stores
    pub storage: LocalStorage,
    /// Pending user-issued commands
    pub command_queue: Arc<CommandQueue>,
    /// Logged-in user
    pub session: Arc<SessionStore>,
}

impl AppContext {
    pub fn new(storage: LocalStorage, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            command_queue: Arc::new(CommandQueue::load(storage.clone())),
            session: Arc::new(SessionStore::new(storage.clone(), directory)),
            storage,
        }
    }

    /// Build the context described by a configuration: file-backed storage
    /// (or none when disabled) and the HTTP user directory.
    pub fn from_config(config: &Config) -> Result<Self, LookupError> {
        let storage = if config.storage.enabled {
            LocalStorage::in_dir(config.storage.data_path())
        } else {
            tracing::info!("Local storage disabled, state will not persist");
            LocalStorage::unavailable()
        };

        let directory = Arc::new(HttpUserDirectory::from_config(&config.api)?);
        Ok(Self::new(storage, directory))
    }

    /// Startup hook: restore the persisted session. Repeated calls are no-ops.
    pub async fn start(&self) {
        if self.session.restore().await {
            match self.session.current() {
                Some(user) => tracing::info!(user = %user.full_name, "Resumed session"),
                None => tracing::info!("Persisted session could not be resumed"),
            }
        }
    }
}
