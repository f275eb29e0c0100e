//! Persisted Session Store
//!
//! Holds the currently logged-in user, if any. The in-memory record is the
//! source of truth; the `sessionUserId` slot only remembers which user to
//! look up again on the next start.

use crate::observable::Observable;
use crate::session::directory::UserDirectory;
use crate::session::user::User;
use crate::storage::LocalStorage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Storage slot holding the bare identifier of the logged-in user
pub const SESSION_USER_KEY: &str = "sessionUserId";

/// Observable "current user or none", re-established from storage on start
pub struct SessionStore {
    user: Observable<Option<User>>,
    storage: LocalStorage,
    directory: Arc<dyn UserDirectory>,
    restored: AtomicBool,
}

impl SessionStore {
    pub fn new(storage: LocalStorage, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            user: Observable::new(None),
            storage,
            directory,
            restored: AtomicBool::new(false),
        }
    }

    /// The logged-in user
    pub fn current(&self) -> Option<User> {
        self.user.get()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.with(Option::is_some)
    }

    /// Identifier remembered from a previous session
    pub fn persisted_user_id(&self) -> Option<String> {
        self.storage.get_item(SESSION_USER_KEY)
    }

    /// Observe login and logout
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }

    /// Log in as `identifier`.
    ///
    /// An empty or absent identifier logs out. Otherwise the user is looked
    /// up; on success it becomes the current user and the identifier is
    /// persisted. Any lookup failure is logged and ends with no session, it
    /// is never returned to the caller.
    ///
    /// Overlapping calls are not coordinated: whichever lookup finishes last
    /// decides the session.
    pub async fn establish(&self, identifier: Option<&str>) {
        let Some(id) = identifier.map(str::trim).filter(|id| !id.is_empty()) else {
            self.clear();
            return;
        };

        match self.directory.fetch_user(id).await {
            Ok(user) => {
                tracing::info!(user_id = %id, role = %user.role, "Session established");
                self.user.set(Some(user));
                self.storage.set_item(SESSION_USER_KEY, id);
            }
            Err(e) => {
                tracing::error!(user_id = %id, error = %e, "Login failed");
                self.clear();
            }
        }
    }

    /// Log out
    pub fn clear(&self) {
        self.user.set(None);
        self.storage.remove_item(SESSION_USER_KEY);
        tracing::debug!("Session cleared");
    }

    /// Re-establish the persisted session.
    ///
    /// Only the first call on a store does anything. Returns whether a
    /// lookup was attempted.
    pub async fn restore(&self) -> bool {
        if self.restored.swap(true, Ordering::SeqCst) {
            return false;
        }

        let Some(id) = self.persisted_user_id() else {
            return false;
        };

        tracing::info!(user_id = %id, "Restoring persisted session");
        self.establish(Some(&id)).await;
        true
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("user", &self.current())
            .field("storage", &self.storage)
            .finish()
    }
}
