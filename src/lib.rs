//! # Provisio
//!
//! Client-side state for the IT Provisioning Platform front-end, plus the
//! development proxy that routes its `/api` calls to the backend.
//!
//! ## Features
//!
//! - **Command queue**: ordered list of pending commands, persisted after every change
//! - **Session**: the logged-in user, looked up over HTTP and resumed on restart
//! - **Local storage**: file-backed key-value slots that degrade to no-ops when absent
//! - **Dev proxy**: forwards `/api/*` to the backend with the prefix stripped
//!
//! ## Modules
//!
//! - [`storage`]: Persistent key-value slots
//! - [`observable`]: Single-value publish/subscribe
//! - [`command_queue`]: Persisted command list
//! - [`session`]: User lookup and session store
//! - [`app`]: Explicit application context
//! - [`devproxy`]: Development API proxy with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use provisio::{AppContext, Config};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = AppContext::from_config(&Config::load_default().config)?;
//!
//!     // Resume the previous session, if any
//!     app.start().await;
//!
//!     if !app.session.is_logged_in() {
//!         app.session.establish(Some("1")).await;
//!     }
//!
//!     app.command_queue.push(json!({ "action": "create_mailbox", "user": "jdoe" }));
//!     println!("{} pending commands", app.command_queue.len());
//!
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod command_queue;
pub mod config;
pub mod devproxy;
pub mod logging;
pub mod observable;
pub mod session;
pub mod storage;

#[cfg(test)]
mod test_support;

// Re-export top-level types for convenience
pub use app::AppContext;

pub use command_queue::{CommandQueue, COMMAND_QUEUE_KEY};

pub use config::{
    generate_default_config, ApiConfig, Config, ConfigError, LoadedConfig, LoggingConfig,
    ProxyConfig, StorageConfig,
};

pub use devproxy::{build_router, serve, ProxyError, ProxyResult};

pub use observable::Observable;

pub use session::{
    HttpUserDirectory, LookupError, SessionStore, User, UserDirectory, UserRole, SESSION_USER_KEY,
};

pub use storage::{FileStore, KeyValueStore, LocalStorage, MemoryStore, StorageError, StorageResult};
