//! User Session
//!
//! - **user**: the user record served by the backend
//! - **directory**: [`UserDirectory`] trait and its HTTP implementation
//! - **store**: [`SessionStore`], the persisted "who is logged in" state

pub mod directory;
pub mod store;
pub mod user;

pub use directory::{HttpUserDirectory, LookupError, UserDirectory};
pub use store::{SessionStore, SESSION_USER_KEY};
pub use user::{User, UserRole};
