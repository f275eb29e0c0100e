//! User Directory
//!
//! Looks users up on the backend. The session store only needs
//! [`UserDirectory::fetch_user`]; listing backs the CLI's user picker.

use crate::config::ApiConfig;
use crate::session::user::User;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Source of user records
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch one user by identifier
    async fn fetch_user(&self, id: &str) -> Result<User, LookupError>;

    /// Fetch a page of users
    async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<User>, LookupError>;
}

/// User directory backed by the platform's REST API
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    client: Client,
    base_url: String,
}

impl HttpUserDirectory {
    /// Create a directory for an API base such as `http://localhost:5173/api`
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, LookupError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, LookupError> {
        Self::new(
            config.base_url.clone(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn user_url(&self, id: &str) -> String {
        format!("{}/users/{}", self.base_url, urlencoding::encode(id))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        not_found: impl FnOnce() -> LookupError,
    ) -> Result<T, LookupError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(not_found());
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| LookupError::Decode(e.to_string()))
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn fetch_user(&self, id: &str) -> Result<User, LookupError> {
        let url = self.user_url(id);
        tracing::debug!(url = %url, "Looking up user");

        self.get_json(&url, || LookupError::NotFound(id.to_string()))
            .await
    }

    async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<User>, LookupError> {
        let url = format!("{}/users/?skip={}&limit={}", self.base_url, skip, limit);
        tracing::debug!(url = %url, "Listing users");

        self.get_json(&url, || LookupError::NotFound("users".to_string()))
            .await
    }
}

/// Errors from a user lookup
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed user payload: {0}")]
    Decode(String),
}
