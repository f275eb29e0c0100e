//! Shared fixtures for unit tests: sample users, an in-memory user directory
//! and throwaway HTTP backends bound to ephemeral local ports.

use crate::session::{LookupError, User, UserDirectory, UserRole};
use async_trait::async_trait;
use axum::{
    extract::{Path, Query},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn admin_user() -> User {
    User {
        id: 1,
        full_name: "Ada Admin".to_string(),
        email: "ada@example.org".to_string(),
        role: UserRole::Admin,
        service: Some("IT".to_string()),
    }
}

pub fn manager_user() -> User {
    User {
        id: 2,
        full_name: "Max Manager".to_string(),
        email: "max@example.org".to_string(),
        role: UserRole::Manager,
        service: Some("Finance".to_string()),
    }
}

/// In-memory directory that counts lookups
#[derive(Default)]
pub struct StaticDirectory {
    users: HashMap<String, User>,
    lookups: AtomicUsize,
}

impl StaticDirectory {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id.to_string(), u)).collect(),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn fetch_user(&self, id: &str) -> Result<User, LookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(id.to_string()))
    }

    async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<User>, LookupError> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }
}

#[derive(Deserialize)]
struct ListParams {
    skip: Option<usize>,
    limit: Option<usize>,
}

async fn get_user(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "1" => Json(admin_user()).into_response(),
        "2" => Json(manager_user()).into_response(),
        "malformed" => Json(json!({ "unexpected": true })).into_response(),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "detail": "User not found" }))).into_response(),
    }
}

async fn list_users(Query(params): Query<ListParams>) -> Json<Vec<User>> {
    let users = vec![admin_user(), manager_user()];
    Json(
        users
            .into_iter()
            .skip(params.skip.unwrap_or(0))
            .take(params.limit.unwrap_or(100))
            .collect(),
    )
}

/// Reflects the request back as JSON
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let mut response = Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "host": header("host"),
        "x_custom": header("x-custom"),
        "keep_alive": header("keep-alive"),
        "body": body,
    }))
    .into_response();
    response
        .headers_mut()
        .insert("x-upstream", HeaderValue::from_static("echo"));
    response
}

/// Backend routes as the platform API serves them (no `/api` prefix)
pub fn backend_router() -> Router {
    Router::new()
        .route("/users/", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/", any(echo))
        .route("/echo", any(echo))
        .route("/echo/*rest", any(echo))
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Backend reachable as the browser sees it, i.e. under `/api`
pub async fn spawn_user_backend() -> String {
    spawn(Router::new().nest("/api", backend_router())).await
}

/// Backend at its own origin, as the development proxy targets it
pub async fn spawn_upstream() -> String {
    spawn(backend_router()).await
}
