//! Request forwarding
//!
//! Maps an incoming request under the configured prefix onto the backend
//! origin, sends it with reqwest and relays the response.

use crate::config::ProxyConfig;
use crate::devproxy::error::{ProxyError, ProxyResult};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName},
    response::Response,
};
use std::sync::Arc;

/// Largest request body forwarded (bytes)
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Headers that describe a single connection and are never forwarded
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "proxy-connection"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Shared state of the proxy handler
#[derive(Debug)]
pub struct ProxyState {
    client: reqwest::Client,
    prefix: String,
    target: String,
    change_origin: bool,
}

impl ProxyState {
    pub fn new(config: &ProxyConfig) -> ProxyResult<Self> {
        let target = reqwest::Url::parse(&config.target).map_err(|e| ProxyError::InvalidTarget {
            target: config.target.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(target.scheme(), "http" | "https") || target.host_str().is_none() {
            return Err(ProxyError::InvalidTarget {
                target: config.target.clone(),
                reason: "expected an http(s) origin".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ProxyError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            prefix: normalize_prefix(&config.prefix),
            target: config.target.trim_end_matches('/').to_string(),
            change_origin: config.change_origin,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path below the prefix, or `None` when the path is not forwarded.
    /// The prefix only matches whole segments: `/api` and `/api/...`.
    pub fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }

    /// Absolute backend URL for a stripped path and optional query
    pub fn upstream_url(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) => format!("{}{}?{}", self.target, path, q),
            None => format!("{}{}", self.target, path),
        }
    }
}

/// `/api` with no trailing slash; the root prefix becomes empty
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Copy end-to-end headers only
fn end_to_end_headers(headers: &HeaderMap) -> HeaderMap {
    // Headers listed in `Connection` are hop-by-hop as well
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) || name == header::CONTENT_LENGTH || listed.contains(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Fallback handler: forward or answer 404
pub async fn forward(
    State(state): State<Arc<ProxyState>>,
    request: Request,
) -> ProxyResult<Response> {
    let (parts, body) = request.into_parts();

    let path = parts.uri.path();
    let rest = state
        .strip_prefix(path)
        .ok_or_else(|| ProxyError::NoRoute(path.to_string()))?;
    let url = state.upstream_url(rest, parts.uri.query());

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ProxyError::Body(e.to_string()))?;

    let mut headers = end_to_end_headers(&parts.headers);
    if state.change_origin {
        // reqwest fills in the target's authority
        headers.remove(header::HOST);
    }

    tracing::debug!(method = %parts.method, from = %path, to = %url, "Forwarding request");

    let upstream = state
        .client
        .request(parts.method.clone(), &url)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let status = upstream.status();
    let response_headers = end_to_end_headers(upstream.headers());
    let bytes = upstream.bytes().await?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}
