//! Development API Proxy
//!
//! Local stand-in for the front-end dev server's proxy rule: requests whose
//! path starts with the configured prefix (`/api`) are forwarded to the
//! backend origin with the prefix stripped, so `GET /api/users/7` reaches
//! `GET {target}/users/7`. Everything else answers `404`.
//!
//! # Example
//!
//! ```rust,no_run
//! use provisio::config::ProxyConfig;
//! use provisio::devproxy::serve;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProxyConfig {
//!         target: "http://localhost:8000".to_string(),
//!         ..Default::default()
//!     };
//!     serve(&config).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod forward;

pub use error::{ProxyError, ProxyResult};
pub use forward::{ProxyState, MAX_BODY_BYTES};

use crate::config::ProxyConfig;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the proxy router
pub fn build_router(config: &ProxyConfig) -> ProxyResult<Router> {
    let state = Arc::new(ProxyState::new(config)?);

    Ok(Router::new()
        .fallback(forward::forward)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the proxy server
pub async fn serve(config: &ProxyConfig) -> ProxyResult<()> {
    let router = build_router(config)?;

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        "Dev proxy listening on {} ({}/* -> {})",
        addr,
        config.prefix.trim_end_matches('/'),
        config.target
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Dev proxy shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
