//! Provisio Development Proxy
//!
//! Run with: cargo run --bin provisio-dev-proxy
//!
//! # Configuration
//!
//! Read from the standard config locations (see `provisio config`), then
//! environment variables:
//! - `PROVISIO_PROXY_HOST`: Host to bind to (default: 127.0.0.1)
//! - `PROVISIO_PROXY_PORT`: Port to listen on (default: 5173)
//! - `PROVISIO_PROXY_TARGET`: Backend origin (default: http://host.docker.internal:8000)
//! - `RUST_LOG`: Log filter (default: provisio=info,tower_http=info)

use provisio::{devproxy, logging, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = Config::load_default();
    logging::init(&loaded.config.logging)?;
    loaded.log();
    let config = loaded.config;

    tracing::info!("Starting Provisio dev proxy v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Forwarding {} to {}", config.proxy.prefix, config.proxy.target);

    devproxy::serve(&config.proxy).await?;

    tracing::info!("Provisio dev proxy stopped");
    Ok(())
}
