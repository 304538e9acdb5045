//! Redis Proxy - A read-through caching layer for Redis
//!
//! Serves key lookups from a bounded TTL+LRU cache, falling through to the
//! backing Redis instance on a miss.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redis_proxy::backend::RedisBackend;
use redis_proxy::cache::LruTtlCache;
use redis_proxy::http::{create_router, AppState};
use redis_proxy::protocol::TcpServer;
use redis_proxy::proxy::Proxy;
use redis_proxy::Config;

/// Main entry point for the proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache, the Redis backend, and the proxy over them
/// 4. Start the wire-protocol TCP server
/// 5. Start the HTTP server
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redis_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Redis read-through proxy");

    let config = Config::from_env();
    info!(
        "Configuration loaded: redis_url={}, cache_capacity={}, cache_ttl={}s, http_port={}, tcp_port={}",
        config.redis_url, config.cache_capacity, config.cache_ttl_secs, config.http_port, config.tcp_port
    );

    let cache = Arc::new(LruTtlCache::new(
        config.cache_capacity,
        Duration::from_secs(config.cache_ttl_secs),
    ));
    let backend =
        Arc::new(RedisBackend::new(&config.redis_url).context("invalid redis url")?);
    let proxy = Arc::new(Proxy::new(cache, backend));

    // Wire-protocol server on its own task
    let tcp_addr = SocketAddr::from(([0, 0, 0, 0], config.tcp_port));
    let tcp_listener = tokio::net::TcpListener::bind(tcp_addr)
        .await
        .context("failed to bind wire-protocol listener")?;
    info!("Wire-protocol server listening on {}", tcp_addr);
    let tcp_handle = tokio::spawn(TcpServer::new(proxy.clone()).run(tcp_listener));

    // HTTP front end
    let app = create_router(AppState::new(proxy));
    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let http_listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .context("failed to bind http listener")?;
    info!("HTTP server listening on http://{}", http_addr);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal(tcp_handle))
        .await
        .context("http server failed")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown, stops the wire-protocol accept loop; connections already open
/// drain naturally on client disconnect or error.
async fn shutdown_signal(tcp_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Stop accepting wire-protocol connections
    tcp_handle.abort();
    warn!("Wire-protocol accept loop stopped");
}
