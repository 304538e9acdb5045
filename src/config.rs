//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection URL of the backing Redis instance
    pub redis_url: String,
    /// Maximum number of cache entries (0 = unbounded)
    pub cache_capacity: usize,
    /// Cache entry TTL in seconds
    pub cache_ttl_secs: u64,
    /// HTTP server port
    pub http_port: u16,
    /// TCP wire-protocol server port
    pub tcp_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Backing store URL (default: redis://127.0.0.1:6379)
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 10)
    /// - `CACHE_TTL` - Entry TTL in seconds (default: 60)
    /// - `HTTP_LISTEN_PORT` - HTTP server port (default: 3000)
    /// - `TCP_LISTEN_PORT` - Wire-protocol port (default: 7379)
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            cache_capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            cache_ttl_secs: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            http_port: env::var("HTTP_LISTEN_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            tcp_port: env::var("TCP_LISTEN_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(7379),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            cache_capacity: 10,
            cache_ttl_secs: 60,
            http_port: 3000,
            tcp_port: 7379,
        }
    }
}
