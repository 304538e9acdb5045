//! Backing Store Module
//!
//! Abstraction over the authoritative remote key-value store consulted on
//! cache misses, plus the Redis implementation used in production.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use crate::error::{ProxyError, Result};

// == Backend Trait ==
/// The backing-store capability the proxy consumes.
///
/// `Ok(None)` means the key does not exist; `Err` means the store itself
/// failed (transport, protocol, ...). Implementations must be safe for
/// concurrent use from many connection tasks.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetches a key from the authoritative store.
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

// == Redis Backend ==
/// Backing store backed by a remote Redis instance.
pub struct RedisBackend {
    client: redis::Client,
}

impl RedisBackend {
    /// Creates a backend for the given Redis URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| ProxyError::Backend(e.to_string()))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::Connection> {
        self.client
            .get_async_connection()
            .await
            .map_err(|e| ProxyError::Backend(e.to_string()))
    }
}

#[async_trait]
impl Backend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;

        // The driver maps redis Nil into Option::None for us.
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| ProxyError::Backend(e.to_string()))?;

        debug!(key = key, found = value.is_some(), "backend lookup");
        Ok(value)
    }
}
