//! Redis Proxy - A read-through caching layer for Redis
//!
//! Serves key lookups from a bounded TTL+LRU cache, falling through to the
//! backing Redis instance on a miss, over both a minimal wire protocol
//! (PING, GET) and an HTTP endpoint.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod protocol;
pub mod proxy;

pub use config::Config;
pub use error::{ProxyError, Result};
pub use http::AppState;
pub use proxy::Proxy;
