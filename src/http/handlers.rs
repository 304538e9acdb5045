//! HTTP Handlers
//!
//! Request handlers for the proxy's HTTP endpoints. `GET /get/:key` mirrors
//! the wire protocol's GET: found is a 200 with the raw value as body, a
//! missing key is a 404, and a backing-store failure is a 500 (mapping done
//! by `ProxyError`'s `IntoResponse`).

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::Result;
use crate::proxy::Proxy;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared read-through proxy
    pub proxy: Arc<Proxy>,
}

impl AppState {
    /// Creates a new AppState over the given proxy.
    pub fn new(proxy: Arc<Proxy>) -> Self {
        Self { proxy }
    }
}

/// Handler for GET /get/:key
///
/// Looks the key up through the proxy and returns the raw value.
pub async fn get_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<String> {
    state.proxy.get(&key).await
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of lookups served from the cache
    pub hits: u64,
    /// Number of lookups that fell through to the backing store
    pub misses: u64,
    /// Number of LRU evictions
    pub evictions: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.proxy.cache().stats();
    Json(StatsResponse {
        hits: stats.hits,
        misses: stats.misses,
        evictions: stats.evictions,
        total_entries: stats.total_entries,
        hit_rate: stats.hit_rate(),
    })
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::cache::LruTtlCache;
    use crate::error::ProxyError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::time::Duration;

    struct MapBackend {
        values: Mutex<HashMap<String, String>>,
    }

    impl MapBackend {
        fn with(pairs: &[(&str, &str)]) -> Self {
            let values = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Self {
                values: Mutex::new(values),
            }
        }
    }

    #[async_trait]
    impl Backend for MapBackend {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.lock().get(key).cloned())
        }
    }

    fn state_with(pairs: &[(&str, &str)]) -> AppState {
        let cache = Arc::new(LruTtlCache::new(10, Duration::from_secs(3600)));
        let proxy = Arc::new(Proxy::new(cache, Arc::new(MapBackend::with(pairs))));
        AppState::new(proxy)
    }

    #[tokio::test]
    async fn test_get_key_returns_value() {
        let state = state_with(&[("k1", "val")]);

        let value = get_key_handler(State(state), Path("k1".to_string()))
            .await
            .unwrap();

        assert_eq!(value, "val");
    }

    #[tokio::test]
    async fn test_get_missing_key_is_not_found() {
        let state = state_with(&[]);

        let result = get_key_handler(State(state), Path("nope".to_string())).await;

        assert!(matches!(result, Err(ProxyError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stats_handler_counts_lookups() {
        let state = state_with(&[("k1", "val")]);

        get_key_handler(State(state.clone()), Path("k1".to_string()))
            .await
            .unwrap();
        get_key_handler(State(state.clone()), Path("k1".to_string()))
            .await
            .unwrap();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 1);
        assert_eq!(response.misses, 1);
        assert_eq!(response.total_entries, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
