//! Proxy Module
//!
//! Read-through orchestration: serve from the cache when possible, fall back
//! to the backing store on a miss, repopulate the cache on success.

use std::sync::Arc;

use tracing::debug;

use crate::backend::Backend;
use crate::cache::LruTtlCache;
use crate::error::{ProxyError, Result};

// == Proxy ==
/// Stateless read-through front over the cache and the backing store.
///
/// Holds no state of its own beyond the two shared references, so a single
/// instance is shared across every connection task.
pub struct Proxy {
    cache: Arc<LruTtlCache>,
    backend: Arc<dyn Backend>,
}

impl Proxy {
    /// Creates a proxy over the given cache and backing store.
    pub fn new(cache: Arc<LruTtlCache>, backend: Arc<dyn Backend>) -> Self {
        Self { cache, backend }
    }

    /// Fetches a key, read-through.
    ///
    /// A cache hit returns without touching the backing store. On a miss the
    /// backing store is queried: a found value is added to the cache and
    /// returned; an absent key becomes [`ProxyError::NotFound`]; a store
    /// failure is propagated untouched. The cache is only mutated on success,
    /// so negative results are never cached.
    pub async fn get(&self, key: &str) -> Result<String> {
        if let Some(value) = self.cache.get(key) {
            debug!(key = key, "cache hit");
            return Ok(value);
        }
        debug!(key = key, "cache miss");

        match self.backend.get(key).await? {
            Some(value) => {
                self.cache.add(key.to_string(), value.clone());
                Ok(value)
            }
            None => Err(ProxyError::NotFound(key.to_string())),
        }
    }

    /// Returns the shared cache handle.
    pub fn cache(&self) -> &Arc<LruTtlCache> {
        &self.cache
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::time::Duration;

    /// In-memory backend with a failure switch.
    #[derive(Default)]
    struct FakeBackend {
        values: Mutex<HashMap<String, String>>,
        failing: AtomicBool,
        calls: AtomicU64,
    }

    impl FakeBackend {
        fn insert(&self, key: &str, value: &str) {
            self.values.lock().insert(key.to_string(), value.to_string());
        }

        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ProxyError::Backend("connection refused".to_string()));
            }
            Ok(self.values.lock().get(key).cloned())
        }
    }

    fn proxy_with_backend() -> (Proxy, Arc<FakeBackend>) {
        let cache = Arc::new(LruTtlCache::new(10, Duration::from_secs(3600)));
        let backend = Arc::new(FakeBackend::default());
        (Proxy::new(cache, backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_miss_fetches_from_backend() {
        let (proxy, backend) = proxy_with_backend();
        backend.insert("k1", "v1");

        let value = proxy.get("k1").await.unwrap();

        assert_eq!(value, "v1");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_hit_skips_backend() {
        let (proxy, backend) = proxy_with_backend();
        backend.insert("k1", "v1");

        proxy.get("k1").await.unwrap();
        let value = proxy.get("k1").await.unwrap();

        assert_eq!(value, "v1");
        assert_eq!(backend.calls(), 1, "second get should be served from cache");
    }

    #[tokio::test]
    async fn test_absent_key_is_not_found() {
        let (proxy, _backend) = proxy_with_backend();

        let result = proxy.get("missing").await;

        assert!(matches!(result, Err(ProxyError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let (proxy, backend) = proxy_with_backend();

        let _ = proxy.get("late").await;
        assert!(proxy.cache().is_empty());

        // The key appearing later must be visible: no negative caching.
        backend.insert("late", "v1");
        assert_eq!(proxy.get("late").await.unwrap(), "v1");
    }

    #[tokio::test]
    async fn test_backend_error_propagates_without_caching() {
        let (proxy, backend) = proxy_with_backend();
        backend.set_failing(true);

        let result = proxy.get("k1").await;

        assert!(matches!(result, Err(ProxyError::Backend(_))));
        assert!(proxy.cache().is_empty());
    }

    #[tokio::test]
    async fn test_read_through_survives_backend_failure() {
        let (proxy, backend) = proxy_with_backend();
        backend.insert("k1", "v1");

        // First get populates the cache.
        proxy.get("k1").await.unwrap();

        // Backend going away must not break the cached read.
        backend.set_failing(true);
        assert_eq!(proxy.get("k1").await.unwrap(), "v1");
    }
}
