//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod clock;
mod lru;
mod stats;


// Re-export public types
pub use clock::{Clock, SystemClock};
pub use lru::LruTtlCache;
pub use stats::CacheStats;

#[cfg(test)]
pub use clock::ManualClock;
