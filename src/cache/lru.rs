//! LRU+TTL Cache Module
//!
//! Bounded key/value store with least-recently-used eviction and lazy TTL
//! expiry, shared across connections behind a single mutex.
//!
//! Entries live in a slot arena holding an index-linked doubly linked recency
//! list (head = most recently used) plus a key-to-slot map, so promotion and
//! tail eviction are O(1) without pointer-cycle ownership.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::cache::{CacheStats, Clock, SystemClock};

/// Sentinel slot index marking the end of the recency list.
const NIL: usize = usize::MAX;

// == Entry ==
#[derive(Debug)]
struct Entry {
    key: String,
    value: String,
    expires_at: Instant,
    prev: usize,
    next: usize,
}

// == Inner State ==
/// Everything the lock protects: arena, recency links, lookup map, counters.
#[derive(Debug)]
struct Inner {
    slots: Vec<Option<Entry>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: usize,
    tail: usize,
    stats: CacheStats,
}

impl Inner {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: NIL,
            tail: NIL,
            stats: CacheStats::new(),
        }
    }

    /// Detaches a slot from the recency list without touching the arena.
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = match self.slots[slot].as_ref() {
            Some(entry) => (entry.prev, entry.next),
            None => return,
        };
        if prev == NIL {
            self.head = next;
        } else if let Some(entry) = self.slots[prev].as_mut() {
            entry.next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else if let Some(entry) = self.slots[next].as_mut() {
            entry.prev = prev;
        }
    }

    /// Attaches a detached slot at the head of the recency list.
    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(entry) = self.slots[slot].as_mut() {
            entry.prev = NIL;
            entry.next = old_head;
        }
        if old_head != NIL {
            if let Some(entry) = self.slots[old_head].as_mut() {
                entry.prev = slot;
            }
        }
        self.head = slot;
        if self.tail == NIL {
            self.tail = slot;
        }
    }

    /// Places a new entry into the arena, reusing a freed slot when possible.
    fn alloc(&mut self, entry: Entry) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entry);
                slot
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        }
    }

    /// Removes a slot from the list, map, and arena.
    fn remove(&mut self, slot: usize) -> Option<Entry> {
        self.unlink(slot);
        let entry = self.slots[slot].take()?;
        self.index.remove(&entry.key);
        self.free.push(slot);
        Some(entry)
    }
}

// == LRU+TTL Cache ==
/// Concurrent, capacity-bounded cache with per-entry TTL.
///
/// A capacity of zero means unbounded: no eviction ever happens and the
/// caller is expected not to need one. Both `add` and `get` count as use for
/// recency purposes.
pub struct LruTtlCache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl LruTtlCache {
    /// Creates a cache with the given capacity and TTL, on the system clock.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    /// Creates a cache with an explicit clock.
    pub fn with_clock(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner::new()),
            capacity,
            ttl,
            clock,
        }
    }

    /// Inserts or refreshes an entry.
    ///
    /// An existing key gets its value overwritten, its expiry reset to
    /// `now + ttl`, and is promoted to the head; no eviction happens in that
    /// case. A new key is inserted at the head, and if the cache then holds
    /// more than `capacity` entries the tail entry is evicted.
    pub fn add(&self, key: String, value: String) {
        let expires_at = self.clock.now() + self.ttl;
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Some(&slot) = inner.index.get(&key) {
            inner.unlink(slot);
            inner.push_front(slot);
            if let Some(entry) = inner.slots[slot].as_mut() {
                entry.value = value;
                entry.expires_at = expires_at;
            }
            return;
        }

        let slot = inner.alloc(Entry {
            key: key.clone(),
            value,
            expires_at,
            prev: NIL,
            next: NIL,
        });
        inner.index.insert(key, slot);
        inner.push_front(slot);

        if self.capacity != 0 && inner.index.len() > self.capacity {
            let tail = inner.tail;
            if tail != NIL && inner.remove(tail).is_some() {
                inner.stats.record_eviction();
            }
        }
    }

    /// Looks up a key, returning its value if present and unexpired.
    ///
    /// The lookup promotes the entry before the expiry check, so the access
    /// counts as use either way. An entry observed past its expiry is removed
    /// and reported as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let slot = match inner.index.get(key).copied() {
            Some(slot) => slot,
            None => {
                inner.stats.record_miss();
                return None;
            }
        };

        inner.unlink(slot);
        inner.push_front(slot);

        let live = inner.slots[slot]
            .as_ref()
            .filter(|entry| now <= entry.expires_at)
            .map(|entry| entry.value.clone());

        match live {
            Some(value) => {
                inner.stats.record_hit();
                Some(value)
            }
            None => {
                inner.remove(slot);
                inner.stats.record_miss();
                None
            }
        }
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().index.is_empty()
    }

    /// Returns a snapshot of the performance counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.index.len());
        stats
    }
}

impl std::fmt::Debug for LruTtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruTtlCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish()
    }
}
