//! Bounded in-memory cache tier.
//!
//! Volatile, least-recently-used, fixed capacity. Backed by a moka cache
//! configured with the LRU eviction policy, which keeps its bookkeeping
//! internally synchronized so the tier can be shared by concurrent lookups.

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

/// Default number of records held in memory.
pub const DEFAULT_MEMORY_CAPACITY: u64 = 50;

/// Bounded LRU map from cache key to record.
///
/// Clones share the same underlying cache.
#[derive(Clone)]
pub struct MemoryCache<T: Clone + Send + Sync + 'static> {
    inner: Cache<String, T>,
    capacity: u64,
}

impl<T: Clone + Send + Sync + 'static> MemoryCache<T> {
    /// Create a tier holding at most `capacity` records.
    pub fn new(capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        MemoryCache { inner, capacity }
    }

    /// Get a record, marking it as most recently used.
    pub fn get(&self, key: &str) -> Option<T> {
        self.inner.get(key)
    }

    /// Insert or replace a record, evicting the least recently used one when full.
    pub fn put(&self, key: &str, value: T) {
        self.inner.insert(key.to_string(), value);
        // capacity bound must hold once put returns
        self.inner.run_pending_tasks();
    }

    /// Whether a record is present, without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks();
    }

    /// Number of records currently held.
    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    /// Check if the tier is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of records.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

impl<T: Clone + Send + Sync + 'static> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY)
    }
}
