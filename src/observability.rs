//! Metrics hooks for lookups.
//!
//! Implement [`LookupMetrics`] to feed your monitoring system:
//!
//! ```ignore
//! use isbn_kit::observability::{CacheTier, LookupMetrics};
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl LookupMetrics for PrometheusMetrics {
//!     fn record_cache_hit(&self, tier: CacheTier, _key: &str, duration: Duration) {
//!         // counter!("isbn_cache_hits", "tier" => tier.as_str()).inc();
//!     }
//!     // ... override the other hooks as needed
//! }
//! ```
//!
//! Unimplemented hooks log through the `log` crate. The pipeline defaults to
//! [`NoOpMetrics`]; [`LookupStats`] keeps plain counters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Cache tier that answered a lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheTier {
    Memory,
    Durable,
}

impl CacheTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheTier::Memory => "memory",
            CacheTier::Durable => "durable",
        }
    }
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for lookup metrics collection.
pub trait LookupMetrics: Send + Sync {
    /// A cache tier held the record.
    fn record_cache_hit(&self, tier: CacheTier, key: &str, duration: Duration) {
        debug!("Cache HIT ({}): {} took {:?}", tier, key, duration);
    }

    /// Neither tier held the record.
    fn record_cache_miss(&self, key: &str, duration: Duration) {
        debug!("Cache MISS: {} took {:?}", key, duration);
    }

    /// A metadata source resolved the record.
    fn record_source_hit(&self, source: &str, key: &str, duration: Duration) {
        debug!("Source {} resolved {} in {:?}", source, key, duration);
    }

    /// The metadata source chain failed.
    fn record_source_error(&self, source: &str, key: &str, error: &str) {
        warn!("Source {} failed for {}: {}", source, key, error);
    }

    /// A cache tier could not be read or written; the lookup continued.
    fn record_cache_error(&self, tier: CacheTier, key: &str, error: &str) {
        warn!("Cache ERROR ({}) for {}: {}", tier, key, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl LookupMetrics for NoOpMetrics {
    fn record_cache_hit(&self, _tier: CacheTier, _key: &str, _duration: Duration) {}
    fn record_cache_miss(&self, _key: &str, _duration: Duration) {}
    fn record_source_hit(&self, _source: &str, _key: &str, _duration: Duration) {}
    fn record_source_error(&self, _source: &str, _key: &str, _error: &str) {}
    fn record_cache_error(&self, _tier: CacheTier, _key: &str, _error: &str) {}
}

/// Counter-based metrics.
#[derive(Default, Debug)]
pub struct LookupStats {
    memory_hits: AtomicU64,
    durable_hits: AtomicU64,
    misses: AtomicU64,
    source_hits: AtomicU64,
    source_errors: AtomicU64,
    cache_errors: AtomicU64,
}

/// Point-in-time copy of [`LookupStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub memory_hits: u64,
    pub durable_hits: u64,
    pub misses: u64,
    pub source_hits: u64,
    pub source_errors: u64,
    pub cache_errors: u64,
}

impl LookupStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            durable_hits: self.durable_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            source_hits: self.source_hits.load(Ordering::Relaxed),
            source_errors: self.source_errors.load(Ordering::Relaxed),
            cache_errors: self.cache_errors.load(Ordering::Relaxed),
        }
    }
}

impl LookupMetrics for LookupStats {
    fn record_cache_hit(&self, tier: CacheTier, _key: &str, _duration: Duration) {
        match tier {
            CacheTier::Memory => self.memory_hits.fetch_add(1, Ordering::Relaxed),
            CacheTier::Durable => self.durable_hits.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn record_cache_miss(&self, _key: &str, _duration: Duration) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_source_hit(&self, _source: &str, _key: &str, _duration: Duration) {
        self.source_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_source_error(&self, _source: &str, _key: &str, _error: &str) {
        self.source_errors.fetch_add(1, Ordering::Relaxed);
    }

    fn record_cache_error(&self, _tier: CacheTier, _key: &str, _error: &str) {
        self.cache_errors.fetch_add(1, Ordering::Relaxed);
    }
}

// Lets callers keep a handle to the counters they hand to the pipeline.
impl<M: LookupMetrics + ?Sized> LookupMetrics for std::sync::Arc<M> {
    fn record_cache_hit(&self, tier: CacheTier, key: &str, duration: Duration) {
        (**self).record_cache_hit(tier, key, duration)
    }

    fn record_cache_miss(&self, key: &str, duration: Duration) {
        (**self).record_cache_miss(key, duration)
    }

    fn record_source_hit(&self, source: &str, key: &str, duration: Duration) {
        (**self).record_source_hit(source, key, duration)
    }

    fn record_source_error(&self, source: &str, key: &str, error: &str) {
        (**self).record_source_error(source, key, error)
    }

    fn record_cache_error(&self, tier: CacheTier, key: &str, error: &str) {
        (**self).record_cache_error(tier, key, error)
    }
}
