//! Cache statistics
//!
//! Counters are plain atomics so recording never takes a lock on the hot path.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently held (approximate until pending maintenance runs)
    pub entries: u64,

    /// Sum of entry weights in bytes
    pub weighted_size: u64,

    /// Lookups that returned an entry
    pub hits: u64,

    /// Lookups for unknown or expired keys
    pub misses: u64,

    /// Responses stored by `set`
    pub inserts: u64,

    /// Entries removed by `delete`, prefix clears, or `clear`
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total lookups)
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Hits plus misses
    pub fn total_lookups(&self) -> u64 {
        self.hits + self.misses
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    invalidations: AtomicU64,
}

impl StatsCollector {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidations(&self, count: u64) {
        self.invalidations.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entries: u64, weighted_size: u64) -> CacheStats {
        CacheStats {
            entries,
            weighted_size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}
