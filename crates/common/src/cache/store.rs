//! Moka-backed response cache

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, trace};
use zsdk_domain::CacheSettings;

use super::error::CacheError;
use super::stats::{CacheStats, StatsCollector};
use super::ResponseCache;
use crate::response::HttpResponse;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Sharded in-memory response cache
///
/// Entries expire `ttl` after insertion whether or not they are read. With a
/// non-zero `max_size_mb`, inserting past the bound evicts existing entries;
/// writes are never rejected. When created inside a Tokio runtime a sweeper
/// task runs pending maintenance every `cleanup_interval` until the cache is
/// dropped.
pub struct MokaResponseCache {
    inner: Cache<String, HttpResponse>,
    stats: Arc<StatsCollector>,
    settings: CacheSettings,
    _sweeper: Option<DropGuard>,
}

impl MokaResponseCache {
    /// Build a cache from `settings`. The `enabled` flag is not consulted.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidConfig`] for a zero TTL, a zero cleanup
    /// interval, or a size bound that does not fit in bytes.
    pub fn new(settings: &CacheSettings) -> Result<Self, CacheError> {
        validate(settings)?;

        // LRU admits every write; the default TinyLFU policy may refuse new
        // entries when the cache is full.
        let mut builder = Cache::builder()
            .time_to_live(settings.ttl)
            .eviction_policy(EvictionPolicy::lru())
            .weigher(|key: &String, value: &HttpResponse| -> u32 {
                u32::try_from(key.len() + value.weight()).unwrap_or(u32::MAX)
            });
        if settings.max_size_mb > 0 {
            builder = builder.max_capacity(settings.max_size_mb * BYTES_PER_MB);
        }
        let inner = builder.build();

        let sweeper = spawn_sweeper(inner.clone(), settings.cleanup_interval);

        info!(
            ttl_seconds = settings.ttl.as_secs(),
            cleanup_interval_seconds = settings.cleanup_interval.as_secs(),
            max_size_mb = settings.max_size_mb,
            sweeper = sweeper.is_some(),
            "response cache configured"
        );

        Ok(Self {
            inner,
            stats: Arc::new(StatsCollector::default()),
            settings: settings.clone(),
            _sweeper: sweeper,
        })
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Entry count; may lag behind recent writes until maintenance runs.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Total weight of held entries in bytes.
    pub fn weighted_size(&self) -> u64 {
        self.inner.weighted_size()
    }

    /// Apply pending evictions and expirations now.
    pub fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.inner.entry_count(), self.inner.weighted_size())
    }
}

impl ResponseCache for MokaResponseCache {
    fn get(&self, key: &str) -> Option<HttpResponse> {
        match self.inner.get(key) {
            Some(response) => {
                self.stats.record_hit();
                trace!(key, "cache hit");
                Some(response)
            }
            None => {
                self.stats.record_miss();
                trace!(key, "cache miss");
                None
            }
        }
    }

    fn set(&self, key: &str, response: &HttpResponse) {
        self.inner.insert(key.to_owned(), response.clone());
        self.stats.record_insert();
        trace!(key, bytes = response.body().len(), "cache set");
    }

    fn delete(&self, key: &str) {
        if self.inner.remove(key).is_some() {
            self.stats.record_invalidations(1);
            debug!(key, "cache entry deleted");
        }
    }

    fn clear(&self) {
        let count = self.inner.entry_count();
        self.inner.invalidate_all();
        self.stats.record_invalidations(count);
        debug!(entries = count, "cache cleared");
    }

    fn clear_all_keys_with_prefix(&self, prefix: &str) {
        let matching: Vec<Arc<String>> =
            self.inner.iter().map(|(key, _)| key).filter(|key| key.starts_with(prefix)).collect();

        let mut removed = 0;
        for key in matching {
            if self.inner.remove(key.as_str()).is_some() {
                removed += 1;
            }
        }
        self.stats.record_invalidations(removed);
        debug!(prefix, removed, "cache prefix cleared");
    }
}

impl fmt::Debug for MokaResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MokaResponseCache")
            .field("settings", &self.settings)
            .field("entries", &self.inner.entry_count())
            .finish_non_exhaustive()
    }
}

fn validate(settings: &CacheSettings) -> Result<(), CacheError> {
    if settings.ttl.is_zero() {
        return Err(CacheError::InvalidConfig("ttl must be greater than zero".into()));
    }
    if settings.cleanup_interval.is_zero() {
        return Err(CacheError::InvalidConfig("cleanup interval must be greater than zero".into()));
    }
    if settings.max_size_mb.checked_mul(BYTES_PER_MB).is_none() {
        return Err(CacheError::InvalidConfig(format!(
            "max size of {} MB overflows",
            settings.max_size_mb
        )));
    }
    Ok(())
}

/// Spawn the periodic sweeper on the current runtime, if there is one.
fn spawn_sweeper(cache: Cache<String, HttpResponse>, interval: Duration) -> Option<DropGuard> {
    let handle = tokio::runtime::Handle::try_current().ok()?;
    let token = CancellationToken::new();
    let cancelled = token.clone();

    handle.spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;
        loop {
            tokio::select! {
                () = cancelled.cancelled() => break,
                _ = ticker.tick() => {
                    cache.run_pending_tasks();
                    trace!(entries = cache.entry_count(), "cache sweep");
                }
            }
        }
        debug!("cache sweeper stopped");
    });

    Some(token.drop_guard())
}
