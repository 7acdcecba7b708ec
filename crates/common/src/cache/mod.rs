//! Response cache
//!
//! Maps a request fingerprint (see [`cache_key`]) to a buffered
//! [`HttpResponse`](crate::response::HttpResponse). Two implementations share
//! the [`ResponseCache`] contract:
//!
//! - [`MokaResponseCache`]: sharded, size-bounded, entries expire a fixed
//!   time after insertion regardless of access
//! - [`NoopCache`]: never stores anything
//!
//! [`build_cache`] picks one from [`CacheSettings`](zsdk_domain::CacheSettings)
//! at construction time.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use reqwest::header::HeaderMap;
//! use reqwest::StatusCode;
//! use url::Url;
//! use zsdk_common::cache::{build_cache, cache_key};
//! use zsdk_common::response::HttpResponse;
//! use zsdk_domain::CacheSettings;
//!
//! let cache = build_cache(&CacheSettings::default()).unwrap();
//! let url = Url::parse("https://api.zsapi.net/zia/api/v1/users?page=1").unwrap();
//! let key = cache_key(&url);
//!
//! let response = HttpResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from("[]"), url);
//! cache.set(&key, &response);
//! assert_eq!(cache.get(&key).unwrap().body(), "[]");
//! ```
//!
//! # Key discipline
//!
//! Keys ignore the HTTP method. Only responses to idempotent reads (GET)
//! may be stored; mutating calls invalidate instead.

mod error;
mod key;
mod noop;
mod stats;
mod store;

use std::sync::Arc;

pub use error::CacheError;
pub use key::{cache_key, cache_key_for_request, collection_prefix};
pub use noop::NoopCache;
pub use stats::CacheStats;
pub use store::MokaResponseCache;
use zsdk_domain::CacheSettings;

use crate::response::HttpResponse;

/// Contract shared by every response cache
///
/// Implementations are safe for concurrent use without external locking.
pub trait ResponseCache: Send + Sync {
    /// Independent copy of the entry, or `None` when unknown or expired.
    fn get(&self, key: &str) -> Option<HttpResponse>;

    /// Snapshot `response` under `key`, replacing any existing entry.
    fn set(&self, key: &str, response: &HttpResponse);

    /// Remove one entry; unknown keys are ignored.
    fn delete(&self, key: &str);

    /// Remove every entry.
    fn clear(&self);

    /// Remove every entry whose key starts with `prefix`.
    fn clear_all_keys_with_prefix(&self, prefix: &str);
}

/// Build the cache selected by `settings`.
///
/// # Errors
/// Returns [`CacheError::InvalidConfig`] when an enabled cache has a zero TTL,
/// a zero cleanup interval, or a size bound that overflows.
pub fn build_cache(settings: &CacheSettings) -> Result<Arc<dyn ResponseCache>, CacheError> {
    if !settings.enabled {
        tracing::debug!("response cache disabled");
        return Ok(Arc::new(NoopCache));
    }
    Ok(Arc::new(MokaResponseCache::new(settings)?))
}
