//! Shared building blocks for the zsdk transport.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `runtime`: buffered responses and the response cache
//! - `platform`: identity provider client and token lifecycle (implies
//!   `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;
#[cfg(feature = "runtime")]
pub mod response;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "platform")]
pub use auth::{AuthError, AuthState, AuthToken, IdentityClient, TokenManager, TokenProvider};
#[cfg(feature = "runtime")]
pub use cache::{
    build_cache, cache_key, CacheError, CacheStats, MokaResponseCache, NoopCache, ResponseCache,
};
#[cfg(feature = "runtime")]
pub use response::{HttpObserver, HttpResponse};
