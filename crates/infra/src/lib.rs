//! # zsdk Infrastructure
//!
//! I/O side of the SDK transport core.
//!
//! This crate contains:
//! - The HTTP client with rate-limit aware retries
//! - The authenticated, cached `ApiClient` request pipeline
//! - Request/response logging with secret redaction
//! - The configuration loader (environment first, file fallback)
//!
//! ## Architecture
//! - Builds on the cache and auth primitives in `zsdk-common`
//! - Maps every external error into `zsdk_domain::SdkError`

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod logging;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientBuilder, StaticTokenProvider};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use logging::{init_tracing, RequestLogger};
