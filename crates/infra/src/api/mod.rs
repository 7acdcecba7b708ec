//! Authenticated API client for the Zscaler API family
//!
//! Every call flows through one pipeline:
//!
//! ```text
//! build URL ──► GET: cache lookup ──hit──► return copy
//!     │                 │ miss
//!     │                 ▼
//!     └─ other: invalidate key + collection ──► bearer token ──► HttpClient
//!                                                   ▲              │
//!                                                   └── 401: invalidate, retry once
//! ```
//!
//! Every network call honours the client's cancellation token and
//! per-request timeout.

pub mod auth;
pub mod client;

pub use auth::StaticTokenProvider;
pub use client::{ApiClient, ApiClientBuilder};
