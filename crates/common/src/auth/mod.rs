//! OAuth 2.0 client-credentials authentication
//!
//! Trades a client id and secret for a bearer token at the tenant's identity
//! provider and keeps that token for the session.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenManager   │  session state, implements TokenProvider
//! └────────┬────────┘
//!          │
//!          └──► Authenticator (IdentityClient)  POST {vanity}.zslogin.net/oauth2/v1/token
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use zsdk_common::auth::{IdentityClient, TokenManager, TokenProvider};
//! use zsdk_domain::Credentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::new("client-id", "client-secret", "acme");
//!     let manager = TokenManager::new(IdentityClient::new(credentials));
//!
//!     let token = manager.access_token().await?;
//!     println!("authorization: {}", token.authorization_header());
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency
//!
//! Refresh is not serialized. Callers that observe an expired or invalidated
//! token at the same time each run their own exchange; the last one to finish
//! wins. Duplicate fetches are harmless.

pub mod client;
mod error;
pub mod token_manager;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use client::IdentityClient;
pub use error::AuthError;
pub use token_manager::{AuthState, TokenManager};
pub use traits::{Authenticator, TokenProvider};
pub use types::{AuthToken, TokenResponse};
