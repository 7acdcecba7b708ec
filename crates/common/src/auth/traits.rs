//! Traits for authentication seams
//!
//! These traits enable dependency injection and testing by abstracting the
//! identity provider and the session that holds its tokens.

use async_trait::async_trait;

use super::error::AuthError;
use super::types::AuthToken;

/// Performs one client-credentials exchange
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange credentials for a fresh token. No retries.
    ///
    /// # Errors
    /// Returns [`AuthError`] for missing credentials, transport failures,
    /// non-success statuses and malformed token bodies.
    async fn authenticate(&self) -> Result<AuthToken, AuthError>;

    /// Client id used in the exchange, for diagnostics.
    fn client_id(&self) -> &str;
}

/// Supplies bearer tokens to the request pipeline
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A token believed to be valid, authenticating first if needed.
    ///
    /// # Errors
    /// Returns the [`AuthError`] from the underlying exchange.
    async fn access_token(&self) -> Result<AuthToken, AuthError>;

    /// Forget the held token so the next call re-authenticates.
    async fn invalidate(&self);
}
