//! Session token lifecycle
//!
//! Holds the current bearer token and re-authenticates when none is held,
//! when it is within the refresh margin of expiry, or after the pipeline
//! reports an authentication failure.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use zsdk_domain::constants::DEFAULT_REFRESH_MARGIN_SECS;

use super::client::IdentityClient;
use super::error::AuthError;
use super::traits::{Authenticator, TokenProvider};
use super::types::AuthToken;

/// Session authentication state
///
/// ```text
/// Unauthenticated -> Authenticating -> Authenticated
///        ^                 |                 |
///        +-- failure ------+                 |
///        +-- invalidate() -------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

#[derive(Debug)]
struct Session {
    state: AuthState,
    token: Option<AuthToken>,
}

/// Token manager for one client session
///
/// The lock is released while the exchange is in flight, so concurrent
/// callers needing a token may each authenticate.
pub struct TokenManager<A: Authenticator + 'static = IdentityClient> {
    authenticator: Arc<A>,
    session: Arc<RwLock<Session>>,
    refresh_margin_seconds: i64,
}

impl<A: Authenticator + 'static> TokenManager<A> {
    /// Create a manager with the default refresh margin.
    #[must_use]
    pub fn new(authenticator: A) -> Self {
        Self::with_refresh_margin(authenticator, DEFAULT_REFRESH_MARGIN_SECS)
    }

    /// Create a manager that refreshes `refresh_margin_seconds` before expiry.
    #[must_use]
    pub fn with_refresh_margin(authenticator: A, refresh_margin_seconds: i64) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
            session: Arc::new(RwLock::new(Session {
                state: AuthState::Unauthenticated,
                token: None,
            })),
            refresh_margin_seconds,
        }
    }

    pub async fn state(&self) -> AuthState {
        self.session.read().await.state
    }

    /// Held token if it is outside the refresh margin.
    pub async fn current_token(&self) -> Option<AuthToken> {
        let session = self.session.read().await;
        session.token.as_ref().filter(|t| !t.is_expired(self.refresh_margin_seconds)).cloned()
    }

    /// Get a valid token, authenticating when none is usable
    ///
    /// # Errors
    /// Returns the [`AuthError`] from the exchange; the session is left
    /// `Unauthenticated`.
    pub async fn access_token(&self) -> Result<AuthToken, AuthError> {
        if let Some(token) = self.current_token().await {
            return Ok(token);
        }
        self.authenticate().await
    }

    /// Run a fresh exchange and replace the held token
    ///
    /// # Errors
    /// Returns the [`AuthError`] from the exchange.
    pub async fn authenticate(&self) -> Result<AuthToken, AuthError> {
        {
            let mut session = self.session.write().await;
            session.state = AuthState::Authenticating;
        }
        debug!(client_id = self.authenticator.client_id(), "authenticating");

        match self.authenticator.authenticate().await {
            Ok(token) => {
                let mut session = self.session.write().await;
                session.token = Some(token.clone());
                session.state = AuthState::Authenticated;
                info!(
                    client_id = self.authenticator.client_id(),
                    expires_in = ?token.expires_in,
                    "authenticated"
                );
                Ok(token)
            }
            Err(err) => {
                let mut session = self.session.write().await;
                session.token = None;
                session.state = AuthState::Unauthenticated;
                warn!(client_id = self.authenticator.client_id(), error = %err, "authentication failed");
                Err(err)
            }
        }
    }

    /// Drop the held token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        let mut session = self.session.write().await;
        if session.token.take().is_some() {
            debug!(client_id = self.authenticator.client_id(), "token invalidated");
        }
        session.state = AuthState::Unauthenticated;
    }

    #[must_use]
    pub async fn seconds_until_expiry(&self) -> Option<i64> {
        let session = self.session.read().await;
        session.token.as_ref().and_then(AuthToken::seconds_until_expiry)
    }

    #[must_use]
    pub fn refresh_margin(&self) -> i64 {
        self.refresh_margin_seconds
    }
}

#[async_trait]
impl<A: Authenticator + 'static> TokenProvider for TokenManager<A> {
    async fn access_token(&self) -> Result<AuthToken, AuthError> {
        self.access_token().await
    }

    async fn invalidate(&self) {
        self.invalidate().await;
    }
}
