//! Token providers for the API pipeline
//!
//! The pipeline depends only on [`TokenProvider`]. Production clients use
//! [`TokenManager`](zsdk_common::auth::TokenManager); [`StaticTokenProvider`]
//! serves a token obtained out of band.

use async_trait::async_trait;
use tracing::debug;
use zsdk_common::auth::{AuthError, AuthToken, TokenProvider};

/// Provider that always hands out the same bearer token
///
/// It cannot re-authenticate, so `invalidate` is a no-op and a rejected
/// token keeps failing with `SdkError::Auth`.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: AuthToken,
}

impl StaticTokenProvider {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { token: AuthToken::new("Bearer", access_token, None) }
    }

    pub fn from_token(token: AuthToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<AuthToken, AuthError> {
        Ok(self.token.clone())
    }

    async fn invalidate(&self) {
        debug!("static token cannot be refreshed; keeping it");
    }
}
