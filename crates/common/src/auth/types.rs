//! Token types
//!
//! Defines the bearer token held by a session and the identity provider's
//! token response.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Bearer credential returned by the client-credentials exchange
///
/// Replaced wholesale on refresh, never mutated in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    /// Token type as reported by the identity provider (e.g. `bearer`)
    pub token_type: String,

    pub access_token: String,

    /// Lifetime in seconds, when the provider reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Absolute expiry calculated from `expires_in` when the token was issued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    /// Create a token, deriving `expires_at` from a positive `expires_in`.
    ///
    /// A lifetime too large to represent as a timestamp leaves `expires_at`
    /// unset.
    #[must_use]
    pub fn new(
        token_type: impl Into<String>,
        access_token: impl Into<String>,
        expires_in: Option<i64>,
    ) -> Self {
        let expires_at = expires_in.filter(|secs| *secs > 0).and_then(offset_from_now);
        Self { token_type: token_type.into(), access_token: access_token.into(), expires_in, expires_at }
    }

    /// Check if the token is expired or will expire within `threshold_seconds`
    ///
    /// A token without an expiry is never considered expired; it stays in use
    /// until an authentication failure is observed.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => match offset_from_now(threshold_seconds) {
                Some(deadline) => deadline >= expires_at,
                None => threshold_seconds > 0,
            },
            None => false,
        }
    }

    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// `now + secs`, or `None` when the result falls outside chrono's range.
fn offset_from_now(secs: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(secs).and_then(|delta| Utc::now().checked_add_signed(delta))
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("token_type", &self.token_type)
            .field("access_token", &"***")
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token endpoint response body
///
/// Fields are optional so a missing one surfaces as a malformed token rather
/// than a bare decode error.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    pub token_type: Option<String>,
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Validate and convert into an [`AuthToken`].
    ///
    /// # Errors
    /// Returns a reason string when `access_token` or `token_type` is missing
    /// or empty, or when `expires_in` is too large to turn into a timestamp.
    pub fn into_token(self) -> Result<AuthToken, String> {
        let access_token = self
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| "access_token is missing or empty".to_string())?;
        let token_type = self
            .token_type
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| "token_type is missing or empty".to_string())?;
        if let Some(secs) = self.expires_in.filter(|secs| *secs > 0) {
            if offset_from_now(secs).is_none() {
                return Err(format!("expires_in {secs} is out of range"));
            }
        }
        Ok(AuthToken::new(token_type, access_token, self.expires_in))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::types.
    use super::*;

    /// Validates `AuthToken::new` behavior for the token with lifetime
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures `token.expires_at.is_some()` evaluates to true.
    /// - Ensures `!token.is_expired(60)` evaluates to true.
    /// - Ensures `token.is_expired(7200)` evaluates to true.
    #[test]
    fn test_token_expiry_check() {
        let token = AuthToken::new("bearer", "abc", Some(3600));

        assert!(token.expires_at.is_some());
        assert!(!token.is_expired(60));
        assert!(token.is_expired(7200));
    }

    /// Validates `AuthToken::new` behavior for the token without lifetime
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures `!token.is_expired(300)` evaluates to true.
    /// - Ensures `token.seconds_until_expiry().is_none()` evaluates to true.
    #[test]
    fn test_token_without_expiry_never_expires() {
        let token = AuthToken::new("bearer", "abc", None);

        assert!(!token.is_expired(300));
        assert!(token.seconds_until_expiry().is_none());
    }

    #[test]
    fn test_seconds_until_expiry() {
        let token = AuthToken::new("bearer", "abc", Some(3600));
        let secs = token.seconds_until_expiry().unwrap();
        assert!(secs > 3590 && secs <= 3600);
    }

    #[test]
    fn test_authorization_header() {
        let token = AuthToken::new("bearer", "X", None);
        assert_eq!(token.authorization_header(), "Bearer X");
    }

    #[test]
    fn test_debug_hides_access_token() {
        let token = AuthToken::new("bearer", "very-secret-token", None);
        assert!(!format!("{token:?}").contains("very-secret-token"));
    }

    /// Validates the token response conversion scenario.
    ///
    /// Assertions:
    /// - Confirms `token.token_type` equals `"bearer"`.
    /// - Confirms `token.access_token` equals `"X"`.
    #[test]
    fn test_token_response_conversion() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"token_type":"bearer","access_token":"X"}"#).unwrap();

        let token = response.into_token().unwrap();
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.access_token, "X");
        assert!(token.expires_at.is_none());
    }

    /// Validates lifetimes beyond chrono's range never panic.
    ///
    /// Assertions:
    /// - Ensures `AuthToken::new` leaves `expires_at` unset for `i64::MAX`.
    /// - Ensures `is_expired` handles extreme thresholds in both directions.
    /// - Ensures `into_token` rejects the out-of-range lifetime.
    #[test]
    fn test_out_of_range_lifetime() {
        let token = AuthToken::new("bearer", "abc", Some(i64::MAX));
        assert!(token.expires_at.is_none());

        let token = AuthToken::new("bearer", "abc", Some(3600));
        assert!(token.is_expired(i64::MAX));
        assert!(!token.is_expired(i64::MIN));

        let response = TokenResponse {
            token_type: Some("bearer".into()),
            access_token: Some("X".into()),
            expires_in: Some(i64::MAX),
        };
        assert!(response.into_token().unwrap_err().contains("expires_in"));
    }

    #[test]
    fn test_token_response_missing_fields() {
        let missing_token = TokenResponse { token_type: Some("bearer".into()), ..Default::default() };
        assert!(missing_token.into_token().unwrap_err().contains("access_token"));

        let empty_type = TokenResponse {
            token_type: Some(String::new()),
            access_token: Some("X".into()),
            expires_in: None,
        };
        assert!(empty_type.into_token().unwrap_err().contains("token_type"));
    }
}
