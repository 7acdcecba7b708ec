use thiserror::Error;
use zsdk_domain::SdkError;

/// Error type for client-credentials authentication
///
/// Every variant names the client id it was raised for. The secret never
/// appears in messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Client id or secret is empty; no request was sent
    #[error("missing credentials: {0} is required")]
    MissingCredentials(&'static str),

    /// Identity provider answered with a non-success status
    #[error("authentication failed for client {client_id}: status {status}: {body}")]
    Status { client_id: String, status: u16, body: String },

    /// Success status but the body is not a usable token
    #[error("malformed token response for client {client_id}: {reason}")]
    MalformedToken { client_id: String, reason: String },

    /// Transport failure before a response arrived
    #[error("token request failed for client {client_id}: {message}")]
    Request { client_id: String, message: String },
}

impl AuthError {
    /// HTTP status from the identity provider, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<AuthError> for SdkError {
    fn from(err: AuthError) -> Self {
        let status = err.status();
        Self::Auth { message: err.to_string(), status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_embeds_status_and_body() {
        let err = AuthError::Status {
            client_id: "abc".into(),
            status: 401,
            body: "{\"error\":\"invalid_client\"}".into(),
        };
        let text = err.to_string();
        assert!(text.contains("abc"));
        assert!(text.contains("401"));
        assert!(text.contains("invalid_client"));
    }

    #[test]
    fn test_conversion_keeps_status() {
        let err: SdkError =
            AuthError::Status { client_id: "abc".into(), status: 403, body: String::new() }.into();
        assert_eq!(err.status(), Some(403));

        let err: SdkError = AuthError::MissingCredentials("client_id").into();
        assert!(matches!(err, SdkError::Auth { status: None, .. }));
    }
}
