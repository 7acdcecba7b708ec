//! Identity provider client
//!
//! Performs the OAuth 2.0 client-credentials exchange against
//! `https://{vanity}.zslogin[{cloud}].net/oauth2/v1/token`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, Method};
use tracing::{debug, instrument, warn};
use zsdk_domain::constants::DEFAULT_AUTH_TIMEOUT_SECS;
use zsdk_domain::Credentials;

use super::error::AuthError;
use crate::response::{HttpObserver, HttpResponse};
use super::traits::Authenticator;
use super::types::{AuthToken, TokenResponse};

/// OAuth 2.0 client-credentials client
#[derive(Debug, Clone)]
pub struct IdentityClient {
    credentials: Credentials,
    client: Client,
    user_agent: Option<String>,
    observer: Option<Arc<dyn HttpObserver>>,
}

impl IdentityClient {
    /// Create a client with its own HTTP connection pool.
    ///
    /// # Examples
    /// ```
    /// use zsdk_common::auth::IdentityClient;
    /// use zsdk_domain::Credentials;
    ///
    /// let client = IdentityClient::new(Credentials::new("id", "secret", "acme"));
    /// assert_eq!(client.token_url(), "https://acme.zslogin.net/oauth2/v1/token");
    /// ```
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_http_client(credentials, client)
    }

    /// Create a client that shares an existing connection pool.
    #[must_use]
    pub fn with_http_client(credentials: Credentials, client: Client) -> Self {
        Self { credentials, client, user_agent: None, observer: None }
    }

    /// Send `user_agent` with the token request.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Report the token request and response to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn HttpObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[must_use]
    pub fn token_url(&self) -> String {
        self.credentials.token_url()
    }

    /// Exchange the configured credentials for a bearer token
    ///
    /// # Errors
    /// Returns error if:
    /// - client id or secret is empty (no request is sent)
    /// - the request cannot be sent or its body read
    /// - the identity provider answers with a non-success status
    /// - the body is not a JSON object with `token_type` and `access_token`
    #[instrument(skip(self), fields(client_id = %self.credentials.client_id))]
    pub async fn authenticate(&self) -> Result<AuthToken, AuthError> {
        let creds = &self.credentials;
        if creds.client_id.trim().is_empty() {
            return Err(AuthError::MissingCredentials("client_id"));
        }
        if creds.client_secret.trim().is_empty() {
            return Err(AuthError::MissingCredentials("client_secret"));
        }

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("audience", creds.audience()),
        ];

        let url = self.token_url();
        debug!(%url, "requesting access token");

        let mut builder = self.client.post(&url).form(&params);
        if let Some(agent) = &self.user_agent {
            builder = builder.header(USER_AGENT, agent);
        }
        let request = builder.build().map_err(|e| self.request_error(&e))?;

        if let Some(observer) = &self.observer {
            observer.on_request(&request);
        }
        let started = Instant::now();
        let response = self.client.execute(request).await.map_err(|e| self.request_error(&e))?;
        let response =
            HttpResponse::from_reqwest(response).await.map_err(|e| self.request_error(&e))?;
        if let Some(observer) = &self.observer {
            observer.on_response(&Method::POST, &response, started.elapsed());
        }

        let status = response.status();
        let body = response.text().into_owned();

        if !status.is_success() {
            warn!(status = status.as_u16(), "identity provider rejected credentials");
            return Err(AuthError::Status {
                client_id: creds.client_id.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| self.malformed(e.to_string()))?;
        let token = parsed.into_token().map_err(|reason| self.malformed(reason))?;

        debug!(
            token_type = %token.token_type,
            expires_in = ?token.expires_in,
            "access token issued"
        );
        Ok(token)
    }

    fn request_error(&self, err: &reqwest::Error) -> AuthError {
        AuthError::Request { client_id: self.credentials.client_id.clone(), message: err.to_string() }
    }

    fn malformed(&self, reason: String) -> AuthError {
        AuthError::MalformedToken { client_id: self.credentials.client_id.clone(), reason }
    }
}

#[async_trait]
impl Authenticator for IdentityClient {
    async fn authenticate(&self) -> Result<AuthToken, AuthError> {
        self.authenticate().await
    }

    fn client_id(&self) -> &str {
        &self.credentials.client_id
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::client.
    use super::*;

    fn credentials(id: &str, secret: &str) -> Credentials {
        // Port 9 (discard) is never contacted by these tests.
        Credentials::new(id, secret, "acme").with_token_url("http://127.0.0.1:9/oauth2/v1/token")
    }

    /// Validates `IdentityClient::authenticate` behavior for the empty client
    /// id scenario.
    ///
    /// Assertions:
    /// - Ensures the error is `MissingCredentials("client_id")`.
    #[tokio::test]
    async fn test_empty_client_id_rejected() {
        let client = IdentityClient::new(credentials("", "secret"));
        let result = client.authenticate().await;
        assert_eq!(result.unwrap_err(), AuthError::MissingCredentials("client_id"));
    }

    /// Validates `IdentityClient::authenticate` behavior for the empty secret
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures a whitespace-only secret counts as missing.
    /// - Ensures the message names the missing field.
    #[tokio::test]
    async fn test_empty_secret_rejected() {
        let client = IdentityClient::new(credentials("abc", "   "));
        let err = client.authenticate().await.unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials("client_secret"));
        assert!(err.to_string().contains("client_secret"));
    }

    #[test]
    fn test_token_url_derivation() {
        let client = IdentityClient::new(Credentials::new("id", "s", "acme").with_cloud("beta"));
        assert_eq!(client.token_url(), "https://acme.zsloginbeta.net/oauth2/v1/token");
        assert_eq!(Authenticator::client_id(&client), "id");
    }

    #[derive(Debug, Default)]
    struct Recorder(std::sync::Mutex<Vec<String>>);

    impl HttpObserver for Recorder {
        fn on_request(&self, request: &reqwest::Request) {
            self.0.lock().unwrap().push(format!("-> {}", request.method()));
        }

        fn on_response(&self, method: &Method, response: &HttpResponse, _elapsed: Duration) {
            self.0.lock().unwrap().push(format!("<- {method} {}", response.status().as_u16()));
        }
    }

    /// Validates the observer sees the request even when no response arrives.
    ///
    /// Assertions:
    /// - Confirms exactly one request event and no response event.
    #[tokio::test]
    async fn test_observer_sees_request_without_response() {
        let recorder = Arc::new(Recorder::default());
        let client = IdentityClient::new(
            Credentials::new("abc", "secret", "acme")
                .with_token_url("http://127.0.0.1:1/oauth2/v1/token"),
        )
        .with_observer(recorder.clone());

        assert!(client.authenticate().await.is_err());
        assert_eq!(*recorder.0.lock().unwrap(), vec!["-> POST".to_string()]);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let client = IdentityClient::new(
            Credentials::new("abc", "secret", "acme")
                .with_token_url("http://127.0.0.1:1/oauth2/v1/token"),
        );
        let err = client.authenticate().await.unwrap_err();
        assert!(matches!(err, AuthError::Request { ref client_id, .. } if client_id == "abc"));
    }
}
