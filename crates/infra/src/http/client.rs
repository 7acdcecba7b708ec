use std::time::{Duration, Instant};

use reqwest::header::RETRY_AFTER;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, StatusCode};
use tracing::{debug, warn};
use zsdk_common::response::HttpResponse;
use zsdk_domain::constants::DEFAULT_USER_AGENT;
use zsdk_domain::{HttpSettings, LoggingConfig, SdkError};

use crate::errors::InfraError;
use crate::logging::RequestLogger;

/// HTTP client with rate-limit aware retries.
///
/// Only `429 Too Many Requests` and `503 Service Unavailable` are retried.
/// The server's `Retry-After` (in seconds) is honoured up to
/// `max_retry_wait`; without one the delay doubles from `base_backoff`.
/// Every other outcome, including transport failures, is returned as is.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
    max_retries: u32,
    base_backoff: Duration,
    max_retry_wait: Duration,
    logger: RequestLogger,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, SdkError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Underlying connection pool, shared with the identity client.
    pub fn inner(&self) -> &ReqwestClient {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn logger(&self) -> RequestLogger {
        self.logger
    }

    /// Execute the provided request builder and buffer the response.
    ///
    /// Non-success statuses are returned as responses, not errors; status
    /// mapping belongs to the caller.
    ///
    /// # Errors
    /// Returns `SdkError::Timeout` when the client timeout elapses,
    /// `SdkError::Network` on transport failures and `SdkError::Internal`
    /// when a retry is needed but the body cannot be cloned.
    pub async fn send(&self, builder: RequestBuilder) -> Result<HttpResponse, SdkError> {
        let attempts = self.max_retries.saturating_add(1);

        for attempt in 1..=attempts {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                SdkError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let request = cloned_builder.build().map_err(|err| SdkError::from(InfraError::from(err)))?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt, %method, %url, "sending HTTP request");
            self.logger.log_request(&request);

            let started = Instant::now();
            let response = match self.client.execute(request).await {
                Ok(response) => response,
                Err(err) => {
                    debug!(attempt, %method, %url, error = %err, "HTTP request failed");
                    return Err(self.map_transport_error(err));
                }
            };

            let server_delay = retry_after(&response);
            let response =
                HttpResponse::from_reqwest(response).await.map_err(|err| self.map_transport_error(err))?;
            let status = response.status();
            debug!(attempt, %method, %url, %status, "received HTTP response");
            self.logger.log_response(&method, &response, started.elapsed());

            if is_throttled(status) && attempt < attempts {
                let delay = self.retry_delay(attempt, server_delay);
                warn!(
                    attempt,
                    %url,
                    status = status.as_u16(),
                    delay_ms = delay.as_millis() as u64,
                    "request throttled, retrying"
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                continue;
            }

            return Ok(response);
        }

        Err(SdkError::Internal("http client exhausted retries without producing a result".into()))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> SdkError {
        if err.is_timeout() {
            return SdkError::Timeout(self.timeout);
        }
        InfraError::from(err).into()
    }

    /// Delay before retry number `retry_number` (1-based).
    fn retry_delay(&self, retry_number: u32, retry_after: Option<Duration>) -> Duration {
        let delay = retry_after.unwrap_or_else(|| self.backoff_delay(retry_number));
        delay.min(self.max_retry_wait)
    }

    fn backoff_delay(&self, retry_number: u32) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8);
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_retries: u32,
    base_backoff: Duration,
    max_retry_wait: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
    logging: LoggingConfig,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::from_settings(&HttpSettings::default())
    }
}

impl HttpClientBuilder {
    /// Seed the builder from configuration.
    pub fn from_settings(settings: &HttpSettings) -> Self {
        Self {
            timeout: settings.timeout,
            max_retries: settings.max_retries,
            base_backoff: settings.base_backoff,
            max_retry_wait: settings.max_retry_wait,
            user_agent: settings.user_agent.clone(),
            default_headers: None,
            logging: LoggingConfig::default(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure how many times a throttled request is retried.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// Upper bound for any single retry delay, server-provided or computed.
    pub fn max_retry_wait(mut self, wait: Duration) -> Self {
        self.max_retry_wait = wait;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    pub fn build(self) -> Result<HttpClient, SdkError> {
        let agent = self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy().user_agent(agent);

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| SdkError::from(InfraError::from(err)))?;

        Ok(HttpClient {
            client,
            timeout: self.timeout,
            max_retries: self.max_retries,
            base_backoff: self.base_backoff,
            max_retry_wait: self.max_retry_wait,
            logger: RequestLogger::new(self.logging),
        })
    }
}

fn is_throttled(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
}

/// `Retry-After` in delta-seconds form. HTTP-date values are ignored.
fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
