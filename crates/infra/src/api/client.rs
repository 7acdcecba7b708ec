//! API client with response caching and bearer authentication
//!
//! Provides the request pipeline shared by every service client: URL
//! construction, GET caching, invalidation on mutating calls, token
//! handling, cancellation and status mapping.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;
use zsdk_common::auth::{AuthToken, IdentityClient, TokenManager, TokenProvider};
use zsdk_common::cache::{build_cache, cache_key, collection_prefix, ResponseCache};
use zsdk_common::response::HttpResponse;
use zsdk_domain::constants::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
use zsdk_domain::{CacheSettings, HttpSettings, LoggingConfig, Result, SdkConfig, SdkError};

use crate::http::{HttpClient, HttpClientBuilder};

/// Authenticated, cached API client
///
/// Cheap to clone; clones share the connection pool, token provider, cache,
/// cancellation token and cache-bypass flag.
#[derive(Clone)]
pub struct ApiClient {
    http_client: HttpClient,
    auth: Arc<dyn TokenProvider>,
    cache: Arc<dyn ResponseCache>,
    base_url: String,
    timeout: Duration,
    max_pages: u32,
    cancellation: CancellationToken,
    skip_cache_once: Arc<AtomicBool>,
}

impl ApiClient {
    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Build a client for the tenant described by `config`.
    ///
    /// Authentication uses the client-credentials exchange against the
    /// tenant's identity provider, sharing this client's connection pool and
    /// request logger.
    ///
    /// # Errors
    ///
    /// Returns `SdkError::Cache` for invalid cache settings and
    /// `SdkError::Network` if the HTTP client cannot be built.
    pub fn from_config(config: SdkConfig) -> Result<Self> {
        let http_client = HttpClientBuilder::from_settings(&config.http)
            .logging(config.logging)
            .build()?;

        let mut identity =
            IdentityClient::with_http_client(config.credentials.clone(), http_client.inner().clone())
                .with_observer(Arc::new(http_client.logger()));
        if let Some(agent) = &config.http.user_agent {
            identity = identity.with_user_agent(agent.clone());
        }

        Self::builder()
            .base_url(config.api_base_url())
            .auth(Arc::new(TokenManager::new(identity)))
            .cache_settings(config.cache)
            .http_settings(config.http)
            .logging(config.logging)
            .http_client(http_client)
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    /// Token that aborts every in-flight and future call when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Make the next GET skip the cache lookup. Its response is still stored.
    pub fn refresh_cache(&self) {
        self.skip_cache_once.store(true, Ordering::SeqCst);
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Execute one call through the full pipeline.
    ///
    /// # Errors
    ///
    /// - `SdkError::Auth` on token failures and 401/403 responses
    /// - `SdkError::RateLimited` on 429 once retries are exhausted
    /// - `SdkError::Api` on other non-success statuses
    /// - `SdkError::Cancelled` / `SdkError::Timeout` when the call is cut short
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<HttpResponse> {
        let url = self.build_url(path, query)?;
        let key = cache_key(&url);

        if method == Method::GET {
            if self.skip_cache_once.swap(false, Ordering::SeqCst) {
                debug!(%key, "cache bypassed for this request");
            } else if let Some(hit) = self.cache.get(&key) {
                debug!(%key, "cache hit");
                return Ok(hit);
            }
        } else {
            self.cache.delete(&key);
            self.cache.clear_all_keys_with_prefix(&collection_prefix(&url));
        }

        let response = self.guarded(self.send_authenticated(&method, &url, body)).await?;

        if !response.is_success() {
            return Err(map_status_error(&response));
        }

        if method == Method::GET {
            self.cache.set(&key, &response);
        }

        Ok(response)
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self.execute(Method::GET, path, query, None).await?;
        decode(&response)
    }

    /// GET every page of a `page`/`pageSize` paginated collection.
    ///
    /// Stops after the first page shorter than `page_size` (the default when
    /// `None`) or after the client's page limit.
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        page_size: Option<u32>,
    ) -> Result<Vec<T>> {
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let page_size_text = page_size.to_string();
        let mut items = Vec::new();

        for page in 1..=self.max_pages {
            let page_text = page.to_string();
            let mut page_query: Vec<(&str, &str)> = query.to_vec();
            page_query.push(("page", page_text.as_str()));
            page_query.push(("pageSize", page_size_text.as_str()));

            let response = self.execute(Method::GET, path, &page_query, None).await?;
            let batch: Vec<T> = if response.body().is_empty() { Vec::new() } else { decode(&response)? };
            let count = batch.len();
            items.extend(batch);

            if count < page_size as usize {
                break;
            }
            if page == self.max_pages {
                warn!(path, max_pages = self.max_pages, "page limit reached, result may be truncated");
            }
        }

        info!(path, items = items.len(), "collected paginated results");
        Ok(items)
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::POST, path, &[], Some(&body)).await?;
        decode(&response)
    }

    /// PUT a JSON body and decode the JSON response.
    pub async fn put_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::PUT, path, &[], Some(&body)).await?;
        decode(&response)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, &[], None).await.map(|_| ())
    }

    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let separator = if path.starts_with('/') { "" } else { "/" };
        let mut url = Url::parse(&format!("{base}{separator}{path}"))
            .map_err(|e| SdkError::Config(format!("Invalid request URL for {path}: {e}")))?;

        if !query.is_empty() {
            let encoded = query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            let combined = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
                _ => encoded,
            };
            url.set_query(Some(&combined));
        }

        Ok(url)
    }

    /// Race `future` against cancellation and the request timeout.
    async fn guarded<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => {
                debug!("request cancelled");
                Err(SdkError::Cancelled)
            }
            outcome = tokio::time::timeout(self.timeout, future) => {
                outcome.unwrap_or(Err(SdkError::Timeout(self.timeout)))
            }
        }
    }

    async fn send_authenticated(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<HttpResponse> {
        let token = self.auth.access_token().await?;
        let response = self.send_with_token(method, url, body, &token).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!(%url, "token rejected, re-authenticating once");
        self.auth.invalidate().await;
        let token = self.auth.access_token().await?;
        self.send_with_token(method, url, body, &token).await
    }

    async fn send_with_token(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
        token: &AuthToken,
    ) -> Result<HttpResponse> {
        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, token.authorization_header())
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        self.http_client.send(request).await
    }
}

fn map_status_error(response: &HttpResponse) -> SdkError {
    let status = response.status();
    let url = response.url().to_string();
    let body = response.text().into_owned();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SdkError::Auth {
            message: format!("{url} returned status {status}: {body}"),
            status: Some(status.as_u16()),
        },
        StatusCode::TOO_MANY_REQUESTS => {
            SdkError::RateLimited(format!("{url} returned status {status}: {body}"))
        }
        _ => SdkError::Api { status: status.as_u16(), url, body },
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    let status = response.status();
    // These status codes have no body by RFC spec
    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT || response.body().is_empty() {
        return serde_json::from_value(Value::Null).map_err(|_| {
            SdkError::Serialization(format!(
                "No content response ({}), but response type cannot be deserialized from empty body",
                status.as_u16()
            ))
        });
    }
    response.json().map_err(SdkError::from)
}

/// Builder for [`ApiClient`]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    auth: Option<Arc<dyn TokenProvider>>,
    cache: Option<Arc<dyn ResponseCache>>,
    cache_settings: CacheSettings,
    http_settings: HttpSettings,
    logging: LoggingConfig,
    http_client: Option<HttpClient>,
    max_pages: u32,
    cancellation: Option<CancellationToken>,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            auth: None,
            cache: None,
            cache_settings: CacheSettings::default(),
            http_settings: HttpSettings::default(),
            logging: LoggingConfig::default(),
            http_client: None,
            max_pages: DEFAULT_MAX_PAGES,
            cancellation: None,
        }
    }
}

impl ApiClientBuilder {
    /// Set the API base URL (e.g. `https://api.zsapi.net`)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the token provider
    pub fn auth(mut self, auth: Arc<dyn TokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Use an existing cache instead of building one from settings
    pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache_settings(mut self, settings: CacheSettings) -> Self {
        self.cache_settings = settings;
        self
    }

    pub fn http_settings(mut self, settings: HttpSettings) -> Self {
        self.http_settings = settings;
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Use a prebuilt HTTP client; `http_settings` then only supplies the
    /// request timeout.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Share a cancellation token with other components
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if the base URL or token provider is missing, the cache
    /// settings are invalid, or the HTTP client cannot be created
    pub fn build(self) -> Result<ApiClient> {
        let base_url =
            self.base_url.ok_or_else(|| SdkError::Config("Base URL not set".to_string()))?;
        Url::parse(&base_url)
            .map_err(|e| SdkError::Config(format!("Invalid base URL {base_url}: {e}")))?;
        let auth = self.auth.ok_or_else(|| SdkError::Config("Auth provider not set".to_string()))?;

        let cache = match self.cache {
            Some(cache) => cache,
            None => build_cache(&self.cache_settings)?,
        };

        let http_client = match self.http_client {
            Some(client) => client,
            None => HttpClientBuilder::from_settings(&self.http_settings)
                .logging(self.logging)
                .build()?,
        };

        Ok(ApiClient {
            http_client,
            auth,
            cache,
            base_url,
            timeout: self.http_settings.timeout,
            max_pages: self.max_pages,
            cancellation: self.cancellation.unwrap_or_default(),
            skip_cache_once: Arc::new(AtomicBool::new(false)),
        })
    }
}
