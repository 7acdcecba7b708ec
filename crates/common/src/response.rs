//! Buffered HTTP responses
//!
//! A live `reqwest::Response` can only be read once. The transport drains it
//! into an [`HttpResponse`] immediately; the cache keeps one clone and the
//! caller gets another. `Bytes` is reference counted and immutable, so a clone
//! is cheap and reading one copy never affects another.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

/// Hook called around a raw HTTP exchange.
///
/// Lets clients that talk to the network directly (the identity exchange)
/// report traffic to the same sink as the API transport. Implementations
/// must not fail or alter the request.
pub trait HttpObserver: fmt::Debug + Send + Sync {
    fn on_request(&self, request: &Request);

    fn on_response(&self, method: &Method, response: &HttpResponse, elapsed: Duration);
}

/// Fully buffered response snapshot
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: Url,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>, url: Url) -> Self {
        Self { status, headers, body: body.into(), url }
    }

    /// Drain a live response into a snapshot.
    ///
    /// # Errors
    /// Returns the transport error if the body cannot be read to completion.
    pub async fn from_reqwest(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await?;
        Ok(Self { status, headers, body, url })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text, if present and valid ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    /// Returns the decode error when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Approximate memory footprint in bytes: body plus header names and values.
    pub fn weight(&self) -> usize {
        let headers: usize =
            self.headers.iter().map(|(name, value)| name.as_str().len() + value.len()).sum();
        self.body.len() + headers
    }
}
