//! Request/response logger

use std::time::Duration;

use reqwest::{Method, Request};
use tracing::{debug, info};
use zsdk_common::response::{HttpObserver, HttpResponse};
use zsdk_domain::LoggingConfig;

use super::redact::{redact_body, redact_headers};

/// Emits one structured `tracing` event per request and per response.
///
/// Summaries (method, URL, status, latency) go out at `info`. With
/// `verbose` set, a second event at `debug` carries the redacted headers
/// and body. A disabled logger emits nothing. Logging never fails and
/// never touches the request or response.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger {
    config: LoggingConfig,
}

impl RequestLogger {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    pub fn disabled() -> Self {
        Self::new(LoggingConfig::new(false, false))
    }

    pub fn config(&self) -> LoggingConfig {
        self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn log_request(&self, request: &Request) {
        if !self.config.enabled {
            return;
        }

        let method = request.method().as_str();
        let url = request.url().as_str();
        info!(target: "zsdk::http", method, url, "-> request");

        if self.config.verbose {
            let headers = redact_headers(request.headers());
            let body = match request.body() {
                Some(body) => match body.as_bytes() {
                    Some(bytes) => redact_body(bytes),
                    None => "<streaming body>".to_string(),
                },
                None => String::new(),
            };
            debug!(target: "zsdk::http", method, url, ?headers, %body, "-> request detail");
        }
    }

    pub fn log_response(&self, method: &Method, response: &HttpResponse, elapsed: Duration) {
        if !self.config.enabled {
            return;
        }

        let url = response.url().as_str();
        let status = response.status().as_u16();
        let elapsed_ms = elapsed.as_millis() as u64;
        info!(target: "zsdk::http", method = method.as_str(), url, status, elapsed_ms, "<- response");

        if self.config.verbose {
            let headers = redact_headers(response.headers());
            let body = redact_body(response.body());
            debug!(
                target: "zsdk::http",
                method = method.as_str(),
                url,
                status,
                ?headers,
                %body,
                "<- response detail"
            );
        }
    }
}

impl HttpObserver for RequestLogger {
    fn on_request(&self, request: &Request) {
        self.log_request(request);
    }

    fn on_response(&self, method: &Method, response: &HttpResponse, elapsed: Duration) {
        self.log_response(method, response, elapsed);
    }
}
