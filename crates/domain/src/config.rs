//! Configuration management
//!
//! Plain configuration values. Loading from files and environment lives in
//! `zsdk-infra`; the only environment access here is
//! [`LoggingConfig::from_env`], which reads the two logging toggles once.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    API_HOST_SUFFIX, DEFAULT_AUDIENCE, DEFAULT_BASE_BACKOFF_MS, DEFAULT_CACHE_CLEANUP_INTERVAL_SECS,
    DEFAULT_CACHE_MAX_SIZE_MB, DEFAULT_CACHE_TTL_SECS, DEFAULT_MAX_RETRIES,
    DEFAULT_MAX_RETRY_WAIT_SECS, DEFAULT_TIMEOUT_SECS, ENV_LOG, ENV_VERBOSE, IDENTITY_HOST_SUFFIX,
    PRODUCTION_CLOUD, TOKEN_PATH,
};
use crate::utils::{duration_millis, duration_secs};

/// SDK configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    pub credentials: Credentials,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub http: HttpSettings,
}

impl SdkConfig {
    /// Configuration with default cache, logging and HTTP settings.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            cache: CacheSettings::default(),
            logging: LoggingConfig::default(),
            http: HttpSettings::default(),
        }
    }

    /// Base URL for API calls: the explicit override, or the cloud's gateway.
    pub fn api_base_url(&self) -> String {
        self.http.base_url.clone().unwrap_or_else(|| self.credentials.api_base_url())
    }
}

/// OAuth2 client-credentials inputs for the identity provider
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    #[serde(skip_serializing, default)]
    pub client_secret: String,
    /// Tenant subdomain on the identity provider (`{vanity}.zslogin.net`)
    pub vanity_domain: String,
    /// Cloud name; `None` or `"production"` selects the production cloud
    #[serde(default)]
    pub cloud: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    /// Explicit token endpoint, bypassing host derivation
    #[serde(default)]
    pub token_url: Option<String>,
}

impl Credentials {
    /// Credentials for the production cloud.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        vanity_domain: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            vanity_domain: vanity_domain.into(),
            cloud: None,
            audience: None,
            token_url: None,
        }
    }

    /// Select a non-production cloud (e.g. `"beta"`).
    #[must_use]
    pub fn with_cloud(mut self, cloud: impl Into<String>) -> Self {
        self.cloud = Some(cloud.into());
        self
    }

    /// Override the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Cloud name lowercased, or `None` for production.
    pub fn cloud_name(&self) -> Option<String> {
        self.cloud
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(PRODUCTION_CLOUD))
            .map(str::to_ascii_lowercase)
    }

    /// Token endpoint for the client-credentials exchange.
    ///
    /// `https://{vanity}.zslogin.net/oauth2/v1/token` for production,
    /// `https://{vanity}.zslogin{cloud}.net/oauth2/v1/token` otherwise.
    pub fn token_url(&self) -> String {
        if let Some(url) = &self.token_url {
            return url.clone();
        }
        let cloud = self.cloud_name().unwrap_or_default();
        format!("https://{}.{IDENTITY_HOST_SUFFIX}{cloud}.net{TOKEN_PATH}", self.vanity_domain)
    }

    /// API gateway for the selected cloud.
    pub fn api_base_url(&self) -> String {
        match self.cloud_name() {
            Some(cloud) => format!("https://api.{cloud}.{API_HOST_SUFFIX}"),
            None => format!("https://api.{API_HOST_SUFFIX}"),
        }
    }

    /// Audience requested in the token exchange.
    pub fn audience(&self) -> &str {
        self.audience.as_deref().unwrap_or(DEFAULT_AUDIENCE)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("vanity_domain", &self.vanity_domain)
            .field("cloud", &self.cloud)
            .field("audience", &self.audience)
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// Response cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Time-to-live measured from insertion
    #[serde(with = "duration_secs")]
    pub ttl: Duration,
    /// How often expired entries are swept
    #[serde(with = "duration_secs")]
    pub cleanup_interval: Duration,
    /// Upper bound on cached bytes in megabytes; 0 means unbounded
    pub max_size_mb: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cleanup_interval: Duration::from_secs(DEFAULT_CACHE_CLEANUP_INTERVAL_SECS),
            max_size_mb: DEFAULT_CACHE_MAX_SIZE_MB,
        }
    }
}

impl CacheSettings {
    /// Settings that select the no-op cache.
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }
}

/// Request/response logging toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Master switch; nothing is logged when false
    pub enabled: bool,
    /// Emit header/body detail at debug level
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn new(enabled: bool, verbose: bool) -> Self {
        Self { enabled, verbose }
    }

    /// Read `ZSCALER_SDK_LOG` and `ZSCALER_SDK_VERBOSE`.
    pub fn from_env() -> Self {
        Self { enabled: env_flag(ENV_LOG), verbose: env_flag(ENV_VERBOSE) }
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Overrides the cloud-derived API gateway
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Retries for 429/503 responses
    pub max_retries: u32,
    #[serde(with = "duration_millis")]
    pub base_backoff: Duration,
    /// Ceiling applied to server-provided `Retry-After` values
    #[serde(with = "duration_secs")]
    pub max_retry_wait: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            base_backoff: Duration::from_millis(DEFAULT_BASE_BACKOFF_MS),
            max_retry_wait: Duration::from_secs(DEFAULT_MAX_RETRY_WAIT_SECS),
        }
    }
}

/// Parse a boolean toggle.
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn env_flag(key: &str) -> bool {
    std::env::var(key).map(|v| parse_flag(&v)).unwrap_or(false)
}
