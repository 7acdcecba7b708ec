//! SDK constants
//!
//! Centralized location for environment variable names, default values and
//! cloud host templates used throughout the SDK.

// Environment variables: credentials
pub const ENV_CLIENT_ID: &str = "ZSCALER_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "ZSCALER_CLIENT_SECRET";
pub const ENV_VANITY_DOMAIN: &str = "ZSCALER_VANITY_DOMAIN";
pub const ENV_CLOUD: &str = "ZSCALER_CLOUD";

// Environment variables: logging toggles (read once, at config construction)
pub const ENV_LOG: &str = "ZSCALER_SDK_LOG";
pub const ENV_VERBOSE: &str = "ZSCALER_SDK_VERBOSE";

// Environment variables: cache
pub const ENV_CACHE_DISABLED: &str = "ZSCALER_SDK_CACHE_DISABLED";
pub const ENV_CACHE_TTL: &str = "ZSCALER_SDK_CACHE_TTL";
pub const ENV_CACHE_CLEANUP_INTERVAL: &str = "ZSCALER_SDK_CACHE_CLEANUP_INTERVAL";
pub const ENV_CACHE_MAX_SIZE_MB: &str = "ZSCALER_SDK_CACHE_MAX_SIZE_MB";

// Environment variables: HTTP
pub const ENV_USER_AGENT: &str = "ZSCALER_SDK_USER_AGENT";
pub const ENV_TIMEOUT: &str = "ZSCALER_SDK_TIMEOUT";

// Cache defaults
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;
pub const DEFAULT_CACHE_CLEANUP_INTERVAL_SECS: u64 = 480;
pub const DEFAULT_CACHE_MAX_SIZE_MB: u64 = 0;

// HTTP defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 500;
pub const DEFAULT_MAX_RETRY_WAIT_SECS: u64 = 60;
pub const DEFAULT_USER_AGENT: &str = concat!("zsdk-rust/", env!("CARGO_PKG_VERSION"));

// Identity provider
pub const PRODUCTION_CLOUD: &str = "production";
pub const DEFAULT_AUDIENCE: &str = "https://api.zscaler.com";
pub const IDENTITY_HOST_SUFFIX: &str = "zslogin";
pub const TOKEN_PATH: &str = "/oauth2/v1/token";
pub const API_HOST_SUFFIX: &str = "zsapi.net";
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 30;
/// Tokens are refreshed this long before their reported expiry
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

// Pagination (ZIA style page/pageSize)
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_MAX_PAGES: u32 = 1000;
