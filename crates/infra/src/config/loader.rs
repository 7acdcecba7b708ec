//! Configuration loader
//!
//! Loads SDK configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required credentials are missing, falls back to a file
//! 3. Probes a few standard paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ZSCALER_CLIENT_ID`: OAuth client id (required)
//! - `ZSCALER_CLIENT_SECRET`: OAuth client secret (required)
//! - `ZSCALER_VANITY_DOMAIN`: Identity provider tenant (required)
//! - `ZSCALER_CLOUD`: Cloud name, production when unset
//! - `ZSCALER_SDK_CACHE_DISABLED`: Disable the response cache (true/false)
//! - `ZSCALER_SDK_CACHE_TTL`: Cache TTL in seconds
//! - `ZSCALER_SDK_CACHE_CLEANUP_INTERVAL`: Sweep interval in seconds
//! - `ZSCALER_SDK_CACHE_MAX_SIZE_MB`: Cache size bound, 0 for unbounded
//! - `ZSCALER_SDK_LOG`: Enable request logging (true/false)
//! - `ZSCALER_SDK_VERBOSE`: Log headers and bodies (true/false)
//! - `ZSCALER_SDK_USER_AGENT`: User agent override
//! - `ZSCALER_SDK_TIMEOUT`: Request timeout in seconds
//!
//! A file may omit `client_secret`; it is then taken from
//! `ZSCALER_CLIENT_SECRET`.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./zscaler.json` or `./zscaler.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use zsdk_domain::constants::{
    ENV_CACHE_CLEANUP_INTERVAL, ENV_CACHE_DISABLED, ENV_CACHE_MAX_SIZE_MB, ENV_CACHE_TTL,
    ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_CLOUD, ENV_TIMEOUT, ENV_USER_AGENT, ENV_VANITY_DOMAIN,
};
use zsdk_domain::{
    parse_flag, CacheSettings, Credentials, HttpSettings, LoggingConfig, Result, SdkConfig,
    SdkError,
};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: &[&str] = &["zscaler.json", "zscaler.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SdkError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<SdkConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The three credential variables are required; everything else falls back
/// to defaults.
///
/// # Errors
/// Returns `SdkError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<SdkConfig> {
    let mut credentials = Credentials::new(
        env_var(ENV_CLIENT_ID)?,
        env_var(ENV_CLIENT_SECRET)?,
        env_var(ENV_VANITY_DOMAIN)?,
    );
    if let Some(cloud) = env_opt(ENV_CLOUD) {
        credentials = credentials.with_cloud(cloud);
    }

    let mut cache = CacheSettings { enabled: !env_bool(ENV_CACHE_DISABLED, false), ..CacheSettings::default() };
    if let Some(ttl) = env_parse::<u64>(ENV_CACHE_TTL)? {
        cache.ttl = Duration::from_secs(ttl);
    }
    if let Some(interval) = env_parse::<u64>(ENV_CACHE_CLEANUP_INTERVAL)? {
        cache.cleanup_interval = Duration::from_secs(interval);
    }
    if let Some(max_size_mb) = env_parse::<u64>(ENV_CACHE_MAX_SIZE_MB)? {
        cache.max_size_mb = max_size_mb;
    }

    let mut http = HttpSettings { user_agent: env_opt(ENV_USER_AGENT), ..HttpSettings::default() };
    if let Some(timeout) = env_parse::<u64>(ENV_TIMEOUT)? {
        http.timeout = Duration::from_secs(timeout);
    }

    Ok(SdkConfig { credentials, cache, logging: LoggingConfig::from_env(), http })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SdkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<SdkConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SdkError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SdkError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SdkError::Config(format!("Failed to read config file: {}", e)))?;

    let mut config = parse_config(&contents, &config_path)?;
    if config.credentials.client_secret.is_empty() {
        if let Some(secret) = env_opt(ENV_CLIENT_SECRET) {
            config.credentials.client_secret = secret;
        }
    }
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `SdkError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<SdkConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| SdkError::from(InfraError::from(e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SdkError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(SdkError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe standard paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `SdkError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    env_opt(key)
        .ok_or_else(|| SdkError::Config(format!("Missing required environment variable: {}", key)))
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse an optional numeric environment variable
///
/// # Errors
/// Returns `SdkError::Config` when the variable is set but does not parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| SdkError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).ok().map(|s| parse_flag(&s)).unwrap_or(default)
}
