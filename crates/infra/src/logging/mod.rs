//! Request/response logging
//!
//! [`RequestLogger`] writes SDK traffic to `tracing` with secrets masked
//! (see [`redact`]). [`init_tracing`] is an optional helper for binaries and
//! tests that do not install their own subscriber.
//!
//! The log level can be overridden via the `RUST_LOG` environment variable:
//! - `RUST_LOG=zsdk=debug` shows request and response detail
//! - `RUST_LOG=warn` keeps only throttling and auth warnings

mod logger;
pub mod redact;

pub use logger::RequestLogger;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use zsdk_domain::LoggingConfig;

/// Install a global `fmt` subscriber for the SDK.
///
/// Without `RUST_LOG`, SDK targets log at `debug` when `verbose` is set,
/// `info` when enabled and `warn` otherwise. Returns `false` when a global
/// subscriber is already installed, which leaves it untouched.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).compact())
        .try_init()
        .is_ok()
}

fn default_directives(config: &LoggingConfig) -> String {
    let level = match (config.enabled, config.verbose) {
        (false, _) => "warn",
        (true, false) => "info",
        (true, true) => "debug",
    };
    format!("zsdk={level},zsdk_common={level},zsdk_infra={level}")
}
