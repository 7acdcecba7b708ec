//! Conversions from external infrastructure errors into SDK errors.

use reqwest::Error as HttpError;
use toml::de::Error as TomlError;
use zsdk_domain::SdkError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the SDK error.
#[derive(Debug)]
pub struct InfraError(pub SdkError);

impl From<InfraError> for SdkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SdkError> for InfraError {
    fn from(value: SdkError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSdkError {
    fn into_sdk(self) -> SdkError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SdkError */
/* -------------------------------------------------------------------------- */

impl IntoSdkError for HttpError {
    fn into_sdk(self) -> SdkError {
        if self.is_timeout() {
            return SdkError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return SdkError::Network(format!("HTTP connection failure: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
            let url = self.url().map(ToString::to_string).unwrap_or_default();

            return match code {
                401 | 403 => SdkError::Auth { message, status: Some(code) },
                429 => SdkError::RateLimited(message),
                _ => SdkError::Api { status: code, url, body: String::new() },
            };
        }

        if self.is_builder() {
            return SdkError::Internal(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return SdkError::Serialization(self.to_string());
        }

        SdkError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_sdk())
    }
}

/* -------------------------------------------------------------------------- */
/* toml::de::Error → SdkError */
/* -------------------------------------------------------------------------- */

impl IntoSdkError for TomlError {
    fn into_sdk(self) -> SdkError {
        SdkError::Config(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_sdk())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
