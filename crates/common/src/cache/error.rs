use thiserror::Error;

/// Errors raised while constructing a response cache
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("invalid cache configuration: {0}")]
    InvalidConfig(String),
}

impl From<CacheError> for zsdk_domain::SdkError {
    fn from(err: CacheError) -> Self {
        Self::Cache(err.to_string())
    }
}
