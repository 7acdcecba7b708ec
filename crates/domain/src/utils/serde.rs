//! Serialization utilities for configuration durations
//!
//! Configuration files express timeouts and TTLs as plain integers. These
//! modules convert them to and from `Duration`.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serde serialization result type
type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

/// Serialize/deserialize a `Duration` as whole seconds (u64).
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use serde::{Deserialize, Serialize};
/// use zsdk_domain::utils::duration_secs;
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "duration_secs")]
///     ttl: Duration,
/// }
/// ```
pub mod duration_secs {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Serialize/deserialize a `Duration` as milliseconds (u64).
pub mod duration_millis {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Durations {
        #[serde(with = "duration_secs")]
        ttl: Duration,
        #[serde(with = "duration_millis")]
        backoff: Duration,
    }

    /// Tests that both helpers write plain integers
    #[test]
    fn test_serialize_as_integers() {
        let data =
            Durations { ttl: Duration::from_secs(600), backoff: Duration::from_millis(250) };
        let json = serde_json::to_string(&data).expect("Should serialize valid struct");
        assert_eq!(json, r#"{"ttl":600,"backoff":250}"#);
    }

    #[test]
    fn test_deserialize_from_integers() {
        let data: Durations =
            serde_json::from_str(r#"{"ttl":30,"backoff":1500}"#).expect("valid durations");
        assert_eq!(data.ttl, Duration::from_secs(30));
        assert_eq!(data.backoff, Duration::from_millis(1500));
    }

    #[test]
    fn test_negative_value_rejected() {
        let result: Result<Durations, _> = serde_json::from_str(r#"{"ttl":-1,"backoff":0}"#);
        assert!(result.is_err());
    }
}
