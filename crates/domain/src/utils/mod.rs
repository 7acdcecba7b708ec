//! Shared helpers for domain value types

pub mod serde;

pub use self::serde::{duration_millis, duration_secs};
