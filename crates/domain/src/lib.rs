//! # zsdk Domain
//!
//! Value types shared by every zsdk crate.
//!
//! This crate contains:
//! - The SDK error type and `Result` alias
//! - Configuration structures (credentials, cache, logging, HTTP settings)
//! - Constants (environment variable names, defaults, cloud hosts)
//!
//! ## Architecture
//! - No dependencies on other zsdk crates
//! - Only external dependencies allowed
//! - Pure data, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
