//! # hal-search
//!
//! A small client for the [HAL](https://hal.science) open archive search API.
//!
//! ## Architecture
//!
//! - [`models`]: Search parameters, response formats and the derived query string
//! - [`client`]: [`HalClient`] and the [`HalError`] taxonomy
//! - [`config`]: Client configuration, config files and environment overrides
//! - [`utils`]: HTTP client construction

pub mod client;
pub mod config;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use client::{HalClient, HalError};
pub use config::ClientConfig;
pub use models::{Format, SearchParams, SortOrder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
