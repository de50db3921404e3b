//! Shared HTTP client module.
//!
//! One `reqwest::Client` is built at start-up and cloned into every adapter.

mod client;

pub use client::{HttpClientConfig, PlatformError, PlatformResult};
