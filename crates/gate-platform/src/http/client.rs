//! HTTP client configuration and the adapter error type.

use std::time::Duration;

use gate_core::{DeliveryError, EndpointError};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            pool_max_idle_per_host: 8,
        }
    }
}

impl HttpClientConfig {
    /// Build the shared client
    pub fn build(&self) -> PlatformResult<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .user_agent(concat!("gatekeeper/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::info!(
            timeout_ms = self.timeout.as_millis() as u64,
            "Platform HTTP client created"
        );

        Ok(client)
    }
}

/// Error type for platform calls
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered but refused the call
    #[error("Platform rejected {method}: {description}")]
    Rejected {
        method: &'static str,
        status: u16,
        description: String,
    },

    #[error("Unexpected response from {method}: {detail}")]
    UnexpectedResponse { method: &'static str, detail: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlatformError {
    /// HTTP status attached to the failure, when there was a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The recipient cannot be reached (blocked the bot, unknown chat)
    pub fn is_unreachable(&self) -> bool {
        matches!(self.status(), Some(403 | 404 | 410))
    }
}

/// Result type for platform calls
pub type PlatformResult<T> = Result<T, PlatformError>;

impl From<PlatformError> for EndpointError {
    fn from(err: PlatformError) -> Self {
        EndpointError::new(err.to_string())
    }
}

impl From<PlatformError> for DeliveryError {
    fn from(err: PlatformError) -> Self {
        if err.is_unreachable() {
            DeliveryError::Unreachable(err.to_string())
        } else {
            DeliveryError::Transport(err.to_string())
        }
    }
}
