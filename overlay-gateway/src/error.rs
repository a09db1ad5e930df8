//! Gateway configuration errors.
//!
//! Request failures use [`overlay_core::GatewayError`] so every gateway
//! reports them the same way.

use thiserror::Error;

/// Errors building a gateway.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The service URL could not be parsed or cannot carry a path.
    #[error("invalid document service URL: {0}")]
    InvalidUrl(String),

    /// The timeout is not a positive number of milliseconds.
    #[error("invalid request timeout: {0}")]
    InvalidTimeout(String),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
