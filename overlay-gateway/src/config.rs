//! Document service configuration.

use std::time::Duration;

use url::Url;

use crate::ConfigError;

/// Service URL used when none is configured.
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000/";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Environment variable holding the service URL.
pub const SERVICE_URL_ENV: &str = "OVERLAY_SERVICE_URL";

/// Environment variable holding the request timeout in milliseconds.
pub const TIMEOUT_ENV: &str = "OVERLAY_TIMEOUT_MS";

/// Where the document service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL; routes are resolved below it.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Create a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { base_url, timeout })
    }

    /// Read `OVERLAY_SERVICE_URL` and `OVERLAY_TIMEOUT_MS`, with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but unusable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(SERVICE_URL_ENV).unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());
        let timeout_ms = match lookup(TIMEOUT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT_MS,
        };
        Self::new(&url, Duration::from_millis(timeout_ms))
    }
}
