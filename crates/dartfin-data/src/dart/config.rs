//! Client configuration.

use crate::error::{DataError, Result};
use std::fmt;
use std::time::Duration;

/// DART OpenAPI base URL
pub const DART_BASE_URL: &str = "https://opendart.fss.or.kr/api";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "DART_API_KEY";

/// Default spacing between requests. DART throttles bursts well below its daily quota.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings injected into [`super::DartClient`].
#[derive(Clone)]
pub struct DartConfig {
    /// OpenAPI certification key (`crtfc_key`)
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Minimum duration between requests
    pub min_interval: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl DartConfig {
    /// Configuration with default endpoint, spacing and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DART_BASE_URL.to_string(),
            min_interval: DEFAULT_MIN_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the API key from `DART_API_KEY`.
    ///
    /// # Errors
    /// Returns [`DataError::MissingApiKey`] if the variable is unset or blank.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(DataError::MissingApiKey),
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the minimum spacing between requests.
    pub const fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Override the request timeout.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for DartConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DartConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("min_interval", &self.min_interval)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DartConfig::new("key");
        assert_eq!(config.base_url, DART_BASE_URL);
        assert_eq!(config.min_interval, Duration::from_millis(100));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = DartConfig::new("secret-key").with_base_url("http://localhost:8080");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("localhost:8080"));
    }
}
