//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `NIVASITY_API_URL` - Backend base URL (default: production API)
//! - `NIVASITY_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.nivasity.com/v1";

/// Default per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),

    /// The base URL was not a valid absolute URL.
    #[error("Invalid base URL '{0}': {1}")]
    InvalidBaseUrl(String, url::ParseError),
}

/// API client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (scheme + host + optional path prefix).
    base_url: Url,
    /// Per-request timeout.
    timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with the given base URL and default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL does not parse.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        let raw = base_url.as_ref();
        let parsed = Url::parse(raw)
            .map_err(|e| ConfigError::InvalidBaseUrl(raw.to_string(), e))?;
        Ok(Self {
            base_url: parsed,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url =
            std::env::var("NIVASITY_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;

        if let Ok(raw) = std::env::var("NIVASITY_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("NIVASITY_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The configured per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the full URL for an endpoint path (path must start with `/`).
    pub(crate) fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}{path}")
    }
}
