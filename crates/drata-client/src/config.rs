//! Platform connection settings
//!
//! Built once at startup and handed to the client, so no request code
//! reaches into the process environment on its own.

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

/// Variable holding the bearer credential
pub const API_KEY_ENV: &str = "DRATA_API_KEY";
/// Optional override of the API root
pub const BASE_URL_ENV: &str = "DRATA_BASE_URL";
/// Optional per-request timeout, in seconds
pub const TIMEOUT_ENV: &str = "DRATA_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.drata.com";

/// Connection settings for the compliance platform
#[derive(Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Bearer credential presented on every request
    pub api_key: String,
    /// Uniform timeout applied to every request; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl PlatformConfig {
    /// Create a config against the default API root
    pub fn new(api_key: &str) -> Self {
        PlatformConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            timeout: None,
        }
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read the config from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the config through an arbitrary variable lookup.
    ///
    /// The credential is checked first; nothing else is consulted when it
    /// is missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                var: API_KEY_ENV.to_string(),
            })?;

        let mut config = PlatformConfig::new(&api_key);

        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            config = config.with_base_url(base_url.trim());
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout {
                    var: TIMEOUT_ENV.to_string(),
                    value: raw.clone(),
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Join an API path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
