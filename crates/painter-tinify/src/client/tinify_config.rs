//! Tinify client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Configuration for a Tinify-compatible compression endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct TinifyConfig {
    /// Base URL of the compression API
    #[cfg_attr(
        feature = "config",
        arg(
            long = "tinify-base-url",
            env = "TINIFY_BASE_URL",
            default_value = "https://api.tinify.com"
        )
    )]
    #[serde(default = "default_base_url")]
    pub tinify_base_url: String,

    /// Request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "tinify-timeout", env = "TINIFY_TIMEOUT", default_value_t = 60)
    )]
    #[serde(default = "default_timeout_secs")]
    pub tinify_timeout: u64,
}

fn default_base_url() -> String {
    "https://api.tinify.com".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for TinifyConfig {
    fn default() -> Self {
        Self {
            tinify_base_url: default_base_url(),
            tinify_timeout: default_timeout_secs(),
        }
    }
}

impl TinifyConfig {
    /// Creates a configuration pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            tinify_base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.tinify_timeout)
    }

    /// Returns the shrink endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse.
    pub fn shrink_url(&self) -> Result<Url> {
        let base = self.tinify_base_url.trim_end_matches('/');
        Url::parse(&format!("{base}/shrink")).map_err(|e| {
            Error::invalid_config(format!(
                "Invalid base URL '{}': {}",
                self.tinify_base_url, e
            ))
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error on an unparsable URL or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        self.shrink_url()?;

        if self.tinify_timeout == 0 {
            return Err(Error::invalid_config("Timeout must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TinifyConfig::default();
        assert_eq!(
            config.shrink_url().unwrap().as_str(),
            "https://api.tinify.com/shrink"
        );
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_validation() {
        assert!(TinifyConfig::new("::").validate().is_err());

        let config = TinifyConfig {
            tinify_timeout: 0,
            ..TinifyConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
