//! OpenAI client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Configuration for an OpenAI-compatible chat completions endpoint.
///
/// The API key is not part of this struct; it lives in the session
/// credentials so that it can be supplied at a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct OpenAiConfig {
    /// Base URL of the API, including the version segment
    #[cfg_attr(
        feature = "config",
        arg(
            long = "openai-base-url",
            env = "OPENAI_BASE_URL",
            default_value = "https://api.openai.com/v1"
        )
    )]
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,

    /// Multimodal model used for extraction and recommendation
    #[cfg_attr(
        feature = "config",
        arg(long = "openai-model", env = "OPENAI_MODEL", default_value = "gpt-4o")
    )]
    #[serde(default = "default_model")]
    pub openai_model: String,

    /// Request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "openai-timeout", env = "OPENAI_TIMEOUT", default_value_t = 60)
    )]
    #[serde(default = "default_timeout_secs")]
    pub openai_timeout: u64,

    /// Upper bound on generated tokens per call
    #[cfg_attr(
        feature = "config",
        arg(long = "openai-max-tokens", env = "OPENAI_MAX_TOKENS", default_value_t = 1024)
    )]
    #[serde(default = "default_max_tokens")]
    pub openai_max_tokens: u32,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            openai_base_url: default_base_url(),
            openai_model: default_model(),
            openai_timeout: default_timeout_secs(),
            openai_max_tokens: default_max_tokens(),
        }
    }
}

impl OpenAiConfig {
    /// Creates a configuration pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            openai_base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.openai_model = model.into();
        self
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.openai_timeout)
    }

    /// Returns the chat completions endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse.
    pub fn completions_url(&self) -> Result<Url> {
        let base = self.openai_base_url.trim_end_matches('/');
        Url::parse(&format!("{base}/chat/completions")).map_err(|e| {
            Error::invalid_config(format!(
                "Invalid base URL '{}': {}",
                self.openai_base_url, e
            ))
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error on an unparsable URL, an empty model or a zero
    /// timeout.
    pub fn validate(&self) -> Result<()> {
        self.completions_url()?;

        if self.openai_model.trim().is_empty() {
            return Err(Error::invalid_config("Model must not be empty"));
        }

        if self.openai_timeout == 0 {
            return Err(Error::invalid_config("Timeout must be greater than 0"));
        }

        Ok(())
    }
}
