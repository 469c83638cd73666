//! Error types for painter-openai.

use thiserror::Error;

/// Result type alias for painter-openai operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the OpenAI clients.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response could not be parsed.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The response parsed but does not satisfy the schema.
    #[error("Schema validation failed: {0}")]
    Validation(String),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates an API error.
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a schema validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<Error> for painter_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Http(e) => {
                let message = if e.is_timeout() {
                    "request timed out".to_string()
                } else if e.is_connect() {
                    "connection failed".to_string()
                } else {
                    e.to_string()
                };
                painter_core::Error::external_with_source("openai", message, e)
            }
            Error::Api { status, message } => {
                painter_core::Error::external("openai", format!("HTTP {status}: {message}"))
            }
            Error::Serde(e) => {
                painter_core::Error::external_with_source("openai", "malformed response", e)
            }
            Error::Validation(message) => painter_core::Error::external(
                "openai",
                format!("schema validation failed: {message}"),
            ),
            Error::Config(message) => painter_core::Error::Config(message),
            Error::Io(e) => painter_core::Error::Io(e),
        }
    }
}
