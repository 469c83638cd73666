//! Error types for painter-tinify.

use thiserror::Error;

/// Result type alias for painter-tinify operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the compression client.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response does not say where the compressed image is.
    #[error("Missing output location in response")]
    MissingOutput,

    /// The response could not be parsed.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates an API error.
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
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
                } else {
                    e.to_string()
                };
                painter_core::Error::external_with_source("tinify", message, e)
            }
            Error::Api { status, message } => {
                painter_core::Error::external("tinify", format!("HTTP {status}: {message}"))
            }
            Error::MissingOutput => painter_core::Error::external("tinify", "missing output location"),
            Error::Serde(e) => {
                painter_core::Error::external_with_source("tinify", "malformed response", e)
            }
            Error::Config(message) => painter_core::Error::Config(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_external_service() {
        let err: painter_core::Error = Error::api_error(401, "Unauthorized").into();
        assert!(err.is_external());
        assert_eq!(
            err.to_string(),
            "external service error: tinify: HTTP 401: Unauthorized"
        );

        let err: painter_core::Error = Error::invalid_config("bad url").into();
        assert!(!err.is_external());
    }
}
