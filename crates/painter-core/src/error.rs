//! Error types shared by every painter crate.

use std::fmt;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for painter operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced to the user by the painting reader.
///
/// None of these terminate a session: the shell reports them where they occur
/// and the user may retry the action that failed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An external call failed, timed out, or returned data that does not
    /// match the expected schema.
    #[error("external service error: {service}: {message}")]
    ExternalService {
        service: String,
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    /// A token count that cannot be accounted.
    #[error("invalid token usage: {0}")]
    InvalidUsage(i64),

    /// No API key is available for the named service.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// Invalid price or client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The named upload is not part of the session.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// The named upload has no extraction record yet.
    #[error("item has not been extracted yet: {0}")]
    NotExtracted(String),

    /// Report assembly failed.
    #[error("report error: {0}")]
    Report(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates an external service error.
    pub fn external(service: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::ExternalService {
            service: service.to_string(),
            message: message.to_string(),
            source: None,
        }
    }

    /// Creates an external service error with an underlying cause.
    pub fn external_with_source(
        service: impl fmt::Display,
        message: impl fmt::Display,
        source: impl Into<BoxedError>,
    ) -> Self {
        Self::ExternalService {
            service: service.to_string(),
            message: message.to_string(),
            source: Some(source.into()),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl fmt::Display) -> Self {
        Self::Config(message.to_string())
    }

    /// Creates a report error.
    pub fn report(message: impl fmt::Display) -> Self {
        Self::Report(message.to_string())
    }

    /// Returns true if this error came from an external service.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalService { .. })
    }

    /// Returns true if the action needs a credential that is not configured.
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Self::MissingCredential(_))
    }
}
