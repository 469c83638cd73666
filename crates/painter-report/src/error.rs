//! Error types for painter-report.

use thiserror::Error;

/// Result type alias for report operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while assembling a report.
#[derive(Debug, Error)]
pub enum Error {
    /// An item was placed before the title.
    #[error("report has not been started")]
    NotStarted,

    /// The title was drawn twice.
    #[error("report has already been started")]
    AlreadyStarted,

    /// The image could not be decoded or re-encoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The PDF could not be written.
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// The serialized document could not be written out.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The layout leaves no room for content.
    #[error("invalid layout: {0}")]
    Layout(String),
}

impl From<Error> for painter_core::Error {
    fn from(err: Error) -> Self {
        painter_core::Error::report(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_report_error() {
        let err: painter_core::Error = Error::NotStarted.into();
        assert_eq!(err.to_string(), "report error: report has not been started");
    }

    #[test]
    fn test_write_failure_maps_to_report_error() {
        let io = std::io::Error::new(std::io::ErrorKind::WriteZero, "sink full");
        let err: painter_core::Error = Error::from(io).into();
        assert_eq!(err.to_string(), "report error: io error: sink full");
    }
}
