//! Provider traits for the external services.

use bytes::Bytes;

use crate::Result;
use crate::types::{ExtractionRecord, Recommendations, UploadedItem};

/// Extracts structured painting metadata from an uploaded image.
#[async_trait::async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Extracts the title, author, year and description of the painting.
    ///
    /// The returned record carries the token usage reported upstream. Failures
    /// are reported once and never retried.
    async fn extract(&self, item: &UploadedItem) -> Result<ExtractionRecord>;
}

/// Suggests paintings similar to an already extracted one.
#[async_trait::async_trait]
pub trait PaintingRecommender: Send + Sync {
    /// Returns one or more suggestions for `source`.
    async fn recommend(&self, source: &ExtractionRecord) -> Result<Recommendations>;
}

/// Compresses image bytes through an external service.
#[async_trait::async_trait]
pub trait ImageCompressor: Send + Sync {
    /// Returns the compressed image.
    async fn compress(&self, image: Bytes) -> Result<Bytes>;
}
