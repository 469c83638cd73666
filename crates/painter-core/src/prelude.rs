//! Convenient re-exports for painter crates.

pub use crate::types::{
    ExtractionRecord, MediaType, RecommendationRecord, Recommendations, UploadedItem,
};
pub use crate::{
    CallKind, CostAccumulator, Credentials, Error, ImageCompressor, MetadataExtractor,
    PaintingRecommender, PriceTable, Result, ResultStore, Session, UnitPrice,
};
