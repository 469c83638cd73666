//! Data model shared between the session, the clients and the report.

mod record;
mod upload;

pub use record::{
    ExtractionRecord, RecommendationRecord, Recommendations, YEAR_RANGE, is_valid_year,
};
pub use upload::{MediaType, UploadedItem};
