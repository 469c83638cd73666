//! Extraction and recommendation services.

mod extraction;
mod recommendation;

pub use extraction::{PaintingDetails, PaintingExtractor};
pub use recommendation::{PaintingAdvisor, SimilarPaintings, SuggestedPainting};
