//! Convenient re-exports for common use.

pub use crate::client::{OpenAiClient, OpenAiConfig, StructuredResponse};
pub use crate::error::{Error, Result};
pub use crate::fixture::FixtureExtractor;
pub use crate::service::{PaintingAdvisor, PaintingExtractor};
