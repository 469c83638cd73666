#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! OpenAI-compatible clients for the painting reader.
//!
//! A single chat-completions client ([`OpenAiClient`]) sends requests whose
//! `response_format` is a strict JSON schema generated from a Rust type. Two
//! services build on it:
//!
//! - [`PaintingExtractor`] sends an image and returns an
//!   [`ExtractionRecord`](painter_core::types::ExtractionRecord).
//! - [`PaintingAdvisor`] sends an extracted record as text and returns
//!   similar paintings.
//!
//! [`FixtureExtractor`] replays records from a JSON file for offline runs.

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "painter_openai";

/// Tracing target for HTTP client operations.
pub const TRACING_TARGET_CLIENT: &str = "painter_openai::client";

/// Tracing target for extraction and recommendation services.
pub const TRACING_TARGET_SERVICE: &str = "painter_openai::service";

mod client;
mod completion;
mod error;
mod fixture;
mod service;

#[doc(hidden)]
pub mod prelude;

pub use crate::client::{OpenAiClient, OpenAiConfig, StructuredResponse};
pub use crate::completion::{ChatMessage, ChatRequest, ChatResponse, ContentPart, Usage};
pub use crate::error::{Error, Result};
pub use crate::fixture::FixtureExtractor;
pub use crate::service::{
    PaintingAdvisor, PaintingDetails, PaintingExtractor, SimilarPaintings, SuggestedPainting,
};
