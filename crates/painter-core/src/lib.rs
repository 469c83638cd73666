#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Painter Core
//!
//! Foundational types for the painting reader: uploaded items, extraction and
//! recommendation records, the per-session result store, the cost accumulator
//! and the provider traits implemented by the service crates.
//!
//! The crate does not talk to any external service. Concrete extraction,
//! recommendation and compression clients live in their own crates and plug in
//! through [`MetadataExtractor`], [`PaintingRecommender`] and
//! [`ImageCompressor`].

/// Tracing target for session state changes.
pub const TRACING_TARGET_SESSION: &str = "painter_core::session";

/// Tracing target for cost accounting.
pub const TRACING_TARGET_COST: &str = "painter_core::cost";

mod cost;
mod error;
mod provider;
mod session;
mod store;

pub mod types;

#[cfg(any(test, feature = "mock"))]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;

#[doc(hidden)]
pub mod prelude;

pub use cost::{CallKind, CostAccumulator, PriceTable, UnitPrice};
pub use error::{BoxedError, Error, Result};
pub use provider::{ImageCompressor, MetadataExtractor, PaintingRecommender};
pub use session::{Credentials, Session};
pub use store::ResultStore;
