#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Image compression for the painting reader.
//!
//! [`TinifyClient`] talks to a Tinify-compatible `shrink` endpoint and
//! implements [`ImageCompressor`](painter_core::ImageCompressor).
//! [`ImagePreprocessor`] wraps any compressor and keeps the input and output
//! in temporary files that live exactly as long as the returned
//! [`TemporaryImage`].

/// Tracing target for HTTP client operations.
pub const TRACING_TARGET_CLIENT: &str = "painter_tinify::client";

/// Tracing target for preprocessing.
pub const TRACING_TARGET_PREPROCESS: &str = "painter_tinify::preprocess";

mod client;
mod error;
mod preprocess;

#[doc(hidden)]
pub mod prelude;

pub use crate::client::{TinifyClient, TinifyConfig};
pub use crate::error::{Error, Result};
pub use crate::preprocess::{ImagePreprocessor, PreparedImage, TemporaryImage};
