#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Painter Report
//!
//! Builds a paginated PDF from extracted paintings. A [`ReportBuilder`] moves
//! through three states: it waits for the title, then accepts items, and is
//! finally sealed into bytes. Every image and every text line is an atomic
//! block that is moved to a fresh page rather than split.
//!
//! Text uses the standard Type 1 fonts, so no font files are embedded. Line
//! breaking uses their published advance widths (see [`metrics`]).

/// Tracing target for report assembly.
pub const TRACING_TARGET: &str = "painter_report";

mod builder;
mod error;
mod embed;
mod layout;
pub mod metrics;
pub mod wrap;

#[doc(hidden)]
pub mod prelude;

pub use crate::builder::{BlockKind, Placement, ReportBuilder, ReportItem};
pub use crate::error::{Error, Result};
pub use crate::layout::{Layout, LayoutBuilder, LayoutBuilderError};
pub use crate::metrics::Font;
