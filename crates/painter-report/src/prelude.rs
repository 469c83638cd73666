//! Convenient re-exports for common use.

pub use crate::builder::{BlockKind, Placement, ReportBuilder, ReportItem};
pub use crate::error::{Error, Result};
pub use crate::layout::Layout;
