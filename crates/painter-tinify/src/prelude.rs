//! Convenient re-exports for common use.

pub use crate::client::{TinifyClient, TinifyConfig};
pub use crate::error::{Error, Result};
pub use crate::preprocess::{ImagePreprocessor, PreparedImage, TemporaryImage};
