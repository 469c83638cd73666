//! Compression into scoped temporary files.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use painter_core::types::UploadedItem;
use painter_core::{ImageCompressor, Result};
use tempfile::NamedTempFile;

use crate::TRACING_TARGET_PREPROCESS;

/// A compressed image backed by temporary files.
///
/// Holds the uploaded input and the compressed output on disk. Both files are
/// removed when the handle is dropped.
#[derive(Debug)]
pub struct TemporaryImage {
    input: NamedTempFile,
    output: NamedTempFile,
    data: Bytes,
}

impl TemporaryImage {
    /// Returns the path of the compressed file.
    pub fn path(&self) -> &Path {
        self.output.path()
    }

    /// Returns the path of the uncompressed input file.
    pub fn input_path(&self) -> &Path {
        self.input.path()
    }

    /// Returns the compressed bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Image bytes ready for embedding in a report.
#[derive(Debug)]
pub enum PreparedImage {
    /// The compressed variant, alive until this value is dropped.
    Compressed(TemporaryImage),
    /// The original upload, used when compression was skipped or failed.
    Original(Bytes),
}

impl PreparedImage {
    /// Returns the bytes to embed.
    pub fn bytes(&self) -> &Bytes {
        match self {
            Self::Compressed(image) => image.data(),
            Self::Original(data) => data,
        }
    }

    /// Returns true if the compressed variant is used.
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Compressed(_))
    }
}

/// Runs uploads through an [`ImageCompressor`] into temporary files.
#[derive(Clone)]
pub struct ImagePreprocessor {
    compressor: Arc<dyn ImageCompressor>,
    temp_dir: Option<PathBuf>,
}

impl std::fmt::Debug for ImagePreprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePreprocessor")
            .field("temp_dir", &self.temp_dir)
            .finish_non_exhaustive()
    }
}

impl ImagePreprocessor {
    /// Creates a preprocessor using `compressor`.
    pub fn new(compressor: Arc<dyn ImageCompressor>) -> Self {
        Self {
            compressor,
            temp_dir: None,
        }
    }

    /// Creates temporary files in `dir` instead of the system temp directory.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Compresses `item` into a [`TemporaryImage`].
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a temporary file cannot be written, or the
    /// compressor's error. Files created before the failure are removed.
    pub async fn compress(&self, item: &UploadedItem) -> Result<TemporaryImage> {
        let suffix = format!(".{}", item.media_type());
        let input = self.write_temp(item.data(), &suffix)?;

        tracing::debug!(
            target: TRACING_TARGET_PREPROCESS,
            item = item.name(),
            input = %input.path().display(),
            "Compressing image"
        );

        let data = self.compressor.compress(item.data().clone()).await?;
        let output = self.write_temp(&data, &suffix)?;

        tracing::debug!(
            target: TRACING_TARGET_PREPROCESS,
            item = item.name(),
            original_size = item.len(),
            compressed_size = data.len(),
            output = %output.path().display(),
            "Image compressed into temporary file"
        );

        Ok(TemporaryImage {
            input,
            output,
            data,
        })
    }

    fn write_temp(&self, data: &[u8], suffix: &str) -> std::io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("painter-").suffix(suffix);

        let mut file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(data)?;
        file.flush()?;
        Ok(file)
    }

    /// Compresses `item`, falling back to the original bytes on failure.
    ///
    /// The failure only affects this item; it is logged and not returned.
    pub async fn prepare(&self, item: &UploadedItem) -> PreparedImage {
        match self.compress(item).await {
            Ok(image) => PreparedImage::Compressed(image),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_PREPROCESS,
                    item = item.name(),
                    error = %error,
                    "Compression failed, using original image"
                );
                PreparedImage::Original(item.data().clone())
            }
        }
    }
}
