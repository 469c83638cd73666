//! Uploaded painting images.

use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::{Error, Result};

/// Image formats recognized for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaType {
    /// PNG image.
    #[default]
    Png,
    /// JPEG image.
    Jpeg,
    /// GIF image.
    Gif,
    /// WebP image.
    WebP,
}

impl MediaType {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
        }
    }

    /// Detects the format from a file extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects the format from the leading magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match data {
            [0x89, b'P', b'N', b'G', ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'G', b'I', b'F', b'8', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::WebP),
            _ => None,
        }
    }
}

/// An uploaded image blob identified by its display name.
///
/// The display name is the identity key used by the result store. The blob is
/// shared cheaply via [`Bytes`] and never mutated after upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedItem {
    name: String,
    data: Bytes,
    media_type: MediaType,
}

impl UploadedItem {
    /// Creates an item, detecting the media type from the content and then
    /// from the name's extension. Falls back to PNG.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let name = name.into();
        let data = data.into();
        let media_type = MediaType::sniff(&data)
            .or_else(|| {
                Path::new(&name)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(MediaType::from_extension)
            })
            .unwrap_or_default();

        Self {
            name,
            data,
            media_type,
        }
    }

    /// Reads an item from disk, using the file name as the display name.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::config(format!("invalid upload path: {}", path.display())))?
            .to_string();

        let data = tokio::fs::read(path).await?;
        Ok(Self::new(name, data))
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the image bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the detected media type.
    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Returns the blob size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
