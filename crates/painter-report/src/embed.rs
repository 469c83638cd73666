//! Image decoding and JPEG re-encoding for embedding.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use lopdf::{Stream, dictionary};

use crate::Result;

/// An image re-encoded as baseline RGB JPEG.
#[derive(Debug, Clone)]
pub(crate) struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

impl EmbeddedImage {
    /// Decodes any supported format and re-encodes it as JPEG.
    ///
    /// Alpha is dropped, which suits the white page background.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(data)?;
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

        let mut jpeg = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)?;

        Ok(Self {
            width: rgb.width(),
            height: rgb.height(),
            jpeg,
        })
    }

    /// Returns the size of the image scaled to fit a box, aspect preserved.
    pub fn fit(&self, box_width: f32, box_height: f32) -> (f32, f32) {
        let (width, height) = (self.width.max(1) as f32, self.height.max(1) as f32);
        let scale = (box_width / width).min(box_height / height);
        (width * scale, height * scale)
    }

    /// Builds the image XObject stream.
    pub fn into_stream(self) -> Stream {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(self.width),
            "Height" => i64::from(self.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        };
        Stream::new(dict, self.jpeg).with_compression(false)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;

    /// Encodes a solid PNG of the given size.
    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([180, 40, 30])));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png_to_jpeg() {
        let embedded = EmbeddedImage::decode(&png(40, 20)).unwrap();
        assert_eq!((embedded.width, embedded.height), (40, 20));
        assert_eq!(&embedded.jpeg[..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_alpha_is_dropped() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0])));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        assert!(EmbeddedImage::decode(&bytes).is_ok());
    }

    #[test]
    fn test_fit_preserves_aspect() {
        let embedded = EmbeddedImage::decode(&png(40, 20)).unwrap();
        assert_eq!(embedded.fit(300.0, 300.0), (300.0, 150.0));

        let tall = EmbeddedImage::decode(&png(10, 40)).unwrap();
        assert_eq!(tall.fit(300.0, 300.0), (75.0, 300.0));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(EmbeddedImage::decode(b"not an image").is_err());
    }
}
