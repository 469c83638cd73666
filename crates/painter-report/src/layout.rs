//! Page geometry and font sizes.

use derive_builder::Builder;

/// Page geometry, in PDF points, and font sizes.
///
/// Defaults to US Letter with a 50pt margin, 14pt lines, a 300x300pt image
/// box, a 24pt title and 11pt body text.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    name = "LayoutBuilder",
    pattern = "owned",
    setter(prefix = "with"),
    build_fn(validate = "Self::validate_layout")
)]
pub struct Layout {
    /// Page width.
    #[builder(default = "612.0")]
    pub page_width: f32,
    /// Page height.
    #[builder(default = "792.0")]
    pub page_height: f32,
    /// Margin on every side.
    #[builder(default = "50.0")]
    pub margin: f32,
    /// Vertical advance of one body line.
    #[builder(default = "14.0")]
    pub line_height: f32,
    /// Width of the box images are scaled into.
    #[builder(default = "300.0")]
    pub image_width: f32,
    /// Height of the box images are scaled into.
    #[builder(default = "300.0")]
    pub image_height: f32,
    /// Title font size.
    #[builder(default = "24.0")]
    pub title_size: f32,
    /// Body font size.
    #[builder(default = "11.0")]
    pub body_size: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 50.0,
            line_height: 14.0,
            image_width: 300.0,
            image_height: 300.0,
            title_size: 24.0,
            body_size: 11.0,
        }
    }
}

impl Layout {
    /// Creates a new layout builder.
    pub fn builder() -> LayoutBuilder {
        LayoutBuilder::default()
    }

    /// Returns the width available between the margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Returns the height available between the margins.
    pub fn content_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }

    /// Returns the y coordinate where content starts on a fresh page.
    pub fn top(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Returns the lowest y coordinate content may reach.
    pub fn bottom(&self) -> f32 {
        self.margin
    }

    /// Returns the height of one title line.
    pub fn title_line_height(&self) -> f32 {
        self.title_size * 1.25
    }
}

impl LayoutBuilder {
    fn validate_layout(&self) -> Result<(), String> {
        let defaults = Layout::default();
        let layout = Layout {
            page_width: self.page_width.unwrap_or(defaults.page_width),
            page_height: self.page_height.unwrap_or(defaults.page_height),
            margin: self.margin.unwrap_or(defaults.margin),
            line_height: self.line_height.unwrap_or(defaults.line_height),
            image_width: self.image_width.unwrap_or(defaults.image_width),
            image_height: self.image_height.unwrap_or(defaults.image_height),
            title_size: self.title_size.unwrap_or(defaults.title_size),
            body_size: self.body_size.unwrap_or(defaults.body_size),
        };

        if layout.margin < 0.0 {
            return Err("Margin must not be negative".to_string());
        }

        if layout.content_width() <= 0.0 || layout.content_height() <= 0.0 {
            return Err("Margins leave no room for content".to_string());
        }

        if layout.body_size <= 0.0 || layout.title_size <= 0.0 {
            return Err("Font sizes must be greater than 0".to_string());
        }

        if layout.line_height < layout.body_size {
            return Err("Line height must be at least the body font size".to_string());
        }

        if layout.line_height > layout.content_height()
            || layout.title_line_height() > layout.content_height()
        {
            return Err("A text line does not fit on a page".to_string());
        }

        if layout.image_width <= 0.0
            || layout.image_height <= 0.0
            || layout.image_width > layout.content_width()
            || layout.image_height > layout.content_height()
        {
            return Err("Image box must fit between the margins".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = Layout::builder().build().expect("Valid layout");
        assert_eq!(layout, Layout::default());
        assert_eq!(layout.content_width(), 512.0);
        assert_eq!(layout.content_height(), 692.0);
        assert_eq!(layout.top(), 742.0);
        assert_eq!(layout.bottom(), 50.0);
    }

    #[test]
    fn test_custom_layout() {
        let layout = Layout::builder()
            .with_page_width(595.0)
            .with_page_height(842.0)
            .with_image_height(200.0)
            .build()
            .expect("Valid layout");

        assert_eq!(layout.page_width, 595.0);
        assert_eq!(layout.image_height, 200.0);
        assert_eq!(layout.margin, 50.0);
    }

    #[test]
    fn test_validation() {
        assert!(Layout::builder().with_margin(400.0).build().is_err());
        assert!(Layout::builder().with_image_width(600.0).build().is_err());
        assert!(Layout::builder().with_line_height(5.0).build().is_err());
        assert!(Layout::builder().with_body_size(0.0).build().is_err());
    }
}
