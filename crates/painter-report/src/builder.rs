//! Paginated report assembly.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use painter_core::types::{ExtractionRecord, RecommendationRecord};

use crate::embed::EmbeddedImage;
use crate::layout::Layout;
use crate::metrics::{self, Font};
use crate::wrap::{wrap_text, wrap_text_hanging};
use crate::{Error, Result, TRACING_TARGET};

/// Narrowest first line worth putting after a label.
const MIN_HANGING_WIDTH: f32 = 40.0;

/// One painting to place in the report.
#[derive(Debug, Clone, Copy)]
pub struct ReportItem<'a> {
    /// Upload name, used in logs.
    pub name: &'a str,
    /// Image bytes in any format the `image` crate decodes.
    pub image: &'a [u8],
    /// Extracted metadata.
    pub record: &'a ExtractionRecord,
    /// Suggested similar paintings; the block is omitted when empty.
    pub recommendations: &'a [RecommendationRecord],
}

/// Kind of a drawn block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// A line of the title.
    Title,
    /// A painting image.
    Image,
    /// A line of body text.
    Text,
}

/// Where an atomic block was drawn.
///
/// Coordinates are PDF points from the bottom-left corner of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Zero-based page index.
    pub page: usize,
    /// Block kind.
    pub kind: BlockKind,
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Block width.
    pub width: f32,
    /// Block height.
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingTitle,
    InItem,
}

/// Builds a PDF report one item at a time.
///
/// Call [`start`](Self::start) once, then [`place_item`](Self::place_item)
/// for each painting, then [`seal`](Self::seal). Before each atomic block
/// the builder checks the space left on the page and opens a new page if the
/// block does not fit, so no image or text line is ever split.
#[derive(Debug)]
pub struct ReportBuilder {
    layout: Layout,
    document: Document,
    state: State,
    title: String,
    pages: Vec<Vec<Operation>>,
    images: Vec<ObjectId>,
    placements: Vec<Placement>,
    cursor: f32,
}

impl ReportBuilder {
    /// Creates a builder with the given layout.
    pub fn new(layout: Layout) -> Self {
        let cursor = layout.top();
        Self {
            layout,
            document: Document::with_version("1.5"),
            state: State::AwaitingTitle,
            title: String::new(),
            pages: Vec::new(),
            images: Vec::new(),
            placements: Vec::new(),
            cursor,
        }
    }

    /// Returns the layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Returns the current vertical cursor.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Returns the number of pages opened so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns the number of embedded images.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Returns every block drawn so far, in drawing order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Draws the centered title on the first page and returns the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyStarted`] if called twice.
    pub fn start(&mut self, title: &str) -> Result<f32> {
        if self.state != State::AwaitingTitle {
            return Err(Error::AlreadyStarted);
        }

        self.new_page();
        self.title = title.to_string();

        let size = self.layout.title_size;
        let height = self.layout.title_line_height();
        for line in wrap_text(title, Font::CourierBold, size, self.layout.content_width()) {
            let width = Font::CourierBold.text_width(&line, size);
            let x = self.layout.margin + (self.layout.content_width() - width) / 2.0;
            let top = self.reserve(height);
            let baseline = top - size;

            self.push_ops(text_ops(&[(Font::CourierBold, &line)], size, x, baseline));
            self.place(BlockKind::Title, x, top - height, width, height);
        }

        self.cursor -= self.layout.line_height;
        self.state = State::InItem;

        tracing::debug!(
            target: TRACING_TARGET,
            title,
            cursor = self.cursor,
            "Report started"
        );

        Ok(self.cursor)
    }

    /// Draws one painting and returns the cursor after it.
    ///
    /// The image is decoded before anything is drawn, so a failure leaves the
    /// report unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotStarted`] before [`start`](Self::start), or an
    /// image error if the bytes cannot be decoded.
    pub fn place_item(&mut self, item: &ReportItem<'_>) -> Result<f32> {
        if self.state != State::InItem {
            return Err(Error::NotStarted);
        }

        let image = EmbeddedImage::decode(item.image)?;
        self.place_image(image);

        let record = item.record;
        self.place_field("Title", &record.title);
        self.place_field("Author", &record.author);
        self.place_field("Year", &record.year.to_string());
        self.place_label("Description:");
        self.place_paragraph(&record.description);

        if !item.recommendations.is_empty() {
            self.cursor -= self.layout.line_height / 2.0;
            self.place_label("Recommended paintings:");
            for recommendation in item.recommendations {
                self.place_field("Title", &recommendation.title);
                self.place_field("Author", &recommendation.author);
                self.place_field("Year", &recommendation.year.to_string());
            }
        }

        self.cursor -= self.layout.line_height;

        tracing::debug!(
            target: TRACING_TARGET,
            item = item.name,
            page = self.pages.len(),
            cursor = self.cursor,
            recommendations = item.recommendations.len(),
            "Report item placed"
        );

        Ok(self.cursor)
    }

    /// Serializes the report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotStarted`] if no title was drawn, or a PDF error if
    /// serialization fails.
    pub fn seal(mut self) -> Result<Vec<u8>> {
        if self.state != State::InItem {
            return Err(Error::NotStarted);
        }

        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let font_id = self.document.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), font_id);
        }

        let mut xobjects = Dictionary::new();
        for (index, image_id) in self.images.iter().enumerate() {
            xobjects.set(image_name(index), *image_id);
        }

        let resources_id = self.document.add_object(dictionary! {
            "Font" => fonts,
            "XObject" => xobjects,
        });

        let pages_id = self.document.new_object_id();
        let mut kids = Vec::with_capacity(self.pages.len());
        for operations in std::mem::take(&mut self.pages) {
            let content = Content { operations }.encode()?;
            let content_id = self.document.add_object(Stream::new(dictionary! {}, content));
            let page_id = self.document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::from(page_id));
        }

        let page_count = kids.len();
        self.document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    self.layout.page_width.into(),
                    self.layout.page_height.into(),
                ],
            }),
        );

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = self.document.add_object(dictionary! {
            "Title" => Object::String(metrics::encode(&self.title), StringFormat::Literal),
            "Producer" => Object::string_literal(format!("painter-report {}", env!("CARGO_PKG_VERSION"))),
        });
        self.document.trailer.set("Root", catalog_id);
        self.document.trailer.set("Info", info_id);
        self.document.compress();

        let mut bytes = Vec::new();
        self.document.save_to(&mut bytes)?;

        tracing::info!(
            target: TRACING_TARGET,
            pages = page_count,
            images = self.images.len(),
            bytes = bytes.len(),
            "Report sealed"
        );

        Ok(bytes)
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = self.layout.top();

        tracing::trace!(
            target: TRACING_TARGET,
            page = self.pages.len(),
            "Page opened"
        );
    }

    /// Makes room for a block of `height` and returns its top edge.
    fn reserve(&mut self, height: f32) -> f32 {
        let at_top = self.cursor >= self.layout.top();
        if self.cursor - height < self.layout.bottom() && !at_top {
            self.new_page();
        }

        let top = self.cursor;
        self.cursor -= height;
        top
    }

    fn push_ops(&mut self, operations: Vec<Operation>) {
        if let Some(page) = self.pages.last_mut() {
            page.extend(operations);
        }
    }

    fn place(&mut self, kind: BlockKind, x: f32, y: f32, width: f32, height: f32) {
        self.placements.push(Placement {
            page: self.pages.len().saturating_sub(1),
            kind,
            x,
            y,
            width,
            height,
        });
    }

    fn place_image(&mut self, image: EmbeddedImage) {
        let (width, height) = image.fit(self.layout.image_width, self.layout.image_height);
        let x = self.layout.margin + (self.layout.image_width - width) / 2.0;
        let top = self.reserve(height);
        let y = top - height;

        let name = image_name(self.images.len());
        let image_id = self.document.add_object(image.into_stream());
        self.images.push(image_id);

        self.push_ops(vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![width.into(), 0.into(), 0.into(), height.into(), x.into(), y.into()],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        self.place(BlockKind::Image, x, y, width, height);

        self.cursor -= self.layout.line_height / 2.0;
    }

    /// Draws one line of segments at the left margin.
    fn place_line(&mut self, segments: &[(Font, &str)]) {
        let size = self.layout.body_size;
        let height = self.layout.line_height;
        let x = self.layout.margin;
        let top = self.reserve(height);
        let width = segments
            .iter()
            .map(|(font, text)| font.text_width(text, size))
            .sum();

        self.push_ops(text_ops(segments, size, x, top - size));
        self.place(BlockKind::Text, x, top - height, width, height);
    }

    fn place_label(&mut self, label: &str) {
        self.place_line(&[(Font::HelveticaBold, label)]);
    }

    /// Draws `Label: value`, wrapping the value under the label.
    fn place_field(&mut self, label: &str, value: &str) {
        let size = self.layout.body_size;
        let width = self.layout.content_width();
        let label = format!("{label}: ");
        let first_width = width - Font::HelveticaBold.text_width(&label, size);

        let lines = if first_width >= MIN_HANGING_WIDTH {
            wrap_text_hanging(value, Font::Helvetica, size, first_width, width)
        } else {
            Vec::new()
        };

        match lines.split_first() {
            Some((first, rest)) => {
                self.place_line(&[(Font::HelveticaBold, &label), (Font::Helvetica, first)]);
                for line in rest {
                    self.place_line(&[(Font::Helvetica, line)]);
                }
            }
            None => {
                self.place_line(&[(Font::HelveticaBold, &label)]);
                self.place_paragraph(value);
            }
        }
    }

    fn place_paragraph(&mut self, text: &str) {
        let size = self.layout.body_size;
        for line in wrap_text(text, Font::Helvetica, size, self.layout.content_width()) {
            self.place_line(&[(Font::Helvetica, &line)]);
        }
    }
}

fn image_name(index: usize) -> String {
    format!("Im{index}")
}

/// Builds a text object drawing `segments` one after another.
fn text_ops(segments: &[(Font, &str)], size: f32, x: f32, baseline: f32) -> Vec<Operation> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Td", vec![x.into(), baseline.into()]),
    ];

    for (font, text) in segments {
        operations.push(Operation::new(
            "Tf",
            vec![Object::Name(font.resource_name().as_bytes().to_vec()), size.into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(metrics::encode(text), StringFormat::Literal)],
        ));
    }

    operations.push(Operation::new("ET", vec![]));
    operations
}
