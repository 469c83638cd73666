//! Painting metadata extraction.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use painter_core::types::{ExtractionRecord, UploadedItem, is_valid_year};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::client::OpenAiClient;
use crate::completion::{ChatMessage, ContentPart};
use crate::{Error, Result, TRACING_TARGET_SERVICE};

const EXTRACTION_PREAMBLE: &str = "You are an art historian. You identify paintings from \
photographs and answer only with the requested JSON object.";

const EXTRACTION_PROMPT: &str = "Identify the painting in this image. Give its title, the \
painter's full name, the year it was completed as a four-digit number, and describe the \
historical event it depicts in three sentences.";

const SCHEMA_NAME: &str = "painting_info";

/// Metadata the model must return for one painting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PaintingDetails {
    /// Painting title.
    pub title: String,
    /// Painter's full name.
    pub author: String,
    /// Year the painting was completed.
    pub year: i32,
    /// Three sentences about the historical event the painting depicts.
    #[serde(rename = "description_of_historical_event_in_3_sentences")]
    pub description: String,
}

impl PaintingDetails {
    /// Checks the constraints the JSON schema cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] on an out-of-range year or a blank title.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_year(self.year) {
            return Err(Error::validation(format!(
                "year {} is not a four-digit year",
                self.year
            )));
        }

        if self.title.trim().is_empty() {
            return Err(Error::validation("title is empty"));
        }

        Ok(())
    }

    /// Converts into a record carrying the call's token usage.
    pub fn into_record(self, usage_tokens: u32) -> ExtractionRecord {
        ExtractionRecord {
            title: self.title,
            author: self.author,
            year: self.year,
            description: self.description,
            usage_tokens,
        }
    }
}

/// Extracts painting metadata from images with a multimodal model.
#[derive(Debug, Clone)]
pub struct PaintingExtractor {
    client: OpenAiClient,
}

impl PaintingExtractor {
    /// Creates an extractor on top of `client`.
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// Sends `item` to the model and returns the validated record.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success statuses, malformed responses
    /// and schema violations. Nothing is retried.
    pub async fn extract_details(&self, item: &UploadedItem) -> Result<ExtractionRecord> {
        tracing::debug!(
            target: TRACING_TARGET_SERVICE,
            item = item.name(),
            bytes = item.len(),
            media_type = item.media_type().mime_type(),
            "Extracting painting metadata"
        );

        let image = STANDARD.encode(item.data());
        let messages = vec![
            ChatMessage::system(EXTRACTION_PREAMBLE),
            ChatMessage::user_parts(vec![
                ContentPart::text(EXTRACTION_PROMPT),
                ContentPart::image_base64(item.media_type().mime_type(), &image),
            ]),
        ];

        let response = self
            .client
            .complete_structured::<PaintingDetails>(messages, SCHEMA_NAME)
            .await?;

        let usage_tokens = response.usage_tokens();
        response.value.validate()?;
        let record = response.value.into_record(usage_tokens);

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            item = item.name(),
            title = %record.title,
            usage_tokens,
            "Painting metadata extracted"
        );

        Ok(record)
    }
}

#[async_trait::async_trait]
impl painter_core::MetadataExtractor for PaintingExtractor {
    async fn extract(&self, item: &UploadedItem) -> painter_core::Result<ExtractionRecord> {
        self.extract_details(item).await.map_err(Into::into)
    }
}
