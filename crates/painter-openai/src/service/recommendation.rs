//! Similar painting recommendations.

use painter_core::types::{ExtractionRecord, RecommendationRecord, Recommendations, is_valid_year};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::client::OpenAiClient;
use crate::completion::ChatMessage;
use crate::{Error, Result, TRACING_TARGET_SERVICE};

const RECOMMENDATION_PREAMBLE: &str = "You are an art historian. You recommend paintings and \
answer only with the requested JSON object.";

const RECOMMENDATION_PROMPT: &str = "Recommend a painting similar to the one described below, \
by theme, period or style. Do not recommend the painting itself.";

const SCHEMA_NAME: &str = "similar_paintings";

/// One suggested painting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SuggestedPainting {
    /// Painting title.
    pub title: String,
    /// Painter's full name.
    pub author: String,
    /// Year the painting was completed.
    pub year: i32,
}

/// Suggestions the model must return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SimilarPaintings {
    /// One or more suggested paintings.
    pub recommendations: Vec<SuggestedPainting>,
}

impl SimilarPaintings {
    fn validate(&self) -> Result<()> {
        if self.recommendations.is_empty() {
            return Err(Error::validation("no recommendations returned"));
        }

        if let Some(bad) = self
            .recommendations
            .iter()
            .find(|painting| !is_valid_year(painting.year))
        {
            return Err(Error::validation(format!(
                "year {} of '{}' is not a four-digit year",
                bad.year, bad.title
            )));
        }

        Ok(())
    }

    fn into_recommendations(self, usage_tokens: u32) -> Recommendations {
        let records = self
            .recommendations
            .into_iter()
            .map(|painting| RecommendationRecord {
                title: painting.title,
                author: painting.author,
                year: painting.year,
                usage_tokens,
            })
            .collect();

        Recommendations {
            records,
            usage_tokens,
        }
    }
}

/// Recommends paintings similar to an extracted one.
#[derive(Debug, Clone)]
pub struct PaintingAdvisor {
    client: OpenAiClient,
}

impl PaintingAdvisor {
    /// Creates an advisor on top of `client`.
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// Asks the model for paintings similar to `source`.
    ///
    /// # Errors
    ///
    /// Fails like [`PaintingExtractor::extract_details`](crate::PaintingExtractor::extract_details),
    /// and also when the model returns an empty list.
    pub async fn similar_to(&self, source: &ExtractionRecord) -> Result<Recommendations> {
        tracing::debug!(
            target: TRACING_TARGET_SERVICE,
            source = %source.title,
            "Requesting recommendations"
        );

        let messages = vec![
            ChatMessage::system(RECOMMENDATION_PREAMBLE),
            ChatMessage::user(format!("{RECOMMENDATION_PROMPT}\n\n{}", source.to_prompt_text())),
        ];

        let response = self
            .client
            .complete_structured::<SimilarPaintings>(messages, SCHEMA_NAME)
            .await?;

        let usage_tokens = response.usage_tokens();
        response.value.validate()?;
        let recommendations = response.value.into_recommendations(usage_tokens);

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            source = %source.title,
            count = recommendations.records.len(),
            usage_tokens,
            "Recommendations received"
        );

        Ok(recommendations)
    }
}

#[async_trait::async_trait]
impl painter_core::PaintingRecommender for PaintingAdvisor {
    async fn recommend(&self, source: &ExtractionRecord) -> painter_core::Result<Recommendations> {
        self.similar_to(source).await.map_err(Into::into)
    }
}
