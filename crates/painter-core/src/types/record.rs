//! Extraction and recommendation records.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Accepted range for a painting's year.
pub const YEAR_RANGE: RangeInclusive<i32> = 1000..=9999;

/// Returns true if `year` is a 4-digit calendar year.
pub fn is_valid_year(year: i32) -> bool {
    YEAR_RANGE.contains(&year)
}

/// Structured metadata extracted from one uploaded painting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Painting title.
    pub title: String,
    /// Painter's name.
    pub author: String,
    /// Year the painting was completed.
    pub year: i32,
    /// Short description of the painting and the events it depicts.
    pub description: String,
    /// Tokens reported by the upstream call that produced this record.
    pub usage_tokens: u32,
}

impl ExtractionRecord {
    /// Renders the record as the text payload of a recommendation request.
    ///
    /// Token usage is bookkeeping, not painting data, so it is left out.
    pub fn to_prompt_text(&self) -> String {
        serde_json::json!({
            "title": self.title,
            "author": self.author,
            "year": self.year,
            "description": self.description,
        })
        .to_string()
    }
}

/// A painting suggested as similar to an extracted one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    /// Painting title.
    pub title: String,
    /// Painter's name.
    pub author: String,
    /// Year the painting was completed.
    pub year: i32,
    /// Tokens reported by the upstream call that produced this record.
    pub usage_tokens: u32,
}

/// The result of one recommendation call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Recommendations {
    /// Suggested paintings, in the order the service returned them.
    pub records: Vec<RecommendationRecord>,
    /// Tokens reported by the call.
    pub usage_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_validation() {
        assert!(is_valid_year(1937));
        assert!(is_valid_year(1000));
        assert!(!is_valid_year(999));
        assert!(!is_valid_year(19370));
        assert!(!is_valid_year(-1500));
    }

    #[test]
    fn test_prompt_text_omits_usage() {
        let record = ExtractionRecord {
            title: "Guernica".into(),
            author: "Pablo Picasso".into(),
            year: 1937,
            description: "The bombing of Guernica.".into(),
            usage_tokens: 1200,
        };

        let text = record.to_prompt_text();
        assert!(text.contains("\"title\":\"Guernica\""));
        assert!(!text.contains("usage_tokens"));
    }
}
