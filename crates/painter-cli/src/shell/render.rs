//! Plain-text rendering of session results.

use painter_core::types::{ExtractionRecord, RecommendationRecord, UploadedItem};

/// One-line summary of an extraction.
pub fn summary(record: &ExtractionRecord) -> String {
    format!("{}, {} ({})", record.title, record.author, record.year)
}

/// Full view of one upload and its results.
pub fn detail(
    item: &UploadedItem,
    record: Option<&ExtractionRecord>,
    recommendations: Option<&[RecommendationRecord]>,
) -> Vec<String> {
    let mut lines = vec![format!(
        "== {} ({}, {} bytes) ==",
        item.name(),
        item.media_type(),
        item.len()
    )];

    let Some(record) = record else {
        lines.push("Not extracted yet.".to_string());
        return lines;
    };

    lines.push(format!("Title: {}", record.title));
    lines.push(format!("Author: {}", record.author));
    lines.push(format!("Year: {}", record.year));
    lines.push("Description:".to_string());
    lines.push(format!("> {}", record.description));

    if let Some(recommendations) = recommendations.filter(|r| !r.is_empty()) {
        lines.push("Recommended:".to_string());
        for recommendation in recommendations {
            lines.push(format!(
                "  - {}, {} ({})",
                recommendation.title, recommendation.author, recommendation.year
            ));
        }
    }

    lines
}

/// Status row for the upload list.
pub fn status_row(
    item: &UploadedItem,
    record: Option<&ExtractionRecord>,
    recommendations: Option<&[RecommendationRecord]>,
) -> String {
    let status = match (record, recommendations) {
        (None, _) => "pending".to_string(),
        (Some(record), None) => summary(record),
        (Some(record), Some(list)) => {
            format!("{} [{} recommended]", summary(record), list.len())
        }
    };
    format!("{}: {}", item.name(), status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ExtractionRecord {
        ExtractionRecord {
            title: "Guernica".into(),
            author: "Pablo Picasso".into(),
            year: 1937,
            description: "The bombing of Guernica.".into(),
            usage_tokens: 1200,
        }
    }

    #[test]
    fn test_detail_lists_fields() {
        let item = UploadedItem::new("guernica.png", vec![0x89, b'P', b'N', b'G']);
        let recommendations = vec![RecommendationRecord {
            title: "The Third of May 1808".into(),
            author: "Francisco Goya".into(),
            year: 1814,
            usage_tokens: 50,
        }];

        let lines = detail(&item, Some(&record()), Some(&recommendations));
        assert_eq!(lines[0], "== guernica.png (png, 4 bytes) ==");
        assert!(lines.contains(&"Title: Guernica".to_string()));
        assert!(lines.contains(&"Year: 1937".to_string()));
        assert!(lines.contains(&"  - The Third of May 1808, Francisco Goya (1814)".to_string()));
    }

    #[test]
    fn test_status_row() {
        let item = UploadedItem::new("guernica.png", vec![0u8; 2]);
        assert_eq!(status_row(&item, None, None), "guernica.png: pending");
        assert_eq!(
            status_row(&item, Some(&record()), None),
            "guernica.png: Guernica, Pablo Picasso (1937)"
        );
    }
}
