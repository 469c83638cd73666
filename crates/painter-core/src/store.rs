//! Per-session extraction and recommendation results.

use std::collections::HashMap;

use crate::types::{ExtractionRecord, RecommendationRecord};

/// Keyed results for one session.
///
/// Extractions are keyed by the upload's display name. Recommendations are
/// keyed by whatever painting key the caller chooses. Every write replaces the
/// previous value for its key, so a failed call on one item can never disturb
/// another item's entry.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    extractions: HashMap<String, ExtractionRecord>,
    recommendations: HashMap<String, Vec<RecommendationRecord>>,
}

impl ResultStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the extraction for `item_key`, replacing any previous record.
    pub fn put_extraction(&mut self, item_key: impl Into<String>, record: ExtractionRecord) {
        self.extractions.insert(item_key.into(), record);
    }

    /// Returns the latest extraction for `item_key`.
    pub fn get_extraction(&self, item_key: &str) -> Option<&ExtractionRecord> {
        self.extractions.get(item_key)
    }

    /// Removes and returns the extraction for `item_key`.
    pub fn remove_extraction(&mut self, item_key: &str) -> Option<ExtractionRecord> {
        self.extractions.remove(item_key)
    }

    /// Stores the recommendations for `painting_key`, replacing any previous list.
    pub fn put_recommendations(
        &mut self,
        painting_key: impl Into<String>,
        records: Vec<RecommendationRecord>,
    ) {
        self.recommendations.insert(painting_key.into(), records);
    }

    /// Returns the latest recommendations for `painting_key`.
    pub fn get_recommendations(&self, painting_key: &str) -> Option<&[RecommendationRecord]> {
        self.recommendations.get(painting_key).map(Vec::as_slice)
    }

    /// Removes and returns the recommendations for `painting_key`.
    pub fn remove_recommendations(&mut self, painting_key: &str) -> Option<Vec<RecommendationRecord>> {
        self.recommendations.remove(painting_key)
    }

    /// Iterates over all extractions. Order is unspecified.
    pub fn extractions(&self) -> impl Iterator<Item = (&str, &ExtractionRecord)> {
        self.extractions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keeps only the entries whose key satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.extractions.retain(|k, _| keep(k));
        self.recommendations.retain(|k, _| keep(k));
    }

    /// Returns the number of stored extractions.
    pub fn len(&self) -> usize {
        self.extractions.len()
    }

    /// Returns true if no extraction is stored.
    pub fn is_empty(&self) -> bool {
        self.extractions.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.extractions.clear();
        self.recommendations.clear();
    }
}
