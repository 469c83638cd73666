//! Mock providers for testing.
//!
//! [`MockProvider`] implements every provider trait with deterministic
//! answers derived from its inputs, so downstream crates can exercise the
//! session flow without network access.
//!
//! # Feature Flag
//!
//! Outside this crate's own tests the module requires the `mock` feature:
//!
//! ```toml
//! [dev-dependencies]
//! painter-core = { version = "...", features = ["mock"] }
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;

use crate::types::{ExtractionRecord, RecommendationRecord, Recommendations, UploadedItem};
use crate::{Error, ImageCompressor, MetadataExtractor, PaintingRecommender, Result};

/// Configuration for the mock provider.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Tokens reported by every extraction.
    pub extraction_tokens: u32,
    /// Tokens reported by every recommendation call.
    pub recommendation_tokens: u32,
    /// Number of suggestions returned per recommendation call.
    pub recommendation_count: usize,
    /// Upload names whose extraction fails.
    pub failing_items: HashSet<String>,
    /// Whether compression fails.
    pub fail_compression: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            extraction_tokens: 1200,
            recommendation_tokens: 50,
            recommendation_count: 1,
            failing_items: HashSet::new(),
            fail_compression: false,
        }
    }
}

#[derive(Debug, Default)]
struct Calls {
    extract: AtomicUsize,
    recommend: AtomicUsize,
    compress: AtomicUsize,
}

/// Unified mock provider for extraction, recommendation and compression.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    config: MockConfig,
    calls: Arc<Calls>,
}

impl MockProvider {
    /// Creates a mock provider with the given configuration.
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            calls: Arc::default(),
        }
    }

    /// Makes extraction fail for `name`.
    #[must_use]
    pub fn failing_on(mut self, name: impl Into<String>) -> Self {
        self.config.failing_items.insert(name.into());
        self
    }

    /// Makes compression fail.
    #[must_use]
    pub fn failing_compression(mut self) -> Self {
        self.config.fail_compression = true;
        self
    }

    /// Number of extraction calls made.
    pub fn extract_calls(&self) -> usize {
        self.calls.extract.load(Ordering::SeqCst)
    }

    /// Number of recommendation calls made.
    pub fn recommend_calls(&self) -> usize {
        self.calls.recommend.load(Ordering::SeqCst)
    }

    /// Number of compression calls made.
    pub fn compress_calls(&self) -> usize {
        self.calls.compress.load(Ordering::SeqCst)
    }

    /// Title the mock assigns to an upload: its name without extension.
    pub fn title_for(name: &str) -> String {
        name.rsplit_once('.')
            .map_or(name, |(stem, _)| stem)
            .to_string()
    }
}

#[async_trait::async_trait]
impl MetadataExtractor for MockProvider {
    async fn extract(&self, item: &UploadedItem) -> Result<ExtractionRecord> {
        self.calls.extract.fetch_add(1, Ordering::SeqCst);

        if self.config.failing_items.contains(item.name()) {
            return Err(Error::external("mock", format!("extraction failed for {}", item.name())));
        }

        Ok(ExtractionRecord {
            title: Self::title_for(item.name()),
            author: "Mock Painter".to_string(),
            year: 1900,
            description: format!("A painting uploaded as {}.", item.name()),
            usage_tokens: self.config.extraction_tokens,
        })
    }
}

#[async_trait::async_trait]
impl PaintingRecommender for MockProvider {
    async fn recommend(&self, source: &ExtractionRecord) -> Result<Recommendations> {
        self.calls.recommend.fetch_add(1, Ordering::SeqCst);

        let usage_tokens = self.config.recommendation_tokens;
        let records = (1..=self.config.recommendation_count)
            .map(|n| RecommendationRecord {
                title: format!("Similar to {} #{n}", source.title),
                author: source.author.clone(),
                year: source.year,
                usage_tokens,
            })
            .collect();

        Ok(Recommendations {
            records,
            usage_tokens,
        })
    }
}

#[async_trait::async_trait]
impl ImageCompressor for MockProvider {
    async fn compress(&self, image: Bytes) -> Result<Bytes> {
        self.calls.compress.fetch_add(1, Ordering::SeqCst);

        if self.config.fail_compression {
            return Err(Error::external("mock", "compression failed"));
        }
        Ok(image)
    }
}
