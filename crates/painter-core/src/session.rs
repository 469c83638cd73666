//! Session-scoped context shared by every user action.

use jiff::Timestamp;
use secrecy::SecretString;
use uuid::Uuid;

use crate::cost::{CallKind, CostAccumulator, PriceTable};
use crate::store::ResultStore;
use crate::types::{ExtractionRecord, RecommendationRecord, Recommendations, UploadedItem};
use crate::{Error, Result, TRACING_TARGET_SESSION};

/// API keys available to the session.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Key for the extraction and recommendation service.
    pub openai_api_key: Option<SecretString>,
    /// Key for the image compression service.
    pub tinify_api_key: Option<SecretString>,
}

impl Credentials {
    /// Creates credentials from optional keys. Blank keys count as absent.
    pub fn new(openai_api_key: Option<String>, tinify_api_key: Option<String>) -> Self {
        let secret = |key: Option<String>| {
            key.filter(|k| !k.trim().is_empty())
                .map(|k| SecretString::new(k.trim().to_string()))
        };

        Self {
            openai_api_key: secret(openai_api_key),
            tinify_api_key: secret(tinify_api_key),
        }
    }
}

/// Everything one interactive session knows.
///
/// Replaces a string-keyed state dictionary with typed fields: the current
/// upload set, the result store, the running cost and the credentials. The
/// shell passes it to each action handler, which reads and writes only the
/// fields it needs.
#[derive(Debug, Clone)]
pub struct Session {
    session_id: Uuid,
    created_at: Timestamp,
    credentials: Credentials,
    prices: PriceTable,
    items: Vec<UploadedItem>,
    store: ResultStore,
    cost: CostAccumulator,
}

impl Session {
    /// Creates an empty session with the given price table.
    pub fn new(prices: PriceTable) -> Self {
        let session = Self {
            session_id: Uuid::now_v7(),
            created_at: Timestamp::now(),
            credentials: Credentials::default(),
            prices,
            items: Vec::new(),
            store: ResultStore::new(),
            cost: CostAccumulator::new(),
        };

        tracing::debug!(
            target: TRACING_TARGET_SESSION,
            session_id = %session.session_id,
            "Session created"
        );

        session
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Returns the session identifier.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Returns when the session was created.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns the credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Stores an extraction service key, e.g. one typed at a prompt.
    pub fn set_openai_api_key(&mut self, key: SecretString) {
        self.credentials.openai_api_key = Some(key);
    }

    /// Returns the extraction service key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] if no key is configured.
    pub fn require_openai_api_key(&self) -> Result<&SecretString> {
        self.credentials
            .openai_api_key
            .as_ref()
            .ok_or(Error::MissingCredential("openai"))
    }

    /// Returns the compression service key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] if no key is configured.
    pub fn require_tinify_api_key(&self) -> Result<&SecretString> {
        self.credentials
            .tinify_api_key
            .as_ref()
            .ok_or(Error::MissingCredential("tinify"))
    }

    /// Returns the price table.
    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Replaces the upload set.
    ///
    /// Results for names that are still uploaded survive; results for names
    /// that disappeared are dropped.
    pub fn replace_uploads(&mut self, items: Vec<UploadedItem>) {
        self.items = items;
        let items = &self.items;
        self.store
            .retain(|key| items.iter().any(|item| item.name() == key));

        tracing::info!(
            target: TRACING_TARGET_SESSION,
            item_count = self.items.len(),
            "Upload set replaced"
        );
    }

    /// Adds one upload, replacing an existing upload with the same name.
    ///
    /// A replaced upload loses its results, since they describe the old image.
    pub fn add_upload(&mut self, item: UploadedItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.name() == item.name()) {
            self.store.remove_extraction(item.name());
            self.store.remove_recommendations(item.name());
            *existing = item;
        } else {
            self.items.push(item);
        }
    }

    /// Returns the uploads in upload order.
    pub fn items(&self) -> &[UploadedItem] {
        &self.items
    }

    /// Returns the upload named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownItem`] if no such upload exists.
    pub fn item(&self, name: &str) -> Result<&UploadedItem> {
        self.items
            .iter()
            .find(|item| item.name() == name)
            .ok_or_else(|| Error::UnknownItem(name.to_string()))
    }

    /// Accounts a completed extraction call and stores its record.
    pub fn record_extraction(&mut self, item_key: &str, record: ExtractionRecord) -> Result<()> {
        self.item(item_key)?;
        self.cost
            .charge(CallKind::Extraction, record.usage_tokens, &self.prices)?;

        tracing::info!(
            target: TRACING_TARGET_SESSION,
            item = item_key,
            title = %record.title,
            usage_tokens = record.usage_tokens,
            "Extraction stored"
        );

        self.store.put_extraction(item_key, record);
        Ok(())
    }

    /// Accounts a completed recommendation call and stores its records.
    ///
    /// Recommendations are keyed by upload name, not by extracted title, so
    /// two uploads recognized as the same painting keep separate lists.
    pub fn record_recommendations(
        &mut self,
        item_key: &str,
        recommendations: Recommendations,
    ) -> Result<()> {
        self.item(item_key)?;
        self.cost.charge(
            CallKind::Recommendation,
            recommendations.usage_tokens,
            &self.prices,
        )?;

        tracing::info!(
            target: TRACING_TARGET_SESSION,
            item = item_key,
            count = recommendations.records.len(),
            usage_tokens = recommendations.usage_tokens,
            "Recommendations stored"
        );

        self.store
            .put_recommendations(item_key, recommendations.records);
        Ok(())
    }

    /// Returns the latest extraction for an upload.
    pub fn extraction(&self, item_key: &str) -> Option<&ExtractionRecord> {
        self.store.get_extraction(item_key)
    }

    /// Returns the latest extraction for an upload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownItem`] or [`Error::NotExtracted`].
    pub fn require_extraction(&self, item_key: &str) -> Result<&ExtractionRecord> {
        self.item(item_key)?;
        self.extraction(item_key)
            .ok_or_else(|| Error::NotExtracted(item_key.to_string()))
    }

    /// Returns the latest recommendations for an upload.
    pub fn recommendations(&self, item_key: &str) -> Option<&[RecommendationRecord]> {
        self.store.get_recommendations(item_key)
    }

    /// Returns every extracted upload in upload order with its results.
    pub fn extracted_items(
        &self,
    ) -> impl Iterator<Item = (&UploadedItem, &ExtractionRecord, Option<&[RecommendationRecord]>)>
    {
        self.items.iter().filter_map(|item| {
            let record = self.store.get_extraction(item.name())?;
            Some((item, record, self.store.get_recommendations(item.name())))
        })
    }

    /// Returns the result store.
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Returns the cost accumulator.
    pub fn cost(&self) -> &CostAccumulator {
        &self.cost
    }

    /// Clears uploads, results and cost. Credentials and prices are kept.
    pub fn reset(&mut self) {
        self.items.clear();
        self.store.clear();
        self.cost.reset();

        tracing::info!(
            target: TRACING_TARGET_SESSION,
            session_id = %self.session_id,
            "Session reset"
        );
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PriceTable::default())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use secrecy::ExposeSecret;

    use super::*;

    fn record(title: &str, usage_tokens: u32) -> ExtractionRecord {
        ExtractionRecord {
            title: title.into(),
            author: "Pablo Picasso".into(),
            year: 1937,
            description: "A mural.".into(),
            usage_tokens,
        }
    }

    fn recommendations(titles: &[&str], usage_tokens: u32) -> Recommendations {
        Recommendations {
            records: titles
                .iter()
                .map(|title| RecommendationRecord {
                    title: (*title).into(),
                    author: "Francisco Goya".into(),
                    year: 1814,
                    usage_tokens,
                })
                .collect(),
            usage_tokens,
        }
    }

    fn session_with(names: &[&str]) -> Session {
        let mut session = Session::default();
        session.replace_uploads(
            names
                .iter()
                .map(|name| UploadedItem::new(*name, vec![0u8; 4]))
                .collect(),
        );
        session
    }

    #[test]
    fn test_record_extraction_charges_image_price() {
        let mut session = session_with(&["guernica.png"]);
        session
            .record_extraction("guernica.png", record("Guernica", 1200))
            .unwrap();
        session
            .record_recommendations("guernica.png", recommendations(&["The Third of May"], 50))
            .unwrap();

        assert_eq!(session.cost().total(), BigDecimal::from_str("0.0095").unwrap());
        assert_eq!(session.extraction("guernica.png").unwrap().title, "Guernica");
        assert_eq!(session.recommendations("guernica.png").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_item_is_rejected_without_charge() {
        let mut session = session_with(&["a.png"]);
        let err = session
            .record_extraction("b.png", record("B", 100))
            .unwrap_err();

        assert!(matches!(err, Error::UnknownItem(name) if name == "b.png"));
        assert_eq!(session.cost().call_count(), 0);
    }

    #[test]
    fn test_same_title_does_not_collide() {
        let mut session = session_with(&["a.png", "b.png"]);
        session.record_extraction("a.png", record("Guernica", 1)).unwrap();
        session.record_extraction("b.png", record("Guernica", 1)).unwrap();
        session
            .record_recommendations("a.png", recommendations(&["First"], 1))
            .unwrap();
        session
            .record_recommendations("b.png", recommendations(&["Second"], 1))
            .unwrap();

        assert_eq!(session.recommendations("a.png").unwrap()[0].title, "First");
        assert_eq!(session.recommendations("b.png").unwrap()[0].title, "Second");
    }

    #[test]
    fn test_replace_uploads_keeps_surviving_results() {
        let mut session = session_with(&["a.png", "b.png"]);
        session.record_extraction("a.png", record("A", 1)).unwrap();
        session.record_extraction("b.png", record("B", 1)).unwrap();

        session.replace_uploads(vec![
            UploadedItem::new("b.png", vec![1u8]),
            UploadedItem::new("c.png", vec![2u8]),
        ]);

        assert!(session.extraction("a.png").is_none());
        assert!(session.extraction("b.png").is_some());
        assert_eq!(session.items().len(), 2);
    }

    #[test]
    fn test_add_upload_replaces_same_name() {
        let mut session = session_with(&["a.png"]);
        session.record_extraction("a.png", record("A", 1)).unwrap();
        session.add_upload(UploadedItem::new("a.png", vec![9u8]));

        assert_eq!(session.items().len(), 1);
        assert!(session.extraction("a.png").is_none());
        assert!(matches!(
            session.require_extraction("a.png"),
            Err(Error::NotExtracted(_))
        ));
    }

    #[test]
    fn test_extracted_items_follow_upload_order() {
        let mut session = session_with(&["c.png", "a.png", "b.png"]);
        session.record_extraction("b.png", record("B", 1)).unwrap();
        session.record_extraction("c.png", record("C", 1)).unwrap();

        let names: Vec<_> = session
            .extracted_items()
            .map(|(item, _, _)| item.name())
            .collect();
        assert_eq!(names, ["c.png", "b.png"]);
    }

    #[test]
    fn test_reset_clears_state_but_keeps_credentials() {
        let mut session = session_with(&["a.png"])
            .with_credentials(Credentials::new(Some("sk-test".into()), None));
        session.record_extraction("a.png", record("A", 1000)).unwrap();

        session.reset();

        assert!(session.items().is_empty());
        assert!(session.store().is_empty());
        assert_eq!(session.cost().call_count(), 0);
        assert_eq!(
            session.require_openai_api_key().unwrap().expose_secret(),
            "sk-test"
        );
    }

    #[test]
    fn test_missing_credentials() {
        let session = Session::default()
            .with_credentials(Credentials::new(Some("   ".into()), None));
        assert!(session.require_openai_api_key().unwrap_err().is_missing_credential());
        assert!(session.require_tinify_api_key().unwrap_err().is_missing_credential());
    }
}
