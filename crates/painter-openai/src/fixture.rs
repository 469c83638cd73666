//! Offline extraction from a JSON fixture file.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use painter_core::types::{ExtractionRecord, UploadedItem, is_valid_year};
use serde::Deserialize;

use crate::{Error, Result, TRACING_TARGET_SERVICE};

#[derive(Debug, Clone, Deserialize)]
struct FixtureEntry {
    /// Upload name the entry belongs to. Unnamed entries are handed out in
    /// order.
    #[serde(default)]
    name: Option<String>,
    title: String,
    author: String,
    year: i32,
    #[serde(alias = "description_of_historical_event_in_3_sentences")]
    description: String,
    #[serde(default)]
    usage_tokens: u32,
}

impl FixtureEntry {
    fn to_record(&self) -> ExtractionRecord {
        ExtractionRecord {
            title: self.title.clone(),
            author: self.author.clone(),
            year: self.year,
            description: self.description.clone(),
            usage_tokens: self.usage_tokens,
        }
    }
}

/// Replays extraction records from a JSON array instead of calling a model.
///
/// Each entry has the extraction fields and optionally a `name` and
/// `usage_tokens`. An upload gets the entry with its name; otherwise the next
/// unassigned unnamed entry. An assignment sticks to the upload name, so
/// extracting the same upload again replays the same entry.
#[derive(Debug)]
pub struct FixtureExtractor {
    entries: Vec<FixtureEntry>,
    /// Upload name to index among the unnamed entries.
    assigned: Mutex<HashMap<String, usize>>,
}

impl FixtureExtractor {
    /// Parses fixture entries from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not an array of entries or an entry
    /// has an invalid year.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<FixtureEntry> = serde_json::from_str(json)?;

        if let Some(bad) = entries.iter().find(|entry| !is_valid_year(entry.year)) {
            return Err(Error::validation(format!(
                "fixture entry '{}' has year {}",
                bad.title, bad.year
            )));
        }

        Ok(Self {
            entries,
            assigned: Mutex::new(HashMap::new()),
        })
    }

    /// Reads fixture entries from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let fixture = Self::from_json(&json)?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            path = %path.display(),
            entries = fixture.len(),
            "Fixture loaded"
        );

        Ok(fixture)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, name: &str) -> Option<&FixtureEntry> {
        if let Some(entry) = self
            .entries
            .iter()
            .find(|entry| entry.name.as_deref() == Some(name))
        {
            return Some(entry);
        }

        let mut assigned = self.assigned.lock().unwrap_or_else(PoisonError::into_inner);
        let position = match assigned.get(name) {
            Some(position) => *position,
            None => assigned.len(),
        };

        let entry = self
            .entries
            .iter()
            .filter(|entry| entry.name.is_none())
            .nth(position)?;
        assigned.entry(name.to_string()).or_insert(position);
        Some(entry)
    }
}

#[async_trait::async_trait]
impl painter_core::MetadataExtractor for FixtureExtractor {
    async fn extract(&self, item: &UploadedItem) -> painter_core::Result<ExtractionRecord> {
        let entry = self.lookup(item.name()).ok_or_else(|| {
            painter_core::Error::external(
                "fixture",
                format!("no fixture entry for '{}'", item.name()),
            )
        })?;

        tracing::debug!(
            target: TRACING_TARGET_SERVICE,
            item = item.name(),
            title = %entry.title,
            "Replaying fixture entry"
        );

        Ok(entry.to_record())
    }
}

#[cfg(test)]
mod tests {
    use painter_core::MetadataExtractor;

    use super::*;

    const FIXTURE: &str = r#"[
        {
            "title": "Guernica",
            "author": "Pablo Picasso",
            "year": 1937,
            "description_of_historical_event_in_3_sentences": "The bombing of Guernica."
        },
        {
            "name": "liberty.jpg",
            "title": "Liberty Leading the People",
            "author": "Eugene Delacroix",
            "year": 1830,
            "description": "The July Revolution.",
            "usage_tokens": 900
        },
        {
            "title": "The Raft of the Medusa",
            "author": "Theodore Gericault",
            "year": 1819,
            "description": "A shipwreck."
        }
    ]"#;

    fn item(name: &str) -> UploadedItem {
        UploadedItem::new(name, vec![0u8; 4])
    }

    #[tokio::test]
    async fn test_named_entry_wins_then_position() {
        let fixture = FixtureExtractor::from_json(FIXTURE).unwrap();
        assert_eq!(fixture.len(), 3);

        let liberty = fixture.extract(&item("liberty.jpg")).await.unwrap();
        assert_eq!(liberty.author, "Eugene Delacroix");
        assert_eq!(liberty.usage_tokens, 900);

        let first = fixture.extract(&item("a.png")).await.unwrap();
        assert_eq!(first.title, "Guernica");
        assert_eq!(first.description, "The bombing of Guernica.");
        assert_eq!(first.usage_tokens, 0);

        let second = fixture.extract(&item("b.png")).await.unwrap();
        assert_eq!(second.title, "The Raft of the Medusa");

        let err = fixture.extract(&item("c.png")).await.unwrap_err();
        assert!(err.is_external());
    }

    #[tokio::test]
    async fn test_same_upload_replays_same_entry() {
        let fixture = FixtureExtractor::from_json(FIXTURE).unwrap();

        let first = fixture.extract(&item("a.png")).await.unwrap();
        let again = fixture.extract(&item("a.png")).await.unwrap();
        assert_eq!(first, again);
        assert_eq!(again.title, "Guernica");

        let other = fixture.extract(&item("b.png")).await.unwrap();
        assert_eq!(other.title, "The Raft of the Medusa");
        assert_eq!(fixture.extract(&item("b.png")).await.unwrap(), other);

        // An upload without an entry does not use up a slot.
        assert!(fixture.extract(&item("c.png")).await.is_err());
        assert_eq!(fixture.extract(&item("a.png")).await.unwrap(), first);
    }

    #[test]
    fn test_invalid_fixture() {
        assert!(FixtureExtractor::from_json("{}").is_err());
        assert!(
            FixtureExtractor::from_json(
                r#"[{"title": "x", "author": "y", "year": 12, "description": "z"}]"#
            )
            .is_err()
        );
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.json");
        std::fs::write(&path, FIXTURE).unwrap();

        let fixture = FixtureExtractor::load(&path).await.unwrap();
        assert!(!fixture.is_empty());
    }
}
