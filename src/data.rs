use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::slice;

pub const SEARCH_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_CITATION_PATTERN: &str = r"(?i)\[cite[^\]]*\]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub label_nl: String,
    pub label_fr: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub related_definitions: Vec<String>,
    #[serde(default)]
    pub related_contacts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub term_fr: String,
    pub term_nl: String,
    pub uitleg: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub naam: String,
    pub nummer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub details: String,
    pub tijden: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryLink {
    pub naam: String,
    pub url: String,
    pub uitleg: String,
}

/// A record together with the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry<T> {
    pub key: String,
    #[serde(flatten)]
    pub record: T,
}

/// Keyed records in document order.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    entries: Vec<Entry<T>>,
    index: HashMap<String, usize>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record; replacing an existing key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, record: T) -> Option<T> {
        let key = key.into();
        if let Some(&position) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[position].record, record));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(Entry { key, record });
        None
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entry(key).map(|entry| &entry.record)
    }

    pub fn entry(&self, key: &str) -> Option<&Entry<T>> {
        self.index
            .get(key)
            .and_then(|&position| self.entries.get(position))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> slice::Iter<'_, Entry<T>> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut collection = Self::new();
        for (key, record) in iter {
            collection.insert(key, record);
        }
        collection
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a Entry<T>;
    type IntoIter = slice::Iter<'a, Entry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Serialize> Serialize for Collection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.record)?;
        }
        map.end()
    }
}

/// The four read-only collections the dashboard is built from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContentStore {
    pub(crate) categories: Vec<Category>,
    pub(crate) definitions: Collection<Definition>,
    #[serde(rename = "contacten")]
    pub(crate) contacts: Collection<Contact>,
    #[serde(rename = "annuaires")]
    pub(crate) directories: Collection<DirectoryLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub collection: &'static str,
    pub key: String,
    pub reason: String,
}

/// Records the loader dropped instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub skipped: Vec<SkippedRecord>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    categories: Vec<Value>,
    #[serde(default)]
    definitions: Map<String, Value>,
    #[serde(default, alias = "contacts")]
    contacten: Map<String, Value>,
    #[serde(default, alias = "directories")]
    annuaires: Map<String, Value>,
}

impl ContentStore {
    pub fn from_parts(
        categories: Vec<Category>,
        definitions: Collection<Definition>,
        contacts: Collection<Contact>,
        directories: Collection<DirectoryLink>,
    ) -> Self {
        Self {
            categories,
            definitions,
            contacts,
            directories,
        }
    }

    /// Parses a dataset document. Only a document that is not a JSON object of
    /// the expected top-level shape is an error; individual records that miss a
    /// required field are dropped and listed in the report.
    pub fn parse_json(input: &str) -> Result<(Self, LoadReport), serde_json::Error> {
        let raw: RawDocument = serde_json::from_str(input)?;
        let mut report = LoadReport::default();

        let mut categories: Vec<Category> = Vec::with_capacity(raw.categories.len());
        for (position, value) in raw.categories.into_iter().enumerate() {
            let key = value
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| format!("#{position}"));
            match serde_json::from_value::<Category>(value) {
                Ok(category) if categories.iter().any(|seen| seen.id == category.id) => {
                    report.skipped.push(SkippedRecord {
                        collection: "categories",
                        key,
                        reason: "duplicate category id".to_string(),
                    });
                }
                Ok(category) => categories.push(category),
                Err(err) => report.skipped.push(SkippedRecord {
                    collection: "categories",
                    key,
                    reason: err.to_string(),
                }),
            }
        }

        let definitions = parse_keyed(raw.definitions, "definitions", &mut report);
        let contacts = parse_keyed(raw.contacten, "contacten", &mut report);
        let directories = parse_keyed(raw.annuaires, "annuaires", &mut report);

        Ok((
            Self {
                categories,
                definitions,
                contacts,
                directories,
            },
            report,
        ))
    }
}

fn parse_keyed<T>(
    raw: Map<String, Value>,
    collection: &'static str,
    report: &mut LoadReport,
) -> Collection<T>
where
    T: for<'de> Deserialize<'de>,
{
    let mut parsed = Collection::new();
    for (key, value) in raw {
        match serde_json::from_value::<T>(value) {
            Ok(record) => {
                parsed.insert(key, record);
            }
            Err(err) => report.skipped.push(SkippedRecord {
                collection,
                key,
                reason: err.to_string(),
            }),
        }
    }
    parsed
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    pub alias: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// Versioned search settings shipped next to the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub version: u32,
    #[serde(default = "default_citation_pattern")]
    pub citation_pattern: String,
    #[serde(default)]
    pub aliases: Vec<AliasRule>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            version: SEARCH_CONFIG_VERSION,
            citation_pattern: default_citation_pattern(),
            aliases: Vec::new(),
        }
    }
}

fn default_citation_pattern() -> String {
    DEFAULT_CITATION_PATTERN.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_document_order_and_skips_malformed_records() {
        let input = r#"{
            "categories": [
                {"id": "b", "label_nl": "B", "label_fr": "B"},
                {"id": "a", "label_nl": "A"},
                {"id": "b", "label_nl": "B2", "label_fr": "B2"}
            ],
            "definitions": {
                "zeta": {"term_fr": "z", "term_nl": "z", "uitleg": "z", "url": "https://z"},
                "alpha": {"term_fr": "a", "uitleg": "a", "url": "https://a"},
                "mu": {"term_fr": "m", "term_nl": "m", "uitleg": "m", "url": "https://m"}
            },
            "contacts": {
                "samu": {"naam": "SAMU", "nummer": "15", "details": "", "tijden": "24/7"}
            }
        }"#;
        let (store, report) = ContentStore::parse_json(input).unwrap();

        assert_eq!(store.categories.len(), 1);
        assert_eq!(store.categories[0].id, "b");
        assert_eq!(store.definitions.keys().collect::<Vec<_>>(), ["zeta", "mu"]);
        assert!(store.contacts.get("samu").unwrap().email.is_none());
        assert!(store.directories.is_empty());

        let skipped: Vec<_> = report
            .skipped
            .iter()
            .map(|record| (record.collection, record.key.as_str()))
            .collect();
        assert_eq!(
            skipped,
            [("categories", "a"), ("categories", "b"), ("definitions", "alpha")]
        );
    }

    #[test]
    fn parse_rejects_non_object_documents() {
        assert!(ContentStore::parse_json("[1, 2, 3]").is_err());
    }

    #[test]
    fn collection_replacement_keeps_position() {
        let mut collection: Collection<u32> = [("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(collection.insert("x", 10), Some(1));
        assert_eq!(collection.keys().collect::<Vec<_>>(), ["x", "y"]);
        assert_eq!(collection.get("x"), Some(&10));
    }

    #[test]
    fn serialized_store_parses_back_without_loss() {
        let mut definitions = Collection::new();
        definitions.insert(
            "apa",
            Definition {
                term_fr: "APA".into(),
                term_nl: "Persoonlijke autonomietoelage".into(),
                uitleg: "Toelage".into(),
                url: "https://example.org/apa".into(),
            },
        );
        let store =
            ContentStore::from_parts(Vec::new(), definitions, Collection::new(), Collection::new());
        let json = serde_json::to_string(&store).unwrap();
        let (parsed, report) = ContentStore::parse_json(&json).unwrap();
        assert!(report.is_clean());
        assert_eq!(parsed.definitions.get("apa"), store.definitions.get("apa"));
    }
}
