mod data;
mod engine;
mod error;
pub mod filter;
pub mod navigation;
mod query;
pub mod session;
mod text;
#[cfg(feature = "web")]
pub mod web;

pub use data::{
    AliasRule, Category, Collection, Contact, ContentStore, DEFAULT_CITATION_PATTERN,
    Definition, DirectoryLink, Entry, LoadReport, SEARCH_CONFIG_VERSION, SearchConfig,
    SkippedRecord,
};
pub use engine::{SearchEngine, SearchResults};
pub use error::LoadError;
pub use filter::{filter_contacts, filter_definitions, filter_directories};
pub use navigation::{NavigationState, Transition, View};
pub use query::{QueryExpander, SearchTerms, expand};
pub use text::{Normalizer, dutch_reading_link, encode_uri_component, normalize};

use once_cell::sync::Lazy;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::str;
use tracing::{debug, info, warn};
use zstd::stream::decode_all;

/// Contacts shown in the overview's emergency panel, in display order.
pub const EMERGENCY_CONTACT_KEYS: [&str; 4] = ["samu", "urgence_europe", "police", "pompiers"];

static STORE_BYTES: &[u8] = include_bytes!(env!("ZORGKOMPAS_EMBEDDED_DATA"));
static SEARCH_CONFIG_BYTES: &[u8] = include_bytes!(env!("ZORGKOMPAS_EMBEDDED_SEARCH_CONFIG"));

static EMBEDDED_STORE: Lazy<ContentStore> = Lazy::new(|| {
    let decompressed = decode_all(Cursor::new(STORE_BYTES)).expect("decompress embedded dataset");
    let text = str::from_utf8(&decompressed).expect("embedded dataset is valid UTF-8");
    let (store, _) =
        ContentStore::parse_json(text).expect("embedded dataset was validated by build.rs");
    store
});
static EMBEDDED_SEARCH_CONFIG: Lazy<SearchConfig> = Lazy::new(|| {
    serde_json::from_slice(SEARCH_CONFIG_BYTES)
        .expect("embedded search config was validated by build.rs")
});

impl ContentStore {
    /// The dataset compiled into the binary from `data/zorgdata.json`.
    pub fn embedded() -> &'static ContentStore {
        &EMBEDDED_STORE
    }

    /// Loads a dataset document from disk. Malformed records are skipped and
    /// logged; only unreadable or non-object documents fail.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (store, report) = ContentStore::parse_json(&raw)?;
        if !report.is_clean() {
            warn!(
                path = %path.display(),
                skipped = report.skipped.len(),
                "dataset contains malformed records"
            );
        }
        for skipped in &report.skipped {
            debug!(
                collection = skipped.collection,
                key = %skipped.key,
                reason = %skipped.reason,
                "skipping malformed record"
            );
        }
        info!(
            path = %path.display(),
            categories = store.categories.len(),
            definitions = store.definitions.len(),
            contacts = store.contacts.len(),
            directories = store.directories.len(),
            skipped = report.skipped.len(),
            "dataset loaded"
        );
        Ok(store)
    }

    /// Categories in display order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn definitions(&self) -> &Collection<Definition> {
        &self.definitions
    }

    pub fn contacts(&self) -> &Collection<Contact> {
        &self.contacts
    }

    pub fn directories(&self) -> &Collection<DirectoryLink> {
        &self.directories
    }

    /// The emergency numbers in [`EMERGENCY_CONTACT_KEYS`] order. Keys the
    /// dataset lacks are left out.
    pub fn emergency_contacts(&self) -> impl Iterator<Item = &Entry<Contact>> + '_ {
        EMERGENCY_CONTACT_KEYS
            .iter()
            .filter_map(|key| self.contacts.entry(key))
    }

    /// Definitions a category links to; unknown keys are left out.
    pub fn related_definitions<'a>(
        &'a self,
        category: &'a Category,
    ) -> impl Iterator<Item = &'a Entry<Definition>> + 'a {
        resolve(&self.definitions, &category.related_definitions, &category.id)
    }

    /// Contacts a category links to; unknown keys are left out.
    pub fn related_contacts<'a>(
        &'a self,
        category: &'a Category,
    ) -> impl Iterator<Item = &'a Entry<Contact>> + 'a {
        resolve(&self.contacts, &category.related_contacts, &category.id)
    }
}

fn resolve<'a, T>(
    collection: &'a Collection<T>,
    keys: &'a [String],
    category_id: &'a str,
) -> impl Iterator<Item = &'a Entry<T>> + 'a {
    keys.iter().filter_map(move |key| {
        let entry = collection.entry(key);
        if entry.is_none() {
            debug!(category = category_id, key = %key, "dangling reference skipped");
        }
        entry
    })
}

impl SearchConfig {
    /// The alias table and citation pattern compiled in from `data/search.json`.
    pub fn embedded() -> &'static SearchConfig {
        &EMBEDDED_SEARCH_CONFIG
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SearchConfig = serde_json::from_str(&raw)?;
        if config.version != SEARCH_CONFIG_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: config.version,
                expected: SEARCH_CONFIG_VERSION,
            });
        }
        Normalizer::from_config(&config)?;
        info!(
            path = %path.display(),
            aliases = config.aliases.len(),
            "search config loaded"
        );
        Ok(config)
    }
}
