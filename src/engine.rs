use crate::filter::filter_with;
use crate::text::Normalizer;
use crate::{
    Contact, ContentStore, Definition, DirectoryLink, Entry, LoadError, NavigationState,
    QueryExpander, SEARCH_CONFIG_VERSION, SearchConfig, SearchTerms, View,
};
use once_cell::sync::Lazy;
use serde::Serialize;

static EMBEDDED_ENGINE: Lazy<SearchEngine<'static>> = Lazy::new(|| {
    SearchEngine::new(ContentStore::embedded(), SearchConfig::embedded())
        .expect("embedded search config was validated by build.rs")
});

/// Store plus the search configuration that applies to it.
#[derive(Debug, Clone)]
pub struct SearchEngine<'s> {
    store: &'s ContentStore,
    expander: QueryExpander,
    normalizer: Normalizer,
}

impl<'s> SearchEngine<'s> {
    pub fn new(store: &'s ContentStore, config: &SearchConfig) -> Result<Self, LoadError> {
        if config.version != SEARCH_CONFIG_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: config.version,
                expected: SEARCH_CONFIG_VERSION,
            });
        }
        Ok(Self {
            store,
            expander: QueryExpander::from_config(config),
            normalizer: Normalizer::from_config(config)?,
        })
    }

    pub fn store(&self) -> &'s ContentStore {
        self.store
    }

    pub fn expand(&self, query: &str) -> SearchTerms {
        self.expander.expand(query)
    }

    pub fn normalize(&self, input: Option<&str>) -> String {
        self.normalizer.normalize(input)
    }

    pub fn definitions(&self, terms: &SearchTerms) -> Vec<&'s Entry<Definition>> {
        filter_with(&self.normalizer, self.store.definitions(), terms)
    }

    pub fn contacts(&self, terms: &SearchTerms) -> Vec<&'s Entry<Contact>> {
        filter_with(&self.normalizer, self.store.contacts(), terms)
    }

    pub fn directories(&self, terms: &SearchTerms) -> Vec<&'s Entry<DirectoryLink>> {
        filter_with(&self.normalizer, self.store.directories(), terms)
    }

    pub fn search(&self, query: &str) -> SearchResults<'s> {
        let terms = self.expand(query);
        let results = SearchResults {
            query: query.trim().to_string(),
            definitions: self.definitions(&terms),
            contacts: self.contacts(&terms),
            directories: self.directories(&terms),
            terms,
        };
        tracing::debug!(
            query = %results.query,
            terms = results.terms.len(),
            definitions = results.definitions.len(),
            contacts = results.contacts.len(),
            directories = results.directories.len(),
            "search evaluated"
        );
        results
    }

    /// Filtered collections for whatever the state currently has typed.
    pub fn results_for(&self, state: &NavigationState) -> SearchResults<'s> {
        self.search(state.search_text())
    }
}

impl SearchEngine<'static> {
    /// Engine over the dataset and search config compiled into the binary.
    pub fn embedded() -> &'static SearchEngine<'static> {
        &EMBEDDED_ENGINE
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<'a> {
    pub query: String,
    pub terms: SearchTerms,
    pub definitions: Vec<&'a Entry<Definition>>,
    pub contacts: Vec<&'a Entry<Contact>>,
    pub directories: Vec<&'a Entry<DirectoryLink>>,
}

impl SearchResults<'_> {
    pub fn total(&self) -> usize {
        self.definitions.len() + self.contacts.len() + self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// First list view with hits, checked glossary, contacts, directories.
    pub fn best_view(&self) -> Option<View> {
        if !self.definitions.is_empty() {
            Some(View::Glossary)
        } else if !self.contacts.is_empty() {
            Some(View::Contacts)
        } else if !self.directories.is_empty() {
            Some(View::Directories)
        } else {
            None
        }
    }
}
