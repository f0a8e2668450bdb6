use crate::{AliasRule, SearchConfig};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeSet;
use std::collections::btree_set;

static DEFAULT_EXPANDER: Lazy<QueryExpander> =
    Lazy::new(|| QueryExpander::from_config(SearchConfig::embedded()));

/// OR-matched search terms derived from one raw query.
///
/// An empty set means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchTerms(BTreeSet<String>);

impl SearchTerms {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.0.contains(term)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }

    /// True when any term occurs in the already lower-cased `haystack`.
    pub fn matches(&self, haystack: &str) -> bool {
        self.0.iter().any(|term| haystack.contains(term.as_str()))
    }
}

impl<S: Into<String>> FromIterator<S> for SearchTerms {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a SearchTerms {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Expands lay terms into the domain vocabulary of the dataset.
#[derive(Debug, Clone, Default)]
pub struct QueryExpander {
    rules: Vec<AliasRule>,
}

impl QueryExpander {
    pub fn new(rules: impl IntoIterator<Item = AliasRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| AliasRule {
                alias: rule.alias.trim().to_lowercase(),
                synonyms: rule
                    .synonyms
                    .iter()
                    .map(|synonym| synonym.trim().to_lowercase())
                    .filter(|synonym| !synonym.is_empty())
                    .collect(),
            })
            .filter(|rule| !rule.alias.is_empty())
            .collect();
        Self { rules }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.aliases.iter().cloned())
    }

    pub fn expand(&self, raw: &str) -> SearchTerms {
        let query = raw.trim().to_lowercase();
        if query.is_empty() {
            return SearchTerms::default();
        }

        let mut terms = BTreeSet::new();
        for token in query.split_whitespace() {
            terms.insert(token.to_string());
        }
        for rule in &self.rules {
            if query.contains(rule.alias.as_str()) {
                terms.extend(rule.synonyms.iter().cloned());
            }
        }
        terms.insert(query);
        SearchTerms(terms)
    }
}

/// Expands with the alias table shipped in `data/search.json`.
pub fn expand(raw: &str) -> SearchTerms {
    DEFAULT_EXPANDER.expand(raw)
}
