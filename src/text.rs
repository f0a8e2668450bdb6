use crate::SearchConfig;
use crate::data::DEFAULT_CITATION_PATTERN;
use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

const MAX_STRIP_PASSES: usize = 8;
const TRANSLATE_PREFIX: &str = "https://translate.google.com/translate?sl=auto&tl=nl&u=";

/// Everything `encodeURIComponent` escapes.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static DEFAULT_NORMALIZER: Lazy<Normalizer> = Lazy::new(|| {
    Normalizer::from_config(SearchConfig::embedded())
        .expect("embedded citation pattern was validated by build.rs")
});

/// Cleans display strings: citation markers out, whitespace collapsed.
#[derive(Debug, Clone)]
pub struct Normalizer {
    citation: Regex,
}

impl Normalizer {
    pub fn new(citation_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            citation: Regex::new(citation_pattern)?,
        })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, regex::Error> {
        Self::new(&config.citation_pattern)
    }

    /// Missing input yields an empty string. Marker removal repeats until no
    /// marker is left, so the result is a fixed point.
    pub fn normalize(&self, input: Option<&str>) -> String {
        let Some(input) = input else {
            return String::new();
        };
        let mut current = collapse_whitespace(input);
        for _ in 0..MAX_STRIP_PASSES {
            if !self.citation.is_match(&current) {
                break;
            }
            let stripped = collapse_whitespace(&self.citation.replace_all(&current, " "));
            if stripped == current {
                break;
            }
            current = stripped;
        }
        current
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_CITATION_PATTERN).expect("default citation pattern compiles")
    }
}

pub(crate) fn default_normalizer() -> &'static Normalizer {
    &DEFAULT_NORMALIZER
}

/// Normalizes with the citation pattern shipped in `data/search.json`.
pub fn normalize(input: Option<&str>) -> String {
    DEFAULT_NORMALIZER.normalize(input)
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Percent-encodes `value` the way `encodeURIComponent` does.
pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Link that opens `url` machine-translated into Dutch.
pub fn dutch_reading_link(url: &str) -> String {
    format!("{TRANSLATE_PREFIX}{}", encode_uri_component(url))
}
