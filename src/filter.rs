//! Union filters over the keyed collections.
//!
//! Each searchable record type declares an ordered table of field accessors.
//! The haystack of an entry is the normalized, non-empty field values joined
//! by a single space and lower-cased; an entry survives when any search term
//! is a substring of it.

use crate::text::{Normalizer, default_normalizer};
use crate::{Collection, Contact, Definition, DirectoryLink, Entry, SearchTerms};

pub type FieldAccessor<T> = for<'a> fn(&'a Entry<T>) -> Option<&'a str>;

pub trait Searchable: Sized + 'static {
    const SEARCH_FIELDS: &'static [FieldAccessor<Self>];
}

impl Searchable for Definition {
    const SEARCH_FIELDS: &'static [FieldAccessor<Self>] = &[
        |entry| Some(entry.key.as_str()),
        |entry| Some(entry.record.term_nl.as_str()),
        |entry| Some(entry.record.term_fr.as_str()),
        |entry| Some(entry.record.uitleg.as_str()),
        |entry| Some(entry.record.url.as_str()),
    ];
}

impl Searchable for Contact {
    const SEARCH_FIELDS: &'static [FieldAccessor<Self>] = &[
        |entry| Some(entry.key.as_str()),
        |entry| Some(entry.record.naam.as_str()),
        |entry| Some(entry.record.nummer.as_str()),
        |entry| entry.record.email.as_deref(),
        |entry| Some(entry.record.details.as_str()),
        |entry| Some(entry.record.tijden.as_str()),
    ];
}

impl Searchable for DirectoryLink {
    const SEARCH_FIELDS: &'static [FieldAccessor<Self>] = &[
        |entry| Some(entry.key.as_str()),
        |entry| Some(entry.record.naam.as_str()),
        |entry| Some(entry.record.uitleg.as_str()),
        |entry| Some(entry.record.url.as_str()),
    ];
}

pub fn haystack<T: Searchable>(normalizer: &Normalizer, entry: &Entry<T>) -> String {
    T::SEARCH_FIELDS
        .iter()
        .map(|field| normalizer.normalize(field(entry)))
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Entries of `collection` matching any of `terms`, in collection order.
/// Empty `terms` keeps everything.
pub fn filter_with<'a, T: Searchable>(
    normalizer: &Normalizer,
    collection: &'a Collection<T>,
    terms: &SearchTerms,
) -> Vec<&'a Entry<T>> {
    if terms.is_empty() {
        return collection.iter().collect();
    }
    collection
        .iter()
        .filter(|entry| terms.matches(&haystack(normalizer, entry)))
        .collect()
}

pub fn filter_definitions<'a>(
    definitions: &'a Collection<Definition>,
    terms: &SearchTerms,
) -> Vec<&'a Entry<Definition>> {
    filter_with(default_normalizer(), definitions, terms)
}

pub fn filter_contacts<'a>(
    contacts: &'a Collection<Contact>,
    terms: &SearchTerms,
) -> Vec<&'a Entry<Contact>> {
    filter_with(default_normalizer(), contacts, terms)
}

pub fn filter_directories<'a>(
    directories: &'a Collection<DirectoryLink>,
    terms: &SearchTerms,
) -> Vec<&'a Entry<DirectoryLink>> {
    filter_with(default_normalizer(), directories, terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(term_nl: &str, uitleg: &str) -> Definition {
        Definition {
            term_fr: String::new(),
            term_nl: term_nl.to_string(),
            uitleg: uitleg.to_string(),
            url: "https://example.org".to_string(),
        }
    }

    fn contact(naam: &str, nummer: &str, email: Option<&str>) -> Contact {
        Contact {
            naam: naam.to_string(),
            nummer: nummer.to_string(),
            email: email.map(str::to_string),
            details: String::new(),
            tijden: "24/7".to_string(),
        }
    }

    fn sample_definitions() -> Collection<Definition> {
        [
            ("gir", definition("Zorgzwaarte", "Zes groepen van afhankelijkheid.")),
            ("apa", definition("Persoonlijke autonomietoelage", "Toelage van het departement.")),
            ("ssiad", definition("Thuisverpleging", "Betaald door de ziekteverzekering.")),
            ("saad", definition("Hulp aan huis", "Kan betaald worden met de APA.")),
        ]
        .into_iter()
        .collect()
    }

    fn keys<T>(entries: &[&Entry<T>]) -> Vec<String> {
        entries.iter().map(|entry| entry.key.clone()).collect()
    }

    #[test]
    fn empty_terms_return_everything_in_order() {
        let definitions = sample_definitions();
        let filtered = filter_definitions(&definitions, &SearchTerms::default());
        assert_eq!(keys(&filtered), ["gir", "apa", "ssiad", "saad"]);
    }

    #[test]
    fn apa_matches_key_and_explanations_mentioning_it() {
        let definitions = sample_definitions();
        let terms: SearchTerms = ["apa"].into_iter().collect();
        let filtered = filter_definitions(&definitions, &terms);
        assert_eq!(keys(&filtered), ["apa", "saad"]);
        assert_eq!(filtered[0].record.term_nl, "Persoonlijke autonomietoelage");
    }

    #[test]
    fn contacts_filter_is_a_union() {
        let contacts: Collection<Contact> = [
            ("samu", contact("SAMU", "15", None)),
            ("europe", contact("Europees noodnummer", "112", None)),
            ("police", contact("Politie", "17", None)),
        ]
        .into_iter()
        .collect();
        let terms: SearchTerms = ["samu", "112"].into_iter().collect();
        let filtered = filter_contacts(&contacts, &terms);
        assert_eq!(keys(&filtered), ["samu", "europe"]);
    }

    #[test]
    fn optional_email_is_searchable_when_present() {
        let contacts: Collection<Contact> = [
            ("a", contact("Meldpunt", "39 77", Some("contact@3977.fr"))),
            ("b", contact("Luisterlijn", "0 800", None)),
        ]
        .into_iter()
        .collect();
        let terms: SearchTerms = ["3977.fr"].into_iter().collect();
        assert_eq!(keys(&filter_contacts(&contacts, &terms)), ["a"]);
    }

    #[test]
    fn haystack_is_normalized_and_lower_cased() {
        let entry = Entry {
            key: "clic".to_string(),
            record: DirectoryLink {
                naam: "Annuaire  CLIC".to_string(),
                url: "https://example.org/CLIC".to_string(),
                uitleg: "Lokaal [cite: 4] loket".to_string(),
            },
        };
        assert_eq!(
            haystack(&Normalizer::default(), &entry),
            "clic annuaire clic lokaal loket https://example.org/clic"
        );
    }

    #[test]
    fn citation_markers_never_match() {
        let directories: Collection<DirectoryLink> = [(
            "x",
            DirectoryLink {
                naam: "Annuaire".to_string(),
                url: "https://example.org".to_string(),
                uitleg: "Tekst [cite: 99]".to_string(),
            },
        )]
        .into_iter()
        .collect();
        let terms: SearchTerms = ["cite"].into_iter().collect();
        assert!(filter_directories(&directories, &terms).is_empty());
    }

    #[test]
    fn filtering_leaves_the_source_untouched() {
        let definitions = sample_definitions();
        let before = definitions.clone();
        let terms: SearchTerms = ["huis"].into_iter().collect();
        let filtered = filter_definitions(&definitions, &terms);
        assert_eq!(keys(&filtered), ["ssiad", "saad"]);
        assert_eq!(
            definitions.iter().collect::<Vec<_>>(),
            before.iter().collect::<Vec<_>>()
        );
    }
}
