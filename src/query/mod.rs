//! Query engine for bibliography entries
//!
//! Search takes an ordered sequence of entries and a list of raw term
//! strings. Every term must match for an entry to survive (AND semantics),
//! and the engine reports which substrings matched at which location so
//! callers can highlight them. Matching is case-insensitive; the matched
//! substrings keep the casing of the source text, not the query's.
//!
//! Terms are applied as an explicit fold over the candidate set, one term
//! at a time, instead of recursing per term.

pub mod term;

use crate::error::{Error, Result};
use crate::model::Entry;
use ahash::AHashMap;
use regex::Regex;
use std::collections::BTreeSet;

pub use term::SearchTerm;

/// Where and what a query matched inside one entry.
///
/// The structure mirrors the entry's shape: matched substrings for the
/// key, the type, and each field. A location only appears once something
/// matched there; an empty set under a field means a field-existence
/// query (`field:`) matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMatch {
    /// Substrings matched in the entry key
    pub key: BTreeSet<String>,
    /// Substrings matched in the entry type
    pub ty: BTreeSet<String>,
    /// Substrings matched per field
    pub fields: AHashMap<String, BTreeSet<String>>,
}

impl EntryMatch {
    /// True when nothing matched anywhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.ty.is_empty() && self.fields.is_empty()
    }

    /// Union another match into this one, location by location.
    fn union(&mut self, other: Self) {
        self.key.extend(other.key);
        self.ty.extend(other.ty);
        for (field, subs) in other.fields {
            self.fields.entry(field).or_default().extend(subs);
        }
    }

    /// Iterate over every matched substring, across all locations.
    pub fn substrings(&self) -> impl Iterator<Item = &str> {
        self.key
            .iter()
            .chain(self.ty.iter())
            .chain(self.fields.values().flatten())
            .map(String::as_str)
    }
}

/// An entry that satisfied a query, together with its match provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<'a> {
    /// The matching entry
    pub entry: &'a Entry,
    /// What matched where
    pub matched: EntryMatch,
}

/// A parsed term with its compiled matcher. An existence query
/// (`field:`) has no pattern.
struct TermMatcher {
    term: SearchTerm,
    pattern: Option<Regex>,
}

impl TermMatcher {
    fn new(raw: &str) -> Result<Self> {
        let term = SearchTerm::parse(raw);
        let pattern = if term.value().is_empty() {
            None
        } else {
            Some(term::compile_matcher(term.value())?)
        };
        Ok(Self { term, pattern })
    }

    /// Compute this term's match map for one entry, or `None` when the
    /// term does not match it.
    fn match_entry(&self, entry: &Entry) -> Option<EntryMatch> {
        let mut matched = EntryMatch::default();
        let holds = match (&self.term, &self.pattern) {
            (SearchTerm::General(_), Some(pattern)) => {
                let in_key = find_matches(pattern, entry.key(), &mut matched.key);
                let in_ty = find_matches(pattern, entry.ty(), &mut matched.ty);
                let mut in_fields = false;
                for field in entry.fields() {
                    let mut subs = BTreeSet::new();
                    if find_matches(pattern, &field.value, &mut subs) {
                        in_fields = true;
                        matched
                            .fields
                            .entry(field.name.clone())
                            .or_default()
                            .extend(subs);
                    }
                }
                in_key || in_ty || in_fields
            }
            (SearchTerm::Key(_), Some(pattern)) => {
                find_matches(pattern, entry.key(), &mut matched.key)
            }
            (SearchTerm::Field { name, .. }, pattern) => match name.as_str() {
                // Every bibliographic entry has a key and a type, so an
                // existence query on them always holds.
                "key" => pattern
                    .as_ref()
                    .map_or(true, |p| find_matches(p, entry.key(), &mut matched.key)),
                "type" => pattern
                    .as_ref()
                    .map_or(true, |p| find_matches(p, entry.ty(), &mut matched.ty)),
                _ => {
                    let mut found = false;
                    for field in entry.fields().iter().filter(|f| &f.name == name) {
                        match pattern {
                            // Existence query: the field being there is the
                            // match, recorded as an empty set.
                            None => {
                                matched.fields.entry(field.name.clone()).or_default();
                                found = true;
                            }
                            Some(pattern) => {
                                let mut subs = BTreeSet::new();
                                if find_matches(pattern, &field.value, &mut subs) {
                                    found = true;
                                    matched
                                        .fields
                                        .entry(field.name.clone())
                                        .or_default()
                                        .extend(subs);
                                }
                            }
                        }
                    }
                    found
                }
            },
            // A general or key term with an empty value matches nothing.
            (SearchTerm::General(_) | SearchTerm::Key(_), None) => false,
        };
        holds.then_some(matched)
    }
}

/// Collect every non-empty match of `pattern` in `text`, preserving the
/// source casing. Returns whether anything matched.
fn find_matches(pattern: &Regex, text: &str, out: &mut BTreeSet<String>) -> bool {
    let mut any = false;
    for m in pattern.find_iter(text) {
        if !m.as_str().is_empty() {
            out.insert(m.as_str().to_string());
            any = true;
        }
    }
    any
}

/// Search entries with zero or more terms, AND-ed together.
///
/// Only bibliographic entries participate; `@string` / `@comment` /
/// `@preamble` records never match. Result order follows the input order.
/// With no terms, every bibliographic entry is returned with an empty
/// match.
pub fn search<'a, S: AsRef<str>>(
    entries: &'a [Entry],
    search_terms: &[S],
) -> Result<Vec<SearchResult<'a>>> {
    let matchers = search_terms
        .iter()
        .map(|raw| TermMatcher::new(raw.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let mut results = Vec::new();
    'entries: for entry in entries.iter().filter(|e| e.is_bibliographic()) {
        let mut accumulated = EntryMatch::default();
        for matcher in &matchers {
            match matcher.match_entry(entry) {
                Some(matched) => accumulated.union(matched),
                None => continue 'entries,
            }
        }
        results.push(SearchResult {
            entry,
            matched: accumulated,
        });
    }
    Ok(results)
}

/// Search and expect a single result.
///
/// When an entry's key equals the first term (case-insensitively), that
/// entry wins outright, so a key works as its own unambiguous search term
/// even when it is a prefix of other keys. Otherwise exactly one result
/// must remain.
pub fn get<'a, S: AsRef<str>>(
    entries: &'a [Entry],
    search_terms: &[S],
) -> Result<SearchResult<'a>> {
    let mut results = search(entries, search_terms)?;

    if let Some(first) = search_terms.first() {
        let first = first.as_ref().to_lowercase();
        if let Some(i) = results
            .iter()
            .position(|r| r.entry.key().to_lowercase() == first)
        {
            return Ok(results.remove(i));
        }
    }

    let joined = search_terms
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    match results.len() {
        1 => Ok(results.remove(0)),
        0 => Err(Error::NotFound(joined)),
        count => Err(Error::AmbiguousMatch {
            term: joined,
            count,
        }),
    }
}

/// Find a bibliographic entry by exact, case-sensitive key.
pub fn get_by_key<'a>(entries: &'a [Entry], key: &str) -> Result<&'a Entry> {
    entries
        .iter()
        .filter(|e| e.is_bibliographic())
        .find(|e| e.key() == key)
        .ok_or_else(|| Error::NotFound(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_bib;

    fn data() -> Vec<Entry> {
        parse_bib(
            "@book{tolkien1937hobit,\n  author = {Tolkien, J. R. R.},\n  title = {The Hobbit},\n  year = {1937}\n}\n\n\
             @trilogy{tolkien1954lord,\n  author = {Tolkien, J. R. R.},\n  title = {The Lord of the Rings},\n  year = {1954}\n}\n\n\
             @article{asimov1951foundation,\n  author = {Asimov, Izaac},\n  title = {Foundation}\n}\n\n\
             @string{press = \"Secret Press\"}\n\n\
             @comment{tolkien is mentioned here too}",
        )
        .unwrap()
    }

    #[test]
    fn test_search_single_term() {
        let data = data();
        let results = search(&data, &["asimov"]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.get("title"), Some("Foundation"));
    }

    #[test]
    fn test_search_is_case_insensitive_and_keeps_source_casing() {
        let data = data();
        for term in ["ASIMOV", "asimov"] {
            let results = search(&data, &[term]).unwrap();
            assert_eq!(results.len(), 1);
            let matched = &results[0].matched;
            assert!(matched.key.contains("asimov"));
            assert_eq!(
                matched.fields["author"],
                BTreeSet::from(["Asimov".to_string()])
            );
        }
    }

    #[test]
    fn test_search_terms_are_anded() {
        let data = data();
        let results = search(&data, &["tolkien", "type:book"]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.key(), "tolkien1937hobit");
    }

    #[test]
    fn test_search_specific_field() {
        let data = data();
        let results = search(&data, &["year:1937"]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.get("title"), Some("The Hobbit"));

        let results = search(&data, &["author:asimov"]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.get("title"), Some("Foundation"));
    }

    #[test]
    fn test_field_existence_query() {
        let data = data();
        let results = search(&data, &["year:"]).unwrap();
        assert_eq!(results.len(), 2);
        for result in &results {
            let set = &result.matched.fields["year"];
            assert!(set.is_empty());
        }
    }

    #[test]
    fn test_search_skips_non_bibliographic_entries() {
        let data = data();
        // The @comment contains "tolkien" but must not show up.
        let results = search(&data, &["tolkien"]).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.entry.is_bibliographic()));
    }

    #[test]
    fn test_search_no_terms_returns_all_bibliographic() {
        let data = data();
        let results = search::<&str>(&data, &[]).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.matched.is_empty()));
    }

    #[test]
    fn test_match_sets_union_across_terms() {
        let data = data();
        let results = search(&data, &["tolkien", "hobbit"]).unwrap();
        assert_eq!(results.len(), 1);
        let matched = &results[0].matched;
        assert!(matched.fields["author"].contains("Tolkien"));
        assert!(matched.fields["title"].contains("Hobbit"));
        assert!(matched.key.contains("tolkien"));
    }

    #[test]
    fn test_regex_terms_are_supported() {
        let data = data();
        let results = search(&data, &["Lord.*Rings"]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.key(), "tolkien1954lord");
    }

    #[test]
    fn test_get_exact_key_breaks_ambiguity() {
        let bib = parse_bib("@misc{abc, note = {x}}\n@misc{abcd, note = {y}}").unwrap();
        let result = get(&bib, &["abc"]).unwrap();
        assert_eq!(result.entry.key(), "abc");

        assert!(matches!(
            get(&bib, &["ab"]),
            Err(Error::AmbiguousMatch { count: 2, .. })
        ));
    }

    #[test]
    fn test_get_not_found() {
        let data = data();
        assert!(matches!(
            get(&data, &["agnon"]),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_get_single_result() {
        let data = data();
        let result = get(&data, &["foundation"]).unwrap();
        assert_eq!(result.entry.key(), "asimov1951foundation");
    }

    #[test]
    fn test_get_by_key_is_case_sensitive() {
        let data = data();
        assert_eq!(
            get_by_key(&data, "tolkien1937hobit").unwrap().ty(),
            "book"
        );
        assert!(get_by_key(&data, "Tolkien1937hobit").is_err());
    }

    #[test]
    fn test_key_fallback_for_terms_with_many_colons() {
        let bib = parse_bib("@misc{doi:10.1000:xyz, note = {colons}}").unwrap();
        let results = search(&bib, &["doi:10.1000:xyz"]).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].matched.key.contains("doi:10.1000:xyz"));
    }
}
