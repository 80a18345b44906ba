//! Search term parsing
//!
//! A term is either a bare value, matched anywhere in an entry, or
//! `field:value`, scoped to one field. `\:` escapes a literal colon. A
//! term with more than one unescaped colon is not an error: the whole
//! term falls back to a key-scoped match, which keeps keys that contain
//! colons (DOIs, timestamps) searchable as-is.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};

/// One unit of a user query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    /// Bare value: matches the key, the type, or any field value.
    General(String),
    /// `field:value`: matches within one field. The reserved names `key`
    /// and `type` address those attributes instead of the field map.
    /// An empty value matches any entry that merely has the field.
    Field {
        /// Field name, lower-cased
        name: String,
        /// Value to match; empty means an existence query
        value: String,
    },
    /// Fallback for terms with several colons: the whole original term
    /// is matched against the key.
    Key(String),
}

impl SearchTerm {
    /// Parse a raw term string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let parts = split_unescaped_colons(raw);
        match parts.len() {
            1 => Self::General(parts.into_iter().next().unwrap_or_default()),
            2 => {
                let mut it = parts.into_iter();
                Self::Field {
                    name: it.next().unwrap_or_default().to_lowercase(),
                    value: it.next().unwrap_or_default(),
                }
            }
            _ => Self::Key(parts.join(":")),
        }
    }

    /// The value this term looks for.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::General(value) | Self::Key(value) => value,
            Self::Field { value, .. } => value,
        }
    }
}

/// Split on `:` except when preceded by a backslash; `\:` becomes a
/// literal colon in the part.
fn split_unescaped_colons(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(':') => current.push(':'),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            ':' => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    parts.push(current);
    parts
}

/// Compile a term value into a case-insensitive matcher.
///
/// The value is tried as a regex first; when it is not a valid pattern it
/// is matched as a literal instead of failing the query.
pub(crate) fn compile_matcher(value: &str) -> Result<Regex> {
    RegexBuilder::new(value)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(value))
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::InvalidSearchTerm(format!("{value}: {e}")))
        })
}
