//! Parser for the BibTeX-like text format
//!
//! Parsing happens in two stages: [`lexer::entry_spans`] cuts the input
//! into raw `@...}` spans by brace depth, and [`read_entry_string`] turns
//! one span into an [`Entry`]. Any failure aborts the whole load; a
//! malformed field never yields a partial database.

pub mod lexer;

use crate::error::{snippet, Error, Result};
use crate::model::{Entry, Field};

/// Parse a complete bibliography from a string.
pub fn parse_bib(input: &str) -> Result<Vec<Entry>> {
    lexer::entry_spans(input)?
        .into_iter()
        .map(read_entry_string)
        .collect()
}

/// Parse a single raw entry in isolation.
///
/// Used both by [`parse_bib`] and by callers that obtain one new entry's
/// text from an editor or an external fetch.
pub fn read_entry_string(raw: &str) -> Result<Entry> {
    let raw = raw.trim();
    if !raw.starts_with('@') || !raw.ends_with('}') {
        return Err(Error::MalformedEntry {
            message: "entry must run from '@' to its closing '}'".to_string(),
            snippet: snippet(raw, 40),
        });
    }

    let open = raw.find('{').ok_or_else(|| Error::MalformedEntry {
        message: "missing '{' after the entry type".to_string(),
        snippet: snippet(raw, 40),
    })?;
    let ty = raw[1..open].trim();
    let inner = &raw[open + 1..raw.len() - 1];

    // Type casing is preserved; only the dispatch below is case-insensitive.
    match ty.to_lowercase().as_str() {
        "string" => read_macro(ty, inner),
        "comment" | "preamble" => Ok(Entry::Directive {
            ty: ty.to_string(),
            body: inner.to_string(),
        }),
        _ => read_normal(ty, inner),
    }
}

/// Parse the `name = value` body of a `@string` macro.
fn read_macro(ty: &str, inner: &str) -> Result<Entry> {
    let (name, value) = lexer::split_pair(inner).ok_or_else(|| Error::MalformedField {
        entry: format!("@{ty}"),
        message: format!("expected 'name = value', got '{}'", snippet(inner.trim(), 40)),
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::MalformedField {
            entry: format!("@{ty}"),
            message: "empty macro name".to_string(),
        });
    }
    Ok(Entry::Macro {
        ty: ty.to_string(),
        key: name.to_string(),
        val: lexer::unwrap_value(value),
    })
}

/// Parse a bibliographic entry body: key, then comma-separated fields.
fn read_normal(ty: &str, inner: &str) -> Result<Entry> {
    let mut parts = lexer::split_top_level(inner).into_iter();
    // A body without any comma is a key-only entry with zero fields.
    let key = parts.next().unwrap_or("").trim().to_string();

    let mut fields = Vec::new();
    for part in parts {
        if part.trim().is_empty() {
            // Trailing comma before the closing brace.
            continue;
        }
        let (name, value) = lexer::split_pair(part).ok_or_else(|| Error::MalformedField {
            entry: key.clone(),
            message: format!("expected 'name = value', got '{}'", snippet(part.trim(), 40)),
        })?;
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(Error::MalformedField {
                entry: key.clone(),
                message: "empty field name".to_string(),
            });
        }
        fields.push(Field {
            name,
            value: lexer::unwrap_value(value),
        });
    }

    Ok(Entry::Normal {
        ty: ty.to_string(),
        key,
        fields,
    })
}
