//! Entry formatting helpers
//!
//! Small, pure presentation logic that callers layer on top of the codec
//! and the query engine: `$field` templating, a fallback citation line for
//! when the external citation formatter is unavailable, and the
//! file-destination heuristic used when linking PDFs to entries.

use crate::error::{Error, Result};
use crate::model::Entry;
use ahash::AHashMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s-]").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[\s-]+").unwrap();
}

/// Render an entry through a `$field` pattern.
///
/// A `$` starts a replacement that runs over the following alphabetic
/// characters. `key` and `type` resolve to those attributes, anything else
/// to the fields; unknown names render back as `$name` so typos stay
/// visible.
///
/// ```
/// use bibfile::{format_entry, read_entry_string};
///
/// let entry = read_entry_string("@book{hobbit, title = {The Hobbit}, year = {1937}}")?;
/// assert_eq!(format_entry(&entry, "$year: $title"), "1937: The Hobbit");
/// # Ok::<(), bibfile::Error>(())
/// ```
#[must_use]
pub fn format_entry(entry: &Entry, format_pattern: &str) -> String {
    let mut output = String::new();
    let mut replacement_start: Option<usize> = None;
    for (i, ch) in format_pattern.char_indices() {
        if ch == '$' {
            replacement_start = Some(i + ch.len_utf8());
        } else if !ch.is_alphabetic() {
            if let Some(start) = replacement_start.take() {
                output.push_str(&lookup(entry, &format_pattern[start..i]));
            }
            output.push(ch);
        } else if replacement_start.is_none() {
            output.push(ch);
        }
    }
    if let Some(start) = replacement_start {
        output.push_str(&lookup(entry, &format_pattern[start..]));
    }
    output
}

fn lookup(entry: &Entry, name: &str) -> String {
    match name {
        "key" => entry.key().to_string(),
        "type" => entry.ty().to_string(),
        _ => entry
            .get(name)
            .map_or_else(|| format!("${name}"), ToString::to_string),
    }
}

/// Build a plain citation line from the entry's own fields.
///
/// Used when the external citation formatter fails: cascades through
/// author / year / title and falls back to the bare entry type when too
/// little is there.
#[must_use]
pub fn fallback_citation(entry: &Entry) -> String {
    let author = entry.get("author");
    let year = entry.get("year");
    let title = entry.get("title");
    match (author, year, title) {
        (Some(author), Some(year), Some(title)) => format!("{author} ({year}). {title}"),
        (Some(author), Some(year), None) => format!("{author} ({year})"),
        (Some(author), None, Some(title)) => format!("{author}. {title}"),
        (None, Some(year), Some(title)) => format!("{title} ({year})"),
        _ => entry.ty().to_string(),
    }
}

/// Convert a string to a filename-friendly basename: lowercase, strip
/// non-word characters, hyphenate whitespace runs.
#[must_use]
pub fn string_to_basename(s: &str) -> String {
    let s = s.trim().to_lowercase();
    let s = NON_WORD.replace_all(&s, "");
    SEPARATORS.replace_all(&s, "-").into_owned()
}

/// Guess the folder holding the database's linked files, by majority vote
/// over the directories of existing `file` fields.
///
/// Fails when no entry carries a path, and also when two directories are
/// tied for the majority; a tie means there is no single sensible default
/// and the caller must ask for an explicit destination.
pub fn destination_heuristic(entries: &[Entry]) -> Result<String> {
    let mut counter: AHashMap<String, usize> = AHashMap::new();
    for entry in entries.iter().filter(|e| e.is_bibliographic()) {
        let Some(file) = entry.get("file") else {
            continue;
        };
        if file.is_empty() {
            continue;
        }
        let dir = Path::new(file)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        *counter.entry(dir).or_insert(0) += 1;
    }

    if counter.is_empty() {
        return Err(Error::Heuristic("no paths in the database".to_string()));
    }

    let best = counter.values().max().copied().unwrap_or(0);
    let mut candidates: Vec<String> = counter
        .into_iter()
        .filter(|&(_, count)| count == best)
        .map(|(path, _)| path)
        .collect();

    if candidates.len() > 1 {
        return Err(Error::Heuristic(
            "there are multiple equally valid paths in the database".to_string(),
        ));
    }
    Ok(candidates.remove(0))
}
