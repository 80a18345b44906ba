//! Depth-aware scanning for the bib text format
//!
//! The format cannot be split naively: commas and `=` signs appear inside
//! brace- or quote-delimited values, so every splitting primitive here
//! tracks delimiter nesting. Braces inside quoted strings still count
//! toward brace depth when locating entry boundaries; that is a documented
//! limitation for quoted values holding unbalanced braces.

use crate::error::{snippet, Error, Result};
use memchr::memchr3;

/// Split input into raw entry spans.
///
/// A `@` seen at brace depth 0 starts a span; the span ends at the `}` that
/// brings the depth back to 0, inclusive. Text between spans is ignored.
/// A span that is opened but never balanced is a malformed entry.
pub fn entry_spans(input: &str) -> Result<Vec<&str>> {
    let bytes = input.as_bytes();
    let mut spans = Vec::new();
    let mut depth: usize = 0;
    let mut start: Option<usize> = None;
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(offset) = memchr3(b'@', b'{', b'}', &bytes[pos..]) else {
            break;
        };
        pos += offset;
        match bytes[pos] {
            b'@' if depth == 0 => start = Some(pos),
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(s) = start.take() {
                        spans.push(&input[s..=pos]);
                    }
                }
            }
            _ => {}
        }
        pos += 1;
    }

    if let Some(s) = start {
        return Err(Error::MalformedEntry {
            message: "entry is never closed".to_string(),
            snippet: snippet(&input[s..], 40),
        });
    }

    Ok(spans)
}

/// Split on commas at depth 0, honoring `{...}` nesting and top-level
/// `"..."` pairs. Always yields at least one part.
pub fn split_top_level(input: &str) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut in_quotes = false;
    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        match byte {
            b'{' if !in_quotes => depth += 1,
            b'}' if !in_quotes => depth = depth.saturating_sub(1),
            b'"' if depth == 0 => in_quotes = !in_quotes,
            b',' if depth == 0 && !in_quotes => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Split a `name = value` pair on the first `=` at depth 0.
pub fn split_pair(input: &str) -> Option<(&str, &str)> {
    let bytes = input.as_bytes();
    let mut depth: usize = 0;
    let mut in_quotes = false;

    for (i, &byte) in bytes.iter().enumerate() {
        match byte {
            b'{' if !in_quotes => depth += 1,
            b'}' if !in_quotes => depth = depth.saturating_sub(1),
            b'"' if depth == 0 => in_quotes = !in_quotes,
            b'=' if depth == 0 && !in_quotes => {
                return Some((&input[..i], &input[i + 1..]));
            }
            _ => {}
        }
    }
    None
}

/// Collapse whitespace runs (including newlines) into single spaces.
///
/// Values wrapped across several physical lines parse to one logical
/// string this way.
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a raw field value.
///
/// Whitespace is collapsed, one trailing comma is dropped, and exactly one
/// outer layer of `{...}` or `"..."` is stripped. Interior delimiters are
/// preserved verbatim.
#[must_use]
pub fn unwrap_value(raw: &str) -> String {
    let mut value = collapse_whitespace(raw);
    if value.ends_with(',') {
        value.pop();
        value.truncate(value.trim_end().len());
    }
    for (open, close) in [('{', '}'), ('"', '"')] {
        if value.len() >= 2 && value.starts_with(open) && value.ends_with(close) {
            value = value[1..value.len() - 1].to_string();
            break;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_spans() {
        let input = "@article{a,\n  x = {1}\n}\n\n@book{b,\n  y = {2}\n}";
        let spans = entry_spans(input).unwrap();
        assert_eq!(spans.len(), 2);
        assert!(spans[0].starts_with("@article{a,"));
        assert!(spans[0].ends_with('}'));
        assert!(spans[1].starts_with("@book{b,"));
    }

    #[test]
    fn test_entry_spans_nested_braces() {
        let input = "@article{a,\n  title = {The {B}ig {O}ne}\n}";
        let spans = entry_spans(input).unwrap();
        assert_eq!(spans, vec![input]);
    }

    #[test]
    fn test_entry_spans_ignores_surrounding_junk() {
        let input = "leading text\n@misc{a, x = {1}}\ntrailing text";
        let spans = entry_spans(input).unwrap();
        assert_eq!(spans, vec!["@misc{a, x = {1}}"]);
    }

    #[test]
    fn test_entry_spans_unclosed_is_an_error() {
        let err = entry_spans("@book{missing, title = {oops}").unwrap_err();
        assert!(err.to_string().contains("never closed"));
    }

    #[test]
    fn test_split_top_level_protects_braces_and_quotes() {
        let input = r#"key, author = {Last, First}, note = "a, b", year = 2008"#;
        let parts = split_top_level(input);
        assert_eq!(
            parts,
            vec![
                "key",
                " author = {Last, First}",
                r#" note = "a, b""#,
                " year = 2008",
            ]
        );
    }

    #[test]
    fn test_split_pair_protects_equals() {
        let (name, value) = split_pair(" url = {http://x.com/?a=b} ").unwrap();
        assert_eq!(name.trim(), "url");
        assert_eq!(value.trim(), "{http://x.com/?a=b}");
        assert!(split_pair("no pair here").is_none());
    }

    #[test]
    fn test_unwrap_value() {
        assert_eq!(unwrap_value(" \"Israel, Moshe\",\n"), "Israel, Moshe");
        assert_eq!(unwrap_value(" 2008\n"), "2008");
        assert_eq!(unwrap_value("{The {B}ig {O}ne}"), "The {B}ig {O}ne");
        assert_eq!(unwrap_value("{}"), "");
    }

    #[test]
    fn test_unwrap_value_joins_physical_lines() {
        let raw = "{Israel, Moshe\n             and Yosef, Shlomo}";
        assert_eq!(unwrap_value(raw), "Israel, Moshe and Yosef, Shlomo");
    }
}
