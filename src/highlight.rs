//! ANSI highlighting of search matches
//!
//! Presentation helpers, kept apart from the query engine: they operate on
//! already-rendered strings. The escape-aware scanner is a two-state
//! machine (inside / outside an escape sequence) over the rendered text.

use crate::query::term::compile_matcher;
use crate::query::SearchResult;

/// ANSI bold
pub const ANSI_BOLD: &str = "\x1b[1m";
/// ANSI bold off
pub const ANSI_UNBOLD: &str = "\x1b[22m";

/// Wrap a string in ANSI bold.
#[must_use]
pub fn bold(s: &str) -> String {
    format!("{ANSI_BOLD}{s}{ANSI_UNBOLD}")
}

/// Bold every case-insensitive occurrence of `needle` in `text`.
///
/// Adjacent highlights are merged by dropping an unbold immediately
/// followed by a bold, so back-to-back matches render as one bold run.
#[must_use]
pub fn highlight_text(text: &str, needle: &str) -> String {
    let Ok(pattern) = compile_matcher(needle) else {
        return text.to_string();
    };
    let highlighted = pattern.replace_all(text, |caps: &regex::Captures<'_>| bold(&caps[0]));
    highlighted.replace(concat!("\x1b[22m", "\x1b[1m"), "")
}

/// Bold every matched substring of a search result inside `text`.
/// Substrings not present in `text` (matches in fields the caller chose
/// not to render) are skipped.
#[must_use]
pub fn highlight_result(text: &str, result: &SearchResult<'_>) -> String {
    let mut out = text.to_string();
    for needle in result.matched.substrings() {
        out = highlight_text(&out, needle);
    }
    out
}

/// Length of `s` as displayed, skipping ANSI escape sequences.
///
/// An escape runs from `ESC` to the next ASCII letter; everything in
/// between is invisible.
#[must_use]
pub fn visible_len(s: &str) -> usize {
    let mut in_escape = false;
    let mut len = 0;
    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            len += 1;
        }
    }
    len
}
