//! # bibfile
//!
//! Codec and search engine for BibTeX-like bibliography files: the core of
//! a reference manager whose single source of truth is one `.bib` text
//! file.
//!
//! ## Features
//!
//! - Two-way conversion between the brace/quote-delimited text format and
//!   a typed entry model, stable under repeated round trips
//! - Nesting-aware tokenization: commas and `=` inside `{...}` or `"..."`
//!   never split a field
//! - Search with per-field scoping (`field:value`), AND semantics across
//!   terms, and match provenance for highlighting
//! - Whole-file load/save with atomic replace on write
//!
//! ## Example
//!
//! ```
//! use bibfile::{read_string, search, write_string};
//!
//! let input = r#"
//!     @book{tolkien1937hobit,
//!         author = {Tolkien, J. R. R.},
//!         title = {The Hobbit},
//!         year = {1937}
//!     }
//! "#;
//!
//! let bib = read_string(input)?;
//! assert_eq!(bib.len(), 1);
//! assert_eq!(bib[0].get("title"), Some("The Hobbit"));
//!
//! let results = search(&bib, &["tolkien", "year:1937"])?;
//! assert_eq!(results.len(), 1);
//!
//! // A second round trip is a no-op.
//! let once = write_string(&bib);
//! assert_eq!(write_string(&read_string(&once)?), once);
//! # Ok::<(), bibfile::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    missing_docs,
    missing_debug_implementations
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod error;
pub mod format;
pub mod highlight;
pub mod model;
pub mod parser;
pub mod query;

mod database;
mod writer;

pub use database::{Database, DatabaseStats};
pub use error::{Error, Result};
pub use format::{destination_heuristic, fallback_citation, format_entry, string_to_basename};
pub use model::{Entry, Field};
pub use parser::read_entry_string;
pub use query::{get, get_by_key, search, EntryMatch, SearchResult, SearchTerm};
pub use writer::{to_file, to_string, Writer};

/// Re-export of the common types and operations
pub mod prelude {
    pub use crate::{
        get, get_by_key, read_string, search, write_string, Database, Entry, Error, Field, Result,
        SearchResult,
    };
}

/// Parse a bibliography from a string into an ordered entry sequence.
pub fn read_string(input: &str) -> Result<Vec<Entry>> {
    parser::parse_bib(input)
}

/// Parse a bibliography from a file.
pub fn read_file(path: impl AsRef<std::path::Path>) -> Result<Vec<Entry>> {
    let content = std::fs::read_to_string(path)?;
    read_string(&content)
}

/// Serialize a bibliography to a string.
#[must_use]
pub fn write_string(entries: &[Entry]) -> String {
    writer::to_string(entries)
}

/// Serialize a bibliography to a file, replacing its contents.
pub fn write_file(entries: &[Entry], path: impl AsRef<std::path::Path>) -> Result<()> {
    writer::to_file(entries, path)
}
