//! Error types for the bibfile crate

use thiserror::Error;

/// Result type for bibfile operations
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for bibfile
#[derive(Error, Debug)]
pub enum Error {
    /// An entry span is not shaped `@type{...}`
    #[error("Malformed entry: {message}\n{snippet}")]
    MalformedEntry {
        /// What went wrong
        message: String,
        /// Snippet of the offending raw entry
        snippet: String,
    },

    /// A `name = value` pair inside an entry could not be parsed
    #[error("Malformed field in entry '{entry}': {message}")]
    MalformedField {
        /// Key (or snippet) of the entry holding the bad field
        entry: String,
        /// What went wrong
        message: String,
    },

    /// A search term that cannot be turned into a matcher
    #[error("Invalid search term '{0}'")]
    InvalidSearchTerm(String),

    /// A query returned no results
    #[error("No results found for '{0}'")]
    NotFound(String),

    /// A single-result query returned several candidates
    #[error("Multiple results found for '{term}' ({count} candidates)")]
    AmbiguousMatch {
        /// The query, joined for display
        term: String,
        /// Number of candidates found
        count: usize,
    },

    /// Inserting an entry whose key is already taken
    #[error("Duplicate key '{0}'")]
    DuplicateKey(String),

    /// The destination heuristic could not settle on a path
    #[error("Path heuristic failed: {0}")]
    Heuristic(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Get a snippet of input for error messages
pub(crate) fn snippet(input: &str, max_len: usize) -> String {
    let cut: String = input.chars().take(max_len).collect();
    if input.chars().count() > max_len {
        format!("{cut}...")
    } else {
        cut
    }
}
