//! Bibliography database representation
//!
//! A [`Database`] is the ordered sequence of entries in one `.bib` file.
//! Order matters for output round-tripping, not for search. The database
//! is loaded fresh from text per logical operation; there is no long-lived
//! server state, and saving rewrites the whole file.

use crate::error::{Error, Result};
use crate::model::Entry;
use crate::query::{self, SearchResult};
use crate::{parser, writer};
use ahash::AHashMap;
use std::fmt;
use std::path::Path;

/// A parsed bibliography database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Database {
    entries: Vec<Entry>,
}

impl Database {
    /// Create a new empty database.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse a database from a string.
    pub fn parse(input: &str) -> Result<Self> {
        Ok(Self {
            entries: parser::parse_bib(input)?,
        })
    }

    /// Read a database from a file. The file must exist.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Read a database from a file, treating a missing file as empty.
    /// Other IO failures still propagate.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Rewrite the whole database to a file (atomic replace).
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        writer::to_file(&self.entries, path)
    }

    /// All entries, in file order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Mutable access to the entry sequence.
    pub fn entries_mut(&mut self) -> &mut Vec<Entry> {
        &mut self.entries
    }

    /// Only the actual bibliographic items, skipping `@string` /
    /// `@comment` / `@preamble` records.
    pub fn bib_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_bibliographic())
    }

    /// Search the database; see [`query::search`].
    pub fn search<S: AsRef<str>>(&self, search_terms: &[S]) -> Result<Vec<SearchResult<'_>>> {
        query::search(&self.entries, search_terms)
    }

    /// Search the database expecting one result; see [`query::get`].
    pub fn get<S: AsRef<str>>(&self, search_terms: &[S]) -> Result<SearchResult<'_>> {
        query::get(&self.entries, search_terms)
    }

    /// Find a bibliographic entry by exact key.
    pub fn get_by_key(&self, key: &str) -> Result<&Entry> {
        query::get_by_key(&self.entries, key)
    }

    /// Append an entry, rejecting duplicate keys among bibliographic
    /// entries.
    pub fn insert(&mut self, entry: Entry) -> Result<()> {
        if entry.is_bibliographic() && self.bib_entries().any(|e| e.key() == entry.key()) {
            return Err(Error::DuplicateKey(entry.key().to_string()));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Remove the bibliographic entry with the given key. Returns whether
    /// anything was removed.
    pub fn remove_by_key(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.is_bibliographic() && e.key() == key));
        self.entries.len() != before
    }

    /// Get statistics about the database.
    #[must_use]
    pub fn stats(&self) -> DatabaseStats {
        let mut entries_by_type = AHashMap::new();
        for entry in self.bib_entries() {
            *entries_by_type
                .entry(entry.ty().to_lowercase())
                .or_insert(0) += 1;
        }
        DatabaseStats {
            total_entries: self.entries.len(),
            bibliographic_entries: self.bib_entries().count(),
            entries_by_type,
        }
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&writer::to_string(&self.entries))
    }
}

impl From<Vec<Entry>> for Database {
    fn from(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

/// Statistics about a database
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    /// Total number of entries, directives included
    pub total_entries: usize,
    /// Number of bibliographic entries
    pub bibliographic_entries: usize,
    /// Bibliographic entry counts by lower-cased type
    pub entries_by_type: AHashMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RAW: &str = "@article{israel,\n  author = {Israel, Moshe},\n  title = {Article title},\n  year = {2008}\n}\n\n@book{orwell,\n  author = {Orwell, George},\n  title = {1984},\n  year = {1949}\n}";

    #[test]
    fn test_parse_and_display_round_trip() {
        let db = Database::parse(RAW).unwrap();
        assert_eq!(db.entries().len(), 2);
        assert_eq!(db.to_string(), RAW.replace("}\n}", "},\n}"));
    }

    #[test]
    fn test_insert_rejects_duplicate_key() {
        let mut db = Database::parse(RAW).unwrap();
        let dup = Entry::normal("misc", "orwell");
        assert!(matches!(db.insert(dup), Err(Error::DuplicateKey(k)) if k == "orwell"));
        assert!(db.insert(Entry::normal("misc", "fresh")).is_ok());
        assert_eq!(db.entries().len(), 3);
    }

    #[test]
    fn test_insert_allows_duplicate_directives() {
        let mut db = Database::new();
        for _ in 0..2 {
            db.insert(Entry::Directive {
                ty: "comment".to_string(),
                body: "same body".to_string(),
            })
            .unwrap();
        }
        assert_eq!(db.entries().len(), 2);
    }

    #[test]
    fn test_remove_by_key() {
        let mut db = Database::parse(RAW).unwrap();
        assert!(db.remove_by_key("israel"));
        assert!(!db.remove_by_key("israel"));
        assert_eq!(db.entries().len(), 1);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let path = std::env::temp_dir().join("bibfile_does_not_exist.bib");
        let _ = std::fs::remove_file(&path);
        let db = Database::load_or_default(&path).unwrap();
        assert!(db.entries().is_empty());
    }

    #[test]
    fn test_file_cycle() {
        let path = std::env::temp_dir().join("bibfile_database_cycle.bib");
        let db = Database::parse(RAW).unwrap();
        db.write_file(&path).unwrap();
        let reread = Database::read_file(&path).unwrap();
        assert_eq!(db, reread);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_stats() {
        let input = format!("{RAW}\n\n@string{{p = \"Press\"}}\n\n@comment{{note}}");
        let db = Database::parse(&input).unwrap();
        let stats = db.stats();
        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.bibliographic_entries, 2);
        assert_eq!(stats.entries_by_type.get("book"), Some(&1));
        assert_eq!(stats.entries_by_type.get("article"), Some(&1));
    }
}
