//! Serializer for the BibTeX-like text format
//!
//! Output is normalized: one field per line, two-space indent, values
//! re-wrapped in braces, a comma after every field, and a blank line
//! between entries. Parsing the output and writing it again reproduces
//! the same text byte for byte.

use crate::{Entry, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Bibliography writer over any [`Write`] sink.
#[derive(Debug)]
pub struct Writer<W: Write> {
    writer: W,
}

impl<W: Write> Writer<W> {
    /// Create a new writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a whole bibliography, entries separated by a blank line.
    /// No trailing content is added after the final entry.
    pub fn write_bib(&mut self, entries: &[Entry]) -> io::Result<()> {
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                write!(self.writer, "\n\n")?;
            }
            self.write_entry(entry)?;
        }
        Ok(())
    }

    /// Write a single entry.
    pub fn write_entry(&mut self, entry: &Entry) -> io::Result<()> {
        match entry {
            Entry::Normal { ty, key, fields } => {
                write!(self.writer, "@{ty}{{{key},")?;
                for field in fields {
                    write!(self.writer, "\n  {} = {{{}}},", field.name, field.value)?;
                }
                write!(self.writer, "\n}}")
            }
            Entry::Macro { ty, key, val } => {
                write!(self.writer, "@{ty}{{{key} = \"{val}\"}}")
            }
            Entry::Directive { ty, body } => write!(self.writer, "@{ty}{{{body}}}"),
        }
    }
}

/// Serialize a bibliography to a string.
#[must_use]
pub fn to_string(entries: &[Entry]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec<u8> cannot fail.
    let _ = Writer::new(&mut buf).write_bib(entries);
    String::from_utf8(buf).unwrap_or_default()
}

/// Write a bibliography to a file, replacing its contents.
///
/// The text goes to a temporary sibling first and is renamed over the
/// target, so the file is either fully rewritten or unchanged.
pub fn to_file(entries: &[Entry], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let tmp = tmp_path(path);
    let mut file = fs::File::create(&tmp)?;
    file.write_all(to_string(entries).as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}
