//! Data model for bibliography entries
//!
//! An [`Entry`] is one record in a `.bib` file. The format has three shapes
//! of record, modelled as one variant each: regular bibliographic items
//! (`@article`, `@book`, ...), string macros (`@string{name = "value"}`),
//! and opaque directives (`@comment` / `@preamble`).

use serde::{Deserialize, Serialize};

/// A named string attribute of a bibliographic entry.
///
/// Field names are stored lower-cased; insertion order is preserved so that
/// serialization is stable across read/write cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name (lower-cased)
    pub name: String,
    /// Field value, with the delimiters already stripped
    pub value: String,
}

impl Field {
    /// Create a new field; the name is lower-cased.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            value: value.into(),
        }
    }
}

/// One record of a bibliography database.
///
/// Exactly one of `fields` / `val` / `body` exists, depending on the record
/// category. The `ty` of every variant keeps its original casing from the
/// source text; comparisons against it are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entry {
    /// A regular bibliographic item (`@article`, `@book`, ...)
    Normal {
        /// Entry type, original casing preserved
        ty: String,
        /// Citation key, case-sensitive
        key: String,
        /// Ordered fields
        fields: Vec<Field>,
    },
    /// A `@string` macro definition. The value is stored literally; no
    /// expansion into other entries is performed.
    Macro {
        /// Entry type as written (`string`, `STRING`, ...)
        ty: String,
        /// Macro name
        key: String,
        /// Macro value
        val: String,
    },
    /// A `@comment` or `@preamble` directive, carried verbatim.
    Directive {
        /// Entry type as written
        ty: String,
        /// Raw inner content, untouched
        body: String,
    },
}

impl Entry {
    /// Create a bibliographic entry with no fields.
    #[must_use]
    pub fn normal(ty: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Normal {
            ty: ty.into(),
            key: key.into(),
            fields: Vec::new(),
        }
    }

    /// The entry type, as written in the source.
    #[must_use]
    pub fn ty(&self) -> &str {
        match self {
            Self::Normal { ty, .. } | Self::Macro { ty, .. } | Self::Directive { ty, .. } => ty,
        }
    }

    /// The entry key. Directives have none and yield the empty string.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Normal { key, .. } | Self::Macro { key, .. } => key,
            Self::Directive { .. } => "",
        }
    }

    /// Whether this entry is an actual bibliographic item, i.e. not a
    /// `@string` / `@comment` / `@preamble` record. Only bibliographic
    /// entries participate in search and listing.
    #[must_use]
    pub const fn is_bibliographic(&self) -> bool {
        matches!(self, Self::Normal { .. })
    }

    /// Get a field value by name (case-insensitive). `None` for variants
    /// without fields.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.fields()
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Set a field, replacing an existing one in place or appending.
    /// Has no effect on macro and directive entries.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let Self::Normal { fields, .. } = self else {
            return;
        };
        let name = name.to_lowercase();
        let value = value.into();
        if let Some(field) = fields.iter_mut().find(|f| f.name == name) {
            field.value = value;
        } else {
            fields.push(Field { name, value });
        }
    }

    /// Remove a field by name (case-insensitive), returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let Self::Normal { fields, .. } = self else {
            return None;
        };
        let name = name.to_lowercase();
        let pos = fields.iter().position(|f| f.name == name)?;
        Some(fields.remove(pos).value)
    }

    /// All fields, in insertion order. Empty for macros and directives.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        match self {
            Self::Normal { fields, .. } => fields,
            _ => &[],
        }
    }

    /// Mutable access to the fields of a bibliographic entry.
    pub fn fields_mut(&mut self) -> Option<&mut Vec<Field>> {
        match self {
            Self::Normal { fields, .. } => Some(fields),
            _ => None,
        }
    }
}
