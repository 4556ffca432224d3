//! Metadata definitions
//!
//! Attributes attached to an entry by `Set`, and the clause list of
//! `FindOr`/`FindAnd`. Entries are joined with `#` on the wire.

use std::fmt;

use super::search_term::{validate_token, SearchTerm};
use crate::error::Result;

/// Separator between metadata entries
pub const ENTRY_SEPARATOR: char = '#';

/// A validated `<key>:<value>` pair
///
/// Fields are private so every instance has passed the delimiter check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralEntry {
    key: String,
    value: String,
}

impl LiteralEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let value = value.into();
        validate_token("metadata key", &key)?;
        validate_token("metadata value", &value)?;
        Ok(Self { key, value })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn to_protocol_string(&self) -> String {
        format!("{}:{}", self.key, self.value)
    }
}

/// One metadata entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataEntry {
    /// `<key>:<value>`, an attribute (or an implicit equality in searches)
    Literal(LiteralEntry),

    /// `<key>:<condition>:<value>`
    Term(SearchTerm),
}

impl MetadataEntry {
    /// Build a literal entry, rejecting delimiter characters
    pub fn literal(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        LiteralEntry::new(key, value).map(MetadataEntry::Literal)
    }

    /// Re-check key and value for delimiter characters
    pub fn validate(&self) -> Result<()> {
        let (key, value) = match self {
            MetadataEntry::Literal(literal) => (literal.key(), literal.value()),
            MetadataEntry::Term(term) => (term.key(), term.value()),
        };
        validate_token("metadata key", key)?;
        validate_token("metadata value", value)
    }

    pub fn to_protocol_string(&self) -> String {
        match self {
            MetadataEntry::Literal(literal) => literal.to_protocol_string(),
            MetadataEntry::Term(term) => term.to_protocol_string(),
        }
    }
}

impl From<LiteralEntry> for MetadataEntry {
    fn from(literal: LiteralEntry) -> Self {
        MetadataEntry::Literal(literal)
    }
}

impl From<SearchTerm> for MetadataEntry {
    fn from(term: SearchTerm) -> Self {
        MetadataEntry::Term(term)
    }
}

impl fmt::Display for MetadataEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_protocol_string())
    }
}

/// Join entries with `#`, preserving order. An empty slice gives `""`.
pub fn serialize_metadata(entries: &[MetadataEntry]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push(ENTRY_SEPARATOR);
        }
        out.push_str(&entry.to_protocol_string());
    }
    out
}

/// An ordered metadata set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<MetadataEntry>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a literal `key:value` entry
    pub fn with_literal(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        self.entries.push(MetadataEntry::literal(key, value)?);
        Ok(self)
    }

    /// Append a search term
    pub fn with_term(mut self, term: SearchTerm) -> Self {
        self.entries.push(MetadataEntry::Term(term));
        self
    }

    pub fn push(&mut self, entry: impl Into<MetadataEntry>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every entry for delimiter characters
    pub fn validate(&self) -> Result<()> {
        self.entries.iter().try_for_each(MetadataEntry::validate)
    }

    pub fn to_protocol_string(&self) -> String {
        serialize_metadata(&self.entries)
    }
}

impl From<Vec<MetadataEntry>> for Metadata {
    fn from(entries: Vec<MetadataEntry>) -> Self {
        Self { entries }
    }
}

impl From<Vec<SearchTerm>> for Metadata {
    fn from(terms: Vec<SearchTerm>) -> Self {
        terms.into_iter().map(MetadataEntry::Term).collect()
    }
}

impl FromIterator<MetadataEntry> for Metadata {
    fn from_iter<I: IntoIterator<Item = MetadataEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_protocol_string())
    }
}
