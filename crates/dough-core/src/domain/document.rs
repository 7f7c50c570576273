//! In-memory config documents and the store that holds them.
//!
//! A [`ConfigDocument`] is the parsed content of one config file: an ordered
//! list of keys, each with a value and an optional comment.  The
//! [`ConfigStore`] maps file names (including extension) to documents.
//!
//! Documents keep insertion order so that a file loaded from disk is written
//! back with its keys in the same order, and newly materialised keys are
//! appended at the end.

use std::collections::BTreeMap;

use crate::domain::value::TypedValue;

/// A line of a config file that belongs to no value: a blank line or a
/// free-standing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trivia {
    Blank,
    Comment(String),
}

/// A value plus the comment shown next to it in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    pub value: TypedValue,
    pub comment: Option<String>,
    /// Write the comment on its own lines above the key even when it would
    /// fit inline.
    pub comment_above: bool,
    /// Blank lines and detached comments between the previous entry and
    /// this one.
    pub leading: Vec<Trivia>,
}

impl ConfigEntry {
    /// Creates an entry without a comment.
    pub fn new(value: TypedValue) -> Self {
        Self::with_comment(value, None)
    }

    /// Creates an entry with an optional comment.  Empty comments are
    /// treated as absent.
    pub fn with_comment(value: TypedValue, comment: Option<String>) -> Self {
        Self {
            value,
            comment: comment.filter(|c| !c.is_empty()),
            comment_above: false,
            leading: Vec::new(),
        }
    }

    /// Places the comment above the key.
    pub fn placed_above(mut self) -> Self {
        self.comment_above = true;
        self
    }
}

/// Ordered key → entry mapping for one config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    /// Comment block at the top of the file, not attached to any key.
    pub preamble: Option<String>,
    /// Blank lines and comments after the last key.
    pub epilogue: Vec<Trivia>,
    entries: Vec<(String, ConfigEntry)>,
}

impl ConfigDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the document has an entry for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Returns the entry for `key`.
    pub fn get(&self, key: &str) -> Option<&ConfigEntry> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Returns the value stored under `key`.
    pub fn value(&self, key: &str) -> Option<&TypedValue> {
        self.get(key).map(|e| &e.value)
    }

    /// Returns the entry for `key` mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigEntry> {
        let i = self.position(key)?;
        Some(&mut self.entries[i].1)
    }

    /// Inserts or replaces the entry for `key`.
    ///
    /// A replaced key keeps its position; a new key is appended.  Returns the
    /// previous entry, if any.
    pub fn put(&mut self, key: impl Into<String>, entry: ConfigEntry) -> Option<ConfigEntry> {
        let key = key.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, entry)),
            None => {
                self.entries.push((key, entry));
                None
            }
        }
    }

    /// Removes and returns the entry for `key`.
    pub fn remove(&mut self, key: &str) -> Option<ConfigEntry> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Iterates entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the document has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

/// File name → document mapping for a config directory.
///
/// Iteration is sorted by file name so that saving is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    documents: BTreeMap<String, ConfigDocument>,
}

impl ConfigStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `document` under `file`, replacing any previous one.
    pub fn insert(&mut self, file: impl Into<String>, document: ConfigDocument) {
        self.documents.insert(file.into(), document);
    }

    /// Returns the document for `file`, creating and registering an empty
    /// one if the store has none yet.
    pub fn ensure_document(&mut self, file: &str) -> &mut ConfigDocument {
        self.documents.entry(file.to_string()).or_default()
    }

    /// Returns the document for `file`.
    pub fn get(&self, file: &str) -> Option<&ConfigDocument> {
        self.documents.get(file)
    }

    /// Returns the document for `file` mutably.
    pub fn get_mut(&mut self, file: &str) -> Option<&mut ConfigDocument> {
        self.documents.get_mut(file)
    }

    /// Returns `true` if a document is registered for `file`.
    pub fn contains(&self, file: &str) -> bool {
        self.documents.contains_key(file)
    }

    /// Iterates `(file name, document)` pairs sorted by file name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigDocument)> {
        self.documents.iter().map(|(f, d)| (f.as_str(), d))
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// `true` when no documents are registered.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Drops every document.
    pub fn clear(&mut self) {
        self.documents.clear();
    }
}
