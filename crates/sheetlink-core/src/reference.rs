//! Reference and document identifiers
//!
//! A [`ReferenceId`] is the canonical `category/key` name of a linkable
//! entity. The category may itself contain `/`-separated subpaths
//! (`Book of Hours/Rooms/Library`); the key never does, because keys are
//! sanitized before they get here.
//!
//! A [`DocumentId`] names the persisted artifact for one record. It wraps
//! the record's own `ReferenceId`, so turning a reference into a document
//! id and back is structural.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Canonical `category/key` identifier
///
/// Ordering is lexicographic over the rendered string, which is the order
/// citations are written in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(String);

impl ReferenceId {
    /// Build a reference from already-canonical parts
    pub fn new(category: &str, key: &str) -> Self {
        Self(format!("{}/{}", category, key))
    }

    /// The category path (everything before the final segment)
    pub fn category(&self) -> &str {
        self.0.rsplit_once('/').map(|(c, _)| c).unwrap_or("")
    }

    /// The key (final path segment)
    pub fn key(&self) -> &str {
        self.0.rsplit_once('/').map(|(_, k)| k).unwrap_or(&self.0)
    }

    /// The top-level segment of the category
    pub fn collection(&self) -> &str {
        self.0.split('/').next().unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render as a citation: `[[category/key]]`
    pub fn citation(&self) -> String {
        format!("[[{}]]", self.0)
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a persisted document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(ReferenceId);

impl DocumentId {
    pub fn new(reference: ReferenceId) -> Self {
        Self(reference)
    }

    /// The reference other documents use to cite this one
    pub fn reference(&self) -> &ReferenceId {
        &self.0
    }

    /// Relative storage path: `{category}/{key}.{extension}`
    pub fn to_path(&self, extension: &str) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.0.category().split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.{}", self.0.key(), extension));
        path
    }
}

impl From<ReferenceId> for DocumentId {
    fn from(reference: ReferenceId) -> Self {
        Self(reference)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let r = ReferenceId::new("Book of Hours/Rooms", "Library");
        assert_eq!(r.as_str(), "Book of Hours/Rooms/Library");
        assert_eq!(r.category(), "Book of Hours/Rooms");
        assert_eq!(r.key(), "Library");
        assert_eq!(r.collection(), "Book of Hours");
    }

    #[test]
    fn test_citation() {
        let r = ReferenceId::new("Books", "Atlas");
        assert_eq!(r.citation(), "[[Books/Atlas]]");
    }

    #[test]
    fn test_document_path() {
        let doc = DocumentId::new(ReferenceId::new("Book of Hours/Rooms", "Library"));
        let path = doc.to_path("md");
        assert_eq!(
            path,
            PathBuf::from("Book of Hours").join("Rooms").join("Library.md")
        );
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut refs = vec![
            ReferenceId::new("Rooms", "Library"),
            ReferenceId::new("Books", "Atlas"),
            ReferenceId::new("Books", "Almanac"),
        ];
        refs.sort();
        let rendered: Vec<_> = refs.iter().map(|r| r.as_str()).collect();
        assert_eq!(rendered, vec!["Books/Almanac", "Books/Atlas", "Rooms/Library"]);
    }

    #[test]
    fn test_serializes_as_string() {
        let r = ReferenceId::new("Rooms", "Library");
        assert_eq!(serde_json::to_string(&r).unwrap(), "\"Rooms/Library\"");
    }
}
