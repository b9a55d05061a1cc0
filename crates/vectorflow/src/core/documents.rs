//! Document types for `VectorFlow`.
//!
//! Documents are the primary unit of content: a piece of text plus arbitrary
//! JSON metadata. Vector stores embed the text, persist the pair, and return
//! `Document`s from similarity searches.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A document with text content and metadata.
///
/// Each document contains:
/// - `page_content`: The text content
/// - `metadata`: Optional metadata as key-value pairs
/// - `id`: Optional unique identifier
///
/// # Example
///
/// ```
/// use vectorflow::core::documents::Document;
///
/// let doc = Document::new("Hello, world!")
///     .with_metadata("source", "example.txt".to_string())
///     .with_metadata("page", 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The text content of the document
    pub page_content: String,

    /// Metadata associated with the document
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Optional unique identifier for the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Document {
    /// Create a new document with the given text content.
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: HashMap::new(),
            id: None,
        }
    }

    /// Add metadata to the document (builder pattern).
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the document ID (builder pattern).
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Get metadata value by key.
    #[must_use]
    pub fn get_metadata(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }

    /// Set metadata value.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.metadata.insert(key.into(), value.into());
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.metadata.is_empty() {
            write!(f, "page_content='{}'", self.page_content)
        } else {
            write!(
                f,
                "page_content='{}' metadata={:?}",
                self.page_content, self.metadata
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let doc = Document::new("Hello, world!");
        assert_eq!(doc.page_content, "Hello, world!");
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.id, None);
    }

    #[test]
    fn test_document_with_metadata() {
        let doc = Document::new("Hello")
            .with_metadata("source", "example.txt".to_string())
            .with_metadata("page", 1);

        assert_eq!(doc.metadata.len(), 2);
        assert_eq!(
            doc.get_metadata("source").unwrap().as_str().unwrap(),
            "example.txt"
        );
        assert_eq!(doc.get_metadata("page").unwrap().as_i64().unwrap(), 1);
    }

    #[test]
    fn test_document_with_id() {
        let doc = Document::new("Hello").with_id("doc-123");
        assert_eq!(doc.id, Some("doc-123".to_string()));
    }

    #[test]
    fn test_document_serialization() {
        let doc = Document::new("Hello")
            .with_metadata("source", "test".to_string())
            .with_id("123");

        let json = serde_json::to_string(&doc).unwrap();
        let deserialized: Document = serde_json::from_str(&json).unwrap();

        assert_eq!(doc, deserialized);
    }

    #[test]
    fn test_document_display() {
        let doc1 = Document::new("Hello");
        assert_eq!(format!("{doc1}"), "page_content='Hello'");

        let doc2 = Document::new("Hello").with_metadata("key", "value".to_string());
        let display = format!("{doc2}");
        assert!(display.contains("page_content='Hello'"));
        assert!(display.contains("metadata"));
    }
}
