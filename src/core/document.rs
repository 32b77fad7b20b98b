//! Document Access
//!
//! The document provider capability used for cross-document lookups, plus an
//! in-memory implementation.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use glob::{MatchOptions, Pattern};
use url::Url;

use crate::core::text::Range;

/// Default pattern listing every stylesheet of a workspace
pub const STYLESHEET_PATTERN: &str = "**/*.uss";

/// Default stylesheet file extension, without the dot
pub const STYLESHEET_EXTENSION: &str = "uss";

/// Layout documents referring to stylesheet classes
pub const MARKUP_EXTENSION: &str = "uxml";

/// True for UXML layout documents
pub fn is_markup(uri: &Url) -> bool {
    uri.path()
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(MARKUP_EXTENSION))
}

/// A range inside a specific document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub uri: Url,
    pub range: Range,
}

impl Location {
    pub fn new(uri: Url, range: Range) -> Self {
        Self { uri, range }
    }
}

/// Read-only access to the documents of a workspace
///
/// Both operations may perform I/O. Errors are reported per call; callers
/// searching several documents treat a failed read as "no match" for that
/// document.
#[tower_lsp::async_trait]
pub trait DocumentProvider: Send + Sync {
    /// List documents whose path matches a glob pattern such as `**/*.uss`
    async fn list_documents(&self, pattern: &str) -> Result<Vec<Url>>;

    /// Read the full text of a document
    async fn read_document(&self, uri: &Url) -> Result<String>;
}

/// Check a document URI against a glob pattern, matching on its path
pub fn uri_matches(uri: &Url, pattern: &str) -> bool {
    let Ok(pattern) = Pattern::new(pattern) else {
        return false;
    };
    let path = uri.path().trim_start_matches('/');
    pattern.matches_with(path, MatchOptions::new())
}

/// Documents held in memory, keyed by URI
#[derive(Debug, Clone, Default)]
pub struct MemoryDocuments {
    documents: BTreeMap<Url, String>,
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document
    pub fn insert(&mut self, uri: Url, text: impl Into<String>) {
        self.documents.insert(uri, text.into());
    }

    pub fn remove(&mut self, uri: &Url) -> Option<String> {
        self.documents.remove(uri)
    }

    pub fn get(&self, uri: &Url) -> Option<&str> {
        self.documents.get(uri).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[tower_lsp::async_trait]
impl DocumentProvider for MemoryDocuments {
    async fn list_documents(&self, pattern: &str) -> Result<Vec<Url>> {
        Ok(self
            .documents
            .keys()
            .filter(|uri| uri_matches(uri, pattern))
            .cloned()
            .collect())
    }

    async fn read_document(&self, uri: &Url) -> Result<String> {
        self.documents
            .get(uri)
            .cloned()
            .ok_or_else(|| anyhow!("Document not found: {}", uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(path: &str) -> Url {
        Url::parse(&format!("file://{}", path)).unwrap()
    }

    #[test]
    fn test_uri_matches_stylesheet_pattern() {
        assert!(uri_matches(&uri("/proj/styles/main.uss"), STYLESHEET_PATTERN));
        assert!(uri_matches(&uri("/main.uss"), STYLESHEET_PATTERN));
        assert!(!uri_matches(&uri("/proj/layout.uxml"), STYLESHEET_PATTERN));
    }

    #[test]
    fn test_is_markup() {
        assert!(is_markup(&uri("/proj/UI/layout.uxml")));
        assert!(is_markup(&uri("/proj/UI/Layout.UXML")));
        assert!(!is_markup(&uri("/proj/UI/main.uss")));
        assert!(!is_markup(&uri("/proj/README")));
    }

    #[tokio::test]
    async fn test_memory_documents_list_and_read() {
        let mut docs = MemoryDocuments::new();
        docs.insert(uri("/a.uss"), ".a { }");
        docs.insert(uri("/b.uxml"), "<ui:UXML/>");

        let listed = docs.list_documents(STYLESHEET_PATTERN).await.unwrap();
        assert_eq!(listed, vec![uri("/a.uss")]);

        assert_eq!(docs.read_document(&uri("/a.uss")).await.unwrap(), ".a { }");
        assert!(docs.read_document(&uri("/missing.uss")).await.is_err());
    }
}
