use std::sync::Arc;

use url::Url;

use crate::core::is_markup;
use crate::parser::{self, ParseResult};

/// State for each open document
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub content: String,
    /// Parse of `content`, shared with in-flight requests. `None` for UXML
    /// layouts.
    pub parsed: Option<Arc<ParseResult>>,
    pub version: Option<i32>,
}

impl DocumentState {
    /// A stylesheet snapshot
    pub fn new(content: String, version: Option<i32>) -> Self {
        let parsed = Some(Arc::new(parser::parse(&content)));
        Self {
            content,
            parsed,
            version,
        }
    }

    /// A UXML layout snapshot, kept as raw text
    pub fn markup(content: String, version: Option<i32>) -> Self {
        Self {
            content,
            parsed: None,
            version,
        }
    }

    /// Snapshot for `uri`, parsed unless it is a layout document
    pub fn for_uri(uri: &Url, content: String, version: Option<i32>) -> Self {
        if is_markup(uri) {
            Self::markup(content, version)
        } else {
            Self::new(content, version)
        }
    }

    pub fn is_markup(&self) -> bool {
        self.parsed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_for_uri() {
        let uss = Url::parse("file:///proj/main.uss").unwrap();
        let state = DocumentState::for_uri(&uss, ".a { color: red; }".to_string(), Some(1));
        assert_eq!(state.parsed.as_ref().unwrap().rules().len(), 1);
        assert!(!state.is_markup());

        let uxml = Url::parse("file:///proj/layout.uxml").unwrap();
        let state = DocumentState::for_uri(&uxml, "<ui:UXML/>".to_string(), Some(1));
        assert!(state.is_markup());
        assert_eq!(state.content, "<ui:UXML/>");
    }
}
