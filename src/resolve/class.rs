//! Class Resolver
//!
//! Class selectors across the workspace stylesheets, for markup documents
//! referring to them by name.

use std::collections::BTreeSet;

use tokio_util::sync::CancellationToken;

use crate::core::{DocumentProvider, Location, Span};
use crate::parser::SelectorKind;

use super::search::find_in_documents;

/// First class selector named `name`, visiting stylesheets in URI order
///
/// The location covers the class name without its leading dot.
pub async fn resolve_class<P>(
    name: &str,
    pattern: &str,
    provider: &P,
    cancel: &CancellationToken,
) -> Option<Location>
where
    P: DocumentProvider + ?Sized,
{
    find_in_documents(provider, pattern, None, cancel, |uri, parsed| {
        let selector = parsed
            .rules()
            .iter()
            .flat_map(|r| &r.selectors)
            .find(|s| s.kind == SelectorKind::Class && s.name == name)?;

        let start = selector.span.start + 1;
        let span = Span::new(start, start + selector.name.len());
        Some(Location::new(uri.clone(), parsed.range(span)))
    })
    .await
}

/// Every class name declared by the workspace stylesheets, sorted
pub async fn workspace_class_names<P>(
    pattern: &str,
    provider: &P,
    cancel: &CancellationToken,
) -> Vec<String>
where
    P: DocumentProvider + ?Sized,
{
    let mut names = BTreeSet::new();
    find_in_documents::<_, (), _>(provider, pattern, None, cancel, |_, parsed| {
        names.extend(parsed.class_names().into_iter().map(str::to_string));
        None
    })
    .await;
    names.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MemoryDocuments, Position, Range, STYLESHEET_PATTERN};
    use url::Url;

    fn uri(path: &str) -> Url {
        Url::parse(&format!("file:///proj/{}", path)).unwrap()
    }

    fn workspace() -> MemoryDocuments {
        let mut docs = MemoryDocuments::new();
        docs.insert(uri("b.uss"), "#root { }\n.title, .button:hover { color: red; }");
        docs.insert(uri("a.uss"), ".panel { }\n.button { }");
        docs.insert(uri("layout.uxml"), "<ui:Button class=\"ghost\" />");
        docs
    }

    #[tokio::test]
    async fn test_resolve_class_in_uri_order() {
        let docs = workspace();
        let cancel = CancellationToken::new();

        let location = resolve_class("button", STYLESHEET_PATTERN, &docs, &cancel)
            .await
            .unwrap();
        assert_eq!(location.uri, uri("a.uss"));
        assert_eq!(
            location.range,
            Range::new(Position::new(1, 1), Position::new(1, 7))
        );

        let title = resolve_class("title", STYLESHEET_PATTERN, &docs, &cancel)
            .await
            .unwrap();
        assert_eq!(title.uri, uri("b.uss"));

        assert!(resolve_class("root", STYLESHEET_PATTERN, &docs, &cancel).await.is_none());
        assert!(resolve_class("ghost", STYLESHEET_PATTERN, &docs, &cancel).await.is_none());
    }

    #[tokio::test]
    async fn test_workspace_class_names() {
        let docs = workspace();
        let names = workspace_class_names(STYLESHEET_PATTERN, &docs, &CancellationToken::new()).await;
        assert_eq!(names, vec!["button", "panel", "title"]);
    }

    #[tokio::test]
    async fn test_cancelled_class_lookup() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(
            resolve_class("button", STYLESHEET_PATTERN, &workspace(), &cancel)
                .await
                .is_none()
        );
    }
}
