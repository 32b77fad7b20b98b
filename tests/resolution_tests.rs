//! Variable and import resolution across documents
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Result};
use tokio_util::sync::CancellationToken;
use url::Url;

use uss_language_server::core::{DocumentProvider, MemoryDocuments};
use uss_language_server::{
    parse, resolve_import_path, resolve_variable, validate_variable_usage, DiagnosticKind,
    Position, Range,
};

fn uri(path: &str) -> Url {
    Url::parse(&format!("file:///proj/{}", path)).unwrap()
}

/// Provider that fails to read some documents and counts reads
struct FlakyDocuments {
    inner: MemoryDocuments,
    broken: Vec<Url>,
    reads: AtomicUsize,
    cancel_after_reads: Option<(usize, CancellationToken)>,
}

impl FlakyDocuments {
    fn new(inner: MemoryDocuments) -> Self {
        Self {
            inner,
            broken: Vec::new(),
            reads: AtomicUsize::new(0),
            cancel_after_reads: None,
        }
    }
}

#[tower_lsp::async_trait]
impl DocumentProvider for FlakyDocuments {
    async fn list_documents(&self, pattern: &str) -> Result<Vec<Url>> {
        self.inner.list_documents(pattern).await
    }

    async fn read_document(&self, uri: &Url) -> Result<String> {
        let reads = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((limit, token)) = &self.cancel_after_reads {
            if reads >= *limit {
                token.cancel();
            }
        }
        if self.broken.contains(uri) {
            bail!("permission denied: {}", uri);
        }
        self.inner.read_document(uri).await
    }
}

#[tokio::test]
async fn test_variable_declared_in_other_document() {
    let a_text = ".button {\n  color: var(--brand);\n  border-color: var(--missing);\n}";
    let origin = uri("a.uss");
    let parsed = parse(a_text);

    let mut docs = MemoryDocuments::new();
    docs.insert(origin.clone(), a_text);
    docs.insert(uri("b.uss"), ":root {\n  --brand: #336699;\n}");

    let cancel = CancellationToken::new();
    let location = resolve_variable("--brand", &origin, &parsed, &docs, &cancel)
        .await
        .expect("declaration in b.uss");
    assert_eq!(location.uri, uri("b.uss"));
    assert_eq!(
        location.range,
        Range::new(Position::new(1, 2), Position::new(1, 9))
    );

    assert!(
        resolve_variable("--missing", &origin, &parsed, &docs, &cancel)
            .await
            .is_none()
    );

    // Local check only flags what the document itself does not declare
    let diagnostics = validate_variable_usage(&parsed);
    assert_eq!(diagnostics.len(), 2);
    let missing = diagnostics
        .iter()
        .find(|d| d.message.ends_with("--missing"))
        .unwrap();
    assert_eq!(missing.kind, DiagnosticKind::UndefinedVariable);
    assert_eq!(
        missing.range,
        Range::new(Position::new(2, 20), Position::new(2, 29))
    );
}

#[tokio::test]
async fn test_duplicate_declarations_resolve_deterministically() {
    let origin = uri("ui/main.uss");
    let parsed = parse(".x { color: var(--accent); }");

    let mut docs = MemoryDocuments::new();
    docs.insert(uri("themes/light.uss"), ":root { --accent: white; }");
    docs.insert(uri("themes/dark.uss"), ":root { --accent: black; }\n.y { --accent: gray; }");

    for _ in 0..3 {
        let location =
            resolve_variable("--accent", &origin, &parsed, &docs, &CancellationToken::new())
                .await
                .unwrap();
        assert_eq!(location.uri, uri("themes/dark.uss"));
        assert_eq!(location.range.start, Position::new(0, 8));
    }
}

#[tokio::test]
async fn test_read_errors_are_skipped() {
    let origin = uri("a.uss");
    let parsed = parse("");

    let mut inner = MemoryDocuments::new();
    inner.insert(uri("b.uss"), ":root { --c: 1; }");
    inner.insert(uri("c.uss"), ":root { --c: 2; }");

    let mut docs = FlakyDocuments::new(inner);
    docs.broken.push(uri("b.uss"));

    let location = resolve_variable("--c", &origin, &parsed, &docs, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(location.uri, uri("c.uss"));
    assert_eq!(docs.reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_search_stops_reading_once_cancelled() {
    let origin = uri("a.uss");
    let parsed = parse("");

    let mut inner = MemoryDocuments::new();
    inner.insert(uri("b.uss"), ".b { }");
    inner.insert(uri("c.uss"), ".c { }");
    inner.insert(uri("d.uss"), ":root { --c: 1; }");

    let cancel = CancellationToken::new();
    let mut docs = FlakyDocuments::new(inner);
    docs.cancel_after_reads = Some((1, cancel.clone()));

    let location = resolve_variable("--c", &origin, &parsed, &docs, &cancel).await;
    assert!(location.is_none());
    assert_eq!(docs.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_only_stylesheets_are_searched() {
    let origin = uri("a.uss");
    let parsed = parse("");

    let mut docs = MemoryDocuments::new();
    docs.insert(uri("notes.txt"), ":root { --c: 1; }");

    assert!(
        resolve_variable("--c", &origin, &parsed, &docs, &CancellationToken::new())
            .await
            .is_none()
    );
}

#[test]
fn test_import_targets() {
    let origin = Url::parse("file:///proj/styles/main.uss").unwrap();
    let root = Url::parse("file:///proj/").unwrap();

    assert_eq!(
        resolve_import_path(&origin, Some(&root), "./vars").unwrap().as_str(),
        "file:///proj/styles/vars.uss"
    );
    assert_eq!(
        resolve_import_path(&origin, Some(&root), "/theme").unwrap().as_str(),
        "file:///proj/theme.uss"
    );
    assert_eq!(
        resolve_import_path(&origin, Some(&root), "../shared/buttons.uss")
            .unwrap()
            .as_str(),
        "file:///proj/shared/buttons.uss"
    );
}

#[test]
fn test_import_paths_from_parsed_document() {
    let origin = Url::parse("file:///proj/styles/main.uss").unwrap();
    let parsed = parse("@import \"common\";\n@import url(\"./widgets/slider.uss\");");

    let targets: Vec<String> = parsed
        .imports()
        .iter()
        .filter_map(|i| resolve_import_path(&origin, None, &i.path))
        .map(|u| u.to_string())
        .collect();

    assert_eq!(
        targets,
        vec![
            "file:///proj/styles/common.uss",
            "file:///proj/styles/widgets/slider.uss"
        ]
    );
}
