use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;

use crate::core::{
    DocumentProvider, LineIndex, Location as DocLocation, Position as DocPosition,
    Range as DocRange, Span,
};
use crate::lsp::backend::Backend;
use crate::lsp::document::DocumentState;
use crate::lsp::uxml;
use crate::parser::uxml::{class_reference_at, markup_context, MarkupContext};
use crate::parser::{self, ParseResult, Scanner, SelectorKind, TokenKind};
use crate::properties::{PropertyDef, PropertyKnowledge, PropertyRegistry};
use crate::resolve::{
    resolve_class, resolve_import_path, resolve_in_workspace, resolve_local,
    workspace_class_names,
};
use crate::validation::{validate_document, Severity};

/// Trait for handling hover requests
#[tower_lsp::async_trait]
pub trait HandleHover {
    async fn handle_hover(&self, params: HoverParams) -> LspResult<Option<Hover>>;
}

/// Trait for handling completion requests
#[tower_lsp::async_trait]
pub trait HandleCompletion {
    async fn handle_completion(
        &self,
        params: CompletionParams,
    ) -> LspResult<Option<CompletionResponse>>;
}

/// Trait for handling go-to-definition requests
#[tower_lsp::async_trait]
pub trait HandleDefinition {
    async fn handle_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> LspResult<Option<GotoDefinitionResponse>>;
}

/// Trait for handling document symbols
#[tower_lsp::async_trait]
pub trait HandleDocumentSymbol {
    async fn handle_document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> LspResult<Option<DocumentSymbolResponse>>;
}

/// Trait for handling diagnostics
#[tower_lsp::async_trait]
pub trait HandleDiagnostics {
    async fn publish_diagnostics(&self, uri: Url);
    async fn clear_diagnostics(&self, uri: Url);
}

pub fn to_lsp_position(position: DocPosition) -> Position {
    Position::new(position.line, position.character)
}

pub fn to_lsp_range(range: DocRange) -> Range {
    Range::new(to_lsp_position(range.start), to_lsp_position(range.end))
}

pub fn from_lsp_position(position: Position) -> DocPosition {
    DocPosition::new(position.line, position.character)
}

pub fn to_lsp_location(location: DocLocation) -> Location {
    Location::new(location.uri, to_lsp_range(location.range))
}

/// Convert a validation diagnostic for publishing
pub fn to_lsp_diagnostic(diagnostic: crate::validation::Diagnostic) -> Diagnostic {
    let severity = match diagnostic.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
    };

    Diagnostic::new(
        to_lsp_range(diagnostic.range),
        Some(severity),
        Some(NumberOrString::String(diagnostic.kind.code().to_string())),
        Some("uss-ls".to_string()),
        diagnostic.message,
        None,
        None,
    )
}

/// Where the cursor sits, for completion purposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// Outside any declaration block
    Selector,
    /// Typing a property name; `prefix` is what has been typed so far
    PropertyName { prefix: String },
    /// After the colon of `property`
    PropertyValue { property: String },
}

/// Classify `offset` from the structural tokens before it
pub fn completion_context(text: &str, offset: usize) -> CompletionContext {
    let offset = offset.min(text.len());
    let mut depth = 0usize;
    let mut segment_start = 0;

    for token in Scanner::new(text) {
        if token.span.start >= offset {
            break;
        }
        match token.kind {
            TokenKind::OpenBrace => {
                depth += 1;
                segment_start = token.span.end;
            }
            TokenKind::CloseBrace => {
                depth = depth.saturating_sub(1);
                segment_start = token.span.end;
            }
            TokenKind::Semicolon => segment_start = token.span.end,
            TokenKind::Text => {}
        }
    }

    if depth == 0 {
        return CompletionContext::Selector;
    }

    let segment = &text[segment_start..offset];
    match segment.split_once(':') {
        Some((name, _)) => CompletionContext::PropertyValue {
            property: name.trim().to_string(),
        },
        None => CompletionContext::PropertyName {
            prefix: segment.trim().to_string(),
        },
    }
}

/// Completion items for a cursor offset
pub fn completion_items(
    parsed: &ParseResult,
    offset: usize,
    registry: &PropertyRegistry,
) -> Vec<CompletionItem> {
    match completion_context(parsed.text(), offset) {
        CompletionContext::Selector => Vec::new(),
        CompletionContext::PropertyName { prefix } => registry
            .properties()
            .into_iter()
            .filter(|def| def.name.starts_with(&prefix))
            .map(|def| CompletionItem {
                label: def.name.clone(),
                kind: Some(CompletionItemKind::PROPERTY),
                detail: def.syntax.clone(),
                documentation: Some(Documentation::MarkupContent(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: def.documentation(),
                })),
                insert_text: Some(format!("{}: ", def.name)),
                filter_text: Some(def.name.clone()),
                ..Default::default()
            })
            .collect(),
        CompletionContext::PropertyValue { property } => {
            let def = registry.property(&property);
            let mut items: Vec<CompletionItem> = registry
                .allowed_values(&property)
                .unwrap_or_default()
                .iter()
                .map(|value| CompletionItem {
                    label: value.clone(),
                    kind: Some(CompletionItemKind::ENUM_MEMBER),
                    detail: Some(property.clone()),
                    documentation: def
                        .and_then(|d| d.value_documentation(value))
                        .map(markdown_documentation),
                    sort_text: Some(format!("0{}", value)),
                    ..Default::default()
                })
                .collect();

            if let Some(def) = def {
                items.extend(typed_value_items(def));
            }

            let names = parsed.custom_property_names();
            if names.is_empty() {
                items.push(CompletionItem {
                    label: "var(--custom-property)".to_string(),
                    kind: Some(CompletionItemKind::SNIPPET),
                    detail: Some("Variable reference template".to_string()),
                    insert_text: Some("var(--${1:custom-property})".to_string()),
                    insert_text_format: Some(InsertTextFormat::SNIPPET),
                    sort_text: Some("2".to_string()),
                    ..Default::default()
                });
            }

            for name in names {
                let value = parsed
                    .find_custom_property(name)
                    .map(|p| p.value.clone());
                items.push(CompletionItem {
                    label: format!("var({})", name),
                    kind: Some(CompletionItemKind::VARIABLE),
                    detail: value,
                    sort_text: Some(format!("1{}", name)),
                    ..Default::default()
                });
            }

            items
        }
    }
}

fn markdown_documentation(value: String) -> Documentation {
    Documentation::MarkupContent(MarkupContent {
        kind: MarkupKind::Markdown,
        value,
    })
}

/// Sample values for the data types a property's grammar mentions
fn typed_value_items(def: &PropertyDef) -> Vec<CompletionItem> {
    let mut samples: Vec<(&str, CompletionItemKind, &str)> = Vec::new();

    if def.accepts_type("length") {
        samples.push(("0px", CompletionItemKind::VALUE, "Length in pixels"));
        samples.push(("0%", CompletionItemKind::VALUE, "Length relative to the parent"));
    }
    if def.accepts_type("color") {
        for color in [
            "transparent", "white", "black", "red", "green", "blue", "yellow", "cyan",
            "magenta", "gray",
        ] {
            samples.push((color, CompletionItemKind::COLOR, "Color keyword"));
        }
        samples.push(("#000000", CompletionItemKind::COLOR, "Hex color value"));
    }
    if def.accepts_type("number") {
        for number in ["0", "1", "2", "0.5", "1.5"] {
            samples.push((number, CompletionItemKind::VALUE, "Numeric value"));
        }
    }

    samples
        .into_iter()
        .map(|(label, kind, detail)| CompletionItem {
            label: label.to_string(),
            kind: Some(kind),
            detail: Some(detail.to_string()),
            sort_text: Some(format!("1{}", label)),
            ..Default::default()
        })
        .collect()
}

/// Keyword under `offset` inside `value`, with its absolute span
fn word_at(text: &str, value_span: Span, offset: usize) -> Option<(&str, Span)> {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    let value = &text[value_span.start..value_span.end];
    let relative = offset.checked_sub(value_span.start)?.min(value.len());

    let start = value[..relative]
        .char_indices()
        .rev()
        .find(|(_, c)| !is_word(*c))
        .map_or(0, |(idx, c)| idx + c.len_utf8());
    let end = value[relative..]
        .find(|c: char| !is_word(c))
        .map_or(value.len(), |idx| relative + idx);

    (start < end).then(|| {
        (
            &value[start..end],
            Span::new(value_span.start + start, value_span.start + end),
        )
    })
}

fn selector_description(kind: SelectorKind) -> &'static str {
    match kind {
        SelectorKind::Class => "Class selector",
        SelectorKind::Id => "Name selector",
        SelectorKind::Element => "Type selector",
        SelectorKind::Universal => "Universal selector",
        SelectorKind::Pseudo => "Pseudo-class selector",
    }
}

/// Hover text for the element under `offset`, without cross-document lookups
///
/// Variable references are left to the caller, which may need to resolve
/// them in other documents.
pub fn hover_markdown(
    parsed: &ParseResult,
    offset: usize,
    registry: &PropertyRegistry,
) -> Option<(String, DocRange)> {
    if let Some(property) = parsed.property_at(offset) {
        if !property.name_span.touches(offset) {
            // Keyword values with a description
            let def = registry.property(&property.name)?;
            let (word, span) = word_at(parsed.text(), property.value_span, offset)?;
            return Some((def.value_documentation(word)?, parsed.range(span)));
        }
        let range = parsed.range(property.name_span);

        if property.is_custom_property {
            return Some((
                format!("**{}**: `{}`\n\nCustom property", property.name, property.value),
                range,
            ));
        }

        let markdown = match registry.property(&property.name) {
            Some(def) => def.documentation(),
            None => format!("**{}**\n\nUnknown property", property.name),
        };
        return Some((markdown, range));
    }

    let selector = parsed.selector_at(offset)?;
    Some((
        format!(
            "{} `{}`",
            selector_description(selector.kind),
            selector.text
        ),
        parsed.range(selector.span),
    ))
}

/// One symbol per rule, with its declarations as children
pub fn document_symbols(parsed: &ParseResult) -> Vec<DocumentSymbol> {
    parsed
        .rules()
        .iter()
        .map(|rule| {
            let selection = rule
                .selectors
                .first()
                .map(|s| s.span)
                .unwrap_or(Span::new(rule.span.start, rule.span.start));

            let children: Vec<DocumentSymbol> = rule
                .properties
                .iter()
                .map(|property| DocumentSymbol {
                    name: property.name.clone(),
                    detail: Some(property.value.clone()),
                    kind: if property.is_custom_property {
                        SymbolKind::VARIABLE
                    } else {
                        SymbolKind::PROPERTY
                    },
                    tags: None,
                    #[allow(deprecated)]
                    deprecated: None,
                    range: to_lsp_range(parsed.range(property.span)),
                    selection_range: to_lsp_range(parsed.range(property.name_span)),
                    children: None,
                })
                .collect();

            DocumentSymbol {
                name: rule.selector_text.clone(),
                detail: (!rule.closed).then(|| "unclosed".to_string()),
                kind: SymbolKind::CLASS,
                tags: None,
                #[allow(deprecated)]
                deprecated: None,
                range: to_lsp_range(parsed.range(rule.span)),
                selection_range: to_lsp_range(parsed.range(selection)),
                children: Some(children),
            }
        })
        .collect()
}

impl Backend {
    /// Parse of an open stylesheet, released from the document lock
    async fn parsed_document(&self, uri: &Url) -> Option<Arc<ParseResult>> {
        let docs = self.documents.lock().await;
        docs.get(uri).and_then(|state| state.parsed.clone())
    }

    /// Text of an open UXML layout
    async fn markup_document(&self, uri: &Url) -> Option<String> {
        let docs = self.documents.lock().await;
        docs.get(uri)
            .filter(|state| state.is_markup())
            .map(|state| state.content.clone())
    }

    /// Declaration of a variable: the document itself first, then the
    /// stylesheets matching the workspace pattern
    async fn locate_variable(
        &self,
        uri: &Url,
        parsed: &ParseResult,
        name: &str,
        cancel: &CancellationToken,
    ) -> Option<DocLocation> {
        if let Some(location) = resolve_local(name, uri, parsed) {
            return Some(location);
        }
        let pattern = self.workspace.pattern().await;
        resolve_in_workspace(name, uri, &pattern, self.workspace.as_ref(), cancel).await
    }

    /// Completions inside a UXML layout
    async fn markup_completions(&self, text: &str, position: Position) -> Vec<CompletionItem> {
        let Some(offset) = LineIndex::new(text).offset(from_lsp_position(position)) else {
            return Vec::new();
        };

        match markup_context(text, offset) {
            Some(MarkupContext::ClassAttribute) => {
                let cancel = CancellationToken::new();
                let _guard = cancel.clone().drop_guard();
                let pattern = self.workspace.pattern().await;
                let names =
                    workspace_class_names(&pattern, self.workspace.as_ref(), &cancel).await;
                uxml::class_items(names)
            }
            Some(MarkupContext::ElementName { prefix }) => uxml::element_items(&prefix),
            Some(MarkupContext::Attribute { element }) => uxml::attribute_items(&element),
            None => Vec::new(),
        }
    }

    /// Stylesheet class named by the `class` attribute under the cursor
    async fn markup_definition(&self, text: &str, position: Position) -> Option<DocLocation> {
        let offset = LineIndex::new(text).offset(from_lsp_position(position))?;
        let reference = class_reference_at(text, offset)?;

        let cancel = CancellationToken::new();
        let _guard = cancel.clone().drop_guard();
        let pattern = self.workspace.pattern().await;
        resolve_class(&reference.name, &pattern, self.workspace.as_ref(), &cancel).await
    }

    /// Hover text for a `var(--name)` reference: its value and where it is declared
    async fn variable_hover(
        &self,
        uri: &Url,
        parsed: &ParseResult,
        name: &str,
        cancel: &CancellationToken,
    ) -> String {
        let Some(location) = self.locate_variable(uri, parsed, name, cancel).await else {
            return format!("**{}**\n\nUndefined variable", name);
        };

        let value = if &location.uri == uri {
            parsed.find_custom_property(name).map(|p| p.value.clone())
        } else {
            match self.workspace.read_document(&location.uri).await {
                Ok(text) => parser::parse(&text)
                    .find_custom_property(name)
                    .map(|p| p.value.clone()),
                Err(e) => {
                    log::debug!("Failed to read {}: {:#}", location.uri, e);
                    None
                }
            }
        };

        let file = location
            .uri
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string();

        match value {
            Some(value) => format!("**{}**: `{}`\n\nDeclared in `{}`", name, value, file),
            None => format!("**{}**\n\nDeclared in `{}`", name, file),
        }
    }
}

#[tower_lsp::async_trait]
impl HandleHover for Backend {
    async fn handle_hover(&self, params: HoverParams) -> LspResult<Option<Hover>> {
        if !self.config.read().await.intellisense_enabled() {
            return Ok(None);
        }

        let tdpp = params.text_document_position_params;
        let uri = tdpp.text_document.uri;

        let Some(parsed) = self.parsed_document(&uri).await else {
            return Ok(None);
        };
        let Some(offset) = parsed.offset_at(from_lsp_position(tdpp.position)) else {
            return Ok(None);
        };

        let hover = if let Some(reference) = parsed.variable_ref_at(offset) {
            let cancel = CancellationToken::new();
            let _guard = cancel.clone().drop_guard();
            let markdown = self
                .variable_hover(&uri, &parsed, &reference.name, &cancel)
                .await;
            Some((markdown, parsed.range(reference.span)))
        } else {
            let registry = self.properties.read().await;
            hover_markdown(&parsed, offset, &registry)
        };

        Ok(hover.map(|(value, range)| Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value,
            }),
            range: Some(to_lsp_range(range)),
        }))
    }
}

#[tower_lsp::async_trait]
impl HandleCompletion for Backend {
    async fn handle_completion(
        &self,
        params: CompletionParams,
    ) -> LspResult<Option<CompletionResponse>> {
        if !self.config.read().await.intellisense_enabled() {
            return Ok(None);
        }

        let uri = params.text_document_position.text_document.uri;
        let pos = params.text_document_position.position;

        if let Some(text) = self.markup_document(&uri).await {
            let completions = self.markup_completions(&text, pos).await;
            return Ok((!completions.is_empty()).then_some(CompletionResponse::Array(completions)));
        }

        let Some(parsed) = self.parsed_document(&uri).await else {
            return Ok(None);
        };
        let Some(offset) = parsed.offset_at(from_lsp_position(pos)) else {
            return Ok(None);
        };

        let registry = self.properties.read().await;
        let completions = completion_items(&parsed, offset, &registry);

        if completions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(CompletionResponse::Array(completions)))
        }
    }
}

#[tower_lsp::async_trait]
impl HandleDefinition for Backend {
    async fn handle_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> LspResult<Option<GotoDefinitionResponse>> {
        let tdpp = params.text_document_position_params;
        let uri = tdpp.text_document.uri;

        if let Some(text) = self.markup_document(&uri).await {
            let location = self.markup_definition(&text, tdpp.position).await;
            return Ok(location.map(|l| GotoDefinitionResponse::Scalar(to_lsp_location(l))));
        }

        let Some(parsed) = self.parsed_document(&uri).await else {
            return Ok(None);
        };
        let Some(offset) = parsed.offset_at(from_lsp_position(tdpp.position)) else {
            return Ok(None);
        };

        if let Some(reference) = parsed.variable_ref_at(offset) {
            // Dropping the request future cancels any reads still pending
            let cancel = CancellationToken::new();
            let _guard = cancel.clone().drop_guard();

            let location = self
                .locate_variable(&uri, &parsed, &reference.name, &cancel)
                .await;
            return Ok(location.map(|l| GotoDefinitionResponse::Scalar(to_lsp_location(l))));
        }

        if let Some(import) = parsed.import_at(offset) {
            let root = self.workspace.root_uri().await;
            let target = resolve_import_path(&uri, root.as_ref(), &import.path);
            return Ok(target.map(|target| {
                GotoDefinitionResponse::Scalar(Location::new(
                    target,
                    Range::new(Position::new(0, 0), Position::new(0, 0)),
                ))
            }));
        }

        Ok(None)
    }
}

#[tower_lsp::async_trait]
impl HandleDocumentSymbol for Backend {
    async fn handle_document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> LspResult<Option<DocumentSymbolResponse>> {
        let Some(parsed) = self.parsed_document(&params.text_document.uri).await else {
            return Ok(None);
        };

        Ok(Some(DocumentSymbolResponse::Nested(document_symbols(
            &parsed,
        ))))
    }
}

#[tower_lsp::async_trait]
impl HandleDiagnostics for Backend {
    /// Validate an open document and publish the result
    async fn publish_diagnostics(&self, uri: Url) {
        let (validate, check_properties) = {
            let config = self.config.read().await;
            (
                config.validation_enabled(),
                config.property_validation_enabled(),
            )
        };

        let (parsed, version) = {
            let docs = self.documents.lock().await;
            match docs.get(&uri) {
                Some(DocumentState {
                    parsed: Some(parsed),
                    version,
                    ..
                }) => (parsed.clone(), *version),
                _ => return,
            }
        };

        let diagnostics = if validate {
            let registry = self.properties.read().await;
            let knowledge: Option<&dyn PropertyKnowledge> = if check_properties {
                Some(&*registry)
            } else {
                None
            };
            validate_document(&parsed, knowledge)
                .diagnostics
                .into_iter()
                .map(to_lsp_diagnostic)
                .collect()
        } else {
            Vec::new()
        };

        self.client
            .publish_diagnostics(uri, diagnostics, version)
            .await;
    }

    async fn clear_diagnostics(&self, uri: Url) {
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }
}
