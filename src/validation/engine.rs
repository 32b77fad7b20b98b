//! Validation Engine
//!
//! Diagnostic types and document-level validation, separated from parsing and
//! LSP concerns.

use crate::core::Range;
use crate::parser::{ParseResult, Property};
use crate::properties::PropertyKnowledge;

use super::syntax::validate_syntax;
use super::variables::validate_variable_usage;

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// What a diagnostic reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A `}` with no open block
    UnmatchedClosingBrace,
    /// The document ends inside a block
    UnclosedBrace,
    /// A `{` opened inside a declaration block
    NestedBlock,
    /// `var(--name)` with no declaration of `--name` in the document
    UndefinedVariable,
    /// Property name missing from the knowledge base
    UnknownProperty,
    /// Value outside the property's allowed keywords
    InvalidValue,
}

impl DiagnosticKind {
    /// Short identifier published as the LSP diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::UnmatchedClosingBrace => "unmatched-closing-brace",
            DiagnosticKind::UnclosedBrace => "unclosed-brace",
            DiagnosticKind::NestedBlock => "nested-block",
            DiagnosticKind::UndefinedVariable => "undefined-variable",
            DiagnosticKind::UnknownProperty => "unknown-property",
            DiagnosticKind::InvalidValue => "invalid-value",
        }
    }
}

/// A diagnostic message for a validation issue
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub range: Range,
    pub message: String,
    pub severity: Severity,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, range: Range, message: String) -> Self {
        Self {
            range,
            message,
            severity: Severity::Error,
            kind,
        }
    }

    pub fn warning(kind: DiagnosticKind, range: Range, message: String) -> Self {
        Self {
            range,
            message,
            severity: Severity::Warning,
            kind,
        }
    }
}

/// Result of validating a document
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add_error(&mut self, kind: DiagnosticKind, range: Range, message: String) {
        self.diagnostics.push(Diagnostic::error(kind, range, message));
    }

    pub fn add_warning(&mut self, kind: DiagnosticKind, range: Range, message: String) {
        self.diagnostics
            .push(Diagnostic::warning(kind, range, message));
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn is_valid(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

/// Validate a parsed document
///
/// Property diagnostics are only produced when a knowledge base is supplied.
/// Diagnostics are ordered by start position.
pub fn validate_document(
    parsed: &ParseResult,
    knowledge: Option<&dyn PropertyKnowledge>,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.extend(validate_syntax(parsed.text()));
    result.extend(validate_variable_usage(parsed));

    if let Some(knowledge) = knowledge {
        for property in parsed.rules().iter().flat_map(|r| &r.properties) {
            validate_property(parsed, property, knowledge, &mut result);
        }
    }

    result
        .diagnostics
        .sort_by_key(|d| (d.range.start, d.range.end));
    result
}

/// Check one declaration against the knowledge base
fn validate_property(
    parsed: &ParseResult,
    property: &Property,
    knowledge: &dyn PropertyKnowledge,
    result: &mut ValidationResult,
) {
    if property.is_custom_property {
        return;
    }

    if !knowledge.is_known_property(&property.name) {
        result.add_error(
            DiagnosticKind::UnknownProperty,
            parsed.range(property.name_span),
            format!("Property '{}' is not supported in USS", property.name),
        );
        return;
    }

    // Values built from variables are only known at runtime
    if property.uses_variable_refs {
        return;
    }

    let Some(def) = knowledge.property(&property.name) else {
        return;
    };
    if def.accepts(&property.value) {
        return;
    }

    let expected = def.values.as_deref().unwrap_or_default().join(" | ");
    result.add_warning(
        DiagnosticKind::InvalidValue,
        parsed.range(property.value_span),
        format!(
            "Value '{}' is not valid for property '{}'. Expected: {}",
            property.value, property.name, expected
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::properties::PropertyRegistry;

    #[test]
    fn test_validation_result() {
        let mut result = ValidationResult::new();
        assert!(result.is_valid());

        result.add_warning(
            DiagnosticKind::UndefinedVariable,
            Range::default(),
            "Test warning".to_string(),
        );
        assert!(result.is_valid()); // Warnings don't make it invalid

        result.add_error(
            DiagnosticKind::UnclosedBrace,
            Range::default(),
            "Test error".to_string(),
        );
        assert!(!result.is_valid()); // Errors make it invalid
        assert_eq!(result.errors().count(), 1);
        assert_eq!(result.warnings().count(), 1);
    }

    #[test]
    fn test_valid_document_without_knowledge() {
        let parsed = parse(":root { --c: red; }\n.x { color: var(--c); }");
        let result = validate_document(&parsed, None);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_property_is_error() {
        let registry = PropertyRegistry::with_builtin();
        let parsed = parse(".x { colour: red; }");
        let result = validate_document(&parsed, Some(&registry));

        assert_eq!(result.diagnostics.len(), 1);
        let diagnostic = &result.diagnostics[0];
        assert_eq!(diagnostic.kind, DiagnosticKind::UnknownProperty);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.range.start.character, 5);
        assert_eq!(diagnostic.range.end.character, 11);
    }

    #[test]
    fn test_invalid_keyword_value_is_warning() {
        let registry = PropertyRegistry::with_builtin();
        let parsed = parse(".x { flex-direction: sideways; }");
        let result = validate_document(&parsed, Some(&registry));

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::InvalidValue);
        assert_eq!(result.diagnostics[0].severity, Severity::Warning);
        assert!(result.diagnostics[0]
            .message
            .ends_with("Expected: row | row-reverse | column | column-reverse"));
        assert!(result.is_valid());
    }

    #[test]
    fn test_variables_and_custom_properties_skip_knowledge_checks() {
        let registry = PropertyRegistry::with_builtin();
        let parsed = parse(":root { --dir: row; }\n.x { flex-direction: var(--dir); --anything: 1; }");
        let result = validate_document(&parsed, Some(&registry));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_diagnostics_are_ordered() {
        let parsed = parse(".x { color: var(--late); }\n}");
        let result = validate_document(&parsed, None);

        let kinds: Vec<_> = result.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::UndefinedVariable,
                DiagnosticKind::UnmatchedClosingBrace
            ]
        );
    }
}
