//! Variable usage validation within a single document

use std::collections::HashSet;

use crate::parser::ParseResult;

use super::engine::{Diagnostic, DiagnosticKind};

/// Warn about `var(--name)` references with no `--name` declaration in the
/// same document. Each diagnostic covers the `--name` token only.
pub fn validate_variable_usage(parsed: &ParseResult) -> Vec<Diagnostic> {
    let declared: HashSet<&str> = parsed
        .custom_properties()
        .iter()
        .map(|p| p.name.as_str())
        .collect();

    parsed
        .rules()
        .iter()
        .flat_map(|rule| &rule.properties)
        .filter(|property| property.uses_variable_refs)
        .flat_map(|property| &property.variable_refs)
        .filter(|reference| !declared.contains(reference.name.as_str()))
        .map(|reference| {
            Diagnostic::warning(
                DiagnosticKind::UndefinedVariable,
                parsed.range(reference.span),
                format!("Undefined CSS variable: {}", reference.name),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Position, Range};
    use crate::parser::parse;
    use crate::validation::Severity;

    #[test]
    fn test_declared_variables_pass() {
        let parsed = parse(".x { --a: 1px; margin: var(--a); }\n.y { padding: var(--a); }");
        assert!(validate_variable_usage(&parsed).is_empty());
    }

    #[test]
    fn test_undefined_variable_range_covers_name() {
        let parsed = parse(".x {\n  color: var(--missing);\n}");
        let diagnostics = validate_variable_usage(&parsed);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].message, "Undefined CSS variable: --missing");
        assert_eq!(
            diagnostics[0].range,
            Range::new(Position::new(1, 13), Position::new(1, 22))
        );
    }

    #[test]
    fn test_declaration_after_use_counts() {
        let parsed = parse(".x { color: var(--late); }\n:root { --late: red; }");
        assert!(validate_variable_usage(&parsed).is_empty());
    }

    #[test]
    fn test_every_undefined_occurrence_reported() {
        let parsed = parse(".x { margin: var(--a) var(--b) var(--a); }");
        assert_eq!(validate_variable_usage(&parsed).len(), 3);
    }
}
