//! Brace structure validation over raw text

use crate::core::{LineIndex, Range};
use crate::parser::{Scanner, TokenKind};

use super::engine::{Diagnostic, DiagnosticKind};

fn nested_block_diagnostic(range: Range) -> Diagnostic {
    Diagnostic::error(
        DiagnosticKind::NestedBlock,
        range,
        "Nested blocks are not supported in USS".to_string(),
    )
}

/// Check brace balance. Braces inside comments and strings are ignored.
pub fn validate_syntax(text: &str) -> Vec<Diagnostic> {
    let index = LineIndex::new(text);
    let mut diagnostics = Vec::new();
    let mut depth = 0usize;

    for token in Scanner::new(text) {
        match token.kind {
            TokenKind::OpenBrace => {
                if depth == 1 {
                    diagnostics.push(nested_block_diagnostic(index.range(token.span)));
                }
                depth += 1;
            }
            TokenKind::CloseBrace => {
                if depth == 0 {
                    let line = index.line_of(token.span.start);
                    diagnostics.push(Diagnostic::error(
                        DiagnosticKind::UnmatchedClosingBrace,
                        index.line_range(line),
                        "Unmatched closing brace".to_string(),
                    ));
                } else {
                    depth -= 1;
                }
            }
            TokenKind::Semicolon | TokenKind::Text => {}
        }
    }

    if depth > 0 {
        let last_line = index.line_count().saturating_sub(1);
        diagnostics.push(Diagnostic::error(
            DiagnosticKind::UnclosedBrace,
            index.line_range(last_line),
            "Unclosed brace - missing closing brace".to_string(),
        ));
    }

    diagnostics
}
