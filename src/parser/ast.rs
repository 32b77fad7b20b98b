//! Stylesheet Model
//!
//! Plain data types for a parsed USS document, plus the helpers turning raw
//! statement text into selectors, declarations and imports.
//! No validation logic or LSP concerns here.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::Span;

/// `var(--name)` references; group 1 is the variable name
static VAR_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bvar\s*\(\s*(--[^\s,)]+)").expect("valid var() pattern")
});

/// `@import "path";`, `@import 'path';`, `@import url("path");` and `@import url('path');`
static IMPORT_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^@import\s+(url\s*\(\s*)?(?:"([^"]+)"|'([^']+)')\s*(\))?\s*;$"#)
        .expect("valid @import pattern")
});

/// Kind of a simple selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    /// `.name`
    Class,
    /// `#name`
    Id,
    /// `Button`
    Element,
    /// `*`
    Universal,
    /// `:hover`
    Pseudo,
}

/// One comma-separated selector of a rule
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub kind: SelectorKind,
    /// Name without its prefix (`button` for `.button`)
    pub name: String,
    /// Full selector text as written
    pub text: String,
    pub span: Span,
}

/// A `var(--name)` occurrence inside a property value
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRef {
    pub name: String,
    /// Span of the `--name` token only
    pub span: Span,
}

/// A `name: value` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    /// Raw value, trimmed, possibly spanning several lines
    pub value: String,
    pub is_custom_property: bool,
    pub uses_variable_refs: bool,
    pub variable_refs: Vec<VariableRef>,
    pub name_span: Span,
    pub value_span: Span,
    /// From the first character of the name to the end of the value
    pub span: Span,
}

/// A selector clause with its declaration block
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Selector clause as written, e.g. `.a, .b:hover`
    pub selector_text: String,
    pub selectors: Vec<Selector>,
    pub properties: Vec<Property>,
    /// From the first selector character through the closing brace
    pub span: Span,
    /// False when the document ended before the closing brace
    pub closed: bool,
}

/// A `--name: value` declaration, exposed for variable lookups
#[derive(Debug, Clone, PartialEq)]
pub struct CustomProperty {
    pub name: String,
    pub value: String,
    pub name_span: Span,
    pub span: Span,
    /// Index of the owning rule in the parse result
    pub rule_index: usize,
}

/// An `@import` directive
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: String,
    /// True for the `url(...)` form
    pub is_url: bool,
    /// The whole directive, terminator included
    pub span: Span,
    /// The path literal only, without quotes
    pub path_span: Span,
}

/// Trim `span` of `text` on both sides, keeping offsets absolute
pub(crate) fn trim_span(text: &str, span: Span) -> Span {
    let slice = &text[span.start..span.end];
    let start = span.start + (slice.len() - slice.trim_start().len());
    let end = span.end - (slice.len() - slice.trim_end().len());
    if start >= end {
        Span::new(start, start)
    } else {
        Span::new(start, end)
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

/// Split a selector clause on commas into simple selectors
///
/// `clause` is the span of the clause inside `text`. Pieces that do not name
/// anything (`.` alone, empty pieces) are skipped.
pub fn parse_selector_list(text: &str, clause: Span) -> Vec<Selector> {
    let mut selectors = Vec::new();
    let mut piece_start = clause.start;

    let clause_text = &text[clause.start..clause.end];
    let boundaries = clause_text
        .match_indices(',')
        .map(|(idx, _)| clause.start + idx)
        .chain(std::iter::once(clause.end));

    for boundary in boundaries {
        let span = trim_span(text, Span::new(piece_start, boundary));
        piece_start = boundary + 1;

        if let Some(selector) = parse_selector(text, span) {
            selectors.push(selector);
        }
    }

    selectors
}

fn parse_selector(text: &str, span: Span) -> Option<Selector> {
    let piece = &text[span.start..span.end];
    let first = piece.chars().next()?;

    let (kind, rest) = match first {
        '.' => (SelectorKind::Class, &piece[1..]),
        '#' => (SelectorKind::Id, &piece[1..]),
        '*' => (SelectorKind::Universal, &piece[1..]),
        ':' => (SelectorKind::Pseudo, piece.trim_start_matches(':')),
        _ => (SelectorKind::Element, piece),
    };

    let name = match kind {
        SelectorKind::Universal => "*".to_string(),
        _ => rest.chars().take_while(|c| is_name_char(*c)).collect(),
    };

    if name.is_empty() {
        return None;
    }

    Some(Selector {
        kind,
        name,
        text: piece.to_string(),
        span,
    })
}

/// Extract every `var(--name)` reference from a value
///
/// `value_start` is the absolute offset of `value` in the document.
pub fn extract_variable_refs(value: &str, value_start: usize) -> Vec<VariableRef> {
    VAR_REFERENCE
        .captures_iter(value)
        .filter_map(|caps| caps.get(1))
        .map(|m| VariableRef {
            name: m.as_str().to_string(),
            span: Span::new(value_start + m.start(), value_start + m.end()),
        })
        .collect()
}

/// Build a property from a declaration segment (`name: value`, terminator
/// excluded). Returns `None` when the segment has no colon or no name.
pub fn parse_declaration(text: &str, segment: Span) -> Option<Property> {
    let segment_text = &text[segment.start..segment.end];
    let colon = segment.start + segment_text.find(':')?;

    let name_span = trim_span(text, Span::new(segment.start, colon));
    if name_span.is_empty() {
        return None;
    }
    let value_span = trim_span(text, Span::new(colon + 1, segment.end));

    let name = text[name_span.start..name_span.end].to_string();
    let raw_value = &text[value_span.start..value_span.end];
    let comments = comment_spans(raw_value);
    let value = strip_comments(raw_value, &comments);
    let in_comment = |reference: &VariableRef| {
        let relative = Span::new(
            reference.span.start - value_span.start,
            reference.span.end - value_span.start,
        );
        comments.iter().any(|c| c.contains_span(relative))
    };
    let variable_refs: Vec<VariableRef> = extract_variable_refs(raw_value, value_span.start)
        .into_iter()
        .filter(|r| !in_comment(r))
        .collect();

    Some(Property {
        is_custom_property: name.starts_with("--"),
        uses_variable_refs: !variable_refs.is_empty(),
        variable_refs,
        span: name_span.cover(value_span),
        name,
        value,
        name_span,
        value_span,
    })
}

/// Comments inside a value, relative to its start
///
/// Block comments anywhere, and `//` comments running from the first
/// non-blank character of a continuation line to its end.
fn comment_spans(value: &str) -> Vec<Span> {
    let bytes = value.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;
    let mut at_line_start = false;

    while pos < bytes.len() {
        match bytes[pos] {
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                let end = value[pos + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |idx| pos + 2 + idx + 2);
                spans.push(Span::new(pos, end));
                pos = end;
            }
            b'/' if at_line_start && bytes.get(pos + 1) == Some(&b'/') => {
                let end = value[pos..].find('\n').map_or(bytes.len(), |idx| pos + idx);
                spans.push(Span::new(pos, end));
                pos = end;
            }
            quote @ (b'"' | b'\'') => {
                pos += 1;
                while pos < bytes.len() && bytes[pos] != quote && bytes[pos] != b'\n' {
                    pos += if bytes[pos] == b'\\' { 2 } else { 1 };
                }
                pos = (pos + 1).min(bytes.len());
                at_line_start = false;
            }
            b'\n' => {
                at_line_start = true;
                pos += 1;
            }
            b if b.is_ascii_whitespace() => pos += 1,
            _ => {
                at_line_start = false;
                pos += 1;
            }
        }
    }

    spans
}

/// Value text without its comments. Lines left blank are dropped.
fn strip_comments(value: &str, comments: &[Span]) -> String {
    if comments.is_empty() {
        return value.to_string();
    }

    let mut kept = String::with_capacity(value.len());
    let mut last = 0;
    for comment in comments {
        kept.push_str(&value[last..comment.start]);
        last = comment.end;
    }
    kept.push_str(&value[last..]);

    kept.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Recognize an import directive. `statement` must include the terminating `;`.
pub fn parse_import(text: &str, statement: Span) -> Option<Import> {
    let statement_text = &text[statement.start..statement.end];
    let caps = IMPORT_DIRECTIVE.captures(statement_text)?;

    let path = caps.get(2).or_else(|| caps.get(3))?;
    let is_url = caps.get(1).is_some();

    // url( must be closed, and a bare string must not carry a stray paren
    if is_url != caps.get(4).is_some() {
        return None;
    }

    Some(Import {
        path: path.as_str().to_string(),
        is_url,
        span: statement,
        path_span: Span::new(statement.start + path.start(), statement.start + path.end()),
    })
}
