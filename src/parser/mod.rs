//! USS Parser
//!
//! Turns document text into a [`ParseResult`]: rules with their selectors and
//! declarations, import directives and custom property declarations, each with
//! exact source spans.
//!
//! Parsing never fails. Malformed statements are skipped and the rest of the
//! document is still parsed.

pub mod ast;
pub mod scanner;
pub mod uxml;

pub use ast::{
    CustomProperty, Import, Property, Rule, Selector, SelectorKind, VariableRef,
};
pub use scanner::{tokenize, Scanner, Token, TokenKind};

use crate::core::{LineIndex, Position, Range, Span};

/// Parsed form of one document snapshot
///
/// Immutable once produced; re-parse to pick up text changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    rules: Vec<Rule>,
    imports: Vec<Import>,
    custom_properties: Vec<CustomProperty>,
    nested_blocks: Vec<Span>,
    line_index: LineIndex,
}

impl ParseResult {
    /// Rules in document order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    /// Custom property declarations in scan order, duplicates included
    pub fn custom_properties(&self) -> &[CustomProperty] {
        &self.custom_properties
    }

    /// Spans of `{ ... }` blocks found inside a declaration block. Their
    /// content is not part of any rule.
    pub fn nested_blocks(&self) -> &[Span] {
        &self.nested_blocks
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn text(&self) -> &str {
        self.line_index.text()
    }

    pub fn range(&self, span: Span) -> Range {
        self.line_index.range(span)
    }

    pub fn offset_at(&self, position: Position) -> Option<usize> {
        self.line_index.offset(position)
    }

    /// First declaration of a custom property, in scan order
    pub fn find_custom_property(&self, name: &str) -> Option<&CustomProperty> {
        self.custom_properties.iter().find(|p| p.name == name)
    }

    /// Distinct custom property names in scan order
    pub fn custom_property_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for property in &self.custom_properties {
            if !names.contains(&property.name.as_str()) {
                names.push(&property.name);
            }
        }
        names
    }

    /// Distinct class selector names in document order
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for selector in self.rules.iter().flat_map(|r| &r.selectors) {
            if selector.kind == SelectorKind::Class && !names.contains(&selector.name.as_str()) {
                names.push(&selector.name);
            }
        }
        names
    }

    /// Rule under `offset`. A rule starting at the offset wins over one
    /// ending there.
    pub fn rule_at(&self, offset: usize) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|r| r.span.start <= offset && offset < r.span.end)
            .or_else(|| self.rules.iter().find(|r| r.span.touches(offset)))
    }

    pub fn property_at(&self, offset: usize) -> Option<&Property> {
        self.rule_at(offset)?
            .properties
            .iter()
            .find(|p| p.span.touches(offset))
    }

    pub fn selector_at(&self, offset: usize) -> Option<&Selector> {
        self.rule_at(offset)?
            .selectors
            .iter()
            .find(|s| s.span.touches(offset))
    }

    /// Import whose path literal contains the offset
    pub fn import_at(&self, offset: usize) -> Option<&Import> {
        self.imports.iter().find(|i| i.path_span.touches(offset))
    }

    pub fn variable_ref_at(&self, offset: usize) -> Option<&VariableRef> {
        self.property_at(offset)?
            .variable_refs
            .iter()
            .find(|r| r.span.touches(offset))
    }
}

/// Parse a whole document
pub fn parse(text: &str) -> ParseResult {
    DocumentParser::new(text).run()
}

/// Rule being filled while the scanner is inside its block
struct OpenRule {
    rule: Rule,
}

struct DocumentParser<'a> {
    text: &'a str,
    scanner: Scanner<'a>,
    rules: Vec<Rule>,
    imports: Vec<Import>,
    nested_blocks: Vec<Span>,
    /// First to last significant token of the statement being read
    segment: Option<Span>,
    current: Option<OpenRule>,
}

impl<'a> DocumentParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            scanner: Scanner::new(text),
            rules: Vec::new(),
            imports: Vec::new(),
            nested_blocks: Vec::new(),
            segment: None,
            current: None,
        }
    }

    fn run(mut self) -> ParseResult {
        while let Some(token) = self.scanner.next() {
            if self.current.is_some() {
                self.inside_block(token);
            } else {
                self.outside_block(token);
            }
        }

        // Document ended inside a block: keep what was read
        if let Some(open) = self.current.take() {
            let segment = self.segment.take();
            let mut rule = open.rule;
            if let Some(segment) = segment {
                if let Some(property) = ast::parse_declaration(self.text, segment) {
                    rule.properties.push(property);
                }
            }
            rule.span.end = self.text.len();
            rule.closed = false;
            log::debug!("Rule '{}' is not closed", rule.selector_text);
            self.rules.push(rule);
        }

        let custom_properties = collect_custom_properties(&self.rules);

        ParseResult {
            rules: self.rules,
            imports: self.imports,
            custom_properties,
            nested_blocks: self.nested_blocks,
            line_index: LineIndex::new(self.text),
        }
    }

    fn extend_segment(&mut self, span: Span) {
        self.segment = Some(match self.segment {
            Some(segment) => segment.cover(span),
            None => span,
        });
    }

    fn outside_block(&mut self, token: Token) {
        match token.kind {
            TokenKind::Text => self.extend_segment(token.span),
            TokenKind::Semicolon => {
                if let Some(segment) = self.segment.take() {
                    let statement = segment.cover(token.span);
                    if let Some(import) = ast::parse_import(self.text, statement) {
                        self.imports.push(import);
                    }
                }
            }
            TokenKind::OpenBrace => {
                let clause = self.segment.take();
                let clause_text = clause.map(|c| &self.text[c.start..c.end]);

                match (clause, clause_text) {
                    (Some(clause), Some(text)) if !text.starts_with('@') => {
                        self.open_rule(clause, token.span);
                    }
                    _ => {
                        log::debug!("Skipping block without selector at {}", token.span.start);
                        self.skip_block(true);
                    }
                }
            }
            TokenKind::CloseBrace => {
                // Stray closing brace: reported by the syntax validator
                self.segment = None;
            }
        }
    }

    fn open_rule(&mut self, clause: Span, brace: Span) {
        let selectors = ast::parse_selector_list(self.text, clause);
        self.current = Some(OpenRule {
            rule: Rule {
                selector_text: self.text[clause.start..clause.end].to_string(),
                selectors,
                properties: Vec::new(),
                span: clause.cover(brace),
                closed: true,
            },
        });
    }

    fn inside_block(&mut self, token: Token) {
        match token.kind {
            TokenKind::Text => self.extend_segment(token.span),
            TokenKind::Semicolon => self.finish_declaration(),
            TokenKind::OpenBrace => {
                // No nesting in USS: record the anomaly and skip its content
                let start = self.segment.take().map_or(token.span.start, |s| s.start);
                let end = self.skip_block(false);
                self.nested_blocks.push(Span::new(start, end));
            }
            TokenKind::CloseBrace => {
                self.finish_declaration();
                if let Some(open) = self.current.take() {
                    let mut rule = open.rule;
                    rule.span.end = token.span.end;
                    self.rules.push(rule);
                }
            }
        }
    }

    fn finish_declaration(&mut self) {
        let Some(segment) = self.segment.take() else {
            return;
        };
        let Some(open) = self.current.as_mut() else {
            return;
        };
        if let Some(property) = ast::parse_declaration(self.text, segment) {
            open.rule.properties.push(property);
        }
    }

    /// Skip the block whose opening brace was just consumed. Returns the end
    /// offset of its closing brace, or the text length when it never closes.
    ///
    /// With `record_inner`, blocks opened directly inside the skipped one are
    /// recorded as nested blocks.
    fn skip_block(&mut self, record_inner: bool) -> usize {
        let mut depth = 1usize;
        let mut statement_start: Option<usize> = None;
        let mut inner_start: Option<usize> = None;

        while let Some(token) = self.scanner.next() {
            match token.kind {
                TokenKind::Text => {
                    if depth == 1 && statement_start.is_none() {
                        statement_start = Some(token.span.start);
                    }
                }
                TokenKind::Semicolon => {
                    if depth == 1 {
                        statement_start = None;
                    }
                }
                TokenKind::OpenBrace => {
                    if depth == 1 && record_inner {
                        inner_start = Some(statement_start.take().unwrap_or(token.span.start));
                    }
                    depth += 1;
                }
                TokenKind::CloseBrace => {
                    depth -= 1;
                    if depth == 1 {
                        if let Some(start) = inner_start.take() {
                            self.nested_blocks.push(Span::new(start, token.span.end));
                        }
                        statement_start = None;
                    }
                    if depth == 0 {
                        return token.span.end;
                    }
                }
            }
        }

        if let Some(start) = inner_start {
            self.nested_blocks.push(Span::new(start, self.text.len()));
        }
        self.text.len()
    }
}

fn collect_custom_properties(rules: &[Rule]) -> Vec<CustomProperty> {
    rules
        .iter()
        .enumerate()
        .flat_map(|(rule_index, rule)| {
            rule.properties
                .iter()
                .filter(|p| p.is_custom_property)
                .map(move |p| CustomProperty {
                    name: p.name.clone(),
                    value: p.value.clone(),
                    name_span: p.name_span,
                    span: p.span,
                    rule_index,
                })
        })
        .collect()
}
