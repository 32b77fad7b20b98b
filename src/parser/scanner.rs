//! USS Scanner
//!
//! Single forward pass over a whole document. Comments and whitespace are
//! consumed here so that the parser and the syntax validator only ever see
//! structural tokens, whatever the line layout of the source.

use crate::core::Span;

/// Token types produced by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `;`
    Semicolon,
    /// Any other run of significant characters, or one quoted string
    Text,
}

/// A token with its byte span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    BlockComment,
    LineComment,
    String(u8),
}

/// Streaming tokenizer over a document
///
/// `//` only opens a line comment at the start of a statement (after `{`, `}`,
/// `;` or at the beginning of the text) or as the first non-blank text of a
/// line, so URLs inside values are left alone.
pub struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    state: State,
    at_statement_start: bool,
    at_line_start: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            state: State::Code,
            at_statement_start: true,
            at_line_start: true,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn emit(&mut self, kind: TokenKind, start: usize) -> Token {
        self.at_statement_start = kind != TokenKind::Text;
        self.at_line_start = false;
        Token {
            kind,
            span: Span::new(start, self.pos),
        }
    }

    /// Skip comments, returning once the scanner is back in code
    fn skip_trivia(&mut self) {
        loop {
            match self.state {
                State::BlockComment => {
                    match self.text[self.pos..].find("*/") {
                        Some(idx) => self.pos += idx + 2,
                        None => self.pos = self.bytes.len(),
                    }
                    self.state = State::Code;
                }
                State::LineComment => {
                    match self.text[self.pos..].find('\n') {
                        Some(idx) => self.pos += idx + 1,
                        None => self.pos = self.bytes.len(),
                    }
                    self.state = State::Code;
                    self.at_line_start = true;
                }
                State::String(_) => return,
                State::Code => match (self.peek(0), self.peek(1)) {
                    (Some(b'\n'), _) => {
                        self.pos += 1;
                        self.at_line_start = true;
                    }
                    (Some(b), _) if b.is_ascii_whitespace() => self.pos += 1,
                    (Some(b'/'), Some(b'*')) => {
                        self.pos += 2;
                        self.state = State::BlockComment;
                    }
                    (Some(b'/'), Some(b'/')) if self.at_statement_start || self.at_line_start => {
                        self.pos += 2;
                        self.state = State::LineComment;
                    }
                    _ => return,
                },
            }
        }
    }

    /// Consume a quoted string. Unterminated strings stop at the end of line.
    fn scan_string(&mut self, quote: u8) {
        self.state = State::String(quote);
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            match b {
                b'\\' => self.pos = (self.pos + 2).min(self.bytes.len()),
                b'\n' => break,
                _ if b == quote => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.state = State::Code;
    }

    /// Consume a run of ordinary characters, stopping before anything the
    /// scanner treats specially
    fn scan_text(&mut self) {
        while let Some(b) = self.peek(0) {
            match b {
                b'{' | b'}' | b';' | b'"' | b'\'' => break,
                _ if b.is_ascii_whitespace() => break,
                b'/' if self.peek(1) == Some(b'*') => break,
                _ => self.pos += 1,
            }
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.skip_trivia();

        let start = self.pos;
        let b = self.peek(0)?;

        let token = match b {
            b'{' => {
                self.pos += 1;
                self.emit(TokenKind::OpenBrace, start)
            }
            b'}' => {
                self.pos += 1;
                self.emit(TokenKind::CloseBrace, start)
            }
            b';' => {
                self.pos += 1;
                self.emit(TokenKind::Semicolon, start)
            }
            b'"' | b'\'' => {
                self.scan_string(b);
                self.emit(TokenKind::Text, start)
            }
            _ => {
                self.scan_text();
                if self.pos == start {
                    // lone '/' not starting a comment
                    self.pos += 1;
                }
                self.emit(TokenKind::Text, start)
            }
        };

        Some(token)
    }
}

/// Tokenize a whole document
pub fn tokenize(text: &str) -> Vec<Token> {
    Scanner::new(text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).into_iter().map(|t| t.kind).collect()
    }

    fn texts(text: &str) -> Vec<&str> {
        tokenize(text)
            .into_iter()
            .map(|t| &text[t.span.start..t.span.end])
            .collect()
    }

    #[test]
    fn test_tokenize_simple_rule() {
        assert_eq!(
            texts(".button { color: red; }"),
            vec![".button", "{", "color:", "red", ";", "}"]
        );
        assert_eq!(
            kinds(".a{}"),
            vec![TokenKind::Text, TokenKind::OpenBrace, TokenKind::CloseBrace]
        );
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        let text = "/* a {\n still comment }\n*/ .x { }";
        assert_eq!(texts(text), vec![".x", "{", "}"]);
    }

    #[test]
    fn test_comment_inside_value() {
        assert_eq!(
            texts(".x { color: red /* ; } */; }"),
            vec![".x", "{", "color:", "red", ";", "}"]
        );
    }

    #[test]
    fn test_line_comment_at_statement_start() {
        let text = "// .hidden { }\n.x { // note\n a: b; }";
        assert_eq!(texts(text), vec![".x", "{", "a:", "b", ";", "}"]);
    }

    #[test]
    fn test_line_comment_inside_declaration() {
        let text = ".x {\n  color: red\n  // }\n}";
        assert_eq!(texts(text), vec![".x", "{", "color:", "red", "}"]);

        let indented = ".x {\n  a: b,\n\t// c,\n  d;\n}";
        assert_eq!(texts(indented), vec![".x", "{", "a:", "b,", "d", ";", "}"]);
    }

    #[test]
    fn test_double_slash_inside_value_is_text() {
        let text = ".x { background-image: url(http://host/a.png); }";
        assert!(texts(text).contains(&"url(http://host/a.png)"));
    }

    #[test]
    fn test_strings_hide_structural_characters() {
        let text = "@import \"a;b{}.uss\";";
        assert_eq!(texts(text), vec!["@import", "\"a;b{}.uss\"", ";"]);
    }

    #[test]
    fn test_unterminated_string_stops_at_line_end() {
        let text = ".x { -unity-font: \"abc\n}";
        assert_eq!(kinds(text).last(), Some(&TokenKind::CloseBrace));
    }

    #[test]
    fn test_unterminated_comment_runs_to_end() {
        assert!(tokenize("/* { { {").is_empty());
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \n\t \r\n").is_empty());
    }
}
