//! Text Positions
//!
//! Byte spans, line/character positions and the index converting between them.
//! Characters are counted in UTF-16 code units, the LSP default encoding.

/// Half-open byte range into a document's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `other` lies entirely inside this span
    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when `offset` falls inside the span (end inclusive, so a cursor
    /// sitting right after a token still hits it)
    pub fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Span covering both `self` and `other`
    pub fn cover(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Zero-based line and UTF-16 character offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Range between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }
}

/// Line start table for one document snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct LineIndex {
    text: String,
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(idx, _)| idx + 1),
        );

        Self {
            text: text.to_string(),
            line_starts,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte span of a line, excluding its line terminator
    pub fn line_span(&self, line: usize) -> Option<Span> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let end = if end > start && self.text.as_bytes()[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };
        Some(Span::new(start, end))
    }

    /// Range covering a whole line
    pub fn line_range(&self, line: usize) -> Range {
        match self.line_span(line) {
            Some(span) => self.range(span),
            None => Range::default(),
        }
    }

    /// Line containing a byte offset
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }

    /// Convert a byte offset into a position, clamping to the text length
    pub fn position(&self, offset: usize) -> Position {
        let offset = self.floor_char_boundary(offset.min(self.text.len()));
        let line = self.line_of(offset);
        let line_start = self.line_starts[line];
        let character = self.text[line_start..offset].encode_utf16().count();
        Position::new(line as u32, character as u32)
    }

    pub fn range(&self, span: Span) -> Range {
        Range::new(self.position(span.start), self.position(span.end))
    }

    /// Convert a position back into a byte offset. Characters past the end of
    /// the line clamp to the line end; lines past the end yield `None`.
    pub fn offset(&self, position: Position) -> Option<usize> {
        let line = self.line_span(position.line as usize)?;
        let mut utf16 = 0u32;
        for (idx, ch) in self.text[line.start..line.end].char_indices() {
            if utf16 >= position.character {
                return Some(line.start + idx);
            }
            utf16 += ch.len_utf16() as u32;
        }
        Some(line.end)
    }

    fn floor_char_boundary(&self, mut offset: usize) -> usize {
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_across_lines() {
        let index = LineIndex::new("a {\n  b: c;\n}");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.position(0), Position::new(0, 0));
        assert_eq!(index.position(6), Position::new(1, 2));
        assert_eq!(index.position(12), Position::new(2, 0));
    }

    #[test]
    fn test_offset_round_trip() {
        let index = LineIndex::new("x\n.button { color: red; }");
        let offset = index.offset(Position::new(1, 10)).unwrap();
        assert_eq!(&index.text()[offset..offset + 5], "color");
        assert_eq!(index.position(offset), Position::new(1, 10));
    }

    #[test]
    fn test_utf16_columns() {
        let index = LineIndex::new(".é { a: b; }");
        // 'é' is two bytes but one UTF-16 unit
        assert_eq!(index.position(4), Position::new(0, 3));
        assert_eq!(index.offset(Position::new(0, 3)), Some(4));
    }

    #[test]
    fn test_line_span_strips_carriage_return() {
        let index = LineIndex::new("a\r\nbc");
        assert_eq!(index.line_span(0), Some(Span::new(0, 1)));
        assert_eq!(index.line_span(1), Some(Span::new(3, 5)));
        assert_eq!(index.line_span(2), None);
    }

    #[test]
    fn test_offset_past_line_end_clamps() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.offset(Position::new(0, 10)), Some(2));
        assert_eq!(index.offset(Position::new(5, 0)), None);
    }
}
