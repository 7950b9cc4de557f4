//! Positions and spans into a single source file.
//!
//! Every AST node and token carries a [`Span`], a byte-offset interval into the
//! original source text (`spec.md` GLOSSARY). [`Position`] and [`SourceFile`]
//! turn a raw offset into a human-readable line/column for diagnostics.

use std::fmt;
use std::ops::Range;

/// A byte-offset interval `(start, end)` into the source text.
///
/// `end` is exclusive. Every surface, typed, and lowered AST node carries one
/// of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self { Self { start, end } }

    /// Creates a span that encompasses both input spans.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl Default for Span {
    fn default() -> Self { Self::new(0, 0) }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self { Self { start: range.start, end: range.end } }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self { span.start..span.end }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A 1-indexed line/column paired with the 0-indexed byte offset it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The single source file a compilation runs over, with precomputed line starts
/// for `O(log n)` offset-to-position lookup.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let line_starts = Self::compute_line_starts(&content);
        Self { name: name.into(), content, line_starts }
    }

    fn compute_line_starts(content: &str) -> Vec<usize> {
        let mut line_starts = vec![0];
        for (i, c) in content.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        line_starts
    }

    /// Converts a byte offset into a [`Position`].
    ///
    /// ## Panics
    ///
    /// Panics if `offset` is greater than the length of the file's content.
    #[must_use]
    pub fn position_from_offset(&self, offset: usize) -> Position {
        assert!(
            offset <= self.content.len(),
            "byte offset {} out of range for file with length {}",
            offset,
            self.content.len()
        );

        match self.line_starts.binary_search(&offset) {
            Ok(line) => Position::new(line + 1, 1, offset),
            Err(line) => {
                let line = line - 1;
                let line_start = self.line_starts[line];
                Position::new(line + 1, offset - line_start + 1, offset)
            }
        }
    }

    /// Returns the source text covered by `span`.
    #[must_use]
    pub fn text(&self, span: Span) -> &str { &self.content[span.start..span.end] }

    /// Returns the line of text containing `position`.
    ///
    /// ## Panics
    ///
    /// Panics if `position.line` is out of range for this file.
    #[must_use]
    pub fn line_at(&self, position: Position) -> &str {
        let idx = position.line - 1;
        assert!(idx < self.line_starts.len(), "line index out of bounds");
        let start = self.line_starts[idx];
        let end = if idx + 1 < self.line_starts.len() {
            self.line_starts[idx + 1] - 1
        } else {
            self.content.len()
        };
        &self.content[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_from_offset_tracks_lines() {
        let file = SourceFile::new("t.livy", "let x = 1\nlet y = 2\n");
        assert_eq!(file.position_from_offset(0), Position::new(1, 1, 0));
        assert_eq!(file.position_from_offset(10), Position::new(2, 1, 10));
    }

    #[test]
    fn text_slices_by_span() {
        let file = SourceFile::new("t.livy", "let x = 1");
        assert_eq!(file.text(Span::new(4, 5)), "x");
    }

    #[test]
    fn span_merge_takes_the_outer_bounds() {
        let a = Span::new(4, 5);
        let b = Span::new(8, 9);
        assert_eq!(a.merge(&b), Span::new(4, 9));
    }
}
