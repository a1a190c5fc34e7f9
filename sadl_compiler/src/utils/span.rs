//! Source location tracking for the SADL compiler
//!
//! Positions and spans are attached to every token so that syntax errors can
//! point at the offending text. Model and validation errors are structural and
//! do not carry spans.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// The starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance past one character. Every character, tabs included, is one column wide.
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// A zero-width span at a position, used for end of input
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset < other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset > other.end.offset {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    pub fn line(&self) -> u32 {
        self.start.line
    }

    pub fn column(&self) -> u32 {
        self.start.column
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A source map that tracks line starts for excerpt rendering
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    /// Display name of the source, usually the file path
    pub name: Option<String>,
    /// The original source text
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            name: None,
            source,
            line_starts,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get a line of text by line number (1-based), without its terminator
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        if line_num == 0 {
            return None;
        }
        let line_idx = (line_num - 1) as usize;
        let start = *self.line_starts.get(line_idx)?;
        let end = match self.line_starts.get(line_idx + 1) {
            Some(next) => next - 1,
            None => self.source.len(),
        };
        Some(self.source[start..end].trim_end_matches('\r'))
    }

    /// Render a diagnostic with up to `context_lines` lines leading up to the
    /// span's line, followed by a caret underline beneath the span.
    pub fn format_error(&self, span: &Span, message: &str, context_lines: u32) -> String {
        let mut result = String::new();
        result.push_str(message);
        result.push('\n');

        let location = match &self.name {
            Some(name) => format!("{}:{}:{}", name, span.start.line, span.start.column),
            None => format!("{}:{}", span.start.line, span.start.column),
        };
        result.push_str(&format!("  --> {}\n", location));

        if self.get_line(span.start.line).is_none() {
            return result;
        }

        let first = span.start.line.saturating_sub(context_lines).max(1);
        let width = span.start.line.to_string().len();
        for line_num in first..=span.start.line {
            if let Some(line) = self.get_line(line_num) {
                result.push_str(&format!("{:>width$} | {}\n", line_num, line, width = width));
            }
        }

        let underline_len = if span.start.line == span.end.line {
            (span.end.column.saturating_sub(span.start.column)) as usize
        } else {
            1
        };
        result.push_str(&format!(
            "{:>width$} | {}{}\n",
            "",
            " ".repeat(span.start.column.saturating_sub(1) as usize),
            "^".repeat(underline_len.max(1)),
            width = width
        ));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance_tracks_lines() {
        let pos = Position::start().advance_str("ab\nc");
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 2);
        assert_eq!(pos.offset, 4);
    }

    #[test]
    fn test_get_line() {
        let map = SourceMap::new("one\ntwo\r\nthree".to_string());
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.get_line(1), Some("one"));
        assert_eq!(map.get_line(2), Some("two"));
        assert_eq!(map.get_line(3), Some("three"));
        assert_eq!(map.get_line(4), None);
        assert_eq!(map.get_line(0), None);
    }

    #[test]
    fn test_format_error_underlines_span() {
        let map = SourceMap::new("name foo\ntype Foo Strang\n".to_string()).with_name("foo.sadl");
        let start = Position::new(18, 2, 10);
        let end = Position::new(24, 2, 16);
        let text = map.format_error(&Span::new(start, end), "Syntax error", 5);

        assert!(text.starts_with("Syntax error\n"));
        assert!(text.contains("--> foo.sadl:2:10"));
        assert!(text.contains("1 | name foo"));
        assert!(text.contains("2 | type Foo Strang"));
        assert!(text.contains("  |          ^^^^^^"));
    }
}
