//! Byte offset to line/column conversion
//!
//! The engine works exclusively with byte offsets into the input. Diagnostics are reported
//! to humans, so they need line and column numbers. [`SourceLocation`] pre-computes the byte
//! offset of every line start once, after which each conversion is a binary search:
//!
//! ```text
//! Source: "ab\ncd"
//!   line_starts = [0, 3]
//!   byte_to_position(4) -> line 2, column 2
//! ```
//!
//! Lines and columns are 1-based. Columns count characters, not bytes, so multi-byte UTF-8
//! input reports the column a user would see in an editor.

use std::fmt;

/// A 1-based line/column position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Provides fast conversion from byte offsets to line/column positions
pub struct SourceLocation<'a> {
    source: &'a str,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl<'a> SourceLocation<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self {
            source,
            line_starts,
        }
    }

    /// Convert a byte offset to a position. Offsets past the end clamp to the end of input.
    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let offset = floor_char_boundary(self.source, byte_offset);
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);

        let column = self.source[self.line_starts[line]..offset].chars().count() + 1;

        Position::new(line + 1, column)
    }

    /// Text of a 1-based line, without its terminating newline
    pub fn line_text(&self, line: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());
        Some(self.source[start..end].trim_end_matches('\r'))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// What sits at `pos`, as shown in diagnostics: the quoted character, or `EOF`.
pub fn found_at(source: &str, pos: usize) -> String {
    match source.get(pos..).and_then(|rest| rest.chars().next()) {
        Some(ch) => format!("{:?}", ch),
        None => "EOF".to_string(),
    }
}

fn floor_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
