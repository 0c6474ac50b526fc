//! Farthest-failure report for inputs that are not derivable
//!
//! A [`ParseError`] describes the single deepest point the engine reached before every
//! derivation gave up, together with everything the grammar would have accepted there.
//! `Expected` is kept raw: quoted literals (`"a"`), rule names and regex sources all appear.
//! [`ParseError::pretty`] is the human rendering and only lists the quoted literals.

use crate::bnf::location::SourceLocation;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Byte offset of the farthest failure
    pub pos: usize,
    pub line: usize,
    pub column: usize,
    /// Active rule names, outermost first, when the farthest failure was first recorded
    pub rule_stack: Vec<String>,
    /// Deduplicated union of every expectation recorded at `pos`, in first-seen order
    pub expected: Vec<String>,
    /// Quoted character at `pos`, or `EOF`
    pub found: String,
    /// Caret span for [`pretty`](Self::pretty): longest quoted literal in `expected`, at least 1
    pub width: usize,
}

impl ParseError {
    /// Expectations that are quoted literals, dropping rule names and regex sources
    pub fn expected_literals(&self) -> Vec<&str> {
        self.expected
            .iter()
            .map(String::as_str)
            .filter(|e| is_quoted_literal(e))
            .collect()
    }

    /// Render the offending source line with a caret span under the failure position
    pub fn pretty(&self, input: &str) -> String {
        let location = SourceLocation::new(input);
        let source_line = location.line_text(self.line).unwrap_or("");
        let gutter = self.line.to_string();
        let pad = " ".repeat(gutter.len());

        let mut out = format!("Parse error at line {}, column {}\n", self.line, self.column);
        out.push_str(&format!("{} |\n", pad));
        out.push_str(&format!("{} | {}\n", gutter, source_line));
        out.push_str(&format!(
            "{} | {}{}\n",
            pad,
            " ".repeat(self.column.saturating_sub(1)),
            "^".repeat(self.width)
        ));

        let literals = self.expected_literals();
        if !literals.is_empty() {
            out.push_str(&format!("expected one of: {}\n", literals.join(", ")));
        }
        out.push_str(&format!("found: {}", self.found));
        if let Some(rule) = self.rule_stack.last() {
            out.push_str(&format!("\nwhile matching rule: {}", rule));
        }
        out
    }
}

/// One line per field: position, rule stack, expectations, what was found
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  Parse error at line {}, col {}",
            self.line, self.column
        )?;
        writeln!(f, "  While matching rule: [{}]", self.rule_stack.join(" "))?;
        writeln!(f, "  Expected: [{}]", self.expected.join(" "))?;
        writeln!(f, "  Found: {}", self.found)
    }
}

impl std::error::Error for ParseError {}

fn is_quoted_literal(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('"') && token.ends_with('"')
}

/// Caret width for a set of expectations: the longest quoted literal in characters, minimum 1
pub fn expected_width(expected: &[String]) -> usize {
    expected
        .iter()
        .filter(|e| is_quoted_literal(e))
        .map(|e| e[1..e.len() - 1].chars().count())
        .max()
        .filter(|w| *w > 0)
        .unwrap_or(1)
}
