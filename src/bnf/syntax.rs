//! Grammar-text front end
//!
//! Turns BNF-style source text into a [`Grammar`](crate::bnf::grammar::Grammar):
//!
//! ```text
//! source --tokenize--> tokens --parse--> GrammarAst --build--> Grammar
//! ```
//!
//! The accepted syntax: `name ::= expr` rules (the first one is the start rule), `|` for
//! alternatives (also across lines), juxtaposition for sequences, `"..."` or `'...'`
//! literals, bare or `<bracketed>` rule names, `( )` grouping, postfix `*` `+` `?`,
//! `/.../` regex atoms and `#`, `;`, `//` line comments.

mod build;
mod grammar_ast;
mod lexer;
mod parser;
mod tokens;

pub use build::build_grammar;
pub use grammar_ast::{ExprAst, GrammarAst, RuleAst};
pub use lexer::{tokenize, TokenLocation};
pub use parser::parse_grammar;
pub use tokens::Token;

use crate::bnf::location::Position;
use std::fmt;
use std::ops::Range;

/// Errors in grammar source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// Text that is not a token, including literals with unknown escapes
    Lexical {
        span: Range<usize>,
        position: Position,
        text: String,
    },
    /// Tokens before the first `name ::=`
    MissingRuleHeader {
        span: Range<usize>,
        position: Position,
        found: String,
    },
    Unexpected {
        span: Range<usize>,
        position: Position,
        rule: String,
        found: String,
        expected: String,
    },
    EmptyRule {
        name: String,
        span: Range<usize>,
        position: Position,
    },
}

impl SyntaxError {
    pub fn position(&self) -> Position {
        match self {
            SyntaxError::Lexical { position, .. }
            | SyntaxError::MissingRuleHeader { position, .. }
            | SyntaxError::Unexpected { position, .. }
            | SyntaxError::EmptyRule { position, .. } => *position,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::Lexical { position, text, .. } => {
                write!(f, "{}: invalid token {:?}", position, text)
            }
            SyntaxError::MissingRuleHeader { position, found, .. } => {
                write!(f, "{}: expected a rule header 'name ::=', found {}", position, found)
            }
            SyntaxError::Unexpected {
                position,
                rule,
                found,
                expected,
                ..
            } => write!(
                f,
                "{}: in rule '{}': expected {}, found {}",
                position, rule, expected, found
            ),
            SyntaxError::EmptyRule { position, name, .. } => {
                write!(f, "{}: rule '{}' has an empty definition", position, name)
            }
        }
    }
}

impl std::error::Error for SyntaxError {}
