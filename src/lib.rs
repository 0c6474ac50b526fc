//! # bnf-match
//!
//! A generalized packrat matcher for BNF grammars.
//!
//! Grammars are written in a small BNF dialect (or built programmatically with
//! [`GrammarBuilder`]) and matched against input text. Every alternative is explored, so
//! ambiguous grammars yield every derivation, and left-recursive rules such as
//! `expr ::= expr "+" term | term` are handled by growing a memoized seed. When the input
//! is not derivable, the [`ParseError`] points at the farthest position reached and lists
//! everything the grammar would have accepted there.
//!
//! ```text
//! let mut grammar = load_grammar_str("S ::= \"a\" | \"b\"")?;
//! grammar.validate()?;
//! grammar.match_input("a")?;
//! let tree = grammar.parse("b")?;   // (S "b")
//! ```

pub mod bnf;

pub use bnf::ast::AstNode;
pub use bnf::error::{EngineError, GrammarError, MatchError};
pub use bnf::grammar::{Grammar, GrammarBuilder};
pub use bnf::loader::{load_grammar_file, load_grammar_reader, load_grammar_str, LoadError};
pub use bnf::parse_error::ParseError;
