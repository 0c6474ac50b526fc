//! Unresolved grammar as written in the source text
//!
//! Rule references are plain names here. Turning this into a [`Grammar`] (and checking that
//! the names exist) happens in `build`.
//!
//! [`Grammar`]: crate::bnf::grammar::Grammar

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarAst {
    pub rules: Vec<RuleAst>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleAst {
    pub name: String,
    /// Byte range of the rule name in the header
    pub span: Range<usize>,
    pub body: ExprAst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprAst {
    Rule(String),
    Literal(String),
    Regex(String),
    Sequence(Vec<ExprAst>),
    Choice(Vec<ExprAst>),
    ZeroOrMore(Box<ExprAst>),
    OneOrMore(Box<ExprAst>),
    Optional(Box<ExprAst>),
}

impl GrammarAst {
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }
}
