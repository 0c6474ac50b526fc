//! Grammar expression algebra
//!
//! Nodes live in an arena owned by the [`Grammar`](crate::bnf::grammar::Grammar) and are
//! referenced by [`NodeId`]. The id, not the structure, is what the engine memoizes on: two
//! structurally identical nodes built separately are cached independently, while a single
//! node shared by several parents is cached once per position.

use crate::bnf::error::GrammarError;
use crate::bnf::grammar::RuleId;
use regex::Regex;
use std::fmt;

/// Index into the grammar's node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A compiled regex atom, anchored at the position it is evaluated at
#[derive(Debug, Clone)]
pub struct RegexAtom {
    source: String,
    anchored: Regex,
}

impl RegexAtom {
    pub fn new(source: &str) -> Result<Self, GrammarError> {
        let anchored = Regex::new(&format!("^(?:{})", source)).map_err(|e| {
            GrammarError::InvalidRegex {
                pattern: source.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            source: source.to_string(),
            anchored,
        })
    }

    /// The pattern as written in the grammar
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Length of the match starting exactly at the beginning of `rest`, if any.
    /// `$` in the pattern refers to the end of the whole input.
    pub fn match_len(&self, rest: &str) -> Option<usize> {
        self.anchored.find(rest).map(|m| m.end())
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Terminal(String),
    Regex(RegexAtom),
    NonTerminal {
        name: String,
        rule: Option<RuleId>,
    },
    Sequence(Vec<NodeId>),
    Choice(Vec<NodeId>),
    Repeat {
        inner: NodeId,
        min: usize,
        max: Option<usize>,
    },
    Optional(NodeId),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Terminal(_) => "terminal",
            Node::Regex(_) => "regex",
            Node::NonTerminal { .. } => "non-terminal",
            Node::Sequence(_) => "sequence",
            Node::Choice(_) => "choice",
            Node::Repeat { .. } => "repeat",
            Node::Optional(_) => "optional",
        }
    }

    /// Direct children in evaluation order
    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Sequence(items) | Node::Choice(items) => items,
            Node::Repeat { inner, .. } | Node::Optional(inner) => std::slice::from_ref(inner),
            Node::Terminal(_) | Node::Regex(_) | Node::NonTerminal { .. } => &[],
        }
    }
}

/// Merge `extra` into `into`, keeping first-seen order and dropping duplicates
pub(crate) fn merge_expected(into: &mut Vec<String>, extra: Vec<String>) {
    for token in extra {
        if !into.contains(&token) {
            into.push(token);
        }
    }
}
