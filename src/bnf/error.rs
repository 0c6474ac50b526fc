//! Error types for grammar construction and matching
//!
//! Three layers, from most to least expected:
//!
//! - [`ParseError`]: the input is not derivable. Carries the farthest failure.
//! - [`GrammarError`]: the grammar itself is broken (undefined rule, missing start rule,
//!   bad regex). Fatal to loading.
//! - [`EngineError`]: an engine invariant was violated. Never happens with a validated
//!   grammar, but surfaces loudly instead of corrupting match state.
//!
//! Every [`Grammar`](crate::bnf::grammar::Grammar) entry point returns [`MatchError`], which
//! wraps all three.

use crate::bnf::node::NodeId;
use crate::bnf::parse_error::ParseError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A grammar needs at least one rule
    EmptyGrammar,
    DuplicateRule {
        name: String,
    },
    /// A non-terminal names a rule that does not exist
    UndefinedRule {
        name: String,
        referenced_from: String,
    },
    NoStartRule,
    UndefinedStartRule {
        name: String,
    },
    InvalidRegex {
        pattern: String,
        message: String,
    },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::EmptyGrammar => write!(f, "grammar defines no rules"),
            GrammarError::DuplicateRule { name } => {
                write!(f, "rule '{}' is defined more than once", name)
            }
            GrammarError::UndefinedRule {
                name,
                referenced_from,
            } => write!(
                f,
                "undefined rule '{}' referenced from rule '{}'",
                name, referenced_from
            ),
            GrammarError::NoStartRule => write!(f, "start rule not defined"),
            GrammarError::UndefinedStartRule { name } => {
                write!(f, "start rule '{}' is an undefined rule", name)
            }
            GrammarError::InvalidRegex { pattern, message } => {
                write!(f, "invalid regex pattern /{}/: {}", pattern, message)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A non-terminal was evaluated before the grammar was resolved
    UnresolvedNonTerminal { name: String },
    /// The rule call stack was popped more often than pushed
    EmptyRuleStack,
    /// A memo seed disappeared while its node was still being grown
    LostSeed { node: NodeId, pos: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::UnresolvedNonTerminal { name } => {
                write!(f, "non-terminal '{}' has no resolved rule", name)
            }
            EngineError::EmptyRuleStack => write!(f, "pop on empty rule stack"),
            EngineError::LostSeed { node, pos } => {
                write!(f, "memo seed for node {} at {} was lost", node, pos)
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Failure of a match or parse call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    Grammar(GrammarError),
    Engine(EngineError),
    Parse(Box<ParseError>),
}

impl MatchError {
    /// The farthest-failure report, when the failure was an ordinary mismatch
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            MatchError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::Grammar(err) => write!(f, "grammar error: {}", err),
            MatchError::Engine(err) => write!(f, "engine error: {}", err),
            MatchError::Parse(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for MatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MatchError::Grammar(err) => Some(err),
            MatchError::Engine(err) => Some(err),
            MatchError::Parse(err) => Some(err.as_ref()),
        }
    }
}

impl From<GrammarError> for MatchError {
    fn from(err: GrammarError) -> Self {
        MatchError::Grammar(err)
    }
}

impl From<EngineError> for MatchError {
    fn from(err: EngineError) -> Self {
        MatchError::Engine(err)
    }
}

impl From<ParseError> for MatchError {
    fn from(err: ParseError) -> Self {
        MatchError::Parse(Box::new(err))
    }
}
