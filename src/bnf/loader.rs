//! Grammar loading utilities
//!
//! This module provides `GrammarLoader` - a utility for loading grammar text from files,
//! strings or readers and turning it into a [`Grammar`]. Loading does not validate: callers
//! run [`Grammar::validate`] once they have picked the start rule.
//!
//! # Example
//!
//! ```rust
//! use bnf_match::bnf::loader::GrammarLoader;
//!
//! // From file
//! let grammar = GrammarLoader::from_path("grammars/postal.bnf").unwrap().load().unwrap();
//!
//! // From string
//! let mut grammar = GrammarLoader::from_string("S ::= \"a\" | \"b\"").load().unwrap();
//! grammar.validate().unwrap();
//! assert!(grammar.is_match("b"));
//! ```

use crate::bnf::error::GrammarError;
use crate::bnf::grammar::Grammar;
use crate::bnf::syntax::{build_grammar, parse_grammar, GrammarAst, SyntaxError};
use log::debug;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Error that can occur when loading grammars
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// IO error when reading the grammar
    Io(String),
    /// Grammar text is malformed
    Syntax(SyntaxError),
    /// Grammar text is well-formed but describes an invalid grammar
    Grammar(GrammarError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(msg) => write!(f, "IO error: {}", msg),
            LoadError::Syntax(err) => write!(f, "syntax error: {}", err),
            LoadError::Grammar(err) => write!(f, "grammar error: {}", err),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(_) => None,
            LoadError::Syntax(err) => Some(err),
            LoadError::Grammar(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err.to_string())
    }
}

impl From<SyntaxError> for LoadError {
    fn from(err: SyntaxError) -> Self {
        LoadError::Syntax(err)
    }
}

impl From<GrammarError> for LoadError {
    fn from(err: GrammarError) -> Self {
        LoadError::Grammar(err)
    }
}

/// Grammar source with shortcuts for each stage of the front end
pub struct GrammarLoader {
    source: String,
}

impl GrammarLoader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        debug!("reading grammar from {}", path.display());
        let source = fs::read_to_string(path)?;
        Ok(GrammarLoader { source })
    }

    pub fn from_string<S: Into<String>>(source: S) -> Self {
        GrammarLoader {
            source: source.into(),
        }
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, LoadError> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(GrammarLoader { source })
    }

    /// Parse the source without building it
    pub fn parse(&self) -> Result<GrammarAst, LoadError> {
        Ok(parse_grammar(&self.source)?)
    }

    /// Parse and build the grammar. Undefined rule references are reported by
    /// [`Grammar::validate`], not here.
    pub fn load(&self) -> Result<Grammar, LoadError> {
        let ast = self.parse()?;
        debug!("parsed {} rules: {:?}", ast.rules.len(), ast.rule_names());
        Ok(build_grammar(&ast)?)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

pub fn load_grammar_str(source: &str) -> Result<Grammar, LoadError> {
    GrammarLoader::from_string(source).load()
}

pub fn load_grammar_file<P: AsRef<Path>>(path: P) -> Result<Grammar, LoadError> {
    GrammarLoader::from_path(path)?.load()
}

pub fn load_grammar_reader<R: Read>(reader: R) -> Result<Grammar, LoadError> {
    GrammarLoader::from_reader(reader)?.load()
}
