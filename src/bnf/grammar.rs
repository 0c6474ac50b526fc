//! Grammar: named rules over a shared node arena
//!
//! A [`Grammar`] is produced by [`GrammarBuilder`] (or by the grammar-text loader, which
//! drives the builder). After [`Grammar::resolve`] every non-terminal is bound to its rule and
//! the whole structure is read-only: matching takes `&self`, allocates a fresh
//! [`Context`](crate::bnf::engine::Context) per call and can run from several threads at once.
//!
//! Entry points:
//!
//! - [`Grammar::match_input`] / [`Grammar::match_from`]: full-length acceptance
//! - [`Grammar::match_prefix`]: some non-empty derivation exists from position 0
//! - [`Grammar::parse`] / [`Grammar::parse_all`]: AST of the first / every full-length derivation

pub mod builder;

pub use builder::GrammarBuilder;

use crate::bnf::ast::AstNode;
use crate::bnf::engine::{Context, MatchResult, Matches};
use crate::bnf::error::{GrammarError, MatchError};
use crate::bnf::node::{Node, NodeId};
use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Index into the grammar's rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(pub u32);

impl RuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub body: NodeId,
}

#[derive(Debug, Clone)]
pub struct Grammar {
    nodes: Vec<Node>,
    rules: Vec<Rule>,
    index: HashMap<String, RuleId>,
    start: Option<String>,
}

impl Grammar {
    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        rules: Vec<Rule>,
        index: HashMap<String, RuleId>,
        start: Option<String>,
    ) -> Self {
        Self {
            nodes,
            rules,
            index,
            start,
        }
    }

    /// Bind every non-terminal reachable from a rule to the rule it names.
    ///
    /// Fails on the first name with no rule, reporting the rule it was referenced from.
    /// Running it again on a resolved grammar changes nothing.
    pub fn resolve(&mut self) -> Result<(), GrammarError> {
        let mut bindings = Vec::new();
        let mut visited = HashSet::new();

        for rule in &self.rules {
            let mut stack = vec![rule.body];
            while let Some(id) = stack.pop() {
                if !visited.insert(id) {
                    continue;
                }
                let node = &self.nodes[id.index()];
                if let Node::NonTerminal { name, .. } = node {
                    let target =
                        self.index
                            .get(name)
                            .copied()
                            .ok_or_else(|| GrammarError::UndefinedRule {
                                name: name.clone(),
                                referenced_from: rule.name.clone(),
                            })?;
                    bindings.push((id, target));
                }
                stack.extend(node.children().iter().rev());
            }
        }

        debug!(
            "resolved {} non-terminals across {} rules",
            bindings.len(),
            self.rules.len()
        );
        for (id, target) in bindings {
            if let Node::NonTerminal { rule, .. } = &mut self.nodes[id.index()] {
                *rule = Some(target);
            }
        }
        Ok(())
    }

    /// Check that the start rule exists, then resolve.
    pub fn validate(&mut self) -> Result<(), GrammarError> {
        self.start_rule()?;
        self.resolve()
    }

    /// Rebind the entry rule. The name is checked when matching or validating.
    pub fn set_start(&mut self, name: impl Into<String>) {
        self.start = Some(name.into());
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// Rule names in definition order
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|id| &self.rules[id.index()])
    }

    pub(crate) fn rule_by_id(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Human-readable tokens describing what `id` would accept, for diagnostics
    pub fn expect(&self, id: NodeId) -> Vec<String> {
        match self.node(id) {
            Node::Terminal(lit) => vec![format!("{:?}", lit)],
            Node::Regex(atom) => vec![atom.source().to_string()],
            Node::NonTerminal { name, .. } => vec![name.clone()],
            Node::Sequence(items) => items.first().map(|&e| self.expect(e)).unwrap_or_default(),
            Node::Choice(options) => {
                let mut out = Vec::new();
                for &option in options {
                    crate::bnf::node::merge_expected(&mut out, self.expect(option));
                }
                out
            }
            Node::Repeat { inner, .. } | Node::Optional(inner) => self.expect(*inner),
        }
    }

    /// Succeeds iff the start rule derives the whole input.
    ///
    /// Time and memory grow with the input length and the number of derivations. The one
    /// exception is a cyclic unit rule such as `A ::= A | "a"`, which yields a new duplicate
    /// derivation on every growth round: its growth is cut off after `2 * (n + 1) + 2` rounds
    /// (`n` being the input left at that position) with a warning logged, and the derivations
    /// collected so far are kept.
    pub fn match_input(&self, input: &str) -> Result<(), MatchError> {
        let rule = self.start_rule()?;
        self.match_rule(rule, input)
    }

    /// Like [`match_input`](Self::match_input) but from the named rule
    pub fn match_from(&self, start: &str, input: &str) -> Result<(), MatchError> {
        let rule = self.lookup_start(start)?;
        self.match_rule(rule, input)
    }

    pub fn is_match(&self, input: &str) -> bool {
        self.match_input(input).is_ok()
    }

    /// Succeeds iff the start rule derives some prefix of the input, including the empty one
    pub fn match_prefix(&self, input: &str) -> Result<(), MatchError> {
        let rule = self.start_rule()?;
        let mut ctx = Context::new(self, input);
        let results = ctx.match_rule(rule)?;
        if results.is_empty() {
            return Err(ctx.parse_error().into());
        }
        Ok(())
    }

    /// AST of the first full-length derivation of the start rule
    pub fn parse(&self, input: &str) -> Result<AstNode, MatchError> {
        let rule = self.start_rule()?;
        self.parse_rule(rule, input)
    }

    pub fn parse_from(&self, start: &str, input: &str) -> Result<AstNode, MatchError> {
        let rule = self.lookup_start(start)?;
        self.parse_rule(rule, input)
    }

    /// Every full-length derivation, in the order the engine produced them
    pub fn parse_all(&self, input: &str) -> Result<Vec<AstNode>, MatchError> {
        let rule = self.start_rule()?;
        let (name, full) = self.full_matches(rule, input)?;
        Ok(full.iter().map(|r| self.wrap_root(name, r)).collect())
    }

    fn match_rule(&self, rule: RuleId, input: &str) -> Result<(), MatchError> {
        self.full_matches(rule, input).map(|_| ())
    }

    fn parse_rule(&self, rule: RuleId, input: &str) -> Result<AstNode, MatchError> {
        let (name, mut full) = self.full_matches(rule, input)?;
        Ok(self.wrap_root(name, &full.swap_remove(0)))
    }

    /// Full-length results of `rule` (never empty), or the farthest failure when there are none
    fn full_matches(
        &self,
        rule: RuleId,
        input: &str,
    ) -> Result<(&str, Vec<MatchResult>), MatchError> {
        let mut ctx = Context::new(self, input);
        let results: Matches = ctx.match_rule(rule)?;
        let full: Vec<MatchResult> = results
            .iter()
            .filter(|r| r.end == input.len())
            .cloned()
            .collect();

        if full.is_empty() {
            if !results.is_empty() {
                // a prefix matched: the start rule itself failed to reach the end
                ctx.record_incomplete(self.rule_by_id(rule).body);
            }
            return Err(ctx.parse_error().into());
        }
        Ok((self.rule_by_id(rule).name.as_str(), full))
    }

    fn start_rule(&self) -> Result<RuleId, GrammarError> {
        match self.start.as_deref() {
            None | Some("") => Err(GrammarError::NoStartRule),
            Some(name) => self.lookup_start(name),
        }
    }

    fn lookup_start(&self, name: &str) -> Result<RuleId, GrammarError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| GrammarError::UndefinedStartRule {
                name: name.to_string(),
            })
    }

    /// Wrap a derivation's fragments in a node named after the start rule, unless the
    /// engine already produced exactly that wrapper.
    fn wrap_root(&self, name: &str, result: &MatchResult) -> AstNode {
        let mut nodes = result.nodes(self);
        if nodes.len() == 1 && nodes[0].node_type == name {
            return nodes.remove(0);
        }
        AstNode::rule(name, nodes)
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, nested: bool) -> fmt::Result {
        match self.node(id) {
            Node::Terminal(lit) => write!(f, "{:?}", lit),
            Node::Regex(atom) => write!(f, "/{}/", atom.source().replace('/', "\\/")),
            Node::NonTerminal { name, .. } => write!(f, "{}", name),
            Node::Sequence(items) => {
                if nested {
                    write!(f, "(")?;
                }
                for (i, &item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    self.fmt_node(f, item, true)?;
                }
                if nested {
                    write!(f, ")")?;
                }
                Ok(())
            }
            Node::Choice(options) => {
                if nested {
                    write!(f, "(")?;
                }
                for (i, &option) in options.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    self.fmt_node(f, option, false)?;
                }
                if nested {
                    write!(f, ")")?;
                }
                Ok(())
            }
            Node::Repeat { inner, min, max } => {
                self.fmt_node(f, *inner, true)?;
                match (min, max) {
                    (0, None) => write!(f, "*"),
                    (1, None) => write!(f, "+"),
                    (min, None) => write!(f, "{{{},}}", min),
                    (min, Some(max)) => write!(f, "{{{},{}}}", min, max),
                }
            }
            Node::Optional(inner) => {
                self.fmt_node(f, *inner, true)?;
                write!(f, "?")
            }
        }
    }
}

/// Surface syntax, one rule per line, start rule first
impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start.as_deref().and_then(|s| self.index.get(s)).copied();
        let order = start
            .into_iter()
            .chain((0..self.rules.len() as u32).map(RuleId).filter(|id| Some(*id) != start));
        for id in order {
            let rule = self.rule_by_id(id);
            write!(f, "{} ::= ", rule.name)?;
            self.fmt_node(f, rule.body, false)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bnf::error::EngineError;

    /// Expr ::= Term ("+" Term)*
    /// Term ::= "a"
    fn expr_grammar() -> Grammar {
        let mut b = GrammarBuilder::new();
        let term = b.non_terminal("Term");
        let plus = b.terminal("+");
        let term2 = b.non_terminal("Term");
        let tail_item = b.sequence(vec![plus, term2]);
        let tail = b.zero_or_more(tail_item);
        let body = b.sequence(vec![term, tail]);
        b.rule("Expr", body).unwrap();
        let a = b.terminal("a");
        b.rule("Term", a).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn test_match_full_length_only() {
        let g = expr_grammar();
        assert!(g.is_match("a"));
        assert!(g.is_match("a+a+a"));
        assert!(!g.is_match(""));
        assert!(!g.is_match("a+"));
        assert!(!g.is_match("a++a"));
    }

    #[test]
    fn test_match_prefix() {
        let g = expr_grammar();
        assert!(g.match_prefix("a+").is_ok());
        assert!(g.match_prefix("b").is_err());
    }

    #[test]
    fn test_parse_wraps_start_rule() {
        let g = expr_grammar();
        let ast = g.parse("a+a").unwrap();
        assert_eq!(ast.node_type, "Expr");
        assert_eq!(ast.to_string(), r#"(Expr (Term "a") "+" (Term "a"))"#);
    }

    #[test]
    fn test_set_start_and_match_from() {
        let mut g = expr_grammar();
        assert!(g.match_from("Term", "a").is_ok());
        g.set_start("Term");
        assert!(g.is_match("a"));
        assert!(!g.is_match("a+a"));
    }

    #[test]
    fn test_unknown_start_rule() {
        let g = expr_grammar();
        let err = g.match_from("Nope", "a").unwrap_err();
        assert_eq!(
            err,
            MatchError::Grammar(GrammarError::UndefinedStartRule {
                name: "Nope".to_string()
            })
        );
    }

    #[test]
    fn test_validate_reports_undefined_rule() {
        let mut b = GrammarBuilder::new();
        let missing = b.non_terminal("undefined");
        b.rule("S", missing).unwrap();
        let mut g = b.build().unwrap();

        let err = g.validate().unwrap_err();
        assert!(err.to_string().contains("undefined rule"));
        // matching an unresolved reference is an engine invariant violation
        assert_eq!(
            g.match_input("x").unwrap_err(),
            MatchError::Engine(EngineError::UnresolvedNonTerminal {
                name: "undefined".to_string()
            })
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut g = expr_grammar();
        g.resolve().unwrap();
        let before: Vec<bool> = ["a", "a+a", "+a"].iter().map(|s| g.is_match(s)).collect();
        g.resolve().unwrap();
        g.validate().unwrap();
        let after: Vec<bool> = ["a", "a+a", "+a"].iter().map(|s| g.is_match(s)).collect();
        assert_eq!(before, after);
        assert_eq!(after, vec![true, true, false]);
    }

    #[test]
    fn test_expect_tokens() {
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        let word = b.regex("[a-z]+").unwrap();
        let x = b.non_terminal("X");
        let choice = b.choice(vec![a, word, x, a]);
        let seq = b.sequence(vec![x, a]);
        let empty = b.sequence(vec![]);
        b.rule("X", choice).unwrap();
        let g = b.build().unwrap();

        assert_eq!(g.expect(choice), vec!["\"a\"", "[a-z]+", "X"]);
        assert_eq!(g.expect(seq), vec!["X"]);
        assert!(g.expect(empty).is_empty());
    }

    #[test]
    fn test_display_surface_syntax() {
        let g = expr_grammar();
        insta::assert_snapshot!(g.to_string(), @r###"
        Expr ::= Term ("+" Term)*
        Term ::= "a"
        "###);
    }

    #[test]
    fn test_rule_queries() {
        let g = expr_grammar();
        assert_eq!(g.rule_names().collect::<Vec<_>>(), vec!["Expr", "Term"]);
        assert_eq!(g.start(), Some("Expr"));
        assert!(g.rule("Term").is_some());
        assert!(g.rule("term").is_none());
    }

    #[test]
    fn test_grammar_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grammar>();
    }
}
