//! Two-pass grammar construction
//!
//! Nodes are allocated first and rules are attached by name, so a body may reference rules
//! that are only defined later (or itself). [`GrammarBuilder::build`] binds the names it
//! already knows; unknown ones stay unbound and surface from [`Grammar::validate`].

use crate::bnf::error::GrammarError;
use crate::bnf::grammar::{Grammar, Rule, RuleId};
use crate::bnf::node::{Node, NodeId, RegexAtom};
use log::debug;
use std::collections::HashMap;

/// A builder that allocates nodes in an arena and registers rules over them.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    nodes: Vec<Node>,
    rules: Vec<Rule>,
    index: HashMap<String, RuleId>,
    start: Option<String>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn terminal(&mut self, literal: impl Into<String>) -> NodeId {
        self.push(Node::Terminal(literal.into()))
    }

    /// Regex atom anchored at the match position. Fails on an invalid pattern.
    pub fn regex(&mut self, pattern: &str) -> Result<NodeId, GrammarError> {
        let atom = RegexAtom::new(pattern)?;
        Ok(self.push(Node::Regex(atom)))
    }

    pub fn non_terminal(&mut self, name: impl Into<String>) -> NodeId {
        self.push(Node::NonTerminal {
            name: name.into(),
            rule: None,
        })
    }

    pub fn sequence(&mut self, items: Vec<NodeId>) -> NodeId {
        self.push(Node::Sequence(items))
    }

    pub fn choice(&mut self, options: Vec<NodeId>) -> NodeId {
        self.push(Node::Choice(options))
    }

    /// At least `min` repetitions, no upper bound
    pub fn repeat(&mut self, inner: NodeId, min: usize) -> NodeId {
        self.push(Node::Repeat {
            inner,
            min,
            max: None,
        })
    }

    /// Between `min` and `max` repetitions
    pub fn repeat_bounded(&mut self, inner: NodeId, min: usize, max: usize) -> NodeId {
        self.push(Node::Repeat {
            inner,
            min,
            max: Some(max),
        })
    }

    pub fn zero_or_more(&mut self, inner: NodeId) -> NodeId {
        self.repeat(inner, 0)
    }

    pub fn one_or_more(&mut self, inner: NodeId) -> NodeId {
        self.repeat(inner, 1)
    }

    pub fn optional(&mut self, inner: NodeId) -> NodeId {
        self.push(Node::Optional(inner))
    }

    /// Register a rule. The first rule registered becomes the start rule unless
    /// [`start`](Self::start) says otherwise.
    pub fn rule(&mut self, name: impl Into<String>, body: NodeId) -> Result<RuleId, GrammarError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(GrammarError::DuplicateRule { name });
        }
        let id = RuleId(self.rules.len() as u32);
        self.index.insert(name.clone(), id);
        self.rules.push(Rule { name, body });
        Ok(id)
    }

    pub fn start(&mut self, name: impl Into<String>) -> &mut Self {
        self.start = Some(name.into());
        self
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        let GrammarBuilder {
            mut nodes,
            rules,
            index,
            start,
        } = self;

        if rules.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }

        let mut unbound = 0;
        for node in &mut nodes {
            if let Node::NonTerminal { name, rule } = node {
                *rule = index.get(name.as_str()).copied();
                if rule.is_none() {
                    unbound += 1;
                }
            }
        }

        let start = start.or_else(|| rules.first().map(|r| r.name.clone()));
        debug!(
            "built grammar: {} rules, {} nodes, {} unbound references, start {:?}",
            rules.len(),
            nodes.len(),
            unbound,
            start
        );
        Ok(Grammar::from_parts(nodes, rules, index, start))
    }
}
