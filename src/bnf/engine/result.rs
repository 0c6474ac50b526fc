use super::{RED_ZONE, STACK_SEGMENT};
use crate::bnf::ast::AstNode;
use crate::bnf::grammar::{Grammar, RuleId};
use std::rc::Rc;

/// Persistent sequence of AST fragments.
///
/// Cloning and concatenation are O(1): derivations that share a prefix or a sub-derivation
/// share the same pieces. [`AstNode`]s are only built when a caller asks for the tree, so
/// plain acceptance checks never materialize one.
#[derive(Debug, Clone, Default)]
pub struct Fragments(Option<Rc<Piece>>);

#[derive(Debug)]
enum Piece {
    Leaf(AstNode),
    Rule { rule: RuleId, children: Fragments },
    Concat(Fragments, Fragments),
}

impl Fragments {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn leaf(node: AstNode) -> Self {
        Self(Some(Rc::new(Piece::Leaf(node))))
    }

    /// A node for `rule` wrapping `children`
    pub fn rule(rule: RuleId, children: Fragments) -> Self {
        Self(Some(Rc::new(Piece::Rule { rule, children })))
    }

    pub fn concat(&self, next: &Fragments) -> Self {
        match (&self.0, &next.0) {
            (None, _) => next.clone(),
            (_, None) => self.clone(),
            _ => Self(Some(Rc::new(Piece::Concat(self.clone(), next.clone())))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Build the fragments as AST nodes, in input order
    pub fn to_nodes(&self, grammar: &Grammar) -> Vec<AstNode> {
        let mut out = Vec::new();
        // concatenation chains are as long as a repetition count, so walk them iteratively
        let mut pending = vec![self];
        while let Some(fragments) = pending.pop() {
            let Some(piece) = fragments.0.as_deref() else {
                continue;
            };
            match piece {
                Piece::Leaf(node) => out.push(node.clone()),
                Piece::Rule { rule, children } => {
                    let children = stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || {
                        children.to_nodes(grammar)
                    });
                    out.push(AstNode::rule(
                        grammar.rule_by_id(*rule).name.clone(),
                        children,
                    ));
                }
                Piece::Concat(left, right) => {
                    pending.push(right);
                    pending.push(left);
                }
            }
        }
        out
    }
}

/// Pieces are released iteratively; long chains would otherwise recurse once per link
impl Drop for Fragments {
    fn drop(&mut self) {
        let mut pending: Vec<Rc<Piece>> = self.0.take().into_iter().collect();
        while let Some(shared) = pending.pop() {
            let Ok(piece) = Rc::try_unwrap(shared) else {
                continue;
            };
            match piece {
                Piece::Leaf(_) => {}
                Piece::Rule { mut children, .. } => pending.extend(children.0.take()),
                Piece::Concat(mut left, mut right) => {
                    pending.extend(left.0.take());
                    pending.extend(right.0.take());
                }
            }
        }
    }
}

/// One derivation of a node from some start position
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Absolute byte offset reached
    pub end: usize,
    /// AST fragments contributed by this derivation, in input order
    pub fragments: Fragments,
}

impl MatchResult {
    pub fn new(end: usize, fragments: Fragments) -> Self {
        Self { end, fragments }
    }

    /// Zero-width result with no fragments
    pub fn empty(end: usize) -> Self {
        Self::new(end, Fragments::empty())
    }

    /// This derivation followed by `next`
    pub fn extend(&self, next: &MatchResult) -> Self {
        Self::new(next.end, self.fragments.concat(&next.fragments))
    }

    pub fn nodes(&self, grammar: &Grammar) -> Vec<AstNode> {
        self.fragments.to_nodes(grammar)
    }
}

/// Result set of a node at a position, shared between the memo table and callers
pub type Matches = Rc<Vec<MatchResult>>;

/// Whether two result sets have the same multiset of end positions
pub(crate) fn same_ends(a: &[MatchResult], b: &[MatchResult]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut left: Vec<usize> = a.iter().map(|r| r.end).collect();
    let mut right: Vec<usize> = b.iter().map(|r| r.end).collect();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}
