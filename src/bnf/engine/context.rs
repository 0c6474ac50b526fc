//! Memoizing evaluation context with seed-growing left recursion
//!
//! Evaluation of `(node, pos)` goes through [`Context::eval`]:
//!
//! ```text
//! memo hit, final    -> cached result set
//! memo hit, growing  -> current seed (marks the seed as read)
//! miss               -> insert empty seed, active[pos] += 1, evaluate,
//!                       re-evaluate while the seed was read and the ends changed,
//!                       active[pos] -= 1, finalize or drop the entry
//! ```
//!
//! A growing entry is only finalized when no other evaluation is still active at the same
//! position; otherwise it may hold a result computed from an ancestor's provisional seed and
//! is dropped so the next lookup recomputes it.
//!
//! Each attempt also tracks its reach: the deepest position any evaluation inside it
//! started at. A node that produces no results records a failure at its reach, which is
//! how partial progress inside sequences and repetitions moves the reported error forward.

use super::result::{same_ends, Matches};
use super::variants;
use super::{RED_ZONE, STACK_SEGMENT};
use crate::bnf::error::EngineError;
use crate::bnf::grammar::{Grammar, RuleId};
use crate::bnf::location::{found_at, SourceLocation};
use crate::bnf::node::{merge_expected, NodeId};
use crate::bnf::parse_error::{expected_width, ParseError};
use log::{trace, warn};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    /// Still being computed; `seed_read` is set when a nested lookup observed the seed
    Growing { seed_read: bool },
    Final,
}

#[derive(Debug)]
struct MemoEntry {
    results: Matches,
    state: EntryState,
    reach: usize,
}

/// Deepest failure seen so far
#[derive(Debug, Clone)]
struct Failure<'a> {
    pos: usize,
    rule_stack: Vec<&'a str>,
    expected: Vec<String>,
}

/// Per-call matching state. Created for one input, then discarded.
pub struct Context<'a> {
    grammar: &'a Grammar,
    input: &'a str,
    memo: HashMap<(NodeId, usize), MemoEntry>,
    /// Number of evaluations in flight, per start position
    active: Vec<usize>,
    reach: usize,
    stack: Vec<&'a str>,
    farthest: Option<Failure<'a>>,
}

impl<'a> Context<'a> {
    pub fn new(grammar: &'a Grammar, input: &'a str) -> Self {
        Self {
            grammar,
            input,
            memo: HashMap::new(),
            active: vec![0; input.len() + 1],
            reach: 0,
            stack: Vec::new(),
            farthest: None,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub(super) fn grammar(&self) -> &'a Grammar {
        self.grammar
    }

    /// Evaluate the body of `rule` at position 0 with the rule on the call stack
    pub fn match_rule(&mut self, rule: RuleId) -> Result<Matches, EngineError> {
        let rule = self.grammar.rule_by_id(rule);
        self.push(rule.name.as_str());
        let outcome = self.eval(rule.body, 0);
        self.pop()?;
        outcome
    }

    /// Evaluate `id` at `pos`. All node variants evaluate their children through here.
    pub fn eval(&mut self, id: NodeId, pos: usize) -> Result<Matches, EngineError> {
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || self.eval_at(id, pos))
    }

    fn eval_at(&mut self, id: NodeId, pos: usize) -> Result<Matches, EngineError> {
        let key = (id, pos);

        if let Some(entry) = self.memo.get_mut(&key) {
            let results = Rc::clone(&entry.results);
            match &mut entry.state {
                EntryState::Final => {
                    trace!("memo hit {} @ {}", id, pos);
                    self.reach = self.reach.max(entry.reach);
                }
                EntryState::Growing { seed_read } => {
                    trace!("seed read {} @ {} ({} results)", id, pos, results.len());
                    *seed_read = true;
                    self.reach = self.reach.max(pos);
                }
            }
            return Ok(results);
        }

        self.memo.insert(
            key,
            MemoEntry {
                results: Rc::new(Vec::new()),
                state: EntryState::Growing { seed_read: false },
                reach: pos,
            },
        );
        self.active[pos] += 1;
        let outer_reach = self.reach;
        self.reach = pos;

        let outcome = self.grow(id, pos);

        self.active[pos] -= 1;
        let attempt_reach = self.reach;
        self.reach = outer_reach.max(attempt_reach);

        let results = match outcome {
            Ok(results) => results,
            Err(err) => {
                self.memo.remove(&key);
                return Err(err);
            }
        };

        if self.active[pos] > 0 {
            self.memo.remove(&key);
        } else {
            self.memo.insert(
                key,
                MemoEntry {
                    results: Rc::clone(&results),
                    state: EntryState::Final,
                    reach: attempt_reach,
                },
            );
        }

        if results.is_empty() {
            self.record_failure(id, attempt_reach);
        }
        Ok(results)
    }

    /// Evaluate the node, then keep re-evaluating while a nested lookup consumed the
    /// published seed and the set of end positions is still changing.
    fn grow(&mut self, id: NodeId, pos: usize) -> Result<Matches, EngineError> {
        let key = (id, pos);
        let mut results: Matches = Rc::new(variants::dispatch(self, id, pos)?);
        // Cyclic rules such as `A ::= A | "a"` add a duplicate every round and never settle.
        // Growth is therefore cut off after a number of rounds proportional to the input
        // left; converging seeds gain at least one new end per round and stop well before.
        let round_limit = 2 * (self.input.len() - pos + 1) + 2;
        let mut round = 0;

        loop {
            let entry = self
                .memo
                .get_mut(&key)
                .ok_or(EngineError::LostSeed { node: id, pos })?;
            let seed_read = matches!(entry.state, EntryState::Growing { seed_read: true });
            if !seed_read || same_ends(&entry.results, &results) {
                break;
            }
            if round >= round_limit {
                warn!(
                    "left recursion at {} @ {} did not settle after {} rounds; keeping last seed",
                    id, pos, round
                );
                break;
            }
            round += 1;
            trace!(
                "grow {} @ {} round {}: {} -> {} results",
                id,
                pos,
                round,
                entry.results.len(),
                results.len()
            );
            entry.results = Rc::clone(&results);
            entry.state = EntryState::Growing { seed_read: false };
            results = Rc::new(variants::dispatch(self, id, pos)?);
        }

        Ok(results)
    }

    pub(super) fn push(&mut self, name: &'a str) {
        self.stack.push(name);
    }

    pub(super) fn pop(&mut self) -> Result<(), EngineError> {
        self.stack.pop().map(|_| ()).ok_or(EngineError::EmptyRuleStack)
    }

    /// Record that `id` produced nothing, having reached `pos`
    fn record_failure(&mut self, id: NodeId, pos: usize) {
        if self.farthest.as_ref().is_some_and(|f| f.pos > pos) {
            return;
        }
        let expected = self.grammar.expect(id);
        match &mut self.farthest {
            Some(failure) if failure.pos == pos => {
                merge_expected(&mut failure.expected, expected);
            }
            _ => {
                trace!("farthest failure moves to {} ({:?})", pos, expected);
                let mut deduped = Vec::new();
                merge_expected(&mut deduped, expected);
                self.farthest = Some(Failure {
                    pos,
                    rule_stack: self.stack.clone(),
                    expected: deduped,
                });
            }
        }
    }

    /// Record a failure for a top-level node that matched only a proper prefix
    pub fn record_incomplete(&mut self, id: NodeId) {
        let reach = self.reach;
        self.record_failure(id, reach);
    }

    /// Farthest-failure report for this call
    pub fn parse_error(&self) -> ParseError {
        let (pos, rule_stack, expected) = match &self.farthest {
            Some(failure) => (
                failure.pos,
                failure.rule_stack.iter().map(|name| name.to_string()).collect::<Vec<_>>(),
                failure.expected.clone(),
            ),
            None => (self.reach, Vec::new(), Vec::new()),
        };
        let position = SourceLocation::new(self.input).byte_to_position(pos);
        ParseError {
            pos,
            line: position.line,
            column: position.column,
            width: expected_width(&expected),
            found: found_at(self.input, pos),
            rule_stack,
            expected,
        }
    }

    /// Number of finalized or in-flight memo entries
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bnf::grammar::GrammarBuilder;

    #[test]
    fn test_failure_merges_at_same_position() {
        // S ::= "a" | "b"
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        let bee = b.terminal("b");
        let body = b.choice(vec![a, bee]);
        let s = b.rule("S", body).unwrap();
        let g = b.build().unwrap();

        let mut ctx = Context::new(&g, "c");
        let results = ctx.match_rule(s).unwrap();
        assert!(results.is_empty());

        let err = ctx.parse_error();
        assert_eq!(err.pos, 0);
        assert_eq!(err.expected, vec!["\"a\"", "\"b\""]);
        assert_eq!(err.rule_stack, vec!["S"]);
        assert_eq!(err.found, "'c'");
    }

    #[test]
    fn test_deeper_failure_wins() {
        // S ::= "a" "b" | "c"
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        let bee = b.terminal("b");
        let c = b.terminal("c");
        let ab = b.sequence(vec![a, bee]);
        let body = b.choice(vec![ab, c]);
        let s = b.rule("S", body).unwrap();
        let g = b.build().unwrap();

        let mut ctx = Context::new(&g, "ax");
        assert!(ctx.match_rule(s).unwrap().is_empty());
        let err = ctx.parse_error();
        assert_eq!(err.pos, 1);
        assert_eq!(err.column, 2);
        assert_eq!(err.found, "'x'");
        // the failing terminal first, then the enclosing nodes that reached the same point
        assert_eq!(err.expected, vec!["\"b\"", "\"a\"", "\"c\""]);
    }

    #[test]
    fn test_results_are_memoized() {
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        let s = b.rule("S", a).unwrap();
        let g = b.build().unwrap();

        let mut ctx = Context::new(&g, "a");
        let first = ctx.eval(a, 0).unwrap();
        let second = ctx.eval(a, 0).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(ctx.memo_len(), 1);
        assert_eq!(ctx.match_rule(s).unwrap().len(), 1);
    }

    #[test]
    fn test_pop_on_empty_stack_is_an_error() {
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        b.rule("S", a).unwrap();
        let g = b.build().unwrap();

        let mut ctx = Context::new(&g, "");
        assert_eq!(ctx.pop(), Err(EngineError::EmptyRuleStack));
    }

    #[test]
    fn test_left_recursion_grows_seed() {
        // A ::= A "a" | "a"
        let mut b = GrammarBuilder::new();
        let rec = b.non_terminal("A");
        let a1 = b.terminal("a");
        let a2 = b.terminal("a");
        let left = b.sequence(vec![rec, a1]);
        let body = b.choice(vec![left, a2]);
        let rule = b.rule("A", body).unwrap();
        let g = b.build().unwrap();

        let mut ctx = Context::new(&g, "aaa");
        let results = ctx.match_rule(rule).unwrap();
        let mut ends: Vec<usize> = results.iter().map(|r| r.end).collect();
        ends.sort_unstable();
        assert_eq!(ends, vec![1, 2, 3]);
    }

    #[test]
    fn test_cyclic_rule_terminates() {
        // A ::= A | "a"
        let mut b = GrammarBuilder::new();
        let rec = b.non_terminal("A");
        let a = b.terminal("a");
        let body = b.choice(vec![rec, a]);
        let rule = b.rule("A", body).unwrap();
        let g = b.build().unwrap();

        let mut ctx = Context::new(&g, "a");
        let results = ctx.match_rule(rule).unwrap();
        assert!(results.iter().all(|r| r.end == 1));
        assert!(!results.is_empty());
    }
}
