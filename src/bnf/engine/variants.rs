//! Match semantics of each node variant
//!
//! Every function returns the full result set of the node at `pos`: one [`MatchResult`] per
//! derivation, duplicates included. Children are always evaluated through
//! [`Context::eval`], never directly.

use super::context::Context;
use super::result::{Fragments, MatchResult};
use crate::bnf::ast::AstNode;
use crate::bnf::error::EngineError;
use crate::bnf::grammar::RuleId;
use crate::bnf::node::{Node, NodeId, RegexAtom};

type Outcome = Result<Vec<MatchResult>, EngineError>;

pub(super) fn dispatch<'a>(ctx: &mut Context<'a>, id: NodeId, pos: usize) -> Outcome {
    let grammar = ctx.grammar();
    match grammar.node(id) {
        Node::Terminal(literal) => Ok(terminal(ctx.input(), literal, pos)),
        Node::Regex(atom) => Ok(regex(ctx.input(), atom, pos)),
        Node::NonTerminal { name, rule } => non_terminal(ctx, name, *rule, pos),
        Node::Sequence(items) => sequence(ctx, items, pos),
        Node::Choice(options) => choice(ctx, options, pos),
        Node::Repeat { inner, min, max } => repeat(ctx, *inner, *min, *max, pos),
        Node::Optional(inner) => optional(ctx, *inner, pos),
    }
}

fn terminal(input: &str, literal: &str, pos: usize) -> Vec<MatchResult> {
    match input.get(pos..) {
        Some(rest) if rest.starts_with(literal) => vec![MatchResult::new(
            pos + literal.len(),
            Fragments::leaf(AstNode::terminal(literal)),
        )],
        _ => Vec::new(),
    }
}

fn regex(input: &str, atom: &RegexAtom, pos: usize) -> Vec<MatchResult> {
    let Some(rest) = input.get(pos..) else {
        return Vec::new();
    };
    match atom.match_len(rest) {
        Some(len) => vec![MatchResult::new(
            pos + len,
            Fragments::leaf(AstNode::regex(&rest[..len])),
        )],
        None => Vec::new(),
    }
}

fn non_terminal<'a>(
    ctx: &mut Context<'a>,
    name: &'a str,
    rule: Option<RuleId>,
    pos: usize,
) -> Outcome {
    let rule = rule.ok_or_else(|| EngineError::UnresolvedNonTerminal {
        name: name.to_string(),
    })?;
    let body = ctx.grammar().rule_by_id(rule).body;

    ctx.push(name);
    let outcome = ctx.eval(body, pos);
    ctx.pop()?;

    Ok(outcome?
        .iter()
        .map(|m| MatchResult::new(m.end, Fragments::rule(rule, m.fragments.clone())))
        .collect())
}

/// Thread a frontier of partial derivations through the elements in order
fn sequence(ctx: &mut Context<'_>, items: &[NodeId], pos: usize) -> Outcome {
    let mut frontier = vec![MatchResult::empty(pos)];

    for &item in items {
        let mut next = Vec::new();
        for partial in &frontier {
            for m in ctx.eval(item, partial.end)?.iter() {
                next.push(partial.extend(m));
            }
        }
        if next.is_empty() {
            return Ok(Vec::new());
        }
        frontier = next;
    }

    Ok(frontier)
}

/// Every option is tried, so ambiguous alternatives all contribute
fn choice(ctx: &mut Context<'_>, options: &[NodeId], pos: usize) -> Outcome {
    let mut results = Vec::new();
    for &option in options {
        results.extend(ctx.eval(option, pos)?.iter().cloned());
    }
    Ok(results)
}

fn repeat(
    ctx: &mut Context<'_>,
    inner: NodeId,
    min: usize,
    max: Option<usize>,
    pos: usize,
) -> Outcome {
    let mut frontier = vec![MatchResult::empty(pos)];
    let mut results = Vec::new();
    let mut count = 0;

    loop {
        if count >= min {
            results.extend(frontier.iter().cloned());
        }
        if max.is_some_and(|max| count >= max) {
            break;
        }

        let mut next = Vec::new();
        for partial in &frontier {
            for m in ctx.eval(inner, partial.end)?.iter() {
                // zero-width repetitions would never terminate
                if m.end > partial.end {
                    next.push(partial.extend(m));
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
        count += 1;
    }

    Ok(results)
}

/// The skip result first, then every inner derivation that consumed input
fn optional(ctx: &mut Context<'_>, inner: NodeId, pos: usize) -> Outcome {
    let mut results = vec![MatchResult::empty(pos)];
    results.extend(ctx.eval(inner, pos)?.iter().filter(|m| m.end != pos).cloned());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use crate::bnf::grammar::{Grammar, GrammarBuilder};
    use crate::bnf::engine::Context;
    use crate::bnf::node::NodeId;

    fn ends(g: &Grammar, id: NodeId, input: &str, pos: usize) -> Vec<usize> {
        let mut ctx = Context::new(g, input);
        ctx.eval(id, pos).unwrap().iter().map(|r| r.end).collect()
    }

    /// Grammar with a single placeholder rule so the builder accepts it
    fn finish(mut b: GrammarBuilder, body: NodeId) -> Grammar {
        b.rule("S", body).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn test_terminal() {
        let mut b = GrammarBuilder::new();
        let abc = b.terminal("abc");
        let g = finish(b, abc);
        assert_eq!(ends(&g, abc, "xabcd", 1), vec![4]);
        assert!(ends(&g, abc, "xabcd", 0).is_empty());
        assert!(ends(&g, abc, "ab", 0).is_empty());
    }

    #[test]
    fn test_empty_terminal_is_zero_width() {
        let mut b = GrammarBuilder::new();
        let empty = b.terminal("");
        let g = finish(b, empty);
        assert_eq!(ends(&g, empty, "ab", 1), vec![1]);
        assert_eq!(ends(&g, empty, "ab", 2), vec![2]);
    }

    #[test]
    fn test_regex_anchored_at_position() {
        let mut b = GrammarBuilder::new();
        let digits = b.regex("[0-9]+").unwrap();
        let g = finish(b, digits);
        assert_eq!(ends(&g, digits, "ab123c", 2), vec![5]);
        assert!(ends(&g, digits, "ab123c", 0).is_empty());

        let mut ctx = Context::new(&g, "ab123c");
        let results = ctx.eval(digits, 2).unwrap();
        let nodes = results[0].nodes(&g);
        assert_eq!(nodes[0].value, "123");
        assert_eq!(nodes[0].node_type, "REGEX");
    }

    #[test]
    fn test_choice_keeps_every_option() {
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        let aa = b.terminal("aa");
        let a_again = b.terminal("a");
        let body = b.choice(vec![a, aa, a_again]);
        let g = finish(b, body);
        assert_eq!(ends(&g, body, "aa", 0), vec![1, 2, 1]);
    }

    #[test]
    fn test_sequence_threads_frontier() {
        // ("a" | "aa") "a"
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        let aa = b.terminal("aa");
        let head = b.choice(vec![a, aa]);
        let tail = b.terminal("a");
        let body = b.sequence(vec![head, tail]);
        let g = finish(b, body);
        assert_eq!(ends(&g, body, "aaa", 0), vec![2, 3]);
    }

    #[test]
    fn test_sequence_stops_at_first_empty_frontier() {
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        let x = b.terminal("x");
        let never = b.terminal("never");
        let body = b.sequence(vec![a, x, never]);
        let g = finish(b, body);

        let mut ctx = Context::new(&g, "ab");
        assert!(ctx.eval(body, 0).unwrap().is_empty());
        // `never` was not attempted, so the failure stays at `x`
        assert_eq!(ctx.parse_error().pos, 1);
        assert_eq!(ctx.parse_error().expected[0], "\"x\"");
    }

    #[test]
    fn test_empty_sequence_matches_empty() {
        let mut b = GrammarBuilder::new();
        let body = b.sequence(vec![]);
        let g = finish(b, body);
        assert_eq!(ends(&g, body, "abc", 1), vec![1]);
    }

    #[test]
    fn test_repeat_collects_every_count() {
        // ("a" | "aa")*
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        let aa = b.terminal("aa");
        let inner = b.choice(vec![a, aa]);
        let body = b.zero_or_more(inner);
        let g = finish(b, body);
        assert_eq!(ends(&g, body, "aaa", 0), vec![0, 1, 2, 2, 3, 3, 3]);
    }

    #[test]
    fn test_repeat_minimum() {
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        let body = b.one_or_more(a);
        let g = finish(b, body);
        assert_eq!(ends(&g, body, "aab", 0), vec![1, 2]);
        assert!(ends(&g, body, "b", 0).is_empty());
    }

    #[test]
    fn test_repeat_maximum() {
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        let body = b.repeat_bounded(a, 1, 2);
        let g = finish(b, body);
        assert_eq!(ends(&g, body, "aaaa", 0), vec![1, 2]);
    }

    #[test]
    fn test_repeat_of_zero_width_terminates() {
        let mut b = GrammarBuilder::new();
        let empty = b.terminal("");
        let opt = b.optional(empty);
        let body = b.zero_or_more(opt);
        let g = finish(b, body);
        assert_eq!(ends(&g, body, "abc", 0), vec![0]);
    }

    #[test]
    fn test_optional_skip_first() {
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        let body = b.optional(a);
        let g = finish(b, body);
        assert_eq!(ends(&g, body, "a", 0), vec![0, 1]);
        assert_eq!(ends(&g, body, "b", 0), vec![0]);
    }

    #[test]
    fn test_optional_drops_zero_width_inner() {
        let mut b = GrammarBuilder::new();
        let empty = b.terminal("");
        let body = b.optional(empty);
        let g = finish(b, body);
        assert_eq!(ends(&g, body, "x", 0), vec![0]);
    }

    #[test]
    fn test_non_terminal_wraps_fragments() {
        let mut b = GrammarBuilder::new();
        let a = b.terminal("a");
        let bee = b.terminal("b");
        let t_body = b.sequence(vec![a, bee]);
        let t = b.non_terminal("T");
        b.rule("S", t).unwrap();
        b.rule("T", t_body).unwrap();
        let g = b.build().unwrap();

        let mut ctx = Context::new(&g, "ab");
        let results = ctx.eval(t, 0).unwrap();
        assert_eq!(results.len(), 1);
        let nodes = results[0].nodes(&g);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].to_string(), r#"(T "a" "b")"#);
    }
}
