//! Lowering of a parsed grammar onto the builder
//!
//! Every occurrence of an expression gets its own node, so two identical literals in
//! different places are memoized independently. Rule names are not checked here: an
//! undefined reference stays unbound until the grammar is validated.

use super::grammar_ast::{ExprAst, GrammarAst};
use crate::bnf::error::GrammarError;
use crate::bnf::grammar::{Grammar, GrammarBuilder};
use crate::bnf::node::NodeId;

pub fn build_grammar(ast: &GrammarAst) -> Result<Grammar, GrammarError> {
    let mut builder = GrammarBuilder::new();
    for rule in &ast.rules {
        let body = lower(&mut builder, &rule.body)?;
        builder.rule(rule.name.clone(), body)?;
    }
    builder.build()
}

fn lower(b: &mut GrammarBuilder, expr: &ExprAst) -> Result<NodeId, GrammarError> {
    Ok(match expr {
        ExprAst::Rule(name) => b.non_terminal(name.clone()),
        ExprAst::Literal(text) => b.terminal(text.clone()),
        ExprAst::Regex(pattern) => b.regex(pattern)?,
        ExprAst::Sequence(items) => {
            let items = lower_all(b, items)?;
            b.sequence(items)
        }
        ExprAst::Choice(options) => {
            let options = lower_all(b, options)?;
            b.choice(options)
        }
        ExprAst::ZeroOrMore(inner) => {
            let inner = lower(b, inner)?;
            b.zero_or_more(inner)
        }
        ExprAst::OneOrMore(inner) => {
            let inner = lower(b, inner)?;
            b.one_or_more(inner)
        }
        ExprAst::Optional(inner) => {
            let inner = lower(b, inner)?;
            b.optional(inner)
        }
    })
}

fn lower_all(b: &mut GrammarBuilder, exprs: &[ExprAst]) -> Result<Vec<NodeId>, GrammarError> {
    exprs.iter().map(|e| lower(b, e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bnf::syntax::parse_grammar;

    fn grammar(source: &str) -> Grammar {
        build_grammar(&parse_grammar(source).unwrap()).unwrap()
    }

    #[test]
    fn test_first_rule_is_start() {
        let g = grammar("A ::= \"a\"\nB ::= \"b\"");
        assert_eq!(g.start(), Some("A"));
    }

    #[test]
    fn test_round_trips_through_display() {
        let source = "Expr ::= Term (\"+\" Term)*\nTerm ::= /[0-9]+/ | \"(\" Expr \")\"\n";
        let g = grammar(source);
        assert_eq!(g.to_string(), source);
    }

    #[test]
    fn test_invalid_regex() {
        let ast = parse_grammar("S ::= /(/").unwrap();
        assert!(matches!(
            build_grammar(&ast),
            Err(GrammarError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_duplicate_rule() {
        let ast = parse_grammar("S ::= \"a\"\nS ::= \"b\"").unwrap();
        assert_eq!(
            build_grammar(&ast).unwrap_err(),
            GrammarError::DuplicateRule {
                name: "S".to_string()
            }
        );
    }

    #[test]
    fn test_undefined_reference_left_for_validation() {
        let mut g = grammar("S ::= <undefined>");
        assert!(g.validate().is_err());
    }
}
