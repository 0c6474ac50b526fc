//! Property-based tests for the matcher
//!
//! Grammars whose languages are regular are checked against the `regex` crate, and failure
//! reports are checked for consistency with the input they describe.

use bnf_match::{load_grammar_str, Grammar};
use proptest::prelude::*;
use regex::Regex;

fn grammar(source: &str) -> Grammar {
    let mut grammar = load_grammar_str(source).unwrap();
    grammar.validate().unwrap();
    grammar
}

fn sums() -> Grammar {
    grammar(
        r#"
Expr ::= Term ("+" Term)*
Term ::= "a"
"#,
    )
}

fn left_recursive_sums() -> Grammar {
    grammar(
        r#"
Expr ::= Expr "+" Term | Term
Term ::= "a"
"#,
    )
}

fn numbers() -> Grammar {
    grammar(
        r#"
number ::= digit | non_zero number
digit ::= "0" | non_zero
non_zero ::= /[1-9]/
"#,
    )
}

proptest! {
    #[test]
    fn test_sums_agree_with_regex(input in "[a+]{0,12}") {
        let reference = Regex::new(r"^a(\+a)*$").unwrap();
        prop_assert_eq!(sums().is_match(&input), reference.is_match(&input));
    }

    #[test]
    fn test_left_recursion_agrees_with_iteration(input in "[a+b]{0,10}") {
        prop_assert_eq!(left_recursive_sums().is_match(&input), sums().is_match(&input));
    }

    #[test]
    fn test_numbers_agree_with_regex(input in "[0-9]{0,8}") {
        let reference = Regex::new(r"^[1-9]*[0-9]$").unwrap();
        prop_assert_eq!(numbers().is_match(&input), reference.is_match(&input));
    }

    #[test]
    fn test_parse_tree_covers_input(input in "a(\\+a){0,6}") {
        let tree = left_recursive_sums().parse(&input).unwrap();
        prop_assert_eq!(tree.text(), input);
        prop_assert_eq!(tree.node_type, "Expr");
    }

    #[test]
    fn test_full_match_implies_prefix_match(input in "[a+]{0,10}") {
        let g = sums();
        if g.is_match(&input) {
            prop_assert!(g.match_prefix(&input).is_ok());
        }
    }

    #[test]
    fn test_failure_report_is_consistent(input in "[a+b\n]{0,12}") {
        let g = left_recursive_sums();
        if let Err(err) = g.match_input(&input) {
            let report = err.parse_error().unwrap();
            prop_assert!(report.pos <= input.len());
            prop_assert!(!report.expected.is_empty());
            prop_assert!(report.width >= 1);

            let expected_found = match input[report.pos..].chars().next() {
                Some(c) => format!("{:?}", c),
                None => "EOF".to_string(),
            };
            prop_assert_eq!(&report.found, &expected_found);

            let before = &input[..report.pos];
            let line = before.matches('\n').count() + 1;
            let column = before.len() - before.rfind('\n').map_or(0, |i| i + 1) + 1;
            prop_assert_eq!(report.line, line);
            prop_assert_eq!(report.column, column);
        }
    }

    #[test]
    fn test_repeated_matching_is_stable(input in "[a+]{0,10}") {
        let g = left_recursive_sums();
        prop_assert_eq!(g.is_match(&input), g.is_match(&input));
    }
}
