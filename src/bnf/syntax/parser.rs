//! Grammar-text parser
//!
//! Parsing happens in two steps. The token stream is first split into rules at every
//! `name ::=` header, then each rule body is parsed on its own with chumsky:
//!
//! ```text
//! choice   := sequence ("|" sequence)*
//! sequence := postfix+
//! postfix  := atom ("*" | "+" | "?")*
//! atom     := name | literal | regex | "(" choice ")"
//! ```
//!
//! Postfix operators apply left to right, so `a?+` is `(a?)+`.

use super::grammar_ast::{ExprAst, GrammarAst, RuleAst};
use super::lexer::{tokenize, TokenLocation};
use super::tokens::Token;
use super::SyntaxError;
use crate::bnf::location::SourceLocation;
use chumsky::prelude::*;
use std::ops::Range;

/// Type alias for parser error
type ParserError = Simple<TokenLocation>;

/// Helper: match a specific token type, ignoring the location
fn token(t: Token) -> impl Parser<TokenLocation, (), Error = ParserError> + Clone {
    filter(move |(tok, _): &TokenLocation| tok == &t).ignored()
}

/// A rule name, literal or regex
fn terminal_atom() -> impl Parser<TokenLocation, ExprAst, Error = ParserError> + Clone {
    filter_map(|span, (tok, range): TokenLocation| match tok {
        Token::Ident(name) => Ok(ExprAst::Rule(name)),
        Token::Literal(text) => Ok(ExprAst::Literal(text)),
        Token::Regex(pattern) => Ok(ExprAst::Regex(pattern)),
        other => Err(Simple::expected_input_found(
            span,
            Vec::new(),
            Some((other, range)),
        )),
    })
}

fn postfix_operator() -> impl Parser<TokenLocation, Token, Error = ParserError> + Clone {
    filter(|(tok, _): &TokenLocation| matches!(tok, Token::Star | Token::Plus | Token::Question))
        .map(|(tok, _)| tok)
}

/// Expression parser for one rule body
pub(crate) fn expression() -> impl Parser<TokenLocation, ExprAst, Error = ParserError> + Clone {
    recursive(|choice_expr| {
        let group = choice_expr.delimited_by(token(Token::OpenParen), token(Token::CloseParen));
        let atom = terminal_atom().or(group).labelled("expression");

        let postfix = atom
            .then(postfix_operator().repeated())
            .foldl(|inner, op| match op {
                Token::Star => ExprAst::ZeroOrMore(Box::new(inner)),
                Token::Plus => ExprAst::OneOrMore(Box::new(inner)),
                _ => ExprAst::Optional(Box::new(inner)),
            });

        let sequence = postfix.repeated().at_least(1).map(|mut items| {
            if items.len() == 1 {
                items.remove(0)
            } else {
                ExprAst::Sequence(items)
            }
        });

        sequence
            .separated_by(token(Token::Pipe))
            .at_least(1)
            .map(|mut alternatives| {
                if alternatives.len() == 1 {
                    alternatives.remove(0)
                } else {
                    ExprAst::Choice(alternatives)
                }
            })
    })
}

/// Tokenize and parse grammar text
pub fn parse_grammar(source: &str) -> Result<GrammarAst, SyntaxError> {
    let tokens = tokenize(source)?;
    parse_tokens(source, tokens)
}

struct RawRule {
    name: String,
    span: Range<usize>,
    body: Vec<TokenLocation>,
}

pub(crate) fn parse_tokens(
    source: &str,
    tokens: Vec<TokenLocation>,
) -> Result<GrammarAst, SyntaxError> {
    let location = SourceLocation::new(source);
    let mut rules = Vec::new();

    for raw in split_rules(&location, tokens)? {
        if raw.body.is_empty() {
            return Err(SyntaxError::EmptyRule {
                position: location.byte_to_position(raw.span.start),
                name: raw.name,
                span: raw.span,
            });
        }

        let end_of_body = raw.body.last().map(|(_, r)| r.end).unwrap_or(raw.span.end);
        let byte_spans: Vec<Range<usize>> = raw.body.iter().map(|(_, r)| r.clone()).collect();

        let body = expression()
            .then_ignore(end())
            .parse(raw.body)
            .map_err(|errors| {
                let err = &errors[0];
                let span = byte_spans
                    .get(err.span().start)
                    .cloned()
                    .unwrap_or(end_of_body..end_of_body);
                SyntaxError::Unexpected {
                    position: location.byte_to_position(span.start),
                    rule: raw.name.clone(),
                    found: err
                        .found()
                        .map(|(tok, _)| tok.to_string())
                        .unwrap_or_else(|| "end of rule".to_string()),
                    expected: describe_expected(err),
                    span,
                }
            })?;

        rules.push(RuleAst {
            name: raw.name,
            span: raw.span,
            body,
        });
    }

    Ok(GrammarAst { rules })
}

fn describe_expected(err: &ParserError) -> String {
    let mut expected: Vec<String> = err
        .expected()
        .map(|e| match e {
            Some((tok, _)) => tok.to_string(),
            None => "end of rule".to_string(),
        })
        .collect();
    expected.sort();
    expected.dedup();
    match (err.label(), expected.is_empty()) {
        (Some(label), _) => label.to_string(),
        (None, false) => expected.join(" or "),
        (None, true) => "expression, '|' or end of rule".to_string(),
    }
}

/// Split the token stream at `name ::=` headers
fn split_rules(
    location: &SourceLocation<'_>,
    tokens: Vec<TokenLocation>,
) -> Result<Vec<RawRule>, SyntaxError> {
    let mut rules: Vec<RawRule> = Vec::new();
    let mut iter = tokens.into_iter().peekable();

    while let Some((tok, span)) = iter.next() {
        let is_header = matches!(tok, Token::Ident(_))
            && matches!(iter.peek(), Some((Token::Define, _)));

        if is_header {
            iter.next();
            if let Token::Ident(name) = tok {
                rules.push(RawRule {
                    name,
                    span,
                    body: Vec::new(),
                });
            }
            continue;
        }

        match rules.last_mut() {
            Some(rule) => rule.body.push((tok, span)),
            None => {
                return Err(SyntaxError::MissingRuleHeader {
                    position: location.byte_to_position(span.start),
                    found: tok.to_string(),
                    span,
                })
            }
        }
    }

    Ok(rules)
}
