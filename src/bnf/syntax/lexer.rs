//! Tokenization of grammar text
//!
//! Tokens are paired with their byte range in the source so that syntax errors can point
//! at the offending text. Unlike a document lexer, there is no recovery: the first
//! unrecognised character sequence is an error.

use super::tokens::Token;
use super::SyntaxError;
use crate::bnf::location::SourceLocation;
use logos::Logos;
use std::ops::Range;

/// A token and the bytes it covers
pub type TokenLocation = (Token, Range<usize>);

pub fn tokenize(source: &str) -> Result<Vec<TokenLocation>, SyntaxError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                let span = lexer.span();
                return Err(SyntaxError::Lexical {
                    position: SourceLocation::new(source).byte_to_position(span.start),
                    text: lexer.slice().to_string(),
                    span,
                });
            }
        }
    }

    Ok(tokens)
}
