//! Token definitions for the grammar-text format
//!
//! Whitespace (newlines included) and line comments starting with `#`, `;` or `//` are
//! skipped by the lexer; rule boundaries are found from `name ::=` headers, not from line
//! breaks, so alternatives may continue on the following lines.
use logos::Logos;
use std::fmt;

#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"(#|;|//)[^\n]*")]
pub enum Token {
    #[token("::=")]
    Define,
    #[token("|")]
    Pipe,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("?")]
    Question,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,

    /// Rule name, bare or in angle brackets
    #[regex(r"[A-Za-z_][A-Za-z0-9_-]*", |lex| lex.slice().to_string())]
    #[regex(r"<[A-Za-z_][A-Za-z0-9_-]*>", |lex| strip_delimiters(lex.slice()).to_string())]
    Ident(String),

    /// Literal text with escapes already applied
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unescape(strip_delimiters(lex.slice())))]
    #[regex(r#"'([^'\\\n]|\\.)*'"#, |lex| unescape(strip_delimiters(lex.slice())))]
    Literal(String),

    /// Regex source between slashes, `\/` turned into `/`
    #[regex(r"/([^/\\\n]|\\.)+/", |lex| strip_delimiters(lex.slice()).replace("\\/", "/"))]
    Regex(String),
}

fn strip_delimiters(s: &str) -> &str {
    &s[1..s.len() - 1]
}

/// Apply `\" \' \\ \n \t`. Any other escape makes the literal invalid.
fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            _ => return None,
        }
    }
    Some(out)
}

/// How a token is named in syntax errors
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Define => write!(f, "'::='"),
            Token::Pipe => write!(f, "'|'"),
            Token::Star => write!(f, "'*'"),
            Token::Plus => write!(f, "'+'"),
            Token::Question => write!(f, "'?'"),
            Token::OpenParen => write!(f, "'('"),
            Token::CloseParen => write!(f, "')'"),
            Token::Ident(name) => write!(f, "rule name '{}'", name),
            Token::Literal(text) => write!(f, "literal {:?}", text),
            Token::Regex(pattern) => write!(f, "regex /{}/", pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Token::lexer(source).map(|t| t.unwrap()).collect()
    }

    #[test]
    fn test_rule_header() {
        assert_eq!(
            lex("expr ::= term"),
            vec![
                Token::Ident("expr".to_string()),
                Token::Define,
                Token::Ident("term".to_string())
            ]
        );
    }

    #[test]
    fn test_bracketed_identifier_is_normalised() {
        assert_eq!(
            lex("<non_zero-digit>"),
            vec![Token::Ident("non_zero-digit".to_string())]
        );
    }

    #[test]
    fn test_literals_and_escapes() {
        assert_eq!(
            lex(r#""a\"b" 'it\'s' "\n""#),
            vec![
                Token::Literal("a\"b".to_string()),
                Token::Literal("it's".to_string()),
                Token::Literal("\n".to_string()),
            ]
        );
        assert_eq!(lex(r#""""#), vec![Token::Literal(String::new())]);
    }

    #[test]
    fn test_unknown_escape_is_an_error() {
        let mut lexer = Token::lexer(r#""\q""#);
        assert!(matches!(lexer.next(), Some(Err(_))));
    }

    #[test]
    fn test_regex_atom() {
        assert_eq!(
            lex(r"/[0-9]+/ /a\/b/"),
            vec![
                Token::Regex("[0-9]+".to_string()),
                Token::Regex("a/b".to_string())
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        let source = "# leading\na ::= \"a\" // trailing\n; semicolon\nb ::= a";
        assert_eq!(
            lex(source),
            vec![
                Token::Ident("a".to_string()),
                Token::Define,
                Token::Literal("a".to_string()),
                Token::Ident("b".to_string()),
                Token::Define,
                Token::Ident("a".to_string()),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            lex("( a | b )* c+ d?"),
            vec![
                Token::OpenParen,
                Token::Ident("a".to_string()),
                Token::Pipe,
                Token::Ident("b".to_string()),
                Token::CloseParen,
                Token::Star,
                Token::Ident("c".to_string()),
                Token::Plus,
                Token::Ident("d".to_string()),
                Token::Question,
            ]
        );
    }
}
