use thiserror::Error;

use crate::lexer::{LexError, Token, TokenKind, TokenSource};
use crate::source::SourcePosition;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("Expected {expected} but found {found} at {position}")]
    Unexpected {
        expected: &'static str,
        found: String,
        position: SourcePosition,
    },
    #[error("Unexpected end of input, expected {expected} at {position}")]
    EndOfInput {
        expected: &'static str,
        position: SourcePosition,
    },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// An untyped parenthesized tree. For `(a b c)` the head is the open paren
/// token and the tail holds one subtree per element; a leaf token is a head
/// with an empty tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sexp {
    pub head: Token,
    pub tail: Vec<Sexp>,
}

impl Sexp {
    pub fn leaf(head: Token) -> Self {
        Self {
            head,
            tail: Vec::new(),
        }
    }
}

/// Parses every top-level expression until the source is exhausted.
pub fn parse(tokens: &mut dyn TokenSource) -> ParseResult<Vec<Sexp>> {
    let mut expressions = Vec::new();
    while !tokens.is_eof()? {
        expressions.push(parse_expression(tokens)?);
    }
    Ok(expressions)
}

/// One parenthesized expression, consuming both parens.
pub fn parse_expression(tokens: &mut dyn TokenSource) -> ParseResult<Sexp> {
    let head = expect_token(tokens, TokenKind::OpenParen, "open '('")?;
    let mut tail = Vec::new();
    while peek_any_token(tokens, "an expression element or close ')'")?.kind
        != TokenKind::CloseParen
    {
        tail.push(parse_atom(tokens)?);
    }
    expect_token(tokens, TokenKind::CloseParen, "close ')'")?;
    Ok(Sexp { head, tail })
}

/// A single element: a leaf token or a nested expression.
pub fn parse_atom(tokens: &mut dyn TokenSource) -> ParseResult<Sexp> {
    let peeked = peek_any_token(tokens, "an atom")?;
    match peeked.kind {
        TokenKind::Identifier | TokenKind::Number | TokenKind::Str | TokenKind::Bool => {
            let token = tokens.get()?.ok_or_else(|| ParseError::EndOfInput {
                expected: "an atom",
                position: peeked.start,
            })?;
            Ok(Sexp::leaf(token))
        }
        TokenKind::OpenParen => parse_expression(tokens),
        TokenKind::CloseParen => Err(ParseError::Unexpected {
            expected: "an atom",
            found: peeked.to_string(),
            position: peeked.start,
        }),
    }
}

fn peek_any_token(tokens: &mut dyn TokenSource, expected: &'static str) -> ParseResult<Token> {
    let position = tokens.tell();
    match tokens.peek()? {
        Some(token) => Ok(token.clone()),
        None => Err(ParseError::EndOfInput { expected, position }),
    }
}

fn expect_token(
    tokens: &mut dyn TokenSource,
    kind: TokenKind,
    expected: &'static str,
) -> ParseResult<Token> {
    let position = tokens.tell();
    match tokens.get()? {
        Some(token) if token.kind == kind => Ok(token),
        Some(token) => Err(ParseError::Unexpected {
            expected,
            found: token.to_string(),
            position,
        }),
        None => Err(ParseError::EndOfInput { expected, position }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_text(text: &str) -> ParseResult<Vec<Sexp>> {
        let mut lexer = Lexer::new(text);
        parse(&mut lexer)
    }

    fn shape(sexp: &Sexp) -> String {
        if sexp.tail.is_empty() {
            sexp.head.text.clone()
        } else {
            let parts: Vec<String> = sexp.tail.iter().map(shape).collect();
            format!("({})", parts.join(" "))
        }
    }

    #[test]
    fn parses_nested_expressions() {
        let parsed =
            parse_text(r#"(let x (append 1 2)) (print "done")"#).expect("parse should succeed");
        let shapes: Vec<String> = parsed.iter().map(shape).collect();
        assert_eq!(shapes, vec!["(let x (append 1 2))", "(print done)"]);
    }

    #[test]
    fn parses_an_empty_expression() {
        let parsed = parse_text("()").expect("parse should succeed");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].head.kind, TokenKind::OpenParen);
        assert!(parsed[0].tail.is_empty());
    }

    #[test]
    fn leaf_tokens_keep_their_positions() {
        let parsed = parse_text("(do 42)").expect("parse should succeed");
        let number = &parsed[0].tail[1];
        assert_eq!(number.head.start, SourcePosition { line: 1, column: 5 });
        assert_eq!(number.head.end, SourcePosition { line: 1, column: 7 });
    }

    #[test]
    fn rejects_a_bare_atom_at_top_level() {
        let error = parse_text("x").expect_err("expected parse failure");
        assert_eq!(
            error,
            ParseError::Unexpected {
                expected: "open '('",
                found: "identifier 'x'".to_string(),
                position: SourcePosition { line: 1, column: 1 },
            }
        );
    }

    #[test]
    fn rejects_a_missing_close_paren() {
        let error = parse_text("(do 1 2").expect_err("expected parse failure");
        assert_eq!(
            error,
            ParseError::EndOfInput {
                expected: "an expression element or close ')'",
                position: SourcePosition { line: 1, column: 8 },
            }
        );
    }

    #[test]
    fn rejects_a_stray_close_paren() {
        let error = parse_text(")").expect_err("expected parse failure");
        assert!(matches!(error, ParseError::Unexpected { .. }));
    }

    #[test]
    fn surfaces_lex_errors() {
        let error = parse_text(r#"(print "\e")"#).expect_err("expected parse failure");
        assert!(matches!(
            error,
            ParseError::Lex(LexError::UnknownEscape { .. })
        ));
    }
}
