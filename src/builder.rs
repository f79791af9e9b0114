use thiserror::Error;

use crate::ast::{Node, Number};
use crate::lexer::TokenKind;
use crate::parser::Sexp;
use crate::source::SourcePosition;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("Unexpected empty s-expression at {position}")]
    EmptyExpression { position: SourcePosition },
    #[error("Expected an identifier as {role} but found {found} at {position}")]
    ExpectedIdentifier {
        role: &'static str,
        found: String,
        position: SourcePosition,
    },
    #[error("'{form}' expects {expected} arguments but found {found} at {position}")]
    WrongArity {
        form: &'static str,
        expected: usize,
        found: usize,
        position: SourcePosition,
    },
    #[error("'make-map' expects an even number of arguments but found {found} at {position}")]
    UnevenMakeMap {
        found: usize,
        position: SourcePosition,
    },
    #[error("Invalid number literal '{literal}' at {position}")]
    InvalidNumber {
        literal: String,
        position: SourcePosition,
    },
}

pub type BuildResult<T> = Result<T, BuildError>;

/// Builds every top-level expression of a parsed script.
pub fn build(expressions: &[Sexp]) -> BuildResult<Vec<Node>> {
    expressions.iter().map(build_node).collect()
}

/// Maps one untyped tree onto the typed `Node` sum.
pub fn build_node(sexp: &Sexp) -> BuildResult<Node> {
    match sexp.head.kind {
        TokenKind::Str => Ok(Node::Str(sexp.head.text.clone())),
        TokenKind::Bool => Ok(Node::Bool(sexp.head.text == "true")),
        TokenKind::Identifier => Ok(Node::Identifier(sexp.head.text.clone())),
        TokenKind::Number => Ok(Node::Number(build_number(sexp)?)),
        TokenKind::OpenParen | TokenKind::CloseParen => build_form(sexp),
    }
}

fn build_number(sexp: &Sexp) -> BuildResult<Number> {
    let literal = &sexp.head.text;
    let invalid = || BuildError::InvalidNumber {
        literal: literal.clone(),
        position: sexp.head.start,
    };
    if literal.contains('.') {
        Ok(Number::Float(literal.parse().map_err(|_| invalid())?))
    } else {
        Ok(Number::Int(literal.parse().map_err(|_| invalid())?))
    }
}

/// A parenthesized form: a reserved keyword if the leading identifier names
/// one, otherwise an external call.
fn build_form(sexp: &Sexp) -> BuildResult<Node> {
    let Some(name_node) = sexp.tail.first() else {
        return Err(BuildError::EmptyExpression {
            position: sexp.head.start,
        });
    };
    if name_node.head.kind != TokenKind::Identifier {
        return Err(BuildError::ExpectedIdentifier {
            role: "the operation of an s-expression",
            found: name_node.head.to_string(),
            position: name_node.head.start,
        });
    }

    let arguments = &sexp.tail[1..];
    match name_node.head.text.as_str() {
        "let" => build_let(sexp, arguments),
        "if" => build_if(sexp, arguments),
        "for-each" => build_for_each(sexp, arguments),
        "list" => Ok(Node::List(build(arguments)?)),
        "make-map" => build_make_map(sexp, arguments),
        "do" => Ok(Node::Do(build(arguments)?)),
        target => Ok(Node::Call {
            target: target.to_string(),
            arguments: build(arguments)?,
        }),
    }
}

fn build_let(sexp: &Sexp, arguments: &[Sexp]) -> BuildResult<Node> {
    let [name, expression] = arguments else {
        return Err(BuildError::WrongArity {
            form: "let",
            expected: 2,
            found: arguments.len(),
            position: sexp.head.start,
        });
    };
    Ok(Node::Let {
        name: expect_identifier(name, "the name of the variable to declare")?,
        expression: Box::new(build_node(expression)?),
    })
}

fn build_if(sexp: &Sexp, arguments: &[Sexp]) -> BuildResult<Node> {
    let [condition, when_true, when_false] = arguments else {
        return Err(BuildError::WrongArity {
            form: "if",
            expected: 3,
            found: arguments.len(),
            position: sexp.head.start,
        });
    };
    Ok(Node::If {
        condition: Box::new(build_node(condition)?),
        when_true: Box::new(build_node(when_true)?),
        when_false: Box::new(build_node(when_false)?),
    })
}

fn build_for_each(sexp: &Sexp, arguments: &[Sexp]) -> BuildResult<Node> {
    let [binding, collection, body] = arguments else {
        return Err(BuildError::WrongArity {
            form: "for-each",
            expected: 3,
            found: arguments.len(),
            position: sexp.head.start,
        });
    };
    Ok(Node::ForEach {
        binding: expect_identifier(binding, "the name of the iteration variable")?,
        collection: Box::new(build_node(collection)?),
        body: Box::new(build_node(body)?),
    })
}

fn build_make_map(sexp: &Sexp, arguments: &[Sexp]) -> BuildResult<Node> {
    if arguments.len() % 2 != 0 {
        return Err(BuildError::UnevenMakeMap {
            found: arguments.len(),
            position: sexp.head.start,
        });
    }
    let entries = arguments
        .chunks_exact(2)
        .map(|pair| Ok((build_node(&pair[0])?, build_node(&pair[1])?)))
        .collect::<BuildResult<Vec<_>>>()?;
    Ok(Node::MakeMap(entries))
}

fn expect_identifier(sexp: &Sexp, role: &'static str) -> BuildResult<String> {
    if sexp.head.kind == TokenKind::Identifier {
        Ok(sexp.head.text.clone())
    } else {
        Err(BuildError::ExpectedIdentifier {
            role,
            found: sexp.head.to_string(),
            position: sexp.head.start,
        })
    }
}
