use crate::ast::{Node, Number};
use crate::interpreter::{EvalError, EvalResult, Interpreter};
use crate::value::Value;

/// Registers the default host operations on an interpreter.
pub fn register_builtins(interpreter: &mut Interpreter) {
    interpreter.register_external_call("equals", equals);
    interpreter.register_external_call("length", length);
    interpreter.register_external_call("append", append);
    interpreter.register_external_call("split", split);
    interpreter.register_external_call("splitlines", splitlines);
}

fn evaluate_all(
    interpreter: &mut Interpreter,
    arguments: &[Node],
) -> Result<Vec<Value>, EvalError> {
    arguments
        .iter()
        .map(|argument| interpreter.evaluate(argument))
        .collect()
}

/// True when every argument equals the previous one; trivially true for zero
/// or one argument. Stops evaluating at the first mismatch.
fn equals(interpreter: &mut Interpreter, _name: &str, arguments: &[Node]) -> EvalResult {
    let mut previous: Option<Value> = None;
    for argument in arguments {
        let value = interpreter.evaluate(argument)?;
        if let Some(previous) = &previous {
            if *previous != value {
                return Ok(Value::Bool(false));
            }
        }
        previous = Some(value);
    }
    Ok(Value::Bool(true))
}

fn length(interpreter: &mut Interpreter, _name: &str, arguments: &[Node]) -> EvalResult {
    let [collection] = arguments else {
        return Err(EvalError::ArityMismatch {
            operation: "length",
            expected: "1",
            found: arguments.len(),
        });
    };
    let length = match interpreter.evaluate(collection)? {
        Value::Str(text) => text.chars().count(),
        Value::List(values) => values.len(),
        Value::Map(map) => map.len(),
        other => {
            return Err(EvalError::InvalidArgument {
                operation: "length",
                expected: "a string, list, or map",
                got: format!("{other:?}"),
            });
        }
    };
    Ok(Value::Number(Number::Int(length as i64)))
}

/// Concatenates numbers, strings, or lists. The first argument picks the
/// shape; numbers stay ints until a float joins in.
fn append(interpreter: &mut Interpreter, _name: &str, arguments: &[Node]) -> EvalResult {
    let evaluated = evaluate_all(interpreter, arguments)?;
    let Some((first, rest)) = evaluated.split_first() else {
        return Err(EvalError::ArityMismatch {
            operation: "append",
            expected: "at least 1",
            found: 0,
        });
    };
    let mut result = first.clone();
    for value in rest {
        result = match (result, value) {
            (Value::Number(left), Value::Number(right)) => Value::Number(add(left, *right)),
            (Value::Str(mut left), Value::Str(right)) => {
                left.push_str(right);
                Value::Str(left)
            }
            (Value::List(mut left), Value::List(right)) => {
                left.extend(right.iter().cloned());
                Value::List(left)
            }
            (left, right) => {
                return Err(EvalError::InvalidArgument {
                    operation: "append",
                    expected: "arguments of one appendable type",
                    got: format!("{left:?} and {right:?}"),
                });
            }
        };
    }
    Ok(result)
}

fn add(left: Number, right: Number) -> Number {
    match (left, right) {
        (Number::Int(left), Number::Int(right)) => Number::Int(left + right),
        _ => Number::Float(left.as_f64() + right.as_f64()),
    }
}

/// Splits a string on a literal separator.
fn split(interpreter: &mut Interpreter, _name: &str, arguments: &[Node]) -> EvalResult {
    let [separator, text] = arguments else {
        return Err(EvalError::ArityMismatch {
            operation: "split",
            expected: "2",
            found: arguments.len(),
        });
    };
    let separator = expect_str(interpreter, "split", separator)?;
    if separator.is_empty() {
        return Err(EvalError::InvalidArgument {
            operation: "split",
            expected: "a non-empty separator",
            got: "\"\"".to_string(),
        });
    }
    let text = expect_str(interpreter, "split", text)?;
    Ok(Value::List(
        text.split(&separator)
            .map(|part| Value::Str(part.to_string()))
            .collect(),
    ))
}

fn splitlines(interpreter: &mut Interpreter, _name: &str, arguments: &[Node]) -> EvalResult {
    let [text] = arguments else {
        return Err(EvalError::ArityMismatch {
            operation: "splitlines",
            expected: "1",
            found: arguments.len(),
        });
    };
    let text = expect_str(interpreter, "splitlines", text)?;
    Ok(Value::List(
        text.lines().map(|line| Value::Str(line.to_string())).collect(),
    ))
}

fn expect_str(
    interpreter: &mut Interpreter,
    operation: &'static str,
    argument: &Node,
) -> Result<String, EvalError> {
    match interpreter.evaluate(argument)? {
        Value::Str(text) => Ok(text),
        other => Err(EvalError::InvalidArgument {
            operation,
            expected: "a string",
            got: format!("{other:?}"),
        }),
    }
}
