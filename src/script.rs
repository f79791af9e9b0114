use thiserror::Error;

use crate::ast::Node;
use crate::builder::{self, BuildError};
use crate::builtins::register_builtins;
use crate::interpreter::{EvalError, Interpreter};
use crate::lexer::Lexer;
use crate::parser::{self, ParseError};
use crate::value::Value;

/// Any failure between source text and final value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScriptError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Source text to typed syntax trees, one per top-level expression.
pub fn compile_script(text: &str) -> Result<Vec<Node>, ScriptError> {
    let mut lexer = Lexer::new(text);
    let parsed = parser::parse(&mut lexer)?;
    Ok(builder::build(&parsed)?)
}

/// An interpreter with the default builtins registered.
pub fn make_default_interpreter() -> Interpreter {
    let mut interpreter = Interpreter::new();
    register_builtins(&mut interpreter);
    interpreter
}

/// Evaluates a compiled script top to bottom, yielding the last expression's
/// value, or `Nothing` for an empty script.
pub fn execute_compiled(
    nodes: &[Node],
    interpreter: &mut Interpreter,
) -> Result<Value, ScriptError> {
    let mut result = Value::Nothing;
    for node in nodes {
        result = interpreter.evaluate(node)?;
    }
    Ok(result)
}

pub fn execute_script(text: &str, interpreter: &mut Interpreter) -> Result<Value, ScriptError> {
    let nodes = compile_script(text)?;
    execute_compiled(&nodes, interpreter)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::ast::Number;
    use crate::source::SourcePosition;
    use crate::value::ValueMap;

    fn run(text: &str) -> Result<Value, ScriptError> {
        execute_script(text, &mut make_default_interpreter())
    }

    #[test]
    fn an_empty_script_yields_nothing() {
        assert_eq!(run(""), Ok(Value::Nothing));
    }

    #[test]
    fn the_last_expression_wins() {
        assert_eq!(
            run("(equals 1 1) (append 2 3)"),
            Ok(Value::Number(Number::Int(5)))
        );
    }

    #[test]
    fn builds_and_runs_a_whole_script() {
        let script = indoc! {r#"
            (do
                (let meow "cat")
                (make-map
                    "hello" (length "word")
                    "bye" (equals 1 2)
                    (append 20 4) meow))
        "#};
        let expected: ValueMap = [
            (
                Value::Str("hello".to_string()),
                Value::Number(Number::Int(4)),
            ),
            (Value::Str("bye".to_string()), Value::Bool(false)),
            (
                Value::Number(Number::Int(24)),
                Value::Str("cat".to_string()),
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(run(script), Ok(Value::Map(expected)));
    }

    #[test]
    fn transforms_a_list_through_for_each() {
        let script = indoc! {r#"
            (do
                (let parts (split "," "1,2"))
                (for-each part parts (append part "!")))
        "#};
        assert_eq!(
            run(script),
            Ok(Value::List(vec![
                Value::Str("1!".to_string()),
                Value::Str("2!".to_string()),
            ]))
        );
    }

    #[test]
    fn each_stage_reports_through_the_umbrella_error() {
        assert!(matches!(
            run(r#"("\e")"#),
            Err(ScriptError::Parse(ParseError::Lex(_)))
        ));
        assert!(matches!(run("(oops"), Err(ScriptError::Parse(_))));
        assert_eq!(
            run("(let test)"),
            Err(ScriptError::Build(BuildError::WrongArity {
                form: "let",
                expected: 2,
                found: 1,
                position: SourcePosition { line: 1, column: 1 },
            }))
        );
        assert!(matches!(run("(meow)"), Err(ScriptError::Eval(_))));
    }
}
