use std::cell::Cell;

use tracing::trace;

use crate::ast::Node;
use crate::interpreter::{EvalResult, Interpreter, Middleware};
use crate::render::to_source;

/// Logs every node before evaluation and its outcome after, indented by
/// nesting depth. Enable with a `tracing` subscriber at TRACE level.
pub struct TraceMiddleware {
    depth: Cell<usize>,
}

impl TraceMiddleware {
    pub fn new() -> Self {
        Self {
            depth: Cell::new(0),
        }
    }
}

impl Default for TraceMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for TraceMiddleware {
    fn around(&self, interpreter: &mut Interpreter, node: &Node) -> EvalResult {
        let indent = "|   ".repeat(self.depth.get());
        let source = to_source(node).unwrap_or_else(|_| format!("{node:?}"));
        trace!("{indent}evaluating: {source}");
        self.depth.set(self.depth.get() + 1);
        let result = interpreter.eval_node(node);
        self.depth.set(self.depth.get() - 1);
        match &result {
            Ok(value) => trace!("{indent}+-- {value}"),
            Err(error) => trace!("{indent}+-- failed: {error}"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::ast::Number;
    use crate::script::{compile_script, make_default_interpreter};
    use crate::value::Value;

    #[test]
    fn tracing_does_not_change_results() {
        let script = "(do (let x (append 1 2)) (for-each y (list x) (append y 1)))";
        let nodes = compile_script(script).expect("script should compile");

        let middleware = Rc::new(TraceMiddleware::new());
        let mut traced = make_default_interpreter();
        traced.set_middleware(middleware.clone());
        let mut plain = make_default_interpreter();

        for node in &nodes {
            assert_eq!(traced.evaluate(node), plain.evaluate(node));
        }
        assert_eq!(
            traced.evaluate(&Node::Identifier("x".to_string())),
            Ok(Value::Number(Number::Int(3)))
        );
        assert_eq!(middleware.depth.get(), 0);
    }

    #[test]
    fn failures_pass_through_unchanged() {
        let mut traced = make_default_interpreter();
        traced.set_middleware(Rc::new(TraceMiddleware::new()));
        let nodes = compile_script("(no-such-function)").expect("script should compile");
        assert!(traced.evaluate(&nodes[0]).is_err());
        assert_eq!(
            traced.evaluate(&Node::Number(Number::Int(7))),
            Ok(Value::Number(Number::Int(7)))
        );
    }
}
