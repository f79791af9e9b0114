use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::{Node, Number};
use crate::value::{Value, ValueMap};
use crate::visit::{dispatch, DispatchError, NodeVisitor};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unknown variable '{name}'")]
    UnknownVariable { name: String },
    #[error("Unknown function '{name}' (arguments: {arguments})")]
    UnknownFunction { name: String, arguments: String },
    #[error(transparent)]
    Unhandled(#[from] DispatchError),
    #[error("'{operation}' expects {expected} but got {got}")]
    InvalidArgument {
        operation: &'static str,
        expected: &'static str,
        got: String,
    },
    #[error("'{operation}' expects {expected} arguments but found {found}")]
    ArityMismatch {
        operation: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("Cannot iterate over {got}")]
    NotIterable { got: String },
    #[error("Script nesting exceeds the evaluation depth limit")]
    NestingTooDeep,
}

pub type EvalResult = Result<Value, EvalError>;

/// A host operation. Receives the interpreter, the call target name, and the
/// raw argument nodes; arguments are only evaluated if the callback asks.
pub type ExternalFn = dyn Fn(&mut Interpreter, &str, &[Node]) -> EvalResult;

/// Wraps every evaluation step. The implementation decides whether and how
/// often to run the default by calling `Interpreter::eval_node`; evaluating
/// child nodes through `Interpreter::evaluate` re-enters the middleware.
pub trait Middleware {
    fn around(&self, interpreter: &mut Interpreter, node: &Node) -> EvalResult;
}

const MAX_DEPTH: usize = 2_000;

/// Tree-walking evaluator with a scope stack and a registry of external
/// calls. Fresh interpreters know no operations; hosts register their own,
/// usually starting from `builtins::register_builtins`.
pub struct Interpreter {
    scopes: Vec<HashMap<String, Value>>,
    external_calls: HashMap<String, Rc<ExternalFn>>,
    middleware: Option<Rc<dyn Middleware>>,
    depth: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            external_calls: HashMap::new(),
            middleware: None,
            depth: 0,
        }
    }

    pub fn register_external_call<F>(&mut self, name: &str, callback: F)
    where
        F: Fn(&mut Interpreter, &str, &[Node]) -> EvalResult + 'static,
    {
        self.external_calls.insert(name.to_string(), Rc::new(callback));
    }

    pub fn set_middleware(&mut self, middleware: Rc<dyn Middleware>) {
        self.middleware = Some(middleware);
    }

    /// Evaluates one node, routing through the installed middleware.
    pub fn evaluate(&mut self, node: &Node) -> EvalResult {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::NestingTooDeep);
        }
        self.depth += 1;
        let result = match self.middleware.clone() {
            Some(middleware) => middleware.around(self, node),
            None => self.eval_node(node),
        };
        self.depth -= 1;
        result
    }

    /// Plain dispatch, bypassing the middleware for this node only. This is
    /// the default a middleware invokes or skips.
    pub fn eval_node(&mut self, node: &Node) -> EvalResult {
        dispatch(self, node)
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn create_variable(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    fn lookup_variable(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeVisitor for Interpreter {
    type Output = Value;
    type Error = EvalError;

    fn visit_comment(&mut self, _text: &str) -> EvalResult {
        Ok(Value::Nothing)
    }

    fn visit_bool(&mut self, value: bool) -> EvalResult {
        Ok(Value::Bool(value))
    }

    fn visit_number(&mut self, value: &Number) -> EvalResult {
        Ok(Value::Number(*value))
    }

    fn visit_str(&mut self, value: &str) -> EvalResult {
        Ok(Value::Str(value.to_string()))
    }

    fn visit_identifier(&mut self, label: &str) -> EvalResult {
        match self.lookup_variable(label) {
            Some(value) => Ok(value.clone()),
            None => Err(EvalError::UnknownVariable {
                name: label.to_string(),
            }),
        }
    }

    fn visit_list(&mut self, values: &[Node]) -> EvalResult {
        let values = values
            .iter()
            .map(|value| self.evaluate(value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::List(values))
    }

    fn visit_make_map(&mut self, entries: &[(Node, Node)]) -> EvalResult {
        let mut map = ValueMap::new();
        for (key, value) in entries {
            let key = self.evaluate(key)?;
            let value = self.evaluate(value)?;
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }

    fn visit_if(&mut self, condition: &Node, when_true: &Node, when_false: &Node) -> EvalResult {
        if self.evaluate(condition)?.is_truthy() {
            self.evaluate(when_true)
        } else {
            self.evaluate(when_false)
        }
    }

    fn visit_let(&mut self, name: &str, expression: &Node) -> EvalResult {
        let value = self.evaluate(expression)?;
        self.create_variable(name, value);
        Ok(Value::Nothing)
    }

    fn visit_for_each(&mut self, binding: &str, collection: &Node, body: &Node) -> EvalResult {
        let values = match self.evaluate(collection)? {
            Value::List(values) => values,
            other => {
                return Err(EvalError::NotIterable {
                    got: format!("{other:?}"),
                });
            }
        };
        let mut results = Vec::with_capacity(values.len());
        for value in values {
            self.push_scope();
            self.create_variable(binding, value);
            let result = self.evaluate(body);
            // Unwind the iteration scope even when the body failed.
            self.pop_scope();
            results.push(result?);
        }
        Ok(Value::List(results))
    }

    fn visit_do(&mut self, children: &[Node]) -> EvalResult {
        let mut result = Value::Nothing;
        for child in children {
            result = self.evaluate(child)?;
        }
        Ok(result)
    }

    fn visit_call(&mut self, target: &str, arguments: &[Node]) -> EvalResult {
        let Some(callback) = self.external_calls.get(target).cloned() else {
            return Err(EvalError::UnknownFunction {
                name: target.to_string(),
                arguments: format!("{arguments:?}"),
            });
        };
        callback(self, target, arguments)
    }
}
