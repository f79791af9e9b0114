use thiserror::Error;

use crate::ast::{Node, NodeKind, Number};

/// Raised when a node reaches a visitor with no handler for its variant.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("No handler registered for {0} nodes")]
pub struct DispatchError(pub NodeKind);

/// A consumer of the syntax tree, one method per node variant.
///
/// Every method defaults to `unhandled`, which fails with a `DispatchError`
/// naming the variant. A strict consumer overrides only the variants it
/// supports and gets loud failures for the rest; a permissive consumer
/// overrides `unhandled` with its own fallback.
pub trait NodeVisitor {
    type Output;
    type Error: From<DispatchError>;

    fn visit_comment(&mut self, _text: &str) -> Result<Self::Output, Self::Error> {
        self.unhandled(NodeKind::Comment)
    }

    fn visit_bool(&mut self, _value: bool) -> Result<Self::Output, Self::Error> {
        self.unhandled(NodeKind::Bool)
    }

    fn visit_number(&mut self, _value: &Number) -> Result<Self::Output, Self::Error> {
        self.unhandled(NodeKind::Number)
    }

    fn visit_str(&mut self, _value: &str) -> Result<Self::Output, Self::Error> {
        self.unhandled(NodeKind::Str)
    }

    fn visit_identifier(&mut self, _label: &str) -> Result<Self::Output, Self::Error> {
        self.unhandled(NodeKind::Identifier)
    }

    fn visit_list(&mut self, _values: &[Node]) -> Result<Self::Output, Self::Error> {
        self.unhandled(NodeKind::List)
    }

    fn visit_make_map(&mut self, _entries: &[(Node, Node)]) -> Result<Self::Output, Self::Error> {
        self.unhandled(NodeKind::MakeMap)
    }

    fn visit_if(
        &mut self,
        _condition: &Node,
        _when_true: &Node,
        _when_false: &Node,
    ) -> Result<Self::Output, Self::Error> {
        self.unhandled(NodeKind::If)
    }

    fn visit_let(&mut self, _name: &str, _expression: &Node) -> Result<Self::Output, Self::Error> {
        self.unhandled(NodeKind::Let)
    }

    fn visit_for_each(
        &mut self,
        _binding: &str,
        _collection: &Node,
        _body: &Node,
    ) -> Result<Self::Output, Self::Error> {
        self.unhandled(NodeKind::ForEach)
    }

    fn visit_do(&mut self, _children: &[Node]) -> Result<Self::Output, Self::Error> {
        self.unhandled(NodeKind::Do)
    }

    fn visit_call(
        &mut self,
        _target: &str,
        _arguments: &[Node],
    ) -> Result<Self::Output, Self::Error> {
        self.unhandled(NodeKind::Call)
    }

    fn unhandled(&mut self, kind: NodeKind) -> Result<Self::Output, Self::Error> {
        Err(DispatchError(kind).into())
    }
}

/// Routes a node to the visitor method matching its variant.
pub fn dispatch<V: NodeVisitor + ?Sized>(
    visitor: &mut V,
    node: &Node,
) -> Result<V::Output, V::Error> {
    match node {
        Node::Comment(text) => visitor.visit_comment(text),
        Node::Bool(value) => visitor.visit_bool(*value),
        Node::Number(value) => visitor.visit_number(value),
        Node::Str(value) => visitor.visit_str(value),
        Node::Identifier(label) => visitor.visit_identifier(label),
        Node::List(values) => visitor.visit_list(values),
        Node::MakeMap(entries) => visitor.visit_make_map(entries),
        Node::If {
            condition,
            when_true,
            when_false,
        } => visitor.visit_if(condition, when_true, when_false),
        Node::Let { name, expression } => visitor.visit_let(name, expression),
        Node::ForEach {
            binding,
            collection,
            body,
        } => visitor.visit_for_each(binding, collection, body),
        Node::Do(children) => visitor.visit_do(children),
        Node::Call { target, arguments } => visitor.visit_call(target, arguments),
    }
}
