use crate::ast::{Node, Number};
use crate::visit::{dispatch, DispatchError, NodeVisitor};

/// Renders a node back to source text. Total over the node sum, so the
/// result compiles back to an equal tree.
pub fn to_source(node: &Node) -> Result<String, DispatchError> {
    dispatch(&mut SexpRenderer, node)
}

pub struct SexpRenderer;

impl SexpRenderer {
    fn render_form(&mut self, head: &str, parts: &[Node]) -> Result<String, DispatchError> {
        let mut rendered = vec![head.to_string()];
        for part in parts {
            rendered.push(dispatch(self, part)?);
        }
        Ok(format!("({})", rendered.join(" ")))
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{07}' => escaped.push_str("\\a"),
            '\u{0C}' => escaped.push_str("\\f"),
            '\0' => escaped.push_str("\\0"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl NodeVisitor for SexpRenderer {
    type Output = String;
    type Error = DispatchError;

    fn visit_comment(&mut self, text: &str) -> Result<String, DispatchError> {
        Ok(format!(";{text}"))
    }

    fn visit_bool(&mut self, value: bool) -> Result<String, DispatchError> {
        Ok(value.to_string())
    }

    fn visit_number(&mut self, value: &Number) -> Result<String, DispatchError> {
        Ok(value.to_string())
    }

    fn visit_str(&mut self, value: &str) -> Result<String, DispatchError> {
        Ok(format!("\"{}\"", escape(value)))
    }

    fn visit_identifier(&mut self, label: &str) -> Result<String, DispatchError> {
        Ok(label.to_string())
    }

    fn visit_list(&mut self, values: &[Node]) -> Result<String, DispatchError> {
        self.render_form("list", values)
    }

    fn visit_make_map(&mut self, entries: &[(Node, Node)]) -> Result<String, DispatchError> {
        let mut parts = Vec::with_capacity(entries.len() * 2);
        for (key, value) in entries {
            parts.push(key.clone());
            parts.push(value.clone());
        }
        self.render_form("make-map", &parts)
    }

    fn visit_if(
        &mut self,
        condition: &Node,
        when_true: &Node,
        when_false: &Node,
    ) -> Result<String, DispatchError> {
        self.render_form(
            "if",
            &[condition.clone(), when_true.clone(), when_false.clone()],
        )
    }

    fn visit_let(&mut self, name: &str, expression: &Node) -> Result<String, DispatchError> {
        Ok(format!(
            "(let {} {})",
            name,
            dispatch(self, expression)?
        ))
    }

    fn visit_for_each(
        &mut self,
        binding: &str,
        collection: &Node,
        body: &Node,
    ) -> Result<String, DispatchError> {
        Ok(format!(
            "(for-each {} {} {})",
            binding,
            dispatch(self, collection)?,
            dispatch(self, body)?
        ))
    }

    fn visit_do(&mut self, children: &[Node]) -> Result<String, DispatchError> {
        self.render_form("do", children)
    }

    fn visit_call(&mut self, target: &str, arguments: &[Node]) -> Result<String, DispatchError> {
        self.render_form(target, arguments)
    }
}
