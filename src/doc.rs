use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::{Node, Number};
use crate::render::to_source;
use crate::visit::{dispatch, DispatchError, NodeVisitor};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DocError {
    #[error(transparent)]
    Unhandled(#[from] DispatchError),
    #[error("Unable to describe unknown external call '{name}'")]
    UnknownCall { name: String },
}

pub type DocResult = Result<(), DocError>;

/// Describes one external call in prose. Receives the renderer, the call
/// target name, and the raw argument nodes.
pub type DescribeFn = dyn Fn(&mut MarkdownRenderer, &str, &[Node]) -> DocResult;

/// Renders a script's control flow as nested markdown bullet lists. External
/// calls need a registered describer; literal nodes outside an inline
/// position cannot be documented and fail loudly.
pub struct MarkdownRenderer {
    lines: Vec<String>,
    indent: usize,
    in_list: bool,
    describers: HashMap<String, Rc<DescribeFn>>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            indent: 0,
            in_list: false,
            describers: HashMap::new(),
        }
    }

    pub fn register_describer<F>(&mut self, name: &str, describer: F)
    where
        F: Fn(&mut MarkdownRenderer, &str, &[Node]) -> DocResult + 'static,
    {
        self.describers.insert(name.to_string(), Rc::new(describer));
    }

    pub fn render(&mut self, nodes: &[Node]) -> DocResult {
        for node in nodes {
            dispatch(self, node)?;
            self.write_blank_line();
        }
        Ok(())
    }

    pub fn markdown(&self) -> String {
        self.lines.join("\n")
    }

    pub fn write_line(&mut self, text: &str) {
        self.lines.push(format!("{}{}", "  ".repeat(self.indent), text));
    }

    /// At most one blank line in a row.
    pub fn write_blank_line(&mut self) {
        if self.lines.last().is_some_and(|line| !line.trim().is_empty()) {
            self.lines.push(String::new());
        }
    }

    pub fn write_header(&mut self, level: usize, text: &str) {
        self.write_line(&format!("{} {}", "#".repeat(level), text));
        self.write_blank_line();
    }

    pub fn code_block(&mut self, language: &str, code: &str) {
        self.write_line(&format!("```{language}"));
        for line in code.lines() {
            self.write_line(line);
        }
        self.write_line("```");
    }

    /// Writes a heading and renders the body one list level deeper. At the
    /// top level the heading is a plain line; inside a list it is a bullet.
    pub fn item<F>(&mut self, heading: &str, body: F) -> DocResult
    where
        F: FnOnce(&mut Self) -> DocResult,
    {
        let was_in_list = self.in_list;
        if was_in_list {
            self.write_line(&format!("- {heading}"));
            self.indent += 1;
        } else {
            self.write_line(heading);
        }
        self.in_list = true;
        let result = body(self);
        self.in_list = was_in_list;
        if was_in_list {
            self.indent -= 1;
        }
        result
    }

    /// A short inline description of an expression node.
    pub fn inline(&mut self, node: &Node) -> Result<String, DocError> {
        dispatch(&mut InlineDescriber, node)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeVisitor for MarkdownRenderer {
    type Output = ();
    type Error = DocError;

    fn visit_do(&mut self, children: &[Node]) -> DocResult {
        self.item("Perform the following steps:", |renderer| {
            for child in children {
                dispatch(renderer, child)?;
            }
            Ok(())
        })
    }

    fn visit_if(&mut self, condition: &Node, when_true: &Node, when_false: &Node) -> DocResult {
        let condition = self.inline(condition)?;
        self.item(&format!("If {condition}:"), |renderer| {
            dispatch(renderer, when_true)
        })?;
        self.write_blank_line();
        self.item("Otherwise:", |renderer| dispatch(renderer, when_false))
    }

    fn visit_let(&mut self, name: &str, expression: &Node) -> DocResult {
        self.item(&format!("To create the variable `{name}`:"), |renderer| {
            dispatch(renderer, expression)
        })
    }

    fn visit_for_each(&mut self, binding: &str, collection: &Node, body: &Node) -> DocResult {
        let collection = self.inline(collection)?;
        self.item(
            &format!("For each `{binding}` in {collection}:"),
            |renderer| dispatch(renderer, body),
        )
    }

    fn visit_call(&mut self, target: &str, arguments: &[Node]) -> DocResult {
        let Some(describer) = self.describers.get(target).cloned() else {
            return Err(DocError::UnknownCall {
                name: target.to_string(),
            });
        };
        describer(self, target, arguments)
    }
}

/// Inline renditions: numbers read plainly, everything else that can appear
/// in an expression position becomes inline code.
struct InlineDescriber;

impl InlineDescriber {
    fn as_code(&mut self, node: &Node) -> Result<String, DocError> {
        Ok(format!("`{}`", to_source(node)?))
    }
}

impl NodeVisitor for InlineDescriber {
    type Output = String;
    type Error = DocError;

    fn visit_number(&mut self, value: &Number) -> Result<String, DocError> {
        Ok(value.to_string())
    }

    fn visit_identifier(&mut self, label: &str) -> Result<String, DocError> {
        Ok(format!("`{label}`"))
    }

    fn visit_bool(&mut self, value: bool) -> Result<String, DocError> {
        self.as_code(&Node::Bool(value))
    }

    fn visit_str(&mut self, value: &str) -> Result<String, DocError> {
        self.as_code(&Node::Str(value.to_string()))
    }

    fn visit_list(&mut self, values: &[Node]) -> Result<String, DocError> {
        self.as_code(&Node::List(values.to_vec()))
    }

    fn visit_call(&mut self, target: &str, arguments: &[Node]) -> Result<String, DocError> {
        self.as_code(&Node::Call {
            target: target.to_string(),
            arguments: arguments.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::ast::NodeKind;
    use crate::script::compile_script;

    fn renderer_with_print() -> MarkdownRenderer {
        let mut renderer = MarkdownRenderer::new();
        renderer.register_describer("print", |renderer, _name, arguments| {
            let mut described = Vec::with_capacity(arguments.len());
            for argument in arguments {
                described.push(renderer.inline(argument)?);
            }
            renderer.item(&format!("Print {}.", described.join(", ")), |_| Ok(()))
        });
        renderer
    }

    fn render(text: &str) -> Result<String, DocError> {
        let nodes = compile_script(text).expect("script should compile");
        let mut renderer = renderer_with_print();
        renderer.render(&nodes)?;
        Ok(renderer.markdown())
    }

    #[test]
    fn renders_nested_steps_as_bullet_lists() {
        let script = indoc! {r#"
            (do
                (let x 4)
                (for-each item rows (print item)))
        "#};
        let expected = indoc! {"
            Perform the following steps:
            - To create the variable `x`:
              - Print 4.
            - For each `item` in `rows`:
              - Print `item`.
        "};
        assert_eq!(render(script).expect("render should succeed"), expected);
    }

    #[test]
    fn renders_both_branches_of_an_if() {
        let script = r#"(if (equals x 1) (print "one") (print "other"))"#;
        let mut renderer = renderer_with_print();
        renderer.register_describer("equals", |renderer, _name, arguments| {
            let left = renderer.inline(&arguments[0])?;
            let right = renderer.inline(&arguments[1])?;
            renderer.item(&format!("Check that {left} equals {right}."), |_| Ok(()))
        });
        let nodes = compile_script(script).expect("script should compile");
        renderer.render(&nodes).expect("render should succeed");
        let expected = indoc! {r#"
            If `(equals x 1)`:
            - Print `"one"`.

            Otherwise:
            - Print `"other"`.
        "#};
        assert_eq!(renderer.markdown(), expected);
    }

    #[test]
    fn unknown_calls_cannot_be_described() {
        assert_eq!(
            render("(do (frobnicate))").expect_err("expected render failure"),
            DocError::UnknownCall {
                name: "frobnicate".to_string(),
            }
        );
    }

    #[test]
    fn bare_literals_cannot_be_documented() {
        assert_eq!(
            render("(do 42)").expect_err("expected render failure"),
            DocError::Unhandled(DispatchError(NodeKind::Number))
        );
    }

    #[test]
    fn inline_descriptions_read_naturally() {
        let mut renderer = MarkdownRenderer::new();
        let nodes = compile_script(r#"(print 4 x true (append 1 2))"#)
            .expect("script should compile");
        let Node::Call { arguments, .. } = &nodes[0] else {
            panic!("expected a call node");
        };
        let described: Vec<String> = arguments
            .iter()
            .map(|argument| renderer.inline(argument).expect("inline should succeed"))
            .collect();
        assert_eq!(described, ["4", "`x`", "`true`", "`(append 1 2)`"]);
    }
}
