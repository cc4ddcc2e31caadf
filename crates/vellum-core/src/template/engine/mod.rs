//! Interpreter for compiled artifacts
//!
//! Parses `<% ... %>` tags into nodes and executes them against the bindings,
//! writing every piece of output through the render's [`SectionRuntime`].
//! `render` tags call back into a [`TemplateLoader`], which locates, compiles
//! and executes the named template into the same runtime.

mod blocks;
pub(crate) mod helpers;
mod tokenize;

pub(crate) use tokenize::ESCAPED_OPEN;

use crate::error::{Result, VellumError};
use crate::runtime::SectionRuntime;
use crate::template::error::TemplateError;
use crate::template::expr::ExpressionHost;
use crate::template::Bindings;
use toml::Value;

use blocks::{LoopHead, Node};
use helpers::{loop_bindings, stringify_value, truthy};

/// Executes a named template into an in-progress render
pub trait TemplateLoader {
    fn render_into(
        &self,
        name: &str,
        bindings: &Bindings,
        runtime: &mut SectionRuntime,
    ) -> Result<()>;
}

/// Executes one compiled artifact
pub struct Interpreter<'a> {
    host: &'a dyn ExpressionHost,
    loader: &'a dyn TemplateLoader,
    template: &'a str,
}

impl<'a> Interpreter<'a> {
    /// `template` names the artifact's source in error messages
    pub fn new(
        host: &'a dyn ExpressionHost,
        loader: &'a dyn TemplateLoader,
        template: &'a str,
    ) -> Self {
        Self {
            host,
            loader,
            template,
        }
    }

    pub fn execute(
        &self,
        compiled: &str,
        bindings: &Bindings,
        runtime: &mut SectionRuntime,
    ) -> Result<()> {
        let nodes = blocks::parse(compiled).map_err(|e| self.fail(e))?;
        self.run(&nodes, bindings, runtime)
    }

    fn fail(&self, err: TemplateError) -> VellumError {
        err.into_vellum(self.template)
    }

    fn run(&self, nodes: &[Node], bindings: &Bindings, runtime: &mut SectionRuntime) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text(text) => runtime.emit(text),
                Node::Echo { expr, escape, line } => {
                    let text = self.echo(expr, bindings, *line)?;
                    if *escape {
                        runtime.emit(&html_escape::encode_quoted_attribute(&text));
                    } else {
                        runtime.emit(&text);
                    }
                }
                Node::If {
                    branches,
                    otherwise,
                } => {
                    let mut taken = None;
                    for branch in branches {
                        let value = self.evaluate(&branch.condition, bindings, branch.line)?;
                        if truthy(value.as_ref()) {
                            taken = Some(&branch.body);
                            break;
                        }
                    }
                    if let Some(body) = taken.or(otherwise.as_ref()) {
                        self.run(body, bindings, runtime)?;
                    }
                }
                Node::Foreach { head, body, line } => {
                    self.run_loop(head, body, *line, bindings, runtime)?;
                }
                Node::SectionStart { name } => runtime.begin_section(name),
                Node::SectionEnd { show, line } => {
                    runtime.end_section(*show).map_err(|e| {
                        self.fail(TemplateError::MalformedSyntax {
                            message: e.to_string(),
                            line: *line,
                        })
                    })?;
                }
                Node::Yield { name, default } => {
                    let content = runtime
                        .section(name)
                        .or(default.as_deref())
                        .unwrap_or_default()
                        .to_string();
                    runtime.emit(&content);
                }
                Node::Render { name, .. } => {
                    self.loader.render_into(name, bindings, runtime)?;
                }
            }
        }

        Ok(())
    }

    fn evaluate(&self, expr: &str, bindings: &Bindings, line: usize) -> Result<Option<Value>> {
        self.host.evaluate(expr, bindings).map_err(|e| {
            self.fail(TemplateError::InvalidExpression {
                expr: expr.to_string(),
                message: e.to_string(),
                line,
            })
        })
    }

    fn echo(&self, expr: &str, bindings: &Bindings, line: usize) -> Result<String> {
        let value = self.evaluate(expr, bindings, line)?.ok_or_else(|| {
            self.fail(TemplateError::UndefinedVariable {
                expr: expr.to_string(),
                line,
            })
        })?;
        stringify_value(&value, expr, line).map_err(|e| self.fail(e))
    }

    fn run_loop(
        &self,
        head: &LoopHead,
        body: &[Node],
        line: usize,
        bindings: &Bindings,
        runtime: &mut SectionRuntime,
    ) -> Result<()> {
        let source = self.evaluate(&head.source, bindings, line)?.ok_or_else(|| {
            self.fail(TemplateError::UndefinedVariable {
                expr: head.source.clone(),
                line,
            })
        })?;

        let entries: Vec<(Value, Value)> = match source {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (Value::Integer(i as i64), item))
                .collect(),
            Value::Table(table) => table
                .into_iter()
                .map(|(key, item)| (Value::String(key), item))
                .collect(),
            _ => {
                return Err(self.fail(TemplateError::NotIterable {
                    expr: head.source.clone(),
                    line,
                }))
            }
        };

        for (key, item) in entries {
            let scope = loop_bindings(bindings, head.key.as_deref(), key, &head.value, item);
            self.run(body, &scope, runtime)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
