//! Execution errors for compiled templates

use std::fmt;

/// Errors raised while parsing or executing a compiled artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Echo or loop over a value the bindings do not define
    UndefinedVariable {
        expr: String,
        line: usize,
    },

    /// Unbalanced or unknown tags, section stack misuse
    MalformedSyntax {
        message: String,
        line: usize,
    },

    /// `foreach` over a scalar
    NotIterable {
        expr: String,
        line: usize,
    },

    /// Echo of an array or table
    NotPrintable {
        expr: String,
        kind: &'static str,
        line: usize,
    },

    /// The expression host rejected the expression text
    InvalidExpression {
        expr: String,
        message: String,
        line: usize,
    },
}

impl TemplateError {
    pub fn line(&self) -> usize {
        match self {
            TemplateError::UndefinedVariable { line, .. }
            | TemplateError::MalformedSyntax { line, .. }
            | TemplateError::NotIterable { line, .. }
            | TemplateError::NotPrintable { line, .. }
            | TemplateError::InvalidExpression { line, .. } => *line,
        }
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UndefinedVariable { expr, line } => {
                write!(f, "Undefined variable '{}' at line {}", expr, line)
            }
            TemplateError::MalformedSyntax { message, line } => {
                write!(f, "Malformed syntax at line {}: {}", line, message)
            }
            TemplateError::NotIterable { expr, line } => {
                write!(
                    f,
                    "'{}' at line {} is neither an array nor a table and cannot be looped over",
                    expr, line
                )
            }
            TemplateError::NotPrintable { expr, kind, line } => {
                write!(
                    f,
                    "'{}' at line {} is a {} and cannot be echoed; loop over it with @foreach",
                    expr, line, kind
                )
            }
            TemplateError::InvalidExpression {
                expr,
                message,
                line,
            } => write!(f, "Invalid expression '{}' at line {}: {}", expr, line, message),
        }
    }
}

impl std::error::Error for TemplateError {}

impl TemplateError {
    /// Attach the template name and lift into the crate error
    pub fn into_vellum(self, template: &str) -> crate::error::VellumError {
        use crate::error::VellumError;

        match self {
            TemplateError::MalformedSyntax { message, line } => VellumError::MalformedDirective {
                template: template.to_string(),
                message,
                line,
            },
            other => VellumError::ExecutionFailed {
                template: template.to_string(),
                reason: other.to_string(),
            },
        }
    }
}
