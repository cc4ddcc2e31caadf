//! Template module - execution of compiled artifacts
//!
//! A compiled artifact is literal text interleaved with `<% ... %>` tags:
//!
//! - Echo: `<%= expr %>` (HTML-escaped) or `<%- expr %>` (raw)
//! - Conditionals: `<% if expr %> ... <% elseif expr %> ... <% else %> ... <% endif %>`
//! - Loops: `<% foreach expr as item %>` or `<% foreach expr as key => item %>`, `<% endforeach %>`
//! - Sections: `<% section "name" %> ... <% endsection stop|show %>`
//! - Yield: `<% yield "name" %>` or `<% yield "name" "default" %>`
//! - Nested templates: `<% render "logical.name" %>`
//!
//! Expression text is evaluated by an [`ExpressionHost`].

pub mod engine;
pub mod error;
pub mod expr;

pub use engine::{Interpreter, TemplateLoader};
pub use error::TemplateError;
pub use expr::{BasicExpressions, ExpressionError, ExpressionHost};

/// Variables visible to a template
pub type Bindings = toml::Table;
