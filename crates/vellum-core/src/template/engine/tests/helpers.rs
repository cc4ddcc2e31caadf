//! Shared test helpers for interpreter tests

use crate::error::Result;
use crate::runtime::SectionRuntime;
use crate::template::engine::{Interpreter, TemplateLoader};
use crate::template::expr::BasicExpressions;
use crate::template::Bindings;
use std::collections::HashMap;
use toml::toml;

/// Loader over in-memory compiled artifacts
#[derive(Default)]
pub(super) struct MapLoader {
    artifacts: HashMap<String, String>,
}

impl MapLoader {
    pub(super) fn with(mut self, name: &str, compiled: &str) -> Self {
        self.artifacts.insert(name.to_string(), compiled.to_string());
        self
    }
}

impl TemplateLoader for MapLoader {
    fn render_into(
        &self,
        name: &str,
        bindings: &Bindings,
        runtime: &mut SectionRuntime,
    ) -> Result<()> {
        let compiled = self.artifacts.get(name).ok_or_else(|| {
            crate::error::VellumError::TemplateNotFound {
                name: name.to_string(),
                tried: "<memory>".to_string(),
            }
        })?;
        Interpreter::new(&BasicExpressions, self, name).execute(compiled, bindings, runtime)
    }
}

/// Execute one artifact with a fresh runtime
pub(super) fn run_with(loader: &MapLoader, compiled: &str, bindings: &Bindings) -> Result<String> {
    let mut runtime = SectionRuntime::new();
    Interpreter::new(&BasicExpressions, loader, "test").execute(compiled, bindings, &mut runtime)?;
    runtime
        .finish()
        .map_err(|e| crate::error::VellumError::MalformedDirective {
            template: "test".to_string(),
            message: e.to_string(),
            line: 0,
        })
}

pub(super) fn run(compiled: &str, bindings: &Bindings) -> Result<String> {
    run_with(&MapLoader::default(), compiled, bindings)
}

/// Simple scalar bindings
pub(super) fn simple_bindings() -> Bindings {
    toml! {
        title = "My Title"
        count = 42
        price = 9.99
        enabled = true
        date = 2026-01-15
    }
}

/// Nested bindings with arrays and tables
pub(super) fn nested_bindings() -> Bindings {
    toml! {
        [post]
        title = "Release Notes"
        language = "en"

        [[post.authors]]
        name = "John Doe"
        email = "john@example.com"

        [[post.authors]]
        name = "Jane Smith"
        email = "jane@example.com"
    }
}
