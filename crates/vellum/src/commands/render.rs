//! Render command - render a template with bound variables

use crate::context::Context;
use crate::output;
use anyhow::{Context as _, Result, anyhow, bail};
use colored::Colorize;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use toml::Value;
use toml::de::ValueDeserializer;
use vellum_core::Bindings;

/// Render `name` and write the result to `output_path` or stdout
///
/// `vars_file` is bound first so `--var` values override it.
pub fn run(
    ctx: &Context,
    name: &str,
    vars: &[String],
    vars_file: Option<PathBuf>,
    output_path: Option<PathBuf>,
) -> Result<()> {
    let mut bindings = match &vars_file {
        Some(path) => load_vars_file(path)?,
        None => Bindings::new(),
    };
    for var in vars {
        let (key, value) = parse_var(var)?;
        bindings.insert(key, value);
    }

    if ctx.verbose {
        eprintln!(
            "{} Rendering '{}' with {} variable(s)",
            "→".cyan(),
            name,
            bindings.len()
        );
    }

    let rendered = ctx.view.render(name, &bindings)?;
    output::write_rendered(&rendered, output_path.as_deref())
        .context("Failed to write rendered output")?;

    if let Some(path) = &output_path {
        println!("{} Rendered '{}' to {}", "✓".green().bold(), name, path.display());
    }

    Ok(())
}

fn load_vars_file(path: &Path) -> Result<Bindings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// `key=value`; the whole value is a TOML literal (`3`, `true`, `[1, 2]`) or
/// else a plain string
fn parse_var(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("Invalid --var '{}': expected KEY=VALUE", raw);
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("Invalid --var '{}': empty key", raw));
    }

    let parsed = Value::deserialize(ValueDeserializer::new(value))
        .unwrap_or_else(|_| Value::String(value.to_string()));

    Ok((key.to_string(), parsed))
}
