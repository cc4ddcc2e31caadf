//! Compile command - bring a template's cached artifact up to date

use crate::context::Context;
use crate::output;
use anyhow::Result;
use colored::Colorize;

pub fn run(ctx: &Context, name: &str) -> Result<()> {
    let compiled = ctx.view.compile(name)?;

    if ctx.verbose {
        output::print_text(&format!(
            "{} Source: {}",
            "→".cyan(),
            compiled.identity.path.display()
        ))?;
    }

    if compiled.fresh {
        output::print_text(&format!(
            "{} Compiled '{}' -> {}",
            "✓".green().bold(),
            name,
            compiled.artifact.display()
        ))?;
    } else {
        output::print_text(&format!(
            "{} '{}' is up to date ({})",
            "✓".green().bold(),
            name,
            compiled.artifact.display()
        ))?;
    }

    Ok(())
}
