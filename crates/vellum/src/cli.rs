//! CLI command structure using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vellum")]
#[command(version, about = "Compile and render directive-based templates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./vellum.toml when present)
    #[arg(long, global = true, env = "VELLUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Template root directory (overrides view_root)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Compiled artifact directory (overrides cache_dir)
    #[arg(long, global = true)]
    pub cache: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template to stdout or a file
    Render {
        /// Logical template name (e.g. "pages.home")
        name: String,

        /// Bind a variable; the value is read as a TOML literal, else as a string
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,

        /// TOML file whose top-level table is bound before --var values
        #[arg(long = "vars", value_name = "FILE")]
        vars_file: Option<PathBuf>,

        /// Write the output here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a template into the cache without rendering it
    Compile {
        /// Logical template name
        name: String,
    },
}
