mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use context::Context;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = Context::new(&cli).and_then(|ctx| match &cli.command {
        Commands::Render {
            name,
            vars,
            vars_file,
            output,
        } => commands::render::run(&ctx, name, vars, vars_file.clone(), output.clone()),
        Commands::Compile { name } => commands::compile::run(&ctx, name),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
