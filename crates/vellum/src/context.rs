//! Global context for CLI commands

use crate::cli::Cli;
use anyhow::{Context as _, Result, anyhow};
use std::path::{Path, PathBuf};
use vellum_core::config::consts::CONFIG_FILE_NAME;
use vellum_core::{View, ViewConfig};

/// Cache directory used when neither a config file nor --cache names one
const DEFAULT_CACHE_DIR: &str = ".vellum-cache";

/// Global context containing the configured view
pub struct Context {
    pub view: View,
    pub verbose: bool,
}

impl Context {
    /// Build the view from the config file and command line overrides
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An explicit config file cannot be read or parsed
    /// - No template root is known (no config and no --root)
    /// - A configured rule is not a valid regex
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = match load_config(cli.config.as_deref())? {
            Some(mut config) => {
                if let Some(root) = &cli.root {
                    config.view_root = root.clone();
                }
                if let Some(cache) = &cli.cache {
                    config.cache_dir = cache.clone();
                }
                config
            }
            None => {
                let root = cli.root.clone().ok_or_else(|| {
                    anyhow!(
                        "No {} found in the current directory; pass --config or --root",
                        CONFIG_FILE_NAME
                    )
                })?;
                let cache = cli
                    .cache
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));
                ViewConfig::new(root, cache)
            }
        };

        log::debug!(
            "view root {}, cache {}",
            config.view_root.display(),
            config.cache_dir.display()
        );
        let view = View::from_config(&config).context("Invalid configuration")?;

        Ok(Self {
            view,
            verbose: cli.verbose,
        })
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Option<ViewConfig>> {
    if let Some(path) = explicit {
        return Ok(Some(ViewConfig::from_file(path)?));
    }

    let default = Path::new(CONFIG_FILE_NAME);
    if default.is_file() {
        return Ok(Some(ViewConfig::from_file(default)?));
    }

    Ok(None)
}
