//! Template locator - maps dotted logical names to files under the view root
//!
//! `layout.home` becomes `<view_root>/layout/home<suffix>` for the first
//! configured suffix that names an existing regular file. Suffixes are kept
//! in priority order; [`TemplateLocator::add_suffix`] puts a new one in front.

use crate::error::{Result, VellumError};
use std::path::{Path, PathBuf};

/// Suffixes tried when nothing else is configured, in priority order
pub const DEFAULT_SUFFIXES: [&str; 2] = [".html", ".php"];

/// A template resolved to a real file for one compile pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateIdentity {
    /// Logical name as written by the caller (`layout.home`)
    pub name: String,
    /// Absolute path of the source file
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TemplateLocator {
    view_root: PathBuf,
    suffixes: Vec<String>,
}

impl TemplateLocator {
    pub fn new(view_root: impl Into<PathBuf>) -> Self {
        Self {
            view_root: view_root.into(),
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the whole suffix list (highest priority first)
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Register a suffix that is tried before every existing one.
    ///
    /// Re-adding a known suffix moves it to the front instead of duplicating it.
    pub fn add_suffix(&mut self, suffix: impl Into<String>) {
        let suffix = suffix.into();
        self.suffixes.retain(|s| *s != suffix);
        self.suffixes.insert(0, suffix);
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn view_root(&self) -> &Path {
        &self.view_root
    }

    /// Resolve a logical name to the first existing `<root>/<name><suffix>`
    pub fn resolve(&self, name: &str) -> Result<TemplateIdentity> {
        let relative = logical_to_relative(name);

        for suffix in &self.suffixes {
            let mut file_name = relative.clone().into_os_string();
            file_name.push(suffix);
            let candidate = self.view_root.join(file_name);

            if candidate.is_file() {
                let path = std::path::absolute(&candidate).unwrap_or(candidate);
                log::trace!("resolved template '{}' to {}", name, path.display());
                return Ok(TemplateIdentity {
                    name: name.to_string(),
                    path,
                });
            }
        }

        Err(VellumError::TemplateNotFound {
            name: name.to_string(),
            tried: self.suffixes.join(", "),
        })
    }
}

/// `partials.nav.top` -> `partials/nav/top` using the host separator
fn logical_to_relative(name: &str) -> PathBuf {
    name.split('.').filter(|part| !part.is_empty()).collect()
}
