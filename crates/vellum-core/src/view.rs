//! Render engine - the public entry point
//!
//! A [`View`] ties the locator, compile cache, compiler and expression host
//! together. Each [`View::render`] call owns a fresh [`SectionRuntime`];
//! nested `render` tags (from `@extends` and `@include`) resolve, compile and
//! execute their target into that same runtime, so only the outermost call
//! assembles a result.
//!
//! ```no_run
//! use vellum_core::View;
//!
//! let mut view = View::new("resources/views", "storage/views");
//! view.with("site", "Example");
//!
//! let html = view.make("pages.home").with("title", "Welcome").render()?;
//! # Ok::<(), vellum_core::VellumError>(())
//! ```

use crate::cache::{CacheKey, CompileCache};
use crate::compiler::Compiler;
use crate::config::{consts, ViewConfig};
use crate::error::{Result, VellumError};
use crate::locator::{TemplateIdentity, TemplateLocator};
use crate::runtime::SectionRuntime;
use crate::template::{BasicExpressions, Bindings, ExpressionHost, Interpreter, TemplateLoader};
use std::path::{Path, PathBuf};
use std::time::Duration;
use toml::Value;

/// Deepest allowed chain of nested renders
pub const MAX_RENDER_DEPTH: usize = consts::render::MAX_DEPTH;

/// Result of [`View::compile`]
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    pub identity: TemplateIdentity,
    pub key: CacheKey,
    /// Location of the persisted artifact
    pub artifact: PathBuf,
    /// Artifact text
    pub code: String,
    /// Whether this call compiled the source (false on a cache hit)
    pub fresh: bool,
}

pub struct View {
    locator: TemplateLocator,
    cache: CompileCache,
    compiler: Compiler,
    host: Box<dyn ExpressionHost>,
    shared: Bindings,
}

impl View {
    pub fn new(view_root: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            locator: TemplateLocator::new(view_root),
            cache: CompileCache::new(cache_dir),
            compiler: Compiler::new(),
            host: Box::new(BasicExpressions),
            shared: Bindings::new(),
        }
    }

    /// Build a view from a loaded [`ViewConfig`]; fails on an invalid rule
    pub fn from_config(config: &ViewConfig) -> Result<Self> {
        config.validate()?;
        let mut view = Self::new(&config.view_root, &config.cache_dir);

        if let Some(suffixes) = &config.suffixes {
            view.locator = TemplateLocator::new(&config.view_root).with_suffixes(suffixes.clone());
        }
        view.cache
            .set_ttl(config.cache_ttl_secs.map(Duration::from_secs));
        view.cache
            .set_lock_timeout(Duration::from_millis(config.lock_timeout_ms));

        for rule in &config.rules {
            view.compiler.add_rule(&rule.pattern, &rule.replacement)?;
        }

        Ok(view)
    }

    /// Bind a variable for every render of this view
    pub fn with(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.shared.insert(key.into(), value.into());
        self
    }

    /// Bind every entry of `bindings` for every render of this view
    pub fn with_many(&mut self, bindings: Bindings) -> &mut Self {
        self.shared.extend(bindings);
        self
    }

    /// Try `suffix` before every suffix registered so far
    pub fn add_suffix(&mut self, suffix: impl Into<String>) -> &mut Self {
        self.locator.add_suffix(suffix);
        self
    }

    /// Register a regex substitution rule, see [`crate::compiler::RuleTable::add_rule`]
    pub fn add_rule(&mut self, pattern: &str, replacement: &str) -> Result<&mut Self> {
        self.compiler.add_rule(pattern, replacement)?;
        Ok(self)
    }

    pub fn set_cache_ttl(&mut self, ttl: Option<Duration>) -> &mut Self {
        self.cache.set_ttl(ttl);
        self
    }

    pub fn set_expression_host(&mut self, host: impl ExpressionHost + 'static) -> &mut Self {
        self.host = Box::new(host);
        self
    }

    pub fn view_root(&self) -> &Path {
        self.locator.view_root()
    }

    pub fn cache_dir(&self) -> &Path {
        self.cache.cache_dir()
    }

    pub fn suffixes(&self) -> &[String] {
        self.locator.suffixes()
    }

    pub fn shared(&self) -> &Bindings {
        &self.shared
    }

    /// Start a render of `name` with per-call bindings
    pub fn make(&self, name: impl Into<String>) -> Rendering<'_> {
        Rendering {
            view: self,
            name: name.into(),
            bindings: Bindings::new(),
        }
    }

    /// Render `name` with `bindings` layered over the shared bindings
    pub fn render(&self, name: &str, bindings: &Bindings) -> Result<String> {
        let mut scope = self.shared.clone();
        scope.extend(bindings.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut runtime = SectionRuntime::new();
        self.execute(name, &scope, &mut runtime, 0)?;

        runtime
            .finish()
            .map_err(|e| VellumError::MalformedDirective {
                template: name.to_string(),
                message: e.to_string(),
                line: 0,
            })
    }

    /// Resolve `name` and make sure its artifact is current.
    ///
    /// Compiles and stores when the artifact is stale, otherwise loads it.
    pub fn compile(&self, name: &str) -> Result<CompiledTemplate> {
        let identity = self.locator.resolve(name)?;
        let key = self.cache.key_for(&identity.path);

        if !self.cache.is_stale(&identity.path, &key)? {
            log::trace!("cache hit for '{}'", name);
            let code = self.cache.load(&key)?;
            let artifact = self.cache.artifact_path(&key);
            return Ok(CompiledTemplate {
                identity,
                key,
                artifact,
                code,
                fresh: false,
            });
        }

        let source = std::fs::read_to_string(&identity.path).map_err(|e| {
            VellumError::TemplateReadError {
                path: identity.path.clone(),
                reason: e.to_string(),
            }
        })?;
        let code = self.compiler.compile(&source);
        let artifact = self.cache.store(&key, &code)?;
        log::debug!(
            "compiled '{}' from {} into {}",
            name,
            identity.path.display(),
            artifact.display()
        );

        Ok(CompiledTemplate {
            identity,
            key,
            artifact,
            code,
            fresh: true,
        })
    }

    /// Compile `name` if needed and run it into `runtime`
    fn execute(
        &self,
        name: &str,
        bindings: &Bindings,
        runtime: &mut SectionRuntime,
        depth: usize,
    ) -> Result<()> {
        let compiled = self.compile(name)?;
        let loader = NestedRender { view: self, depth };
        Interpreter::new(self.host.as_ref(), &loader, name).execute(
            &compiled.code,
            bindings,
            runtime,
        )
    }
}

/// Loader handed to the interpreter; tracks how deep the render chain is
struct NestedRender<'v> {
    view: &'v View,
    depth: usize,
}

impl TemplateLoader for NestedRender<'_> {
    fn render_into(
        &self,
        name: &str,
        bindings: &Bindings,
        runtime: &mut SectionRuntime,
    ) -> Result<()> {
        if self.depth >= MAX_RENDER_DEPTH {
            return Err(VellumError::RenderDepthExceeded {
                name: name.to_string(),
                limit: MAX_RENDER_DEPTH,
            });
        }
        self.view.execute(name, bindings, runtime, self.depth + 1)
    }
}

/// A pending render created by [`View::make`]
pub struct Rendering<'v> {
    view: &'v View,
    name: String,
    bindings: Bindings,
}

impl Rendering<'_> {
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.insert(key.into(), value.into());
        self
    }

    pub fn with_many(mut self, bindings: Bindings) -> Self {
        self.bindings.extend(bindings);
        self
    }

    pub fn render(self) -> Result<String> {
        self.view.render(&self.name, &self.bindings)
    }
}
