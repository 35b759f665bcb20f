//! Compile, build and load in one place.

use std::path::Path;
use std::sync::Arc;

use lexgen_build::{BuildArtifact, BuildCache, BuildConfig, SystemToolchain, Toolchain};
use lexgen_rt::{ScannerModule, TokenStream};
use lexgen_rules::{CompileOptions, ContentHash, PatternCompiler, PatternSpec, RuleSet};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::Error;

/// A build cache, a toolchain, and the modules already loaded from them.
///
/// Loading is keyed by content hash, so compiling an equal pattern list
/// twice yields scanners sharing one module.
pub struct Lexgen {
    compiler: PatternCompiler,
    cache: BuildCache,
    toolchain: Box<dyn Toolchain + Send + Sync>,
    modules: Mutex<FxHashMap<ContentHash, Arc<ScannerModule>>>,
}

impl std::fmt::Debug for Lexgen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexgen")
            .field("compiler", &self.compiler)
            .field("cache", &self.cache)
            .field("loaded", &self.modules.lock().len())
            .finish_non_exhaustive()
    }
}

impl Lexgen {
    /// Environment-configured cache and the system toolchain.
    pub fn new() -> Result<Self, Error> {
        Self::with_config(BuildConfig::from_env())
    }

    pub fn with_config(config: BuildConfig) -> Result<Self, Error> {
        let toolchain = SystemToolchain::new(&config);
        Self::with_toolchain(config, toolchain)
    }

    pub fn with_toolchain(
        config: BuildConfig,
        toolchain: impl Toolchain + Send + Sync + 'static,
    ) -> Result<Self, Error> {
        Ok(Self {
            compiler: PatternCompiler::default(),
            cache: BuildCache::open(config)?,
            toolchain: Box::new(toolchain),
            modules: Mutex::new(FxHashMap::default()),
        })
    }

    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.compiler = PatternCompiler::new(options);
        self
    }

    pub fn cache(&self) -> &BuildCache {
        &self.cache
    }

    /// Validate and compile a pattern list without building anything.
    pub fn rule_set(&self, specs: &[PatternSpec]) -> Result<RuleSet, Error> {
        Ok(self.compiler.compile(specs)?)
    }

    /// Build (or find) the module for `rules` without loading it.
    pub fn artifact(&self, rules: &RuleSet) -> Result<BuildArtifact, Error> {
        Ok(self.cache.get_or_build(rules, self.toolchain.as_ref())?)
    }

    /// Compile, build and load a scanner for `specs`.
    #[tracing::instrument(level = "debug", skip_all, fields(rules = specs.len()))]
    pub fn compile(&self, specs: &[PatternSpec]) -> Result<Scanner, Error> {
        let rules = self.rule_set(specs)?;
        self.load(rules)
    }

    /// Build and load a scanner for an already compiled rule set.
    pub fn load(&self, rules: RuleSet) -> Result<Scanner, Error> {
        let hash = rules.content_hash();
        if let Some(module) = self.modules.lock().get(&hash) {
            tracing::debug!(%hash, "module already loaded");
            return Ok(Scanner::new(rules, Arc::clone(module)));
        }

        let artifact = self.artifact(&rules)?;
        let module = ScannerModule::load(&artifact)?;
        let module = Arc::clone(self.modules.lock().entry(hash).or_insert(module));
        Ok(Scanner::new(rules, module))
    }
}

/// A loaded tokenizer: the rule set it was built from and its module.
///
/// Cheap to clone; every scan opens an independent session.
#[derive(Debug, Clone)]
pub struct Scanner {
    rules: Arc<RuleSet>,
    module: Arc<ScannerModule>,
}

impl Scanner {
    fn new(rules: RuleSet, module: Arc<ScannerModule>) -> Self {
        Self {
            rules: Arc::new(rules),
            module,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn module(&self) -> &Arc<ScannerModule> {
        &self.module
    }

    /// Token kinds this scanner can produce, in rule order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.rules.emitting_names().iter().map(|name| name.as_str())
    }

    pub fn scan_string(&self, input: impl AsRef<[u8]>) -> Result<TokenStream, Error> {
        Ok(self.module.scan_string(input)?)
    }

    #[cfg(unix)]
    pub fn scan_file(
        &self,
        file: &impl std::os::fd::AsFd,
        mode: lexgen_rt::FileMode,
    ) -> Result<TokenStream, Error> {
        Ok(self.module.scan_file(file, mode)?)
    }

    pub fn scan_path(&self, path: impl AsRef<Path>) -> Result<TokenStream, Error> {
        Ok(self.module.scan_path(path)?)
    }
}
