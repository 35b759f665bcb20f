//! Build configuration.

use std::path::PathBuf;

/// Environment variable overriding the scratch directory.
pub const SCRATCH_DIR_ENV: &str = "LEXGEN_SCRATCH_DIR";
/// Environment variable overriding the scanner generator program.
pub const FLEX_ENV: &str = "LEXGEN_FLEX";
/// Environment variable overriding the C compiler program.
pub const CC_ENV: &str = "LEXGEN_CC";

/// Configuration for the build cache and the system toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Scratch directory; resolved from the environment when `None`.
    pub scratch_dir: Option<PathBuf>,
    /// Scanner generator program.
    pub generator: String,
    /// C compiler program.
    pub compiler: String,
    /// Flags appended to the compiler command line.
    pub c_flags: Vec<String>,
    /// Version recorded in the scratch directory; artifacts from another
    /// version are discarded when the cache opens.
    pub version: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            generator: "flex".to_string(),
            compiler: "cc".to_string(),
            c_flags: Vec::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl BuildConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with `LEXGEN_FLEX` and `LEXGEN_CC` applied.
    ///
    /// `LEXGEN_SCRATCH_DIR` is read later, when the cache opens, so an
    /// explicit [`with_scratch_dir`](Self::with_scratch_dir) still wins.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(program) = non_empty_var(FLEX_ENV) {
            config.generator = program;
        }
        if let Some(program) = non_empty_var(CC_ENV) {
            config.compiler = program;
        }
        config
    }

    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_generator(mut self, program: impl Into<String>) -> Self {
        self.generator = program.into();
        self
    }

    #[must_use]
    pub fn with_compiler(mut self, program: impl Into<String>) -> Self {
        self.compiler = program.into();
        self
    }

    #[must_use]
    pub fn with_c_flag(mut self, flag: impl Into<String>) -> Self {
        self.c_flags.push(flag.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
