//! Build cache for lexgen scanners.
//!
//! Turns a [`RuleSet`](lexgen_rules::RuleSet) into a loadable native module:
//! the grammar is rendered, handed to the scanner generator and the C
//! compiler through a [`Toolchain`], and the resulting library is stored in a
//! scratch directory under the rule set's content hash. Asking again for an
//! equal rule set, from this process or any other sharing the directory,
//! returns the stored module without running any tool.
//!
//! ```no_run
//! use lexgen_build::{BuildCache, BuildConfig, SystemToolchain};
//! use lexgen_rules::{compile, PatternSpec};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rules = compile(&[PatternSpec::emitting("word", "[a-z]+")])?;
//! let config = BuildConfig::from_env();
//! let toolchain = SystemToolchain::new(&config);
//! let cache = BuildCache::open(config)?;
//! let artifact = cache.get_or_build(&rules, &toolchain)?;
//! println!("{}", artifact.module_path().display());
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod error;
mod inflight;
mod scratch;
pub mod toolchain;

pub use cache::{BuildArtifact, BuildCache, SourcePaths};
pub use config::{BuildConfig, CC_ENV, FLEX_ENV, SCRATCH_DIR_ENV};
pub use error::BuildError;
pub use toolchain::{module_extension, SystemToolchain, Toolchain, ToolchainDetection};
