//! Declarative tokenizers compiled to native scanners.
//!
//! A tokenizer is a list of named patterns. [`compile`] validates the list,
//! renders it as a flex grammar, builds the grammar into a shared library
//! (once per distinct list; later calls reuse the cached module) and loads
//! it. The resulting [`Scanner`] turns strings or files into lazy streams of
//! `(kind, text)` tokens.
//!
//! ```no_run
//! use lexgen::PatternSpec;
//!
//! # fn main() -> Result<(), lexgen::Error> {
//! let scanner = lexgen::compile(&[
//!     PatternSpec::emitting("token", r"[^\s]+"),
//!     PatternSpec::emitting("line_end", r"[\r\n]"),
//! ])?;
//! for token in scanner.scan_string("This is a line.\n")? {
//!     let token = token?;
//!     println!("{} {:?}", token.kind, token.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Patterns use flex syntax, plus `(?P<name>...)` groups whose matches are
//! emitted as tokens of their own (see [`lexgen_rules::compile`]) and the
//! shorthand classes `\s \d \w` and their negations.
//!
//! The crates behind the facade can be used on their own:
//! [`lexgen_rules`] (pattern compiler), [`lexgen_emit`] (grammar text),
//! [`lexgen_build`] (build cache), [`lexgen_rt`] (module loading and token
//! streams).

mod error;
pub mod rule_file;
mod session;
pub mod whitespace;

use std::sync::Once;

pub use error::Error;
pub use rule_file::RuleFile;
pub use session::{Lexgen, Scanner};

pub use lexgen_build::{BuildArtifact, BuildCache, BuildConfig, SystemToolchain, Toolchain};
pub use lexgen_rt::{FileMode, ScannerModule, Token, TokenStream};
pub use lexgen_rules::{CompileOptions, ContentHash, PatternSpec, RuleSet};

pub use lexgen_build;
pub use lexgen_emit;
pub use lexgen_rt;
pub use lexgen_rules;

/// Compile, build and load a scanner with the environment's defaults.
///
/// Opens a fresh [`Lexgen`] each call; keep one around to share loaded
/// modules between scanners.
pub fn compile(specs: &[PatternSpec]) -> Result<Scanner, Error> {
    Lexgen::new()?.compile(specs)
}

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, or on any call after the first.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

/// Like [`init_tracing`], but renders spans as an indented tree.
pub fn init_tracing_tree() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
