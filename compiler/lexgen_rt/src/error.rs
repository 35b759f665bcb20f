//! Runtime errors.

use std::io;
use std::path::PathBuf;
use std::str::Utf8Error;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The module file could not be opened as a shared library.
    #[error("failed to load scanner module '{}': {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    /// The module lacks one of the scanner entry points.
    #[error("scanner module does not export `{symbol}`: {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },
    /// The module could not allocate a scanner session.
    #[error("could not start a scanner session over {input}")]
    Init { input: &'static str },
    /// A token's kind or text is not valid UTF-8.
    #[error("token {what} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        what: &'static str,
        #[source]
        source: Utf8Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}
