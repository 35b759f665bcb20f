use std::io;
use std::path::PathBuf;

use lexgen_build::BuildError;
use lexgen_rt::RuntimeError;
use lexgen_rules::ValidationError;

/// Any failure between a pattern list and its tokens.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("invalid rule file '{}': {source}", path.display())]
    RuleFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
