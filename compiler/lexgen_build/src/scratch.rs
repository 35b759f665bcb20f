//! Scratch directory resolution.
//!
//! Candidates, first match wins:
//!
//! 1. the configured directory
//! 2. `LEXGEN_SCRATCH_DIR`
//! 3. `lexgen-scratch` next to the running executable, if that directory is
//!    writable
//! 4. `lexgen-scratch` under the system temp directory
//!
//! Explicit choices (1 and 2) are created if missing and reported as errors if
//! that fails; the implicit ones fall through.
//!
//! The result is always absolute: flex runs with the scratch directory as its
//! working directory and is handed paths inside it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{non_empty_var, SCRATCH_DIR_ENV};
use crate::BuildError;

const DIR_NAME: &str = "lexgen-scratch";

pub(crate) fn resolve(configured: Option<&Path>) -> Result<PathBuf, BuildError> {
    let dir = if let Some(dir) = configured {
        create(dir.to_path_buf())?
    } else if let Some(dir) = non_empty_var(SCRATCH_DIR_ENV) {
        create(PathBuf::from(dir))?
    } else if let Some(dir) = beside_executable() {
        dir
    } else {
        create(std::env::temp_dir().join(DIR_NAME))?
    };
    std::path::absolute(&dir).map_err(BuildError::io(&dir))
}

fn create(dir: PathBuf) -> Result<PathBuf, BuildError> {
    fs::create_dir_all(&dir).map_err(BuildError::io(&dir))?;
    Ok(dir)
}

fn beside_executable() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?.join(DIR_NAME);
    if fs::create_dir_all(&dir).is_err() || !is_writable(&dir) {
        tracing::debug!(dir = %dir.display(), "executable directory not writable");
        return None;
    }
    Some(dir)
}

/// Probe by creating and removing a file.
fn is_writable(dir: &Path) -> bool {
    let probe = dir.join(format!(".probe-{}", std::process::id()));
    match fs::File::create(&probe) {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}
