//! Build errors.

use std::io;
use std::path::PathBuf;

/// Failure of one build attempt.
///
/// A failed attempt registers nothing in the cache; the next call for the same
/// rule set starts over.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The generator or compiler executable could not be launched.
    #[error("{tool} not found: {source}")]
    ToolNotFound {
        tool: String,
        #[source]
        source: io::Error,
    },
    /// A tool ran and exited unsuccessfully.
    #[error("{}", tool_failed_message(tool, *exit_code, stderr, command))]
    ToolFailed {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
        command: String,
    },
    /// Reading or writing a scratch file failed.
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

fn tool_failed_message(
    tool: &str,
    exit_code: Option<i32>,
    stderr: &str,
    command: &str,
) -> String {
    let mut message = format!("{tool} failed");
    if let Some(code) = exit_code {
        message.push_str(&format!(" (exit code {code})"));
    }
    if !stderr.is_empty() {
        message.push_str(&format!("\n\n{tool} stderr:\n{stderr}"));
    }
    message.push_str(&format!("\n\nCommand: {command}"));
    message
}
