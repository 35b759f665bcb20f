//! External tools that turn a grammar into a loadable module.
//!
//! The build cache only talks to the [`Toolchain`] trait. [`SystemToolchain`]
//! drives the real `flex` and C compiler as subprocesses; tests substitute
//! their own implementation to observe how often the cache builds.

mod cc;
mod flex;

pub use cc::CcCommand;
pub use flex::FlexCommand;

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::{BuildConfig, BuildError};

/// Generator plus compiler.
pub trait Toolchain {
    /// Run the scanner generator on `grammar` inside `workdir`, producing the
    /// C source and header the grammar names.
    fn generate(&self, grammar: &Path, workdir: &Path) -> Result<(), BuildError>;

    /// Compile `c_source` into a shared library at `module`.
    fn compile(&self, c_source: &Path, module: &Path) -> Result<(), BuildError>;
}

/// Shared-library file extension for the host platform.
pub const fn module_extension() -> &'static str {
    if cfg!(target_os = "windows") {
        "dll"
    } else if cfg!(target_os = "macos") {
        "dylib"
    } else {
        "so"
    }
}

/// `flex` and a gcc-compatible C compiler found on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemToolchain {
    generator: String,
    compiler: String,
    c_flags: Vec<String>,
}

impl Default for SystemToolchain {
    fn default() -> Self {
        Self::new(&BuildConfig::from_env())
    }
}

impl SystemToolchain {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            generator: config.generator.clone(),
            compiler: config.compiler.clone(),
            c_flags: config.c_flags.clone(),
        }
    }

    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    /// Check which of the two programs can be launched.
    pub fn detect(&self) -> ToolchainDetection {
        let detection = ToolchainDetection {
            generator: is_available(&self.generator),
            compiler: is_available(&self.compiler),
        };
        tracing::debug!(
            generator = %self.generator,
            compiler = %self.compiler,
            ?detection,
            "detected toolchain"
        );
        detection
    }
}

impl Toolchain for SystemToolchain {
    fn generate(&self, grammar: &Path, workdir: &Path) -> Result<(), BuildError> {
        let mut flex = FlexCommand::new(&self.generator);
        flex.set_workdir(workdir);
        flex.set_grammar(grammar);
        run_tool(&self.generator, &flex.finalize())
    }

    fn compile(&self, c_source: &Path, module: &Path) -> Result<(), BuildError> {
        let mut cc = CcCommand::new(&self.compiler);
        cc.add_flags(&self.c_flags);
        cc.set_output(module);
        cc.add_source(c_source);
        run_tool(&self.compiler, &cc.finalize())
    }
}

/// Which toolchain programs are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolchainDetection {
    pub generator: bool,
    pub compiler: bool,
}

impl ToolchainDetection {
    /// Both programs are available, so scanners can be built.
    pub fn is_complete(self) -> bool {
        self.generator && self.compiler
    }
}

fn is_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// Run a finished command to completion.
///
/// `Command` cannot be cloned, so it is rebuilt from its parts; this also lets
/// the caller keep the original for error reporting.
fn run_tool(tool: &str, cmd: &Command) -> Result<(), BuildError> {
    let mut exec = Command::new(cmd.get_program());
    exec.args(cmd.get_args());
    if let Some(dir) = cmd.get_current_dir() {
        exec.current_dir(dir);
    }

    let command = render_command(cmd);
    tracing::debug!(%command, "running {tool}");

    let output = exec.output().map_err(|source| not_found_or_io(tool, cmd, source))?;
    check_output(tool, command, &output)
}

fn not_found_or_io(tool: &str, cmd: &Command, source: io::Error) -> BuildError {
    if source.kind() == io::ErrorKind::NotFound {
        BuildError::ToolNotFound {
            tool: tool.to_string(),
            source,
        }
    } else {
        BuildError::Io {
            path: cmd.get_program().into(),
            source,
        }
    }
}

fn check_output(tool: &str, command: String, output: &Output) -> Result<(), BuildError> {
    if output.status.success() {
        return Ok(());
    }
    Err(BuildError::ToolFailed {
        tool: tool.to_string(),
        exit_code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        command,
    })
}

fn render_command(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}
