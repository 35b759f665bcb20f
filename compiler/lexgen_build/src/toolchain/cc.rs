//! C compiler invocation.
//!
//! Builds a shared library from one generated C file with a gcc/clang style
//! driver: `cc -shared -fPIC -O2 [flags] -o <module> <source>`.

use std::path::Path;
use std::process::Command;

pub struct CcCommand {
    cmd: Command,
}

impl CcCommand {
    pub fn new(program: &str) -> Self {
        let mut cmd = Command::new(program);
        cmd.args(["-shared", "-fPIC", "-O2"]);
        Self { cmd }
    }

    /// Append caller-supplied flags (include paths, warnings, sanitizers).
    pub fn add_flags<I, S>(&mut self, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for flag in flags {
            self.cmd.arg(flag.as_ref());
        }
    }

    pub fn set_output(&mut self, module: &Path) {
        self.cmd.arg("-o").arg(module);
    }

    pub fn add_source(&mut self, source: &Path) {
        self.cmd.arg(source);
    }

    pub fn finalize(self) -> Command {
        self.cmd
    }
}
