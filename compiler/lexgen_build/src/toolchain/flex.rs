//! Scanner generator invocation.

use std::path::Path;
use std::process::Command;

/// A `flex` command line.
///
/// The grammar names its own output files, relative to the working directory,
/// so the command only needs the grammar path and where to run.
pub struct FlexCommand {
    cmd: Command,
}

impl FlexCommand {
    pub fn new(program: &str) -> Self {
        Self {
            cmd: Command::new(program),
        }
    }

    /// Directory the generated `.c` and `.h` files land in.
    pub fn set_workdir(&mut self, dir: &Path) {
        self.cmd.current_dir(dir);
    }

    pub fn set_grammar(&mut self, grammar: &Path) {
        self.cmd.arg(grammar);
    }

    pub fn finalize(self) -> Command {
        self.cmd
    }
}
