//! Resolution of external programs (pager, editor)

use edgex_core::{EdgexError, Result};
use std::path::PathBuf;
use std::process::Command;

/// An external program located on the search path, with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Name as configured, used in error messages
    pub name: String,
    /// Resolved executable
    pub path: PathBuf,
    /// Arguments given after the program name
    pub args: Vec<String>,
}

impl Program {
    /// Resolve a command line such as `less -FRX` or `code --wait`.
    ///
    /// The line is split on whitespace; the first word is looked up on
    /// `PATH` (or used as is when it contains a path separator).
    ///
    /// # Errors
    ///
    /// Returns [`EdgexError::ProgramNotFound`] if the line is blank or the
    /// program cannot be located.
    pub fn resolve(command_line: &str) -> Result<Self> {
        let mut words = command_line.split_whitespace();
        let name = words.next().ok_or_else(|| EdgexError::ProgramNotFound {
            program: command_line.to_string(),
        })?;

        let path = which::which(name).map_err(|_| EdgexError::ProgramNotFound {
            program: name.to_string(),
        })?;

        Ok(Self {
            name: name.to_string(),
            path,
            args: words.map(str::to_string).collect(),
        })
    }

    /// A [`Command`] for the executable with the configured arguments applied.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.path);
        command.args(&self.args);
        command
    }
}
