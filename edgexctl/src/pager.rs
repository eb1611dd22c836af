//! Output paging
//!
//! [`PagerWriter`] is the sink every command writes its output to. It either
//! passes bytes straight through to the target stream or pipes them into an
//! external pager such as `less`, which then owns the terminal until the
//! user quits it.
//!
//! The writer must be closed once the command is done. Closing flushes,
//! closes the pager's stdin so it sees end-of-input, and waits for the pager
//! to exit. Dropping an unclosed writer does the same.

use crate::program::Program;
use edgex_core::{EdgexError, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::{Child, ChildStdin, Stdio};
use tracing::debug;

/// Environment variable naming the pager, checked before `PAGER`.
pub const PAGER_ENV: &str = "EDGEX_PAGER";

#[cfg(windows)]
const DEFAULT_PAGER: &str = "more";
#[cfg(not(windows))]
const DEFAULT_PAGER: &str = "less -FRX";

/// Where output ends up, with or without a pager in between
#[derive(Debug, Default)]
pub enum OutputTarget {
    /// The process's standard output
    #[default]
    Stdout,
    /// An open file
    File(File),
}

impl OutputTarget {
    fn into_stdio(self) -> Stdio {
        match self {
            OutputTarget::Stdout => Stdio::inherit(),
            OutputTarget::File(file) => Stdio::from(file),
        }
    }

    fn into_writer(self) -> Box<dyn Write + Send> {
        match self {
            OutputTarget::Stdout => Box::new(io::stdout()),
            OutputTarget::File(file) => Box::new(file),
        }
    }
}

/// Pager settings
#[derive(Debug, Default)]
pub struct PagerConfig {
    /// Output destination
    pub target: OutputTarget,
    /// Pager command line; `None` selects the platform default
    pub program: Option<String>,
    /// Write straight to the target
    pub no_pager: bool,
}

impl PagerConfig {
    /// Pager configuration for standard output, with the program taken from
    /// `EDGEX_PAGER` or `PAGER`.
    pub fn from_env(no_pager: bool) -> Self {
        let program = [PAGER_ENV, "PAGER"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty());

        Self {
            target: OutputTarget::Stdout,
            program,
            no_pager,
        }
    }

    /// The pager command line that will be run
    pub fn command_line(&self) -> &str {
        self.program.as_deref().unwrap_or(DEFAULT_PAGER)
    }
}

enum Sink {
    Direct(Box<dyn Write + Send>),
    Paged {
        program: String,
        child: Child,
        /// Taken on close; dropping it signals end-of-input
        stdin: Option<BufWriter<ChildStdin>>,
    },
}

/// Writer that optionally forwards into an external pager
pub struct PagerWriter {
    sink: Sink,
    closed: bool,
}

impl std::fmt::Debug for PagerWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerWriter")
            .field("paged", &self.is_paged())
            .field("closed", &self.closed)
            .finish()
    }
}

impl PagerWriter {
    /// Create the writer described by `config`.
    ///
    /// With `no_pager` set this never spawns anything. Otherwise the pager is
    /// started with the target as its standard output and the parent's
    /// standard error.
    ///
    /// # Errors
    ///
    /// - [`EdgexError::ProgramNotFound`] if the pager cannot be located
    /// - [`EdgexError::Subprocess`] if it cannot be started
    ///
    /// Callers are expected to fall back to [`PagerWriter::direct`].
    pub fn new(config: PagerConfig) -> Result<Self> {
        if config.no_pager {
            return Ok(Self::direct(config.target));
        }

        let program = Program::resolve(config.command_line())?;
        debug!(pager = %program.path.display(), args = ?program.args, "starting pager");

        let mut child = program
            .command()
            .stdin(Stdio::piped())
            .stdout(config.target.into_stdio())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| EdgexError::subprocess(program.name.as_str(), e))?;

        let Some(stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(EdgexError::subprocess(program.name, "stdin was not captured"));
        };

        Ok(Self {
            sink: Sink::Paged {
                program: program.name,
                child,
                stdin: Some(BufWriter::new(stdin)),
            },
            closed: false,
        })
    }

    /// Pass-through writer over `target`
    pub fn direct(target: OutputTarget) -> Self {
        Self {
            sink: Sink::Direct(target.into_writer()),
            closed: false,
        }
    }

    /// Whether output goes through a pager subprocess
    pub fn is_paged(&self) -> bool {
        matches!(self.sink, Sink::Paged { .. })
    }

    /// Flush, signal end-of-input and wait for the pager to exit.
    ///
    /// Only the first call has any effect. A pager that was quit before all
    /// output was consumed is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`EdgexError::Io`] if flushing fails and
    /// [`EdgexError::Subprocess`] if the pager exits unsuccessfully.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match &mut self.sink {
            Sink::Direct(writer) => Ok(writer.flush()?),
            Sink::Paged {
                program,
                child,
                stdin,
            } => {
                let flushed = match stdin.take() {
                    Some(mut pipe) => pipe.flush(),
                    None => Ok(()),
                };

                let status = child
                    .wait()
                    .map_err(|e| EdgexError::subprocess(program.as_str(), e))?;
                debug!(pager = %program, %status, "pager exited");

                match flushed {
                    Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
                    _ => {}
                }

                if !status.success() {
                    return Err(EdgexError::subprocess(program.as_str(), status));
                }
                Ok(())
            }
        }
    }

    fn closed_error() -> io::Error {
        io::Error::new(io::ErrorKind::BrokenPipe, "pager writer is closed")
    }
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(Self::closed_error());
        }
        match &mut self.sink {
            Sink::Direct(writer) => writer.write(buf),
            Sink::Paged {
                stdin: Some(pipe), ..
            } => pipe.write(buf),
            Sink::Paged { stdin: None, .. } => Err(Self::closed_error()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        match &mut self.sink {
            Sink::Direct(writer) => writer.flush(),
            Sink::Paged {
                stdin: Some(pipe), ..
            } => pipe.flush(),
            Sink::Paged { stdin: None, .. } => Ok(()),
        }
    }
}

impl Drop for PagerWriter {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            debug!("closing pager on drop failed: {}", err);
        }
    }
}
