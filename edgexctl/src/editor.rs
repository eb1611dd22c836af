//! Interactive input through the user's editor
//!
//! [`capture_input_from_editor`] writes a template to a temporary file, runs
//! the editor on it in the foreground and returns whatever the user saved.
//! The temporary file is removed on every path out of the function.

use crate::program::Program;
use edgex_core::{EdgexError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the editor
pub const EDITOR_ENV: &str = "EDITOR";

#[cfg(windows)]
const DEFAULT_EDITOR: &str = "notepad";
#[cfg(not(windows))]
const DEFAULT_EDITOR: &str = "vi";

/// Editor settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Editor command line, e.g. `vim` or `code --wait`
    pub command: String,
    /// Suffix of the temporary file, lets editors pick a syntax mode
    pub suffix: String,
    /// Directory for the temporary file; the platform temp dir if unset
    pub temp_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EDITOR)
    }
}

impl EditorConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            suffix: ".json".to_string(),
            temp_dir: None,
        }
    }

    /// Editor taken from `EDITOR`, falling back to the platform default
    pub fn from_env() -> Self {
        match std::env::var(EDITOR_ENV) {
            Ok(command) if !command.trim().is_empty() => Self::new(command),
            _ => Self::default(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

/// Open `path` in the configured editor and wait for it to exit.
///
/// The editor shares the terminal's standard streams.
///
/// # Errors
///
/// - [`EdgexError::ProgramNotFound`] if the editor cannot be located
/// - [`EdgexError::Subprocess`] if it cannot be started or exits unsuccessfully
pub fn open_file_in_editor(config: &EditorConfig, path: &Path) -> Result<()> {
    let editor = Program::resolve(&config.command)?;
    run_editor(&editor, path)
}

fn run_editor(editor: &Program, path: &Path) -> Result<()> {
    debug!(editor = %editor.path.display(), file = %path.display(), "opening editor");

    let status = editor
        .command()
        .arg(path)
        .status()
        .map_err(|e| EdgexError::subprocess(editor.name.as_str(), e))?;

    if !status.success() {
        return Err(EdgexError::subprocess(editor.name.as_str(), status));
    }
    Ok(())
}

/// Let the user edit `template` and return the saved bytes.
///
/// The result is exactly what the file holds when the editor exits: the
/// template itself if nothing was changed, an empty vector if everything was
/// deleted.
///
/// # Errors
///
/// - [`EdgexError::ProgramNotFound`] if the editor cannot be located; no
///   temporary file is created in that case
/// - [`EdgexError::Io`] if the temporary file cannot be created, written or
///   read back
/// - [`EdgexError::Subprocess`] if the editor cannot be started or exits
///   unsuccessfully
pub fn capture_input_from_editor(config: &EditorConfig, template: &[u8]) -> Result<Vec<u8>> {
    let editor = Program::resolve(&config.command)?;

    let mut builder = tempfile::Builder::new();
    builder.prefix("edgexctl-").suffix(&config.suffix);
    let mut file = match &config.temp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };

    file.write_all(template)?;
    file.flush()?;

    // Close our handle so the editor has the file to itself; the path guard
    // still removes it when dropped.
    let path = file.into_temp_path();

    run_editor(&editor, &path)?;
    let bytes = std::fs::read(&path)?;

    let file = path.display().to_string();
    if let Err(err) = path.close() {
        warn!(file = %file, error = %err, "failed to remove temporary file");
    }

    Ok(bytes)
}
