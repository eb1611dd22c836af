//! Error types for the EdgeX client

use thiserror::Error;

/// Core error type for EdgeX client operations
#[derive(Error, Debug)]
pub enum EdgexError {
    /// Service key not present in the catalogue
    #[error("Unknown service: {0}")]
    UnknownService(String),

    /// External program (pager or editor) could not be resolved
    #[error("Program not found: {program}")]
    ProgramNotFound { program: String },

    /// External program failed to start or exited unsuccessfully
    #[error("{program} failed: {reason}")]
    Subprocess { program: String, reason: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for EdgeX client operations
pub type Result<T> = std::result::Result<T, EdgexError>;

impl From<serde_json::Error> for EdgexError {
    fn from(err: serde_json::Error) -> Self {
        EdgexError::Serialization(err.to_string())
    }
}

impl EdgexError {
    /// Build a [`EdgexError::Subprocess`] from a program name and any displayable reason.
    pub fn subprocess(program: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        EdgexError::Subprocess {
            program: program.into(),
            reason: reason.to_string(),
        }
    }
}
