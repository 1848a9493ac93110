//! Error types for EvaEdit
//!
//! Editing itself never fails: out-of-range offsets are clamped and empty
//! edits are dropped. These errors cover the places where real I/O happens
//! (configuration files, paged storage side files).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for EvaEdit
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Chunk {index} error: {message}")]
    Chunk { index: usize, message: String },

    #[error("Not found: {0}")]
    NotFound(PathBuf),
}

/// Result type alias for EvaEdit operations
pub type Result<T> = std::result::Result<T, EditorError>;

impl EditorError {
    /// Check if this error is recoverable
    ///
    /// Chunk failures degrade a paged buffer but never end the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EditorError::Chunk { .. })
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            EditorError::Io(e) => format!("File operation failed: {}", e),
            EditorError::Config(msg) => format!("Configuration error: {}", msg),
            EditorError::Chunk { index, message } => {
                format!("Part {} of the document could not be read: {}", index, message)
            }
            EditorError::NotFound(path) => format!("Not found: {}", path.display()),
            _ => self.to_string(),
        }
    }
}
