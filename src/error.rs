//! Error types for loading index maintenance options.
//!
//! The options model itself never fails: illegal candidates are absorbed by
//! its setters. Errors only arise in the collaborators that feed it, such as
//! reading a file, parsing JSON, or parsing environment variables.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading options from an external source.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Options file could not be read or written
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Options document is not valid JSON
    #[error("Invalid options document: {0}")]
    Parse(#[from] serde_json::Error),
}

impl OptionsError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get a user-friendly suggestion for how to fix this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Config(_) => Some("Check the IDXMGR_* environment variables"),
            Self::Io { .. } => Some("Check that the options file exists and is readable"),
            Self::Parse(_) => Some("Check the options file for JSON syntax errors"),
        }
    }
}
