//! Error types for dirsync

use std::path::PathBuf;
use thiserror::Error;

/// Error types for dirsync operations
#[derive(Debug, Error)]
pub enum DirsyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory listing failed
    #[error("Traversal error: {0}")]
    Walk(#[from] ignore::Error),

    /// JSON encoding or decoding failed outside a config file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// One or more preconditions failed before any I/O was attempted
    #[error("Precondition failed: {}", .0.join("; "))]
    Precondition(Vec<String>),

    /// Requested mode exists on the command line but is not implemented
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// A config file exists but cannot be parsed
    #[error("Config file {path} is malformed: {source}")]
    CorruptConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A glob pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Two participating roots carry the same identity
    #[error(
        "Roots {first} and {second} share identity {identity}; one is probably a copy of the other. \
         Remove its dirsync.config.json and retry."
    )]
    DuplicateIdentity {
        identity: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Copying a file or creating a folder failed
    #[error("Copy failed for {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DirsyncError {
    /// Check if this error was raised before any filesystem mutation
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            DirsyncError::Precondition(_)
                | DirsyncError::Unsupported(_)
                | DirsyncError::CorruptConfig { .. }
                | DirsyncError::Pattern { .. }
                | DirsyncError::DuplicateIdentity { .. }
        )
    }

    /// Check if the run can continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DirsyncError::Copy { .. })
    }
}
