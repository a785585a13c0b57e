//! Error types for the qcsim_io crate.
//!
//! Every failure of the persistence layer is an [`IoError`]. Callers that
//! only need to branch on the broad category use [`IoError::kind`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for qcsim_io operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File system errors
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Persisted state that cannot be trusted.
    #[error("Corrupt state in {}: {reason}", path.display())]
    Corrupt {
        path: PathBuf,
        entity: Option<String>,
        cycle: Option<u64>,
        field: Option<String>,
        reason: String,
    },

    /// Another writer already published this cycle.
    #[error("Concurrent write conflict: {} already exists for cycle {cycle}", path.display())]
    ConcurrentWrite { path: PathBuf, cycle: u64 },

    /// The run directory is held by another run context.
    #[error("Run directory locked: {} is held by {holder}", path.display())]
    Locked { path: PathBuf, holder: String },

    /// Generic error with context
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

/// Broad error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    PersistenceMissing,
    PersistenceCorrupt,
    ConcurrentWriteConflict,
    Io,
}

/// Result type alias for qcsim_io operations.
pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    /// Creates a new serialization error.
    #[must_use]
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a new validation error.
    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a corrupt-state error with only a path and a reason.
    #[must_use]
    pub fn corrupt<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::Corrupt {
            path: path.into(),
            entity: None,
            cycle: None,
            field: None,
            reason: reason.into(),
        }
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::InvalidInput,
            Self::FileSystem(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ErrorKind::PersistenceMissing
            }
            Self::Json(_) | Self::Corrupt { .. } => ErrorKind::PersistenceCorrupt,
            Self::ConcurrentWrite { .. } | Self::Locked { .. } => {
                ErrorKind::ConcurrentWriteConflict
            }
            Self::Serialization(_) | Self::FileSystem(_) => ErrorKind::Io,
            Self::Context { source, .. } => source.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IoError::serialization("test error");
        assert_eq!(err.to_string(), "Serialization error: test error");
    }

    #[test]
    fn test_error_context_keeps_kind() {
        let err =
            IoError::corrupt("runs/a/panel_state.json", "bad cycle").with_context("opening run");
        assert!(err.to_string().contains("opening run"));
        assert_eq!(err.kind(), ErrorKind::PersistenceCorrupt);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: IoError = io_err.into();
        assert!(matches!(err, IoError::FileSystem(_)));
        assert_eq!(err.kind(), ErrorKind::PersistenceMissing);
    }

    #[test]
    fn test_conflict_kinds() {
        let err = IoError::ConcurrentWrite {
            path: PathBuf::from("civilization/cycle_3.json"),
            cycle: 3,
        };
        assert_eq!(err.kind(), ErrorKind::ConcurrentWriteConflict);
        assert!(err.to_string().contains("cycle 3"));
    }
}
