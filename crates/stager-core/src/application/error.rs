//! Application layer errors.
//!
//! These errors represent failures while touching the outside world:
//! missing sources, conflicting targets, failed copies, failed archives.
//! Pattern and plan errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during projection and archiving.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// A referenced source path does not exist.
    #[error("Source not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// A directory was required but the source is something else
    /// (only raised under the strict source policy).
    #[error("Source is not a directory: {path}")]
    SourceNotDirectory { path: PathBuf },

    /// The destination conflicts with an existing non-directory, or cannot
    /// be written.
    #[error("Invalid target {path}: {reason}")]
    InvalidTarget { path: PathBuf, reason: String },

    /// Copying one entry failed.
    #[error("Failed to copy {from} to {to}: {reason}")]
    CopyFailure {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },

    /// The archive file could not be created or written.
    #[error("Failed to create archive {path}: {reason}")]
    ArchiveCreation { path: PathBuf, reason: String },

    /// Any other filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    /// In-memory adapter state was poisoned.
    #[error("Filesystem state lock poisoned")]
    StoreLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::SourceNotFound { path } => vec![
                format!("Nothing exists at: {}", path.display()),
                "Build the module before assembling it".into(),
                "Check the module path in your plan".into(),
            ],
            Self::SourceNotDirectory { path } => vec![
                format!("Expected a directory: {}", path.display()),
                "Set engine.source_policy = \"lenient\" to accept single files".into(),
            ],
            Self::InvalidTarget { path, .. } => vec![
                format!("Cannot write to: {}", path.display()),
                "A file may occupy a path where a directory is needed".into(),
                "Check that you have write permissions".into(),
            ],
            Self::CopyFailure { from, .. } => vec![
                format!("Copy failed for: {}", from.display()),
                "The file may be locked by another process".into(),
                "Re-run the step once the file is accessible".into(),
            ],
            Self::ArchiveCreation { path, .. } => vec![
                format!("Archive destination: {}", path.display()),
                "Ensure the parent directory exists and is writable".into(),
                "The destination must not be a directory".into(),
            ],
            Self::StoreLockError => vec![
                "The filesystem state is locked".into(),
                "Try again in a moment".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceNotFound { .. } => ErrorCategory::NotFound,
            Self::SourceNotDirectory { .. } | Self::InvalidTarget { .. } => {
                ErrorCategory::Validation
            }
            Self::CopyFailure { .. }
            | Self::ArchiveCreation { .. }
            | Self::Filesystem { .. }
            | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}
