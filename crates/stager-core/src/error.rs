//! Unified error handling for Stager Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with operation context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Stager Core operations.
///
/// This enum wraps all possible errors that can occur when using stager-core,
/// providing a unified interface for error handling.
#[derive(Debug, Error, Clone)]
pub enum StagerError {
    /// Errors from the domain layer (invalid patterns, invalid plans).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (filesystem and archive failures).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },

    /// An error annotated with the operation that was running when it occurred.
    #[error("{operation}: {source}")]
    Context {
        operation: String,
        source: Box<StagerError>,
    },
}

impl StagerError {
    /// The innermost error, with every layer of operation context removed.
    pub fn root(&self) -> &StagerError {
        let mut current = self;
        while let Self::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Operation context layers, outermost first.
    pub fn operations(&self) -> Vec<&str> {
        let mut ops = Vec::new();
        let mut current = self;
        while let Self::Context { operation, source } = current {
            ops.push(operation.as_str());
            current = source;
        }
        ops
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Stager".into(),
                "Please report this issue at: https://github.com/cosecruz/stager/issues".into(),
            ],
            Self::Context { source, .. } => source.suggestions(),
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
            Self::Context { source, .. } => source.category(),
        }
    }

    /// Check if this error is retryable.
    ///
    /// Only per-entry I/O failures qualify: the caller may remediate (unlock a
    /// file, free disk space) and re-run the whole pattern.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.root(),
            Self::Application(ApplicationError::CopyFailure { .. })
                | Self::Application(ApplicationError::StoreLockError)
        )
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type StagerResult<T> = Result<T, StagerError>;

/// Extension trait for attaching operation context to errors.
pub trait Context<T> {
    /// Wrap the error with the name of the operation that failed.
    fn context(self, operation: impl Into<String>) -> StagerResult<T>;

    /// Lazily wrap the error; the closure only runs on failure.
    fn with_context<F, S>(self, f: F) -> StagerResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: Into<StagerError>,
{
    fn context(self, operation: impl Into<String>) -> StagerResult<T> {
        self.map_err(|e| StagerError::Context {
            operation: operation.into(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<F, S>(self, f: F) -> StagerResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| StagerError::Context {
            operation: f().into(),
            source: Box::new(e.into()),
        })
    }
}
