// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (for retry logic)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Pattern Errors
    // ========================================================================
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // ========================================================================
    // Plan Errors
    // ========================================================================
    #[error("Invalid assembly plan: {0}")]
    InvalidPlan(String),

    #[error("Duplicate module in assembly plan: {name}")]
    DuplicateModule { name: String },

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidPattern { pattern, reason } => vec![
                format!("Pattern '{}' could not be parsed: {}", pattern, reason),
                "Patterns use shell-style wildcards: *, ? and [abc]".into(),
                "Close every '[' character class with ']'".into(),
                "End a pattern with '/' to copy a directory's contents".into(),
            ],
            Self::InvalidPlan(msg) => vec![
                "Check your assembly plan".into(),
                format!("Details: {}", msg),
            ],
            Self::DuplicateModule { name } => vec![
                format!("Module '{}' is listed more than once", name),
                "Give every module a unique name".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidPattern { .. }
            | Self::InvalidPlan(_)
            | Self::DuplicateModule { .. }
            | Self::MissingRequiredField { .. } => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Internal,
}
