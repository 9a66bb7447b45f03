//! Unified error handling for railgen core.
//!
//! Wraps domain and application errors behind one type so the CLI can
//! categorise, explain and map them to exit codes in one place.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for railgen core operations.
#[derive(Debug, Error, Clone)]
pub enum RailgenError {
    /// Errors from the domain layer (validation, template integrity).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs, panics).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl RailgenError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {message}"),
                "Run `railgen config path` to locate the configuration file".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in railgen".into()],
        }
    }

    /// Get error category for display and exit-code purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Pre-mutation failures never need a rollback.
    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Interrupted,
    Internal,
}

impl ErrorCategory {
    /// Process exit code for a failure in this category.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation | Self::NotFound => 2,
            Self::Configuration => 4,
            Self::Interrupted => 0,
            Self::Internal => 1,
        }
    }
}

/// Convenient result type alias.
pub type RailgenResult<T> = Result<T, RailgenError>;

/// Extension trait for adding context to foreign errors.
pub trait Context<T> {
    fn context(self, msg: impl Into<String>) -> RailgenResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> RailgenResult<T> {
        self.map_err(|e| RailgenError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_usage_exit_code() {
        let err: RailgenError = DomainError::InvalidProjectName {
            name: "X".into(),
            reason: "uppercase".into(),
        }
        .into();
        assert!(err.is_validation());
        assert_eq!(err.category().exit_code(), 2);
    }

    #[test]
    fn generation_failures_are_internal() {
        let err: RailgenError = ApplicationError::GenerationFailed {
            step: "backend".into(),
            reason: "disk full".into(),
        }
        .into();
        assert!(!err.is_validation());
        assert_eq!(err.category().exit_code(), 1);
        assert_eq!(err.to_string(), "Generation step 'backend' failed: disk full");
    }

    #[test]
    fn context_wraps_foreign_errors() {
        let res: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let err = res.context("reading config").unwrap_err();
        assert!(err.to_string().contains("reading config: boom"));
    }
}
