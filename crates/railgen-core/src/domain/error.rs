// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (collected into aggregate validation reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("Invalid {field}: {value}. Expected {expected}")]
    InvalidField {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    /// Several independent violations, reported together.
    #[error("{}", render_violations(.0))]
    ValidationFailed(Vec<DomainError>),

    // ========================================================================
    // Template integrity
    // ========================================================================
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Template set '{component}' has no files")]
    EmptyTemplate { component: String },

    #[error("Duplicate path in template: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    // ========================================================================
    // Run lifecycle
    // ========================================================================
    #[error("Invalid run state transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

fn render_violations(errors: &[DomainError]) -> String {
    let mut out = String::from("Invalid command-line options:");
    for e in errors {
        out.push_str("\n  - ");
        out.push_str(&e.to_string());
    }
    out
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidField { field, expected, .. } => vec![
                format!("Provide a {field} in {expected}"),
                "Use --help for more information about available options".into(),
            ],
            Self::InvalidProjectName { .. } => vec![
                "Project names may only contain lowercase letters, numbers, and hyphens".into(),
                "Examples: my-app, shop2, rails-react-demo".into(),
            ],
            Self::ValidationFailed(errors) => {
                let mut out: Vec<String> = Vec::new();
                for e in errors {
                    for s in e.suggestions() {
                        if !out.contains(&s) {
                            out.push(s);
                        }
                    }
                }
                out
            }
            Self::EmptyTemplate { component } => vec![
                format!("Built-in template set '{component}' is corrupted"),
                "Please report this issue".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidField { .. }
            | Self::InvalidProjectName { .. }
            | Self::ValidationFailed(_) => ErrorCategory::Validation,
            _ => ErrorCategory::Internal,
        }
    }

    /// Collapse a list of violations: none is `Ok`, one stays as-is.
    pub fn collect(mut errors: Vec<DomainError>) -> Result<(), DomainError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::ValidationFailed(errors)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bad_db() -> DomainError {
        DomainError::InvalidField {
            field: "database",
            value: "mysql".into(),
            expected: "'postgresql' or 'sqlite'",
        }
    }

    #[test]
    fn collect_empty_is_ok() {
        assert!(DomainError::collect(vec![]).is_ok());
    }

    #[test]
    fn collect_single_is_unwrapped() {
        assert_eq!(DomainError::collect(vec![bad_db()]), Err(bad_db()));
    }

    #[test]
    fn collect_many_lists_every_violation() {
        let other = DomainError::InvalidProjectName {
            name: "My App".into(),
            reason: "uppercase".into(),
        };
        let err = DomainError::collect(vec![bad_db(), other]).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("mysql"));
        assert!(text.contains("My App"));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }
}
