//! Error handling for the railgen CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Proper error chaining
//! - Exit code mapping

use std::error::Error;

use owo_colors::OwoColorize;
use thiserror::Error;

use railgen_core::{
    application::{ApplicationError, services::hint_for},
    error::{ErrorCategory as CoreCategory, RailgenError},
};

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// An error from `railgen-core` raised outside a generation run.
    #[error("{0}")]
    Core(#[from] RailgenError),

    /// A generation run failed. The coordinator has already rolled it back
    /// and decided the exit status. `rollback` is set when that rollback
    /// left part of the target behind.
    #[error("Project generation failed: {error}")]
    RunFailed {
        #[source]
        error: RailgenError,
        exit_code: i32,
        rollback: Option<ApplicationError>,
    },

    /// A configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The user declined the confirmation prompt.
    #[error("Operation cancelled")]
    Cancelled,

    /// Prompts are needed but stdin is not a terminal.
    #[error("Cannot prompt for input: stdin is not a terminal")]
    NotInteractive,

    /// Prompts are needed but this build has no interactive support.
    #[error("Feature not available: {feature}")]
    FeatureNotAvailable { feature: &'static str },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

/// What an incomplete rollback left behind, most urgent first.
fn rollback_suggestions(rollback: &ApplicationError) -> Vec<String> {
    let mut out = Vec::new();
    if let ApplicationError::RollbackFailed { failed_steps, .. } = rollback {
        out.push(format!(
            "Rollback did not complete; failed steps: {}",
            failed_steps.join(", ")
        ));
    } else {
        out.push(format!("Rollback did not complete: {rollback}"));
    }
    for s in rollback.suggestions() {
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Core(core) => core.suggestions(),

            Self::RunFailed {
                error, rollback, ..
            } => {
                let mut out = Vec::new();
                if let Some(rollback) = rollback {
                    out.extend(rollback_suggestions(rollback));
                }
                out.push(hint_for(&error.to_string()).to_string());
                for s in error.suggestions() {
                    if !out.contains(&s) {
                        out.push(s);
                    }
                }
                out
            }

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {message}"),
                "Run `railgen config path` to locate the configuration file".into(),
                "Environment overrides use RAILGEN_<SECTION>__<KEY>".into(),
            ],

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
                "Check available disk space".into(),
            ],

            Self::Cancelled => vec!["No changes were made".into()],

            Self::NotInteractive => vec![
                "Pass --yes to skip the prompts".into(),
                "For generate, giving NAME with --rails-version, --react-version and --database also skips them".into(),
            ],

            Self::FeatureNotAvailable { feature } => vec![
                format!("The '{feature}' feature is not available in this build"),
                "Pass --yes to skip the prompts".into(),
                format!("Install with the feature enabled: cargo install railgen-cli --features {feature}"),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Core(core) => match core.category() {
                CoreCategory::Validation | CoreCategory::NotFound => ErrorCategory::UserError,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Interrupted => ErrorCategory::Cancelled,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::RunFailed { error, .. } if error.is_validation() => ErrorCategory::UserError,
            Self::RunFailed { .. } => ErrorCategory::Internal,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError { .. } => ErrorCategory::Internal,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::NotInteractive | Self::FeatureNotAvailable { .. } => ErrorCategory::UserError,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | Cancelled     |  0   |
    /// | Internal      |  1   |
    /// | User error    |  2   |
    /// | Configuration |  4   |
    ///
    /// A failed run exits with whatever the coordinator decided.
    pub fn exit_code(&self) -> u8 {
        if let Self::RunFailed { exit_code, .. } = self {
            return u8::try_from(*exit_code).unwrap_or(1);
        }
        match self.category() {
            ErrorCategory::Cancelled => 0,
            ErrorCategory::Internal => 1,
            ErrorCategory::UserError => 2,
            ErrorCategory::Configuration => 4,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));

        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(), // ℹ
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`], without ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {self}\n"));

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  - {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::Cancelled => tracing::info!("Cancelled: {}", self),
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The user backed out, or a signal ended the run.
    Cancelled,
    /// User input error (validation, invalid arguments).
    UserError,
    /// Configuration error.
    Configuration,
    /// Internal/system error.
    Internal,
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Extension trait to convert foreign error types into [`CliError`] at
/// call-sites with a descriptive context message.
pub trait IntoCli<T> {
    /// Convert to `CliResult` attaching a human-readable context message.
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railgen_core::{application::ApplicationError, domain::DomainError};
    use std::io;
    use std::path::PathBuf;

    fn validation() -> RailgenError {
        DomainError::InvalidProjectName {
            name: "My App".into(),
            reason: "only lowercase letters, numbers, and hyphens are allowed".into(),
        }
        .into()
    }

    // ── exit codes ────────────────────────────────────────────────────────

    #[test]
    fn validation_errors_exit_2() {
        assert_eq!(CliError::Core(validation()).exit_code(), 2);
    }

    #[test]
    fn snapshot_not_found_exits_2() {
        let err = CliError::Core(
            ApplicationError::SnapshotNotFound {
                name: "backup-x".into(),
                root: PathBuf::from(".railgen-backup"),
            }
            .into(),
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn configuration_errors_exit_4() {
        let err = CliError::ConfigError {
            message: "x".into(),
            source: None,
        };
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn cancellation_exits_0() {
        assert_eq!(CliError::Cancelled.exit_code(), 0);
    }

    #[test]
    fn failed_run_uses_coordinator_exit_code() {
        let err = CliError::RunFailed {
            error: ApplicationError::GenerationFailed {
                step: "backend".into(),
                reason: "boom".into(),
            }
            .into(),
            exit_code: 1,
            rollback: None,
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn io_errors_exit_1() {
        let err = CliError::IoError {
            message: "x".into(),
            source: io::Error::other("e"),
        };
        assert_eq!(err.exit_code(), 1);
    }

    // ── suggestions ───────────────────────────────────────────────────────

    #[test]
    fn failed_run_leads_with_hint() {
        let err = CliError::RunFailed {
            error: ApplicationError::FilesystemError {
                path: PathBuf::from("/srv/app"),
                reason: "Permission denied (os error 13)".into(),
            }
            .into(),
            exit_code: 1,
            rollback: None,
        };
        let suggestions = err.suggestions();
        assert!(suggestions[0].contains("permissions"), "{suggestions:?}");
    }

    #[test]
    fn unknown_failure_gets_generic_hint() {
        let err = CliError::RunFailed {
            error: RailgenError::Internal {
                message: "weird".into(),
            },
            exit_code: 1,
            rollback: None,
        };
        assert!(err.suggestions()[0].contains("-vv"));
    }

    #[test]
    fn incomplete_rollback_lists_steps_paths_and_snapshot() {
        let err = CliError::RunFailed {
            error: ApplicationError::GenerationFailed {
                step: "frontend".into(),
                reason: "boom".into(),
            }
            .into(),
            exit_code: 1,
            rollback: Some(ApplicationError::RollbackFailed {
                failed_steps: vec!["remove-target".into(), "restore-backup".into()],
                indeterminate: vec![PathBuf::from("/srv/shop"), PathBuf::from("/srv/shop")],
                snapshot: Some(PathBuf::from("/srv/.railgen-backup/backup-x")),
            }),
        };

        let suggestions = err.suggestions();
        assert_eq!(
            suggestions[0],
            "Rollback did not complete; failed steps: remove-target, restore-backup"
        );
        assert_eq!(
            suggestions
                .iter()
                .filter(|s| s.contains("/srv/shop"))
                .count(),
            1,
            "{suggestions:?}"
        );
        assert!(suggestions.iter().any(|s| s.contains("/srv/.railgen-backup/backup-x")));

        let s = err.format_plain(false);
        assert!(s.contains("restore-backup"));
        assert!(s.contains("/srv/.railgen-backup/backup-x"));
        assert_eq!(err.exit_code(), 1);
    }

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn format_plain_contains_error_header() {
        let s = CliError::Core(validation()).format_plain(false);
        assert!(s.contains("Error:"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("--verbose"));
    }

    #[test]
    fn format_plain_verbose_shows_cause() {
        let err = CliError::RunFailed {
            error: validation(),
            exit_code: 2,
            rollback: None,
        };
        let s = err.format_plain(true);
        assert!(s.contains("Caused by:"));
        assert!(!s.contains("--verbose"));
    }

    // ── IntoCli ───────────────────────────────────────────────────────────

    #[test]
    fn into_cli_io_error() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli: CliResult<()> = result.with_cli_context(|| "reading config");
        assert!(matches!(cli, Err(CliError::IoError { message, .. }) if message == "reading config"));
    }
}
