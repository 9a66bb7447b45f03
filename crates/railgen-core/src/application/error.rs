//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A generator step failed after mutating the filesystem.
    #[error("Generation step '{step}' failed: {reason}")]
    GenerationFailed { step: String, reason: String },

    /// The pre-generation snapshot could not be taken. Fatal: the run
    /// does not proceed.
    #[error("Failed to back up {path}: {reason}")]
    BackupFailed { path: PathBuf, reason: String },

    /// One or more rollback steps failed.
    #[error("Rollback failed in step(s) {}", failed_steps.join(", "))]
    RollbackFailed {
        failed_steps: Vec<String>,
        /// Paths whose state could not be guaranteed.
        indeterminate: Vec<PathBuf>,
        /// Snapshot kept on disk for manual recovery.
        snapshot: Option<PathBuf>,
    },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// An external command could not be started or exited non-zero.
    #[error("Command `{command}` failed: {reason}")]
    CommandFailed { command: String, reason: String },

    /// A second run tried to occupy the slot while another is in flight.
    #[error("Another generation run ({run_id}) is still in progress")]
    RunInProgress { run_id: Uuid },

    /// The run was rolled back underneath the orchestrator (signal/fault).
    #[error("Generation run was aborted")]
    RunAborted,

    #[error("No built-in templates for component '{component}'")]
    TemplateNotFound { component: String },

    #[error("Template rendering failed: {reason}")]
    RenderingFailed { reason: String },

    #[error("Snapshot '{name}' not found under {root}")]
    SnapshotNotFound { name: String, root: PathBuf },

    /// Store access failed (lock poisoned, etc.).
    #[error("Template store error")]
    StoreLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::BackupFailed { path, .. } => vec![
                format!("Could not copy {} before generating", path.display()),
                "Check free disk space and read access to the existing directory".into(),
                "Nothing was changed; it is safe to retry".into(),
            ],
            Self::RollbackFailed {
                indeterminate,
                snapshot,
                ..
            } => {
                let mut out: Vec<String> = indeterminate
                    .iter()
                    .map(|p| format!("Inspect and clean up manually: {}", p.display()))
                    .collect();
                if let Some(snapshot) = snapshot {
                    out.push(format!(
                        "Your original files are preserved in {}",
                        snapshot.display()
                    ));
                }
                out
            }
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::CommandFailed { command, .. } => vec![
                format!("Make sure `{command}` is installed and on your PATH"),
            ],
            Self::RunInProgress { .. } => vec![
                "Wait for the current run to finish before starting another".into(),
            ],
            Self::SnapshotNotFound { root, .. } => vec![
                format!("Available snapshots live in {}", root.display()),
                "Use --latest to restore the most recent one".into(),
            ],
            Self::StoreLockError => vec![
                "The template store is locked".into(),
                "Try again in a moment".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateNotFound { .. } | Self::SnapshotNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::RunAborted => ErrorCategory::Interrupted,
            // Refused before touching anything; must not roll back the
            // run that does hold the slot.
            Self::RunInProgress { .. } => ErrorCategory::Validation,
            Self::GenerationFailed { .. }
            | Self::BackupFailed { .. }
            | Self::RollbackFailed { .. }
            | Self::FilesystemError { .. }
            | Self::CommandFailed { .. }
            | Self::RenderingFailed { .. }
            | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_failure_lists_steps_and_snapshot() {
        let err = ApplicationError::RollbackFailed {
            failed_steps: vec!["remove-target".into(), "restore-backup".into()],
            indeterminate: vec![PathBuf::from("/w/shop")],
            snapshot: Some(PathBuf::from("/w/.railgen-backup/backup-x")),
        };
        assert_eq!(
            err.to_string(),
            "Rollback failed in step(s) remove-target, restore-backup"
        );
        let hints = err.suggestions();
        assert!(hints[0].contains("/w/shop"));
        assert!(hints[1].contains("backup-x"));
    }
}
