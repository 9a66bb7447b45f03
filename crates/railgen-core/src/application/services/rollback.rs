//! Rollback engine: undo a partially generated project.
//!
//! Steps run in a fixed order and each is attempted regardless of how the
//! previous one went:
//!
//! 1. halt subprocesses started by generation
//! 2. remove the project root
//! 3. remove recorded files outside the project root
//! 4. remove recorded directories outside the project root
//! 5. restore the backup snapshot
//!
//! Missing paths are skipped, so running the engine twice against the same
//! record leaves the filesystem as the first run did.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{CommandRunner, Filesystem},
        services::backup::BackupStore,
    },
    domain::RollbackRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackStep {
    HaltProcesses,
    RemoveTarget,
    RemoveFiles,
    RemoveDirectories,
    RestoreBackup,
}

impl RollbackStep {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HaltProcesses => "halt-processes",
            Self::RemoveTarget => "remove-target",
            Self::RemoveFiles => "remove-files",
            Self::RemoveDirectories => "remove-directories",
            Self::RestoreBackup => "restore-backup",
        }
    }
}

impl fmt::Display for RollbackStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// The step did work and it succeeded.
    Done,
    /// Nothing to do (path already gone, no snapshot, no processes).
    Skipped,
    Failed {
        reason: String,
        paths: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: RollbackStep,
    pub status: StepStatus,
}

/// Per-step outcome of one rollback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    pub steps: Vec<StepOutcome>,
    /// Set when the report failed and a snapshot is still on disk.
    pub snapshot: Option<PathBuf>,
}

impl RollbackReport {
    pub fn succeeded(&self) -> bool {
        !self
            .steps
            .iter()
            .any(|s| matches!(s.status, StepStatus::Failed { .. }))
    }

    pub fn failed_steps(&self) -> Vec<RollbackStep> {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Failed { .. }))
            .map(|s| s.step)
            .collect()
    }

    /// Paths whose state rollback could not guarantee.
    pub fn indeterminate_paths(&self) -> Vec<PathBuf> {
        self.steps
            .iter()
            .filter_map(|s| match &s.status {
                StepStatus::Failed { paths, .. } => Some(paths.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Collapse the report: any failed step yields `RollbackFailed`.
    pub fn into_result(self) -> Result<RollbackReport, ApplicationError> {
        if self.succeeded() {
            return Ok(self);
        }
        Err(ApplicationError::RollbackFailed {
            failed_steps: self
                .failed_steps()
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            indeterminate: self.indeterminate_paths(),
            snapshot: self.snapshot,
        })
    }

    fn push(&mut self, step: RollbackStep, status: StepStatus) {
        self.steps.push(StepOutcome { step, status });
    }
}

/// Best-effort undo of one run. Reads the record; never mutates it.
pub struct RollbackEngine {
    filesystem: Arc<dyn Filesystem>,
    runner: Arc<dyn CommandRunner>,
}

impl RollbackEngine {
    pub fn new(filesystem: Arc<dyn Filesystem>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { filesystem, runner }
    }

    /// Run every rollback step and aggregate the outcomes.
    ///
    /// The snapshot held by `backup` is restored but not deleted; the caller
    /// decides its fate once the whole report is known.
    #[instrument(skip_all, fields(run_id = %record.run_id(), target = %record.target_path().display()))]
    pub fn rollback(
        &self,
        record: &RollbackRecord,
        backup: &BackupStore,
    ) -> Result<RollbackReport, ApplicationError> {
        warn!("Rolling back project generation");
        let target = record.target_path();
        let mut report = RollbackReport::default();

        report.push(RollbackStep::HaltProcesses, self.halt_processes());
        report.push(RollbackStep::RemoveTarget, self.remove_target(target));
        report.push(
            RollbackStep::RemoveFiles,
            self.remove_each(record.files_outside_target(), false),
        );
        // Reverse creation order so nested directories go before parents.
        let dirs: Vec<&Path> = record.directories_outside_target().collect();
        report.push(
            RollbackStep::RemoveDirectories,
            self.remove_each(dirs.into_iter().rev(), true),
        );
        report.push(RollbackStep::RestoreBackup, Self::restore(backup, target));

        if report.succeeded() {
            info!("Rollback completed successfully");
        } else {
            report.snapshot = backup.current().map(|s| s.snapshot_path().to_path_buf());
            warn!(failed = ?report.failed_steps(), "Rollback finished with failures");
        }
        report.into_result()
    }

    fn halt_processes(&self) -> StepStatus {
        match self.runner.halt_all() {
            Ok(0) => StepStatus::Skipped,
            Ok(n) => {
                info!(count = n, "Stopped running processes");
                StepStatus::Done
            }
            Err(e) => {
                warn!(error = %e, "Could not stop running processes");
                StepStatus::Failed {
                    reason: e.to_string(),
                    paths: Vec::new(),
                }
            }
        }
    }

    fn remove_target(&self, target: &Path) -> StepStatus {
        if !self.filesystem.exists(target) {
            return StepStatus::Skipped;
        }
        match self.filesystem.remove_dir_all(target) {
            Ok(()) => {
                info!(path = %target.display(), "Removed project directory");
                StepStatus::Done
            }
            Err(e) => {
                warn!(path = %target.display(), error = %e, "Could not remove project directory");
                StepStatus::Failed {
                    reason: e.to_string(),
                    paths: vec![target.to_path_buf()],
                }
            }
        }
    }

    fn remove_each<'a>(&self, paths: impl Iterator<Item = &'a Path>, dirs: bool) -> StepStatus {
        let mut removed = 0usize;
        let mut failed = Vec::new();
        let mut reason = String::new();

        for path in paths {
            if !self.filesystem.exists(path) {
                continue;
            }
            let result = if dirs {
                self.filesystem.remove_dir_all(path)
            } else {
                self.filesystem.remove_file(path)
            };
            match result {
                Ok(()) => {
                    removed += 1;
                    tracing::debug!(path = %path.display(), "Removed");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Could not remove");
                    if reason.is_empty() {
                        reason = e.to_string();
                    }
                    failed.push(path.to_path_buf());
                }
            }
        }

        if !failed.is_empty() {
            StepStatus::Failed {
                reason,
                paths: failed,
            }
        } else if removed == 0 {
            StepStatus::Skipped
        } else {
            StepStatus::Done
        }
    }

    fn restore(backup: &BackupStore, target: &Path) -> StepStatus {
        match backup.restore(target) {
            Ok(true) => StepStatus::Done,
            Ok(false) => StepStatus::Skipped,
            Err(e) => {
                warn!(error = %e, "Could not restore backup");
                StepStatus::Failed {
                    reason: e.to_string(),
                    paths: vec![target.to_path_buf()],
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockCommandRunner, MockFilesystem};
    use crate::domain::{BackupSnapshot, CreationLedger};
    use crate::error::RailgenError;
    use chrono::Utc;

    fn idle_runner() -> Arc<dyn CommandRunner> {
        let mut runner = MockCommandRunner::new();
        runner.expect_halt_all().returning(|| Ok(0));
        Arc::new(runner)
    }

    fn denied(path: &Path) -> RailgenError {
        ApplicationError::FilesystemError {
            path: path.to_path_buf(),
            reason: "permission denied".into(),
        }
        .into()
    }

    fn record_with_outside_paths() -> RollbackRecord {
        let mut record = RollbackRecord::new("/w/shop");
        let mut ledger = CreationLedger::new();
        ledger.record_directory("/w/shop");
        ledger.record_file("/w/shop/Gemfile");
        ledger.record_file("/w/cache.txt");
        ledger.record_directory("/w/tmp-a");
        ledger.record_directory("/w/tmp-a/nested");
        ledger.flush_into(&mut record);
        record
    }

    #[test]
    fn nothing_on_disk_is_all_skipped() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(false);
        let fs: Arc<dyn Filesystem> = Arc::new(fs);
        let backup = BackupStore::new(fs.clone(), "/w/.railgen-backup");

        let engine = RollbackEngine::new(fs, idle_runner());
        let report = engine
            .rollback(&record_with_outside_paths(), &backup)
            .unwrap();
        assert_eq!(report.steps.len(), 5);
        assert!(report.steps.iter().all(|s| s.status == StepStatus::Skipped));
    }

    #[test]
    fn outside_paths_removed_children_first_and_inside_paths_left_to_root_removal() {
        let removed = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        let log = removed.clone();
        fs.expect_remove_dir_all().returning(move |p| {
            log.lock().unwrap().push(p.to_path_buf());
            Ok(())
        });
        let log = removed.clone();
        fs.expect_remove_file().returning(move |p| {
            log.lock().unwrap().push(p.to_path_buf());
            Ok(())
        });
        let fs: Arc<dyn Filesystem> = Arc::new(fs);
        let backup = BackupStore::new(fs.clone(), "/w/.railgen-backup");

        RollbackEngine::new(fs, idle_runner())
            .rollback(&record_with_outside_paths(), &backup)
            .unwrap();

        assert_eq!(
            *removed.lock().unwrap(),
            vec![
                PathBuf::from("/w/shop"),
                PathBuf::from("/w/cache.txt"),
                PathBuf::from("/w/tmp-a/nested"),
                PathBuf::from("/w/tmp-a"),
            ]
        );
    }

    #[test]
    fn failures_are_aggregated_and_later_steps_still_run() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_remove_dir_all().returning(|p| {
            if p == Path::new("/w/shop") {
                Err(denied(p))
            } else {
                Ok(())
            }
        });
        fs.expect_remove_file().returning(|_| Ok(()));
        fs.expect_copy_dir_all().times(1).returning(|_, _| Ok(()));
        let fs: Arc<dyn Filesystem> = Arc::new(fs);

        let mut backup = BackupStore::new(fs.clone(), "/w/.railgen-backup");
        backup.attach(BackupSnapshot::new(
            "/w/shop",
            "/w/.railgen-backup/backup-x",
            Utc::now(),
        ));

        let err = RollbackEngine::new(fs, idle_runner())
            .rollback(&record_with_outside_paths(), &backup)
            .unwrap_err();

        match err {
            ApplicationError::RollbackFailed {
                failed_steps,
                indeterminate,
                snapshot,
            } => {
                assert_eq!(failed_steps, vec!["remove-target".to_string()]);
                assert_eq!(indeterminate, vec![PathBuf::from("/w/shop")]);
                assert_eq!(
                    snapshot,
                    Some(PathBuf::from("/w/.railgen-backup/backup-x"))
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn halt_failure_does_not_stop_cleanup() {
        let mut runner = MockCommandRunner::new();
        runner.expect_halt_all().returning(|| {
            Err(ApplicationError::CommandFailed {
                command: "git init".into(),
                reason: "no such process".into(),
            }
            .into())
        });
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_remove_dir_all().times(3).returning(|_| Ok(()));
        fs.expect_remove_file().times(1).returning(|_| Ok(()));
        let fs: Arc<dyn Filesystem> = Arc::new(fs);
        let backup = BackupStore::new(fs.clone(), "/w/.railgen-backup");

        let err = RollbackEngine::new(fs, Arc::new(runner))
            .rollback(&record_with_outside_paths(), &backup)
            .unwrap_err();
        assert!(err.to_string().contains("halt-processes"));
    }
}
