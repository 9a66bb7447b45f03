//! Run coordinator: the single current-run slot and the decisions taken when
//! a run fails, panics or is interrupted.
//!
//! The slot is shared between the orchestrator (main thread), the signal
//! handler and the panic hook. Whoever takes the run out of the slot owns
//! its rollback, so a run is never rolled back twice.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use tracing::{error, info, warn};

use crate::{
    application::{
        ApplicationError,
        ports::Progress,
        services::{backup::BackupStore, rollback::RollbackEngine},
    },
    domain::RollbackRecord,
    error::{RailgenError, RailgenResult},
};

/// What the caller should do after the coordinator handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to act on; carry on with default behaviour.
    Continue,
    /// Exit the process with this status.
    Terminate(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Interrupt,
    Terminate,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("interrupted by user"),
            Self::Terminate => f.write_str("terminated"),
        }
    }
}

/// Known failure patterns and what to tell the user about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorHint {
    PermissionDenied,
    AlreadyExists,
    Network,
    MissingRails,
    MissingNode,
    MissingGit,
}

impl ErrorHint {
    // Tool hints key on command-failure text only; a bare "git" would also
    // match paths such as ~/rails-apps or a project called "digits".
    const PATTERNS: [(&'static str, Self); 12] = [
        ("permission denied", Self::PermissionDenied),
        ("already exists", Self::AlreadyExists),
        ("network", Self::Network),
        ("command `rails", Self::MissingRails),
        ("command `bundle", Self::MissingRails),
        ("rails: command not found", Self::MissingRails),
        ("command `node", Self::MissingNode),
        ("command `npm", Self::MissingNode),
        ("command `pnpm", Self::MissingNode),
        ("command `yarn", Self::MissingNode),
        ("node: command not found", Self::MissingNode),
        ("command `git", Self::MissingGit),
    ];

    /// First matching pattern, case-insensitive.
    pub fn classify(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        Self::PATTERNS
            .iter()
            .find(|(pattern, _)| text.contains(pattern))
            .map(|(_, hint)| *hint)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Check file permissions and ensure you have write access to the target directory"
            }
            Self::AlreadyExists => {
                "Remove the existing directory or choose a different project name"
            }
            Self::Network => "Check your internet connection and try again",
            Self::MissingRails => "Ensure Rails is installed: gem install rails",
            Self::MissingNode => "Ensure Node.js is installed and up to date",
            Self::MissingGit => "Ensure Git is installed, or pass --no-git",
        }
    }
}

/// Fallback hint when no pattern matches.
pub const GENERIC_HINT: &str = "Re-run with -vv for detailed logs";

/// Hint text for an error, falling back to [`GENERIC_HINT`].
pub fn hint_for(text: &str) -> &'static str {
    ErrorHint::classify(text).map_or(GENERIC_HINT, |h| h.message())
}

/// The in-flight run: its record and the backup taken for it.
#[derive(Debug)]
pub struct ActiveRun {
    pub record: RollbackRecord,
    pub backup: BackupStore,
}

impl ActiveRun {
    pub fn new(record: RollbackRecord, backup: BackupStore) -> Self {
        Self { record, backup }
    }
}

/// Owns the current-run slot. Cheap to clone; clones share the slot.
#[derive(Clone)]
pub struct Coordinator {
    slot: Arc<Mutex<Option<ActiveRun>>>,
    engine: Arc<RollbackEngine>,
    progress: Arc<dyn Progress>,
}

impl Coordinator {
    pub fn new(engine: Arc<RollbackEngine>, progress: Arc<dyn Progress>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            engine,
            progress,
        }
    }

    /// Occupy the slot. Fails while another unfinished run holds it.
    pub fn begin(&self, run: ActiveRun) -> RailgenResult<()> {
        let mut slot = self.lock();
        if let Some(current) = slot.as_ref() {
            if !current.record.state().is_terminal() {
                return Err(ApplicationError::RunInProgress {
                    run_id: current.record.run_id(),
                }
                .into());
            }
        }
        info!(run_id = %run.record.run_id(), "Run registered");
        *slot = Some(run);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    /// Apply `f` to the in-flight run. `None` if the slot is empty, which
    /// means the run was already rolled back by a signal or fault.
    pub fn with_run<R>(&self, f: impl FnOnce(&mut ActiveRun) -> R) -> Option<R> {
        self.lock().as_mut().map(f)
    }

    /// Clear the slot after a successful run, handing the run back.
    pub fn finish(&self) -> Option<ActiveRun> {
        self.lock().take()
    }

    /// Handle a failure raised while a run may be in flight.
    ///
    /// Validation failures happen before anything is written and terminate
    /// without touching the slot. Everything else rolls back the active run.
    pub fn handle_error(&self, err: &RailgenError, context: &str) -> Decision {
        self.fail_run(err, context).0
    }

    /// [`Self::handle_error`], also handing back the rollback failure when
    /// the rollback it triggered left the target in a mixed state.
    pub fn fail_run(
        &self,
        err: &RailgenError,
        context: &str,
    ) -> (Decision, Option<ApplicationError>) {
        let hint = hint_for(&err.to_string());
        error!(context, error = %err, hint, "Run failed");

        if err.is_validation() {
            return (Decision::Terminate(err.category().exit_code()), None);
        }

        let run = self.lock().take();
        let rollback_error = self.roll_back(run, false);
        (
            Decision::Terminate(err.category().exit_code().max(1)),
            rollback_error,
        )
    }

    /// Panics and other uncaught faults: same as [`Self::handle_error`].
    pub fn handle_fault(&self, message: &str) -> Decision {
        let err = RailgenError::Internal {
            message: message.to_string(),
        };
        self.handle_error(&err, "uncaught fault")
    }

    /// Panic-hook variant of [`Self::handle_fault`] that never blocks.
    ///
    /// If the slot is empty or held by the panicking thread, returns
    /// `Continue` so the default panic output still runs.
    pub fn try_handle_fault(&self, message: &str) -> Decision {
        let run = match self.slot.try_lock() {
            Ok(mut slot) => slot.take(),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().take(),
            Err(TryLockError::WouldBlock) => return Decision::Continue,
        };
        if run.is_none() {
            return Decision::Continue;
        }
        error!(fault = message, "Uncaught fault during generation");
        self.roll_back(run, false);
        Decision::Terminate(1)
    }

    /// Interrupt or terminate request: roll back synchronously, exit 0.
    pub fn handle_signal(&self, kind: SignalKind) -> Decision {
        self.interrupt_run(kind).0
    }

    /// [`Self::handle_signal`], also handing back the rollback failure.
    ///
    /// Taking the slot waits for any filesystem write in flight, so nothing
    /// the run writes can land after the rollback.
    pub fn interrupt_run(&self, kind: SignalKind) -> (Decision, Option<ApplicationError>) {
        warn!(signal = %kind, "Process {kind}");
        let run = self.lock().take();
        let rollback_error = self.roll_back(run, true);
        (Decision::Terminate(0), rollback_error)
    }

    fn roll_back(&self, run: Option<ActiveRun>, interrupted: bool) -> Option<ApplicationError> {
        let Some(ActiveRun {
            mut record,
            mut backup,
        }) = run
        else {
            if !interrupted {
                info!("No run in flight, nothing to roll back");
            }
            return None;
        };

        if let Err(e) = record.fail() {
            warn!(error = %e, "Run was not in progress");
        }

        self.progress.rollback_started();
        match self.engine.rollback(&record, &backup) {
            Ok(_) => {
                // The snapshot has served its purpose once restored.
                if let Err(e) = backup.discard() {
                    warn!(error = %e, "Could not remove backup after rollback");
                }
                self.progress.rollback_finished(true);
                None
            }
            Err(e) => {
                error!(error = %e, suggestions = ?e.suggestions(), "Rollback incomplete");
                self.progress.rollback_finished(false);
                Some(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveRun>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        CommandRunner, Filesystem, MockCommandRunner, MockFilesystem, NoProgress,
    };
    use crate::domain::DomainError;
    use std::path::Path;

    fn coordinator(fs: MockFilesystem) -> (Coordinator, Arc<dyn Filesystem>) {
        let mut runner = MockCommandRunner::new();
        runner.expect_halt_all().returning(|| Ok(0));
        let runner: Arc<dyn CommandRunner> = Arc::new(runner);
        let fs: Arc<dyn Filesystem> = Arc::new(fs);
        let engine = Arc::new(RollbackEngine::new(fs.clone(), runner));
        (Coordinator::new(engine, Arc::new(NoProgress)), fs)
    }

    fn run(fs: &Arc<dyn Filesystem>) -> ActiveRun {
        let mut record = RollbackRecord::new("/w/shop");
        record.start().unwrap();
        ActiveRun::new(record, BackupStore::new(fs.clone(), "/w/.railgen-backup"))
    }

    #[test]
    fn second_begin_is_refused_while_running() {
        let (coord, fs) = coordinator(MockFilesystem::new());
        coord.begin(run(&fs)).unwrap();
        let err = coord.begin(run(&fs)).unwrap_err();
        assert!(matches!(
            err,
            RailgenError::Application(ApplicationError::RunInProgress { .. })
        ));
        coord.finish();
        coord.begin(run(&fs)).unwrap();
    }

    #[test]
    fn validation_errors_terminate_without_rollback() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().never();
        fs.expect_remove_dir_all().never();
        let (coord, fs) = coordinator(fs);
        coord.begin(run(&fs)).unwrap();

        let err: RailgenError = DomainError::InvalidProjectName {
            name: "X".into(),
            reason: "uppercase".into(),
        }
        .into();
        assert_eq!(coord.handle_error(&err, "generate"), Decision::Terminate(2));
        assert!(coord.is_active());
    }

    #[test]
    fn generation_error_rolls_back_and_clears_slot() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|p| p == Path::new("/w/shop"));
        fs.expect_remove_dir_all()
            .withf(|p| p == Path::new("/w/shop"))
            .times(1)
            .returning(|_| Ok(()));
        let (coord, fs) = coordinator(fs);
        coord.begin(run(&fs)).unwrap();

        let err: RailgenError = ApplicationError::GenerationFailed {
            step: "frontend".into(),
            reason: "boom".into(),
        }
        .into();
        assert_eq!(coord.handle_error(&err, "generate"), Decision::Terminate(1));
        assert!(!coord.is_active());
    }

    #[test]
    fn signal_rolls_back_and_exits_zero() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_remove_dir_all().times(1).returning(|_| Ok(()));
        let (coord, fs) = coordinator(fs);
        coord.begin(run(&fs)).unwrap();

        assert_eq!(
            coord.handle_signal(SignalKind::Interrupt),
            Decision::Terminate(0)
        );
        assert!(!coord.is_active());
        // A second signal finds nothing to undo.
        assert_eq!(
            coord.handle_signal(SignalKind::Terminate),
            Decision::Terminate(0)
        );
    }

    #[test]
    fn failed_rollback_is_handed_back_to_the_caller() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_remove_dir_all().returning(|p| {
            Err(ApplicationError::FilesystemError {
                path: p.to_path_buf(),
                reason: "permission denied".into(),
            }
            .into())
        });
        let (coord, fs) = coordinator(fs);
        coord.begin(run(&fs)).unwrap();

        let err: RailgenError = ApplicationError::GenerationFailed {
            step: "backend".into(),
            reason: "boom".into(),
        }
        .into();
        let (decision, rollback) = coord.fail_run(&err, "generate");
        assert_eq!(decision, Decision::Terminate(1));
        match rollback {
            Some(ApplicationError::RollbackFailed {
                failed_steps,
                indeterminate,
                ..
            }) => {
                assert_eq!(failed_steps, vec!["remove-target".to_string()]);
                assert_eq!(indeterminate, vec![Path::new("/w/shop").to_path_buf()]);
            }
            other => panic!("unexpected rollback outcome: {other:?}"),
        }
        assert!(!coord.is_active());
    }

    #[test]
    fn clean_rollback_reports_nothing() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_remove_dir_all().returning(|_| Ok(()));
        let (coord, fs) = coordinator(fs);
        coord.begin(run(&fs)).unwrap();

        let (decision, rollback) = coord.interrupt_run(SignalKind::Terminate);
        assert_eq!(decision, Decision::Terminate(0));
        assert!(rollback.is_none());
    }

    #[test]
    fn fault_without_run_continues_default_handling() {
        let (coord, _fs) = coordinator(MockFilesystem::new());
        assert_eq!(coord.try_handle_fault("boom"), Decision::Continue);
        assert_eq!(coord.handle_fault("boom"), Decision::Terminate(1));
    }

    #[test]
    fn fault_with_locked_slot_does_not_block() {
        let (coord, fs) = coordinator(MockFilesystem::new());
        coord.begin(run(&fs)).unwrap();
        let held = coord.slot.lock().unwrap();
        assert_eq!(coord.try_handle_fault("boom"), Decision::Continue);
        drop(held);
    }

    #[test]
    fn hints_match_case_insensitively() {
        assert_eq!(
            ErrorHint::classify("EACCES: Permission Denied, open '/x'"),
            Some(ErrorHint::PermissionDenied)
        );
        assert_eq!(
            ErrorHint::classify("Directory already exists"),
            Some(ErrorHint::AlreadyExists)
        );
        assert_eq!(
            ErrorHint::classify("command `git init` failed"),
            Some(ErrorHint::MissingGit)
        );
        assert_eq!(hint_for("disk full"), GENERIC_HINT);
    }

    #[test]
    fn tool_names_in_paths_do_not_trigger_tool_hints() {
        for text in [
            "Filesystem error at /home/u/rails-apps/shop: disk full",
            "Filesystem error at /srv/digits/node_modules/.cache: disk full",
            "Template not found: backend/config/initializers/git_sha.rb",
        ] {
            assert_eq!(ErrorHint::classify(text), None, "{text}");
        }
        assert_eq!(
            ErrorHint::classify("Command `rails new shop --api` failed: exit status 1"),
            Some(ErrorHint::MissingRails)
        );
        assert_eq!(
            ErrorHint::classify("sh: node: command not found"),
            Some(ErrorHint::MissingNode)
        );
        assert_eq!(
            ErrorHint::classify("Command `pnpm install` failed: not found"),
            Some(ErrorHint::MissingNode)
        );
    }
}
