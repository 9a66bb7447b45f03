//! Scaffold Service - main application orchestrator.
//!
//! This service coordinates one generation run:
//! 1. Build the rollback record and take the backup
//! 2. Register the run with the coordinator
//! 3. Run each generator step, flushing the ledger into the record after it
//! 4. Discard the backup and release the slot, or hand the failure to the
//!    coordinator for rollback

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        generators::{GeneratorStep, Ports, RunContext, steps_for},
        ports::{CommandRunner, Filesystem, Progress, TemplateRenderer, TemplateStore},
        services::{
            backup::BackupStore,
            coordinator::{ActiveRun, Coordinator, Decision},
            rollback::RollbackEngine,
        },
    },
    domain::{ProjectConfig, RollbackRecord},
    error::{RailgenError, RailgenResult},
};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub run_id: Uuid,
    pub project_path: PathBuf,
    pub files: usize,
    pub directories: usize,
    pub git_initialized: bool,
}

/// A failed run: the error and what the coordinator decided.
#[derive(Debug, Clone)]
pub struct RunFailure {
    pub error: RailgenError,
    pub decision: Decision,
    /// Set when the rollback itself did not complete; carries the steps
    /// that failed, the paths left behind and the preserved snapshot.
    pub rollback: Option<ApplicationError>,
}

/// Main scaffolding service.
pub struct ScaffoldService {
    ports: Ports,
    coordinator: Coordinator,
    backup_root: PathBuf,
}

impl ScaffoldService {
    /// Create a new scaffold service with the given adapters.
    ///
    /// `backup_root` is where pre-generation snapshots are stored.
    pub fn new(
        store: Arc<dyn TemplateStore>,
        renderer: Arc<dyn TemplateRenderer>,
        filesystem: Arc<dyn Filesystem>,
        runner: Arc<dyn CommandRunner>,
        progress: Arc<dyn Progress>,
        backup_root: impl Into<PathBuf>,
    ) -> Self {
        let engine = Arc::new(RollbackEngine::new(filesystem.clone(), runner.clone()));
        Self {
            ports: Ports {
                filesystem,
                store,
                renderer,
                runner,
            },
            coordinator: Coordinator::new(engine, progress),
            backup_root: backup_root.into(),
        }
    }

    /// The coordinator owning this service's run slot. Signal and panic
    /// hooks hold a clone of it.
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    /// Take the backup and register a new run.
    ///
    /// A backup failure aborts before anything is registered or written.
    #[instrument(skip_all, fields(project = %config.project_name))]
    pub fn begin_run(&self, config: &ProjectConfig) -> RailgenResult<RunContext> {
        if let Some(run_id) = self.coordinator.with_run(|run| run.record.run_id()) {
            return Err(ApplicationError::RunInProgress { run_id }.into());
        }

        let mut record = RollbackRecord::new(&config.project_path);
        let mut backup = BackupStore::new(self.ports.filesystem.clone(), &self.backup_root);
        backup.snapshot(&config.project_path)?;

        record.start()?;
        let run_id = record.run_id();
        self.coordinator.begin(ActiveRun::new(record, backup))?;
        info!(%run_id, path = %config.project_path.display(), "Run started");
        Ok(RunContext::new(
            config.clone(),
            self.ports.clone(),
            self.coordinator.clone(),
        ))
    }

    /// Execute one step and flush what it created into the record.
    ///
    /// The flush happens whether or not the step succeeded, so paths
    /// written before a failure are still rolled back. A run that was
    /// already rolled back by a signal or fault runs no further steps.
    pub fn run_step(
        &self,
        ctx: &mut RunContext,
        step: &dyn GeneratorStep,
        progress: &dyn Progress,
    ) -> RailgenResult<()> {
        if !self.coordinator.is_active() {
            return Err(ApplicationError::RunAborted.into());
        }
        progress.step_started(step.name(), &step.description(ctx.config()));
        let result = step.run(ctx);

        let flushed = self.coordinator.with_run(|run| {
            ctx.ledger.flush_into(&mut run.record);
            if ctx.git_initialized {
                run.record.mark_git_initialized();
            }
        });
        if flushed.is_none() {
            let err = RailgenError::from(ApplicationError::RunAborted);
            progress.step_failed(step.name(), &err);
            return Err(err);
        }

        match result {
            Ok(()) => {
                progress.step_finished(step.name());
                Ok(())
            }
            Err(e) => {
                let err = RailgenError::from(ApplicationError::GenerationFailed {
                    step: step.name().to_string(),
                    reason: e.to_string(),
                });
                progress.step_failed(step.name(), &err);
                Err(err)
            }
        }
    }

    /// Discard the backup, complete the record and release the slot.
    pub fn run_succeeded(&self, ctx: &mut RunContext) -> RailgenResult<GenerationSummary> {
        let Some(mut run) = self.coordinator.finish() else {
            return Err(ApplicationError::RunAborted.into());
        };
        ctx.ledger.flush_into(&mut run.record);

        if let Err(e) = run.backup.discard() {
            warn!(error = %e, "Could not remove backup after successful run");
        }
        run.record.complete()?;

        let record = &run.record;
        info!(run_id = %record.run_id(), "Run completed");
        Ok(GenerationSummary {
            run_id: record.run_id(),
            project_path: record.target_path().to_path_buf(),
            files: record.created_files().len(),
            directories: record.created_directories().len(),
            git_initialized: record.git_initialized(),
        })
    }

    /// Hand a failure to the coordinator.
    pub fn run_failed(&self, err: RailgenError) -> RunFailure {
        let (decision, rollback) = self.coordinator.fail_run(&err, "project generation");
        RunFailure {
            error: err,
            decision,
            rollback,
        }
    }

    /// Generate a project end to end.
    #[instrument(skip_all, fields(project = %config.project_name))]
    pub fn generate(
        &self,
        config: &ProjectConfig,
        progress: &dyn Progress,
    ) -> Result<GenerationSummary, RunFailure> {
        self.generate_with(config, &steps_for(config), progress)
    }

    /// [`Self::generate`] with an explicit step list.
    pub fn generate_with(
        &self,
        config: &ProjectConfig,
        steps: &[Box<dyn GeneratorStep>],
        progress: &dyn Progress,
    ) -> Result<GenerationSummary, RunFailure> {
        let mut ctx = self.begin_run(config).map_err(|e| self.run_failed(e))?;

        for step in steps {
            self.run_step(&mut ctx, step.as_ref(), progress)
                .map_err(|e| self.run_failed(e))?;
        }

        self.run_succeeded(&mut ctx).map_err(|e| self.run_failed(e))
    }
}
