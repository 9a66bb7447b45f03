//! Generator steps and the context they run in.
//!
//! A step lays down one component of the project. Everything it creates
//! goes through [`RunContext`], which records each new directory and file
//! in the creation ledger immediately after the write succeeds.
//!
//! Every mutation runs while holding the coordinator's run slot. A signal
//! handler that takes the slot to roll back therefore waits for the write
//! in flight, and any write attempted afterwards fails with
//! [`ApplicationError::RunAborted`] instead of landing after the rollback.

mod steps;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    application::{
        error::ApplicationError,
        ports::{CommandRunner, Filesystem, TemplateRenderer, TemplateStore},
        services::Coordinator,
    },
    domain::{
        Component, CreationLedger, FsEntry, Permissions, ProjectConfig, ProjectStructure,
        RenderContext,
    },
    error::RailgenResult,
};

pub use steps::{BackendStep, DockerStep, FrontendStep, GitStep, GraphqlStep};

/// One unit of generation work.
pub trait GeneratorStep: Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Human-readable progress line.
    fn description(&self, config: &ProjectConfig) -> String;

    fn run(&self, ctx: &mut RunContext) -> RailgenResult<()>;
}

/// Steps for a configuration, in execution order.
pub fn steps_for(config: &ProjectConfig) -> Vec<Box<dyn GeneratorStep>> {
    let mut steps: Vec<Box<dyn GeneratorStep>> = vec![
        Box::new(BackendStep),
        Box::new(FrontendStep),
        Box::new(GraphqlStep),
    ];
    if config.features.docker {
        steps.push(Box::new(DockerStep));
    }
    if config.features.git {
        steps.push(Box::new(GitStep));
    }
    steps
}

/// Adapters a run writes through.
#[derive(Clone)]
pub struct Ports {
    pub filesystem: Arc<dyn Filesystem>,
    pub store: Arc<dyn TemplateStore>,
    pub renderer: Arc<dyn TemplateRenderer>,
    pub runner: Arc<dyn CommandRunner>,
}

/// Mutable state of one run, handed to every step.
pub struct RunContext {
    config: ProjectConfig,
    render: RenderContext,
    ports: Ports,
    coordinator: Coordinator,
    pub(crate) ledger: CreationLedger,
    pub(crate) git_initialized: bool,
}

impl RunContext {
    pub fn new(config: ProjectConfig, ports: Ports, coordinator: Coordinator) -> Self {
        let render = RenderContext::for_project(&config);
        Self {
            config,
            render,
            ports,
            coordinator,
            ledger: CreationLedger::new(),
            git_initialized: false,
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn project_path(&self) -> &Path {
        &self.config.project_path
    }

    pub fn render_context(&self) -> &RenderContext {
        &self.render
    }

    /// Paths recorded since the last flush.
    pub fn ledger(&self) -> &CreationLedger {
        &self.ledger
    }

    /// Render and write the template set of `component`.
    ///
    /// Returns the number of entries written.
    #[instrument(skip(self), fields(component = %component))]
    pub fn materialize(&mut self, component: Component) -> RailgenResult<usize> {
        let set = self.ports.store.get(component)?;
        set.validate()?;

        let root = match &set.base {
            Some(base) => self.config.project_path.join(base),
            None => self.config.project_path.clone(),
        };
        let structure = self.ports.renderer.render(
            &set,
            &self.render,
            &self.config.features,
            &root,
        )?;
        structure.validate()?;
        self.write_structure(&structure)
    }

    /// Write every entry of a rendered structure, in order.
    pub fn write_structure(&mut self, structure: &ProjectStructure) -> RailgenResult<usize> {
        self.ensure_dir(structure.root())?;
        for entry in structure.entries() {
            let path = structure.root().join(entry.path());
            match entry {
                FsEntry::Directory(_) => self.ensure_dir(&path)?,
                FsEntry::File(file) => {
                    self.write_file(&path, &file.content, file.permissions)?;
                }
            }
        }
        Ok(structure.entry_count())
    }

    /// Create `path` and any missing parents, recording each new directory
    /// outermost first.
    ///
    /// Only directories at or below the project path are recorded. Parents
    /// above it are created when missing but outlive a rollback.
    pub fn ensure_dir(&mut self, path: &Path) -> RailgenResult<()> {
        let stop = self.config.project_path.parent();
        let mut missing: Vec<PathBuf> = Vec::new();
        let mut cursor = Some(path);
        while let Some(dir) = cursor {
            if Some(dir) == stop || self.ports.filesystem.exists(dir) {
                break;
            }
            missing.push(dir.to_path_buf());
            cursor = dir.parent();
        }
        if missing.is_empty() && self.ports.filesystem.exists(path) {
            return Ok(());
        }

        let fs = Arc::clone(&self.ports.filesystem);
        self.guarded(|| fs.create_dir_all(path))?;
        for dir in missing.into_iter().rev() {
            self.ledger.record_directory(dir);
        }
        Ok(())
    }

    /// Write one file, creating its parent first.
    pub fn write_file(
        &mut self,
        path: &Path,
        content: &str,
        permissions: Permissions,
    ) -> RailgenResult<()> {
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent)?;
        }
        let fs = Arc::clone(&self.ports.filesystem);
        self.guarded(|| fs.write_file(path, content))?;
        self.ledger.record_file(path);
        if permissions.is_executable() {
            self.guarded(|| fs.set_permissions(path, true))?;
        }
        Ok(())
    }

    /// Run `op` while holding the run slot, or refuse if the run is over.
    fn guarded<R>(&self, op: impl FnOnce() -> RailgenResult<R>) -> RailgenResult<R> {
        self.coordinator
            .with_run(|_| op())
            .unwrap_or_else(|| Err(ApplicationError::RunAborted.into()))
    }

    /// Run an external command inside the project.
    ///
    /// The slot is not held while the command runs, so a signal can still
    /// halt it.
    pub fn run_command(&self, program: &str, args: &[&str]) -> RailgenResult<()> {
        if !self.coordinator.is_active() {
            return Err(ApplicationError::RunAborted.into());
        }
        let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
        debug!(program, ?args, "Running command");
        self.ports
            .runner
            .run(program, &args, &self.config.project_path)
    }

    pub fn mark_git_initialized(&mut self) {
        self.git_initialized = true;
    }
}
