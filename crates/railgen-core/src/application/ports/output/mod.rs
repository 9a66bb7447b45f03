//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `railgen-adapters` crate provides implementations; the CLI provides
//! the [`Progress`] reporter.

use std::path::{Path, PathBuf};

use crate::domain::{Component, Features, ProjectStructure, RenderContext, TemplateSet};
use crate::error::{RailgenError, RailgenResult};

#[cfg(test)]
use mockall::automock;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `railgen_adapters::filesystem::LocalFilesystem` (production)
/// - `railgen_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Paths are absolute. Removal methods fail on a missing path; callers
/// that want "remove if present" check [`Filesystem::exists`] first.
#[cfg_attr(test, automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> RailgenResult<()>;

    /// Write content to a file, replacing any existing content.
    fn write_file(&self, path: &Path, content: &str) -> RailgenResult<()>;

    fn read_file(&self, path: &Path) -> RailgenResult<String>;

    /// Set file permissions.
    fn set_permissions(&self, path: &Path, executable: bool) -> RailgenResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate children of a directory, in no particular order.
    fn list_dir(&self, path: &Path) -> RailgenResult<Vec<PathBuf>>;

    fn remove_file(&self, path: &Path) -> RailgenResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> RailgenResult<()>;

    /// Recursively copy `from` into `to`, creating `to` if needed and
    /// overwriting files that already exist there.
    fn copy_dir_all(&self, from: &Path, to: &Path) -> RailgenResult<()>;
}

/// Port for template storage and retrieval.
///
/// Implemented by `railgen_adapters::template_store::InMemoryStore`
/// (built-in templates).
pub trait TemplateStore: Send + Sync {
    /// The template set for one generator component.
    fn get(&self, component: Component) -> RailgenResult<TemplateSet>;

    /// Components with a registered template set.
    fn list(&self) -> RailgenResult<Vec<Component>>;
}

/// Port for template rendering.
///
/// Implemented by `railgen_adapters::renderer::SimpleRenderer` (variable
/// substitution only).
pub trait TemplateRenderer: Send + Sync {
    /// Render a template set into a project structure rooted at
    /// `output_root`, keeping only files whose condition holds.
    fn render(
        &self,
        set: &TemplateSet,
        context: &RenderContext,
        features: &Features,
        output_root: &Path,
    ) -> RailgenResult<ProjectStructure>;
}

/// Port for external processes started during generation.
///
/// Implemented by `railgen_adapters::command::SystemCommandRunner`.
#[cfg_attr(test, automock)]
pub trait CommandRunner: Send + Sync {
    /// Run `program` to completion in `cwd`. Non-zero exit is an error.
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> RailgenResult<()>;

    /// Kill every process this runner started that is still alive.
    /// Returns how many were stopped; nothing running is not an error.
    fn halt_all(&self) -> RailgenResult<usize>;
}

/// Port for user-facing progress of a run.
///
/// Rollback notifications have no-op defaults so simple reporters only
/// implement the step callbacks.
pub trait Progress: Send + Sync {
    fn step_started(&self, name: &str, description: &str);

    fn step_finished(&self, name: &str);

    fn step_failed(&self, name: &str, error: &RailgenError);

    fn rollback_started(&self) {}

    fn rollback_finished(&self, _succeeded: bool) {}
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn step_started(&self, _name: &str, _description: &str) {}
    fn step_finished(&self, _name: &str) {}
    fn step_failed(&self, _name: &str, _error: &RailgenError) {}
}
