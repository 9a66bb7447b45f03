//! The rollback record: everything needed to undo one generation run.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Lifecycle of a run's rollback record.
///
/// `NotStarted → InProgress → Completed | Failed`. Terminal states are
/// final; a new run needs a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl RunState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record per generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackRecord {
    run_id: Uuid,
    target_path: PathBuf,
    created_files: Vec<PathBuf>,
    created_directories: Vec<PathBuf>,
    git_initialized: bool,
    started_at: DateTime<Utc>,
    state: RunState,
}

impl RollbackRecord {
    pub fn new(target_path: impl Into<PathBuf>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            target_path: target_path.into(),
            created_files: Vec::new(),
            created_directories: Vec::new(),
            git_initialized: false,
            started_at: Utc::now(),
            state: RunState::NotStarted,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn created_files(&self) -> &[PathBuf] {
        &self.created_files
    }

    pub fn created_directories(&self) -> &[PathBuf] {
        &self.created_directories
    }

    pub fn git_initialized(&self) -> bool {
        self.git_initialized
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn mark_git_initialized(&mut self) {
        self.git_initialized = true;
    }

    pub(crate) fn extend_files(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        self.created_files.extend(paths);
    }

    pub(crate) fn extend_directories(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        self.created_directories.extend(paths);
    }

    /// Recorded paths that live outside the project root.
    ///
    /// Everything under the root disappears with the root itself; only these
    /// need individual deletion during rollback.
    pub fn files_outside_target(&self) -> impl Iterator<Item = &Path> {
        self.created_files
            .iter()
            .map(PathBuf::as_path)
            .filter(|p| !p.starts_with(&self.target_path))
    }

    pub fn directories_outside_target(&self) -> impl Iterator<Item = &Path> {
        self.created_directories
            .iter()
            .map(PathBuf::as_path)
            .filter(|p| !p.starts_with(&self.target_path))
    }

    pub fn start(&mut self) -> Result<(), DomainError> {
        self.transition(RunState::InProgress)
    }

    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.transition(RunState::Completed)
    }

    pub fn fail(&mut self) -> Result<(), DomainError> {
        self.transition(RunState::Failed)
    }

    fn transition(&mut self, to: RunState) -> Result<(), DomainError> {
        let allowed = matches!(
            (self.state, to),
            (RunState::NotStarted, RunState::InProgress)
                | (RunState::InProgress, RunState::Completed)
                | (RunState::InProgress, RunState::Failed)
        );
        if !allowed {
            return Err(DomainError::InvalidTransition {
                from: self.state.as_str(),
                to: to.as_str(),
            });
        }
        self.state = to;
        Ok(())
    }
}
