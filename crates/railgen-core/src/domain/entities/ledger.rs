use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::entities::record::RollbackRecord;

/// Append-only record of every file and directory created during a run.
///
/// Generator steps report into the ledger right after each successful
/// write; the orchestrator flushes it into the [`RollbackRecord`] between
/// steps so rollback has a complete undo list even when a later, unrelated
/// step fails. Pure in-memory; appends never fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationLedger {
    files: Vec<PathBuf>,
    directories: Vec<PathBuf>,
}

impl CreationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a created file. No existence check is made.
    pub fn record_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        debug!(path = %path.display(), "Tracked file");
        self.files.push(path);
    }

    /// Record a created directory. No existence check is made.
    pub fn record_directory(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        debug!(path = %path.display(), "Tracked directory");
        self.directories.push(path);
    }

    /// Files recorded so far, in creation order.
    ///
    /// Returns an owned copy; mutating it does not affect the ledger.
    pub fn files(&self) -> Vec<PathBuf> {
        self.files.clone()
    }

    /// Directories recorded so far, in creation order.
    pub fn directories(&self) -> Vec<PathBuf> {
        self.directories.clone()
    }

    /// Whether `path` was recorded as a file or directory.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|p| p == path) || self.directories.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.files.len() + self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }

    /// Append everything recorded so far to `record`, then clear the ledger.
    pub fn flush_into(&mut self, record: &mut RollbackRecord) {
        record.extend_files(self.files.drain(..));
        record.extend_directories(self.directories.drain(..));
    }

    /// Clear both sequences for reuse by a subsequent run.
    pub fn reset(&mut self) {
        self.files.clear();
        self.directories.clear();
    }
}
