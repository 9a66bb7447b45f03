//! Backup store: pre-generation snapshots of an existing project directory.
//!
//! Layout on disk:
//!
//! ```text
//! <cwd>/.railgen-backup/
//! ├── backup-2026-10-15T09-30-00-123Z/     full recursive copy
//! └── backup-2026-10-15T09-30-00-123Z-2/   same-millisecond collision
//! ```
//!
//! No manifest is written; the directory name is the only metadata.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{ApplicationError, ports::Filesystem},
    domain::{
        BackupSnapshot,
        snapshot::{parse_snapshot_dir_name, snapshot_dir_name},
    },
    error::{RailgenError, RailgenResult},
};

/// Default name of the backup root, created under the working directory.
pub const DEFAULT_BACKUP_DIR: &str = ".railgen-backup";

/// A snapshot directory found under the backup root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnapshot {
    pub name: String,
    pub path: PathBuf,
    pub taken_at: DateTime<Utc>,
}

impl StoredSnapshot {
    /// Treat this stored copy as the backup of `source`.
    pub fn into_snapshot(self, source: impl Into<PathBuf>) -> BackupSnapshot {
        BackupSnapshot::new(source, self.path, self.taken_at)
    }
}

/// Holds at most one snapshot for the current run.
pub struct BackupStore {
    filesystem: Arc<dyn Filesystem>,
    root: PathBuf,
    current: Option<BackupSnapshot>,
}

impl std::fmt::Debug for BackupStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupStore")
            .field("root", &self.root)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl BackupStore {
    pub fn new(filesystem: Arc<dyn Filesystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            filesystem,
            root: root.into(),
            current: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The snapshot held for this run, if one was taken or attached.
    pub fn current(&self) -> Option<&BackupSnapshot> {
        self.current.as_ref()
    }

    /// Copy `target` into a fresh snapshot directory.
    ///
    /// No-op (returns `None`) when `target` does not exist. Any failure is
    /// reported as `BackupFailed` and leaves no partial snapshot behind.
    #[instrument(skip(self), fields(target = %target.display()))]
    pub fn snapshot(&mut self, target: &Path) -> RailgenResult<Option<BackupSnapshot>> {
        if !self.filesystem.exists(target) {
            debug!("Target does not exist, nothing to back up");
            return Ok(None);
        }

        let taken_at = Utc::now();
        let dest = self.unique_path(&snapshot_dir_name(taken_at));

        let copied = self
            .filesystem
            .create_dir_all(&self.root)
            .and_then(|()| self.filesystem.copy_dir_all(target, &dest));

        if let Err(e) = copied {
            if self.filesystem.exists(&dest) {
                if let Err(cleanup) = self.filesystem.remove_dir_all(&dest) {
                    warn!(path = %dest.display(), error = %cleanup, "Could not remove partial snapshot");
                }
            }
            return Err(ApplicationError::BackupFailed {
                path: target.to_path_buf(),
                reason: e.to_string(),
            }
            .into());
        }

        info!(snapshot = %dest.display(), "Backup created");
        let snapshot = BackupSnapshot::new(target, dest, taken_at);
        self.current = Some(snapshot.clone());
        Ok(Some(snapshot))
    }

    /// Copy the held snapshot back onto `target`.
    ///
    /// Returns `false` when there is nothing to restore.
    #[instrument(skip(self), fields(target = %target.display()))]
    pub fn restore(&self, target: &Path) -> RailgenResult<bool> {
        let Some(snapshot) = &self.current else {
            return Ok(false);
        };
        if !self.filesystem.exists(snapshot.snapshot_path()) {
            warn!(snapshot = %snapshot.snapshot_path().display(), "Snapshot vanished, nothing to restore");
            return Ok(false);
        }

        self.filesystem
            .copy_dir_all(snapshot.snapshot_path(), target)?;
        info!("Restored backup");
        Ok(true)
    }

    /// Delete the held snapshot. Safe to call when none is held.
    pub fn discard(&mut self) -> RailgenResult<()> {
        let Some(snapshot) = self.current.take() else {
            return Ok(());
        };
        let path = snapshot.snapshot_path().to_path_buf();
        if self.filesystem.exists(&path) {
            if let Err(e) = self.filesystem.remove_dir_all(&path) {
                self.current = Some(snapshot);
                return Err(e);
            }
            debug!(snapshot = %path.display(), "Cleaned up backup");
        }
        Ok(())
    }

    /// Adopt a snapshot found on disk, replacing any held one.
    pub fn attach(&mut self, snapshot: BackupSnapshot) {
        self.current = Some(snapshot);
    }

    /// Snapshot directories under the backup root, oldest first.
    ///
    /// Entries whose names do not parse as snapshot names are ignored. A
    /// missing root yields an empty list.
    pub fn list_snapshots(&self) -> RailgenResult<Vec<StoredSnapshot>> {
        if !self.filesystem.is_dir(&self.root) {
            return Ok(Vec::new());
        }

        let mut found: Vec<StoredSnapshot> = self
            .filesystem
            .list_dir(&self.root)?
            .into_iter()
            .filter(|p| self.filesystem.is_dir(p))
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_string();
                let taken_at = parse_snapshot_dir_name(&name)?;
                Some(StoredSnapshot {
                    name,
                    path,
                    taken_at,
                })
            })
            .collect();

        found.sort_by(|a, b| a.taken_at.cmp(&b.taken_at).then_with(|| a.name.cmp(&b.name)));
        Ok(found)
    }

    /// Look up a stored snapshot by directory name.
    pub fn find_snapshot(&self, name: &str) -> RailgenResult<StoredSnapshot> {
        self.list_snapshots()?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| {
                RailgenError::from(ApplicationError::SnapshotNotFound {
                    name: name.to_string(),
                    root: self.root.clone(),
                })
            })
    }

    /// First free path for `name`, suffixing `-2`, `-3`, ... when taken.
    fn unique_path(&self, name: &str) -> PathBuf {
        let first = self.root.join(name);
        if !self.filesystem.exists(&first) {
            return first;
        }
        let mut n = 2u32;
        loop {
            let candidate = self.root.join(format!("{name}-{n}"));
            if !self.filesystem.exists(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
