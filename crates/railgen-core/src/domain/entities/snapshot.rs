use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of every snapshot directory under the backup root.
pub const SNAPSHOT_PREFIX: &str = "backup-";

const NAME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";

/// A full recursive copy of a pre-existing project directory, taken before
/// any generator step mutated it.
///
/// The directory name encodes the timestamp; there is no manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSnapshot {
    source_path: PathBuf,
    snapshot_path: PathBuf,
    taken_at: DateTime<Utc>,
}

impl BackupSnapshot {
    pub fn new(
        source_path: impl Into<PathBuf>,
        snapshot_path: impl Into<PathBuf>,
        taken_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            snapshot_path: snapshot_path.into(),
            taken_at,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}

/// Directory name for a snapshot taken at `at`, e.g.
/// `backup-2026-10-15T09-30-00-123Z`.
pub fn snapshot_dir_name(at: DateTime<Utc>) -> String {
    format!("{SNAPSHOT_PREFIX}{}", at.format(NAME_FORMAT))
}

/// Recover the timestamp from a snapshot directory name.
///
/// Names carrying a collision suffix (`...Z-2`) parse to the same instant.
pub fn parse_snapshot_dir_name(name: &str) -> Option<DateTime<Utc>> {
    let stamp = name.strip_prefix(SNAPSHOT_PREFIX)?;
    let stamp = match stamp.find('Z') {
        Some(idx) => &stamp[..=idx],
        None => return None,
    };
    NaiveDateTime::parse_from_str(stamp, NAME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
