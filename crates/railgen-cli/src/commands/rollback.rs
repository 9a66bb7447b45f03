//! Implementation of the `railgen rollback` command.
//!
//! Restores a project directory from a snapshot left under the backup root
//! by an earlier run. The project path is removed first and the snapshot
//! copied back in its place; the snapshot is deleted only when that
//! succeeds.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use railgen_adapters::{LocalFilesystem, SystemCommandRunner};
use railgen_core::{
    application::{BackupStore, RollbackEngine, services::StoredSnapshot},
    domain::RollbackRecord,
};

use crate::{
    cli::RollbackArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
    prompts,
};

/// Execute the `railgen rollback` command.
#[instrument(skip_all)]
pub fn execute(args: RollbackArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let Some(project_path) = args.project_path.as_deref() else {
        output.warning("No rollback information available")?;
        output.info("Pass --project-path to restore a project from its last backup")?;
        return Ok(());
    };

    let cwd = std::env::current_dir().with_cli_context(|| "cannot read the working directory")?;
    let target = absolute(&cwd, project_path);

    let filesystem = Arc::new(LocalFilesystem::new());
    let mut backup = BackupStore::new(filesystem.clone(), config.backup_root(&cwd));

    let Some(stored) = select_snapshot(&backup, &args)? else {
        warn!(root = %backup.root().display(), "No snapshots found");
        output.warning(&format!(
            "No backups found under {}",
            backup.root().display()
        ))?;
        return Ok(());
    };

    output.table(&[
        ("Project", target.display().to_string()),
        ("Snapshot", stored.name.clone()),
        ("Taken at", stored.taken_at.to_rfc3339()),
    ])?;

    if !args.yes
        && !prompts::confirm(&format!(
            "Replace {} with this snapshot?",
            target.display()
        ))?
    {
        return Err(CliError::Cancelled);
    }

    info!(snapshot = %stored.name, target = %target.display(), "Restoring snapshot");
    backup.attach(stored.into_snapshot(&target));

    let engine = RollbackEngine::new(filesystem, Arc::new(SystemCommandRunner::new()));
    engine
        .rollback(&RollbackRecord::new(&target), &backup)
        .map_err(|e| CliError::Core(e.into()))?;

    if let Err(e) = backup.discard() {
        warn!(error = %e, "Could not remove the restored snapshot");
        output.warning(&format!("Snapshot kept on disk: {e}"))?;
    }

    output.success(&format!("Rolled back {}", target.display()))?;
    Ok(())
}

/// `--snapshot NAME` if given, otherwise the newest stored snapshot.
fn select_snapshot(backup: &BackupStore, args: &RollbackArgs) -> CliResult<Option<StoredSnapshot>> {
    if let Some(name) = &args.snapshot {
        return Ok(Some(backup.find_snapshot(name)?));
    }
    Ok(backup.list_snapshots()?.pop())
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
