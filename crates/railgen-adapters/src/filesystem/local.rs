//! Local filesystem adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use railgen_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{RailgenError, RailgenResult},
};
use tracing::trace;
use walkdir::WalkDir;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> RailgenResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> RailgenResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_file(&self, path: &Path) -> RailgenResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn set_permissions(&self, path: &Path, executable: bool) -> RailgenResult<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if executable {
                let metadata =
                    std::fs::metadata(path).map_err(|e| map_io_error(path, e, "get metadata"))?;
                let mut perms = metadata.permissions();
                let mode = perms.mode();
                perms.set_mode(mode | 0o111);
                std::fs::set_permissions(path, perms)
                    .map_err(|e| map_io_error(path, e, "set permissions"))?;
            }
        }
        #[cfg(windows)]
        {
            // Windows doesn't have executable bit in the same way
            let _ = (path, executable);
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        // Dangling symlinks count as existing: they still need removal.
        path.symlink_metadata().is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> RailgenResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path).map_err(|e| map_io_error(path, e, "list directory"))?;
        entries
            .map(|entry| {
                entry
                    .map(|e| e.path())
                    .map_err(|e| map_io_error(path, e, "list directory"))
            })
            .collect()
    }

    fn remove_file(&self, path: &Path) -> RailgenResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn remove_dir_all(&self, path: &Path) -> RailgenResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }

    fn copy_dir_all(&self, from: &Path, to: &Path) -> RailgenResult<()> {
        std::fs::create_dir_all(to).map_err(|e| map_io_error(to, e, "create directory"))?;

        for entry in WalkDir::new(from).min_depth(1).follow_links(false) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(from).to_path_buf();
                let err = e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop"));
                map_io_error(&path, err, "walk directory")
            })?;

            let relative = entry
                .path()
                .strip_prefix(from)
                .map_err(|e| RailgenError::Internal {
                    message: format!("walkdir yielded a path outside its root: {e}"),
                })?;
            let dest = to.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                std::fs::create_dir_all(&dest)
                    .map_err(|e| map_io_error(&dest, e, "create directory"))?;
            } else if file_type.is_symlink() {
                copy_symlink(entry.path(), &dest)?;
            } else {
                std::fs::copy(entry.path(), &dest)
                    .map_err(|e| map_io_error(entry.path(), e, "copy file"))?;
            }
            trace!(from = %entry.path().display(), to = %dest.display(), "Copied");
        }
        Ok(())
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> RailgenResult<()> {
    let target = std::fs::read_link(src).map_err(|e| map_io_error(src, e, "read link"))?;
    if dest.symlink_metadata().is_ok() {
        std::fs::remove_file(dest).map_err(|e| map_io_error(dest, e, "replace link"))?;
    }
    std::os::unix::fs::symlink(&target, dest).map_err(|e| map_io_error(dest, e, "create link"))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> RailgenResult<()> {
    // Fall back to copying what the link points at.
    std::fs::copy(src, dest)
        .map(|_| ())
        .map_err(|e| map_io_error(src, e, "copy file"))
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> RailgenError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn copy_dir_all_preserves_tree() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("a/b")).unwrap();
        std::fs::write(src.join("top.txt"), "top").unwrap();
        std::fs::write(src.join("a/b/deep.txt"), "deep").unwrap();
        std::fs::create_dir_all(src.join("empty")).unwrap();

        let fs = LocalFilesystem::new();
        let dest = tmp.path().join("dest");
        fs.copy_dir_all(&src, &dest).unwrap();

        assert_eq!(fs.read_file(&dest.join("top.txt")).unwrap(), "top");
        assert_eq!(fs.read_file(&dest.join("a/b/deep.txt")).unwrap(), "deep");
        assert!(fs.is_dir(&dest.join("empty")));
    }

    #[test]
    fn copy_dir_all_overwrites_existing_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(src.join("a.txt"), "orig").unwrap();
        std::fs::write(dest.join("a.txt"), "changed").unwrap();

        LocalFilesystem.copy_dir_all(&src, &dest).unwrap();
        assert_eq!(std::fs::read_to_string(dest.join("a.txt")).unwrap(), "orig");
    }

    #[test]
    fn removing_missing_paths_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        assert!(fs.remove_file(&tmp.path().join("nope")).is_err());
        assert!(fs.remove_dir_all(&tmp.path().join("nope")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_is_set() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let script = tmp.path().join("run");
        let fs = LocalFilesystem::new();
        fs.write_file(&script, "#!/bin/sh\n").unwrap();
        fs.set_permissions(&script, true).unwrap();
        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn list_dir_returns_children() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("x"), "").unwrap();
        std::fs::create_dir(tmp.path().join("y")).unwrap();
        let mut names: Vec<_> = LocalFilesystem
            .list_dir(tmp.path())
            .unwrap()
            .into_iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        assert_eq!(names, ["x", "y"]);
    }
}
