//! In-memory filesystem adapter for testing.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use railgen_core::{
    application::{ApplicationError, ports::Filesystem},
    error::RailgenResult,
};

/// In-memory filesystem for testing.
///
/// Clones share state. Paths listed in `deny_writes` reject every mutating
/// call underneath them, which lets tests simulate permission failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
    executables: HashSet<PathBuf>,
    read_only: HashSet<PathBuf>,
}

impl MemoryFilesystemInner {
    fn check_writable(&self, path: &Path) -> RailgenResult<()> {
        if self.read_only.iter().any(|ro| path.starts_with(ro)) {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "permission denied".into(),
            }
            .into());
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every path under `path` reject writes and removals.
    pub fn deny_writes(&self, path: impl Into<PathBuf>) {
        self.write().read_only.insert(path.into());
    }

    pub fn allow_writes(&self, path: &Path) {
        self.write().read_only.remove(path);
    }

    /// Check if a file is marked executable.
    pub fn is_executable(&self, path: &Path) -> bool {
        self.read().executables.contains(path)
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.read().files.keys().cloned().collect();
        files.sort();
        files
    }

    /// Files under `root` with their contents, for whole-tree comparisons.
    pub fn snapshot_tree(&self, root: &Path) -> Vec<(PathBuf, String)> {
        let mut tree: Vec<(PathBuf, String)> = self
            .read()
            .files
            .iter()
            .filter(|(p, _)| p.starts_with(root))
            .map(|(p, c)| (p.clone(), c.clone()))
            .collect();
        tree.sort();
        tree
    }

    /// Clear all contents.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.files.clear();
        inner.directories.clear();
        inner.executables.clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryFilesystemInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryFilesystemInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(path: &Path) -> railgen_core::error::RailgenError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: "No such file or directory".into(),
    }
    .into()
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> RailgenResult<()> {
        let mut inner = self.write();
        inner.check_writable(path)?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> RailgenResult<()> {
        let mut inner = self.write();
        inner.check_writable(path)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn read_file(&self, path: &Path) -> RailgenResult<String> {
        self.read()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn set_permissions(&self, path: &Path, executable: bool) -> RailgenResult<()> {
        let mut inner = self.write();
        if !inner.files.contains_key(path) {
            return Err(not_found(path));
        }
        if executable {
            inner.executables.insert(path.to_path_buf());
        } else {
            inner.executables.remove(path);
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.read().exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.read().directories.contains(path)
    }

    fn list_dir(&self, path: &Path) -> RailgenResult<Vec<PathBuf>> {
        let inner = self.read();
        if !inner.directories.contains(path) {
            return Err(not_found(path));
        }
        let children = inner
            .files
            .keys()
            .chain(inner.directories.iter())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        Ok(children)
    }

    fn remove_file(&self, path: &Path) -> RailgenResult<()> {
        let mut inner = self.write();
        inner.check_writable(path)?;
        if inner.files.remove(path).is_none() {
            return Err(not_found(path));
        }
        inner.executables.remove(path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> RailgenResult<()> {
        let mut inner = self.write();
        inner.check_writable(path)?;
        if !inner.directories.contains(path) {
            return Err(not_found(path));
        }

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        inner.executables.retain(|p| !p.starts_with(path));
        Ok(())
    }

    fn copy_dir_all(&self, from: &Path, to: &Path) -> RailgenResult<()> {
        let mut inner = self.write();
        inner.check_writable(to)?;
        if !inner.directories.contains(from) {
            return Err(not_found(from));
        }

        let rebase = |p: &Path| p.strip_prefix(from).ok().map(|rel| to.join(rel));

        let dirs: Vec<PathBuf> = inner
            .directories
            .iter()
            .filter_map(|p| rebase(p))
            .collect();
        let files: Vec<(PathBuf, String, bool)> = inner
            .files
            .iter()
            .filter_map(|(p, c)| rebase(p).map(|dest| (dest, c.clone(), inner.executables.contains(p))))
            .collect();

        let mut current = PathBuf::new();
        for component in to.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }
        inner.directories.extend(dirs);
        for (dest, content, executable) in files {
            if executable {
                inner.executables.insert(dest.clone());
            }
            inner.files.insert(dest, content);
        }
        Ok(())
    }
}
