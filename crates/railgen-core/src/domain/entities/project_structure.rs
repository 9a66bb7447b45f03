use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::domain::{
    entities::common::{Permissions, RelativePath},
    error::DomainError,
};

/// Rendered output of one template set, ready for materialization.
///
/// Entry paths are relative to `root`. Order matters: directories are
/// listed before the files that live in them, and the writer creates
/// entries in this order so the ledger mirrors creation order.
#[derive(Debug, Clone)]
pub struct ProjectStructure {
    pub(crate) root: PathBuf,
    pub(crate) entries: Vec<FsEntry>,
}

impl ProjectStructure {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&mut self, path: RelativePath, content: String, perms: Permissions) {
        self.entries.push(FsEntry::File(FileToWrite {
            path,
            content,
            permissions: perms,
        }));
    }

    pub fn add_directory(&mut self, path: RelativePath) {
        self.entries
            .push(FsEntry::Directory(DirectoryToCreate { path }));
    }

    pub fn with_file(mut self, path: &str, content: impl Into<String>, perms: Permissions) -> Self {
        self.add_file(RelativePath::new(path), content.into(), perms);
        self
    }

    pub fn with_directory(mut self, path: &str) -> Self {
        self.add_directory(RelativePath::new(path));
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.entries.is_empty() {
            return Err(DomainError::InvalidTemplate(
                "Project structure is empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            let path = entry.path();
            if !seen.insert(path.as_str()) {
                return Err(DomainError::DuplicatePath {
                    path: path.to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn entries(&self) -> &[FsEntry] {
        &self.entries
    }

    pub fn files(&self) -> impl Iterator<Item = &FileToWrite> {
        self.entries.iter().filter_map(|e| match e {
            FsEntry::File(f) => Some(f),
            _ => None,
        })
    }

    pub fn directories(&self) -> impl Iterator<Item = &DirectoryToCreate> {
        self.entries.iter().filter_map(|e| match e {
            FsEntry::Directory(d) => Some(d),
            _ => None,
        })
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone)]
pub enum FsEntry {
    File(FileToWrite),
    Directory(DirectoryToCreate),
}

impl FsEntry {
    pub fn path(&self) -> &RelativePath {
        match self {
            Self::File(f) => &f.path,
            Self::Directory(d) => &d.path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileToWrite {
    pub path: RelativePath,
    pub content: String,
    pub permissions: Permissions,
}

impl FileToWrite {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryToCreate {
    pub path: RelativePath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_keeps_insertion_order() {
        let structure = ProjectStructure::new("/tmp/shop/backend")
            .with_directory("app")
            .with_file("app/x.rb", "", Permissions::Regular)
            .with_file("bin/rails", "#!/bin/sh", Permissions::Executable);

        assert_eq!(structure.entry_count(), 3);
        assert_eq!(structure.directories().count(), 1);
        let paths: Vec<_> = structure.entries().iter().map(|e| e.path().as_str()).collect();
        assert_eq!(paths, ["app", "app/x.rb", "bin/rails"]);
        assert!(structure.files().nth(1).unwrap().permissions.is_executable());
    }

    #[test]
    fn duplicates_are_rejected() {
        let structure = ProjectStructure::new("/tmp/test")
            .with_file("main.rb", "", Permissions::Regular)
            .with_file("main.rb", "", Permissions::Regular);
        assert!(matches!(
            structure.validate(),
            Err(DomainError::DuplicatePath { .. })
        ));
    }

    #[test]
    fn empty_structure_is_invalid() {
        assert!(ProjectStructure::new("/tmp/test").validate().is_err());
    }
}
