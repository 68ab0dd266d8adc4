//! A composed tree laid out as concrete filesystem entries.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::domain::error::DomainError;

/// Everything a renderer wants written under `root`, in write order.
///
/// Entry paths are relative to `root`; [`validate`](Self::validate)
/// enforces that before anything touches the disk.
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

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn add_directory(&mut self, path: impl Into<PathBuf>) {
        self.entries
            .push(FsEntry::Directory(DirectoryToCreate { path: path.into() }));
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: String) {
        self.entries.push(FsEntry::File(FileToWrite {
            path: path.into(),
            content,
        }));
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen: HashSet<&Path> = HashSet::new();
        for path in self.entries.iter().map(FsEntry::path) {
            if path.is_absolute() {
                return Err(DomainError::AbsolutePathNotAllowed {
                    path: path.display().to_string(),
                });
            }
            if !seen.insert(path) {
                return Err(DomainError::DuplicatePath {
                    path: path.display().to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[FsEntry] {
        &self.entries
    }

    pub fn files(&self) -> impl Iterator<Item = &FileToWrite> {
        self.entries.iter().filter_map(|entry| match entry {
            FsEntry::File(file) => Some(file),
            FsEntry::Directory(_) => None,
        })
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all file contents, in bytes.
    pub fn total_bytes(&self) -> usize {
        self.files().map(|f| f.content.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub enum FsEntry {
    File(FileToWrite),
    Directory(DirectoryToCreate),
}

impl FsEntry {
    pub fn path(&self) -> &Path {
        match self {
            Self::File(file) => &file.path,
            Self::Directory(dir) => &dir.path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileToWrite {
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct DirectoryToCreate {
    pub path: PathBuf,
}
