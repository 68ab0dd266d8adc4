//! In-memory filesystem adapter for testing and dry runs.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use strata_core::{
    application::{ApplicationError, ports::Filesystem},
    error::StrataResult,
};

/// In-memory filesystem. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a file's content.
    pub fn read_file(&self, path: &Path) -> Option<String> {
        self.inner.read().ok()?.files.get(path).cloned()
    }

    /// All files, sorted by path.
    pub fn list_files(&self) -> StrataResult<Vec<PathBuf>> {
        Ok(self.read()?.files.keys().cloned().collect())
    }

    /// Clear all contents.
    pub fn clear(&self) -> StrataResult<()> {
        let mut inner = self.write()?;
        inner.files.clear();
        inner.directories.clear();
        Ok(())
    }

    fn read(&self) -> StrataResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }

    fn write(&self) -> StrataResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> StrataResult<()> {
        let mut inner = self.write()?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> StrataResult<()> {
        let mut inner = self.write()?;

        let parent_missing = path
            .parent()
            .is_some_and(|p| !p.as_os_str().is_empty() && !inner.directories.contains(p));
        if parent_missing {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "Parent directory does not exist".into(),
            }
            .into());
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .is_ok_and(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
    }

    fn remove_dir_all(&self, path: &Path) -> StrataResult<()> {
        let mut inner = self.write()?;
        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("/out/a.txt"), "a").is_err());

        fs.create_dir_all(Path::new("/out")).unwrap();
        fs.write_file(Path::new("/out/a.txt"), "a").unwrap();
        assert_eq!(fs.read_file(Path::new("/out/a.txt")).as_deref(), Some("a"));
        assert!(fs.exists(Path::new("/")));
    }

    #[test]
    fn remove_dir_all_drops_subtree() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/out/src")).unwrap();
        fs.create_dir_all(Path::new("/keep")).unwrap();
        fs.write_file(Path::new("/out/src/main.rs"), "").unwrap();
        fs.write_file(Path::new("/keep/x"), "").unwrap();

        fs.remove_dir_all(Path::new("/out")).unwrap();
        assert!(!fs.exists(Path::new("/out/src")));
        assert_eq!(fs.list_files().unwrap(), vec![PathBuf::from("/keep/x")]);
    }

    #[test]
    fn clear_empties_the_store() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/a")).unwrap();
        fs.clear().unwrap();
        assert!(!fs.exists(Path::new("/a")));
    }
}
