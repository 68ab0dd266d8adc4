//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use strata_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{StrataError, StrataResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> StrataResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> StrataResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_dir_all(&self, path: &Path) -> StrataResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> StrataError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_removes_a_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("out");
        let fs = LocalFilesystem::new();

        fs.create_dir_all(&root.join("src")).unwrap();
        fs.write_file(&root.join("src/main.rs"), "fn main() {}").unwrap();
        assert!(fs.exists(&root.join("src/main.rs")));
        assert_eq!(
            std::fs::read_to_string(root.join("src/main.rs")).unwrap(),
            "fn main() {}"
        );

        fs.remove_dir_all(&root).unwrap();
        assert!(!fs.exists(&root));
    }

    #[test]
    fn io_errors_carry_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing/parent/file.txt");

        let err = LocalFilesystem.write_file(&target, "x").unwrap_err();
        match err {
            StrataError::Application(ApplicationError::FilesystemError { path, reason }) => {
                assert_eq!(path, target);
                assert!(reason.starts_with("Failed to write file"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
