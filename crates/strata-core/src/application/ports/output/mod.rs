//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `strata-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{ContentTree, EntityMap, ProjectStructure};
use crate::error::StrataResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `strata_adapters::filesystem::LocalFilesystem` (production)
/// - `strata_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StrataResult<()>;

    /// Write content to a file.
    fn write_file(&self, path: &Path, content: &str) -> StrataResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> StrataResult<()>;
}

/// Port for the plugin/template catalog.
///
/// Implemented by:
/// - `strata_adapters::catalog::InMemoryCatalog` (tests, embedding, and
///   single-manifest catalogs via `ManifestLoader`)
/// - `strata_adapters::catalog::DirectoryCatalog` (one directory per template)
///
/// `entities` returns an owned snapshot. Callers resolve against that
/// snapshot, so concurrent resolutions never observe a catalog mid-update.
#[cfg_attr(test, mockall::automock)]
pub trait EntityCatalog: Send + Sync {
    /// Snapshot of every entity, keyed by id.
    fn entities(&self) -> StrataResult<EntityMap>;

    /// Content tree of one entity. `Ok(None)` means the entity has no
    /// content registered; `Err` means loading it failed.
    fn content_tree(&self, id: &str) -> StrataResult<Option<ContentTree>>;
}

/// Port for turning a composed tree into files.
///
/// Implemented by:
/// - `strata_adapters::renderer::FormatRenderer` (structured content encoded
///   by file extension)
#[cfg_attr(test, mockall::automock)]
pub trait ContentRenderer: Send + Sync {
    /// Lay out `tree` under `output_root`.
    fn render(&self, tree: &ContentTree, output_root: &Path) -> StrataResult<ProjectStructure>;
}
