//! Infrastructure adapters for Strata.
//!
//! This crate implements the ports defined in `strata-core::application::ports`
//! and the report renderers used by the CLI. It contains all I/O.

pub mod catalog;
pub mod filesystem;
pub mod renderer;
pub mod report;

// Re-export commonly used adapters
pub use catalog::{DirectoryCatalog, InMemoryCatalog, ManifestLoader};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::FormatRenderer;
pub use report::{DependencyTree, render_dot};
