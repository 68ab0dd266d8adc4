//! Catalog adapters.
//!
//! Two on-disk layouts are supported:
//!
//! - a single TOML manifest holding every entity and its files
//!   ([`ManifestLoader`], loaded into an [`InMemoryCatalog`]);
//! - a templates directory with one subdirectory per template
//!   ([`DirectoryCatalog`]), whose content trees are read on demand.

mod directory;
mod manifest;
mod memory;
mod schema;

pub use directory::DirectoryCatalog;
pub use manifest::ManifestLoader;
pub use memory::InMemoryCatalog;
pub use schema::SchemaError;
