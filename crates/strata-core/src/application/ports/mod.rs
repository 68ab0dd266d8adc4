//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `strata-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `EntityCatalog`: Plugin/template metadata and content trees
//!   - `ContentRenderer`: Content tree to files
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{ContentRenderer, EntityCatalog, Filesystem};

#[cfg(test)]
pub use output::{MockContentRenderer, MockEntityCatalog, MockFilesystem};
