//! Application layer for Strata.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ResolutionService, CompositionService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! resolution logic itself. All of that lives in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    CheckReport, ComposeOutcome, CompositionService, ResolutionService,
};

// Re-export port traits (for adapter implementation)
pub use ports::{ContentRenderer, EntityCatalog, Filesystem};

pub use error::ApplicationError;
