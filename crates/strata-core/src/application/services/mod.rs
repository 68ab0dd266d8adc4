//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "resolve a plugin" or "compose a template".

pub mod composition_service;
pub mod resolution_service;

pub use composition_service::{ComposeOutcome, CompositionService};
pub use resolution_service::{CheckReport, ResolutionService};
