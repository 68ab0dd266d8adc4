// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Strata.
//!
//! Pure resolution and composition logic. All I/O (reading manifests,
//! loading template files, writing output) is handled via ports defined in
//! the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: every call is synchronous and runs to completion
//! - **No I/O**: entity lookups and content trees are handed in by the caller
//! - **No global state**: each call builds its own graph and drops it
//! - **Read-only inputs**: nothing here mutates a caller's lookup
//!
pub mod entities;
pub mod error;
pub mod inheritance;
pub mod resolver;
pub mod value_objects;

mod validation;

pub use entities::{
    Conflict, ContentTree, ContentTreeProvider, Cycle, Dependency, Edge, Entity, EntityLookup,
    EntityMap, FileContent, MissingDependency, ProjectStructure, RelativePath, ResolutionResult,
    ResolutionWarning, entity_map,
    project_structure::{DirectoryToCreate, FileToWrite, FsEntry},
};

pub use error::{DomainError, ErrorCategory};

pub use inheritance::{
    Composition, CompositionEngine, DepthLimits, InheritanceChain, InheritanceResolution,
    InheritanceResolver, MergeNote,
};

pub use resolver::{
    ConflictResolver, ConstraintEvaluator, CycleDetector, DependencyGraph, DependencyResolver,
    GraphBuilder, ResolveOptions, TopologicalSorter,
};

pub use validation::{ResolutionValidator, ValidatedChain};
pub use value_objects::{CompositionStrategy, VersionConstraint};
