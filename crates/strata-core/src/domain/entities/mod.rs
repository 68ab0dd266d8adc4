pub mod common;
pub mod content_tree;
pub mod entity;
pub mod project_structure;
pub mod resolution;

pub use crate::domain::DomainError;
pub use common::RelativePath;
pub use content_tree::{ContentTree, ContentTreeProvider, FileContent};
pub use entity::{Dependency, Entity, EntityLookup, EntityMap, entity_map};
pub use project_structure::ProjectStructure;
pub use resolution::{Conflict, Cycle, Edge, MissingDependency, ResolutionResult, ResolutionWarning};
