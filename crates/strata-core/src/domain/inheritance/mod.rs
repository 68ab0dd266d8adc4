//! Template inheritance: `extends` linearization and content composition.

pub mod composition;
pub mod resolver;

pub use composition::{Composition, CompositionEngine, MergeNote};
pub use resolver::{DepthLimits, InheritanceChain, InheritanceResolution, InheritanceResolver};
