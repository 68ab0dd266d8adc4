//! Strata Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Strata:
//! plugin dependency resolution and template inheritance/composition,
//! following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           strata-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (ResolutionService, CompositionService) │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Driven: Catalog, Filesystem, Renderer) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     strata-adapters (Infrastructure)    │
//! │ (DirectoryCatalog, LocalFilesystem, etc)│
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (Resolver, Inheritance, Composition)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use semver::Version;
//! use strata_core::domain::{Dependency, DependencyResolver, Entity, entity_map};
//!
//! let catalog = entity_map([
//!     Entity::new("app", Version::new(1, 0, 0))
//!         .with_dependency(Dependency::parse("logger", "^1.0.0").unwrap()),
//!     Entity::new("logger", Version::new(1, 2, 0)),
//! ])
//! .unwrap();
//!
//! let result = DependencyResolver::default().resolve("app", &catalog).unwrap();
//! assert!(result.is_success());
//! assert_eq!(result.install_order, vec!["logger", "app"]);
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        CheckReport, ComposeOutcome, CompositionService, ResolutionService,
        ports::{ContentRenderer, EntityCatalog, Filesystem},
    };
    pub use crate::domain::{
        CompositionStrategy, ContentTree, Dependency, DepthLimits, Entity, EntityMap,
        FileContent, InheritanceChain, ProjectStructure, RelativePath, ResolutionResult,
        ResolutionWarning, ResolveOptions, VersionConstraint,
    };
    pub use crate::error::{StrataError, StrataResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
