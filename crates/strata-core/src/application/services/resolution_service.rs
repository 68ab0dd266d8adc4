//! Resolution Service - dependency analysis use cases.
//!
//! Backs `analyze`, `resolve`, `tree` and `check`. Every call takes one
//! snapshot from the catalog and resolves against it; batch calls share
//! that snapshot across worker threads read-only.

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::{
    application::ports::EntityCatalog,
    domain::{
        DependencyResolver, DepthLimits, DomainError, EntityLookup, InheritanceResolution,
        InheritanceResolver, ResolutionResult, ResolutionValidator, ResolveOptions,
    },
    error::StrataResult,
};

use super::composition_service::CatalogTrees;

/// Outcome of `check`: dependency resolution plus, for templates, the
/// inheritance chain and its validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub resolution: ResolutionResult,
    /// `None` when the root extends nothing.
    pub inheritance: Option<InheritanceResolution>,
    /// First structural inheritance error, if any.
    pub inheritance_error: Option<DomainError>,
}

impl CheckReport {
    pub fn issue_count(&self) -> usize {
        self.resolution.issue_count()
            + self
                .inheritance
                .as_ref()
                .map_or(0, |i| i.warnings.len())
            + usize::from(self.inheritance_error.is_some())
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }
}

/// Dependency resolution service.
pub struct ResolutionService {
    catalog: Box<dyn EntityCatalog>,
    options: ResolveOptions,
    limits: DepthLimits,
}

impl ResolutionService {
    pub fn new(catalog: Box<dyn EntityCatalog>) -> Self {
        Self {
            catalog,
            options: ResolveOptions::default(),
            limits: DepthLimits::default(),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_depth_limits(mut self, limits: DepthLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Resolve one root.
    #[instrument(skip(self))]
    pub fn resolve(&self, root: &str) -> StrataResult<ResolutionResult> {
        let entities = self.catalog.entities()?;
        let result = DependencyResolver::new(self.options.clone()).resolve(root, &entities)?;
        info!(
            success = result.is_success(),
            order = result.install_order.len(),
            "Resolved dependencies"
        );
        Ok(result)
    }

    /// Resolve several roots in parallel over one snapshot.
    ///
    /// Results come back in the order of `roots`. The first hard error
    /// (unknown root, internal failure) fails the whole batch.
    #[instrument(skip_all, fields(roots = roots.len()))]
    pub fn resolve_all(&self, roots: &[String]) -> StrataResult<Vec<ResolutionResult>> {
        let entities = self.catalog.entities()?;
        let resolver = DependencyResolver::new(self.options.clone());

        let results = roots
            .par_iter()
            .map(|root| resolver.resolve(root, &entities))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            failed = results.iter().filter(|r| !r.is_success()).count(),
            "Batch resolution finished"
        );
        Ok(results)
    }

    /// Resolve every entity in the catalog, in id order.
    pub fn resolve_catalog(&self) -> StrataResult<Vec<ResolutionResult>> {
        let ids: Vec<String> = self
            .catalog
            .entities()?
            .ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.resolve_all(&ids)
    }

    /// Every known id, sorted.
    pub fn catalog_ids(&self) -> StrataResult<Vec<String>> {
        Ok(self.catalog.entities()?.keys().cloned().collect())
    }

    /// Dependency resolution plus inheritance validation for `root`.
    #[instrument(skip(self))]
    pub fn check(&self, root: &str) -> StrataResult<CheckReport> {
        let entities = self.catalog.entities()?;
        let resolution = DependencyResolver::new(self.options.clone()).resolve(root, &entities)?;

        let extends_something = entities
            .entity(root)
            .is_some_and(|e| !e.extends.is_empty());
        if !extends_something {
            return Ok(CheckReport {
                resolution,
                inheritance: None,
                inheritance_error: None,
            });
        }

        let inheritance = InheritanceResolver::new(self.limits).resolve(root, &entities)?;
        let validator = ResolutionValidator::new(self.limits);
        let trees = CatalogTrees::new(self.catalog.as_ref());

        let (inheritance, inheritance_error) =
            match validator.validate(&entities, inheritance.clone(), &trees) {
                Ok(validated) => (
                    InheritanceResolution {
                        warnings: validated.warnings,
                        ..inheritance
                    },
                    None,
                ),
                Err(e) => (inheritance, Some(e)),
            };

        Ok(CheckReport {
            resolution,
            inheritance: Some(inheritance),
            inheritance_error,
        })
    }
}
