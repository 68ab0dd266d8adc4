//! Composition Service - template inheritance use cases.
//!
//! This service coordinates the composition workflow:
//! 1. Resolve the `extends` chain of a template
//! 2. Validate it and load every content tree
//! 3. Fold the trees with the chosen strategy
//! 4. Optionally render and write the result, rolling back on failure

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{ContentRenderer, EntityCatalog, Filesystem},
    },
    domain::{
        Composition, CompositionEngine, CompositionStrategy, ContentTree, ContentTreeProvider,
        DepthLimits, FsEntry, InheritanceChain, InheritanceResolution, InheritanceResolver,
        ProjectStructure, ResolutionValidator, ResolutionWarning,
    },
    error::{StrataError, StrataResult},
};

/// Result of composing one template.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeOutcome {
    pub chain: InheritanceChain,
    pub strategy: CompositionStrategy,
    pub composition: Composition,
    pub warnings: Vec<ResolutionWarning>,
}

/// Adapts the catalog port to the domain's content provider.
///
/// Load failures are logged and reported as an absent tree, which the
/// validator turns into `MissingContentTree`.
pub(crate) struct CatalogTrees<'a> {
    catalog: &'a dyn EntityCatalog,
}

impl<'a> CatalogTrees<'a> {
    pub(crate) fn new(catalog: &'a dyn EntityCatalog) -> Self {
        Self { catalog }
    }
}

impl ContentTreeProvider for CatalogTrees<'_> {
    fn content_tree(&self, id: &str) -> Option<ContentTree> {
        match self.catalog.content_tree(id) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(%id, error = %e, "Content tree failed to load");
                None
            }
        }
    }
}

/// Template composition service.
pub struct CompositionService {
    catalog: Box<dyn EntityCatalog>,
    renderer: Box<dyn ContentRenderer>,
    filesystem: Box<dyn Filesystem>,
    limits: DepthLimits,
}

impl CompositionService {
    /// Create a new composition service with the given adapters.
    pub fn new(
        catalog: Box<dyn EntityCatalog>,
        renderer: Box<dyn ContentRenderer>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            catalog,
            renderer,
            filesystem,
            limits: DepthLimits::default(),
        }
    }

    pub fn with_depth_limits(mut self, limits: DepthLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Resolve and structurally validate the chain of `child`, without
    /// loading any content.
    #[instrument(skip(self))]
    pub fn inherit(&self, child: &str) -> StrataResult<InheritanceResolution> {
        let entities = self.catalog.entities()?;
        let mut resolution = InheritanceResolver::new(self.limits).resolve(child, &entities)?;
        ResolutionValidator::new(self.limits).check(&entities, &mut resolution)?;
        info!(chain = %resolution.chain, "Inheritance chain resolved");
        Ok(resolution)
    }

    /// Compose `child` in memory.
    ///
    /// All-or-nothing: any resolution or validation failure is returned as
    /// an error and no partial tree is produced.
    #[instrument(skip_all, fields(child = %child, strategy = %strategy))]
    pub fn compose(&self, child: &str, strategy: CompositionStrategy) -> StrataResult<ComposeOutcome> {
        let entities = self.catalog.entities()?;
        let resolution = InheritanceResolver::new(self.limits).resolve(child, &entities)?;
        let trees = CatalogTrees::new(self.catalog.as_ref());
        let validated = ResolutionValidator::new(self.limits).validate(&entities, resolution, &trees)?;

        let composition = CompositionEngine::compose(&validated, strategy);
        info!(
            files = composition.tree.len(),
            notes = composition.notes.len(),
            "Composition complete"
        );

        Ok(ComposeOutcome {
            chain: validated.chain,
            strategy,
            composition,
            warnings: validated.warnings,
        })
    }

    /// Compose several templates in parallel. Each entry succeeds or fails
    /// on its own.
    pub fn compose_all(
        &self,
        children: &[String],
        strategy: CompositionStrategy,
    ) -> Vec<(String, StrataResult<ComposeOutcome>)> {
        children
            .par_iter()
            .map(|child| (child.clone(), self.compose(child, strategy)))
            .collect()
    }

    /// Compose `child` and write the result under `output`.
    #[instrument(
        skip_all,
        fields(child = %child, strategy = %strategy, output = %output.as_ref().display())
    )]
    pub fn compose_to(
        &self,
        child: &str,
        strategy: CompositionStrategy,
        output: impl AsRef<Path>,
    ) -> StrataResult<ComposeOutcome> {
        let outcome = self.compose(child, strategy)?;
        let structure = self.renderer.render(&outcome.composition.tree, output.as_ref())?;
        structure.validate().map_err(StrataError::Domain)?;
        self.write_structure(&structure)?;
        Ok(outcome)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Write project structure to filesystem with rollback on failure.
    fn write_structure(&self, structure: &ProjectStructure) -> StrataResult<()> {
        if self.filesystem.exists(structure.root()) {
            return Err(ApplicationError::OutputExists {
                path: structure.root().clone(),
            }
            .into());
        }

        match self.write_all(structure) {
            Ok(()) => {
                info!(
                    entries = structure.entry_count(),
                    bytes = structure.total_bytes(),
                    "Wrote composed tree"
                );
                Ok(())
            }
            Err(e) => {
                warn!("Write failed, attempting rollback");
                self.rollback(structure.root());
                Err(e)
            }
        }
    }

    fn write_all(&self, structure: &ProjectStructure) -> StrataResult<()> {
        let root: &PathBuf = structure.root();
        self.filesystem.create_dir_all(root)?;

        for entry in structure.entries() {
            match entry {
                FsEntry::Directory(dir) => {
                    self.filesystem.create_dir_all(&root.join(&dir.path))?;
                }
                FsEntry::File(file) => {
                    let path = root.join(&file.path);
                    if let Some(parent) = path.parent() {
                        self.filesystem.create_dir_all(parent)?;
                    }
                    self.filesystem.write_file(&path, &file.content)?;
                }
            }
        }

        Ok(())
    }

    /// Best-effort rollback on failure.
    fn rollback(&self, root: &Path) {
        if let Err(e) = self.filesystem.remove_dir_all(root) {
            warn!(
                error = %e,
                path = %root.display(),
                "Rollback failed"
            );
        } else {
            info!("Rollback successful");
        }
    }
}
