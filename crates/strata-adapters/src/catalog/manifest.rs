//! Single-file TOML manifest loader.
//!
//! # Format
//!
//! ```toml
//! [[entity]]
//! id      = "base"
//! version = "1.0.0"
//!
//! [entity.files]
//! "README.md"   = "# Project\n"
//! "config.yaml" = { server = { port = 80 } }   # table -> structured
//!
//! [[entity]]
//! id      = "web"
//! version = "1.2.0"
//! extends = ["base"]
//!
//! [[entity.dependencies]]
//! id         = "logger"
//! constraint = "^1.0.0"
//! optional   = false
//! ```
//!
//! Entities without a `files` table have no content tree; that is fine
//! for plugins and only becomes an error when such an entity is composed.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument};

use strata_core::{
    application::ApplicationError,
    domain::{ContentTree, RelativePath, entity_map},
    error::StrataResult,
};

use super::{
    InMemoryCatalog,
    schema::{EntitySection, SchemaError, inline_content},
};

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    entity: Vec<ManifestEntity>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntity {
    #[serde(flatten)]
    section: EntitySection,
    #[serde(default)]
    files: Option<BTreeMap<String, toml::Value>>,
}

/// Loads a manifest file into an [`InMemoryCatalog`].
pub struct ManifestLoader {
    path: PathBuf,
}

impl ManifestLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the manifest.
    ///
    /// # Errors
    ///
    /// `CatalogLoad` when the file cannot be read, is not valid TOML, or
    /// describes an invalid entity (bad id, version, constraint or file
    /// path, or an id defined twice).
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> StrataResult<InMemoryCatalog> {
        let raw = fs::read_to_string(&self.path).map_err(|e| self.error(e.to_string()))?;
        let catalog = Self::parse(&raw).map_err(|e| self.error(e))?;
        debug!(entities = catalog.len()?, "Manifest loaded");
        Ok(catalog)
    }

    /// Decode manifest text without touching the filesystem.
    pub fn parse(text: &str) -> Result<InMemoryCatalog, String> {
        let manifest: ManifestFile = toml::from_str(text).map_err(|e| SchemaError::from(e).to_string())?;

        let mut entities = Vec::with_capacity(manifest.entity.len());
        let mut trees = HashMap::new();

        for item in manifest.entity {
            let id = item.section.id.clone();
            let entity = item.section.into_entity().map_err(|e| e.to_string())?;

            if let Some(files) = item.files {
                let mut tree = ContentTree::new();
                for (path, value) in files {
                    let relative = RelativePath::try_new(&path)
                        .map_err(|e| format!("entity '{id}': {e}"))?;
                    let content = inline_content(&id, &path, value).map_err(|e| e.to_string())?;
                    tree.insert(relative, content);
                }
                trees.insert(id, tree);
            }

            entities.push(entity);
        }

        let entities = entity_map(entities).map_err(|e| e.to_string())?;
        Ok(InMemoryCatalog::from_parts(entities, trees))
    }

    fn error(&self, reason: impl Into<String>) -> ApplicationError {
        ApplicationError::CatalogLoad {
            source_path: self.path.clone(),
            reason: reason.into(),
        }
    }
}
