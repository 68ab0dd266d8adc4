//! Template-directory catalog.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── base/
//! │   ├── template.toml        ← manifest (required)
//! │   ├── README.md
//! │   └── config.json          ← .json/.toml files load as structured
//! └── web/
//!     ├── template.toml
//!     └── src/
//!         └── main.rs
//! ```
//!
//! # `template.toml` format
//!
//! ```toml
//! [template]
//! id      = "web"
//! version = "1.2.0"
//! extends = ["base"]          # optional
//!
//! [[template.dependencies]]   # optional
//! id         = "logger"
//! constraint = "^1.0.0"
//! ```
//!
//! Manifests are read when the catalog is opened. File contents are read
//! only when a template's content tree is requested.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use strata_core::{
    application::{ApplicationError, ports::EntityCatalog},
    domain::{ContentTree, Entity, EntityMap, FileContent, RelativePath, entity_map},
    error::StrataResult,
};

use super::schema::{EntitySection, toml_to_json};

/// File name of the per-template manifest.
pub const MANIFEST_FILE: &str = "template.toml";

#[derive(Debug, Deserialize)]
struct TemplateManifest {
    template: EntitySection,
}

/// Catalog backed by a directory of template folders.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
    entities: EntityMap,
    dirs: HashMap<String, PathBuf>,
}

impl DirectoryCatalog {
    /// Scan `root` and read every `template.toml` below it.
    ///
    /// Subdirectories without a manifest are ignored. A manifest that fails
    /// to parse is logged and skipped so one bad template does not hide the
    /// rest.
    ///
    /// # Errors
    ///
    /// `CatalogLoad` if `root` is missing or unreadable, or when two
    /// templates share an id.
    #[instrument(fields(root = %root.as_ref().display()), skip(root))]
    pub fn open(root: impl AsRef<Path>) -> StrataResult<Self> {
        let root = root.as_ref().to_path_buf();
        let load_error = |reason: String| ApplicationError::CatalogLoad {
            source_path: root.clone(),
            reason,
        };

        if !root.is_dir() {
            return Err(load_error("templates directory not found".into()).into());
        }

        let read_dir = fs::read_dir(&root).map_err(|e| load_error(e.to_string()))?;

        let mut found = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| load_error(e.to_string()))?;
            let dir = entry.path();
            let manifest = dir.join(MANIFEST_FILE);
            if !dir.is_dir() || !manifest.is_file() {
                continue;
            }

            match read_manifest(&manifest) {
                Ok(entity) => {
                    debug!(id = %entity.id, version = %entity.version, "Loaded template manifest");
                    found.push((entity, dir));
                }
                Err(reason) => {
                    warn!(
                        dir = %dir.display(),
                        error = %reason,
                        "Skipping template directory"
                    );
                }
            }
        }

        let dirs = found
            .iter()
            .map(|(entity, dir)| (entity.id.clone(), dir.clone()))
            .collect();
        let entities = entity_map(found.into_iter().map(|(entity, _)| entity))
            .map_err(|e| load_error(e.to_string()))?;

        debug!(count = entities.len(), "Finished scanning templates");
        Ok(Self {
            root,
            entities,
            dirs,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the template `id`.
    pub fn template_dir(&self, id: &str) -> Option<&Path> {
        self.dirs.get(id).map(PathBuf::as_path)
    }

    fn load_tree(&self, dir: &Path) -> StrataResult<ContentTree> {
        let mut tree = ContentTree::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::CatalogLoad {
                source_path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(dir).map_err(|e| {
                ApplicationError::CatalogLoad {
                    source_path: entry.path().to_path_buf(),
                    reason: e.to_string(),
                }
            })?;
            if relative == Path::new(MANIFEST_FILE) {
                continue;
            }

            let path = RelativePath::try_new(relative).map_err(|e| ApplicationError::CatalogLoad {
                source_path: entry.path().to_path_buf(),
                reason: e.to_string(),
            })?;
            let raw = fs::read_to_string(entry.path()).map_err(|e| {
                ApplicationError::CatalogLoad {
                    source_path: entry.path().to_path_buf(),
                    reason: e.to_string(),
                }
            })?;

            tree.insert(path.clone(), file_content(&path, raw));
        }

        Ok(tree)
    }
}

impl EntityCatalog for DirectoryCatalog {
    fn entities(&self) -> StrataResult<EntityMap> {
        Ok(self.entities.clone())
    }

    #[instrument(skip(self))]
    fn content_tree(&self, id: &str) -> StrataResult<Option<ContentTree>> {
        let Some(dir) = self.dirs.get(id) else {
            return Ok(None);
        };
        let tree = self.load_tree(dir)?;
        debug!(files = tree.len(), "Loaded content tree");
        Ok(Some(tree))
    }
}

fn read_manifest(path: &Path) -> Result<Entity, String> {
    let raw = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let manifest: TemplateManifest = toml::from_str(&raw).map_err(|e| e.to_string())?;
    manifest.template.into_entity().map_err(|e| e.to_string())
}

/// `.json` and `.toml` files become structured content. Anything else, or
/// a structured file that does not parse, stays text.
fn file_content(path: &RelativePath, raw: String) -> FileContent {
    let parsed = match path.extension().as_deref() {
        Some("json") => serde_json::from_str::<serde_json::Value>(&raw).map_err(|e| e.to_string()),
        Some("toml") => toml::from_str::<toml::Table>(&raw)
            .map(|table| toml_to_json(toml::Value::Table(table)))
            .map_err(|e| e.to_string()),
        _ => return FileContent::Text(raw),
    };

    match parsed {
        Ok(value) => FileContent::Structured(value),
        Err(error) => {
            warn!(%path, %error, "Structured file did not parse, keeping it as text");
            FileContent::Text(raw)
        }
    }
}
