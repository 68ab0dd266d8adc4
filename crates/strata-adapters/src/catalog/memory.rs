//! In-memory entity catalog.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use strata_core::{
    application::{ApplicationError, ports::EntityCatalog},
    domain::{ContentTree, Entity, EntityMap},
    error::{StrataError, StrataResult},
};

#[derive(Debug, Default)]
struct Inner {
    entities: EntityMap,
    trees: HashMap<String, ContentTree>,
}

/// Thread-safe in-memory catalog.
///
/// Clones share the same storage. `entities()` hands out an owned snapshot,
/// so inserts made while a resolution is running are not observed by it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from an already validated snapshot and its trees.
    pub fn from_parts(entities: EntityMap, trees: HashMap<String, ContentTree>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner { entities, trees })),
        }
    }

    /// Insert or replace an entity.
    pub fn insert(&self, entity: Entity) -> StrataResult<()> {
        entity.validate().map_err(StrataError::Domain)?;
        self.write()?.entities.insert(entity.id.clone(), entity);
        Ok(())
    }

    /// Insert or replace an entity together with its content tree.
    pub fn insert_with_tree(&self, entity: Entity, tree: ContentTree) -> StrataResult<()> {
        entity.validate().map_err(StrataError::Domain)?;
        let mut inner = self.write()?;
        inner.trees.insert(entity.id.clone(), tree);
        inner.entities.insert(entity.id.clone(), entity);
        Ok(())
    }

    /// Remove an entity and its tree. Returns the removed entity, if any.
    pub fn remove(&self, id: &str) -> StrataResult<Option<Entity>> {
        let mut inner = self.write()?;
        inner.trees.remove(id);
        Ok(inner.entities.remove(id))
    }

    /// Number of entities.
    pub fn len(&self) -> StrataResult<usize> {
        Ok(self.read()?.entities.len())
    }

    pub fn is_empty(&self) -> StrataResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Clear all entities and trees.
    pub fn clear(&self) -> StrataResult<()> {
        let mut inner = self.write()?;
        inner.entities.clear();
        inner.trees.clear();
        Ok(())
    }

    fn read(&self) -> StrataResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }

    fn write(&self) -> StrataResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }
}

impl EntityCatalog for InMemoryCatalog {
    fn entities(&self) -> StrataResult<EntityMap> {
        Ok(self.read()?.entities.clone())
    }

    fn content_tree(&self, id: &str) -> StrataResult<Option<ContentTree>> {
        Ok(self.read()?.trees.get(id).cloned())
    }
}
