//! Plugins and templates as the resolver sees them.
//!
//! Manifests are decoded into these structs once, at the adapter boundary.
//! After that every component works with typed fields; nothing downstream
//! inspects loosely-typed maps.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::domain::{error::DomainError, value_objects::VersionConstraint};

/// A plugin or template with its declared relationships.
///
/// ## Invariants (enforced by `validate()`)
///
/// 1. `id` is non-empty and contains no whitespace
/// 2. No dependency targets the empty id
///
/// Duplicate `extends` entries are *not* rejected here; reporting them is
/// the job of the resolution validator, which needs to see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub version: Version,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Parent templates, left-to-right as authored. Empty for plugins.
    #[serde(default)]
    pub extends: Vec<String>,
}

impl Entity {
    pub fn new(id: impl Into<String>, version: Version) -> Self {
        Self {
            id: id.into(),
            version,
            dependencies: Vec::new(),
            extends: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.extends.push(parent.into());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_id(&self.id)?;
        for dep in &self.dependencies {
            validate_id(&dep.target_id).map_err(|_| {
                DomainError::InvalidEntity(format!(
                    "'{}' declares a dependency with an invalid id '{}'",
                    self.id, dep.target_id
                ))
            })?;
        }
        for parent in &self.extends {
            validate_id(parent).map_err(|_| {
                DomainError::InvalidEntity(format!(
                    "'{}' extends an invalid id '{}'",
                    self.id, parent
                ))
            })?;
        }
        Ok(())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}

fn validate_id(id: &str) -> Result<(), DomainError> {
    if id.is_empty() {
        return Err(DomainError::InvalidEntity("id cannot be empty".into()));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidEntity(format!(
            "id '{id}' contains whitespace"
        )));
    }
    Ok(())
}

/// A declared "depends-on" relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(rename = "id")]
    pub target_id: String,
    #[serde(default = "any_constraint")]
    pub constraint: VersionConstraint,
    #[serde(default)]
    pub optional: bool,
}

fn any_constraint() -> VersionConstraint {
    VersionConstraint::Any
}

impl Dependency {
    pub fn new(target_id: impl Into<String>, constraint: VersionConstraint) -> Self {
        Self {
            target_id: target_id.into(),
            constraint,
            optional: false,
        }
    }

    /// Parse the constraint text and build a required dependency.
    pub fn parse(target_id: impl Into<String>, constraint: &str) -> Result<Self, DomainError> {
        Ok(Self::new(target_id, VersionConstraint::parse(constraint)?))
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.target_id, self.constraint)?;
        if self.optional {
            f.write_str(" (optional)")?;
        }
        Ok(())
    }
}

/// Read-only view of the entity catalog for one resolution call.
///
/// Implemented for the standard maps so callers can hand over a snapshot
/// directly. The core never mutates what it is given.
pub trait EntityLookup {
    fn entity(&self, id: &str) -> Option<&Entity>;

    /// All ids in the lookup, sorted.
    fn ids(&self) -> Vec<&str>;
}

impl EntityLookup for BTreeMap<String, Entity> {
    fn entity(&self, id: &str) -> Option<&Entity> {
        self.get(id)
    }

    fn ids(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }
}

impl EntityLookup for HashMap<String, Entity> {
    fn entity(&self, id: &str) -> Option<&Entity> {
        self.get(id)
    }

    fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Owned snapshot keyed by id.
pub type EntityMap = BTreeMap<String, Entity>;

/// Build an [`EntityMap`] from a list, validating each entity.
///
/// # Errors
///
/// `InvalidEntity` on a bad id or when two entities share an id.
pub fn entity_map(entities: impl IntoIterator<Item = Entity>) -> Result<EntityMap, DomainError> {
    let mut map = EntityMap::new();
    for entity in entities {
        entity.validate()?;
        if map.contains_key(&entity.id) {
            return Err(DomainError::InvalidEntity(format!(
                "'{}' is defined more than once",
                entity.id
            )));
        }
        map.insert(entity.id.clone(), entity);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn builder_accumulates() {
        let e = Entity::new("auth", v("1.0.0"))
            .with_dependency(Dependency::parse("logger", "^1.2.0").unwrap())
            .with_dependency(Dependency::parse("metrics", "any").unwrap().optional())
            .with_parent("base");

        assert_eq!(e.dependencies.len(), 2);
        assert!(e.dependencies[1].optional);
        assert_eq!(e.extends, vec!["base".to_string()]);
        assert_eq!(e.to_string(), "auth@1.0.0");
    }

    #[test]
    fn validate_rejects_bad_ids() {
        assert!(Entity::new("", v("1.0.0")).validate().is_err());
        assert!(Entity::new("has space", v("1.0.0")).validate().is_err());
        assert!(
            Entity::new("ok", v("1.0.0"))
                .with_parent("")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn entity_map_rejects_duplicates() {
        let err = entity_map([
            Entity::new("a", v("1.0.0")),
            Entity::new("a", v("2.0.0")),
        ])
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidEntity(_)));
    }

    #[test]
    fn dependency_deserializes_with_defaults() {
        let dep: Dependency = serde_json::from_str(r#"{"id":"logger"}"#).unwrap();
        assert_eq!(dep.constraint, VersionConstraint::Any);
        assert!(!dep.optional);
    }

    #[test]
    fn hashmap_lookup_ids_are_sorted() {
        let mut map = HashMap::new();
        for id in ["c", "a", "b"] {
            map.insert(id.to_string(), Entity::new(id, v("1.0.0")));
        }
        assert_eq!(map.ids(), vec!["a", "b", "c"]);
    }
}
