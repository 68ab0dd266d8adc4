//! TOML sections shared by the manifest and directory layouts.
//!
//! Both layouts decode into these structs once, then into domain
//! [`Entity`] values. Nothing downstream looks at raw TOML.

use serde::Deserialize;
use thiserror::Error;

use strata_core::domain::{
    Dependency, DomainError, Entity, FileContent, VersionConstraint, value_objects::parse_version,
};

/// Problems found while decoding catalog TOML.
///
/// Loaders wrap these in `ApplicationError::CatalogLoad` together with the
/// offending file.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("entity '{id}': {source}")]
    Entity {
        id: String,
        #[source]
        source: DomainError,
    },

    #[error("entity '{id}' declares file '{path}' with unsupported content")]
    UnsupportedContent { id: String, path: String },
}

/// One `[[dependencies]]` entry.
///
/// ```toml
/// [[dependencies]]
/// id = "logger"
/// constraint = "^1.2"   # optional, defaults to any
/// optional = true       # optional, defaults to false
/// ```
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct DependencySection {
    pub id: String,
    #[serde(default)]
    pub constraint: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

/// Identity, parents and dependencies of one entity.
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct EntitySection {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencySection>,
}

impl EntitySection {
    pub(crate) fn into_entity(self) -> Result<Entity, SchemaError> {
        let wrap = |source: DomainError| SchemaError::Entity {
            id: self.id.clone(),
            source,
        };

        let version = parse_version(&self.version, &self.version).map_err(wrap)?;
        let mut entity = Entity::new(self.id.clone(), version);

        for dep in &self.dependencies {
            let constraint = match &dep.constraint {
                Some(text) => VersionConstraint::parse(text).map_err(wrap)?,
                None => VersionConstraint::Any,
            };
            let mut dependency = Dependency::new(dep.id.clone(), constraint);
            if dep.optional {
                dependency = dependency.optional();
            }
            entity = entity.with_dependency(dependency);
        }

        for parent in &self.extends {
            entity = entity.with_parent(parent.clone());
        }

        entity.validate().map_err(wrap)?;
        Ok(entity)
    }
}

/// Inline file bodies: a string is text, a table or array is structured.
pub(crate) fn inline_content(
    id: &str,
    path: &str,
    value: toml::Value,
) -> Result<FileContent, SchemaError> {
    match value {
        toml::Value::String(text) => Ok(FileContent::Text(text)),
        value @ (toml::Value::Table(_) | toml::Value::Array(_)) => {
            Ok(FileContent::Structured(toml_to_json(value)))
        }
        _ => Err(SchemaError::UnsupportedContent {
            id: id.to_string(),
            path: path.to_string(),
        }),
    }
}

/// Convert a TOML value into the JSON model used for structured content.
///
/// Datetimes become their RFC 3339 string. Non-finite floats become null.
pub(crate) fn toml_to_json(value: toml::Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match value {
        toml::Value::String(s) => Json::String(s),
        toml::Value::Integer(i) => Json::from(i),
        toml::Value::Float(f) => Json::from(f),
        toml::Value::Boolean(b) => Json::Bool(b),
        toml::Value::Datetime(dt) => Json::String(dt.to_string()),
        toml::Value::Array(items) => Json::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Json::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section(toml_text: &str) -> EntitySection {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn section_becomes_entity() {
        let entity = section(
            r#"
            id = "web"
            version = "1.2"
            extends = ["base"]

            [[dependencies]]
            id = "logger"
            constraint = "^1.0.0"

            [[dependencies]]
            id = "metrics"
            optional = true
            "#,
        )
        .into_entity()
        .unwrap();

        assert_eq!(entity.version, semver::Version::new(1, 2, 0));
        assert_eq!(entity.extends, vec!["base"]);
        assert_eq!(entity.dependencies.len(), 2);
        assert_eq!(entity.dependencies[1].constraint, VersionConstraint::Any);
        assert!(entity.dependencies[1].optional);
    }

    #[test]
    fn malformed_constraint_names_the_entity() {
        let err = section(
            r#"
            id = "web"
            version = "1.0.0"
            dependencies = [{ id = "logger", constraint = "~>1" }]
            "#,
        )
        .into_entity()
        .unwrap_err();

        assert!(err.to_string().starts_with("entity 'web'"));
        assert!(matches!(
            err,
            SchemaError::Entity {
                source: DomainError::MalformedConstraint { .. },
                ..
            }
        ));
    }

    #[test]
    fn unknown_dependency_keys_are_rejected() {
        let parsed: Result<EntitySection, _> = toml::from_str(
            r#"
            id = "web"
            version = "1.0.0"
            dependencies = [{ id = "logger", versoin = "1" }]
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn toml_tables_map_to_json_objects() {
        let value: toml::Value = toml::from_str("[server]\nport = 80\nhosts = [\"a\", \"b\"]").unwrap();
        assert_eq!(
            toml_to_json(value),
            json!({"server": {"port": 80, "hosts": ["a", "b"]}})
        );
    }

    #[test]
    fn scalar_file_bodies_are_rejected() {
        let err = inline_content("web", "port.txt", toml::Value::Integer(80)).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedContent { .. }));
    }
}
