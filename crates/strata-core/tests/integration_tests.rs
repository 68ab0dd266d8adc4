//! Integration tests for strata-core: resolver and composition properties
//! exercised through the public API only.

use std::collections::BTreeMap;

use semver::Version;
use serde_json::json;
use strata_core::domain::{
    CompositionEngine, CompositionStrategy, ContentTree, Dependency, DependencyResolver,
    DomainError, Entity, EntityMap, FileContent, InheritanceResolver, ResolutionValidator,
    ResolveOptions, entity_map,
};

fn entity(id: &str, deps: &[(&str, &str)]) -> Entity {
    deps.iter()
        .fold(Entity::new(id, Version::new(1, 0, 0)), |e, (target, c)| {
            e.with_dependency(Dependency::parse(*target, c).unwrap())
        })
}

fn position(order: &[String], id: &str) -> usize {
    order
        .iter()
        .position(|o| o == id)
        .unwrap_or_else(|| panic!("{id} missing from {order:?}"))
}

// ============================================================================
// Dependency resolution
// ============================================================================

#[test]
fn install_order_respects_every_edge() {
    let catalog = entity_map([
        entity("app", &[("http", "any"), ("db", "any"), ("cli", "any")]),
        entity("http", &[("tls", "any"), ("log", "any")]),
        entity("db", &[("pool", "any"), ("log", "any")]),
        entity("cli", &[("log", "any")]),
        entity("pool", &[("log", "any")]),
        entity("tls", &[]),
        entity("log", &[]),
    ])
    .unwrap();

    let result = DependencyResolver::default().resolve("app", &catalog).unwrap();
    assert!(result.is_success());
    assert_eq!(result.install_order.len(), 7);
    for edge in &result.edges {
        assert!(
            position(&result.install_order, &edge.to) < position(&result.install_order, &edge.from),
            "{} should precede {}",
            edge.to,
            edge.from
        );
    }
}

#[test]
fn two_disjoint_cycles_are_both_reported() {
    let catalog = entity_map([
        entity("root", &[("a", "any"), ("x", "any")]),
        entity("a", &[("b", "any")]),
        entity("b", &[("a", "any")]),
        entity("x", &[("y", "any")]),
        entity("y", &[("z", "any")]),
        entity("z", &[("x", "any")]),
    ])
    .unwrap();

    let result = DependencyResolver::default().resolve("root", &catalog).unwrap();
    assert!(!result.is_success());
    assert_eq!(result.circular_dependencies.len(), 2);
    assert_eq!(result.circular_dependencies[0].nodes, vec!["a", "b"]);
    assert_eq!(result.circular_dependencies[1].nodes, vec!["x", "y", "z"]);
    assert_eq!(result.install_order, vec!["root"]);
}

#[test]
fn lone_root_resolves_to_itself() {
    let catalog = entity_map([entity("solo", &[])]).unwrap();
    let result = DependencyResolver::default().resolve("solo", &catalog).unwrap();

    assert_eq!(result.install_order, vec!["solo"]);
    assert!(result.is_success());
}

#[test]
fn missing_dependency_does_not_hide_the_rest() {
    let catalog = entity_map([
        entity("root", &[("x", "any"), ("y", "any")]),
        entity("x", &[]),
    ])
    .unwrap();

    let result = DependencyResolver::default().resolve("root", &catalog).unwrap();
    assert!(!result.is_success());
    assert_eq!(result.missing_dependencies.len(), 1);
    assert_eq!(result.missing_dependencies[0].dependency.target_id, "y");
    assert!(position(&result.install_order, "x") < position(&result.install_order, "root"));
}

#[test]
fn incompatible_paths_produce_one_conflict() {
    let catalog = entity_map([
        entity("root", &[("path1", "any"), ("path2", "any")]),
        entity("path1", &[("x", "^1.0.0")]),
        entity("path2", &[("x", "^2.0.0")]),
        entity("x", &[]),
    ])
    .unwrap();

    let result = DependencyResolver::default().resolve("root", &catalog).unwrap();
    assert!(!result.is_success());
    assert_eq!(result.version_conflicts.len(), 1);
    assert_eq!(result.version_conflicts[0].target_id, "x");
}

#[test]
fn one_entity_asking_for_two_majors_fails() {
    let catalog = entity_map([
        entity("root", &[("x", "^1.0.0"), ("x", "^2.0.0")]),
        entity("x", &[]),
    ])
    .unwrap();

    let result = DependencyResolver::default().resolve("root", &catalog).unwrap();
    assert!(!result.is_success());
    assert_eq!(result.edges.len(), 2);
    assert_eq!(result.version_conflicts.len(), 1);
    assert_eq!(result.install_order, vec!["x", "root"]);
}

#[test]
fn optional_dependencies_need_opting_in() {
    let catalog = entity_map([
        Entity::new("root", Version::new(1, 0, 0))
            .with_dependency(Dependency::parse("extra", "any").unwrap().optional()),
    ])
    .unwrap();

    let skipped = DependencyResolver::default().resolve("root", &catalog).unwrap();
    assert!(skipped.is_success());

    let included = DependencyResolver::new(ResolveOptions::default().include_optional(true))
        .resolve("root", &catalog)
        .unwrap();
    assert!(!included.is_success());
    assert_eq!(included.missing_dependencies.len(), 1);
}

#[test]
fn resolution_leaves_the_lookup_untouched() {
    let catalog = entity_map([entity("a", &[("b", "any")]), entity("b", &[])]).unwrap();
    let before = catalog.clone();

    DependencyResolver::default().resolve("a", &catalog).unwrap();
    assert_eq!(catalog, before);
}

// ============================================================================
// Inheritance and composition
// ============================================================================

fn two_level() -> (EntityMap, BTreeMap<String, ContentTree>) {
    let templates = entity_map([
        Entity::new("parent", Version::new(1, 0, 0)),
        Entity::new("child", Version::new(1, 0, 0)).with_parent("parent"),
    ])
    .unwrap();
    let trees = BTreeMap::from([
        (
            "parent".to_string(),
            ContentTree::new()
                .with_file("config.yaml", json!({"a": 1}))
                .with_file("CHANGELOG.md", "v1"),
        ),
        (
            "child".to_string(),
            ContentTree::new()
                .with_file("config.yaml", json!({"b": 2}))
                .with_file("CHANGELOG.md", "v2"),
        ),
    ]);
    (templates, trees)
}

fn compose(
    templates: &EntityMap,
    trees: &BTreeMap<String, ContentTree>,
    child: &str,
    strategy: CompositionStrategy,
) -> Result<ContentTree, DomainError> {
    let resolution = InheritanceResolver::default().resolve(child, templates)?;
    let validated = ResolutionValidator::default().validate(templates, resolution, trees)?;
    Ok(CompositionEngine::compose(&validated, strategy).tree)
}

#[test]
fn chain_of_one_is_identity() {
    let (templates, trees) = two_level();
    for strategy in CompositionStrategy::ALL {
        let tree = compose(&templates, &trees, "parent", strategy).unwrap();
        assert_eq!(tree, trees["parent"]);
    }
}

#[test]
fn override_versus_merge() {
    let (templates, trees) = two_level();

    let overridden = compose(&templates, &trees, "child", CompositionStrategy::Override).unwrap();
    assert_eq!(
        overridden.get(&"config.yaml".into()),
        Some(&FileContent::Structured(json!({"b": 2})))
    );

    let merged = compose(&templates, &trees, "child", CompositionStrategy::Merge).unwrap();
    assert_eq!(
        merged.get(&"config.yaml".into()),
        Some(&FileContent::Structured(json!({"a": 1, "b": 2})))
    );
}

#[test]
fn append_versus_prepend() {
    let (templates, trees) = two_level();

    let appended = compose(&templates, &trees, "child", CompositionStrategy::Append).unwrap();
    assert_eq!(appended.get(&"CHANGELOG.md".into()), Some(&FileContent::text("v1v2")));

    let prepended = compose(&templates, &trees, "child", CompositionStrategy::Prepend).unwrap();
    assert_eq!(prepended.get(&"CHANGELOG.md".into()), Some(&FileContent::text("v2v1")));
}

#[test]
fn composition_is_idempotent() {
    let (templates, trees) = two_level();
    for strategy in CompositionStrategy::ALL {
        let first = compose(&templates, &trees, "child", strategy).unwrap();
        let second = compose(&templates, &trees, "child", strategy).unwrap();
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}

#[test]
fn duplicate_parent_fails_before_composition() {
    let templates = entity_map([
        Entity::new("base", Version::new(1, 0, 0)),
        Entity::new("child", Version::new(1, 0, 0))
            .with_parent("base")
            .with_parent("base"),
    ])
    .unwrap();
    let trees: BTreeMap<String, ContentTree> = BTreeMap::new();

    let err = compose(&templates, &trees, "child", CompositionStrategy::Merge).unwrap_err();
    assert!(matches!(err, DomainError::DuplicateParent { .. }));
}
