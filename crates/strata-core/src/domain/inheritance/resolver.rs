//! Linearization of `extends` chains.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::domain::{
    entities::{
        Conflict, Cycle, Dependency, Entity, EntityLookup, EntityMap, MissingDependency,
        ResolutionWarning,
    },
    error::DomainError,
    resolver::{ConflictResolver, CycleDetector, GraphBuilder, TopologicalSorter},
    value_objects::VersionConstraint,
};

/// Depth limits for inheritance chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepthLimits {
    /// Deeper chains still resolve, with a warning.
    pub soft_threshold: usize,
    /// Deeper chains fail.
    pub hard_cap: usize,
}

impl Default for DepthLimits {
    fn default() -> Self {
        Self {
            soft_threshold: 5,
            hard_cap: 20,
        }
    }
}

/// Ids from the furthest ancestor to the child itself. No id repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InheritanceChain(Vec<String>);

impl InheritanceChain {
    pub fn ids(&self) -> &[String] {
        &self.0
    }

    /// The last entry, i.e. the template being resolved.
    pub fn child(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn ancestors(&self) -> &[String] {
        match self.0.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for InheritanceChain {
    fn from(ids: Vec<String>) -> Self {
        Self(ids)
    }
}

impl fmt::Display for InheritanceChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" -> "))
    }
}

/// Outcome of resolving one child's `extends` closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InheritanceResolution {
    pub child: String,
    /// Empty whenever the resolution is unsuccessful.
    pub chain: InheritanceChain,
    /// Longest `extends` path below the child.
    pub depth: usize,
    pub missing_parents: Vec<MissingDependency>,
    pub cycles: Vec<Cycle>,
    pub conflicts: Vec<Conflict>,
    pub hard_cap_exceeded: bool,
    pub warnings: Vec<ResolutionWarning>,
}

impl InheritanceResolution {
    pub fn is_success(&self) -> bool {
        self.missing_parents.is_empty()
            && self.cycles.is_empty()
            && self.conflicts.is_empty()
            && !self.hard_cap_exceeded
    }
}

pub struct InheritanceResolver {
    limits: DepthLimits,
}

impl InheritanceResolver {
    pub fn new(limits: DepthLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> DepthLimits {
        self.limits
    }

    /// Linearize the `extends` closure of `child_id`.
    ///
    /// Parents come before children. Independent parents keep their authored
    /// left-to-right order; a parent that another listed parent extends is
    /// pulled ahead of it, and that reordering is reported as a warning.
    ///
    /// # Errors
    ///
    /// `EntityNotFound` if the child is unknown, `InternalConsistency` if the
    /// graph machinery disagrees with itself.
    #[instrument(skip_all, fields(child = %child_id))]
    pub fn resolve<L>(&self, child_id: &str, lookup: &L) -> Result<InheritanceResolution, DomainError>
    where
        L: EntityLookup + ?Sized,
    {
        let synthetic = extends_graph(child_id, lookup)?;
        let graph = GraphBuilder::build(child_id, &synthetic, false)?;
        let cycles = CycleDetector::detect(&graph);
        let excluded = CycleDetector::members(&cycles);
        let topo = TopologicalSorter::sort(&graph, &excluded)?;
        let conflicts = ConflictResolver::detect(&graph);

        let mut resolution = InheritanceResolution {
            child: child_id.to_string(),
            chain: InheritanceChain::default(),
            depth: 0,
            missing_parents: graph.missing().to_vec(),
            cycles,
            conflicts,
            hard_cap_exceeded: false,
            warnings: Vec::new(),
        };

        if !resolution.missing_parents.is_empty() || !resolution.cycles.is_empty() {
            debug!(
                missing = resolution.missing_parents.len(),
                cycles = resolution.cycles.len(),
                "Inheritance chain unresolved"
            );
            return Ok(resolution);
        }

        let chain = authored_order(child_id, &synthetic);
        if chain.len() != topo.len() {
            return Err(DomainError::InternalConsistency {
                message: format!(
                    "inheritance chain has {} entries but the graph has {}",
                    chain.len(),
                    topo.len()
                ),
            });
        }

        resolution.depth = longest_path(&chain, &synthetic);
        if resolution.depth > self.limits.hard_cap {
            warn!(
                depth = resolution.depth,
                cap = self.limits.hard_cap,
                "Inheritance chain exceeds the hard cap"
            );
            resolution.hard_cap_exceeded = true;
            return Ok(resolution);
        }

        resolution.warnings = reorder_warnings(&chain, &synthetic);
        for warning in &resolution.warnings {
            warn!("{warning}");
        }

        resolution.chain = InheritanceChain::from(chain);
        debug!(chain = %resolution.chain, depth = resolution.depth, "Inheritance chain resolved");
        Ok(resolution)
    }
}

impl Default for InheritanceResolver {
    fn default() -> Self {
        Self::new(DepthLimits::default())
    }
}

/// The `extends` closure of `child_id` re-expressed as dependencies, so the
/// regular graph machinery can run over it. Missing parents are simply
/// absent from the map.
fn extends_graph<L>(child_id: &str, lookup: &L) -> Result<EntityMap, DomainError>
where
    L: EntityLookup + ?Sized,
{
    if lookup.entity(child_id).is_none() {
        return Err(DomainError::EntityNotFound {
            id: child_id.to_string(),
        });
    }

    let mut synthetic = EntityMap::new();
    let mut queue = VecDeque::from([child_id.to_string()]);
    while let Some(id) = queue.pop_front() {
        if synthetic.contains_key(&id) {
            continue;
        }
        let Some(entity) = lookup.entity(&id) else {
            continue;
        };

        let mut node = Entity::new(entity.id.clone(), entity.version.clone());
        node.extends = entity.extends.clone();
        node.dependencies = entity
            .extends
            .iter()
            .map(|parent| Dependency::new(parent.clone(), VersionConstraint::Any))
            .collect();
        queue.extend(entity.extends.iter().cloned());
        synthetic.insert(id, node);
    }
    Ok(synthetic)
}

/// Post-order walk over `extends`, parents left to right. Requires an
/// acyclic closure with no missing parents.
fn authored_order(child_id: &str, synthetic: &EntityMap) -> Vec<String> {
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut order = Vec::new();
    let mut stack: Vec<(&str, usize)> = vec![(child_id, 0)];

    while let Some((id, next)) = stack.last_mut() {
        let parents = synthetic
            .get(*id)
            .map(|e| e.extends.as_slice())
            .unwrap_or_default();

        if let Some(parent) = parents.get(*next) {
            *next += 1;
            if !emitted.contains(parent.as_str()) {
                stack.push((parent.as_str(), 0));
            }
            continue;
        }

        let id = *id;
        stack.pop();
        if emitted.insert(id) {
            order.push(id.to_string());
        }
    }

    order
}

/// Longest `extends` path below the last entry of `chain`. `chain` must
/// list parents before children.
fn longest_path(chain: &[String], synthetic: &EntityMap) -> usize {
    let mut depth: HashMap<&str, usize> = HashMap::new();
    for id in chain {
        let d = synthetic
            .get(id)
            .map(|e| {
                e.extends
                    .iter()
                    .filter_map(|p| depth.get(p.as_str()))
                    .map(|d| d + 1)
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0);
        depth.insert(id.as_str(), d);
    }
    chain
        .last()
        .and_then(|child| depth.get(child.as_str()).copied())
        .unwrap_or(0)
}

fn reorder_warnings(chain: &[String], synthetic: &EntityMap) -> Vec<ResolutionWarning> {
    let position: HashMap<&str, usize> = chain
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut warnings = Vec::new();
    for id in chain {
        let Some(entity) = synthetic.get(id) else {
            continue;
        };
        let mut authored: Vec<String> = Vec::new();
        for parent in &entity.extends {
            if !authored.contains(parent) {
                authored.push(parent.clone());
            }
        }
        if authored.len() < 2 {
            continue;
        }

        let mut resolved = authored.clone();
        resolved.sort_by_key(|p| position.get(p.as_str()).copied().unwrap_or(usize::MAX));
        if resolved != authored {
            warnings.push(ResolutionWarning::ExtendsReordered {
                entity: id.clone(),
                authored,
                resolved,
            });
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::entity_map;
    use semver::Version;

    fn template(id: &str, parents: &[&str]) -> Entity {
        parents
            .iter()
            .fold(Entity::new(id, Version::new(1, 0, 0)), |e, p| e.with_parent(*p))
    }

    fn resolve(templates: Vec<Entity>, child: &str) -> InheritanceResolution {
        InheritanceResolver::default()
            .resolve(child, &entity_map(templates).unwrap())
            .unwrap()
    }

    #[test]
    fn linear_chain_is_ancestor_first() {
        let r = resolve(
            vec![
                template("base", &[]),
                template("web", &["base"]),
                template("api", &["web"]),
            ],
            "api",
        );

        assert!(r.is_success());
        assert_eq!(r.chain.ids(), ["base", "web", "api"]);
        assert_eq!(r.depth, 2);
        assert_eq!(r.chain.child(), Some("api"));
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn independent_parents_keep_authored_order() {
        let r = resolve(
            vec![
                template("zeta", &[]),
                template("alpha", &[]),
                template("app", &["zeta", "alpha"]),
            ],
            "app",
        );

        assert_eq!(r.chain.ids(), ["zeta", "alpha", "app"]);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn parent_dependencies_force_reorder_with_warning() {
        let r = resolve(
            vec![
                template("base", &[]),
                template("web", &["base"]),
                template("app", &["web", "base"]),
            ],
            "app",
        );

        assert!(r.is_success());
        assert_eq!(r.chain.ids(), ["base", "web", "app"]);
        assert_eq!(r.warnings.len(), 1);
        assert!(matches!(
            &r.warnings[0],
            ResolutionWarning::ExtendsReordered { entity, .. } if entity == "app"
        ));
    }

    #[test]
    fn diamond_lists_shared_ancestor_once() {
        let r = resolve(
            vec![
                template("root", &[]),
                template("left", &["root"]),
                template("right", &["root"]),
                template("leaf", &["left", "right"]),
            ],
            "leaf",
        );

        assert_eq!(r.chain.ids(), ["root", "left", "right", "leaf"]);
        assert_eq!(r.depth, 2);
    }

    #[test]
    fn missing_parent_fails_with_empty_chain() {
        let r = resolve(vec![template("app", &["ghost"])], "app");

        assert!(!r.is_success());
        assert!(r.chain.is_empty());
        assert_eq!(r.missing_parents[0].dependency.target_id, "ghost");
    }

    #[test]
    fn cycle_fails_with_empty_chain() {
        let r = resolve(vec![template("a", &["b"]), template("b", &["a"])], "a");

        assert!(!r.is_success());
        assert!(r.chain.is_empty());
        assert_eq!(r.cycles.len(), 1);
    }

    #[test]
    fn hard_cap_fails() {
        let mut templates = vec![template("t0", &[])];
        for i in 1..=4 {
            let parent = format!("t{}", i - 1);
            templates.push(template(&format!("t{i}"), &[parent.as_str()]));
        }

        let resolver = InheritanceResolver::new(DepthLimits {
            soft_threshold: 1,
            hard_cap: 3,
        });
        let r = resolver
            .resolve("t4", &entity_map(templates).unwrap())
            .unwrap();

        assert_eq!(r.depth, 4);
        assert!(r.hard_cap_exceeded);
        assert!(!r.is_success());
        assert!(r.chain.is_empty());
    }

    #[test]
    fn unknown_child_is_an_error() {
        let err = InheritanceResolver::default()
            .resolve("nope", &EntityMap::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::EntityNotFound { .. }));
    }
}
