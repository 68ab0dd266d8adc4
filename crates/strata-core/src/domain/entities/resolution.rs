//! Output shapes of a dependency resolution.
//!
//! Everything here is plain data. Renderers (table, tree, JSON, DOT) are
//! expected to work from a [`ResolutionResult`] alone without re-running the
//! resolver, which is why the edge list travels with the result.

use std::collections::BTreeMap;
use std::fmt;

use semver::Version;
use serde::Serialize;

use crate::domain::{entities::entity::Dependency, value_objects::VersionConstraint};

/// A resolved "depends-on" edge. `to` is always a node in the graph;
/// edges towards missing targets are never materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub constraint: VersionConstraint,
    pub optional: bool,
}

/// A dependency whose target is not in the lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDependency {
    pub required_by: String,
    pub dependency: Dependency,
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (required by {}, {})",
            self.dependency.target_id, self.required_by, self.dependency.constraint
        )
    }
}

/// One distinct cycle, rotated to start at its smallest id.
///
/// `nodes` does not repeat the first id; `Display` closes the loop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Cycle {
    pub nodes: Vec<String>,
}

impl Cycle {
    /// Rotate so the lexicographically smallest id comes first.
    pub fn normalized(mut nodes: Vec<String>) -> Self {
        if let Some(start) = nodes
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(i, _)| i)
        {
            nodes.rotate_left(start);
        }
        Self { nodes }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{node} -> ")?;
        }
        match self.nodes.first() {
            Some(first) => f.write_str(first),
            None => Ok(()),
        }
    }
}

/// Two paths that place non-intersecting constraints on the same target.
///
/// Each path runs from the resolution root to the target, inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub target_id: String,
    pub constraint_a: VersionConstraint,
    pub constraint_b: VersionConstraint,
    pub path_a: Vec<String>,
    pub path_b: Vec<String>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} via {} conflicts with {} via {}",
            self.target_id,
            self.constraint_a,
            self.path_a.join(" -> "),
            self.constraint_b,
            self.path_b.join(" -> ")
        )
    }
}

/// Non-fatal findings. None of these affect `is_success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionWarning {
    /// The target exists but its version does not meet the edge constraint.
    UnsatisfiedConstraint {
        from: String,
        target: String,
        constraint: VersionConstraint,
        available: Version,
    },
    /// Inheritance chain is deeper than the soft threshold.
    ChainTooLong {
        child: String,
        depth: usize,
        threshold: usize,
    },
    /// Parent dependencies forced a different order than the authored
    /// `extends` list.
    ExtendsReordered {
        entity: String,
        authored: Vec<String>,
        resolved: Vec<String>,
    },
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsatisfiedConstraint {
                from,
                target,
                constraint,
                available,
            } => write!(
                f,
                "{from} requires {target} {constraint}, but {available} is available"
            ),
            Self::ChainTooLong {
                child,
                depth,
                threshold,
            } => write!(
                f,
                "inheritance chain of {child} is {depth} levels deep (threshold {threshold})"
            ),
            Self::ExtendsReordered {
                entity,
                authored,
                resolved,
            } => write!(
                f,
                "extends order of {entity} changed from [{}] to [{}]",
                authored.join(", "),
                resolved.join(", ")
            ),
        }
    }
}

/// Complete picture of one resolution call.
///
/// `install_order` covers every node that is not part of a cycle, so a
/// failed resolution still shows how far things got. Callers that only act
/// on success should check [`is_success`](Self::is_success) first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub root: String,
    pub install_order: Vec<String>,
    pub missing_dependencies: Vec<MissingDependency>,
    pub circular_dependencies: Vec<Cycle>,
    pub version_conflicts: Vec<Conflict>,
    pub edges: Vec<Edge>,
    /// Catalog version of every node reached from the root.
    pub versions: BTreeMap<String, Version>,
    /// Ids from `install_order` already present in the installed snapshot
    /// at a version meeting every incoming constraint.
    pub satisfied_locally: Vec<String>,
    pub warnings: Vec<ResolutionWarning>,
}

impl ResolutionResult {
    pub fn is_success(&self) -> bool {
        self.missing_dependencies.is_empty()
            && self.circular_dependencies.is_empty()
            && self.version_conflicts.is_empty()
    }

    /// Errors plus warnings. Zero means a `check` passes.
    pub fn issue_count(&self) -> usize {
        self.missing_dependencies.len()
            + self.circular_dependencies.len()
            + self.version_conflicts.len()
            + self.warnings.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }

    /// Direct dependencies of `id` in declaration order.
    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.from == id)
    }

    pub fn is_satisfied_locally(&self, id: &str) -> bool {
        self.satisfied_locally.iter().any(|s| s == id)
    }
}
