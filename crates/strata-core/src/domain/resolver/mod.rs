//! Dependency graph resolution.
//!
//! ```text
//! entities ─▶ GraphBuilder ─▶ CycleDetector ─▶ TopologicalSorter ─┐
//!                                          └─▶ ConflictResolver ───┴▶ ResolutionResult
//! ```
//!
//! Structural problems (missing targets, cycles, conflicts) are collected
//! into the result. Only a missing root or a broken internal invariant
//! comes back as an `Err`.

pub mod conflict;
pub mod constraint;
pub mod cycles;
pub mod graph;
pub mod topo;

use std::collections::BTreeMap;

use semver::Version;
use tracing::{debug, instrument};

use crate::domain::{
    entities::{EntityLookup, ResolutionResult, ResolutionWarning},
    error::DomainError,
};

pub use conflict::ConflictResolver;
pub use constraint::ConstraintEvaluator;
pub use cycles::CycleDetector;
pub use graph::{DependencyGraph, GraphBuilder};
pub use topo::TopologicalSorter;

/// Per-call resolution settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Follow dependencies marked optional.
    pub include_optional: bool,
    /// Locally installed versions, used only to fill
    /// `ResolutionResult::satisfied_locally`.
    pub installed: BTreeMap<String, Version>,
}

impl ResolveOptions {
    pub fn include_optional(mut self, yes: bool) -> Self {
        self.include_optional = yes;
        self
    }

    pub fn with_installed(mut self, installed: BTreeMap<String, Version>) -> Self {
        self.installed = installed;
        self
    }
}

/// Runs the full resolution pipeline for one root.
#[derive(Debug, Clone, Default)]
pub struct DependencyResolver {
    options: ResolveOptions,
}

impl DependencyResolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve `root_id` against `lookup`.
    ///
    /// `install_order` is computed over the acyclic part of the graph even
    /// when the result is unsuccessful.
    #[instrument(skip_all, fields(root = %root_id, include_optional = self.options.include_optional))]
    pub fn resolve<L>(&self, root_id: &str, lookup: &L) -> Result<ResolutionResult, DomainError>
    where
        L: EntityLookup + ?Sized,
    {
        let graph = GraphBuilder::build(root_id, lookup, self.options.include_optional)?;
        let cycles = CycleDetector::detect(&graph);
        let excluded = CycleDetector::members(&cycles);
        let install_order = TopologicalSorter::sort(&graph, &excluded)?;
        let conflicts = ConflictResolver::detect(&graph);
        let warnings = unsatisfied_constraints(&graph);
        let satisfied_locally = self.satisfied_locally(&graph, &install_order);

        let result = ResolutionResult {
            root: root_id.to_string(),
            install_order,
            missing_dependencies: graph.missing().to_vec(),
            circular_dependencies: cycles,
            version_conflicts: conflicts,
            edges: graph.edges(),
            versions: graph
                .sorted_nodes()
                .into_iter()
                .map(|idx| {
                    let node = graph.node(idx);
                    (node.id.clone(), node.version.clone())
                })
                .collect(),
            satisfied_locally,
            warnings,
        };

        debug!(
            success = result.is_success(),
            missing = result.missing_dependencies.len(),
            cycles = result.circular_dependencies.len(),
            conflicts = result.version_conflicts.len(),
            "Resolution finished"
        );
        Ok(result)
    }

    fn satisfied_locally(&self, graph: &DependencyGraph, order: &[String]) -> Vec<String> {
        if self.options.installed.is_empty() {
            return Vec::new();
        }

        order
            .iter()
            .filter(|id| {
                let Some(installed) = self.options.installed.get(id.as_str()) else {
                    return false;
                };
                let Some(idx) = graph.find(id) else {
                    return false;
                };
                graph
                    .dependents_of(idx)
                    .iter()
                    .all(|(_, edge)| ConstraintEvaluator::satisfies(installed, &edge.constraint))
            })
            .cloned()
            .collect()
    }
}

/// Edges whose target version does not meet the declared constraint.
fn unsatisfied_constraints(graph: &DependencyGraph) -> Vec<ResolutionWarning> {
    graph
        .edges()
        .into_iter()
        .filter_map(|edge| {
            let target = graph.node(graph.find(&edge.to)?);
            if ConstraintEvaluator::satisfies(&target.version, &edge.constraint) {
                None
            } else {
                Some(ResolutionWarning::UnsatisfiedConstraint {
                    from: edge.from,
                    target: edge.to,
                    constraint: edge.constraint,
                    available: target.version.clone(),
                })
            }
        })
        .collect()
}
