//! Dependency graph construction.

use std::collections::{HashMap, VecDeque};

use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use semver::Version;
use tracing::debug;

use crate::domain::{
    entities::{Edge, EntityLookup, MissingDependency},
    error::DomainError,
    value_objects::VersionConstraint,
};

/// A node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub version: Version,
}

/// Edge label: what the declaring node asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepEdge {
    pub constraint: VersionConstraint,
    pub optional: bool,
}

/// Closure of everything reachable from one root, backed by petgraph.
///
/// An edge `a -> b` means "a depends on b". Targets that were not in the
/// lookup never become nodes; they are kept in `missing` instead.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, DepEdge>,
    index: HashMap<String, NodeIndex>,
    root: Option<NodeIndex>,
    missing: Vec<MissingDependency>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, or return the existing index. The flag is `true` when the
    /// node was newly inserted.
    pub fn add_node(&mut self, id: &str, version: Version) -> (NodeIndex, bool) {
        if let Some(&idx) = self.index.get(id) {
            return (idx, false);
        }
        let idx = self.graph.add_node(GraphNode {
            id: id.to_string(),
            version,
        });
        self.index.insert(id.to_string(), idx);
        (idx, true)
    }

    pub fn set_root(&mut self, idx: NodeIndex) {
        self.root = Some(idx);
    }

    /// Add a dependency edge. Repeated declarations of the same target stay
    /// as parallel edges unless they are identical.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: DepEdge) {
        if !self
            .graph
            .edges(from)
            .any(|e| e.target() == to && *e.weight() == edge)
        {
            self.graph.add_edge(from, to, edge);
        }
    }

    pub fn record_missing(&mut self, missing: MissingDependency) {
        self.missing.push(missing);
    }

    pub fn find(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &GraphNode {
        &self.graph[idx]
    }

    pub fn id(&self, idx: NodeIndex) -> &str {
        &self.graph[idx].id
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn missing(&self) -> &[MissingDependency] {
        &self.missing
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Every node index, sorted by id.
    pub fn sorted_nodes(&self) -> Vec<NodeIndex> {
        let mut nodes: Vec<NodeIndex> = self.graph.node_indices().collect();
        nodes.sort_by(|a, b| self.id(*a).cmp(self.id(*b)));
        nodes
    }

    /// Direct dependencies of a node, in declaration order.
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        let mut out: Vec<(EdgeIndex, NodeIndex, &DepEdge)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target(), e.weight()))
            .collect();
        out.sort_by_key(|(eid, _, _)| *eid);
        out.into_iter().map(|(_, n, w)| (n, w)).collect()
    }

    /// Nodes that depend on `idx`.
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.source(), e.weight()))
            .collect()
    }

    /// Dependency targets of `idx`, sorted by id.
    pub fn sorted_neighbors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        out.sort_by(|a, b| self.id(*a).cmp(self.id(*b)));
        out.dedup();
        out
    }

    /// All edges in insertion order, as plain data.
    pub fn edges(&self) -> Vec<Edge> {
        self.graph
            .edge_references()
            .map(|e| Edge {
                from: self.id(e.source()).to_string(),
                to: self.id(e.target()).to_string(),
                constraint: e.weight().constraint.clone(),
                optional: e.weight().optional,
            })
            .collect()
    }
}

/// Builds the dependency closure of a root entity.
pub struct GraphBuilder;

impl GraphBuilder {
    /// Breadth-first expansion from `root_id`.
    ///
    /// Optional dependencies are skipped unless `include_optional` is set.
    /// Missing targets are recorded and expansion continues with everything
    /// else that is reachable. Each node is expanded at most once, so
    /// cyclic input terminates.
    ///
    /// # Errors
    ///
    /// `EntityNotFound` when the root itself is not in the lookup.
    pub fn build<L>(
        root_id: &str,
        lookup: &L,
        include_optional: bool,
    ) -> Result<DependencyGraph, DomainError>
    where
        L: EntityLookup + ?Sized,
    {
        let root = lookup
            .entity(root_id)
            .ok_or_else(|| DomainError::EntityNotFound {
                id: root_id.to_string(),
            })?;

        let mut graph = DependencyGraph::new();
        let (root_idx, _) = graph.add_node(&root.id, root.version.clone());
        graph.set_root(root_idx);

        let mut queue = VecDeque::from([root_idx]);
        while let Some(current) = queue.pop_front() {
            let current_id = graph.id(current).to_string();
            let Some(entity) = lookup.entity(&current_id) else {
                continue;
            };

            for dep in &entity.dependencies {
                if dep.optional && !include_optional {
                    debug!(from = %current_id, to = %dep.target_id, "Skipping optional dependency");
                    continue;
                }

                let Some(target) = lookup.entity(&dep.target_id) else {
                    debug!(from = %current_id, to = %dep.target_id, "Dependency missing from catalog");
                    graph.record_missing(MissingDependency {
                        required_by: current_id.clone(),
                        dependency: dep.clone(),
                    });
                    continue;
                };

                let (target_idx, inserted) = graph.add_node(&target.id, target.version.clone());
                graph.add_edge(
                    current,
                    target_idx,
                    DepEdge {
                        constraint: dep.constraint.clone(),
                        optional: dep.optional,
                    },
                );
                if inserted {
                    queue.push_back(target_idx);
                }
            }
        }

        debug!(
            root = %root_id,
            nodes = graph.node_count(),
            missing = graph.missing().len(),
            "Dependency graph built"
        );
        Ok(graph)
    }
}
