//! Topological ordering of an acyclic dependency graph.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use petgraph::graph::NodeIndex;

use super::graph::DependencyGraph;
use crate::domain::error::DomainError;

pub struct TopologicalSorter;

impl TopologicalSorter {
    /// Kahn's algorithm over the nodes not listed in `excluded`.
    ///
    /// Dependencies come before their dependents. Among nodes that are ready
    /// at the same time the smallest id goes first. Edges into excluded
    /// nodes are ignored.
    ///
    /// # Errors
    ///
    /// `InternalConsistency` when nodes remain after the ready set runs dry,
    /// i.e. a cycle was not excluded.
    pub fn sort(
        graph: &DependencyGraph,
        excluded: &HashSet<String>,
    ) -> Result<Vec<String>, DomainError> {
        let included: Vec<_> = graph
            .sorted_nodes()
            .into_iter()
            .filter(|n| !excluded.contains(graph.id(*n)))
            .collect();

        // Pending dependency count per node, indexed by node index.
        let mut pending = vec![0usize; graph.node_count()];
        for &node in &included {
            pending[node.index()] = graph
                .sorted_neighbors(node)
                .into_iter()
                .filter(|dep| !excluded.contains(graph.id(*dep)))
                .count();
        }

        let mut ready: BinaryHeap<Reverse<(&str, usize)>> = included
            .iter()
            .filter(|n| pending[n.index()] == 0)
            .map(|n| Reverse((graph.id(*n), n.index())))
            .collect();

        let mut order = Vec::with_capacity(included.len());
        while let Some(Reverse((id, index))) = ready.pop() {
            order.push(id.to_string());
            let node = NodeIndex::new(index);

            let mut dependents: Vec<_> = graph
                .dependents_of(node)
                .into_iter()
                .map(|(n, _)| n)
                .filter(|n| !excluded.contains(graph.id(*n)))
                .collect();
            dependents.sort();
            dependents.dedup();

            for dependent in dependents {
                let slot = &mut pending[dependent.index()];
                *slot -= 1;
                if *slot == 0 {
                    ready.push(Reverse((graph.id(dependent), dependent.index())));
                }
            }
        }

        if order.len() != included.len() {
            let emitted: HashSet<&str> = order.iter().map(String::as_str).collect();
            let stuck: Vec<&str> = included
                .iter()
                .map(|n| graph.id(*n))
                .filter(|id| !emitted.contains(id))
                .collect();
            return Err(DomainError::InternalConsistency {
                message: format!(
                    "topological sort stalled with {} node(s) left: {}",
                    stuck.len(),
                    stuck.join(", ")
                ),
            });
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Dependency, Entity, entity_map};
    use crate::domain::resolver::{cycles::CycleDetector, graph::GraphBuilder};
    use crate::domain::value_objects::VersionConstraint;
    use semver::Version;

    fn graph(edges: &[(&str, &[&str])], root: &str) -> DependencyGraph {
        let entities = edges.iter().map(|(id, deps)| {
            deps.iter().fold(Entity::new(*id, Version::new(1, 0, 0)), |e, d| {
                e.with_dependency(Dependency::new(*d, VersionConstraint::Any))
            })
        });
        GraphBuilder::build(root, &entity_map(entities).unwrap(), false).unwrap()
    }

    fn position(order: &[String], id: &str) -> usize {
        order.iter().position(|o| o == id).unwrap()
    }

    #[test]
    fn dependencies_precede_dependents() {
        let g = graph(
            &[
                ("app", &["web", "db"]),
                ("web", &["http", "log"]),
                ("db", &["log"]),
                ("http", &["log"]),
                ("log", &[]),
            ],
            "app",
        );
        let order = TopologicalSorter::sort(&g, &HashSet::new()).unwrap();

        for edge in g.edges() {
            assert!(position(&order, &edge.to) < position(&order, &edge.from));
        }
        assert_eq!(order.last().map(String::as_str), Some("app"));
    }

    #[test]
    fn ties_break_lexicographically() {
        let g = graph(
            &[("root", &["c", "a", "b"]), ("a", &[]), ("b", &[]), ("c", &[])],
            "root",
        );
        let order = TopologicalSorter::sort(&g, &HashSet::new()).unwrap();
        assert_eq!(order, vec!["a", "b", "c", "root"]);
    }

    #[test]
    fn cyclic_nodes_are_left_out() {
        let g = graph(
            &[("root", &["x", "ok"]), ("x", &["y"]), ("y", &["x"]), ("ok", &[])],
            "root",
        );
        let excluded = CycleDetector::members(&CycleDetector::detect(&g));
        let order = TopologicalSorter::sort(&g, &excluded).unwrap();
        assert_eq!(order, vec!["ok", "root"]);
    }

    #[test]
    fn unexcluded_cycle_is_an_internal_error() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])], "a");
        let err = TopologicalSorter::sort(&g, &HashSet::new()).unwrap_err();
        assert!(matches!(err, DomainError::InternalConsistency { .. }));
    }
}
