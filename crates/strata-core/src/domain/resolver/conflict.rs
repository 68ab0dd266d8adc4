//! Version conflict detection.

use std::collections::{BTreeMap, HashMap, VecDeque};

use petgraph::graph::NodeIndex;

use super::{constraint::ConstraintEvaluator, graph::DependencyGraph};
use crate::domain::entities::{Conflict, Edge};

pub struct ConflictResolver;

impl ConflictResolver {
    /// One [`Conflict`] per target that is asked for with two constraints
    /// no single version can meet.
    ///
    /// Only the first offending pair per target is reported. Targets are
    /// scanned in id order, declarers in edge insertion order.
    pub fn detect(graph: &DependencyGraph) -> Vec<Conflict> {
        let edges = graph.edges();
        let mut by_target: BTreeMap<&str, Vec<&Edge>> = BTreeMap::new();
        for edge in &edges {
            by_target.entry(edge.to.as_str()).or_default().push(edge);
        }

        let paths = RootPaths::new(graph);
        let mut conflicts = Vec::new();

        for (target, group) in by_target {
            if group.len() < 2 {
                continue;
            }
            if let Some((a, b)) = first_disjoint_pair(&group) {
                conflicts.push(Conflict {
                    target_id: target.to_string(),
                    constraint_a: a.constraint.clone(),
                    constraint_b: b.constraint.clone(),
                    path_a: paths.to_target(&a.from, target),
                    path_b: paths.to_target(&b.from, target),
                });
            }
        }

        conflicts
    }
}

fn first_disjoint_pair<'a>(group: &[&'a Edge]) -> Option<(&'a Edge, &'a Edge)> {
    for (i, a) in group.iter().enumerate() {
        for b in &group[i + 1..] {
            if a.constraint != b.constraint
                && !ConstraintEvaluator::intersects(&a.constraint, &b.constraint)
            {
                return Some((*a, *b));
            }
        }
    }
    None
}

/// Shortest path from the root to every node, by BFS in id order.
struct RootPaths<'g> {
    graph: &'g DependencyGraph,
    parent: HashMap<NodeIndex, NodeIndex>,
}

impl<'g> RootPaths<'g> {
    fn new(graph: &'g DependencyGraph) -> Self {
        let mut parent = HashMap::new();
        if let Some(root) = graph.root() {
            let mut queue = VecDeque::from([root]);
            while let Some(node) = queue.pop_front() {
                for next in graph.sorted_neighbors(node) {
                    if next != root && !parent.contains_key(&next) {
                        parent.insert(next, node);
                        queue.push_back(next);
                    }
                }
            }
        }
        Self { graph, parent }
    }

    /// `root -> ... -> declarer -> target`.
    fn to_target(&self, declarer: &str, target: &str) -> Vec<String> {
        let mut path = vec![target.to_string()];
        let mut cursor = self.graph.find(declarer);
        while let Some(node) = cursor {
            path.push(self.graph.id(node).to_string());
            cursor = self.parent.get(&node).copied();
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Dependency, Entity, entity_map};
    use crate::domain::resolver::graph::GraphBuilder;
    use semver::Version;

    fn graph(edges: &[(&str, &[(&str, &str)])], root: &str) -> DependencyGraph {
        let entities = edges.iter().map(|(id, deps)| {
            deps.iter().fold(Entity::new(*id, Version::new(1, 0, 0)), |e, (d, c)| {
                e.with_dependency(Dependency::parse(*d, c).unwrap())
            })
        });
        GraphBuilder::build(root, &entity_map(entities).unwrap(), false).unwrap()
    }

    #[test]
    fn disjoint_carets_conflict_once() {
        let g = graph(
            &[
                ("root", &[("a", "any"), ("b", "any")]),
                ("a", &[("x", "^1.0.0")]),
                ("b", &[("x", "^2.0.0")]),
                ("x", &[]),
            ],
            "root",
        );

        let conflicts = ConflictResolver::detect(&g);
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.target_id, "x");
        assert_eq!(c.path_a, vec!["root", "a", "x"]);
        assert_eq!(c.path_b, vec!["root", "b", "x"]);
    }

    #[test]
    fn same_declarer_with_disjoint_carets_conflicts() {
        let g = graph(
            &[("root", &[("x", "^1.0.0"), ("x", "^2.0.0")]), ("x", &[])],
            "root",
        );

        let conflicts = ConflictResolver::detect(&g);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].target_id, "x");
        assert_eq!(conflicts[0].path_a, vec!["root", "x"]);
        assert_eq!(conflicts[0].path_b, vec!["root", "x"]);
    }

    #[test]
    fn intersecting_constraints_are_not_conflicts() {
        let g = graph(
            &[
                ("root", &[("a", "any"), ("x", ">=1.0.0")]),
                ("a", &[("x", "^1.0.0")]),
                ("x", &[]),
            ],
            "root",
        );
        assert!(ConflictResolver::detect(&g).is_empty());
    }

    #[test]
    fn only_first_pair_per_target_is_reported() {
        let g = graph(
            &[
                ("root", &[("a", "any"), ("b", "any"), ("c", "any")]),
                ("a", &[("x", "=1.0.0")]),
                ("b", &[("x", "=2.0.0")]),
                ("c", &[("x", "=3.0.0")]),
                ("x", &[]),
            ],
            "root",
        );
        assert_eq!(ConflictResolver::detect(&g).len(), 1);
    }
}
