//! Cycle detection over a [`DependencyGraph`].

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use super::graph::DependencyGraph;
use crate::domain::entities::Cycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

struct Frame {
    node: NodeIndex,
    neighbors: Vec<NodeIndex>,
    next: usize,
}

impl Frame {
    fn new(graph: &DependencyGraph, node: NodeIndex) -> Self {
        Self {
            node,
            neighbors: graph.sorted_neighbors(node),
            next: 0,
        }
    }
}

pub struct CycleDetector;

impl CycleDetector {
    /// Every distinct cycle reachable by a three-color DFS.
    ///
    /// Start nodes and neighbors are visited in id order, so the same graph
    /// always yields the same list. Each cycle is reported once regardless
    /// of which of its nodes the traversal entered through.
    pub fn detect(graph: &DependencyGraph) -> Vec<Cycle> {
        let mut color = vec![Color::White; graph.node_count()];
        let mut seen: HashSet<Cycle> = HashSet::new();
        let mut cycles = Vec::new();

        for start in graph.sorted_nodes() {
            if color[start.index()] != Color::White {
                continue;
            }

            color[start.index()] = Color::Gray;
            let mut stack = vec![Frame::new(graph, start)];

            while let Some(frame) = stack.last_mut() {
                if frame.next >= frame.neighbors.len() {
                    color[frame.node.index()] = Color::Black;
                    stack.pop();
                    continue;
                }

                let next = frame.neighbors[frame.next];
                frame.next += 1;

                match color[next.index()] {
                    Color::White => {
                        color[next.index()] = Color::Gray;
                        stack.push(Frame::new(graph, next));
                    }
                    Color::Gray => {
                        // Back edge: the cycle is the stack suffix starting at `next`.
                        if let Some(pos) = stack.iter().position(|f| f.node == next) {
                            let nodes = stack[pos..]
                                .iter()
                                .map(|f| graph.id(f.node).to_string())
                                .collect();
                            let cycle = Cycle::normalized(nodes);
                            if seen.insert(cycle.clone()) {
                                cycles.push(cycle);
                            }
                        }
                    }
                    Color::Black => {}
                }
            }
        }

        cycles
    }

    /// Ids taking part in any of `cycles`.
    pub fn members(cycles: &[Cycle]) -> HashSet<String> {
        cycles
            .iter()
            .flat_map(|c| c.nodes.iter().cloned())
            .collect()
    }
}
