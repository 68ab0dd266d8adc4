//! `├──`/`└──` dependency trees.

use std::collections::HashSet;

use strata_core::domain::{ResolutionResult, VersionConstraint};

/// Tree view over one resolution result.
///
/// Shared dependencies are printed under every dependent. A dependency that
/// is already on the current path is printed once more, marked `(cycle)`,
/// and not expanded.
pub struct DependencyTree<'a> {
    result: &'a ResolutionResult,
    max_depth: Option<usize>,
}

impl<'a> DependencyTree<'a> {
    pub fn new(result: &'a ResolutionResult) -> Self {
        Self {
            result,
            max_depth: None,
        }
    }

    /// Stop expanding below `depth` levels under the root.
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Root first, dependencies below it.
    pub fn render(&self) -> String {
        let root = self.result.root.as_str();
        let mut output = format!("{}\n", self.label(root));
        let mut path = HashSet::from([root]);
        self.print_children(&mut output, root, "", 1, &mut path);
        output
    }

    /// Everything that depends on `target`, walking edges backwards.
    /// `None` when `target` was not reached by the resolution.
    pub fn render_inverted(&self, target: &str) -> Option<String> {
        if !self.result.versions.contains_key(target) {
            return None;
        }

        let mut output = format!("{}\n", self.label(target));
        let mut path = HashSet::from([target]);
        self.print_dependents(&mut output, target, "", &mut path);
        Some(output)
    }

    fn print_children<'r>(
        &'r self,
        output: &mut String,
        id: &'r str,
        prefix: &str,
        depth: usize,
        path: &mut HashSet<&'r str>,
    ) {
        if self.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        let mut lines: Vec<(String, Option<&'r str>)> = self
            .result
            .edges_from(id)
            .map(|edge| {
                let mut line = self.label(&edge.to);
                line.push_str(&edge_suffix(&edge.constraint, edge.optional));
                (line, Some(edge.to.as_str()))
            })
            .collect();
        lines.extend(
            self.result
                .missing_dependencies
                .iter()
                .filter(|m| m.required_by == id)
                .map(|m| {
                    let dep = &m.dependency;
                    let mut line = dep.target_id.clone();
                    line.push_str(&edge_suffix(&dep.constraint, dep.optional));
                    line.push_str(" [missing]");
                    (line, None)
                }),
        );

        let count = lines.len();
        for (i, (mut line, child)) in lines.into_iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { "└── " } else { "├── " };

            let on_path = child.is_some_and(|c| path.contains(c));
            if on_path {
                line.push_str(" (cycle)");
            }
            output.push_str(&format!("{prefix}{connector}{line}\n"));

            if let Some(child) = child.filter(|_| !on_path) {
                let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
                path.insert(child);
                self.print_children(output, child, &child_prefix, depth + 1, path);
                path.remove(child);
            }
        }
    }

    fn print_dependents<'r>(
        &'r self,
        output: &mut String,
        id: &'r str,
        prefix: &str,
        path: &mut HashSet<&'r str>,
    ) {
        let mut dependents: Vec<&'r str> = self
            .result
            .edges
            .iter()
            .filter(|e| e.to == id)
            .map(|e| e.from.as_str())
            .collect();
        dependents.sort_unstable();
        dependents.dedup();

        let count = dependents.len();
        for (i, dependent) in dependents.into_iter().enumerate() {
            let is_last = i + 1 == count;
            let connector = if is_last { "└── " } else { "├── " };
            let on_path = path.contains(dependent);
            let marker = if on_path { " (cycle)" } else { "" };
            output.push_str(&format!("{prefix}{connector}{}{marker}\n", self.label(dependent)));

            if !on_path {
                let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
                path.insert(dependent);
                self.print_dependents(output, dependent, &child_prefix, path);
                path.remove(dependent);
            }
        }
    }

    fn label(&self, id: &str) -> String {
        let mut label = match self.result.versions.get(id) {
            Some(version) => format!("{id} v{version}"),
            None => id.to_string(),
        };
        if self.result.is_satisfied_locally(id) {
            label.push_str(" [installed]");
        }
        label
    }
}

fn edge_suffix(constraint: &VersionConstraint, optional: bool) -> String {
    let mut suffix = String::new();
    if *constraint != VersionConstraint::Any {
        suffix.push_str(&format!(" ({constraint})"));
    }
    if optional {
        suffix.push_str(" [optional]");
    }
    suffix
}
