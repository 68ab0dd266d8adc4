//! Graphviz DOT output.

use std::collections::BTreeSet;
use std::fmt::Write;

use strata_core::domain::{ResolutionResult, VersionConstraint};

/// Render `result` as a DOT digraph.
///
/// The root is bold, nodes on a cycle are red, missing targets are dashed
/// red boxes, and optional edges are dashed.
pub fn render_dot(result: &ResolutionResult) -> String {
    let mut dot = String::from("digraph dependencies {\n");
    dot.push_str("  rankdir=TB;\n");
    dot.push_str("  node [shape=box];\n\n");

    let on_cycle: BTreeSet<&str> = result
        .circular_dependencies
        .iter()
        .flat_map(|c| c.nodes.iter().map(String::as_str))
        .collect();

    for (id, version) in &result.versions {
        let mut attrs = vec![format!("label=\"{}\\n{version}\"", escape(id))];
        if *id == result.root {
            attrs.push("style=bold".into());
        }
        if on_cycle.contains(id.as_str()) {
            attrs.push("color=red".into());
        }
        let _ = writeln!(dot, "  \"{}\" [{}];", escape(id), attrs.join(", "));
    }

    let missing: BTreeSet<&str> = result
        .missing_dependencies
        .iter()
        .map(|m| m.dependency.target_id.as_str())
        .collect();
    for id in &missing {
        let _ = writeln!(
            dot,
            "  \"{}\" [label=\"{} (missing)\", style=dashed, color=red];",
            escape(id),
            escape(id)
        );
    }

    dot.push('\n');

    for edge in &result.edges {
        let _ = writeln!(
            dot,
            "  \"{}\" -> \"{}\"{};",
            escape(&edge.from),
            escape(&edge.to),
            edge_attrs(&edge.constraint, edge.optional)
        );
    }
    for m in &result.missing_dependencies {
        let dep = &m.dependency;
        let _ = writeln!(
            dot,
            "  \"{}\" -> \"{}\"{};",
            escape(&m.required_by),
            escape(&dep.target_id),
            edge_attrs(&dep.constraint, dep.optional)
        );
    }

    dot.push_str("}\n");
    dot
}

fn edge_attrs(constraint: &VersionConstraint, optional: bool) -> String {
    let mut attrs = Vec::new();
    if *constraint != VersionConstraint::Any {
        attrs.push(format!("label=\"{}\"", escape(&constraint.to_string())));
    }
    if optional {
        attrs.push("style=dashed".to_string());
    }
    if attrs.is_empty() {
        String::new()
    } else {
        format!(" [{}]", attrs.join(", "))
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
