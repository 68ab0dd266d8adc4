//! Folding content trees along an inheritance chain.
//!
//! The engine is pure: same chain, same strategy, same trees in, same tree
//! out. Anything worth telling the user about a merge (a scalar overridden,
//! a file that could not be concatenated) is returned as a [`MergeNote`]
//! and logged at `info`, never raised as an error.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::domain::{
    entities::{ContentTree, FileContent, RelativePath},
    validation::ValidatedChain,
    value_objects::CompositionStrategy,
};

/// Informational note produced while folding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeNote {
    /// Entity whose tree was being folded in.
    pub entity: String,
    pub path: String,
    pub detail: String,
}

impl fmt::Display for MergeNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path, self.entity, self.detail)
    }
}

/// Merged tree plus the notes collected on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    pub tree: ContentTree,
    pub notes: Vec<MergeNote>,
}

pub struct CompositionEngine;

impl CompositionEngine {
    /// Compose a validated chain, furthest ancestor first.
    pub fn compose(chain: &ValidatedChain, strategy: CompositionStrategy) -> Composition {
        Self::compose_trees(
            chain.trees.iter().map(|(id, tree)| (id.as_str(), tree)),
            strategy,
        )
    }

    /// Fold `trees` in iteration order into an initially empty tree.
    pub fn compose_trees<'a, I>(trees: I, strategy: CompositionStrategy) -> Composition
    where
        I: IntoIterator<Item = (&'a str, &'a ContentTree)>,
    {
        let mut acc = Composition::default();
        for (entity, tree) in trees {
            debug!(%entity, files = tree.len(), %strategy, "Folding content tree");
            fold(&mut acc, entity, tree, strategy);
        }

        for note in &acc.notes {
            info!("{note}");
        }
        acc
    }
}

fn fold(acc: &mut Composition, entity: &str, incoming: &ContentTree, strategy: CompositionStrategy) {
    for (path, content) in incoming {
        let Some(existing) = acc.tree.get_mut(path) else {
            acc.tree.insert(path.clone(), content.clone());
            continue;
        };

        let mut notes = Notes {
            entity,
            path,
            out: &mut acc.notes,
        };
        match strategy {
            CompositionStrategy::Override => *existing = content.clone(),
            CompositionStrategy::Merge => merge_file(existing, content, &mut notes),
            CompositionStrategy::Append => {
                *existing = concatenate(existing, content, &mut notes);
            }
            CompositionStrategy::Prepend => {
                *existing = concatenate(content, existing, &mut notes);
            }
        }
    }
}

struct Notes<'a> {
    entity: &'a str,
    path: &'a RelativePath,
    out: &'a mut Vec<MergeNote>,
}

impl Notes<'_> {
    fn push(&mut self, detail: String) {
        self.out.push(MergeNote {
            entity: self.entity.to_string(),
            path: self.path.to_string(),
            detail,
        });
    }
}

fn merge_file(existing: &mut FileContent, incoming: &FileContent, notes: &mut Notes<'_>) {
    match (existing, incoming) {
        (FileContent::Structured(base), FileContent::Structured(over))
            if base.is_object() && over.is_object() =>
        {
            merge_values(base, over, "", notes);
        }
        (existing, incoming) => {
            if existing != incoming {
                notes.push("content is not key/value data; later entity replaces it".into());
            }
            *existing = incoming.clone();
        }
    }
}

/// Deep key-by-key merge. Objects recurse, anything else is overridden by
/// `over`, with a note when the value actually changes.
fn merge_values(base: &mut Value, over: &Value, pointer: &str, notes: &mut Notes<'_>) {
    match (base, over) {
        (Value::Object(base_map), Value::Object(over_map)) => {
            for (key, value) in over_map {
                let child_pointer = format!("{pointer}/{key}");
                match base_map.get_mut(key) {
                    Some(slot) => merge_values(slot, value, &child_pointer, notes),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, over) => {
            if *base != *over {
                notes.push(format!(
                    "{} overridden: {} -> {}",
                    display_pointer(pointer),
                    base,
                    over
                ));
            }
            *base = over.clone();
        }
    }
}

fn display_pointer(pointer: &str) -> &str {
    if pointer.is_empty() { "/" } else { pointer }
}

/// `first` followed by `second`.
///
/// Text joins text, arrays join arrays, JSON strings join JSON strings.
/// Any other pairing cannot be concatenated; `second` wins and a note
/// records it.
fn concatenate(first: &FileContent, second: &FileContent, notes: &mut Notes<'_>) -> FileContent {
    match (first, second) {
        (FileContent::Text(a), FileContent::Text(b)) => FileContent::Text(format!("{a}{b}")),
        (FileContent::Structured(Value::Array(a)), FileContent::Structured(Value::Array(b))) => {
            FileContent::Structured(Value::Array(a.iter().chain(b).cloned().collect()))
        }
        (FileContent::Structured(Value::String(a)), FileContent::Structured(Value::String(b))) => {
            FileContent::Structured(Value::String(format!("{a}{b}")))
        }
        (FileContent::Structured(Value::Object(a)), FileContent::Structured(Value::Object(b))) => {
            // Key order follows concatenation order; values of shared keys
            // come from `second`.
            let mut map: Map<String, Value> = a.clone();
            for (k, v) in b {
                map.insert(k.clone(), v.clone());
            }
            if a.keys().any(|k| b.contains_key(k)) {
                notes.push("shared keys while concatenating objects; later values kept".into());
            }
            FileContent::Structured(Value::Object(map))
        }
        _ => {
            notes.push("contents cannot be concatenated; later entity replaces it".into());
            second.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compose(trees: &[(&str, ContentTree)], strategy: CompositionStrategy) -> Composition {
        CompositionEngine::compose_trees(trees.iter().map(|(id, t)| (*id, t)), strategy)
    }

    fn text(c: &Composition, path: &str) -> String {
        c.tree
            .get(&path.into())
            .and_then(FileContent::as_text)
            .unwrap()
            .to_string()
    }

    #[test]
    fn single_tree_is_returned_unchanged() {
        let tree = ContentTree::new()
            .with_file("README.md", "# hi")
            .with_file("config.json", json!({"a": 1}));

        for strategy in CompositionStrategy::ALL {
            let result = compose(&[("only", tree.clone())], strategy);
            assert_eq!(result.tree, tree, "{strategy}");
            assert!(result.notes.is_empty());
        }
    }

    #[test]
    fn override_replaces_and_merge_unions() {
        let parent = ContentTree::new().with_file("config.yaml", json!({"a": 1}));
        let child = ContentTree::new().with_file("config.yaml", json!({"b": 2}));
        let chain = [("parent", parent), ("child", child)];

        let overridden = compose(&chain, CompositionStrategy::Override);
        assert_eq!(
            overridden.tree.get(&"config.yaml".into()),
            Some(&FileContent::Structured(json!({"b": 2})))
        );

        let merged = compose(&chain, CompositionStrategy::Merge);
        assert_eq!(
            merged.tree.get(&"config.yaml".into()),
            Some(&FileContent::Structured(json!({"a": 1, "b": 2})))
        );
    }

    #[test]
    fn merge_is_deep_and_notes_scalar_conflicts() {
        let parent = ContentTree::new().with_file(
            "settings.json",
            json!({"server": {"port": 80, "host": "localhost"}, "debug": false}),
        );
        let child = ContentTree::new()
            .with_file("settings.json", json!({"server": {"port": 8080}, "name": "api"}));

        let merged = compose(
            &[("base", parent), ("api", child)],
            CompositionStrategy::Merge,
        );
        assert_eq!(
            merged.tree.get(&"settings.json".into()),
            Some(&FileContent::Structured(json!({
                "server": {"port": 8080, "host": "localhost"},
                "debug": false,
                "name": "api"
            })))
        );
        assert_eq!(merged.notes.len(), 1);
        assert_eq!(merged.notes[0].entity, "api");
        assert!(merged.notes[0].detail.contains("/server/port"));
    }

    #[test]
    fn append_and_prepend_concatenate() {
        let parent = ContentTree::new().with_file("CHANGELOG.md", "v1");
        let child = ContentTree::new().with_file("CHANGELOG.md", "v2");
        let chain = [("parent", parent), ("child", child)];

        assert_eq!(text(&compose(&chain, CompositionStrategy::Append), "CHANGELOG.md"), "v1v2");
        assert_eq!(text(&compose(&chain, CompositionStrategy::Prepend), "CHANGELOG.md"), "v2v1");
    }

    #[test]
    fn unique_paths_pass_through_in_order() {
        let parent = ContentTree::new()
            .with_file("a.txt", "a")
            .with_file("shared.txt", "p");
        let child = ContentTree::new()
            .with_file("shared.txt", "c")
            .with_file("b.txt", "b");

        let result = compose(&[("p", parent), ("c", child)], CompositionStrategy::Append);
        let paths: Vec<&str> = result.tree.paths().map(RelativePath::as_str).collect();
        assert_eq!(paths, vec!["a.txt", "shared.txt", "b.txt"]);
        assert_eq!(text(&result, "shared.txt"), "pc");
    }

    #[test]
    fn mixed_contents_fall_back_to_later_entity() {
        let parent = ContentTree::new().with_file("data.json", json!({"k": 1}));
        let child = ContentTree::new().with_file("data.json", "raw");

        let result = compose(&[("p", parent), ("c", child)], CompositionStrategy::Append);
        assert_eq!(text(&result, "data.json"), "raw");
        assert_eq!(result.notes.len(), 1);
    }

    #[test]
    fn composing_twice_is_identical() {
        let parent = ContentTree::new().with_file("x.json", json!({"a": [1], "b": {"c": 1}}));
        let child = ContentTree::new().with_file("x.json", json!({"b": {"d": 2}, "a": [2]}));
        let chain = [("p", parent), ("c", child)];

        let first = serde_json::to_string(&compose(&chain, CompositionStrategy::Merge).tree).unwrap();
        let second = serde_json::to_string(&compose(&chain, CompositionStrategy::Merge).tree).unwrap();
        assert_eq!(first, second);
    }
}
