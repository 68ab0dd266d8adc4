//! Template content as an ordered path → content map.
//!
//! Directories are implicit: `src/lib.rs` implies `src/`. Insertion order is
//! preserved so that composing the same inputs always yields the same output
//! ordering.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::common::RelativePath;

/// The content of one file.
///
/// `Structured` holds key/value data (decoded from JSON or TOML by the
/// loader) and is what the `Merge` strategy merges key-by-key. Everything
/// else is `Text` and treated as opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileContent {
    Text(String),
    Structured(Value),
}

impl FileContent {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Structured(_) => None,
        }
    }
}

impl From<&str> for FileContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FileContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Value> for FileContent {
    fn from(v: Value) -> Self {
        Self::Structured(v)
    }
}

/// Ordered mapping of relative path to file content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTree {
    files: IndexMap<RelativePath, FileContent>,
}

impl ContentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file, keeping its original position on replace.
    pub fn insert(&mut self, path: RelativePath, content: FileContent) -> Option<FileContent> {
        self.files.insert(path, content)
    }

    /// Fluent variant of `insert` for builder chains.
    pub fn with_file(mut self, path: impl Into<RelativePath>, content: impl Into<FileContent>) -> Self {
        self.insert(path.into(), content.into());
        self
    }

    pub fn get(&self, path: &RelativePath) -> Option<&FileContent> {
        self.files.get(path)
    }

    pub fn get_mut(&mut self, path: &RelativePath) -> Option<&mut FileContent> {
        self.files.get_mut(path)
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.files.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RelativePath, &FileContent)> {
        self.files.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &RelativePath> {
        self.files.keys()
    }

    /// Implicit directories, shallowest first, deduplicated.
    pub fn directories(&self) -> Vec<String> {
        let mut dirs: Vec<String> = Vec::new();
        for path in self.files.keys() {
            let parts: Vec<&str> = path.as_str().split('/').collect();
            for depth in 1..parts.len() {
                let dir = parts[..depth].join("/");
                if !dirs.contains(&dir) {
                    dirs.push(dir);
                }
            }
        }
        dirs.sort_by_key(|d| d.matches('/').count());
        dirs
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<'a> IntoIterator for &'a ContentTree {
    type Item = (&'a RelativePath, &'a FileContent);
    type IntoIter = indexmap::map::Iter<'a, RelativePath, FileContent>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl FromIterator<(RelativePath, FileContent)> for ContentTree {
    fn from_iter<T: IntoIterator<Item = (RelativePath, FileContent)>>(iter: T) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

/// Source of content trees, keyed by entity id.
///
/// Returning `None` means the entity's metadata existed but its files could
/// not be loaded. Implementations should log the underlying reason.
pub trait ContentTreeProvider {
    fn content_tree(&self, id: &str) -> Option<ContentTree>;
}

impl ContentTreeProvider for BTreeMap<String, ContentTree> {
    fn content_tree(&self, id: &str) -> Option<ContentTree> {
        self.get(id).cloned()
    }
}

impl ContentTreeProvider for HashMap<String, ContentTree> {
    fn content_tree(&self, id: &str) -> Option<ContentTree> {
        self.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replace_keeps_position() {
        let mut tree = ContentTree::new()
            .with_file("a.txt", "1")
            .with_file("b.txt", "2");
        tree.insert("a.txt".into(), "3".into());

        let paths: Vec<&str> = tree.paths().map(RelativePath::as_str).collect();
        assert_eq!(paths, vec!["a.txt", "b.txt"]);
        assert_eq!(tree.get(&"a.txt".into()), Some(&FileContent::text("3")));
    }

    #[test]
    fn directories_are_implicit_prefixes() {
        let tree = ContentTree::new()
            .with_file("src/bin/main.rs", "")
            .with_file("src/lib.rs", "")
            .with_file("README.md", "");

        assert_eq!(tree.directories(), vec!["src", "src/bin"]);
    }

    #[test]
    fn serializes_as_flat_map() {
        let tree = ContentTree::new()
            .with_file("notes.txt", "hi")
            .with_file("config.json", json!({"a": 1}));

        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value, json!({"notes.txt": "hi", "config.json": {"a": 1}}));
    }
}
