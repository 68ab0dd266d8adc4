//! Extension-aware renderer.
//!
//! Text is written verbatim. Structured content is serialized according to
//! the file extension: `.toml` as TOML, everything else as pretty JSON
//! (which is also valid YAML, so `.yaml`/`.yml` files stay loadable).

use std::path::Path;

use strata_core::{
    application::{ApplicationError, ports::ContentRenderer},
    domain::{ContentTree, FileContent, ProjectStructure, RelativePath},
    error::{StrataError, StrataResult},
};
use tracing::instrument;

/// Renders a content tree into a [`ProjectStructure`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatRenderer;

impl FormatRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ContentRenderer for FormatRenderer {
    #[instrument(skip_all, fields(files = tree.len(), root = %output_root.display()))]
    fn render(&self, tree: &ContentTree, output_root: &Path) -> StrataResult<ProjectStructure> {
        let mut structure = ProjectStructure::new(output_root);

        for dir in tree.directories() {
            structure.add_directory(dir);
        }
        for (path, content) in tree {
            structure.add_file(path.to_path_buf(), render_file(path, content)?);
        }

        structure.validate().map_err(StrataError::Domain)?;
        Ok(structure)
    }
}

fn render_file(path: &RelativePath, content: &FileContent) -> StrataResult<String> {
    let value = match content {
        FileContent::Text(text) => return Ok(text.clone()),
        FileContent::Structured(value) => value,
    };

    let rendered = match path.extension().as_deref() {
        Some("toml") => toml::to_string_pretty(value).map_err(|e| e.to_string()),
        _ => serde_json::to_string_pretty(value)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| e.to_string()),
    };

    rendered.map_err(|reason| {
        ApplicationError::RenderingFailed {
            reason: format!("{path}: {reason}"),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_core::domain::FsEntry;

    fn content_of(structure: &ProjectStructure, path: &str) -> String {
        structure
            .files()
            .find(|f| f.path == Path::new(path))
            .map(|f| f.content.clone())
            .unwrap()
    }

    #[test]
    fn text_is_verbatim() {
        let tree = ContentTree::new().with_file("src/main.rs", "fn main() {}\n");
        let structure = FormatRenderer.render(&tree, Path::new("/out")).unwrap();

        assert_eq!(content_of(&structure, "src/main.rs"), "fn main() {}\n");
        assert!(
            structure
                .entries()
                .iter()
                .any(|e| matches!(e, FsEntry::Directory(d) if d.path == Path::new("src")))
        );
    }

    #[test]
    fn structured_follows_extension() {
        let tree = ContentTree::new()
            .with_file("config.json", json!({"port": 80}))
            .with_file("Cargo.toml", json!({"package": {"name": "demo"}}))
            .with_file("config.yaml", json!({"a": 1}));
        let structure = FormatRenderer.render(&tree, Path::new("/out")).unwrap();

        assert_eq!(content_of(&structure, "config.json"), "{\n  \"port\": 80\n}\n");
        assert!(content_of(&structure, "Cargo.toml").contains("[package]"));
        assert!(content_of(&structure, "Cargo.toml").contains("name = \"demo\""));
        assert_eq!(content_of(&structure, "config.yaml"), "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn unrepresentable_toml_fails() {
        let tree = ContentTree::new().with_file("bad.toml", json!([1, 2]));
        let err = FormatRenderer.render(&tree, Path::new("/out")).unwrap_err();
        assert!(matches!(
            err,
            StrataError::Application(ApplicationError::RenderingFailed { .. })
        ));
    }
}
