//! `strata tree`: dependency tree of one root, optionally inverted.

use serde_json::json;
use tracing::instrument;

use strata_adapters::DependencyTree;

use crate::{
    cli::{GlobalArgs, TreeArgs},
    commands::{ensure_success, resolution_service},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(root = %args.root, depth = ?args.depth, invert = ?args.invert))]
pub fn execute(
    args: TreeArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let service = resolution_service(&global, &config, &args.resolution)?;
    let result = service.resolve(&args.root)?;
    let tree = DependencyTree::new(&result).max_depth(args.depth);

    let text = match &args.invert {
        Some(target) => tree.render_inverted(target).ok_or_else(|| CliError::InvalidInput {
            message: format!("'{target}' is not in the dependency graph of '{}'", args.root),
            source: None,
        })?,
        None => tree.render(),
    };

    if output.is_json() {
        let data = json!({
            "root": result.root,
            "inverted": args.invert,
            "tree": text,
            "edges": result.edges,
            "versions": result.versions,
        });
        output.json("tree", result.is_success(), &data)?;
    } else {
        output.data(&text)?;
        output.issues(&result)?;
    }

    ensure_success(&result)
}
