//! `strata resolve`: install order of one root in the chosen view.

use tracing::instrument;

use strata_adapters::{DependencyTree, render_dot};

use crate::{
    cli::{GlobalArgs, ReportFormat, ResolveArgs},
    commands::{ensure_success, resolution_service},
    config::AppConfig,
    error::CliResult,
    output::{OutputManager, format_install_order},
};

/// `--output-format json` overrides `--format`.
#[instrument(skip_all, fields(root = %args.root, format = ?args.format))]
pub fn execute(
    args: ResolveArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let service = resolution_service(&global, &config, &args.resolution)?;
    let result = service.resolve(&args.root)?;

    let format = if output.is_json() {
        ReportFormat::Json
    } else {
        args.format
    };

    match format {
        ReportFormat::Json => output.json("resolve", result.is_success(), &result)?,
        ReportFormat::Dot => output.data(&render_dot(&result))?,
        ReportFormat::Tree => {
            output.data(&DependencyTree::new(&result).render())?;
            output.issues(&result)?;
        }
        ReportFormat::Table => {
            let version = result
                .versions
                .get(&result.root)
                .map(|v| format!(" v{v}"))
                .unwrap_or_default();
            output.header(&format!(
                "Install order for {}{version} ({} entities)",
                result.root,
                result.install_order.len()
            ))?;
            output.data(&format_install_order(&result))?;
            output.issues(&result)?;
            if result.is_success() {
                output.success(&format!("{} resolved", result.root))?;
            }
        }
    }

    ensure_success(&result)
}
