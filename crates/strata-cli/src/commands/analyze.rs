//! `strata analyze`: summarise resolution for several roots.

use tracing::instrument;

use crate::{
    cli::{AnalyzeArgs, GlobalArgs},
    commands::{failure_count, resolution_service},
    config::AppConfig,
    error::{CliError, CliResult},
    output::{OutputManager, format_summary},
};

#[instrument(skip_all, fields(recursive = args.recursive, roots = args.roots.len()))]
pub fn execute(
    args: AnalyzeArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let service = resolution_service(&global, &config, &args.resolution)?;
    let results = if args.recursive {
        service.resolve_catalog()?
    } else {
        service.resolve_all(&args.roots)?
    };

    let failed = results.iter().filter(|r| !r.is_success()).count();

    if output.is_json() {
        output.json("analyze", failed == 0, &results)?;
    } else {
        output.header(&format!("Dependency analysis ({} roots)", results.len()))?;
        output.data(&format_summary(&results))?;
        for result in results.iter().filter(|r| r.issue_count() > 0) {
            output.print("")?;
            output.header(&format!("{}:", result.root))?;
            output.issues(result)?;
        }
    }

    if failed > 0 {
        return Err(CliError::ResolutionFailed {
            subject: format!("{failed} of {} roots", results.len()),
            issues: results.iter().map(failure_count).sum(),
        });
    }
    Ok(())
}
