//! `strata check`: dependency and inheritance validation.
//!
//! Unlike `resolve`, any finding fails the check, warnings included.

use serde_json::json;
use tracing::{instrument, warn};

use strata_core::application::CheckReport;

use crate::{
    cli::{CheckArgs, GlobalArgs},
    commands::resolution_service,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(root = ?args.root, all = args.all))]
pub fn execute(
    args: CheckArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let service = resolution_service(&global, &config, &args.resolution)?;

    // A single explicit root propagates hard errors (unknown id -> exit 3).
    // With --all every root is reported and hard errors count as issues.
    let single = !args.all;
    let roots = match args.root {
        Some(root) => vec![root],
        None => service.catalog_ids()?,
    };
    let mut total = 0;
    let mut documents = Vec::new();

    for root in &roots {
        let report = match service.check(root) {
            Ok(report) => report,
            Err(e) if !single => {
                warn!(%root, error = %e, "Check aborted");
                total += 1;
                if output.is_json() {
                    documents.push(json!({ "root": root, "issues": 1, "error": e.to_string() }));
                } else {
                    output.error(&format!("{root}: {e}"))?;
                }
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        total += report.issue_count();
        if output.is_json() {
            documents.push(document(root, &report));
        } else {
            print_report(&output, root, &report)?;
        }
    }

    if output.is_json() {
        output.json("check", total == 0, &documents)?;
    }

    if total > 0 {
        let subject = if single {
            format!("'{}'", roots[0])
        } else {
            format!("{} entities", roots.len())
        };
        return Err(CliError::CheckFailed {
            subject,
            issues: total,
        });
    }
    Ok(())
}

fn document(root: &str, report: &CheckReport) -> serde_json::Value {
    json!({
        "root": root,
        "issues": report.issue_count(),
        "resolution": report.resolution,
        "inheritance": report.inheritance,
        "inheritance_error": report.inheritance_error.as_ref().map(ToString::to_string),
    })
}

fn print_report(output: &OutputManager, root: &str, report: &CheckReport) -> CliResult<()> {
    output.header(root)?;
    output.issues(&report.resolution)?;

    if let Some(inheritance) = &report.inheritance {
        output.info(&format!("chain: {}", inheritance.chain))?;
        for warning in &inheritance.warnings {
            output.warning(&warning.to_string())?;
        }
    }
    if let Some(error) = &report.inheritance_error {
        output.error(&error.to_string())?;
    }

    if report.is_clean() {
        output.success(&format!("{root}: no issues"))?;
    }
    Ok(())
}
