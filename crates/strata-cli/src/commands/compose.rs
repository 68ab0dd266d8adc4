//! `strata compose`: fold templates along their inheritance chains.
//!
//! Without `--output` the composed trees are only reported. With it, a
//! single template is rendered and written under the directory (or, with
//! `--dry-run`, the paths that would be written are listed).

use std::path::Path;

use serde_json::json;
use tracing::{info, instrument};

use strata_core::{
    application::{ComposeOutcome, CompositionService},
    domain::CompositionStrategy,
    error::StrataResult,
};

use crate::{
    cli::{ComposeArgs, GlobalArgs},
    commands::composition_service,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(templates = args.templates.len(), output = ?args.output))]
pub fn execute(
    args: ComposeArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let strategy = args
        .strategy
        .map(CompositionStrategy::from)
        .unwrap_or(config.composition.default_strategy);
    let service = composition_service(&global, &config)?;

    match &args.output {
        Some(dir) => {
            let [template] = args.templates.as_slice() else {
                return Err(CliError::InvalidInput {
                    message: "--output takes exactly one template".into(),
                    source: None,
                });
            };
            write_one(&service, template, strategy, dir, args.dry_run, &output)
        }
        None => report_all(&service, &args.templates, strategy, &output),
    }
}

fn write_one(
    service: &CompositionService,
    template: &str,
    strategy: CompositionStrategy,
    dir: &Path,
    dry_run: bool,
    output: &OutputManager,
) -> CliResult<()> {
    let outcome = if dry_run {
        service.compose(template, strategy)?
    } else {
        service.compose_to(template, strategy, dir)?
    };

    let paths: Vec<String> = outcome
        .composition
        .tree
        .paths()
        .map(|p| dir.join(p.to_path_buf()).display().to_string())
        .collect();

    if output.is_json() {
        let data = json!({
            "template": template,
            "output": dir.display().to_string(),
            "dry_run": dry_run,
            "chain": outcome.chain,
            "strategy": strategy,
            "files": paths,
            "notes": outcome.composition.notes,
            "warnings": outcome.warnings,
        });
        return output.json("compose", true, &data);
    }

    for warning in &outcome.warnings {
        output.warning(&warning.to_string())?;
    }
    if dry_run {
        output.header(&format!("Would write {} files:", paths.len()))?;
        output.data(&paths.join("\n"))?;
        output.info("Dry run, nothing written")?;
    } else {
        info!(files = paths.len(), "Composed template written");
        output.success(&format!(
            "Composed {} ({}) into {} ({} files)",
            template,
            outcome.chain,
            dir.display(),
            paths.len()
        ))?;
    }
    Ok(())
}

fn report_all(
    service: &CompositionService,
    templates: &[String],
    strategy: CompositionStrategy,
    output: &OutputManager,
) -> CliResult<()> {
    let results = service.compose_all(templates, strategy);

    if output.is_json() {
        let documents: Vec<_> = results
            .iter()
            .map(|(template, result)| match result {
                Ok(outcome) => json!({
                    "template": template,
                    "success": true,
                    "chain": outcome.chain,
                    "strategy": outcome.strategy,
                    "tree": outcome.composition.tree,
                    "notes": outcome.composition.notes,
                    "warnings": outcome.warnings,
                }),
                Err(e) => json!({
                    "template": template,
                    "success": false,
                    "error": e.to_string(),
                }),
            })
            .collect();
        let success = results.iter().all(|(_, r)| r.is_ok());
        output.json("compose", success, &documents)?;
    } else {
        for (template, result) in &results {
            print_outcome(output, template, result)?;
        }
    }

    // The first failure decides the exit code.
    match results.into_iter().find_map(|(_, r)| r.err()) {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn print_outcome(
    output: &OutputManager,
    template: &str,
    result: &StrataResult<ComposeOutcome>,
) -> CliResult<()> {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            output.error(&format!("{template}: {e}"))?;
            return Ok(());
        }
    };

    output.header(&format!(
        "{template} ({}, {})",
        outcome.chain, outcome.strategy
    ))?;
    let files: Vec<String> = outcome
        .composition
        .tree
        .paths()
        .map(|p| format!("  {p}"))
        .collect();
    if !files.is_empty() {
        output.data(&files.join("\n"))?;
    }
    for note in &outcome.composition.notes {
        output.info(&note.to_string())?;
    }
    for warning in &outcome.warnings {
        output.warning(&warning.to_string())?;
    }
    Ok(())
}
