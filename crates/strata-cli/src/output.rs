//! Output management and formatting.
//!
//! Commands never print directly. They hand messages to [`OutputManager`],
//! which decides on colour, quiet mode and JSON, and render reports with
//! the `format_*` helpers below.

use std::io::{self, IsTerminal};

use clap::ValueEnum;
use console::Term;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

use strata_core::domain::ResolutionResult;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;
use crate::error::{CliError, CliResult};

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    ///
    /// The flag wins over `output.format` from the config; `auto` picks
    /// human output on a terminal and plain output otherwise.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let requested = match args.output_format {
            OutputFormat::Auto => {
                OutputFormat::from_str(&config.output.format, true).unwrap_or(OutputFormat::Auto)
            }
            explicit => explicit,
        };
        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// The primary result of a command (a report, a DOT graph, a script).
    /// Written even in quiet mode.
    pub fn data(&self, text: &str) -> io::Result<()> {
        self.term.write_str(text)?;
        if !text.ends_with('\n') {
            self.term.write_line("")?;
        }
        Ok(())
    }

    /// Write `data` wrapped in the JSON envelope shared by every command.
    pub fn json<T: Serialize>(&self, command: &str, success: bool, data: &T) -> CliResult<()> {
        let text = serde_json::to_string_pretty(&envelope(command, success, data)?)
            .map_err(json_error)?;
        self.data(&text)?;
        Ok(())
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}") // ✓
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Error indicator: `✗ <msg>`. Not suppressed in quiet mode.
    pub fn error(&self, msg: &str) -> io::Result<()> {
        let line = if self.no_color {
            format!("\u{2717} {msg}") // ✗
        } else {
            format!("{} {}", "\u{2717}".red().bold(), msg.red())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}") // ⚠
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}") // ℹ
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Print every issue of a resolution as error/warning lines.
    pub fn issues(&self, result: &ResolutionResult) -> io::Result<()> {
        for missing in &result.missing_dependencies {
            self.error(&format!("missing: {missing}"))?;
        }
        for cycle in &result.circular_dependencies {
            self.error(&format!("cycle: {cycle}"))?;
        }
        for conflict in &result.version_conflicts {
            self.error(&format!("conflict: {conflict}"))?;
        }
        for warning in &result.warnings {
            self.warning(&warning.to_string())?;
        }
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `true` if ANSI colours are enabled.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    /// `true` when commands should emit JSON documents.
    pub fn is_json(&self) -> bool {
        self.resolved_format == OutputFormat::Json
    }
}

/// `{"command", "success", "generated_at", "data"}`.
pub fn envelope<T: Serialize>(
    command: &str,
    success: bool,
    data: &T,
) -> CliResult<serde_json::Value> {
    let data = serde_json::to_value(data).map_err(json_error)?;
    Ok(json!({
        "command": command,
        "success": success,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "data": data,
    }))
}

fn json_error(e: serde_json::Error) -> CliError {
    CliError::InvalidInput {
        message: format!("failed to serialise output: {e}"),
        source: Some(Box::new(e)),
    }
}

// ── report formatting ─────────────────────────────────────────────────────────

/// Numbered install order, one line per entity:
///
/// ```text
///   1  logger  1.2.0
///   2  web     1.0.0  [installed]
/// ```
pub fn format_install_order(result: &ResolutionResult) -> String {
    let id_width = result
        .install_order
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0);
    let num_width = result.install_order.len().to_string().len();

    let mut out = String::new();
    for (i, id) in result.install_order.iter().enumerate() {
        let version = result
            .versions
            .get(id)
            .map(ToString::to_string)
            .unwrap_or_default();
        let line = format!("  {:>num_width$}  {id:<id_width$}  {version}", i + 1);
        if result.is_satisfied_locally(id) {
            out.push_str(&format!("{line}  [installed]\n"));
        } else {
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out
}

/// One summary row per root, as printed by `analyze`.
pub fn format_summary(results: &[ResolutionResult]) -> String {
    let root_width = results
        .iter()
        .map(|r| r.root.len())
        .chain(std::iter::once("ROOT".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "{:<root_width$}  {:>5}  {:>7}  {:>6}  {:>9}  {:>8}  STATUS\n",
        "ROOT", "NODES", "MISSING", "CYCLES", "CONFLICTS", "WARNINGS"
    );
    for r in results {
        let status = if r.is_success() { "ok" } else { "failed" };
        out.push_str(&format!(
            "{:<root_width$}  {:>5}  {:>7}  {:>6}  {:>9}  {:>8}  {status}\n",
            r.root,
            r.versions.len(),
            r.missing_dependencies.len(),
            r.circular_dependencies.len(),
            r.version_conflicts.len(),
            r.warnings.len(),
        ));
    }
    out
}

// ── tests ─────────────────────────────────────────────────────────────────────
