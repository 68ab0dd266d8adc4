//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use strata_core::domain::CompositionStrategy;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "strata",
    bin_name = "strata",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Plugin dependency resolution and template composition",
    long_about = "Strata resolves plugin dependency graphs (install order, cycles, \
                  missing plugins, version conflicts) and composes templates along \
                  their inheritance chains.",
    after_help = "EXAMPLES:\n\
        \x20 strata --manifest strata.toml resolve web-app\n\
        \x20 strata tree web-app --depth 2\n\
        \x20 strata analyze --recursive\n\
        \x20 strata --templates-dir templates compose api --strategy merge --output ./api\n\
        \x20 strata completions bash > /usr/share/bash-completion/completions/strata",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Summarise the resolution of one or more roots.
    #[command(
        visible_alias = "a",
        about = "Summarise dependency resolution",
        after_help = "EXAMPLES:\n\
            \x20 strata analyze web-app\n\
            \x20 strata analyze web-app cli-app\n\
            \x20 strata analyze --recursive --include-optional"
    )]
    Analyze(AnalyzeArgs),

    /// Resolve one root and print its install order.
    #[command(
        visible_alias = "r",
        about = "Resolve dependencies",
        after_help = "EXAMPLES:\n\
            \x20 strata resolve web-app\n\
            \x20 strata resolve web-app --format dot | dot -Tsvg > deps.svg\n\
            \x20 strata resolve web-app --installed installed.toml"
    )]
    Resolve(ResolveArgs),

    /// Print the dependency tree of one root.
    #[command(
        about = "Show the dependency tree",
        after_help = "EXAMPLES:\n\
            \x20 strata tree web-app\n\
            \x20 strata tree web-app --depth 1\n\
            \x20 strata tree web-app --invert logger"
    )]
    Tree(TreeArgs),

    /// Validate dependencies and inheritance; fails on any issue.
    #[command(
        about = "Check for problems",
        after_help = "EXAMPLES:\n\
            \x20 strata check web-app\n\
            \x20 strata check --all"
    )]
    Check(CheckArgs),

    /// Compose a template along its inheritance chain.
    #[command(
        visible_alias = "c",
        about = "Compose templates",
        after_help = "EXAMPLES:\n\
            \x20 strata compose api\n\
            \x20 strata compose api --strategy merge --output ./my-api\n\
            \x20 strata compose api --output ./my-api --dry-run"
    )]
    Compose(ComposeArgs),

    /// Initialise a Strata configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 strata init           # default location\n\
            \x20 strata init --local   # .strata.toml in CWD"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 strata completions bash > ~/.local/share/bash-completion/completions/strata\n\
            \x20 strata completions zsh  > ~/.zfunc/_strata\n\
            \x20 strata completions fish > ~/.config/fish/completions/strata.fish"
    )]
    Completions(CompletionsArgs),
}

// ── shared resolution flags ───────────────────────────────────────────────────

/// Flags shared by every command that resolves dependencies.
#[derive(Debug, Clone, Default, Args)]
pub struct ResolutionFlags {
    /// Follow optional dependencies too.
    #[arg(long = "include-optional", help = "Include optional dependencies")]
    pub include_optional: bool,

    /// TOML table of locally installed versions (`id = "1.2.0"`).
    #[arg(
        long = "installed",
        value_name = "FILE",
        help = "Installed versions file"
    )]
    pub installed: Option<PathBuf>,
}

// ── analyze ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Roots to analyse.
    #[arg(
        value_name = "ROOT",
        required_unless_present = "recursive",
        help = "Entity ids to analyse"
    )]
    pub roots: Vec<String>,

    /// Analyse every entity in the catalog.
    #[arg(short = 'r', long = "recursive", conflicts_with = "roots")]
    pub recursive: bool,

    #[command(flatten)]
    pub resolution: ResolutionFlags,
}

// ── resolve ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[arg(value_name = "ROOT", help = "Entity id to resolve")]
    pub root: String,

    /// Report format.
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value = "table",
        help = "Report format"
    )]
    pub format: ReportFormat,

    #[command(flatten)]
    pub resolution: ResolutionFlags,
}

/// Views of a resolution result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Numbered install order plus issues.
    Table,
    /// Dependency tree.
    Tree,
    /// JSON document.
    Json,
    /// Graphviz DOT.
    Dot,
}

// ── tree ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TreeArgs {
    #[arg(value_name = "ROOT", help = "Entity id to resolve")]
    pub root: String,

    /// Maximum depth below the root.
    #[arg(short = 'd', long = "depth", value_name = "N")]
    pub depth: Option<usize>,

    /// Show what depends on ID instead.
    #[arg(short = 'i', long = "invert", value_name = "ID")]
    pub invert: Option<String>,

    #[command(flatten)]
    pub resolution: ResolutionFlags,
}

// ── check ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(
        value_name = "ROOT",
        required_unless_present = "all",
        help = "Entity id to check"
    )]
    pub root: Option<String>,

    /// Check every entity in the catalog.
    #[arg(long = "all", conflicts_with = "root")]
    pub all: bool,

    #[command(flatten)]
    pub resolution: ResolutionFlags,
}

// ── compose ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ComposeArgs {
    /// Templates to compose.
    #[arg(value_name = "TEMPLATE", required = true, num_args = 1..)]
    pub templates: Vec<String>,

    /// Composition strategy (defaults to the configured one).
    #[arg(short = 's', long = "strategy", value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Write the composed tree under DIR.
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// List what would be written without writing it.
    #[arg(long = "dry-run", requires = "output")]
    pub dry_run: bool,
}

/// `--strategy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Override,
    Merge,
    Append,
    Prepend,
}

impl From<StrategyArg> for CompositionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Override => Self::Override,
            StrategyArg::Merge => Self::Merge,
            StrategyArg::Append => Self::Append,
            StrategyArg::Prepend => Self::Prepend,
        }
    }
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `strata init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.strata.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `strata completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── tests ─────────────────────────────────────────────────────────────────────
