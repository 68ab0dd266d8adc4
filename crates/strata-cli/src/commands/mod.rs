//! Command handlers, one module per subcommand.
//!
//! Shared wiring lives here: choosing the catalog adapter, reading the
//! installed-versions file and building the core services from flags and
//! config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use semver::Version;
use tracing::{debug, instrument};

use strata_adapters::{DirectoryCatalog, FormatRenderer, LocalFilesystem, ManifestLoader};
use strata_core::application::{CompositionService, EntityCatalog, ResolutionService};
use strata_core::domain::{ResolutionResult, ResolveOptions, value_objects::parse_version};

use crate::{
    cli::{GlobalArgs, ResolutionFlags},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
};

pub mod analyze;
pub mod check;
pub mod completions;
pub mod compose;
pub mod init;
pub mod resolve;
pub mod tree;

/// Manifest picked up from the current directory when nothing else is
/// configured.
pub const DEFAULT_MANIFEST: &str = "strata.toml";

/// Where entities are loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Manifest(PathBuf),
    Directory(PathBuf),
}

impl CatalogSource {
    /// Flags first, then `[catalog]` from the config, then `./strata.toml`.
    pub fn select(global: &GlobalArgs, config: &AppConfig) -> CliResult<Self> {
        if let Some(path) = &global.manifest {
            return Ok(Self::Manifest(path.clone()));
        }
        if let Some(dir) = &global.templates_dir {
            return Ok(Self::Directory(dir.clone()));
        }
        if let Some(path) = &config.catalog.manifest {
            return Ok(Self::Manifest(path.clone()));
        }
        if let Some(dir) = &config.catalog.templates_dir {
            return Ok(Self::Directory(dir.clone()));
        }
        let fallback = Path::new(DEFAULT_MANIFEST);
        if fallback.is_file() {
            return Ok(Self::Manifest(fallback.to_path_buf()));
        }
        Err(CliError::NoCatalog)
    }

    #[instrument(skip_all, fields(source = ?self))]
    pub fn open(&self) -> CliResult<Box<dyn EntityCatalog>> {
        let catalog: Box<dyn EntityCatalog> = match self {
            Self::Manifest(path) => Box::new(ManifestLoader::new(path).load()?),
            Self::Directory(dir) => Box::new(DirectoryCatalog::open(dir)?),
        };
        debug!("Catalog opened");
        Ok(catalog)
    }
}

/// Open whichever catalog the flags and config point at.
pub fn open_catalog(global: &GlobalArgs, config: &AppConfig) -> CliResult<Box<dyn EntityCatalog>> {
    CatalogSource::select(global, config)?.open()
}

/// Read a TOML table of `id = "version"` pairs.
pub fn load_installed(path: &Path) -> CliResult<BTreeMap<String, Version>> {
    let text = std::fs::read_to_string(path)
        .with_cli_context(|| format!("Failed to read installed versions from '{}'", path.display()))?;
    parse_installed(&text).map_err(|message| CliError::InvalidInput {
        message: format!("{}: {message}", path.display()),
        source: None,
    })
}

fn parse_installed(text: &str) -> Result<BTreeMap<String, Version>, String> {
    let table: toml::Table = toml::from_str(text).map_err(|e| e.to_string())?;
    table
        .into_iter()
        .map(|(id, value)| {
            let raw = value
                .as_str()
                .ok_or_else(|| format!("version of '{id}' must be a string"))?;
            let version = parse_version(raw, raw).map_err(|e| format!("'{id}': {e}"))?;
            Ok((id, version))
        })
        .collect()
}

/// Merge `--include-optional`/`--installed` with the configured defaults.
pub fn resolve_options(flags: &ResolutionFlags, config: &AppConfig) -> CliResult<ResolveOptions> {
    let mut options = ResolveOptions::default()
        .include_optional(flags.include_optional || config.resolver.include_optional);
    if let Some(path) = &flags.installed {
        options = options.with_installed(load_installed(path)?);
    }
    Ok(options)
}

pub fn resolution_service(
    global: &GlobalArgs,
    config: &AppConfig,
    flags: &ResolutionFlags,
) -> CliResult<ResolutionService> {
    Ok(ResolutionService::new(open_catalog(global, config)?)
        .with_options(resolve_options(flags, config)?)
        .with_depth_limits(config.resolver.depth_limits()))
}

pub fn composition_service(global: &GlobalArgs, config: &AppConfig) -> CliResult<CompositionService> {
    Ok(CompositionService::new(
        open_catalog(global, config)?,
        Box::new(FormatRenderer::new()),
        Box::new(LocalFilesystem::new()),
    )
    .with_depth_limits(config.resolver.depth_limits()))
}

/// Missing dependencies, cycles and conflicts. Warnings are not failures.
pub fn failure_count(result: &ResolutionResult) -> usize {
    result.missing_dependencies.len()
        + result.circular_dependencies.len()
        + result.version_conflicts.len()
}

/// `Err(ResolutionFailed)` unless `result` is a success.
pub fn ensure_success(result: &ResolutionResult) -> CliResult<()> {
    if result.is_success() {
        return Ok(());
    }
    Err(CliError::ResolutionFailed {
        subject: format!("'{}'", result.root),
        issues: failure_count(result),
    })
}
