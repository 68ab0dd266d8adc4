//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `STRATA_*` environment variables, `__` between section and key
//!    (`STRATA_RESOLVER__INCLUDE_OPTIONAL=true`)
//! 3. Config file: `--config`, else `.strata.toml` in the current
//!    directory, else the platform config dir
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat, FileSourceFile};
use serde::{Deserialize, Serialize};
use tracing::debug;

use strata_core::domain::{CompositionStrategy, DepthLimits};

use crate::error::{CliError, CliResult};

/// File name used by `strata init --local` and picked up from the CWD.
pub const LOCAL_CONFIG: &str = ".strata.toml";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub resolver: ResolverConfig,
    pub composition: CompositionConfig,
    pub output: OutputConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Follow optional dependencies without `--include-optional`.
    pub include_optional: bool,
    /// Chains deeper than this produce a warning.
    pub soft_depth_threshold: usize,
    /// Chains deeper than this are rejected.
    pub hard_depth_cap: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let limits = DepthLimits::default();
        Self {
            include_optional: false,
            soft_depth_threshold: limits.soft_threshold,
            hard_depth_cap: limits.hard_cap,
        }
    }
}

impl ResolverConfig {
    pub fn depth_limits(&self) -> DepthLimits {
        DepthLimits {
            soft_threshold: self.soft_depth_threshold,
            hard_cap: self.hard_depth_cap,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    pub default_strategy: CompositionStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

/// Where entities come from when no `--manifest`/`--templates-dir` flag
/// is given.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub manifest: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from defaults, file and environment.
    ///
    /// An explicit `config_file` must exist; the implicit locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let defaults = Config::try_from(&Self::default()).map_err(config_error)?;
        let mut builder = Config::builder().add_source(defaults);

        match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::ConfigError {
                        message: format!("config file not found: {}", path.display()),
                        source: None,
                    });
                }
                builder = builder.add_source(toml_file(path).required(true));
            }
            None => {
                builder = builder.add_source(toml_file(&Self::config_path()).required(false));
                builder = builder.add_source(toml_file(Path::new(LOCAL_CONFIG)).required(false));
            }
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix("STRATA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;

        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Depth limits must be ordered and non-zero.
    pub fn validate(&self) -> CliResult<()> {
        let r = &self.resolver;
        if r.hard_depth_cap == 0 || r.soft_depth_threshold > r.hard_depth_cap {
            return Err(CliError::ConfigError {
                message: format!(
                    "resolver.soft_depth_threshold ({}) must not exceed resolver.hard_depth_cap ({}), \
                     and the cap must be positive",
                    r.soft_depth_threshold, r.hard_depth_cap
                ),
                source: None,
            });
        }
        Ok(())
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.strata.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "strata", "strata")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
    }
}

fn toml_file(path: &Path) -> File<FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml)
}

fn config_error(e: config::ConfigError) -> CliError {
    CliError::ConfigError {
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_core_limits() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.resolver.depth_limits(), DepthLimits::default());
        assert_eq!(cfg.composition.default_strategy, CompositionStrategy::Override);
    }

    #[test]
    fn default_no_color_is_false() {
        assert!(!AppConfig::default().output.no_color);
    }

    #[test]
    fn explicit_file_is_layered_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[composition]\ndefault_strategy = \"merge\"\n\n[resolver]\nhard_depth_cap = 8"
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.composition.default_strategy, CompositionStrategy::Merge);
        assert_eq!(cfg.resolver.hard_depth_cap, 8);
        assert_eq!(cfg.resolver.soft_depth_threshold, 5);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn inverted_limits_are_rejected() {
        let mut cfg = AppConfig::default();
        cfg.resolver.soft_depth_threshold = 30;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, AppConfig::default());
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
