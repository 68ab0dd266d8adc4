//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not in
//! resolution logic. Resolution errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// The catalog (manifest or templates directory) could not be read.
    #[error("Failed to load catalog from {source_path}: {reason}")]
    CatalogLoad { source_path: PathBuf, reason: String },

    /// A content tree could not be turned into files.
    #[error("Rendering failed: {reason}")]
    RenderingFailed { reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Catalog access failed (lock poisoned).
    #[error("Catalog store error")]
    StoreLockError,

    /// Output directory already exists.
    #[error("Output already exists at {path}")]
    OutputExists { path: PathBuf },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CatalogLoad { source_path, .. } => vec![
                format!("Could not read: {}", source_path.display()),
                "Check the path passed with --manifest or --templates-dir".into(),
                "Run with -vv to see the parse error in full".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::StoreLockError => vec![
                "The catalog is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::OutputExists { path } => vec![
                format!("Directory already exists: {}", path.display()),
                "Choose a different --output directory".into(),
                "Or use --dry-run to preview the composed files".into(),
            ],
            Self::RenderingFailed { reason } => vec![
                format!("Could not render: {reason}"),
                "Check that structured files hold valid JSON or TOML".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CatalogLoad { .. } => ErrorCategory::Configuration,
            Self::FilesystemError { .. } | Self::StoreLockError => ErrorCategory::Internal,
            Self::OutputExists { .. } => ErrorCategory::Validation,
            Self::RenderingFailed { .. } => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_load_is_configuration() {
        let err = ApplicationError::CatalogLoad {
            source_path: PathBuf::from("strata.toml"),
            reason: "expected `=`".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.to_string().contains("strata.toml"));
    }
}
