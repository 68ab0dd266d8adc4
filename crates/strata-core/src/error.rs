//! Crate-level error type.
//!
//! [`StrataError`] is what every service and port returns. It only wraps
//! the two layer errors; callers branch on [`StrataError::category`] and
//! show [`StrataError::suggestions`] to the user.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{self, DomainError};

/// Root error type for Strata Core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrataError {
    /// A resolution or composition rule was violated.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Catalog, rendering or filesystem work failed.
    #[error("{0}")]
    Application(#[from] ApplicationError),
}

impl StrataError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category().into(),
            Self::Application(e) => e.category(),
        }
    }
}

/// Coarse classification used for exit codes and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Configuration,
    Internal,
}

impl From<domain::ErrorCategory> for ErrorCategory {
    fn from(category: domain::ErrorCategory) -> Self {
        match category {
            domain::ErrorCategory::Validation => Self::Validation,
            domain::ErrorCategory::Compatibility => Self::Compatibility,
            domain::ErrorCategory::NotFound => Self::NotFound,
            domain::ErrorCategory::Internal => Self::Internal,
        }
    }
}

pub type StrataResult<T> = Result<T, StrataError>;
