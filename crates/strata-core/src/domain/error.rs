// ============================================================================
// domain/error.rs - RESOLUTION AND COMPOSITION ERROR DOMAIN
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// Structural findings (missing dependencies, cycles, version conflicts) are
/// accumulated into result values, not raised. The variants here are the
/// conditions that stop an operation outright.
///
/// All errors are:
/// - Cloneable (results may be rendered several times)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("malformed version constraint '{input}': {reason}")]
    MalformedConstraint { input: String, reason: String },

    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    #[error("'{parent}' appears more than once in the extends list of '{child}'")]
    DuplicateParent { child: String, parent: String },

    #[error("inheritance chain of '{child}' is {depth} levels deep (hard cap is {cap})")]
    ChainTooDeep {
        child: String,
        depth: usize,
        cap: usize,
    },

    #[error("circular inheritance: {cycle}")]
    CircularInheritance { cycle: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes the content root: {path}")]
    PathEscapesRoot { path: String },

    #[error("Duplicate path in output: {path}")]
    DuplicatePath { path: String },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    #[error("entity '{id}' is not in the catalog")]
    EntityNotFound { id: String },

    #[error("'{child}' extends '{parent}', which is not in the catalog")]
    MissingParent { child: String, parent: String },

    #[error("content tree for '{id}' could not be loaded")]
    MissingContentTree { id: String },

    // ========================================================================
    // Invariant Violations (bugs)
    // ========================================================================
    #[error("internal consistency failure: {message}")]
    InternalConsistency { message: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MalformedConstraint { input, .. } => vec![
                format!("Could not parse '{input}'"),
                "Supported forms: 1.2.3, =1.2.3, ^1.2.3, >=1.2.3, any".into(),
            ],
            Self::DuplicateParent { child, parent } => vec![
                format!("Remove the repeated '{parent}' from the extends list of '{child}'"),
                "Each parent may be listed once; order determines merge precedence".into(),
            ],
            Self::ChainTooDeep { cap, .. } => vec![
                format!("Flatten the template hierarchy below {cap} levels"),
                "Raise resolver.hard_depth_cap in the configuration if this is intended".into(),
            ],
            Self::CircularInheritance { cycle } => vec![
                format!("Break the loop: {cycle}"),
                "A template cannot extend one of its own descendants".into(),
            ],
            Self::EntityNotFound { id } => vec![
                format!("No plugin or template named '{id}' was loaded"),
                "Try: strata analyze --recursive to list everything in the catalog".into(),
            ],
            Self::MissingParent { parent, .. } => vec![
                format!("Add a template named '{parent}' to the catalog"),
                "Or remove it from the extends list".into(),
            ],
            Self::MissingContentTree { id } => vec![
                format!("The metadata for '{id}' loaded but its files did not"),
                "Check that the template directory is readable".into(),
            ],
            Self::InternalConsistency { .. } => vec![
                "This is a bug in Strata, please report it".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedConstraint { .. }
            | Self::InvalidEntity(_)
            | Self::DuplicateParent { .. }
            | Self::ChainTooDeep { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathEscapesRoot { .. }
            | Self::DuplicatePath { .. } => ErrorCategory::Validation,
            Self::CircularInheritance { .. } => ErrorCategory::Compatibility,
            Self::EntityNotFound { .. }
            | Self::MissingParent { .. }
            | Self::MissingContentTree { .. } => ErrorCategory::NotFound,
            Self::InternalConsistency { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Internal,
}
