//! Domain value objects: VersionConstraint, CompositionStrategy.
//!
//! # Design
//!
//! These are pure value types with equality-by-value and no identity.
//! They hold NO evaluation logic. Satisfaction and intersection live in
//! `resolver::constraint`. This file's only job is to define the types, their
//! string representations, and their parsers.

use crate::domain::error::DomainError;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── VersionConstraint ────────────────────────────────────────────────────────

/// A version requirement attached to a dependency edge.
///
/// | Text       | Variant           |
/// |------------|-------------------|
/// | `1.2.3`    | `Exact(1.2.3)`    |
/// | `=1.2.3`   | `Exact(1.2.3)`    |
/// | `^1.2.3`   | `Caret(1.2.3)`    |
/// | `>=1.2.3`  | `AtLeast(1.2.3)`  |
/// | `any`, `*` | `Any`             |
///
/// Partial versions (`^1`, `>=1.2`) are padded with zeros.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionConstraint {
    Exact(Version),
    Caret(Version),
    AtLeast(Version),
    Any,
}

impl VersionConstraint {
    /// Parse constraint text.
    ///
    /// # Errors
    ///
    /// `MalformedConstraint` for anything outside the table above. Unknown
    /// operators are never silently widened to `Any`.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(malformed(input, "constraint is empty"));
        }
        if text.eq_ignore_ascii_case("any") || text == "*" {
            return Ok(Self::Any);
        }

        if let Some(rest) = text.strip_prefix(">=") {
            return parse_version(input, rest).map(Self::AtLeast);
        }
        if let Some(rest) = text.strip_prefix('^') {
            return parse_version(input, rest).map(Self::Caret);
        }
        if let Some(rest) = text.strip_prefix('=') {
            return parse_version(input, rest).map(Self::Exact);
        }
        if text.starts_with(|c: char| c.is_ascii_digit() || c == 'v') {
            return parse_version(input, text).map(Self::Exact);
        }

        Err(malformed(input, "unsupported operator"))
    }

    /// The version the constraint is anchored on, if any.
    pub fn base(&self) -> Option<&Version> {
        match self {
            Self::Exact(v) | Self::Caret(v) | Self::AtLeast(v) => Some(v),
            Self::Any => None,
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "={v}"),
            Self::Caret(v) => write!(f, "^{v}"),
            Self::AtLeast(v) => write!(f, ">={v}"),
            Self::Any => f.write_str("any"),
        }
    }
}

impl FromStr for VersionConstraint {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionConstraint {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionConstraint> for String {
    fn from(value: VersionConstraint) -> Self {
        value.to_string()
    }
}

/// Parse a version, padding `1` / `1.2` out to `1.0.0` / `1.2.0`.
pub fn parse_version(input: &str, text: &str) -> Result<Version, DomainError> {
    let text = text.trim();
    let text = text.strip_prefix('v').unwrap_or(text);
    if text.is_empty() {
        return Err(malformed(input, "missing version"));
    }

    // Split off pre-release / build suffix before counting numeric parts.
    let split_at = text.find(['-', '+']).unwrap_or(text.len());
    let (core, suffix) = text.split_at(split_at);
    let padded = match core.split('.').count() {
        1 => format!("{core}.0.0{suffix}"),
        2 => format!("{core}.0{suffix}"),
        _ => text.to_string(),
    };

    Version::parse(&padded).map_err(|e| malformed(input, &e.to_string()))
}

fn malformed(input: &str, reason: &str) -> DomainError {
    DomainError::MalformedConstraint {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

// ── CompositionStrategy ──────────────────────────────────────────────────────

/// Rule used to combine two content trees at the same relative path.
///
/// String parsing lives at the CLI boundary; the core only sees the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionStrategy {
    /// Later entity replaces the whole file.
    #[default]
    Override,
    /// Structured key-by-key merge, later entity wins on scalar conflicts.
    Merge,
    /// Earlier content first, later content after.
    Append,
    /// Later content first, earlier content after.
    Prepend,
}

impl CompositionStrategy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Merge => "merge",
            Self::Append => "append",
            Self::Prepend => "prepend",
        }
    }

    pub const ALL: [Self; 4] = [Self::Override, Self::Merge, Self::Append, Self::Prepend];
}

impl fmt::Display for CompositionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
