//! Version constraint evaluation.
//!
//! Every constraint is treated as a half-open interval `[lower, upper)`:
//!
//! | Constraint   | Interval                    |
//! |--------------|-----------------------------|
//! | `=v`         | `[v, v]` (single point)     |
//! | `^1.2.3`     | `[1.2.3, 2.0.0)`            |
//! | `^0.2.3`     | `[0.2.3, 0.3.0)`            |
//! | `^0.0.3`     | `[0.0.3, 0.0.4)`            |
//! | `>=v`        | `[v, ∞)`                    |
//! | `any`        | everything                  |
//!
//! Two constraints intersect when their intervals overlap.

use std::cmp::Ordering;

use semver::{BuildMetadata, Prerelease, Version};

use crate::domain::value_objects::VersionConstraint;

/// Stateless evaluator for [`VersionConstraint`].
pub struct ConstraintEvaluator;

impl ConstraintEvaluator {
    /// Does `version` meet `constraint`?
    pub fn satisfies(version: &Version, constraint: &VersionConstraint) -> bool {
        match constraint {
            VersionConstraint::Any => true,
            VersionConstraint::Exact(v) => compare(version, v) == Ordering::Equal,
            VersionConstraint::AtLeast(v) => compare(version, v) != Ordering::Less,
            VersionConstraint::Caret(v) => {
                compare(version, v) != Ordering::Less
                    && caret_upper(v).is_none_or(|hi| compare(version, &hi) == Ordering::Less)
            }
        }
    }

    /// Can one version satisfy both constraints?
    pub fn intersects(a: &VersionConstraint, b: &VersionConstraint) -> bool {
        use VersionConstraint::*;

        match (a, b) {
            (Any, _) | (_, Any) => true,
            (Exact(v), other) | (other, Exact(v)) => Self::satisfies(v, other),
            (AtLeast(_), AtLeast(_)) => true,
            _ => {
                let (lo_a, hi_a) = interval(a);
                let (lo_b, hi_b) = interval(b);
                let lower = if compare(lo_a, lo_b) == Ordering::Less {
                    lo_b
                } else {
                    lo_a
                };
                let upper = match (hi_a, hi_b) {
                    (Some(x), Some(y)) => Some(if compare(&x, &y) == Ordering::Less {
                        x
                    } else {
                        y
                    }),
                    (Some(x), None) | (None, Some(x)) => Some(x),
                    (None, None) => None,
                };
                upper.is_none_or(|hi| compare(lower, &hi) == Ordering::Less)
            }
        }
    }
}

static LOWEST: Version = Version::new(0, 0, 0);

/// `(lower, upper)` bounds; `None` upper means unbounded.
fn interval(c: &VersionConstraint) -> (&Version, Option<Version>) {
    match c {
        VersionConstraint::Caret(v) => (v, caret_upper(v)),
        VersionConstraint::AtLeast(v) => (v, None),
        VersionConstraint::Exact(v) => (
            v,
            v.patch
                .checked_add(1)
                .map(|patch| Version::new(v.major, v.minor, patch)),
        ),
        VersionConstraint::Any => (&LOWEST, None),
    }
}

/// Exclusive upper bound of a caret range. `None` when the bumped
/// component would overflow, leaving the range unbounded above.
fn caret_upper(v: &Version) -> Option<Version> {
    if v.major > 0 {
        v.major.checked_add(1).map(|major| Version::new(major, 0, 0))
    } else if v.minor > 0 {
        v.minor.checked_add(1).map(|minor| Version::new(0, minor, 0))
    } else {
        v.patch.checked_add(1).map(|patch| Version::new(0, 0, patch))
    }
}

/// SemVer ordering with build metadata ignored, and pre-release ignored
/// unless both sides carry one.
fn compare(a: &Version, b: &Version) -> Ordering {
    let both_pre = !a.pre.is_empty() && !b.pre.is_empty();
    let key = |v: &Version| Version {
        major: v.major,
        minor: v.minor,
        patch: v.patch,
        pre: if both_pre {
            v.pre.clone()
        } else {
            Prerelease::EMPTY
        },
        build: BuildMetadata::EMPTY,
    };
    key(a).cmp(&key(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> VersionConstraint {
        VersionConstraint::parse(s).unwrap()
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn caret_satisfaction() {
        assert!(ConstraintEvaluator::satisfies(&v("1.4.2"), &c("^1.2.0")));
        assert!(!ConstraintEvaluator::satisfies(&v("2.0.0"), &c("^1.2.0")));
        assert!(!ConstraintEvaluator::satisfies(&v("1.1.9"), &c("^1.2.0")));
        assert!(ConstraintEvaluator::satisfies(&v("0.2.9"), &c("^0.2.3")));
        assert!(!ConstraintEvaluator::satisfies(&v("0.3.0"), &c("^0.2.3")));
    }

    #[test]
    fn prerelease_ignored_unless_both_sides_have_one() {
        assert!(ConstraintEvaluator::satisfies(&v("1.0.0-beta.1"), &c("=1.0.0")));
        assert!(!ConstraintEvaluator::satisfies(
            &v("1.0.0-alpha"),
            &c("=1.0.0-beta")
        ));
        assert!(ConstraintEvaluator::satisfies(&v("1.0.0+build.7"), &c("=1.0.0")));
    }

    #[test]
    fn any_intersects_everything() {
        for other in ["=1.0.0", "^2.0.0", ">=3.0.0", "any"] {
            assert!(ConstraintEvaluator::intersects(&c("any"), &c(other)));
            assert!(ConstraintEvaluator::intersects(&c(other), &c("any")));
        }
    }

    #[test]
    fn carets_intersect_on_same_major() {
        assert!(ConstraintEvaluator::intersects(&c("^1.0.0"), &c("^1.5.0")));
        assert!(!ConstraintEvaluator::intersects(&c("^1.0.0"), &c("^2.0.0")));
    }

    #[test]
    fn caret_against_minimum() {
        assert!(ConstraintEvaluator::intersects(&c("^1.2.0"), &c(">=1.0.0")));
        assert!(ConstraintEvaluator::intersects(&c("^1.2.0"), &c(">=1.9.0")));
        assert!(!ConstraintEvaluator::intersects(&c("^1.2.0"), &c(">=2.0.0")));
        assert!(!ConstraintEvaluator::intersects(&c(">=2.0.0"), &c("^1.2.0")));
    }

    #[test]
    fn minimums_always_intersect() {
        assert!(ConstraintEvaluator::intersects(&c(">=1.0.0"), &c(">=9.0.0")));
    }

    #[test]
    fn exact_intersects_iff_satisfied() {
        assert!(ConstraintEvaluator::intersects(&c("=1.3.0"), &c("^1.0.0")));
        assert!(!ConstraintEvaluator::intersects(&c("^1.0.0"), &c("=2.0.0")));
        assert!(!ConstraintEvaluator::intersects(&c("=1.0.0"), &c("=1.0.1")));
    }

    #[test]
    fn caret_at_largest_component_is_unbounded_above() {
        let max = u64::MAX;
        let top = c(&format!("^{max}.0.0"));
        assert!(ConstraintEvaluator::satisfies(&v(&format!("{max}.7.1")), &top));
        assert!(!ConstraintEvaluator::satisfies(&v("1.0.0"), &top));
        assert!(ConstraintEvaluator::intersects(&top, &c(">=1.0.0")));
        assert!(!ConstraintEvaluator::intersects(&top, &c("^1.0.0")));

        let patch = c(&format!("^0.0.{max}"));
        assert!(ConstraintEvaluator::satisfies(&v(&format!("0.0.{max}")), &patch));
        assert!(!ConstraintEvaluator::intersects(&patch, &c("^0.0.1")));
    }
}
