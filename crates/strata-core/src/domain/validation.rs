//! Structural validation of an inheritance resolution before composition.

use std::collections::{HashSet, VecDeque};

use tracing::warn;

use crate::domain::{
    entities::{ContentTree, ContentTreeProvider, EntityLookup, ResolutionWarning},
    error::DomainError,
    inheritance::{DepthLimits, InheritanceChain, InheritanceResolution},
};

/// A chain that passed validation, with every content tree loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedChain {
    pub chain: InheritanceChain,
    /// `(id, tree)` in chain order.
    pub trees: Vec<(String, ContentTree)>,
    pub warnings: Vec<ResolutionWarning>,
}

/// Structural checks between chain resolution and composition.
///
/// Anything that would make a merge meaningless is rejected here, so the
/// composition engine only ever sees a complete, loaded chain.
pub struct ResolutionValidator {
    limits: DepthLimits,
}

impl ResolutionValidator {
    pub fn new(limits: DepthLimits) -> Self {
        Self { limits }
    }

    /// Reject structural problems and attach depth warnings.
    ///
    /// Duplicate parents are checked across the whole `extends` closure of
    /// the child first, so they are reported even when resolution failed
    /// for some other reason.
    ///
    /// # Errors
    ///
    /// `DuplicateParent`, `MissingParent`, `CircularInheritance` or
    /// `ChainTooDeep`, in that order of precedence.
    pub fn check<L>(
        &self,
        lookup: &L,
        resolution: &mut InheritanceResolution,
    ) -> Result<(), DomainError>
    where
        L: EntityLookup + ?Sized,
    {
        check_duplicate_parents(&resolution.child, lookup)?;

        if let Some(missing) = resolution.missing_parents.first() {
            return Err(DomainError::MissingParent {
                child: missing.required_by.clone(),
                parent: missing.dependency.target_id.clone(),
            });
        }
        if let Some(cycle) = resolution.cycles.first() {
            return Err(DomainError::CircularInheritance {
                cycle: cycle.to_string(),
            });
        }
        if resolution.hard_cap_exceeded {
            return Err(DomainError::ChainTooDeep {
                child: resolution.child.clone(),
                depth: resolution.depth,
                cap: self.limits.hard_cap,
            });
        }
        if resolution.chain.is_empty() {
            return Err(DomainError::InternalConsistency {
                message: format!(
                    "inheritance of '{}' produced an empty chain without a reason",
                    resolution.child
                ),
            });
        }

        if resolution.depth > self.limits.soft_threshold {
            let warning = ResolutionWarning::ChainTooLong {
                child: resolution.child.clone(),
                depth: resolution.depth,
                threshold: self.limits.soft_threshold,
            };
            warn!("{warning}");
            if !resolution.warnings.contains(&warning) {
                resolution.warnings.push(warning);
            }
        }

        Ok(())
    }

    /// Full validation: [`check`](Self::check), then load every tree.
    ///
    /// # Errors
    ///
    /// Anything `check` returns, or `MissingContentTree` for the first
    /// chain member whose tree cannot be loaded. Nothing partial is returned.
    pub fn validate<L, P>(
        &self,
        lookup: &L,
        mut resolution: InheritanceResolution,
        provider: &P,
    ) -> Result<ValidatedChain, DomainError>
    where
        L: EntityLookup + ?Sized,
        P: ContentTreeProvider + ?Sized,
    {
        self.check(lookup, &mut resolution)?;

        let trees = resolution
            .chain
            .iter()
            .map(|id| {
                provider
                    .content_tree(id)
                    .map(|tree| (id.to_string(), tree))
                    .ok_or_else(|| DomainError::MissingContentTree { id: id.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidatedChain {
            chain: resolution.chain,
            trees,
            warnings: resolution.warnings,
        })
    }
}

impl Default for ResolutionValidator {
    fn default() -> Self {
        Self::new(DepthLimits::default())
    }
}

fn check_duplicate_parents<L>(child_id: &str, lookup: &L) -> Result<(), DomainError>
where
    L: EntityLookup + ?Sized,
{
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::from([child_id]);

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        let Some(entity) = lookup.entity(id) else {
            continue;
        };

        let mut seen: HashSet<&str> = HashSet::new();
        for parent in &entity.extends {
            if !seen.insert(parent.as_str()) {
                return Err(DomainError::DuplicateParent {
                    child: entity.id.clone(),
                    parent: parent.clone(),
                });
            }
            queue.push_back(parent.as_str());
        }
    }
    Ok(())
}
