//! Requirement backlink index
//!
//! Inverts emitted needs into the view a requirement page renders: for each
//! requirement id, which test needs verify it and to what degree.

use std::collections::{BTreeMap, BTreeSet};
use testlink_model::{ExternalNeed, NeedId, RequirementId, VerificationDegree};

/// Need ids verifying one requirement, split by degree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backlinks {
    /// Needs that partially verify the requirement
    pub partial: BTreeSet<NeedId>,
    /// Needs that fully verify the requirement
    pub full: BTreeSet<NeedId>,
}

impl Backlinks {
    /// Needs at the given degree
    #[must_use]
    pub fn at(&self, degree: VerificationDegree) -> &BTreeSet<NeedId> {
        match degree {
            VerificationDegree::Partial => &self.partial,
            VerificationDegree::Full => &self.full,
        }
    }

    /// True if at least one need fully verifies the requirement
    #[inline]
    #[must_use]
    pub fn is_fully_verified(&self) -> bool {
        !self.full.is_empty()
    }
}

/// Requirement id → backlinks
///
/// Built from a finished need list; ordered so rendering is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeedsIndex {
    by_requirement: BTreeMap<RequirementId, Backlinks>,
}

impl NeedsIndex {
    /// Build index from needs
    #[must_use]
    pub fn build(needs: &[ExternalNeed]) -> Self {
        let mut by_requirement: BTreeMap<RequirementId, Backlinks> = BTreeMap::new();
        for need in needs {
            for req in &need.verifies_partial {
                by_requirement
                    .entry(req.clone())
                    .or_default()
                    .partial
                    .insert(need.id.clone());
            }
            for req in &need.verifies_full {
                by_requirement
                    .entry(req.clone())
                    .or_default()
                    .full
                    .insert(need.id.clone());
            }
        }
        Self { by_requirement }
    }

    /// Backlinks of one requirement
    #[must_use]
    pub fn backlinks(&self, requirement: &RequirementId) -> Option<&Backlinks> {
        self.by_requirement.get(requirement)
    }

    /// Every referenced requirement with its backlinks, in id order
    pub fn iter(&self) -> impl Iterator<Item = (&RequirementId, &Backlinks)> {
        self.by_requirement.iter()
    }

    /// Number of distinct requirements referenced
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_requirement.len()
    }

    /// True if no need references any requirement
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_requirement.is_empty()
    }
}
