//! Verification specs and test links

use crate::identity::{RequirementId, SourceLocation, TestIdentity};
use crate::record::{Outcome, TestRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// Degree to which a test claims to verify a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationDegree {
    /// Exercises part of the requirement's acceptance criteria
    Partial,
    /// Covers the requirement's acceptance criteria completely
    Full,
}

impl Display for VerificationDegree {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partial => f.write_str("partially"),
            Self::Full => f.write_str("fully"),
        }
    }
}

/// A complete, well-formed verification annotation
///
/// Only ever constructed once every required field was present and parsed;
/// either verifies-set may still be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSpec {
    /// Requirements partially verified
    pub partially_verifies: BTreeSet<RequirementId>,
    /// Requirements fully verified
    pub fully_verifies: BTreeSet<RequirementId>,
    /// Test type classification (e.g. `interface-test`)
    pub test_type: String,
    /// Derivation technique classification (e.g. `boundary-values`)
    pub derivation_technique: String,
    /// Optional extra classifications found on the test
    pub classifications: BTreeMap<String, String>,
}

impl VerificationSpec {
    /// True when neither set names a requirement
    #[inline]
    #[must_use]
    pub fn verifies_nothing(&self) -> bool {
        self.partially_verifies.is_empty() && self.fully_verifies.is_empty()
    }

    /// Requirement ids verified at the given degree
    #[must_use]
    pub fn verifies(&self, degree: VerificationDegree) -> &BTreeSet<RequirementId> {
        match degree {
            VerificationDegree::Partial => &self.partially_verifies,
            VerificationDegree::Full => &self.fully_verifies,
        }
    }
}

/// Reconciled association of one executed test with its requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestLink {
    identity: TestIdentity,
    location: Option<SourceLocation>,
    outcome: Outcome,
    result_text: Option<String>,
    origin: PathBuf,
    origin_key: PathBuf,
    spec: VerificationSpec,
}

impl TestLink {
    /// Link a record with its validated spec
    #[must_use]
    pub fn new(record: &TestRecord, spec: VerificationSpec) -> Self {
        Self {
            identity: record.identity().clone(),
            location: record.location().cloned(),
            outcome: record.outcome(),
            result_text: record.result_text().map(str::to_string),
            origin: record.origin().to_path_buf(),
            origin_key: record.origin_key().to_path_buf(),
            spec,
        }
    }

    /// Test identity
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &TestIdentity {
        &self.identity
    }

    /// Source location, if known
    #[inline]
    #[must_use]
    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// Outcome of the test run
    #[inline]
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Cleaned result text
    #[inline]
    #[must_use]
    pub fn result_text(&self) -> Option<&str> {
        self.result_text.as_deref()
    }

    /// Result log the test was read from
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Result log name used for need ids, see [`TestRecord::origin_key`]
    #[inline]
    #[must_use]
    pub fn origin_key(&self) -> &Path {
        &self.origin_key
    }

    /// Validated verification spec
    #[inline]
    #[must_use]
    pub fn spec(&self) -> &VerificationSpec {
        &self.spec
    }

    /// Every (requirement, degree) pair, partial first, each set in order
    pub fn requirements(&self) -> impl Iterator<Item = (&RequirementId, VerificationDegree)> {
        self.spec
            .partially_verifies
            .iter()
            .map(|r| (r, VerificationDegree::Partial))
            .chain(
                self.spec
                    .fully_verifies
                    .iter()
                    .map(|r| (r, VerificationDegree::Full)),
            )
    }
}
