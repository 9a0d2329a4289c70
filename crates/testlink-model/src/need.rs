//! External needs
//!
//! The documentation-facing unit: one [`ExternalNeed`] per emitted
//! [`TestLink`](crate::TestLink). Serialized field names are the stable
//! schema the documentation layer reads.

use crate::identity::{RequirementId, SourceLocation, TestIdentity};
use crate::link::VerificationDegree;
use crate::record::Outcome;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Synthetic, deterministic need identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeedId(String);

impl NeedId {
    /// Derive id from test identity, location and originating log
    ///
    /// Format: `<prefix><sanitized qualified name>_<16 hex chars>`. The
    /// hash covers every input, so the same test read from two logs gets two
    /// ids, while re-reading one log always gives the same id. Pass the
    /// log's origin key rather than its absolute path to keep ids stable
    /// when the build tree moves.
    #[must_use]
    pub fn derive(
        prefix: &str,
        identity: &TestIdentity,
        location: &SourceLocation,
        origin: &Path,
    ) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(origin.to_string_lossy().as_bytes());
        hasher.update(&[0]);
        hasher.update(identity.suite.as_bytes());
        hasher.update(&[0]);
        hasher.update(identity.name.as_bytes());
        hasher.update(&[0]);
        hasher.update(location.file.to_string_lossy().as_bytes());
        hasher.update(&[0]);
        hasher.update(&location.line.to_le_bytes());
        let digest = hasher.finalize();

        let name: String = identity
            .qualified_name()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();

        Self(format!("{prefix}{name}_{}", hex::encode(&digest.as_bytes()[..8])))
    }

    /// Id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NeedId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Need type tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedKind {
    /// Link between a test and the requirements it verifies
    #[default]
    #[serde(rename = "testlink")]
    TestLink,
}

/// Location as rendered into a need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedLocation {
    /// Source file path
    pub file: String,
    /// 1-indexed line
    pub line: u32,
}

impl From<&SourceLocation> for NeedLocation {
    fn from(loc: &SourceLocation) -> Self {
        Self {
            file: loc.file.to_string_lossy().into_owned(),
            line: loc.line,
        }
    }
}

/// Documentation-layer need synthesized from one test link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalNeed {
    /// Synthetic id
    pub id: NeedId,
    /// Always [`NeedKind::TestLink`]
    pub kind: NeedKind,
    /// Qualified test name
    pub title: String,
    /// Partially verified requirements
    pub verifies_partial: BTreeSet<RequirementId>,
    /// Fully verified requirements
    pub verifies_full: BTreeSet<RequirementId>,
    /// Where the test is defined
    pub location: NeedLocation,
    /// Test outcome
    pub outcome: Outcome,
    /// Test type classification
    pub test_type: String,
    /// Derivation technique classification
    pub derivation_technique: String,
    /// Extra classifications
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub classifications: BTreeMap<String, String>,
    /// Cleaned failure/skip text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_text: Option<String>,
}

impl ExternalNeed {
    /// Requirement ids verified at the given degree
    #[must_use]
    pub fn verifies(&self, degree: VerificationDegree) -> &BTreeSet<RequirementId> {
        match degree {
            VerificationDegree::Partial => &self.verifies_partial,
            VerificationDegree::Full => &self.verifies_full,
        }
    }
}
