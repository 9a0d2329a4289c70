//! Identity primitives
//!
//! Provides the names tests and requirements are addressed by:
//! - [`TestIdentity`]: suite + test function
//! - [`SourceLocation`]: file + line of the test definition
//! - [`RequirementId`]: opaque, non-empty requirement token

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Qualified name of one test case
///
/// Unique within a single result log; the same identity may appear in
/// several logs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TestIdentity {
    /// Suite or class the test belongs to (may be empty)
    pub suite: String,
    /// Test function name
    pub name: String,
}

impl TestIdentity {
    /// Create identity from suite and name
    #[inline]
    #[must_use]
    pub fn new(suite: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
        }
    }

    /// Qualified name (`suite::name`, or `name` when the suite is empty)
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.to_string()
    }
}

impl Display for TestIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.suite.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}::{}", self.suite, self.name)
        }
    }
}

/// Source position of a test definition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file path as reported by the runner
    pub file: PathBuf,
    /// 1-indexed line number
    pub line: u32,
}

impl SourceLocation {
    /// Create a new location
    #[inline]
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Source file path
    #[inline]
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Opaque requirement identifier
///
/// Kept verbatim: no trimming, no case folding. The only constraint is that
/// it contains something other than whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequirementId(String);

impl RequirementId {
    /// Create identifier, rejecting empty or whitespace-only input
    ///
    /// # Errors
    /// Returns [`ModelError::EmptyRequirementId`] for blank input
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ModelError::EmptyRequirementId);
        }
        Ok(Self(id))
    }

    /// Identifier as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RequirementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RequirementId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RequirementId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RequirementId> for String {
    fn from(id: RequirementId) -> Self {
        id.0
    }
}

impl AsRef<str> for RequirementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors constructing model values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Requirement identifier is empty or whitespace
    #[error("requirement id must not be empty")]
    EmptyRequirementId,

    /// Unknown test outcome label
    #[error("unknown outcome: '{0}'")]
    UnknownOutcome(String),
}
