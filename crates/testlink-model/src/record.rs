//! Executed test records
//!
//! A [`TestRecord`] is created fresh on every parse of a result log and is
//! never mutated afterwards; builder methods consume `self`.

use crate::identity::{ModelError, SourceLocation, TestIdentity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Custom test properties (key → value, last write wins)
pub type Properties = BTreeMap<String, String>;

/// Outcome of one executed test
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Test ran and passed
    Passed,
    /// Test ran and an assertion failed
    Failed,
    /// Test could not complete (setup error, crash, ...)
    Errored,
    /// Test was skipped or disabled
    Skipped,
}

impl Outcome {
    /// Lowercase label used in logs and emitted needs
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Errored => "errored",
            Self::Skipped => "skipped",
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ModelError;

    /// Accepts the canonical labels plus the common runner aliases
    /// (`error`, `failure`, `disabled`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passed" | "pass" | "success" | "ok" => Ok(Self::Passed),
            "failed" | "fail" | "failure" => Ok(Self::Failed),
            "errored" | "error" => Ok(Self::Errored),
            "skipped" | "skip" | "disabled" | "notrun" => Ok(Self::Skipped),
            _ => Err(ModelError::UnknownOutcome(s.to_string())),
        }
    }
}

/// One executed test case as reported by a runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    identity: TestIdentity,
    location: Option<SourceLocation>,
    outcome: Outcome,
    result_text: Option<String>,
    properties: Properties,
    origin: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    origin_key: Option<PathBuf>,
}

impl TestRecord {
    /// Create a record with no location, text or properties
    ///
    /// `origin` is the result log the record was read from.
    #[must_use]
    pub fn new(identity: TestIdentity, outcome: Outcome, origin: impl Into<PathBuf>) -> Self {
        Self {
            identity,
            location: None,
            outcome,
            result_text: None,
            properties: Properties::new(),
            origin: origin.into(),
            origin_key: None,
        }
    }

    /// With source location
    #[inline]
    #[must_use]
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// With result text (failure message, skip reason)
    #[inline]
    #[must_use]
    pub fn with_result_text(mut self, text: Option<String>) -> Self {
        self.result_text = text.filter(|t| !t.is_empty());
        self
    }

    /// With a single property; a repeated key replaces the earlier value
    #[inline]
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// With a full property map
    #[inline]
    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// With the origin path relative to the scanned input root
    #[inline]
    #[must_use]
    pub fn with_origin_key(mut self, key: impl Into<PathBuf>) -> Self {
        self.origin_key = Some(key.into());
        self
    }

    /// Test identity
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &TestIdentity {
        &self.identity
    }

    /// Source location, if the runner reported one
    #[inline]
    #[must_use]
    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// Outcome
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

    /// All properties
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Property value by key
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Result log this record came from
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Location-independent name of the result log
    ///
    /// Falls back to [`origin`](Self::origin) when no key was assigned.
    #[must_use]
    pub fn origin_key(&self) -> &Path {
        self.origin_key.as_deref().unwrap_or(&self.origin)
    }
}
