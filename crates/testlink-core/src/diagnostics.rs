//! Diagnostics for rejected verification annotations

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use testlink_model::TestIdentity;

/// A test whose annotation was present but malformed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Offending test
    #[serde(rename = "test_identity")]
    pub test: TestIdentity,
    /// Result log the test was read from
    pub origin: PathBuf,
    /// Configured name of the first malformed property
    pub field: String,
    /// Short reason, e.g. `invalid partially_verifies`
    pub reason: String,
    /// What is wrong with its value
    pub detail: String,
}

impl Diagnostic {
    /// Create diagnostic
    #[must_use]
    pub fn new(
        test: TestIdentity,
        origin: impl Into<PathBuf>,
        field: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let field = field.into();
        Self {
            test,
            origin: origin.into(),
            reason: format!("invalid {field}"),
            field,
            detail: detail.into(),
        }
    }

    /// Short reason, e.g. `invalid partially_verifies`
    #[inline]
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Result log the test was read from
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &Path {
        &self.origin
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}: {}",
            self.test,
            self.origin.display(),
            self.reason,
            self.detail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_names_field() {
        let diag = Diagnostic::new(
            TestIdentity::new("suite", "T3"),
            "out/test.xml",
            "partially_verifies",
            "expected a list of strings, got 'req_B'",
        );
        assert_eq!(diag.reason(), "invalid partially_verifies");
        assert_eq!(
            diag.to_string(),
            "suite::T3 (out/test.xml): invalid partially_verifies: expected a list of strings, got 'req_B'"
        );
    }

    #[test]
    fn serialized_form_names_test_and_reason() {
        let diag = Diagnostic::new(TestIdentity::new("suite", "T3"), "out/test.xml", "fully_verifies", "bad");
        let value = serde_json::to_value(&diag).unwrap();

        assert_eq!(value["test_identity"]["name"], "T3");
        assert_eq!(value["test_identity"]["suite"], "suite");
        assert_eq!(value["reason"], "invalid fully_verifies");
        assert_eq!(value["field"], "fully_verifies");
        assert!(value.get("test").is_none());

        let back: Diagnostic = serde_json::from_value(value).unwrap();
        assert_eq!(back, diag);
    }
}
