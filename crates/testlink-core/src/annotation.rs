//! Verification annotation model
//!
//! Extracts a [`VerificationSpec`] from a test's property map. Completeness
//! is binary: all four required properties must be present, otherwise the
//! test simply carries no traceability claim. Present-but-malformed values
//! are reported so the author can fix them.
//!
//! Requirement lists are JSON arrays of strings (`["req_A", "req_B"]`).

use crate::config::{LinkerConfig, PropertyKeys};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use testlink_model::{Properties, RequirementId, VerificationSpec};

/// Result of attempting to extract a spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecExtraction {
    /// All required fields present and well-formed
    Valid(VerificationSpec),

    /// At least one required field absent; not an error
    Incomplete {
        /// Absent required keys, in validation order
        missing: Vec<String>,
    },

    /// All required fields present, at least one malformed
    Invalid(InvalidField),
}

impl SpecExtraction {
    /// True for [`SpecExtraction::Valid`]
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// First malformed field of an otherwise complete annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidField {
    /// Property key as configured
    pub key: String,
    /// What is wrong with the value
    pub detail: String,
}

/// Validates annotation properties against the expected shape
#[derive(Debug, Clone)]
pub struct AnnotationValidator {
    keys: PropertyKeys,
    classification_keys: Vec<String>,
}

impl Default for AnnotationValidator {
    fn default() -> Self {
        Self::new(PropertyKeys::default(), Vec::new())
    }
}

impl AnnotationValidator {
    /// Create validator for the given key names
    #[inline]
    #[must_use]
    pub fn new(keys: PropertyKeys, classification_keys: Vec<String>) -> Self {
        Self {
            keys,
            classification_keys,
        }
    }

    /// Create validator from linker configuration
    #[must_use]
    pub fn from_config(config: &LinkerConfig) -> Self {
        Self::new(config.property_keys.clone(), config.classification_keys.clone())
    }

    /// Required key names
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &PropertyKeys {
        &self.keys
    }

    /// True if any required key is present at all
    #[must_use]
    pub fn has_annotation(&self, properties: &Properties) -> bool {
        self.keys.required().iter().any(|k| properties.contains_key(*k))
    }

    /// Attempt to extract a spec from a property map
    ///
    /// Missing keys are checked before value shapes, so an annotation lacking
    /// a field is `Incomplete` even if another field is malformed. Extra keys
    /// are ignored.
    #[must_use]
    pub fn extract(&self, properties: &Properties) -> SpecExtraction {
        let missing: Vec<String> = self
            .keys
            .required()
            .iter()
            .filter(|k| !properties.contains_key(**k))
            .map(|k| (*k).to_string())
            .collect();
        if !missing.is_empty() {
            return SpecExtraction::Incomplete { missing };
        }

        let value = |key: &str| properties.get(key).map_or("", String::as_str);
        let invalid = |key: &str, detail: String| {
            SpecExtraction::Invalid(InvalidField {
                key: key.to_string(),
                detail,
            })
        };

        let partially_verifies = match parse_requirement_list(value(self.keys.partially_verifies.as_str())) {
            Ok(ids) => ids,
            Err(detail) => return invalid(self.keys.partially_verifies.as_str(), detail),
        };
        let fully_verifies = match parse_requirement_list(value(self.keys.fully_verifies.as_str())) {
            Ok(ids) => ids,
            Err(detail) => return invalid(self.keys.fully_verifies.as_str(), detail),
        };
        let test_type = match parse_classifier(value(self.keys.test_type.as_str())) {
            Ok(s) => s,
            Err(detail) => return invalid(self.keys.test_type.as_str(), detail),
        };
        let derivation_technique = match parse_classifier(value(self.keys.derivation_technique.as_str())) {
            Ok(s) => s,
            Err(detail) => return invalid(self.keys.derivation_technique.as_str(), detail),
        };

        let classifications: BTreeMap<String, String> = self
            .classification_keys
            .iter()
            .filter_map(|k| properties.get(k).map(|v| (k.clone(), v.clone())))
            .collect();

        SpecExtraction::Valid(VerificationSpec {
            partially_verifies,
            fully_verifies,
            test_type,
            derivation_technique,
            classifications,
        })
    }
}

/// Parse a JSON array of non-blank strings into requirement ids
fn parse_requirement_list(raw: &str) -> Result<BTreeSet<RequirementId>, String> {
    let value: Value =
        serde_json::from_str(raw).map_err(|_| format!("expected a list of strings, got '{raw}'"))?;
    let Value::Array(items) = value else {
        return Err(format!("expected a list of strings, got '{raw}'"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => {
                RequirementId::new(s).map_err(|_| format!("element {i} is an empty identifier"))
            }
            other => Err(format!("element {i} is not a string: {other}")),
        })
        .collect()
}

fn parse_classifier(raw: &str) -> Result<String, String> {
    if raw.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    Ok(raw.to_string())
}
