//! Need emitter
//!
//! Maps each [`TestLink`] to exactly one [`ExternalNeed`], in input order.
//! A link the need schema cannot represent becomes an [`EmissionError`]
//! for that link only.

use crate::error::EmissionError;
use testlink_model::{ExternalNeed, NeedId, NeedKind, NeedLocation, TestLink};

/// Needs and per-link failures from one emission pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    /// Needs in link order
    pub needs: Vec<ExternalNeed>,
    /// Links that produced no need
    pub errors: Vec<EmissionError>,
}

/// Converts test links into external needs
#[derive(Debug, Clone)]
pub struct NeedEmitter {
    prefix: String,
}

impl NeedEmitter {
    /// Create emitter using `prefix` for need ids
    #[inline]
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Convert one link
    ///
    /// # Errors
    /// Returns `EmissionError::MissingLocation` if the link has no source
    /// location
    pub fn emit_one(&self, link: &TestLink) -> Result<ExternalNeed, EmissionError> {
        let location = link.location().ok_or_else(|| EmissionError::MissingLocation {
            test: link.identity().clone(),
        })?;
        let spec = link.spec();

        Ok(ExternalNeed {
            id: NeedId::derive(&self.prefix, link.identity(), location, link.origin_key()),
            kind: NeedKind::TestLink,
            title: link.identity().qualified_name(),
            verifies_partial: spec.partially_verifies.clone(),
            verifies_full: spec.fully_verifies.clone(),
            location: NeedLocation::from(location),
            outcome: link.outcome(),
            test_type: spec.test_type.clone(),
            derivation_technique: spec.derivation_technique.clone(),
            classifications: spec.classifications.clone(),
            result_text: link.result_text().map(str::to_string),
        })
    }

    /// Convert every link, collecting failures instead of stopping
    #[must_use]
    pub fn emit(&self, links: &[TestLink]) -> Emission {
        let mut emission = Emission::default();
        for link in links {
            match self.emit_one(link) {
                Ok(need) => emission.needs.push(need),
                Err(e) => {
                    tracing::warn!("{}", e);
                    emission.errors.push(e);
                }
            }
        }
        emission
    }
}

impl Default for NeedEmitter {
    fn default() -> Self {
        Self::new("TESTLINK_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testlink_model::{Outcome, RequirementId, TestIdentity, TestRecord, VerificationSpec};
    use testlink_test_utils::{annotation, record_with};

    fn link_for(record: &TestRecord) -> TestLink {
        let crate::annotation::SpecExtraction::Valid(spec) =
            crate::annotation::AnnotationValidator::default().extract(record.properties())
        else {
            panic!("fixture annotation must be valid");
        };
        TestLink::new(record, spec)
    }

    #[test]
    fn need_carries_link_data() {
        let record = record_with("T1", &annotation(&["req_A"], &["req_C"], "interface-test", "boundary-values"))
            .with_result_text(Some("boom".to_string()));
        let need = NeedEmitter::default().emit_one(&link_for(&record)).unwrap();

        assert!(need.id.as_str().starts_with("TESTLINK_suite__T1_"));
        assert_eq!(need.kind, NeedKind::TestLink);
        assert_eq!(need.title, "suite::T1");
        assert_eq!(
            need.verifies_partial.iter().map(RequirementId::as_str).collect::<Vec<_>>(),
            vec!["req_A"]
        );
        assert_eq!(
            need.verifies_full.iter().map(RequirementId::as_str).collect::<Vec<_>>(),
            vec!["req_C"]
        );
        assert_eq!(need.location.file, "tests/T1.py");
        assert_eq!(need.location.line, 1);
        assert_eq!(need.outcome, Outcome::Passed);
        assert_eq!(need.test_type, "interface-test");
        assert_eq!(need.result_text.as_deref(), Some("boom"));
    }

    #[test]
    fn missing_location_is_error_and_others_continue() {
        let located = record_with("a", &annotation(&[], &[], "unit", "analysis"));
        let unlocated = TestRecord::new(TestIdentity::new("suite", "b"), Outcome::Failed, "out/test.xml");
        let links = vec![
            link_for(&located),
            TestLink::new(&unlocated, VerificationSpec {
                partially_verifies: Default::default(),
                fully_verifies: Default::default(),
                test_type: "unit".to_string(),
                derivation_technique: "analysis".to_string(),
                classifications: Default::default(),
            }),
            link_for(&located),
        ];

        let emission = NeedEmitter::default().emit(&links);
        assert_eq!(emission.needs.len(), 2);
        assert_eq!(
            emission.errors,
            vec![EmissionError::MissingLocation {
                test: TestIdentity::new("suite", "b")
            }]
        );
    }

    #[test]
    fn custom_prefix() {
        let record = record_with("t", &annotation(&[], &[], "unit", "analysis"));
        let need = NeedEmitter::new("REQTEST_").emit_one(&link_for(&record)).unwrap();
        assert!(need.id.as_str().starts_with("REQTEST_"));
    }

    #[test]
    fn need_id_follows_origin_key_not_absolute_path() {
        let props = annotation(&["r"], &[], "unit", "analysis");
        let at = |root: &str| {
            let record = record_with("t", &props);
            let record = TestRecord::new(record.identity().clone(), record.outcome(), format!("{root}/build/run/test.xml"))
                .with_location(record.location().cloned())
                .with_properties(record.properties().clone())
                .with_origin_key("build/run/test.xml");
            NeedEmitter::default().emit_one(&link_for(&record)).unwrap().id
        };
        assert_eq!(at("/home/alice/ws"), at("/ci/agent-7"));
    }

    #[test]
    fn emission_is_deterministic() {
        let record = record_with("t", &annotation(&["r"], &[], "unit", "analysis"));
        let links = vec![link_for(&record)];
        let emitter = NeedEmitter::default();
        assert_eq!(emitter.emit(&links), emitter.emit(&links));
    }
}
