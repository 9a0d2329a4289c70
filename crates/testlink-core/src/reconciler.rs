//! Reconciler
//!
//! Sorts each test record into exactly one bucket:
//! - **linked**: valid spec, a [`TestLink`] is produced
//! - **unlinked**: no or incomplete annotation, silently skipped
//! - **rejected**: malformed annotation, a [`Diagnostic`] is recorded
//!
//! Output order follows input order. Nothing about a record's outcome
//! depends on the records before it.

use crate::annotation::{AnnotationValidator, InvalidField, SpecExtraction};
use crate::config::LinkerConfig;
use crate::diagnostics::Diagnostic;
use serde::Serialize;
use testlink_model::{TestLink, TestRecord};

/// Bucket a single record falls into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Valid spec
    Linked(TestLink),
    /// No traceability claim
    Unlinked,
    /// Malformed spec
    Rejected(Diagnostic),
}

/// Per-bucket record counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Records that produced a link
    pub linked: usize,
    /// Records without a complete annotation
    pub unlinked: usize,
    /// Records with a malformed annotation
    pub rejected: usize,
}

impl ReconcileSummary {
    /// Total records seen
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.linked + self.unlinked + self.rejected
    }
}

/// Links and diagnostics from one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Links in input order
    pub links: Vec<TestLink>,
    /// Diagnostics in input order
    pub diagnostics: Vec<Diagnostic>,
    /// Bucket counts
    pub summary: ReconcileSummary,
}

impl Reconciliation {
    fn push(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Linked(link) => {
                self.summary.linked += 1;
                self.links.push(link);
            }
            RecordOutcome::Unlinked => self.summary.unlinked += 1,
            RecordOutcome::Rejected(diagnostic) => {
                self.summary.rejected += 1;
                self.diagnostics.push(diagnostic);
            }
        }
    }
}

/// Matches test records against the annotation model
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    validator: AnnotationValidator,
}

impl Reconciler {
    /// Create reconciler for the given configuration
    #[must_use]
    pub fn new(config: &LinkerConfig) -> Self {
        Self::with_validator(AnnotationValidator::from_config(config))
    }

    /// Create reconciler around an existing validator
    #[inline]
    #[must_use]
    pub fn with_validator(validator: AnnotationValidator) -> Self {
        Self { validator }
    }

    /// Classify one record
    #[must_use]
    pub fn classify(&self, record: &TestRecord) -> RecordOutcome {
        match self.validator.extract(record.properties()) {
            SpecExtraction::Valid(spec) => RecordOutcome::Linked(TestLink::new(record, spec)),
            SpecExtraction::Incomplete { missing } => {
                if self.validator.has_annotation(record.properties()) {
                    tracing::debug!(
                        "Test {} not linked, missing annotation fields: {}",
                        record.identity(),
                        missing.join(", ")
                    );
                }
                RecordOutcome::Unlinked
            }
            SpecExtraction::Invalid(InvalidField { key, detail }) => {
                let diagnostic = Diagnostic::new(record.identity().clone(), record.origin(), key, detail);
                tracing::warn!("Rejected annotation: {}", diagnostic);
                RecordOutcome::Rejected(diagnostic)
            }
        }
    }

    /// Reconcile a record stream
    ///
    /// Never fails: rejected records are reported in
    /// [`Reconciliation::diagnostics`] and the pass continues.
    pub fn reconcile<I>(&self, records: I) -> Reconciliation
    where
        I: IntoIterator<Item = TestRecord>,
    {
        let mut result = Reconciliation::default();
        for record in records {
            result.push(self.classify(&record));
        }

        tracing::debug!(
            "Reconciled {} records: {} linked, {} unlinked, {} rejected",
            result.summary.total(),
            result.summary.linked,
            result.summary.unlinked,
            result.summary.rejected
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testlink_test_utils::{annotation, record_with, FULLY_VERIFIES, PARTIALLY_VERIFIES};

    fn reconciler() -> Reconciler {
        Reconciler::new(&LinkerConfig::default())
    }

    #[test]
    fn three_buckets() {
        let records = vec![
            record_with("linked", &annotation(&["req_A"], &[], "unit", "analysis")),
            record_with("plain", &[]),
            record_with(
                "bad",
                &[
                    (PARTIALLY_VERIFIES.to_string(), "req_B".to_string()),
                    (FULLY_VERIFIES.to_string(), "[]".to_string()),
                    ("test_type".to_string(), "x".to_string()),
                    ("derivation_technique".to_string(), "y".to_string()),
                ],
            ),
        ];

        let result = reconciler().reconcile(records);

        assert_eq!(
            result.summary,
            ReconcileSummary {
                linked: 1,
                unlinked: 1,
                rejected: 1
            }
        );
        assert_eq!(result.links[0].identity().name, "linked");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].test.name, "bad");
        assert_eq!(result.diagnostics[0].reason(), "invalid partially_verifies");
    }

    #[test]
    fn order_preserved() {
        let records: Vec<_> = ["t3", "t1", "t2"]
            .iter()
            .map(|name| record_with(name, &annotation(&[], &["req_A"], "unit", "analysis")))
            .collect();

        let names: Vec<_> = reconciler()
            .reconcile(records)
            .links
            .iter()
            .map(|l| l.identity().name.clone())
            .collect();
        assert_eq!(names, vec!["t3", "t1", "t2"]);
    }

    #[test]
    fn empty_sets_still_linked() {
        let record = record_with("t", &annotation(&[], &[], "unit", "analysis"));
        let RecordOutcome::Linked(link) = reconciler().classify(&record) else {
            panic!("expected link");
        };
        assert!(link.spec().verifies_nothing());
    }

    #[test]
    fn incomplete_is_silent() {
        let record = record_with("t", &[("test_type".to_string(), "unit".to_string())]);
        let result = reconciler().reconcile([record]);
        assert!(result.links.is_empty());
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.summary.unlinked, 1);
    }

    #[test]
    fn diagnostic_carries_origin() {
        let mut props = annotation(&[], &[], "unit", "analysis");
        props[1].1 = "{}".to_string();
        let RecordOutcome::Rejected(diag) = reconciler().classify(&record_with("t", &props)) else {
            panic!("expected rejection");
        };
        assert_eq!(diag.field, FULLY_VERIFIES);
        assert_eq!(diag.origin(), std::path::Path::new("out/test.xml"));
    }

    #[test]
    fn empty_input() {
        let result = reconciler().reconcile(Vec::new());
        assert_eq!(result, Reconciliation::default());
    }
}
