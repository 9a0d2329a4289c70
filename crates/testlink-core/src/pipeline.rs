//! Read → reconcile → emit, in one synchronous pass
//!
//! Per-file and per-test failures are isolated: everything that went wrong
//! is returned next to the needs that were produced, and the caller decides
//! whether any of it should fail a build.

use crate::config::LinkerConfig;
use crate::diagnostics::Diagnostic;
use crate::emitter::{Emission, NeedEmitter};
use crate::error::{EmissionError, TestLinkResult};
use crate::index::NeedsIndex;
use crate::reconciler::{ReconcileSummary, Reconciler};
use std::path::PathBuf;
use testlink_model::{ExternalNeed, TestLink};
use testlink_reader::ReadError;

/// Everything one pipeline run produced
#[derive(Debug, Default)]
pub struct PipelineOutput {
    /// Emitted needs, in link order
    pub needs: Vec<ExternalNeed>,
    /// Reconciled links, in record order
    pub links: Vec<TestLink>,
    /// Rejected annotations
    pub diagnostics: Vec<Diagnostic>,
    /// Result logs (or inputs) that could not be read
    pub malformed_logs: Vec<ReadError>,
    /// Links that produced no need
    pub emission_errors: Vec<EmissionError>,
    /// Reconciler bucket counts
    pub summary: ReconcileSummary,
}

impl PipelineOutput {
    /// True if any annotation was rejected
    #[inline]
    #[must_use]
    pub fn has_rejections(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// True if anything at all went wrong
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_rejections() || !self.malformed_logs.is_empty() || !self.emission_errors.is_empty()
    }

    /// Backlink view of the emitted needs
    #[must_use]
    pub fn index(&self) -> NeedsIndex {
        NeedsIndex::build(&self.needs)
    }
}

/// Traceability extraction pipeline
#[derive(Debug, Clone)]
pub struct TraceabilityPipeline {
    config: LinkerConfig,
    reconciler: Reconciler,
    emitter: NeedEmitter,
}

impl TraceabilityPipeline {
    /// Create pipeline for the given configuration
    #[must_use]
    pub fn new(config: LinkerConfig) -> Self {
        Self {
            reconciler: Reconciler::new(&config),
            emitter: NeedEmitter::new(config.need_id_prefix.clone()),
            config,
        }
    }

    /// Create pipeline after validating the configuration
    ///
    /// # Errors
    /// Returns `TestLinkError::Config` if the configuration is inconsistent
    pub fn try_new(config: LinkerConfig) -> TestLinkResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// Run over result log files and/or directories
    ///
    /// Records stream straight from the reader into the reconciler; read
    /// errors are set aside without stopping the pass.
    pub fn run<I, P>(&self, inputs: I) -> PipelineOutput
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let reader = self.config.reader(inputs);
        tracing::info!("Extracting traceability from {} inputs", reader.inputs().len());

        let mut malformed_logs = Vec::new();
        let records = reader.records().filter_map(|result| match result {
            Ok(record) => Some(record),
            Err(e) => {
                malformed_logs.push(e);
                None
            }
        });
        let reconciliation = self.reconciler.reconcile(records);

        let Emission { needs, errors } = self.emitter.emit(&reconciliation.links);

        tracing::info!(
            "Emitted {} needs: {} linked, {} unlinked, {} rejected, {} unreadable logs, {} emission errors",
            needs.len(),
            reconciliation.summary.linked,
            reconciliation.summary.unlinked,
            reconciliation.summary.rejected,
            malformed_logs.len(),
            errors.len()
        );

        PipelineOutput {
            needs,
            links: reconciliation.links,
            diagnostics: reconciliation.diagnostics,
            malformed_logs,
            emission_errors: errors,
            summary: reconciliation.summary,
        }
    }
}

impl Default for TraceabilityPipeline {
    fn default() -> Self {
        Self::new(LinkerConfig::default())
    }
}
