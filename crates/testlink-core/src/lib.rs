//! Testlink Core - traceability extraction
//!
//! Links executed tests to the requirements they claim to verify:
//! - Validates verification annotations on each test record
//! - Reconciles records into test links, rejecting malformed claims
//! - Emits one external need per link for the documentation layer
//! - Persists needs and builds requirement backlinks
//!
//! # Example
//!
//! ```rust,no_run
//! use testlink_core::{store, LinkerConfig, TraceabilityPipeline};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LinkerConfig::load("testlink.toml")?;
//! let output = TraceabilityPipeline::try_new(config)?.run(["bazel-testlogs"]);
//!
//! for diagnostic in &output.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! store::write_needs_json("_build/needs/testlinks.json", &output.needs)?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod annotation;
pub mod config;
pub mod diagnostics;
pub mod emitter;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod reconciler;
pub mod store;

// Re-exports for convenience
pub use annotation::{AnnotationValidator, InvalidField, SpecExtraction};
pub use config::{LinkerConfig, PropertyKeys};
pub use diagnostics::Diagnostic;
pub use emitter::{Emission, NeedEmitter};
pub use error::{ConfigError, EmissionError, StoreError, TestLinkError, TestLinkResult};
pub use index::{Backlinks, NeedsIndex};
pub use pipeline::{PipelineOutput, TraceabilityPipeline};
pub use reconciler::{ReconcileSummary, Reconciler, Reconciliation, RecordOutcome};

pub use testlink_model::{
    ExternalNeed, NeedId, Outcome, RequirementId, TestIdentity, TestLink, TestRecord,
    VerificationDegree, VerificationSpec,
};
pub use testlink_reader::{ReadError, ResultLogReader};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Testlink Core
    pub use crate::{
        Diagnostic, ExternalNeed, LinkerConfig, PipelineOutput, Reconciler, TestLink,
        TraceabilityPipeline,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
