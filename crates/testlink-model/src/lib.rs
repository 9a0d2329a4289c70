//! Testlink Data Model
//!
//! Plain, immutable data flowing through the traceability pipeline.
//!
//! # Core Concepts
//!
//! - [`TestRecord`]: one executed test case as reported by a result log
//! - [`VerificationSpec`]: the requirement-verification annotation of a test
//! - [`TestLink`]: a record reconciled with a valid spec
//! - [`ExternalNeed`]: the documentation-facing unit emitted per link
//!
//! # Example
//!
//! ```rust
//! use testlink_model::{Outcome, TestIdentity, TestRecord};
//!
//! let record = TestRecord::new(TestIdentity::new("suite", "test_login"), Outcome::Passed, "test.xml")
//!     .with_property("test_type", "interface-test");
//!
//! assert_eq!(record.property("test_type"), Some("interface-test"));
//! ```

#![warn(unreachable_pub)]

mod identity;
mod link;
mod need;
mod record;

pub use identity::{ModelError, RequirementId, SourceLocation, TestIdentity};
pub use link::{TestLink, VerificationDegree, VerificationSpec};
pub use need::{ExternalNeed, NeedId, NeedKind, NeedLocation};
pub use record::{Outcome, Properties, TestRecord};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
