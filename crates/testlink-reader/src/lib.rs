//! Testlink Result Log Reader
//!
//! The boundary between runner output on disk and the traceability core.
//!
//! # Core Operations
//!
//! - **Discover**: resolve files and directories into an ordered log list
//! - **Parse**: turn each log into [`TestRecord`]s via a [`ResultLogParser`]
//! - **Iterate**: yield records lazily, one file at a time
//!
//! # Architecture
//!
//! ```text
//! inputs → discover → [test.xml, ...] → ParserRegistry → ResultLogParser → TestRecord*
//!                                                 ↓
//!                                          ReadError (per file)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use testlink_reader::ResultLogReader;
//!
//! let reader = ResultLogReader::new(["bazel-testlogs"]);
//! for record in reader.records() {
//!     match record {
//!         Ok(record) => println!("{} {}", record.identity(), record.outcome()),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod error;
pub mod parsers;
pub mod reader;
pub mod text;

// Re-exports for convenience
pub use error::ReadError;
pub use parsers::{default_parsers, CaseJsonParser, JUnitXmlParser, ParserRegistry, ResultLogParser};
pub use reader::{Discovery, ResultLog, ResultLogReader, DEFAULT_MAX_FILE_SIZE, DEFAULT_RESULT_FILE_NAME};

pub use testlink_model::TestRecord;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
