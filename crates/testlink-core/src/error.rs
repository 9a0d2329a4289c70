//! Error types for Testlink Core
//!
//! Provides error handling for:
//! - Configuration loading and validation
//! - Need emission (links that cannot become needs)
//! - Needs persistence

use std::path::PathBuf;
use testlink_model::TestIdentity;
use testlink_reader::ReadError;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading a config file
    #[error("io error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Values parse but are inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A test link that cannot be turned into a need
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmissionError {
    /// The need schema requires a source location
    #[error("test {test} has no source location; need not emitted")]
    MissingLocation { test: TestIdentity },
}

/// Errors writing or reading persisted needs
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error on the needs file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Needs file content is not a list of needs
    #[error("invalid needs file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Combined Testlink error
#[derive(Debug, thiserror::Error)]
pub enum TestLinkError {
    #[error("read error: {0}")]
    Read(#[from] ReadError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("emission error: {0}")]
    Emission(#[from] EmissionError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for Testlink operations
pub type TestLinkResult<T> = Result<T, TestLinkError>;
