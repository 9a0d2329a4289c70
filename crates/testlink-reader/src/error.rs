//! Error types for result log reading
//!
//! Every error is scoped to one file: the reader reports it and moves on to
//! the next log.

use std::path::PathBuf;

/// Errors reading or parsing a single result log
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// File is not a well-formed result log
    #[error("malformed result log {path}: {message}")]
    MalformedLog { path: PathBuf, message: String },

    /// IO error during discovery or read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit
    #[error("result log {path} too large: {size} bytes (max: {max})")]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    /// No registered parser accepts the file
    #[error("no parser for result log: {0}")]
    NoParser(PathBuf),
}

impl ReadError {
    /// Create malformed-log error for path
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MalformedLog {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Path of the offending file
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::MalformedLog { path, .. }
            | Self::Io { path, .. }
            | Self::FileTooLarge { path, .. }
            | Self::NoParser(path) => path,
        }
    }

    /// True for content errors (as opposed to IO or size limits)
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedLog { .. })
    }
}
