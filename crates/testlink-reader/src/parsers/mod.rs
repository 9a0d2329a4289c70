//! Result log parsers
//!
//! Provides parsing from runner output formats into [`TestRecord`]s:
//! - JUnit-style XML (suites → cases → properties/outcome markers)
//! - Case JSON (flat list of test cases with a property map)

use crate::error::ReadError;
use std::path::Path;
use std::sync::Arc;
use testlink_model::TestRecord;

mod json;
mod junit;

pub use json::CaseJsonParser;
pub use junit::JUnitXmlParser;

/// Parser trait for converting result log content into test records
///
/// Implement this trait to add support for new runner formats. A parser
/// either returns every record in the file or an error for the whole file.
pub trait ResultLogParser: Send + Sync + 'static {
    /// Parse log content; `origin` is stamped on every record
    ///
    /// # Errors
    /// Returns [`ReadError::MalformedLog`] if the content is not a
    /// well-formed log of this format
    fn parse(&self, content: &str, origin: &Path) -> Result<Vec<TestRecord>, ReadError>;

    /// Short format name for diagnostics
    fn name(&self) -> &'static str;

    /// Check if this parser can handle the given path
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }

    /// Supported file extensions (without dot)
    fn extensions(&self) -> &[&str];

    /// Parser priority (higher = tried first when multiple parsers match)
    fn priority(&self) -> i32 {
        0
    }
}

/// Parser registration for choosing a parser per file
#[derive(Clone)]
pub struct ParserRegistry {
    parsers: Vec<Arc<dyn ResultLogParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        default_parsers()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("parsers", &self.parsers.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("extensions", &self.all_extensions())
            .finish()
    }
}

impl ParserRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Register a parser
    pub fn register<P: ResultLogParser>(&mut self, parser: P) {
        self.parsers.push(Arc::new(parser));
        // Stable sort keeps registration order among equal priorities
        self.parsers.sort_by_key(|p| std::cmp::Reverse(p.priority()));
    }

    /// Find parser for path
    #[must_use]
    pub fn find_for_path(&self, path: &Path) -> Option<&dyn ResultLogParser> {
        self.parsers.iter().find(|p| p.can_parse(path)).map(|p| &**p)
    }

    /// Get all registered extensions
    #[must_use]
    pub fn all_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|p| p.extensions())
            .copied()
            .collect()
    }

    /// Number of registered parsers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// True if no parser is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

/// Create default parser registry with built-in parsers
#[must_use]
pub fn default_parsers() -> ParserRegistry {
    let mut registry = ParserRegistry::new();
    registry.register(JUnitXmlParser);
    registry.register(CaseJsonParser);
    registry
}
