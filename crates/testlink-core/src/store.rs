//! Needs persistence
//!
//! The documentation layer reads emitted needs from a JSON file, and test
//! records can be dumped as case JSON between builds. The core pipeline
//! itself never writes; callers hand its output to these helpers.

use crate::error::StoreError;
use std::fs;
use std::path::Path;
use testlink_model::{ExternalNeed, TestRecord};
use testlink_reader::parsers::CaseJsonParser;

/// Write needs as pretty-printed JSON, creating parent directories
///
/// # Errors
/// - `StoreError::Io` if a directory or the file cannot be written
/// - `StoreError::Json` if serialization fails
pub fn write_needs_json(path: impl AsRef<Path>, needs: &[ExternalNeed]) -> Result<(), StoreError> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(needs).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_json_text(path, content)?;

    tracing::info!("Wrote {} needs to {}", needs.len(), path.display());
    Ok(())
}

/// Write test records as case JSON, creating parent directories
///
/// The file is a regular result log: pointing the pipeline at it (or at its
/// directory, with `result_file_name` set accordingly) yields the same
/// links as the logs the records came from.
///
/// # Errors
/// - `StoreError::Io` if a directory or the file cannot be written
/// - `StoreError::Json` if serialization fails
pub fn write_records_json(path: impl AsRef<Path>, records: &[TestRecord]) -> Result<(), StoreError> {
    let path = path.as_ref();
    let content = CaseJsonParser::render(records).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_json_text(path, content)?;

    tracing::info!("Wrote {} test records to {}", records.len(), path.display());
    Ok(())
}

fn write_json_text(path: &Path, mut content: String) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io_error(parent, e))?;
    }
    content.push('\n');
    fs::write(path, content).map_err(|e| StoreError::io_error(path, e))
}

/// Read needs previously written by [`write_needs_json`]
///
/// # Errors
/// - `StoreError::Io` if the file cannot be read
/// - `StoreError::Json` if the content is not a list of needs
pub fn read_needs_json(path: impl AsRef<Path>) -> Result<Vec<ExternalNeed>, StoreError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| StoreError::io_error(path, e))?;
    serde_json::from_str(&content).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}
