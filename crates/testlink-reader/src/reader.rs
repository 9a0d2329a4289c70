//! Result log discovery and lazy record iteration

use crate::error::ReadError;
use crate::parsers::{default_parsers, ParserRegistry};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use testlink_model::TestRecord;
use walkdir::WalkDir;

/// Default file name collected when scanning directories
pub const DEFAULT_RESULT_FILE_NAME: &str = "test.xml";

/// Default maximum size of one result log (10MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// One result log selected for reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLog {
    /// Path as found on disk
    pub path: PathBuf,
    /// Path relative to the parent of the input that led to it
    ///
    /// `out/run_1/test.xml` for a log found under input `/ws/out`; stays the
    /// same when the whole tree is moved, so need ids do too.
    pub key: PathBuf,
}

/// Files found by [`ResultLogReader::discover`]
#[derive(Debug, Default)]
pub struct Discovery {
    /// Result logs to read, sorted by path and de-duplicated
    pub files: Vec<ResultLog>,
    /// Inputs that could not be scanned
    pub errors: Vec<ReadError>,
}

impl Discovery {
    /// Paths of the discovered logs, in reading order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|log| log.path.as_path())
    }
}

/// Key of `path`, found through `input`, relative to the input's parent
///
/// A file given directly counts as found through its own directory, so
/// `out/run_1/test.xml` keys as `run_1/test.xml`.
fn origin_key(input: &Path, path: &Path) -> PathBuf {
    let scanned = if input.is_file() {
        input.parent().unwrap_or(input)
    } else {
        input
    };
    scanned
        .parent()
        .and_then(|base| path.strip_prefix(base).ok())
        .filter(|key| !key.as_os_str().is_empty())
        .map_or_else(|| path.to_path_buf(), Path::to_path_buf)
}

/// Reads test records from result logs
///
/// Holds only the input locations; every call to [`records`](Self::records)
/// rescans and rereads, so identical files yield identical sequences.
#[derive(Debug, Clone)]
pub struct ResultLogReader {
    inputs: Vec<PathBuf>,
    registry: ParserRegistry,
    result_file_names: Vec<String>,
    max_file_size: u64,
}

impl ResultLogReader {
    /// Create reader over files and/or directories with default parsers
    #[must_use]
    pub fn new<I, P>(inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            registry: default_parsers(),
            result_file_names: vec![DEFAULT_RESULT_FILE_NAME.to_string()],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// With a custom parser registry
    #[inline]
    #[must_use]
    pub fn with_registry(mut self, registry: ParserRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// With file names collected during directory scans
    #[inline]
    #[must_use]
    pub fn with_result_file_names(mut self, names: Vec<String>) -> Self {
        self.result_file_names = names;
        self
    }

    /// With maximum accepted file size in bytes
    #[inline]
    #[must_use]
    pub fn with_max_file_size(mut self, max: u64) -> Self {
        self.max_file_size = max;
        self
    }

    /// Configured inputs
    #[inline]
    #[must_use]
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// Resolve inputs into the ordered list of result logs
    ///
    /// Directories are walked recursively and contribute files whose name is
    /// one of the configured result file names. Files given directly are kept
    /// whatever their name.
    #[must_use]
    pub fn discover(&self) -> Discovery {
        let mut files: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
        let mut errors = Vec::new();

        for input in &self.inputs {
            if input.is_dir() {
                for entry in WalkDir::new(input).follow_links(true) {
                    match entry {
                        Ok(entry) if entry.file_type().is_file() && self.is_result_file(entry.path()) => {
                            let key = origin_key(input, entry.path());
                            files.entry(entry.into_path()).or_insert(key);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            let path = e.path().map_or_else(|| input.clone(), Path::to_path_buf);
                            let source = e
                                .into_io_error()
                                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                            errors.push(ReadError::io_error(path, source));
                        }
                    }
                }
            } else if input.is_file() {
                files
                    .entry(input.clone())
                    .or_insert_with(|| origin_key(input, input));
            } else {
                errors.push(ReadError::io_error(
                    input,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
                ));
            }
        }

        tracing::debug!("Discovered {} result logs ({} scan errors)", files.len(), errors.len());
        Discovery {
            files: files
                .into_iter()
                .map(|(path, key)| ResultLog { path, key })
                .collect(),
            errors,
        }
    }

    fn is_result_file(&self, path: &Path) -> bool {
        let name_matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.result_file_names.iter().any(|r| r == n));
        name_matches && self.registry.find_for_path(path).is_some()
    }

    /// Lazily read every record from every discovered log
    ///
    /// Scan errors come first, then records file by file in path order. A
    /// file is read only when iteration reaches it and contributes either all
    /// of its records or a single error.
    pub fn records(&self) -> impl Iterator<Item = Result<TestRecord, ReadError>> + '_ {
        let Discovery { files, errors } = self.discover();
        errors
            .into_iter()
            .map(Err)
            .chain(files.into_iter().flat_map(move |log| {
                match self.read_file(&log.path) {
                    Ok(records) => records
                        .into_iter()
                        .map(|record| Ok(record.with_origin_key(log.key.clone())))
                        .collect::<Vec<_>>(),
                    Err(e) => {
                        tracing::error!("Skipping result log: {}", e);
                        vec![Err(e)]
                    }
                }
            }))
    }

    /// Read and parse a single result log
    ///
    /// # Errors
    /// - `ReadError::NoParser` if no parser accepts the path
    /// - `ReadError::FileTooLarge` if the file exceeds the size limit
    /// - `ReadError::Io` if the file cannot be read
    /// - `ReadError::MalformedLog` if the content does not parse
    pub fn read_file(&self, path: &Path) -> Result<Vec<TestRecord>, ReadError> {
        let parser = self
            .registry
            .find_for_path(path)
            .ok_or_else(|| ReadError::NoParser(path.to_path_buf()))?;

        let size = std::fs::metadata(path)
            .map_err(|e| ReadError::io_error(path, e))?
            .len();
        if size > self.max_file_size {
            return Err(ReadError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                max: self.max_file_size,
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                ReadError::malformed(path, "not valid UTF-8")
            } else {
                ReadError::io_error(path, e)
            }
        })?;

        let records = parser.parse(&content, path)?;
        tracing::debug!(
            "Parsed {} test records from {} ({})",
            records.len(),
            path.display(),
            parser.name()
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testlink_test_utils::{write_file as write, JUnitLog, TestCaseXml};

    fn log_with(name: &str) -> String {
        JUnitLog::new("suite").case(TestCaseXml::new(name)).to_xml()
    }

    #[test]
    fn discovers_result_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b/test.xml", &log_with("t_b"));
        write(dir.path(), "a/test.xml", &log_with("t_a"));
        write(dir.path(), "a/other.xml", &log_with("ignored"));

        let reader = ResultLogReader::new([dir.path()]);
        let discovery = reader.discover();

        assert!(discovery.errors.is_empty());
        assert_eq!(
            discovery.paths().collect::<Vec<_>>(),
            vec![dir.path().join("a/test.xml"), dir.path().join("b/test.xml")]
        );
    }

    #[test]
    fn origin_keys_are_relative_to_input_parent() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = write(dir.path(), "out/run_1/test.xml", &log_with("t1"));
        write(dir.path(), "out/run_2/test.xml", &log_with("t2"));

        let keys: Vec<_> = ResultLogReader::new([dir.path().join("out")])
            .discover()
            .files
            .into_iter()
            .map(|log| log.key)
            .collect();
        assert_eq!(
            keys,
            vec![PathBuf::from("out/run_1/test.xml"), PathBuf::from("out/run_2/test.xml")]
        );

        let record = ResultLogReader::new([&explicit]).records().next().unwrap().unwrap();
        assert_eq!(record.origin(), explicit.as_path());
        assert_eq!(record.origin_key(), Path::new("run_1/test.xml"));
    }

    #[test]
    fn origin_keys_survive_moving_the_tree() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for root in [first.path(), second.path()] {
            write(root, "build/run/test.xml", &log_with("t"));
        }

        let key = |root: &Path| {
            let record = ResultLogReader::new([root.join("build")]).records().next().unwrap().unwrap();
            record.origin_key().to_path_buf()
        };
        assert_eq!(key(first.path()), key(second.path()));
    }

    #[test]
    fn explicit_files_bypass_name_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "custom-report.xml", &log_with("t"));

        let reader = ResultLogReader::new([&path]);
        let records: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn duplicate_inputs_read_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "x/test.xml", &log_with("t"));

        let reader = ResultLogReader::new([dir.path().to_path_buf(), path]);
        assert_eq!(reader.records().count(), 1);
    }

    #[test]
    fn malformed_file_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/test.xml", "<testsuite name=\"s\"><testcase name=\"t\">");
        write(dir.path(), "b/test.xml", &log_with("t_ok"));

        let reader = ResultLogReader::new([dir.path()]);
        let results: Vec<_> = reader.records().collect();

        assert_eq!(results.len(), 2);
        assert!(matches!(&results[0], Err(ReadError::MalformedLog { .. })));
        assert_eq!(results[1].as_ref().unwrap().identity().name, "t_ok");
    }

    #[test]
    fn missing_input_is_io_error() {
        let reader = ResultLogReader::new(["/definitely/not/here"]);
        let results: Vec<_> = reader.records().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(&results[0], Err(ReadError::Io { .. })));
    }

    #[test]
    fn oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "test.xml", &log_with("t"));

        let reader = ResultLogReader::new([&path]).with_max_file_size(8);
        assert!(matches!(
            reader.read_file(&path),
            Err(ReadError::FileTooLarge { max: 8, .. })
        ));
    }

    #[test]
    fn unknown_extension_has_no_parser() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "report.txt", "whatever");

        let reader = ResultLogReader::new([&path]);
        assert!(matches!(reader.read_file(&path), Err(ReadError::NoParser(_))));
    }

    #[test]
    fn custom_result_file_names() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/test.xml", &log_with("t_xml"));
        write(
            dir.path(),
            "b/cases.json",
            r#"[{"name": "t_json", "result": "passed"}]"#,
        );

        let reader = ResultLogReader::new([dir.path()])
            .with_result_file_names(vec!["test.xml".to_string(), "cases.json".to_string()]);
        let names: Vec<_> = reader
            .records()
            .map(|r| r.unwrap().identity().name.clone())
            .collect();
        assert_eq!(names, vec!["t_xml", "t_json"]);
    }

    #[test]
    fn records_are_restartable() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/test.xml", &log_with("t1"));
        write(dir.path(), "b/test.xml", &log_with("t2"));

        let reader = ResultLogReader::new([dir.path()]);
        let first: Vec<_> = reader.records().map(Result::unwrap).collect();
        let second: Vec<_> = reader.records().map(Result::unwrap).collect();
        assert_eq!(first, second);
    }
}
