//! Case JSON result parser
//!
//! Reads a flat JSON array of test cases. This is also the shape
//! [`CaseJsonParser::render`] writes, so parsed records can be dumped
//! between documentation builds and read back like any other log:
//!
//! ```json
//! [{"suite": "auth", "name": "test_login", "file": "tests/auth.py", "line": 12,
//!   "result": "passed", "properties": {"partially_verifies": ["req_A"]}}]
//! ```
//!
//! Dumps that carry annotations as top-level keys (`"TestType": "unit"`)
//! are accepted too: unknown top-level keys become properties unless the
//! `properties` map already has them. `null` values count as absent.

use crate::error::ReadError;
use crate::parsers::ResultLogParser;
use crate::text::clean_result_text;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use testlink_model::{Outcome, Properties, SourceLocation, TestIdentity, TestRecord};

/// One entry of the case JSON array
#[derive(Debug, Serialize, Deserialize)]
struct CaseEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    suite: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line: Option<LineValue>,
    result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result_text: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// Line numbers appear as numbers, as strings, and occasionally as junk
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum LineValue {
    Number(u64),
    Text(String),
    Other(Value),
}

impl LineValue {
    fn as_line(&self) -> Option<u32> {
        match self {
            Self::Number(n) => u32::try_from(*n).ok(),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Other(_) => None,
        }
    }
}

impl CaseEntry {
    fn from_record(record: &TestRecord) -> Self {
        let location = record.location();
        Self {
            suite: record.identity().suite.clone(),
            name: record.identity().name.clone(),
            file: location.map(|l| l.file().to_string_lossy().into_owned()),
            line: location.map(|l| LineValue::Number(u64::from(l.line))),
            result: record.outcome().as_str().to_string(),
            result_text: record.result_text().map(str::to_string),
            properties: record
                .properties()
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
            extra: BTreeMap::new(),
        }
    }
}

/// Property value as stored on a record, `None` for JSON `null`
fn property_text(value: Value) -> Option<String> {
    // Non-string values keep their JSON text so list-valued properties
    // look the same as in the XML form.
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Case JSON parser
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseJsonParser;

impl CaseJsonParser {
    /// Create new case JSON parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Render records as case JSON that [`parse`](ResultLogParser::parse)
    /// reads back into the same identities, locations, outcomes, texts and
    /// properties
    ///
    /// # Errors
    /// Returns the serializer error if rendering fails
    pub fn render(records: &[TestRecord]) -> Result<String, serde_json::Error> {
        let entries: Vec<CaseEntry> = records.iter().map(CaseEntry::from_record).collect();
        serde_json::to_string_pretty(&entries)
    }

    fn to_record(entry: CaseEntry, origin: &Path) -> Result<TestRecord, ReadError> {
        if entry.name.is_empty() {
            return Err(ReadError::malformed(origin, "test case without name"));
        }
        let outcome: Outcome = entry.result.parse().map_err(|e| {
            ReadError::malformed(origin, format!("test case {}: {e}", entry.name))
        })?;

        let line = entry.line.as_ref().and_then(LineValue::as_line);
        let location = match (entry.file, line) {
            (Some(file), Some(line)) if !file.is_empty() => Some(SourceLocation::new(file, line)),
            _ => None,
        };

        let mut properties: Properties = entry
            .properties
            .into_iter()
            .filter_map(|(k, v)| property_text(v).map(|v| (k, v)))
            .collect();
        for (key, value) in entry.extra {
            if let Some(text) = property_text(value) {
                properties.entry(key).or_insert(text);
            }
        }

        Ok(TestRecord::new(TestIdentity::new(entry.suite, entry.name), outcome, origin)
            .with_location(location)
            .with_result_text(entry.result_text.map(|t| clean_result_text(&t)))
            .with_properties(properties))
    }
}

impl ResultLogParser for CaseJsonParser {
    fn parse(&self, content: &str, origin: &Path) -> Result<Vec<TestRecord>, ReadError> {
        let entries: Vec<CaseEntry> = serde_json::from_str(content)
            .map_err(|e| ReadError::malformed(origin, format!("JSON parse error: {e}")))?;

        entries
            .into_iter()
            .map(|entry| Self::to_record(entry, origin))
            .collect()
    }

    fn name(&self) -> &'static str {
        "case-json"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Vec<TestRecord>, ReadError> {
        CaseJsonParser.parse(content, Path::new("cases.json"))
    }

    #[test]
    fn parses_entries() {
        let content = r#"[
            {"suite": "auth", "name": "test_login", "file": "tests/auth.py", "line": 12,
             "result": "failed", "result_text": "assert\nfalse",
             "properties": {"test_type": "interface-test", "partially_verifies": ["req_A"]}}
        ]"#;

        let records = parse(content).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.identity(), &TestIdentity::new("auth", "test_login"));
        assert_eq!(record.location(), Some(&SourceLocation::new("tests/auth.py", 12)));
        assert_eq!(record.outcome(), Outcome::Failed);
        assert_eq!(record.result_text(), Some("assert false"));
        assert_eq!(record.property("test_type"), Some("interface-test"));
        assert_eq!(record.property("partially_verifies"), Some(r#"["req_A"]"#));
    }

    #[test]
    fn line_as_string() {
        let content = r#"[{"name": "t", "file": "a.py", "line": "7", "result": "passed"}]"#;
        let records = parse(content).unwrap();
        assert_eq!(records[0].location(), Some(&SourceLocation::new("a.py", 7)));
    }

    #[test]
    fn disabled_maps_to_skipped() {
        let content = r#"[{"name": "t", "result": "disabled"}]"#;
        assert_eq!(parse(content).unwrap()[0].outcome(), Outcome::Skipped);
    }

    #[test]
    fn unknown_result_is_malformed() {
        let content = r#"[{"name": "t", "result": "flaky"}]"#;
        assert!(matches!(parse(content), Err(ReadError::MalformedLog { .. })));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(parse("[{"), Err(ReadError::MalformedLog { .. })));
        assert!(matches!(parse(r#"{"name": "t"}"#), Err(ReadError::MalformedLog { .. })));
    }

    #[test]
    fn bare_string_property_stays_string() {
        let content = r#"[{"name": "t", "result": "passed", "properties": {"partially_verifies": "req_B"}}]"#;
        assert_eq!(parse(content).unwrap()[0].property("partially_verifies"), Some("req_B"));
    }

    #[test]
    fn unusable_line_drops_location_only() {
        let content = r#"[
            {"name": "good", "file": "a.py", "line": 3, "result": "passed"},
            {"name": "negative", "file": "a.py", "line": -1, "result": "passed"},
            {"name": "float", "file": "a.py", "line": 3.5, "result": "passed"},
            {"name": "object", "file": "a.py", "line": {}, "result": "passed"},
            {"name": "null", "file": "a.py", "line": null, "result": "passed"}
        ]"#;

        let records = parse(content).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].location(), Some(&SourceLocation::new("a.py", 3)));
        assert!(records[1..].iter().all(|r| r.location().is_none()));
    }

    #[test]
    fn top_level_annotation_keys_become_properties() {
        let content = r#"[{"name": "t", "file": "a.py", "line": "4", "result": "passed",
            "TestType": "unit", "DerivationTechnique": null,
            "PartiallyVerifies": ["req_A"], "FullyVerifies": "",
            "properties": {"TestType": "interface-test"}}]"#;

        let record = &parse(content).unwrap()[0];
        assert_eq!(record.property("TestType"), Some("interface-test"));
        assert_eq!(record.property("PartiallyVerifies"), Some(r#"["req_A"]"#));
        assert_eq!(record.property("FullyVerifies"), Some(""));
        assert_eq!(record.property("DerivationTechnique"), None);
    }

    #[test]
    fn rendered_records_parse_back() {
        let original = vec![
            TestRecord::new(TestIdentity::new("auth", "test_login"), Outcome::Failed, "out/test.xml")
                .with_location(Some(SourceLocation::new("tests/auth.py", 12)))
                .with_result_text(Some("assert False".to_string()))
                .with_property("partially_verifies", r#"["req_A"]"#)
                .with_property("test_type", "interface-test"),
            TestRecord::new(TestIdentity::new("", "bare"), Outcome::Errored, "out/test.xml"),
        ];

        let rendered = CaseJsonParser::render(&original).unwrap();
        let parsed = CaseJsonParser.parse(&rendered, Path::new("out/test.xml")).unwrap();
        assert_eq!(parsed, original);
    }
}
