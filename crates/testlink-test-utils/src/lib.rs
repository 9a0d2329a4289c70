//! Testing utilities for Testlink workspace
//!
//! Shared fixtures: JUnit XML builders, annotated property sets and record
//! constructors.

#![allow(missing_docs)]

use quick_xml::escape::escape;
use std::fs;
use std::path::{Path, PathBuf};
use testlink_model::{Outcome, SourceLocation, TestIdentity, TestRecord};

/// Property names written by the annotation decorator (default key set)
pub const PARTIALLY_VERIFIES: &str = "partially_verifies";
pub const FULLY_VERIFIES: &str = "fully_verifies";
pub const TEST_TYPE: &str = "test_type";
pub const DERIVATION_TECHNIQUE: &str = "derivation_technique";

/// Encode requirement ids the way list-valued properties are serialized
pub fn list_value(ids: &[&str]) -> String {
    serde_json::to_string(ids).unwrap()
}

/// Complete annotation with all four required properties
pub fn annotation(
    partial: &[&str],
    full: &[&str],
    test_type: &str,
    technique: &str,
) -> Vec<(String, String)> {
    vec![
        (PARTIALLY_VERIFIES.to_string(), list_value(partial)),
        (FULLY_VERIFIES.to_string(), list_value(full)),
        (TEST_TYPE.to_string(), test_type.to_string()),
        (DERIVATION_TECHNIQUE.to_string(), technique.to_string()),
    ]
}

/// Record carrying the given properties, located at `tests/<name>.py:1`
pub fn record_with(name: &str, properties: &[(String, String)]) -> TestRecord {
    properties.iter().fold(
        TestRecord::new(TestIdentity::new("suite", name), Outcome::Passed, "out/test.xml")
            .with_location(Some(SourceLocation::new(format!("tests/{name}.py"), 1))),
        |record, (k, v)| record.with_property(k.clone(), v.clone()),
    )
}

/// Builder for one `<testcase>` element
#[derive(Debug, Clone, Default)]
pub struct TestCaseXml {
    name: String,
    classname: Option<String>,
    location: Option<(String, u32)>,
    properties: Vec<(String, String)>,
    marker: Option<(&'static str, String)>,
}

impl TestCaseXml {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn classname(mut self, classname: &str) -> Self {
        self.classname = Some(classname.to_string());
        self
    }

    pub fn at(mut self, file: &str, line: u32) -> Self {
        self.location = Some((file.to_string(), line));
        self
    }

    pub fn property(mut self, key: &str, value: &str) -> Self {
        self.properties.push((key.to_string(), value.to_string()));
        self
    }

    pub fn properties(mut self, properties: Vec<(String, String)>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn failed(mut self, message: &str) -> Self {
        self.marker = Some(("failure", message.to_string()));
        self
    }

    pub fn errored(mut self, message: &str) -> Self {
        self.marker = Some(("error", message.to_string()));
        self
    }

    pub fn skipped(mut self, message: &str) -> Self {
        self.marker = Some(("skipped", message.to_string()));
        self
    }

    pub fn to_xml(&self) -> String {
        let mut out = format!("    <testcase name=\"{}\"", escape(self.name.as_str()));
        if let Some(classname) = &self.classname {
            out.push_str(&format!(" classname=\"{}\"", escape(classname.as_str())));
        }
        if let Some((file, line)) = &self.location {
            out.push_str(&format!(" file=\"{}\" line=\"{line}\"", escape(file.as_str())));
        }
        out.push_str(">\n");
        if !self.properties.is_empty() {
            out.push_str("      <properties>\n");
            for (k, v) in &self.properties {
                out.push_str(&format!(
                    "        <property name=\"{}\" value=\"{}\"/>\n",
                    escape(k.as_str()),
                    escape(v.as_str())
                ));
            }
            out.push_str("      </properties>\n");
        }
        if let Some((tag, message)) = &self.marker {
            out.push_str(&format!("      <{tag} message=\"{}\"/>\n", escape(message.as_str())));
        }
        out.push_str("    </testcase>\n");
        out
    }
}

/// Builder for a JUnit XML result log
#[derive(Debug, Clone)]
pub struct JUnitLog {
    suite: String,
    cases: Vec<TestCaseXml>,
}

impl JUnitLog {
    pub fn new(suite: &str) -> Self {
        Self {
            suite: suite.to_string(),
            cases: Vec::new(),
        }
    }

    pub fn case(mut self, case: TestCaseXml) -> Self {
        self.cases.push(case);
        self
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuites>\n");
        out.push_str(&format!(
            "  <testsuite name=\"{}\" tests=\"{}\">\n",
            escape(self.suite.as_str()),
            self.cases.len()
        ));
        for case in &self.cases {
            out.push_str(&case.to_xml());
        }
        out.push_str("  </testsuite>\n</testsuites>\n");
        out
    }

    /// Write to `dir/rel`, creating parent directories
    pub fn write_to(&self, dir: &Path, rel: &str) -> PathBuf {
        write_file(dir, rel, &self.to_xml())
    }
}

/// Write raw content to `dir/rel`, creating parent directories
pub fn write_file(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Fresh temporary directory for on-disk logs
pub fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}
