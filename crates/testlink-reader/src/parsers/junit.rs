//! JUnit-style XML result parser
//!
//! Streams the document with quick-xml and builds one [`TestRecord`] per
//! `<testcase>`. Recognized shape:
//!
//! ```text
//! <testsuites>                       (optional root)
//!   <testsuite name="...">           (may nest)
//!     <testcase name classname file line>
//!       <properties>
//!         <property name="..." value="..."/>
//!       </properties>
//!       <failure message="..."/> | <error/> | <skipped/>
//!     </testcase>
//! ```
//!
//! Suite-level `<properties>` and unknown elements are ignored.

use crate::error::ReadError;
use crate::parsers::ResultLogParser;
use crate::text::clean_result_text;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::path::Path;
use testlink_model::{Outcome, Properties, SourceLocation, TestIdentity, TestRecord};

/// JUnit XML parser
#[derive(Debug, Clone, Copy, Default)]
pub struct JUnitXmlParser;

impl JUnitXmlParser {
    /// Create new JUnit XML parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ResultLogParser for JUnitXmlParser {
    fn parse(&self, content: &str, origin: &Path) -> Result<Vec<TestRecord>, ReadError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut doc = DocumentState::new(origin);
        loop {
            let event = reader.read_event().map_err(|e| {
                ReadError::malformed(
                    origin,
                    format!("XML error at byte {}: {e}", reader.buffer_position()),
                )
            })?;

            match event {
                Event::Start(e) => doc.open(&e)?,
                Event::Empty(e) => {
                    doc.open(&e)?;
                    doc.close()?;
                }
                Event::End(_) => doc.close()?,
                Event::Text(t) => {
                    let text = t
                        .unescape()
                        .map_err(|e| ReadError::malformed(origin, format!("bad text: {e}")))?;
                    doc.text(&text)?;
                }
                Event::CData(c) => doc.text(&String::from_utf8_lossy(&c.into_inner()))?,
                Event::Eof => break,
                _ => {}
            }
        }

        doc.finish()
    }

    fn name(&self) -> &'static str {
        "junit-xml"
    }

    fn extensions(&self) -> &[&str] {
        &["xml"]
    }
}

/// Element currently open in the document
#[derive(Debug)]
enum Frame {
    Suite(Option<String>),
    Case,
    Property {
        name: Option<String>,
        value: Option<String>,
        text: String,
    },
    Marker {
        outcome: Outcome,
        message: Option<String>,
        text: String,
    },
    Other,
}

/// Test case under construction
#[derive(Debug)]
struct CaseBuilder {
    identity: TestIdentity,
    location: Option<SourceLocation>,
    outcome: Option<(Outcome, Option<String>)>,
    properties: Properties,
}

impl CaseBuilder {
    /// Keep the most severe outcome marker seen
    fn mark(&mut self, outcome: Outcome, text: Option<String>) {
        let replace = self
            .outcome
            .as_ref()
            .map_or(true, |(current, _)| severity(outcome) > severity(*current));
        if replace {
            self.outcome = Some((outcome, text));
        }
    }

    fn build(self, origin: &Path) -> TestRecord {
        let (outcome, text) = self.outcome.unwrap_or((Outcome::Passed, None));
        TestRecord::new(self.identity, outcome, origin)
            .with_location(self.location)
            .with_result_text(text.map(|t| clean_result_text(&t)))
            .with_properties(self.properties)
    }
}

fn severity(outcome: Outcome) -> u8 {
    match outcome {
        Outcome::Passed => 0,
        Outcome::Skipped => 1,
        Outcome::Failed => 2,
        Outcome::Errored => 3,
    }
}

struct DocumentState<'a> {
    origin: &'a Path,
    stack: Vec<Frame>,
    case: Option<CaseBuilder>,
    records: Vec<TestRecord>,
    saw_root: bool,
}

impl<'a> DocumentState<'a> {
    fn new(origin: &'a Path) -> Self {
        Self {
            origin,
            stack: Vec::new(),
            case: None,
            records: Vec::new(),
            saw_root: false,
        }
    }

    fn malformed(&self, message: impl Into<String>) -> ReadError {
        ReadError::malformed(self.origin, message)
    }

    fn open(&mut self, element: &BytesStart<'_>) -> Result<(), ReadError> {
        let tag = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();

        if self.stack.is_empty() {
            if self.saw_root {
                return Err(self.malformed("multiple root elements"));
            }
            if tag != "testsuites" && tag != "testsuite" {
                return Err(self.malformed(format!("unexpected root element <{tag}>")));
            }
            self.saw_root = true;
        }

        let mut attrs = self.attributes(element)?;
        let frame = match tag.as_str() {
            "testsuite" | "testsuites" => Frame::Suite(attrs.remove("name")),
            "testcase" => {
                if self.case.is_some() {
                    return Err(self.malformed("nested <testcase>"));
                }
                self.case = Some(self.start_case(attrs)?);
                Frame::Case
            }
            "property" if self.case.is_some() => Frame::Property {
                name: attrs.remove("name"),
                value: attrs.remove("value"),
                text: String::new(),
            },
            "failure" | "error" | "skipped" if self.case.is_some() => Frame::Marker {
                outcome: match tag.as_str() {
                    "failure" => Outcome::Failed,
                    "error" => Outcome::Errored,
                    _ => Outcome::Skipped,
                },
                message: attrs.remove("message"),
                text: String::new(),
            },
            _ => Frame::Other,
        };
        self.stack.push(frame);
        Ok(())
    }

    fn start_case(&self, mut attrs: BTreeMap<String, String>) -> Result<CaseBuilder, ReadError> {
        let name = attrs
            .remove("name")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| self.malformed("<testcase> without name"))?;

        let suite = attrs
            .remove("classname")
            .filter(|c| !c.is_empty())
            .or_else(|| self.innermost_suite())
            .unwrap_or_default();

        let line = attrs.get("line").and_then(|l| l.trim().parse::<u32>().ok());
        let location = match (attrs.remove("file"), line) {
            (Some(file), Some(line)) if !file.is_empty() => Some(SourceLocation::new(file, line)),
            _ => {
                tracing::debug!("No usable location for test case {} in {}", name, self.origin.display());
                None
            }
        };

        Ok(CaseBuilder {
            identity: TestIdentity::new(suite, name),
            location,
            outcome: None,
            properties: Properties::new(),
        })
    }

    fn innermost_suite(&self) -> Option<String> {
        self.stack.iter().rev().find_map(|f| match f {
            Frame::Suite(Some(name)) if !name.is_empty() => Some(name.clone()),
            _ => None,
        })
    }

    fn close(&mut self) -> Result<(), ReadError> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| self.malformed("closing tag without opening tag"))?;

        match frame {
            Frame::Case => {
                if let Some(case) = self.case.take() {
                    self.records.push(case.build(self.origin));
                }
            }
            Frame::Property { name, value, text } => {
                let Some(name) = name else {
                    tracing::debug!("Ignoring unnamed property in {}", self.origin.display());
                    return Ok(());
                };
                if let Some(case) = self.case.as_mut() {
                    case.properties.insert(name, value.unwrap_or(text));
                }
            }
            Frame::Marker {
                outcome,
                message,
                text,
            } => {
                let detail = message.filter(|m| !m.trim().is_empty()).or(Some(text));
                if let Some(case) = self.case.as_mut() {
                    case.mark(outcome, detail);
                }
            }
            Frame::Suite(_) | Frame::Other => {}
        }
        Ok(())
    }

    fn text(&mut self, content: &str) -> Result<(), ReadError> {
        match self.stack.last_mut() {
            Some(Frame::Property { text, .. } | Frame::Marker { text, .. }) => text.push_str(content),
            Some(_) => {}
            None if self.saw_root => return Err(self.malformed("content after root element")),
            None => return Err(self.malformed("content before root element")),
        }
        Ok(())
    }

    fn attributes(&self, element: &BytesStart<'_>) -> Result<BTreeMap<String, String>, ReadError> {
        let mut out = BTreeMap::new();
        for attr in element.attributes() {
            let attr = attr.map_err(|e| self.malformed(format!("bad attribute: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| self.malformed(format!("bad attribute value: {e}")))?;
            out.insert(key, value.into_owned());
        }
        Ok(out)
    }

    fn finish(self) -> Result<Vec<TestRecord>, ReadError> {
        if !self.saw_root {
            return Err(self.malformed("no root element"));
        }
        if !self.stack.is_empty() {
            return Err(self.malformed("unexpected end of document"));
        }
        Ok(self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Vec<TestRecord>, ReadError> {
        JUnitXmlParser.parse(content, Path::new("out/test.xml"))
    }

    #[test]
    fn parses_case_with_properties() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <testsuites>
              <testsuite name="auth">
                <testcase name="test_login" classname="auth_tests" file="tests/auth.py" line="12">
                  <properties>
                    <property name="test_type" value="interface-test"/>
                    <property name="partially_verifies" value='["req_A"]'/>
                  </properties>
                </testcase>
              </testsuite>
            </testsuites>"#;

        let records = parse(xml).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.identity(), &TestIdentity::new("auth_tests", "test_login"));
        assert_eq!(record.location(), Some(&SourceLocation::new("tests/auth.py", 12)));
        assert_eq!(record.outcome(), Outcome::Passed);
        assert_eq!(record.property("test_type"), Some("interface-test"));
        assert_eq!(record.property("partially_verifies"), Some(r#"["req_A"]"#));
        assert_eq!(record.origin(), Path::new("out/test.xml"));
    }

    #[test]
    fn suite_name_used_without_classname() {
        let xml = r#"<testsuite name="outer"><testsuite name="inner"><testcase name="t"/></testsuite></testsuite>"#;
        let records = parse(xml).unwrap();
        assert_eq!(records[0].identity(), &TestIdentity::new("inner", "t"));
    }

    #[test]
    fn outcome_markers() {
        let xml = r#"<testsuite name="s">
              <testcase name="fails"><failure message="assert 1 == 2">trace</failure></testcase>
              <testcase name="errors"><error>crash</error></testcase>
              <testcase name="skips"><skipped message="not on CI"/></testcase>
              <testcase name="both"><skipped/><failure/></testcase>
              <testcase name="worst"><failure>assert</failure><error>crash</error></testcase>
              <testcase name="worst_first"><error>crash</error><failure>assert</failure></testcase>
            </testsuite>"#;

        let records = parse(xml).unwrap();
        let outcomes: Vec<_> = records.iter().map(TestRecord::outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                Outcome::Failed,
                Outcome::Errored,
                Outcome::Skipped,
                Outcome::Failed,
                Outcome::Errored,
                Outcome::Errored,
            ]
        );
        assert_eq!(records[0].result_text(), Some("assert 1 == 2"));
        assert_eq!(records[1].result_text(), Some("crash"));
        assert_eq!(records[2].result_text(), Some("not on CI"));
    }

    #[test]
    fn text_outside_root_is_malformed() {
        let trailing = r#"<testsuites><testsuite name="s"><testcase name="t"/></testsuite></testsuites> trailing junk"#;
        let Err(ReadError::MalformedLog { message, .. }) = parse(trailing) else {
            panic!("expected malformed log");
        };
        assert!(message.contains("after root"));

        let leading = r#"junk <testsuite name="s"><testcase name="t"/></testsuite>"#;
        assert!(matches!(parse(leading), Err(ReadError::MalformedLog { .. })));

        let padded = "\n  <testsuite name=\"s\"><testcase name=\"t\"/></testsuite>\n\n";
        assert_eq!(parse(padded).unwrap().len(), 1);
    }

    #[test]
    fn duplicate_property_last_wins() {
        let xml = r#"<testsuite name="s"><testcase name="t"><properties>
              <property name="test_type" value="unit"/>
              <property name="test_type" value="interface-test"/>
            </properties></testcase></testsuite>"#;

        let records = parse(xml).unwrap();
        assert_eq!(records[0].property("test_type"), Some("interface-test"));
    }

    #[test]
    fn property_value_from_text() {
        let xml = r#"<testsuite name="s"><testcase name="t"><properties>
              <property name="fully_verifies">["req_A", "req_B"]</property>
            </properties></testcase></testsuite>"#;

        let records = parse(xml).unwrap();
        assert_eq!(records[0].property("fully_verifies"), Some(r#"["req_A", "req_B"]"#));
    }

    #[test]
    fn suite_properties_are_ignored() {
        let xml = r#"<testsuite name="s">
              <properties><property name="test_type" value="x"/></properties>
              <testcase name="t"/>
            </testsuite>"#;

        let records = parse(xml).unwrap();
        assert!(records[0].properties().is_empty());
    }

    #[test]
    fn missing_or_bad_line_drops_location() {
        let xml = r#"<testsuite name="s">
              <testcase name="a" file="a.py"/>
              <testcase name="b" file="b.py" line="abc"/>
              <testcase name="c" line="3"/>
            </testsuite>"#;

        let records = parse(xml).unwrap();
        assert!(records.iter().all(|r| r.location().is_none()));
    }

    #[test]
    fn ansi_codes_removed_from_result_text() {
        let xml = "<testsuite name=\"s\"><testcase name=\"t\"><failure>\u{1b}[31mred\u{1b}[0m\nline</failure></testcase></testsuite>";
        let records = parse(xml).unwrap();
        assert_eq!(records[0].result_text(), Some("red line"));
    }

    #[test]
    fn truncated_document_is_malformed() {
        let xml = r#"<testsuites><testsuite name="s"><testcase name="t">"#;
        assert!(matches!(parse(xml), Err(ReadError::MalformedLog { .. })));
    }

    #[test]
    fn mismatched_tags_are_malformed() {
        let xml = r#"<testsuite name="s"><testcase name="t"></testsuite></testcase>"#;
        assert!(matches!(parse(xml), Err(ReadError::MalformedLog { .. })));
    }

    #[test]
    fn empty_document_is_malformed() {
        assert!(matches!(parse(""), Err(ReadError::MalformedLog { .. })));
    }

    #[test]
    fn foreign_root_is_malformed() {
        assert!(matches!(parse("<html></html>"), Err(ReadError::MalformedLog { .. })));
    }

    #[test]
    fn nameless_case_is_malformed() {
        let xml = r#"<testsuite name="s"><testcase classname="c"/></testsuite>"#;
        assert!(matches!(parse(xml), Err(ReadError::MalformedLog { .. })));
    }

    #[test]
    fn empty_suite_yields_no_records() {
        let records = parse(r#"<testsuites/>"#).unwrap();
        assert!(records.is_empty());
    }
}
