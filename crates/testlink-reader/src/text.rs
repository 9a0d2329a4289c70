//! Result text normalization

use once_cell::sync::Lazy;
use regex::Regex;

// SGR sequences only (colour/formatting), e.g. `\x1b[31m`, `\x1b[0m`
static ANSI_SGR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("ANSI pattern is valid"));

/// Clean runner output for display in a need
///
/// Strips terminal colour codes, decodes a second level of entity escaping
/// (runners often escape already-escaped output), folds newlines into spaces
/// and trims.
#[must_use]
pub fn clean_result_text(text: &str) -> String {
    let stripped = ANSI_SGR.replace_all(text, "");
    let decoded = quick_xml::escape::unescape(&stripped)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| stripped.into_owned());
    decoded
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ansi_codes() {
        assert_eq!(clean_result_text("\x1b[31mFAILED\x1b[0m"), "FAILED");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(clean_result_text("a &lt; b"), "a < b");
    }

    #[test]
    fn folds_newlines_and_trims() {
        assert_eq!(clean_result_text("  line one\nline two\r\n"), "line one line two");
    }

    #[test]
    fn keeps_bare_ampersand() {
        assert_eq!(clean_result_text("a & b"), "a & b");
    }
}
