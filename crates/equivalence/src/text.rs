//! Comparison of raw field text
//!
//! Fields such as dashboards or scripts are stored as text. Declared and
//! observed text often differ only in encoding artifacts: key order and
//! whitespace for JSON, line endings and trailing blank lines for scripts.
//!
//! JSON text carries no distinction between integers and floats, so
//! numbers decoded from text always compare by value (`4 == 4.0 == 4e0`).
//!
//! Two empty texts are never equal here. An empty field means "not known
//! yet", and two unknowns must not hide a pending change.

use crate::compare::{Comparator, NumberMode, Options};
use crate::error::Result;
use crate::value::from_json_str;

/// Signature of a diff-suppression predicate: `(key, old, new)`
pub type SuppressFn = fn(&str, &str, &str) -> bool;

impl Comparator {
    /// Decode both texts as JSON and compare the compacted documents.
    ///
    /// Ignored keys and list matching follow this comparator's options;
    /// numbers always compare as `f64`.
    pub fn try_equal_text(&self, a: &str, b: &str) -> Result<bool> {
        if a.is_empty() && b.is_empty() {
            return Ok(false);
        }
        let a = from_json_str(a)?;
        let b = from_json_str(b)?;
        Ok(self.for_text().equivalent(&a, &b))
    }

    /// Like [`try_equal_text`](Self::try_equal_text), treating decode
    /// failures as "not equal".
    pub fn equal_text(&self, a: &str, b: &str) -> bool {
        match self.try_equal_text(a, b) {
            Ok(equal) => equal,
            Err(e) => {
                log::debug!("cannot compare as JSON: {e}");
                false
            }
        }
    }

    fn for_text(&self) -> Self {
        Self::new(Options {
            numbers: NumberMode::Unified,
            ..self.options().clone()
        })
    }
}

/// JSON text equivalence with the default comparator
pub fn try_equal_text(a: &str, b: &str) -> Result<bool> {
    Comparator::default().try_equal_text(a, b)
}

/// JSON text equivalence with the default comparator; `false` when either
/// side is not JSON
pub fn equal_text(a: &str, b: &str) -> bool {
    Comparator::default().equal_text(a, b)
}

/// Compare free text line by line.
///
/// Line endings are unified, the whole text and every line are trimmed,
/// and the remaining lines must match one for one.
pub fn equal_line_by_line(a: &str, b: &str) -> bool {
    if a.is_empty() && b.is_empty() {
        return false;
    }
    let a = unify_line_endings(a);
    let b = unify_line_endings(b);

    let lines_a: Vec<&str> = a.trim().split('\n').map(str::trim).collect();
    let lines_b: Vec<&str> = b.trim().split('\n').map(str::trim).collect();
    lines_a == lines_b
}

fn unify_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Suppress a diff when old and new text are equal line by line
pub fn suppress_lines(_key: &str, old: &str, new: &str) -> bool {
    equal_line_by_line(old, new)
}

/// Suppress a diff when old and new text are equivalent JSON, or failing
/// that, equal line by line
pub fn suppress_json_or_lines(_key: &str, old: &str, new: &str) -> bool {
    equal_text(old, new) || equal_line_by_line(old, new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_equal_text_whitespace_and_order() {
        assert!(equal_text(r#"{"a": 1, "b": [1, 2]}"#, "{\n  \"b\": [2, 1],\n  \"a\": 1\n}"));
    }

    #[test]
    fn test_equal_text_compacts() {
        assert!(equal_text(r#"{"a": 1, "b": null, "c": {}}"#, r#"{"a": 1}"#));
    }

    #[test]
    fn test_equal_text_ignores_metric_expressions() {
        assert!(equal_text(
            r#"{"name": "t", "metricExpressions": ["resolution=null&(x)"]}"#,
            r#"{"name": "t", "metricExpressions": ["resolution=Inf&(x)"]}"#
        ));
    }

    #[test]
    fn test_equal_text_difference() {
        assert!(!equal_text(r#"{"a": 1}"#, r#"{"a": 2}"#));
    }

    #[test]
    fn test_empty_texts_not_equal() {
        assert!(!equal_text("", ""));
        assert!(!try_equal_text("", "").unwrap());
        assert!(!equal_line_by_line("", ""));
    }

    #[test]
    fn test_decode_error() {
        assert!(!equal_text("{", "{"));
        assert!(matches!(try_equal_text("{", "{}"), Err(Error::Decode(_))));
        assert!(matches!(try_equal_text("", "{}"), Err(Error::Decode(_))));
    }

    #[test]
    fn test_equal_text_uses_comparator_options() {
        let ignoring_id = Comparator::new(Options::ignoring(["id"]));
        assert!(!equal_text(r#"{"id": 1, "n": "x"}"#, r#"{"id": 2, "n": "x"}"#));
        assert!(ignoring_id.equal_text(r#"{"id": 1, "n": "x"}"#, r#"{"id": 2, "n": "x"}"#));
    }

    #[test]
    fn test_equal_text_numbers_by_value() {
        assert!(equal_text(r#"{"n": 4}"#, r#"{"n": 4.0}"#));
        assert!(equal_text("1000", "1e3"));
        assert!(equal_text(r#"[1, 2.5]"#, r#"[2.5e0, 1.0]"#));
        assert!(!equal_text(r#"{"n": 4}"#, r#"{"n": 4.5}"#));
        assert!(suppress_json_or_lines("config", r#"{"n": 4}"#, r#"{"n": 4.0}"#));

        // Decoded values keep the strict default
        let a = from_json_str(r#"{"n": 4}"#).unwrap();
        let b = from_json_str(r#"{"n": 4.0}"#).unwrap();
        assert!(!Comparator::default().equal(&a, &b));
    }

    #[test]
    fn test_line_endings() {
        assert!(equal_line_by_line("a\r\nb\r\n", "a\nb\n"));
        assert!(equal_line_by_line("a\rb", "a\nb"));
    }

    #[test]
    fn test_line_count_mismatch() {
        assert!(!equal_line_by_line("a\nb", "a\nb\nc"));
    }

    #[test]
    fn test_lines_trimmed() {
        assert!(equal_line_by_line("  a  \n\tb\n\n\n", "a\nb"));
        assert!(!equal_line_by_line("a\n\nb", "a\nb"));
        assert!(!equal_line_by_line("a\nb", "b\na"));
    }

    #[test]
    fn test_suppress_json_or_lines() {
        assert!(suppress_json_or_lines("config", r#"{"a":1}"#, r#"{ "a": 1 }"#));
        assert!(suppress_json_or_lines("script", "echo hi\r\n", "echo hi"));
        assert!(!suppress_json_or_lines("script", "echo hi", "echo bye"));
        assert!(!suppress_json_or_lines("script", "", ""));
    }

    #[test]
    fn test_suppress_lines() {
        let suppress: SuppressFn = suppress_lines;
        assert!(suppress("cert", "-----BEGIN-----\r\nabc\r\n", "-----BEGIN-----\nabc"));
        assert!(!suppress("cert", "abc", "abd"));
    }
}
