//! Structured Feedback Module
//!
//! Machine-readable diagnostics for editors and other tools:
//! - JSON error reports with the failing stage and position
//! - Check summaries (token and statement counts)

use serde::Serialize;

use crate::utils::Error;

// ==================== Structured Error Report ====================

/// A single compile error, positioned in its source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Pipeline stage that failed: "lexer", "parser" or "generator"
    pub stage: String,
    pub message: String,
    pub file: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
    /// Only parser errors know what they expected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<String>,
}

impl Diagnostic {
    /// Create from a compile error
    pub fn from_error(error: &Error, file_name: &str) -> Self {
        let (line, column) = error.position().unzip();
        let (expected, found) = match error {
            Error::Parser(e) => (Some(e.expected.clone()), Some(e.found.clone())),
            _ => (None, None),
        };

        Self {
            stage: error.stage().to_string(),
            message: error.message().to_string(),
            file: file_name.to_string(),
            line,
            column,
            expected,
            found,
        }
    }
}

// ==================== Check Feedback ====================

/// Result of checking one source file
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub source_file: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CheckStats>,
    pub errors: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckStats {
    pub tokens: usize,
    pub statements: usize,
}

impl CheckReport {
    pub fn success(source_file: impl Into<String>, stats: CheckStats) -> Self {
        Self { source_file: source_file.into(), success: true, stats: Some(stats), errors: vec![] }
    }

    pub fn failure(source_file: impl Into<String>, error: &Error) -> Self {
        let source_file = source_file.into();
        let errors = vec![Diagnostic::from_error(error, &source_file)];
        Self { source_file, success: false, stats: None, errors }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{LexerError, ParserError, Span};

    #[test]
    fn test_parser_diagnostic_carries_expectation() {
        let error: Error =
            ParserError::new("expected ':'", "':'", "newline", Span::new(4, 5, 1, 5)).into();
        let diagnostic = Diagnostic::from_error(&error, "תכנית.נח");
        assert_eq!(diagnostic.stage, "parser");
        assert_eq!(diagnostic.line, Some(1));
        assert_eq!(diagnostic.column, Some(5));
        assert_eq!(diagnostic.expected.as_deref(), Some("':'"));
    }

    #[test]
    fn test_failure_report_json() {
        let error: Error = LexerError::new("unterminated string literal", 2, 6).into();
        let report = CheckReport::failure("a.נח", &error);
        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"][0]["stage"], "lexer");
        assert_eq!(json["errors"][0]["line"], 2);
        assert!(json["errors"][0].get("expected").is_none());
        assert!(json.get("stats").is_none());
    }

    #[test]
    fn test_success_report_json() {
        let report = CheckReport::success("a.נח", CheckStats { tokens: 12, statements: 3 });
        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["stats"]["statements"], 3);
        assert_eq!(json["errors"].as_array().map(Vec::len), Some(0));
    }
}
