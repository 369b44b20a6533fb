//! Error handling for the Nachshon pipeline
//!
//! Every stage has its own error type so a caller can tell which phase
//! failed. `Error` wraps all three for callers running the whole pipeline.

use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Raised by the lexer on malformed source text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Lexer error at line {line}, column {column}: {message}")]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl LexerError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self { message: message.into(), line, column }
    }
}

/// Raised by the parser on the first unexpected token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parser error at line {line}, column {column}: {message} (expected {expected}, found {found})")]
pub struct ParserError {
    pub message: String,
    pub expected: String,
    pub found: String,
    pub line: usize,
    pub column: usize,
}

impl ParserError {
    pub fn new(
        message: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            message: message.into(),
            expected: expected.into(),
            found: found.into(),
            line: span.line,
            column: span.column,
        }
    }
}

/// Raised by the generator when handed a tree the parser could never build
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Generator error: {message}")]
pub struct GeneratorError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl GeneratorError {
    pub fn at(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            line: Some(span.line),
            column: Some(span.column),
        }
    }
}

/// Compile error from any stage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

impl Error {
    /// Name of the pipeline stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Lexer(_) => "lexer",
            Self::Parser(_) => "parser",
            Self::Generator(_) => "generator",
        }
    }

    /// Human-readable message without the position prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Lexer(e) => &e.message,
            Self::Parser(e) => &e.message,
            Self::Generator(e) => &e.message,
        }
    }

    /// Get the (line, column) associated with this error
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Self::Lexer(e) => Some((e.line, e.column)),
            Self::Parser(e) => Some((e.line, e.column)),
            Self::Generator(e) => e.line.zip(e.column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_position() {
        let err: Error = LexerError::new("unterminated string literal", 3, 7).into();
        assert_eq!(err.stage(), "lexer");
        assert_eq!(err.position(), Some((3, 7)));
        assert_eq!(
            err.to_string(),
            "Lexer error at line 3, column 7: unterminated string literal"
        );

        let err: Error = ParserError::new("bad", "':'", "newline", Span::new(0, 1, 2, 4)).into();
        assert_eq!(err.stage(), "parser");
        assert_eq!(err.message(), "bad");
        assert_eq!(err.position(), Some((2, 4)));

        let err: Error = GeneratorError { message: "x".into(), line: None, column: None }.into();
        assert_eq!(err.position(), None);
    }
}
