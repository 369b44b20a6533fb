//! Nachshon
//!
//! A scripting language with Hebrew keywords, translated to Python.
//! The pipeline is three independent stages:
//!
//! ```text
//! source --tokenize--> tokens --parse--> Program --generate--> Python
//! ```
//!
//! Each stage fails with its own error type. [`compile`] runs all three.

pub mod backend;
pub mod feedback;
pub mod frontend;
pub mod runner;
pub mod utils;

pub use backend::Generator;
pub use frontend::ast::Program;
pub use frontend::token::{Keyword, Token, TokenKind};
pub use utils::{Error, GeneratorError, LexerError, ParserError, Result, Span};

use frontend::lexer::Lexer;
use frontend::parser::Parser;

/// File extension of Nachshon sources
pub const SOURCE_EXTENSION: &str = "נח";

/// Split source text into tokens, ending with `Eof`
pub fn tokenize(source: &str) -> std::result::Result<Vec<Token>, LexerError> {
    Lexer::new(source).tokenize()
}

/// Build the syntax tree, stopping at the first unexpected token
pub fn parse(tokens: Vec<Token>) -> std::result::Result<Program, ParserError> {
    Parser::new(tokens).parse_program()
}

/// Emit Python with the default options (builtin prelude, no header)
pub fn generate(program: &Program) -> std::result::Result<String, GeneratorError> {
    Generator::new().generate(program)
}

/// Translate source text to Python
pub fn compile(source: &str) -> Result<String> {
    let tokens = tokenize(source)?;
    let program = parse(tokens)?;
    Ok(generate(&program)?)
}
