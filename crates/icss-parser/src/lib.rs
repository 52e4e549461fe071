//! ICSS Parser
//!
//! Parses a token stream into the stylesheet AST consumed by the semantic
//! passes and the code generator.
//!
//! ```text
//! source → Scanner::tokenize() → Parser → Stylesheet
//! ```

pub mod ast;
pub mod parser;

pub use ast::{Expression, Literal, Statement, Stylesheet};
pub use parser::Parser;

/// Parser error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<icss_lexer::LexerError> for ParseError {
    fn from(e: icss_lexer::LexerError) -> Self {
        ParseError {
            message: e.message,
            line: e.line,
            column: e.column,
        }
    }
}
