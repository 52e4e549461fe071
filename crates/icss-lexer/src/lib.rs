//! ICSS Lexer
//!
//! Tokenizes `.icss` source files into a stream of tokens.
//! Handles selectors (`p`, `.class`, `#id`), variable names, unit-suffixed
//! literals (`10px`, `50%`), hex colors, the `:=` assignment operator and
//! the `if`/`else` keywords. Whitespace and comments are discarded.
//!
//! # Example
//!
//! ```
//! use icss_lexer::Scanner;
//!
//! let tokens = Scanner::tokenize("").unwrap();
//! assert_eq!(tokens.len(), 1); // Just EOF
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Span, Token, TokenKind};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {message}")]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}
