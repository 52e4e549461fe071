//! ICSS Code Generator
//!
//! Renders a reduced ICSS stylesheet as plain CSS and drives the full
//! compile pipeline:
//!
//! ```text
//! source → Parser::parse() → check() → evaluate() → css::generate() → CSS text
//! ```
//!
//! Generation only runs on a stylesheet that checked clean. If the checker
//! reports anything, the pipeline stops and returns every diagnostic.

pub mod css;

use icss_parser::{ParseError, Parser, Stylesheet};
use icss_semantic::{Diagnostic, EvalError};
use tracing::{debug, instrument};

pub use css::generate;

/// Compilation error for any pipeline stage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The stylesheet is ill-typed. Holds every diagnostic, in tree order.
    #[error("{} error(s) found during type checking", .0.len())]
    Check(Vec<Diagnostic>),

    /// The evaluator disagreed with a clean check.
    #[error("Internal evaluation error: {0}")]
    Eval(#[from] EvalError),
}

/// Compile ICSS source to CSS text.
pub fn compile(source: &str) -> Result<String, CompileError> {
    let sheet = Parser::parse(source)?;
    compile_stylesheet(sheet)
}

/// Check, evaluate and generate an already-built stylesheet.
#[instrument(skip_all)]
pub fn compile_stylesheet(mut sheet: Stylesheet) -> Result<String, CompileError> {
    let diagnostics = icss_semantic::check(&sheet);
    if !diagnostics.is_empty() {
        return Err(CompileError::Check(diagnostics));
    }

    icss_semantic::evaluate(&mut sheet)?;
    let output = css::generate(&sheet);
    debug!(bytes = output.len(), "Generated CSS");
    Ok(output)
}
