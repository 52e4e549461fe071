//! ICSS Semantic Passes
//!
//! The two passes that run between parsing and code generation:
//!
//! ```text
//! Stylesheet → check() → Vec<Diagnostic>            (read-only)
//!            → evaluate() → reduced Stylesheet       (only on a clean check)
//! ```
//!
//! Both passes use the same block-structured scoping: the stylesheet, every
//! style rule, every if body and every else body opens one nested scope.
//! Inner assignments shadow outer ones and are discarded when the block ends.
//!
//! After `evaluate` succeeds, no variable reference, operation, if clause or
//! else clause remains anywhere in the tree.

pub mod checker;
pub mod diagnostic;
pub mod evaluator;
pub mod scope;
pub mod types;

pub use checker::check;
pub use diagnostic::{Diagnostic, DiagnosticKind, NodeTarget};
pub use evaluator::{evaluate, EvalError};
pub use scope::ScopeStack;
pub use types::ExpressionType;
