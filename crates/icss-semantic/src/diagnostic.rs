use icss_parser::ast::Span;
use std::fmt;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum DiagnosticKind {
    /// A variable was referenced where no assignment of it is in scope.
    UndefinedVariable,
    /// A color literal or color-typed variable was used in `+`, `-` or `*`.
    ColorInOperation,
    /// An operator was applied to a pairing its typing rule rejects.
    InvalidOperandTypes,
    /// A known property got a resolved value of the wrong type.
    InvalidPropertyValue,
    /// A property value contains an invalid operation or reference.
    UnresolvedPropertyValue,
    /// A variable value contains an invalid operation or reference.
    UnresolvedAssignment,
    /// An if condition does not have boolean type.
    NonBooleanCondition,
}

/// The kind of node a diagnostic is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum NodeTarget {
    Declaration,
    VariableAssignment,
    Expression,
    IfClause,
}

/// A checker finding, attached to the node that caused it.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
    pub target: NodeTarget,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        target: NodeTarget,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            target,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span, self.message)
    }
}
