//! Abstract Syntax Tree for ICSS.
//!
//! One rooted, ordered tree: a `Stylesheet` owns its statements, block
//! statements own their bodies, and expressions own their operands. Nodes
//! are never shared between parents. Variable references hold a name only
//! and are resolved by scope lookup in later passes.
//!
//! Every node that can be the target of a diagnostic carries a `Span`. The
//! passes treat spans as opaque; trees built by hand use `Span::dummy()`.

use std::fmt;

pub use icss_lexer::Span;

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// A complete ICSS stylesheet (the tree root).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    pub statements: Vec<Statement>,
}

impl Stylesheet {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Top-level style rules, in source order.
    pub fn rules(&self) -> impl Iterator<Item = &Stylerule> {
        self.statements.iter().filter_map(|stmt| match stmt {
            Statement::Stylerule(rule) => Some(rule),
            _ => None,
        })
    }
}

/// Any statement that can appear in a stylesheet or block body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `Name := expression;`
    VariableAssignment(VariableAssignment),

    /// `property: expression;`
    Declaration(Declaration),

    /// `if [condition] { ... } else { ... }`
    IfClause(IfClause),

    /// `selector, selector { ... }`
    Stylerule(Stylerule),
}

/// A style rule: selectors followed by a body.
#[derive(Debug, Clone, PartialEq)]
pub struct Stylerule {
    pub selectors: Vec<Selector>,
    pub body: Vec<Statement>,
    pub span: Span,
}

impl Stylerule {
    pub fn new(selectors: Vec<Selector>, body: Vec<Statement>) -> Self {
        Self {
            selectors,
            body,
            span: Span::dummy(),
        }
    }

    /// Declarations directly in this rule's body, in source order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.body.iter().filter_map(|stmt| match stmt {
            Statement::Declaration(decl) => Some(decl),
            _ => None,
        })
    }
}

/// A selector. Names are stored exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `p`, `body`
    Tag(String),
    /// `.menu` (stored without the dot)
    Class(String),
    /// `#header` (stored without the hash)
    Id(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Tag(name) => write!(f, "{name}"),
            Selector::Class(name) => write!(f, ".{name}"),
            Selector::Id(name) => write!(f, "#{name}"),
        }
    }
}

/// `property: value;`
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: Expression,
    pub span: Span,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: Expression) -> Self {
        Self {
            property: property.into(),
            value,
            span: Span::dummy(),
        }
    }
}

/// `Name := value;`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableAssignment {
    pub name: String,
    pub value: Expression,
    pub span: Span,
}

impl VariableAssignment {
    pub fn new(name: impl Into<String>, value: Expression) -> Self {
        Self {
            name: name.into(),
            value,
            span: Span::dummy(),
        }
    }
}

/// `if [condition] { body }` with an optional `else { body }`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfClause {
    pub condition: Expression,
    pub body: Vec<Statement>,
    pub else_clause: Option<ElseClause>,
    pub span: Span,
}

impl IfClause {
    pub fn new(
        condition: Expression,
        body: Vec<Statement>,
        else_clause: Option<ElseClause>,
    ) -> Self {
        Self {
            condition,
            body,
            else_clause,
            span: Span::dummy(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseClause {
    pub body: Vec<Statement>,
    pub span: Span,
}

impl ElseClause {
    pub fn new(body: Vec<Statement>) -> Self {
        Self {
            body,
            span: Span::dummy(),
        }
    }
}

/// Replace the statement at `index` with `replacement`, keeping the order of
/// both the surrounding statements and the inserted ones.
///
/// Builds a new vector (prefix + replacement + suffix) instead of shifting
/// elements of a vector that may be under iteration.
///
/// # Panics
///
/// Panics if `index` is out of bounds.
pub fn splice(
    body: Vec<Statement>,
    index: usize,
    replacement: Vec<Statement>,
) -> Vec<Statement> {
    assert!(index < body.len(), "splice index {index} out of bounds");

    let mut out = Vec::with_capacity(body.len() - 1 + replacement.len());
    let mut rest = body.into_iter();
    out.extend(rest.by_ref().take(index));
    rest.next(); // the replaced statement
    out.extend(replacement);
    out.extend(rest);
    out
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// A complete expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `10px`, `50%`, `3`, `#ff0000`, `TRUE`
    Literal(Literal),

    /// `MainColor`
    VariableReference(String),

    /// `lhs + rhs`, `lhs - rhs`, `lhs * rhs`
    Operation {
        op: Operator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn literal(literal: Literal) -> Self {
        Self::new(ExprKind::Literal(literal), Span::dummy())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(ExprKind::VariableReference(name.into()), Span::dummy())
    }

    pub fn operation(op: Operator, lhs: Expression, rhs: Expression) -> Self {
        let span = lhs.span.to(rhs.span);
        Self::new(
            ExprKind::Operation {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ExprKind::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ExprKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{lit}"),
            ExprKind::VariableReference(name) => write!(f, "{name}"),
            ExprKind::Operation { op, lhs, rhs } => write!(f, "{lhs} {op} {rhs}"),
        }
    }
}

/// A fully reduced value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Pixel(i64),
    Percentage(i64),
    Scalar(i64),
    /// Stored with the leading `#`, exactly as written.
    Color(String),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Pixel(n) => write!(f, "{n}px"),
            Literal::Percentage(n) => write!(f, "{n}%"),
            Literal::Scalar(n) => write!(f, "{n}"),
            Literal::Color(hex) => write!(f, "{hex}"),
            Literal::Bool(true) => write!(f, "TRUE"),
            Literal::Bool(false) => write!(f, "FALSE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
        };
        write!(f, "{symbol}")
    }
}
