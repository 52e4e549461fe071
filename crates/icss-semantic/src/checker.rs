//! Scope-aware type checker.
//!
//! Walks the stylesheet once, in source order, computing the type of every
//! expression and collecting diagnostics. The walk never stops early and
//! never changes the tree; callers get every problem in one list.

use crate::diagnostic::{Diagnostic, DiagnosticKind, NodeTarget};
use crate::scope::ScopeStack;
use crate::types::{describe_types, expected_types, operation_type, ExpressionType};
use icss_parser::ast::{
    Declaration, ExprKind, Expression, IfClause, Statement, Stylesheet, VariableAssignment,
};
use tracing::{debug, info, instrument};

/// Type-check a stylesheet, returning all diagnostics in walk order.
///
/// An empty result means the tree can be handed to [`crate::evaluate`].
#[instrument(skip_all, fields(statements = sheet.statements.len()))]
pub fn check(sheet: &Stylesheet) -> Vec<Diagnostic> {
    let mut checker = Checker::new();
    checker.check_stylesheet(sheet);
    info!(diagnostics = checker.diagnostics.len(), "Type check complete");
    checker.diagnostics
}

/// Per-call checking state. A fresh one is built for every [`check`] call,
/// so checking separate trees never shares scopes.
struct Checker {
    scopes: ScopeStack<ExpressionType>,
    diagnostics: Vec<Diagnostic>,
}

impl Checker {
    fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            diagnostics: Vec::new(),
        }
    }

    fn check_stylesheet(&mut self, sheet: &Stylesheet) {
        self.check_block(&sheet.statements);
    }

    /// Check `body` inside its own scope.
    fn check_block(&mut self, body: &[Statement]) {
        self.scopes.push();
        debug!(depth = self.scopes.depth(), "Entered scope");
        for stmt in body {
            self.check_statement(stmt);
        }
        self.scopes.pop();
    }

    fn check_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::VariableAssignment(assign) => self.check_assignment(assign),
            Statement::Declaration(decl) => self.check_declaration(decl),
            Statement::IfClause(clause) => self.check_if_clause(clause),
            Statement::Stylerule(rule) => self.check_block(&rule.body),
        }
    }

    fn check_assignment(&mut self, assign: &VariableAssignment) {
        let ty = self.infer(&assign.value);
        if ty == ExpressionType::Undefined {
            self.report(
                DiagnosticKind::UnresolvedAssignment,
                NodeTarget::VariableAssignment,
                assign.span,
                format!(
                    "Value of variable '{}' contains an invalid operation or reference",
                    assign.name
                ),
            );
        }

        // Bound even when undefined, so later uses don't repeat the error
        debug!(name = %assign.name, ty = %ty, "Bound variable type");
        self.scopes.declare(assign.name.clone(), ty);
    }

    fn check_declaration(&mut self, decl: &Declaration) {
        let ty = self.infer(&decl.value);

        if ty == ExpressionType::Undefined {
            self.report(
                DiagnosticKind::UnresolvedPropertyValue,
                NodeTarget::Declaration,
                decl.span,
                format!(
                    "Value of property '{}' contains an invalid operation or reference",
                    decl.property
                ),
            );
            return;
        }

        if let Some(expected) = expected_types(&decl.property) {
            if !expected.contains(&ty) {
                self.report(
                    DiagnosticKind::InvalidPropertyValue,
                    NodeTarget::Expression,
                    decl.value.span,
                    format!(
                        "Property '{}' expects {}, got {ty}",
                        decl.property,
                        describe_types(expected)
                    ),
                );
            }
        }
    }

    fn check_if_clause(&mut self, clause: &IfClause) {
        let ty = self.infer(&clause.condition);
        if ty != ExpressionType::Bool {
            self.report(
                DiagnosticKind::NonBooleanCondition,
                NodeTarget::Expression,
                clause.condition.span,
                format!("Condition of if clause must be a boolean, got {ty}"),
            );
        }

        self.check_block(&clause.body);
        if let Some(else_clause) = &clause.else_clause {
            self.check_block(&else_clause.body);
        }
    }

    /// Compute the type of `expr`, reporting problems at the innermost node
    /// that causes them. A color operand is always reported; otherwise an
    /// operand that is already `Undefined` makes the whole operation
    /// `Undefined` without a second report.
    fn infer(&mut self, expr: &Expression) -> ExpressionType {
        match &expr.kind {
            ExprKind::Literal(lit) => ExpressionType::from(lit),

            ExprKind::VariableReference(name) => match self.scopes.lookup(name) {
                Some(ty) => *ty,
                None => {
                    self.report(
                        DiagnosticKind::UndefinedVariable,
                        NodeTarget::Expression,
                        expr.span,
                        format!("Variable '{name}' used but not defined"),
                    );
                    ExpressionType::Undefined
                }
            },

            ExprKind::Operation { op, lhs, rhs } => {
                let lhs_ty = self.infer(lhs);
                let rhs_ty = self.infer(rhs);

                if lhs_ty == ExpressionType::Color || rhs_ty == ExpressionType::Color {
                    self.report(
                        DiagnosticKind::ColorInOperation,
                        NodeTarget::Expression,
                        expr.span,
                        "Cannot use colors in operations (+, -, *)",
                    );
                    return ExpressionType::Undefined;
                }

                if lhs_ty == ExpressionType::Undefined || rhs_ty == ExpressionType::Undefined {
                    return ExpressionType::Undefined;
                }

                match operation_type(*op, lhs_ty, rhs_ty) {
                    Some(ty) => ty,
                    None => {
                        self.report(
                            DiagnosticKind::InvalidOperandTypes,
                            NodeTarget::Expression,
                            expr.span,
                            format!("Operator '{op}' cannot be applied to {lhs_ty} and {rhs_ty}"),
                        );
                        ExpressionType::Undefined
                    }
                }
            }
        }
    }

    fn report(
        &mut self,
        kind: DiagnosticKind,
        target: NodeTarget,
        span: icss_parser::ast::Span,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic::new(kind, target, span, message);
        debug!(%diagnostic, "Reported diagnostic");
        self.diagnostics.push(diagnostic);
    }
}
