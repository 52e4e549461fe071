//! Constant evaluator.
//!
//! Rewrites a checked stylesheet in place so that every expression is a
//! literal and every if/else is replaced by the statements of the branch
//! it takes. Must only run on a tree for which [`crate::check`] returned no
//! diagnostics; the errors below mean the two passes disagree.

use crate::scope::ScopeStack;
use icss_parser::ast::{
    splice, ExprKind, Expression, IfClause, Literal, Operator, Span, Statement, Stylesheet,
};
use tracing::{debug, info, instrument};

/// Internal failure of the evaluator. Unreachable after a clean check.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("{span}: variable '{name}' is not defined")]
    UndefinedVariable { name: String, span: Span },

    #[error("{span}: operator '{op}' is not supported for {lhs} and {rhs}")]
    UnsupportedOperands {
        op: Operator,
        lhs: Literal,
        rhs: Literal,
        span: Span,
    },

    #[error("{span}: if condition evaluated to {found}, expected TRUE or FALSE")]
    NonBooleanCondition { found: Literal, span: Span },
}

/// Reduce `sheet` to literals and remove all conditionals.
///
/// On error the tree is left partially rewritten and should be discarded.
#[instrument(skip_all, fields(statements = sheet.statements.len()))]
pub fn evaluate(sheet: &mut Stylesheet) -> Result<(), EvalError> {
    let mut evaluator = Evaluator::new();
    let statements = std::mem::take(&mut sheet.statements);
    sheet.statements = evaluator.evaluate_block(statements)?;
    info!(statements = sheet.statements.len(), "Evaluation complete");
    Ok(())
}

/// Per-call evaluation state, mirroring the checker's scoping.
struct Evaluator {
    scopes: ScopeStack<Literal>,
}

impl Evaluator {
    fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
        }
    }

    /// Evaluate `body` inside its own scope, returning the reduced body.
    fn evaluate_block(&mut self, body: Vec<Statement>) -> Result<Vec<Statement>, EvalError> {
        self.scopes.push();
        let result = self.evaluate_body(body);
        self.scopes.pop();
        result
    }

    /// Evaluate each statement of `body` exactly once, in order, in the
    /// current scope. An if clause is replaced by its already-evaluated
    /// branch, and the walk resumes after the inserted statements.
    fn evaluate_body(&mut self, mut body: Vec<Statement>) -> Result<Vec<Statement>, EvalError> {
        let mut index = 0;

        while index < body.len() {
            match self.evaluate_statement(&mut body[index])? {
                Some(branch) => {
                    let inserted = branch.len();
                    body = splice(body, index, branch);
                    index += inserted;
                }
                None => index += 1,
            }
        }

        Ok(body)
    }

    /// Reduce `stmt` in place. For an if clause, returns the statements
    /// that replace it instead.
    fn evaluate_statement(
        &mut self,
        stmt: &mut Statement,
    ) -> Result<Option<Vec<Statement>>, EvalError> {
        match stmt {
            Statement::VariableAssignment(assign) => {
                let value = self.reduce(&assign.value)?;
                debug!(name = %assign.name, value = %value, "Bound variable");
                self.scopes.declare(assign.name.clone(), value.clone());
                replace_with_literal(&mut assign.value, value);
            }
            Statement::Declaration(decl) => {
                let value = self.reduce(&decl.value)?;
                replace_with_literal(&mut decl.value, value);
            }
            Statement::Stylerule(rule) => {
                let body = std::mem::take(&mut rule.body);
                rule.body = self.evaluate_block(body)?;
            }
            Statement::IfClause(clause) => return self.evaluate_if_clause(clause).map(Some),
        }
        Ok(None)
    }

    /// Pick the branch of `clause` and evaluate it in its own scope,
    /// returning the statements that replace the clause.
    fn evaluate_if_clause(&mut self, clause: &mut IfClause) -> Result<Vec<Statement>, EvalError> {
        let taken = match self.reduce(&clause.condition)? {
            Literal::Bool(value) => value,
            found => {
                return Err(EvalError::NonBooleanCondition {
                    found,
                    span: clause.condition.span,
                })
            }
        };

        let branch = if taken {
            std::mem::take(&mut clause.body)
        } else {
            clause
                .else_clause
                .as_mut()
                .map(|else_clause| std::mem::take(&mut else_clause.body))
                .unwrap_or_default()
        };

        debug!(
            condition = %clause.condition,
            taken,
            statements = branch.len(),
            "Resolved if clause"
        );
        self.evaluate_block(branch)
    }

    /// Reduce `expr` to a single literal.
    fn reduce(&self, expr: &Expression) -> Result<Literal, EvalError> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(lit.clone()),
            ExprKind::VariableReference(name) => {
                self.scopes
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| EvalError::UndefinedVariable {
                        name: name.clone(),
                        span: expr.span,
                    })
            }
            ExprKind::Operation { op, lhs, rhs } => {
                let lhs = self.reduce(lhs)?;
                let rhs = self.reduce(rhs)?;
                apply(*op, lhs, rhs, expr.span)
            }
        }
    }
}

fn replace_with_literal(expr: &mut Expression, value: Literal) {
    *expr = Expression::new(ExprKind::Literal(value), expr.span);
}

/// Apply `op` to two literals. Integer arithmetic wraps at `i64` width.
fn apply(op: Operator, lhs: Literal, rhs: Literal, span: Span) -> Result<Literal, EvalError> {
    use Literal::*;

    let result = match (op, &lhs, &rhs) {
        (Operator::Add, Pixel(a), Pixel(b)) => Pixel(a.wrapping_add(*b)),
        (Operator::Add, Percentage(a), Percentage(b)) => Percentage(a.wrapping_add(*b)),
        (Operator::Add, Scalar(a), Scalar(b)) => Scalar(a.wrapping_add(*b)),

        (Operator::Subtract, Pixel(a), Pixel(b)) => Pixel(a.wrapping_sub(*b)),
        (Operator::Subtract, Percentage(a), Percentage(b)) => Percentage(a.wrapping_sub(*b)),
        (Operator::Subtract, Scalar(a), Scalar(b)) => Scalar(a.wrapping_sub(*b)),

        (Operator::Multiply, Scalar(a), Scalar(b)) => Scalar(a.wrapping_mul(*b)),
        (Operator::Multiply, Pixel(a), Scalar(b)) | (Operator::Multiply, Scalar(b), Pixel(a)) => {
            Pixel(a.wrapping_mul(*b))
        }
        (Operator::Multiply, Percentage(a), Scalar(b))
        | (Operator::Multiply, Scalar(b), Percentage(a)) => Percentage(a.wrapping_mul(*b)),

        _ => {
            return Err(EvalError::UnsupportedOperands {
                op,
                lhs: lhs.clone(),
                rhs: rhs.clone(),
                span,
            })
        }
    };

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use icss_parser::ast::*;
    use icss_parser::Parser;
    use pretty_assertions::assert_eq;

    fn px(n: i64) -> Expression {
        Expression::literal(Literal::Pixel(n))
    }

    fn width(value: Expression) -> Statement {
        Statement::Declaration(Declaration::new("width", value))
    }

    fn rule(body: Vec<Statement>) -> Statement {
        Statement::Stylerule(Stylerule::new(vec![Selector::Class("box".into())], body))
    }

    fn assign(name: &str, value: Expression) -> Statement {
        Statement::VariableAssignment(VariableAssignment::new(name, value))
    }

    /// Evaluate a single expression as the value of `width` in `.box`.
    fn reduce_one(value: Expression) -> Result<Literal, EvalError> {
        let mut sheet = Stylesheet::new(vec![rule(vec![width(value)])]);
        evaluate(&mut sheet)?;
        let rule = sheet.rules().next().unwrap();
        let literal = rule.declarations().next().unwrap().value.as_literal().unwrap().clone();
        Ok(literal)
    }

    /// Parse, evaluate, and return the reduced body of the first rule.
    fn evaluated_body(source: &str) -> Vec<Statement> {
        let mut sheet = Parser::parse(source).unwrap();
        evaluate(&mut sheet).unwrap();
        let body = sheet.rules().next().unwrap().body.clone();
        body
    }

    /// `(property, literal)` pairs of a rule body's declarations.
    fn values(body: &[Statement]) -> Vec<(String, Literal)> {
        body.iter()
            .filter_map(|stmt| match stmt {
                Statement::Declaration(decl) => Some((
                    decl.property.clone(),
                    decl.value.as_literal().unwrap().clone(),
                )),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    #[test]
    fn test_pixel_addition() {
        let expr = Expression::operation(Operator::Add, px(10), px(5));
        assert_eq!(reduce_one(expr), Ok(Literal::Pixel(15)));
    }

    #[test]
    fn test_scalar_times_percentage() {
        let expr = Expression::operation(
            Operator::Multiply,
            Expression::literal(Literal::Scalar(3)),
            Expression::literal(Literal::Percentage(10)),
        );
        assert_eq!(reduce_one(expr), Ok(Literal::Percentage(30)));
    }

    #[test]
    fn test_pixel_times_scalar() {
        let expr = Expression::operation(
            Operator::Multiply,
            px(4),
            Expression::literal(Literal::Scalar(2)),
        );
        assert_eq!(reduce_one(expr), Ok(Literal::Pixel(8)));
    }

    #[test]
    fn test_subtraction_can_go_negative() {
        let expr = Expression::operation(Operator::Subtract, px(5), px(8));
        assert_eq!(reduce_one(expr), Ok(Literal::Pixel(-3)));
    }

    #[test]
    fn test_precedence_from_source() {
        let body = evaluated_body("p { width: 2px + 3 * 4px - 1px; }");
        assert_eq!(values(&body), vec![("width".into(), Literal::Pixel(13))]);
    }

    #[test]
    fn test_overflow_wraps() {
        let expr = Expression::operation(
            Operator::Add,
            Expression::literal(Literal::Scalar(i64::MAX)),
            Expression::literal(Literal::Scalar(1)),
        );
        assert_eq!(reduce_one(expr), Ok(Literal::Scalar(i64::MIN)));
    }

    #[test]
    fn test_unsupported_operands() {
        let expr = Expression::operation(
            Operator::Add,
            px(10),
            Expression::literal(Literal::Percentage(5)),
        );
        assert_eq!(
            reduce_one(expr),
            Err(EvalError::UnsupportedOperands {
                op: Operator::Add,
                lhs: Literal::Pixel(10),
                rhs: Literal::Percentage(5),
                span: Span::dummy(),
            })
        );
    }

    #[test]
    fn test_undefined_variable() {
        let err = reduce_one(Expression::variable("Nope")).unwrap_err();
        assert_eq!(
            err,
            EvalError::UndefinedVariable {
                name: "Nope".into(),
                span: Span::dummy(),
            }
        );
        assert_eq!(err.to_string(), "<unknown>: variable 'Nope' is not defined");
    }

    // =========================================================================
    // Variables and scoping
    // =========================================================================

    #[test]
    fn test_assignment_reduced_in_place() {
        let mut sheet = Parser::parse("W := 10px + 5px; Half := 50% * 1;").unwrap();
        evaluate(&mut sheet).unwrap();
        let values: Vec<_> = sheet
            .statements
            .iter()
            .map(|stmt| match stmt {
                Statement::VariableAssignment(a) => a.value.as_literal().unwrap().clone(),
                other => panic!("Expected VariableAssignment, got {other:?}"),
            })
            .collect();
        assert_eq!(values, vec![Literal::Pixel(15), Literal::Percentage(50)]);
    }

    #[test]
    fn test_shadowing() {
        let mut sheet = Parser::parse(
            "W := 1px; p { W := 2px; width: W; } a { width: W; }",
        )
        .unwrap();
        evaluate(&mut sheet).unwrap();
        let widths: Vec<_> = sheet.rules().map(|r| values(&r.body)).collect();
        assert_eq!(
            widths,
            vec![
                vec![("width".into(), Literal::Pixel(2))],
                vec![("width".into(), Literal::Pixel(1))],
            ]
        );
    }

    #[test]
    fn test_variable_chain() {
        let body = evaluated_body("A := 2; B := A * 5px; p { width: B + 1px; }");
        assert_eq!(values(&body), vec![("width".into(), Literal::Pixel(11))]);
    }

    #[test]
    fn test_nested_rule_uses_parent_binding() {
        let mut sheet = Parser::parse("div { W := 3px; span { width: W; } }").unwrap();
        evaluate(&mut sheet).unwrap();
        let outer = sheet.rules().next().unwrap();
        match &outer.body[1] {
            Statement::Stylerule(inner) => {
                assert_eq!(values(&inner.body), vec![("width".into(), Literal::Pixel(3))]);
            }
            other => panic!("Expected nested Stylerule, got {other:?}"),
        }
    }

    // =========================================================================
    // Conditionals
    // =========================================================================

    fn conditional(condition: bool) -> Vec<Statement> {
        vec![Statement::IfClause(IfClause::new(
            Expression::literal(Literal::Bool(condition)),
            vec![width(px(10))],
            Some(ElseClause::new(vec![width(px(20))])),
        ))]
    }

    #[test]
    fn test_true_branch_replaces_if() {
        let mut sheet = Stylesheet::new(vec![rule(conditional(true))]);
        evaluate(&mut sheet).unwrap();
        assert_eq!(sheet.statements, vec![rule(vec![width(px(10))])]);
    }

    #[test]
    fn test_false_branch_takes_else() {
        let mut sheet = Stylesheet::new(vec![rule(conditional(false))]);
        evaluate(&mut sheet).unwrap();
        assert_eq!(sheet.statements, vec![rule(vec![width(px(20))])]);
    }

    #[test]
    fn test_false_without_else_vanishes() {
        let body = evaluated_body("p { height: 1px; if [FALSE] { width: 1px; } color: #000000; }");
        assert_eq!(
            values(&body),
            vec![
                ("height".into(), Literal::Pixel(1)),
                ("color".into(), Literal::Color("#000000".into())),
            ]
        );
    }

    #[test]
    fn test_splice_preserves_order() {
        let body = evaluated_body(
            "p { a: 1px; if [TRUE] { b: 2px; c: 3px; } d: 4px; if [TRUE] { e: 5px; } f: 6px; }",
        );
        let props: Vec<_> = values(&body).into_iter().map(|(p, _)| p).collect();
        assert_eq!(props, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_condition_from_variable() {
        let body = evaluated_body(
            "Wide := FALSE; p { if [Wide] { width: 100%; } else { width: 50%; } }",
        );
        assert_eq!(values(&body), vec![("width".into(), Literal::Percentage(50))]);
    }

    #[test]
    fn test_nested_conditionals() {
        let body = evaluated_body(
            "p { if [TRUE] { if [FALSE] { width: 1px; } else { width: 2px; } height: 3px; } }",
        );
        assert_eq!(
            values(&body),
            vec![
                ("width".into(), Literal::Pixel(2)),
                ("height".into(), Literal::Pixel(3)),
            ]
        );
    }

    #[test]
    fn test_branch_binding_visible_inside_branch() {
        let body = evaluated_body("p { if [TRUE] { W := 7px; width: W; } }");
        assert_eq!(values(&body), vec![("width".into(), Literal::Pixel(7))]);
    }

    #[test]
    fn test_branch_binding_does_not_leak() {
        let mut sheet = Stylesheet::new(vec![rule(vec![
            Statement::IfClause(IfClause::new(
                Expression::literal(Literal::Bool(true)),
                vec![assign("W", px(7))],
                None,
            )),
            width(Expression::variable("W")),
        ])]);
        let err = evaluate(&mut sheet).unwrap_err();
        assert!(matches!(err, EvalError::UndefinedVariable { ref name, .. } if name == "W"));
    }

    #[test]
    fn test_branch_shadows_rule_binding() {
        let body = evaluated_body(
            "p { W := 1px; if [TRUE] { W := 9px; height: W; } width: W; }",
        );
        assert_eq!(
            values(&body),
            vec![
                ("height".into(), Literal::Pixel(9)),
                ("width".into(), Literal::Pixel(1)),
            ]
        );
    }

    #[test]
    fn test_non_boolean_condition() {
        let mut sheet = Stylesheet::new(vec![rule(vec![Statement::IfClause(IfClause::new(
            px(1),
            vec![width(px(10))],
            None,
        ))])]);
        assert_eq!(
            evaluate(&mut sheet),
            Err(EvalError::NonBooleanCondition {
                found: Literal::Pixel(1),
                span: Span::dummy(),
            })
        );
    }

    #[test]
    fn test_top_level_if_is_resolved() {
        let mut sheet = Stylesheet::new(vec![Statement::IfClause(IfClause::new(
            Expression::literal(Literal::Bool(true)),
            vec![assign("W", px(1))],
            None,
        ))]);
        evaluate(&mut sheet).unwrap();
        assert_eq!(sheet.statements, vec![assign("W", px(1))]);
    }

    // =========================================================================
    // Post-evaluation shape
    // =========================================================================

    fn assert_reduced(body: &[Statement]) {
        for stmt in body {
            match stmt {
                Statement::IfClause(_) => panic!("IfClause survived evaluation"),
                Statement::Declaration(decl) => assert!(decl.value.is_literal()),
                Statement::VariableAssignment(a) => assert!(a.value.is_literal()),
                Statement::Stylerule(rule) => assert_reduced(&rule.body),
            }
        }
    }

    #[test]
    fn test_no_control_flow_survives() {
        let mut sheet = Parser::parse(
            "Base := 4px; Big := TRUE;\n\
             .card { padding: Base * 2; if [Big] { margin: Base + 1px; Inner := 3; \
             span { width: Base * Inner; } } else { margin: 0px; } }",
        )
        .unwrap();
        assert!(crate::check(&sheet).is_empty());
        evaluate(&mut sheet).unwrap();
        assert_reduced(&sheet.statements);
    }

    #[test]
    fn test_evaluator_is_reentrant() {
        let mut first = Parser::parse("W := 1px; p { width: W; }").unwrap();
        let mut second = Parser::parse("p { width: W; }").unwrap();
        evaluate(&mut first).unwrap();
        // Bindings from the first tree must not be visible in the second
        assert!(evaluate(&mut second).is_err());
    }
}
