//! Expression types and the typing rules shared by the checker.

use icss_parser::ast::{Literal, Operator};
use std::fmt;

/// The type of an expression as computed by the checker.
///
/// `Undefined` is the type of anything that could not be typed: a reference
/// to an unknown variable or an illegal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ExpressionType {
    Pixel,
    Percentage,
    Scalar,
    Color,
    Bool,
    Undefined,
}

impl ExpressionType {
    pub fn is_dimension(self) -> bool {
        matches!(self, ExpressionType::Pixel | ExpressionType::Percentage)
    }
}

impl From<&Literal> for ExpressionType {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Pixel(_) => ExpressionType::Pixel,
            Literal::Percentage(_) => ExpressionType::Percentage,
            Literal::Scalar(_) => ExpressionType::Scalar,
            Literal::Color(_) => ExpressionType::Color,
            Literal::Bool(_) => ExpressionType::Bool,
        }
    }
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpressionType::Pixel => "pixel",
            ExpressionType::Percentage => "percentage",
            ExpressionType::Scalar => "scalar",
            ExpressionType::Color => "color",
            ExpressionType::Bool => "boolean",
            ExpressionType::Undefined => "undefined",
        };
        write!(f, "{name}")
    }
}

const DIMENSION: &[ExpressionType] = &[ExpressionType::Pixel, ExpressionType::Percentage];
const COLOR: &[ExpressionType] = &[ExpressionType::Color];

/// Types accepted by a known property, or `None` for properties the
/// checker does not constrain.
pub fn expected_types(property: &str) -> Option<&'static [ExpressionType]> {
    match property {
        "width" | "height" | "padding" | "margin" => Some(DIMENSION),
        "color" | "background-color" | "border-color" => Some(COLOR),
        _ => None,
    }
}

/// Render an accepted-type list as `pixel or percentage`.
pub fn describe_types(types: &[ExpressionType]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Result type of `lhs op rhs`, or `None` when the pairing is illegal.
///
/// - `+` and `-` need two operands of the same pixel, percentage or scalar type.
/// - `*` needs at least one scalar; the result takes the other operand's type.
pub fn operation_type(
    op: Operator,
    lhs: ExpressionType,
    rhs: ExpressionType,
) -> Option<ExpressionType> {
    use ExpressionType::*;

    match op {
        Operator::Add | Operator::Subtract => match (lhs, rhs) {
            (Pixel, Pixel) | (Percentage, Percentage) | (Scalar, Scalar) => Some(lhs),
            _ => None,
        },
        Operator::Multiply => match (lhs, rhs) {
            (Scalar, Scalar) => Some(Scalar),
            (Scalar, other) | (other, Scalar) if other.is_dimension() => Some(other),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ExpressionType::*;

    #[test]
    fn test_add_same_types() {
        assert_eq!(operation_type(Operator::Add, Pixel, Pixel), Some(Pixel));
        assert_eq!(
            operation_type(Operator::Subtract, Percentage, Percentage),
            Some(Percentage)
        );
        assert_eq!(operation_type(Operator::Add, Scalar, Scalar), Some(Scalar));
    }

    #[test]
    fn test_add_mixed_types() {
        assert_eq!(operation_type(Operator::Add, Pixel, Percentage), None);
        assert_eq!(operation_type(Operator::Subtract, Pixel, Scalar), None);
        assert_eq!(operation_type(Operator::Add, Bool, Bool), None);
    }

    #[test]
    fn test_multiply_needs_a_scalar() {
        assert_eq!(operation_type(Operator::Multiply, Scalar, Scalar), Some(Scalar));
        assert_eq!(operation_type(Operator::Multiply, Pixel, Scalar), Some(Pixel));
        assert_eq!(
            operation_type(Operator::Multiply, Scalar, Percentage),
            Some(Percentage)
        );
        assert_eq!(operation_type(Operator::Multiply, Pixel, Pixel), None);
        assert_eq!(operation_type(Operator::Multiply, Pixel, Percentage), None);
        assert_eq!(operation_type(Operator::Multiply, Scalar, Bool), None);
    }

    #[test]
    fn test_property_table() {
        assert_eq!(expected_types("width"), Some(DIMENSION));
        assert_eq!(expected_types("border-color"), Some(COLOR));
        assert_eq!(expected_types("font-size"), None);
        assert_eq!(expected_types("Width"), None);
    }

    #[test]
    fn test_describe_types() {
        assert_eq!(describe_types(DIMENSION), "pixel or percentage");
        assert_eq!(describe_types(COLOR), "color");
    }
}
