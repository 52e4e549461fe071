//! CSS code generator.
//!
//! Serializes a fully reduced stylesheet as plain CSS. Each style rule
//! becomes one block; nested rules are flattened into their own blocks,
//! emitted right after their parent's block with their selectors unchanged.

use icss_parser::ast::{Statement, Stylerule, Stylesheet};
use tracing::warn;

/// Generate CSS text from a reduced stylesheet.
///
/// Rules are separated by a blank line and the output ends with a single
/// newline. An empty stylesheet produces an empty string. Nodes that cannot
/// be rendered (anything the evaluator should have removed) are skipped.
pub fn generate(sheet: &Stylesheet) -> String {
    let mut blocks = Vec::new();

    for stmt in &sheet.statements {
        match stmt {
            Statement::Stylerule(rule) => generate_rule(rule, &mut blocks),
            Statement::VariableAssignment(_) => {}
            Statement::Declaration(decl) => {
                warn!(property = %decl.property, "Skipping declaration outside a style rule");
            }
            Statement::IfClause(_) => warn!("Skipping unevaluated if clause"),
        }
    }

    blocks.join("\n")
}

/// Render `rule` and, after it, every rule nested in its body.
fn generate_rule(rule: &Stylerule, blocks: &mut Vec<String>) {
    let selectors: Vec<String> = rule.selectors.iter().map(ToString::to_string).collect();

    let mut out = String::new();
    out.push_str(&selectors.join(", "));
    out.push_str(" {\n");

    let mut nested = Vec::new();
    for stmt in &rule.body {
        match stmt {
            Statement::Declaration(decl) => match decl.value.as_literal() {
                Some(value) => {
                    out.push_str(&format!("  {}: {value};\n", decl.property));
                }
                None => {
                    warn!(
                        property = %decl.property,
                        value = %decl.value,
                        "Skipping unreduced declaration"
                    );
                }
            },
            Statement::Stylerule(inner) => nested.push(inner),
            Statement::VariableAssignment(_) => {}
            Statement::IfClause(_) => warn!("Skipping unevaluated if clause"),
        }
    }

    out.push_str("}\n");
    blocks.push(out);

    for inner in nested {
        generate_rule(inner, blocks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icss_parser::ast::*;
    use pretty_assertions::assert_eq;

    fn decl(property: &str, value: Literal) -> Statement {
        Statement::Declaration(Declaration::new(property, Expression::literal(value)))
    }

    fn rule(selectors: Vec<Selector>, body: Vec<Statement>) -> Statement {
        Statement::Stylerule(Stylerule::new(selectors, body))
    }

    #[test]
    fn test_empty_stylesheet() {
        let sheet = Stylesheet::default();
        assert_eq!(generate(&sheet), "");
    }

    #[test]
    fn test_single_rule() {
        let sheet = Stylesheet::new(vec![rule(
            vec![Selector::Class("box".into())],
            vec![
                decl("width", Literal::Pixel(15)),
                decl("color", Literal::Color("#ff0000".into())),
            ],
        )]);
        assert_eq!(
            generate(&sheet),
            ".box {\n  width: 15px;\n  color: #ff0000;\n}\n"
        );
    }

    #[test]
    fn test_literal_rendering() {
        let sheet = Stylesheet::new(vec![rule(
            vec![Selector::Tag("p".into())],
            vec![
                decl("a", Literal::Scalar(3)),
                decl("b", Literal::Percentage(50)),
                decl("c", Literal::Bool(true)),
                decl("d", Literal::Bool(false)),
                decl("e", Literal::Pixel(-2)),
            ],
        )]);
        assert_eq!(
            generate(&sheet),
            "p {\n  a: 3;\n  b: 50%;\n  c: TRUE;\n  d: FALSE;\n  e: -2px;\n}\n"
        );
    }

    #[test]
    fn test_selector_list_and_blank_line_between_rules() {
        let sheet = Stylesheet::new(vec![
            rule(
                vec![
                    Selector::Tag("a".into()),
                    Selector::Class("menu".into()),
                    Selector::Id("Main".into()),
                ],
                vec![decl("width", Literal::Pixel(1))],
            ),
            rule(vec![Selector::Tag("p".into())], vec![]),
        ]);
        assert_eq!(
            generate(&sheet),
            "a, .menu, #Main {\n  width: 1px;\n}\n\np {\n}\n"
        );
    }

    #[test]
    fn test_variables_are_not_rendered() {
        let sheet = Stylesheet::new(vec![
            Statement::VariableAssignment(VariableAssignment::new(
                "W",
                Expression::literal(Literal::Pixel(1)),
            )),
            rule(
                vec![Selector::Tag("p".into())],
                vec![
                    Statement::VariableAssignment(VariableAssignment::new(
                        "H",
                        Expression::literal(Literal::Pixel(2)),
                    )),
                    decl("height", Literal::Pixel(2)),
                ],
            ),
        ]);
        assert_eq!(generate(&sheet), "p {\n  height: 2px;\n}\n");
    }

    #[test]
    fn test_nested_rules_are_flattened() {
        let sheet = Stylesheet::new(vec![
            rule(
                vec![Selector::Tag("div".into())],
                vec![
                    decl("width", Literal::Pixel(1)),
                    rule(
                        vec![Selector::Tag("span".into())],
                        vec![decl("height", Literal::Pixel(2))],
                    ),
                    decl("margin", Literal::Pixel(3)),
                ],
            ),
            rule(vec![Selector::Tag("p".into())], vec![]),
        ]);
        assert_eq!(
            generate(&sheet),
            "div {\n  width: 1px;\n  margin: 3px;\n}\n\nspan {\n  height: 2px;\n}\n\np {\n}\n"
        );
    }

    #[test]
    fn test_unreduced_nodes_are_skipped() {
        let sheet = Stylesheet::new(vec![rule(
            vec![Selector::Tag("p".into())],
            vec![
                Statement::Declaration(Declaration::new("width", Expression::variable("W"))),
                Statement::IfClause(IfClause::new(
                    Expression::literal(Literal::Bool(true)),
                    vec![decl("height", Literal::Pixel(1))],
                    None,
                )),
                decl("color", Literal::Color("#000000".into())),
            ],
        )]);
        assert_eq!(generate(&sheet), "p {\n  color: #000000;\n}\n");
    }

    #[test]
    fn test_generate_is_idempotent() {
        let sheet = Stylesheet::new(vec![rule(
            vec![Selector::Id("x".into())],
            vec![decl("width", Literal::Percentage(10))],
        )]);
        assert_eq!(generate(&sheet), generate(&sheet));
    }
}
