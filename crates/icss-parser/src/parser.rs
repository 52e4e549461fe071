//! Stylesheet parser for ICSS.
//!
//! Parses a stream of source-level tokens (from `icss-lexer`) into a
//! `Stylesheet` AST using recursive descent. Expressions use two precedence
//! levels: `*` binds tighter than `+` and `-`, and both are left associative.

use crate::ast::{
    Declaration, ElseClause, ExprKind, Expression, IfClause, Literal, Operator, Selector,
    Statement, Stylerule, Stylesheet, VariableAssignment,
};
use crate::ParseError;
use icss_lexer::{Span, Token, TokenKind};

/// Upper bound on the operators in a single expression.
pub const MAX_OPERATORS: usize = 256;

/// ICSS stylesheet parser.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse source code into a stylesheet AST.
    pub fn parse(source: &str) -> Result<Stylesheet, ParseError> {
        let tokens = icss_lexer::Scanner::tokenize(source)?;

        let mut parser = Parser::new(tokens);
        parser.parse_stylesheet()
    }

    /// Parse a full stylesheet.
    fn parse_stylesheet(&mut self) -> Result<Stylesheet, ParseError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            match &self.peek().kind {
                TokenKind::CapitalIdent(_) => {
                    statements.push(self.parse_variable_assignment()?);
                }
                kind if starts_selector(kind) => {
                    statements.push(self.parse_stylerule()?);
                }
                other => {
                    return Err(self.error(format!(
                        "Expected variable assignment or style rule, got {}",
                        other.describe()
                    )));
                }
            }
        }

        Ok(Stylesheet { statements })
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parse `Name := expression;`
    fn parse_variable_assignment(&mut self) -> Result<Statement, ParseError> {
        let span = self.peek().span;
        let name = match &self.peek().kind {
            TokenKind::CapitalIdent(name) => name.clone(),
            other => {
                return Err(self.error(format!(
                    "Expected variable name, got {}",
                    other.describe()
                )))
            }
        };
        self.advance();

        self.expect(TokenKind::Assign, &format!("after variable '{name}'"))?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "after variable assignment")?;

        Ok(Statement::VariableAssignment(VariableAssignment {
            name,
            value,
            span,
        }))
    }

    /// Parse a style rule:
    /// ```text
    /// p, .menu {
    ///   width: 10px;
    /// }
    /// ```
    fn parse_stylerule(&mut self) -> Result<Statement, ParseError> {
        let span = self.peek().span;
        let mut selectors = vec![self.parse_selector()?];

        while self.peek().kind == TokenKind::Comma {
            self.advance();
            selectors.push(self.parse_selector()?);
        }

        self.expect(TokenKind::LBrace, "after selectors")?;
        let body = self.parse_body()?;
        self.expect(TokenKind::RBrace, "to close style rule")?;

        Ok(Statement::Stylerule(Stylerule {
            selectors,
            body,
            span,
        }))
    }

    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let selector = match &self.peek().kind {
            TokenKind::LowerIdent(name) => Selector::Tag(name.clone()),
            TokenKind::ClassIdent(name) => Selector::Class(name.clone()),
            TokenKind::IdIdent(name) => Selector::Id(name.clone()),
            // `#abcdef` lexes as a color but is a valid id in selector position
            TokenKind::Color(hex) => Selector::Id(hex.trim_start_matches('#').to_string()),
            other => {
                return Err(self.error(format!(
                    "Expected selector, got {}",
                    other.describe()
                )))
            }
        };
        self.advance();
        Ok(selector)
    }

    /// Parse statements until the closing `}` (not consumed).
    fn parse_body(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut body = Vec::new();

        loop {
            match &self.peek().kind {
                TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::CapitalIdent(_) => body.push(self.parse_variable_assignment()?),
                TokenKind::If => body.push(self.parse_if_clause()?),
                TokenKind::LowerIdent(_) if self.peek_next_is(&TokenKind::Colon) => {
                    body.push(self.parse_declaration()?);
                }
                kind if starts_selector(kind) => body.push(self.parse_stylerule()?),
                other => {
                    return Err(self.error(format!(
                        "Expected declaration, variable assignment or if clause, got {}",
                        other.describe()
                    )));
                }
            }
        }

        Ok(body)
    }

    /// Parse `property: expression;`
    fn parse_declaration(&mut self) -> Result<Statement, ParseError> {
        let span = self.peek().span;
        let property = self.expect_lower_ident()?;

        self.expect(TokenKind::Colon, &format!("after property '{property}'"))?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semicolon, "after declaration")?;

        Ok(Statement::Declaration(Declaration {
            property,
            value,
            span,
        }))
    }

    /// Parse:
    /// ```text
    /// if [Condition] { ... } else { ... }
    /// ```
    fn parse_if_clause(&mut self) -> Result<Statement, ParseError> {
        let span = self.peek().span;
        self.advance(); // consume `if`

        self.expect(TokenKind::LBracket, "after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RBracket, "after condition")?;

        self.expect(TokenKind::LBrace, "to open if body")?;
        let body = self.parse_body()?;
        self.expect(TokenKind::RBrace, "to close if body")?;

        let else_clause = if self.peek().kind == TokenKind::Else {
            let else_span = self.peek().span;
            self.advance();
            self.expect(TokenKind::LBrace, "after 'else'")?;
            let body = self.parse_body()?;
            self.expect(TokenKind::RBrace, "to close else body")?;
            Some(ElseClause {
                body,
                span: else_span,
            })
        } else {
            None
        };

        Ok(Statement::IfClause(IfClause {
            condition,
            body,
            else_clause,
            span,
        }))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// `term (('+' | '-') term)*`
    ///
    /// Later passes walk operation trees recursively, so one expression may
    /// hold at most [`MAX_OPERATORS`] operators.
    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let mut operators = 0;
        let mut lhs = self.parse_term(&mut operators)?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => Operator::Add,
                TokenKind::Minus => Operator::Subtract,
                _ => break,
            };
            self.count_operator(&mut operators)?;
            self.advance();
            let rhs = self.parse_term(&mut operators)?;
            lhs = binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    /// `primary ('*' primary)*`
    fn parse_term(&mut self, operators: &mut usize) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_primary()?;

        while self.peek().kind == TokenKind::Star {
            self.count_operator(operators)?;
            self.advance();
            let rhs = self.parse_primary()?;
            lhs = binary(Operator::Multiply, lhs, rhs);
        }

        Ok(lhs)
    }

    fn count_operator(&self, operators: &mut usize) -> Result<(), ParseError> {
        *operators += 1;
        if *operators > MAX_OPERATORS {
            return Err(self.error(format!(
                "Expression too deeply nested: more than {MAX_OPERATORS} operators"
            )));
        }
        Ok(())
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let token = self.peek();
        let kind = match &token.kind {
            TokenKind::Pixel(n) => ExprKind::Literal(Literal::Pixel(*n)),
            TokenKind::Percentage(n) => ExprKind::Literal(Literal::Percentage(*n)),
            TokenKind::Scalar(n) => ExprKind::Literal(Literal::Scalar(*n)),
            TokenKind::Color(hex) => ExprKind::Literal(Literal::Color(hex.clone())),
            TokenKind::Boolean(b) => ExprKind::Literal(Literal::Bool(*b)),
            TokenKind::CapitalIdent(name) => ExprKind::VariableReference(name.clone()),
            other => {
                return Err(self.error(format!(
                    "Expected value or variable, got {}",
                    other.describe()
                )))
            }
        };
        let span = token.span;
        self.advance();
        Ok(Expression { kind, span })
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn peek(&self) -> &Token {
        static EOF: std::sync::LazyLock<Token> =
            std::sync::LazyLock::new(|| Token::new(TokenKind::Eof, Span::new(0, 0, 0, 0)));
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    fn peek_next_is(&self, kind: &TokenKind) -> bool {
        self.tokens
            .get(self.pos + 1)
            .is_some_and(|t| &t.kind == kind)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len() || matches!(self.peek().kind, TokenKind::Eof)
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<(), ParseError> {
        if self.peek().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "Expected {} {context}, got {}",
                kind.describe(),
                self.peek().kind.describe()
            )))
        }
    }

    fn expect_lower_ident(&mut self) -> Result<String, ParseError> {
        if let TokenKind::LowerIdent(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error(format!(
                "Expected property name, got {}",
                self.peek().kind.describe()
            )))
        }
    }

    fn error(&self, message: String) -> ParseError {
        let token = self.peek();
        ParseError {
            message,
            line: token.span.line,
            column: token.span.column,
        }
    }
}

fn starts_selector(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::LowerIdent(_)
            | TokenKind::ClassIdent(_)
            | TokenKind::IdIdent(_)
            | TokenKind::Color(_)
    )
}

fn binary(op: Operator, lhs: Expression, rhs: Expression) -> Expression {
    let span = lhs.span.to(rhs.span);
    Expression {
        kind: ExprKind::Operation {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    }
}
