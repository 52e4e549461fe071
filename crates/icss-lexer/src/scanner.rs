use crate::token::{Span, Token, TokenKind};
use crate::LexerError;

/// ICSS source scanner.
///
/// Tokenizes `.icss` source into a flat stream of tokens ending in `Eof`.
/// ICSS is brace-delimited, so whitespace and newlines only separate tokens
/// and never produce tokens of their own.
///
/// - `Vec<char>` source for index-based navigation
/// - Position tracking on every token
/// - Unit suffixes are folded into the literal (`10px` is one token)
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Scanner {
    /// Create a new scanner for the given source.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens()?;
        Ok(scanner.tokens)
    }

    /// Scan all tokens from the source.
    fn scan_tokens(&mut self) -> Result<(), LexerError> {
        while !self.is_at_end() {
            self.scan_token()?;
        }

        self.emit(TokenKind::Eof);
        Ok(())
    }

    /// Scan the next token.
    fn scan_token(&mut self) -> Result<(), LexerError> {
        let ch = self.peek();

        match ch {
            ' ' | '\t' | '\r' => {
                self.advance();
                Ok(())
            }
            '\n' => {
                self.newline();
                Ok(())
            }

            // Comments
            '/' if self.peek_next() == '/' => {
                self.skip_line_comment();
                Ok(())
            }
            '/' if self.peek_next() == '*' => self.skip_block_comment(),

            // Numbers with optional unit
            '0'..='9' => self.scan_number(),

            // Selectors and colors
            '.' => self.scan_class(),
            '#' => self.scan_hash(),

            // `:=` or `:`
            ':' => {
                if self.peek_next() == '=' {
                    self.emit_wide(TokenKind::Assign, 2);
                } else {
                    self.emit_wide(TokenKind::Colon, 1);
                }
                Ok(())
            }

            // Single-character tokens
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Star),

            // Identifiers and keywords
            c if c.is_ascii_lowercase() => self.scan_lower_ident(),
            c if c.is_ascii_uppercase() => self.scan_capital_ident(),

            _ => Err(self.error(format!("Unexpected character: '{ch}'"))),
        }
    }

    // --- Scanners ---

    /// Scan a number literal with an optional `px` or `%` suffix.
    fn scan_number(&mut self) -> Result<(), LexerError> {
        let start_line = self.line;
        let start_col = self.column;
        let start_pos = self.pos;

        let mut digits = String::new();
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            digits.push(self.peek());
            self.advance();
        }

        let value: i64 = digits.parse().map_err(|_| LexerError {
            message: format!("Number out of range: '{digits}'"),
            line: start_line,
            column: start_col,
        })?;

        let kind = if self.peek() == 'p' && self.peek_next() == 'x' {
            self.advance();
            self.advance();
            TokenKind::Pixel(value)
        } else if self.peek() == '%' {
            self.advance();
            TokenKind::Percentage(value)
        } else {
            TokenKind::Scalar(value)
        };

        if self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            return Err(self.error(format!(
                "Unexpected character '{}' after number",
                self.peek()
            )));
        }

        let span = Span::new(start_pos, self.pos, start_line, start_col);
        self.tokens.push(Token::new(kind, span));
        Ok(())
    }

    /// Scan a `.class` selector.
    fn scan_class(&mut self) -> Result<(), LexerError> {
        let start_line = self.line;
        let start_col = self.column;
        let start_pos = self.pos;
        self.advance(); // consume `.`

        let name = self.take_while(is_ident_char);
        if name.is_empty() {
            return Err(LexerError {
                message: "Expected class name after '.'".into(),
                line: start_line,
                column: start_col,
            });
        }

        let span = Span::new(start_pos, self.pos, start_line, start_col);
        self.tokens
            .push(Token::new(TokenKind::ClassIdent(name), span));
        Ok(())
    }

    /// Scan `#rrggbb` as a color, anything else after `#` as an id selector.
    fn scan_hash(&mut self) -> Result<(), LexerError> {
        let start_line = self.line;
        let start_col = self.column;
        let start_pos = self.pos;
        self.advance(); // consume `#`

        let name = self.take_while(is_ident_char);
        if name.is_empty() {
            return Err(LexerError {
                message: "Expected color or id after '#'".into(),
                line: start_line,
                column: start_col,
            });
        }

        let kind = if name.len() == 6 && name.chars().all(|c| c.is_ascii_hexdigit()) {
            TokenKind::Color(format!("#{name}"))
        } else {
            TokenKind::IdIdent(name)
        };

        let span = Span::new(start_pos, self.pos, start_line, start_col);
        self.tokens.push(Token::new(kind, span));
        Ok(())
    }

    /// Scan a lowercase identifier or keyword. Supports hyphens when followed
    /// by an alphanumeric (for property names like `background-color`).
    fn scan_lower_ident(&mut self) -> Result<(), LexerError> {
        let start_line = self.line;
        let start_col = self.column;
        let start_pos = self.pos;

        let ident = self.take_while(is_ident_char);

        let kind = match ident.as_str() {
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            _ => TokenKind::LowerIdent(ident),
        };

        let span = Span::new(start_pos, self.pos, start_line, start_col);
        self.tokens.push(Token::new(kind, span));
        Ok(())
    }

    /// Scan a capitalized identifier (variable name) or boolean literal.
    fn scan_capital_ident(&mut self) -> Result<(), LexerError> {
        let start_line = self.line;
        let start_col = self.column;
        let start_pos = self.pos;

        let ident = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');

        let kind = match ident.as_str() {
            "TRUE" => TokenKind::Boolean(true),
            "FALSE" => TokenKind::Boolean(false),
            _ => TokenKind::CapitalIdent(ident),
        };

        let span = Span::new(start_pos, self.pos, start_line, start_col);
        self.tokens.push(Token::new(kind, span));
        Ok(())
    }

    /// Skip a line comment (`// ...`).
    fn skip_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    /// Skip a block comment (`/* ... */`).
    fn skip_block_comment(&mut self) -> Result<(), LexerError> {
        let start_line = self.line;
        let start_col = self.column;
        self.advance();
        self.advance();

        while !self.is_at_end() {
            if self.peek() == '*' && self.peek_next() == '/' {
                self.advance();
                self.advance();
                return Ok(());
            }
            if self.peek() == '\n' {
                self.newline();
            } else {
                self.advance();
            }
        }

        Err(LexerError {
            message: "Unterminated block comment".into(),
            line: start_line,
            column: start_col,
        })
    }

    // --- Helpers ---

    /// Consume characters matching `pred`. A `-` is only taken when it is
    /// followed by an alphanumeric, so `a-b` is one name but `A -B` is not.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while !self.is_at_end() {
            let c = self.peek();
            if c == '-' {
                if !(pred(c) && self.peek_next().is_ascii_alphanumeric()) {
                    break;
                }
            } else if !pred(c) {
                break;
            }
            out.push(c);
            self.advance();
        }
        out
    }

    fn single(&mut self, kind: TokenKind) -> Result<(), LexerError> {
        self.emit_wide(kind, 1);
        Ok(())
    }

    fn emit(&mut self, kind: TokenKind) {
        let span = Span::new(self.pos, self.pos, self.line, self.column);
        self.tokens.push(Token::new(kind, span));
    }

    fn emit_wide(&mut self, kind: TokenKind, width: usize) {
        let span = Span::new(self.pos, self.pos + width, self.line, self.column);
        for _ in 0..width {
            self.advance();
        }
        self.tokens.push(Token::new(kind, span));
    }

    fn newline(&mut self) {
        self.pos += 1;
        self.line += 1;
        self.column = 1;
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.pos]
        }
    }

    fn peek_next(&self) -> char {
        if self.pos + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.pos + 1]
        }
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
            self.column += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, message: String) -> LexerError {
        LexerError {
            message,
            line: self.line,
            column: self.column,
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
