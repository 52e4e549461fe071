use std::fmt;

/// A position in source text, tracking line and column for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Span for nodes that were not produced from source text.
    pub const fn dummy() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 0,
            column: 0,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        if self.line == 0 {
            return other;
        }
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Token classification for ICSS source.
///
/// Data-carrying variants embed their value directly (no separate `value` field on Token).
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Identifiers (carry data)
    /// `width`, `background-color`, `p`
    LowerIdent(String),
    /// `MainColor`, `UseBorder`
    CapitalIdent(String),
    /// `.menu` (stored without the dot)
    ClassIdent(String),
    /// `#header` (stored without the hash)
    IdIdent(String),

    // Literals (carry data)
    /// `#ff00aa` (stored with the hash)
    Color(String),
    Pixel(i64),
    Percentage(i64),
    Scalar(i64),
    Boolean(bool),

    // Keywords
    If,
    Else,

    // Operators
    Assign, // :=
    Plus,
    Minus,
    Star,

    // Punctuation
    Colon,
    Semicolon,
    Comma,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // End of input
    Eof,
}

impl TokenKind {
    /// Short human-readable description, used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::LowerIdent(s) => format!("identifier '{s}'"),
            TokenKind::CapitalIdent(s) => format!("variable '{s}'"),
            TokenKind::ClassIdent(s) => format!("class selector '.{s}'"),
            TokenKind::IdIdent(s) => format!("id selector '#{s}'"),
            TokenKind::Color(s) => format!("color '{s}'"),
            TokenKind::Pixel(n) => format!("'{n}px'"),
            TokenKind::Percentage(n) => format!("'{n}%'"),
            TokenKind::Scalar(n) => format!("'{n}'"),
            TokenKind::Boolean(true) => "'TRUE'".into(),
            TokenKind::Boolean(false) => "'FALSE'".into(),
            TokenKind::If => "'if'".into(),
            TokenKind::Else => "'else'".into(),
            TokenKind::Assign => "':='".into(),
            TokenKind::Plus => "'+'".into(),
            TokenKind::Minus => "'-'".into(),
            TokenKind::Star => "'*'".into(),
            TokenKind::Colon => "':'".into(),
            TokenKind::Semicolon => "';'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::LBrace => "'{'".into(),
            TokenKind::RBrace => "'}'".into(),
            TokenKind::LBracket => "'['".into(),
            TokenKind::RBracket => "']'".into(),
            TokenKind::Eof => "end of input".into(),
        }
    }
}

/// A token produced by the ICSS lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
