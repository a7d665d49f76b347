//! Token interface consumed from the lexer
//!
//! The lexer itself lives outside this crate. It hands over a flat slice of
//! [`Token`]s, each with a [`TokenKind`] and, for identifiers and literals,
//! the raw lexeme as a [`DString`]. Numeric literals keep their source text;
//! conversion to a value happens when the AST literal node is built.

use crate::constants::INT_CONVERSION_BASE;
use crate::dstring::DString;
use std::fmt;

/// Kinds of tokens produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Identifiers and literals
    Identifier,
    IntLiteral,
    FloatLiteral,
    StringLiteral,

    // Keywords
    Const,
    Var,
    Pub,
    Fn,
    If,
    Else,
    While,
    Return,
    Null,
    Void,
    Import,
    Ifj, // built-in namespace

    // Type keywords
    I32,
    F64,
    U8Slice,
    NullableI32,
    NullableF64,
    NullableU8Slice,

    // Operators
    Plus,           // +
    Minus,          // -
    Multiplication, // *
    Division,       // /
    Assign,         // =
    Identity,       // ==
    NotEqual,       // !=
    LessThan,       // <
    GreaterThan,    // >
    LessEqual,      // <=
    GreaterEqual,   // >=

    // Punctuation
    Dot,
    Comma,
    Colon,
    Semicolon,
    VerticalBar,
    LeftBracket,  // (
    RightBracket, // )
    LeftCurly,    // {
    RightCurly,   // }
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Const => "const",
            TokenKind::Var => "var",
            TokenKind::Pub => "pub",
            TokenKind::Fn => "fn",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Return => "return",
            TokenKind::Null => "null",
            TokenKind::Void => "void",
            TokenKind::Import => "@import",
            TokenKind::Ifj => "ifj",
            TokenKind::I32 => "i32",
            TokenKind::F64 => "f64",
            TokenKind::U8Slice => "[]u8",
            TokenKind::NullableI32 => "?i32",
            TokenKind::NullableF64 => "?f64",
            TokenKind::NullableU8Slice => "?[]u8",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Multiplication => "*",
            TokenKind::Division => "/",
            TokenKind::Assign => "=",
            TokenKind::Identity => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::LessThan => "<",
            TokenKind::GreaterThan => ">",
            TokenKind::LessEqual => "<=",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::VerticalBar => "|",
            TokenKind::LeftBracket => "(",
            TokenKind::RightBracket => ")",
            TokenKind::LeftCurly => "{",
            TokenKind::RightCurly => "}",
            TokenKind::Eof => "end of file",
        };
        write!(f, "{}", text)
    }
}

/// One token handed over by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Lexeme of identifiers and literals
    pub value: Option<DString>,
    /// Radix of an integer literal's text
    pub base: u32,
}

impl Token {
    /// Token without a lexeme
    pub fn new(kind: TokenKind) -> Self {
        Token {
            kind,
            value: None,
            base: INT_CONVERSION_BASE,
        }
    }

    pub fn with_value(kind: TokenKind, value: &str) -> Self {
        Token {
            kind,
            value: Some(DString::from(value)),
            base: INT_CONVERSION_BASE,
        }
    }

    pub fn identifier(name: &str) -> Self {
        Self::with_value(TokenKind::Identifier, name)
    }

    pub fn int(text: &str) -> Self {
        Self::with_value(TokenKind::IntLiteral, text)
    }

    pub fn float(text: &str) -> Self {
        Self::with_value(TokenKind::FloatLiteral, text)
    }

    pub fn string(text: &str) -> Self {
        Self::with_value(TokenKind::StringLiteral, text)
    }

    /// Move the lexeme out, leaving `None` behind
    pub fn take_value(&mut self) -> Option<DString> {
        self.value.take()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} '{}'", self.kind, value),
            None => write!(f, "'{}'", self.kind),
        }
    }
}
