//! Alphabet of the precedence parser and its stack

use crate::error::{CompileError, Result};
use crate::token::TokenKind;
use std::fmt;

/// Terminals the precedence table is defined over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecTerminal {
    Id,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    NullLiteral,
    Ifj,
    Dot,
    LeftBracket,
    RightBracket,
    Plus,
    Minus,
    Multiplication,
    Division,
    Identity,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Comma,
    /// End of the expression; control goes back to the statement parser
    Dollar,
}

impl PrecTerminal {
    /// Terminal for a lexer token, `None` for tokens outside the expression alphabet
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        let terminal = match kind {
            TokenKind::Identifier => PrecTerminal::Id,
            TokenKind::IntLiteral => PrecTerminal::IntLiteral,
            TokenKind::FloatLiteral => PrecTerminal::FloatLiteral,
            TokenKind::StringLiteral => PrecTerminal::StringLiteral,
            TokenKind::Null => PrecTerminal::NullLiteral,
            TokenKind::Ifj => PrecTerminal::Ifj,
            TokenKind::Dot => PrecTerminal::Dot,
            TokenKind::LeftBracket => PrecTerminal::LeftBracket,
            TokenKind::RightBracket => PrecTerminal::RightBracket,
            TokenKind::Plus => PrecTerminal::Plus,
            TokenKind::Minus => PrecTerminal::Minus,
            TokenKind::Multiplication => PrecTerminal::Multiplication,
            TokenKind::Division => PrecTerminal::Division,
            TokenKind::Identity => PrecTerminal::Identity,
            TokenKind::NotEqual => PrecTerminal::NotEqual,
            TokenKind::LessThan => PrecTerminal::LessThan,
            TokenKind::GreaterThan => PrecTerminal::GreaterThan,
            TokenKind::LessEqual => PrecTerminal::LessThanOrEqual,
            TokenKind::GreaterEqual => PrecTerminal::GreaterThanOrEqual,
            TokenKind::Comma => PrecTerminal::Comma,
            _ => return None,
        };
        Some(terminal)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            PrecTerminal::IntLiteral
                | PrecTerminal::FloatLiteral
                | PrecTerminal::StringLiteral
                | PrecTerminal::NullLiteral
        )
    }

    /// Identifier or literal
    pub fn is_operand(self) -> bool {
        self == PrecTerminal::Id || self.is_literal()
    }
}

impl fmt::Display for PrecTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PrecTerminal::Id => "id",
            PrecTerminal::IntLiteral => "i32 literal",
            PrecTerminal::FloatLiteral => "f64 literal",
            PrecTerminal::StringLiteral => "string literal",
            PrecTerminal::NullLiteral => "null",
            PrecTerminal::Ifj => "ifj",
            PrecTerminal::Dot => ".",
            PrecTerminal::LeftBracket => "(",
            PrecTerminal::RightBracket => ")",
            PrecTerminal::Plus => "+",
            PrecTerminal::Minus => "-",
            PrecTerminal::Multiplication => "*",
            PrecTerminal::Division => "/",
            PrecTerminal::Identity => "==",
            PrecTerminal::NotEqual => "!=",
            PrecTerminal::LessThan => "<",
            PrecTerminal::GreaterThan => ">",
            PrecTerminal::LessThanOrEqual => "<=",
            PrecTerminal::GreaterThanOrEqual => ">=",
            PrecTerminal::Comma => ",",
            PrecTerminal::Dollar => "$",
        };
        write!(f, "{}", text)
    }
}

/// Nonterminals that can sit on the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecStackNonTerminal {
    Expression,
    ArgList,
    Arg,
}

/// Everything a stack cell can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecStackSymbol {
    Terminal(PrecTerminal),
    Expression,
    ArgList,
    Arg,
    Handle,
}

impl From<PrecTerminal> for PrecStackSymbol {
    fn from(terminal: PrecTerminal) -> Self {
        PrecStackSymbol::Terminal(terminal)
    }
}

impl From<PrecStackNonTerminal> for PrecStackSymbol {
    fn from(nonterminal: PrecStackNonTerminal) -> Self {
        match nonterminal {
            PrecStackNonTerminal::Expression => PrecStackSymbol::Expression,
            PrecStackNonTerminal::ArgList => PrecStackSymbol::ArgList,
            PrecStackNonTerminal::Arg => PrecStackSymbol::Arg,
        }
    }
}

impl PrecStackSymbol {
    /// Terminal held by this symbol; nonterminals and handles have none
    pub fn to_terminal(self) -> Result<PrecTerminal> {
        match self {
            PrecStackSymbol::Terminal(terminal) => Ok(terminal),
            other => Err(CompileError::internal(format!(
                "stack symbol {} is not a terminal",
                other
            ))),
        }
    }
}

impl fmt::Display for PrecStackSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrecStackSymbol::Terminal(terminal) => write!(f, "{}", terminal),
            PrecStackSymbol::Expression => write!(f, "E"),
            PrecStackSymbol::ArgList => write!(f, "ArgList"),
            PrecStackSymbol::Arg => write!(f, "Arg"),
            PrecStackSymbol::Handle => write!(f, "<"),
        }
    }
}

/// Role of a stack cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackSymbolType {
    Terminal,
    NonTerminal,
    Handle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_mapping() {
        let symbol = PrecStackSymbol::from(PrecTerminal::Plus);
        assert_eq!(symbol.to_terminal().unwrap(), PrecTerminal::Plus);

        let symbol = PrecStackSymbol::from(PrecStackNonTerminal::ArgList);
        assert_eq!(symbol, PrecStackSymbol::ArgList);
        assert!(symbol.to_terminal().unwrap_err().is_internal());
        assert!(PrecStackSymbol::Handle.to_terminal().is_err());
    }

    #[test]
    fn test_token_mapping() {
        assert_eq!(
            PrecTerminal::from_token_kind(TokenKind::Null),
            Some(PrecTerminal::NullLiteral)
        );
        assert_eq!(
            PrecTerminal::from_token_kind(TokenKind::LessEqual),
            Some(PrecTerminal::LessThanOrEqual)
        );
        assert_eq!(PrecTerminal::from_token_kind(TokenKind::Semicolon), None);
        assert_eq!(PrecTerminal::from_token_kind(TokenKind::Assign), None);
    }
}
