//! Operator precedence table
//!
//! Rows are the topmost terminal on the stack, columns the incoming terminal.
//! `*` and `/` bind tighter than `+` and `-`, which bind tighter than the
//! relational operators. Arithmetic operators are left associative; relational
//! operators do not associate at all, so `a < b < c` is a syntax error.

use super::symbols::PrecTerminal;

/// What the parser does for a (top, incoming) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecAction {
    /// Insert a handle above the top terminal, push the incoming one
    Shift,
    /// Push the incoming terminal without a handle (matching `)`)
    Equal,
    /// Reduce the handle at the top
    Reduce,
    /// The expression is complete
    Accept,
    Error,
}

/// Row/column classes of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableClass {
    Operand,
    LeftBracket,
    RightBracket,
    MulDiv,
    AddSub,
    Relational,
    Dollar,
}

fn class_of(terminal: PrecTerminal) -> Option<TableClass> {
    let class = match terminal {
        PrecTerminal::Id
        | PrecTerminal::IntLiteral
        | PrecTerminal::FloatLiteral
        | PrecTerminal::StringLiteral
        | PrecTerminal::NullLiteral => TableClass::Operand,
        PrecTerminal::LeftBracket => TableClass::LeftBracket,
        PrecTerminal::RightBracket => TableClass::RightBracket,
        PrecTerminal::Multiplication | PrecTerminal::Division => TableClass::MulDiv,
        PrecTerminal::Plus | PrecTerminal::Minus => TableClass::AddSub,
        PrecTerminal::Identity
        | PrecTerminal::NotEqual
        | PrecTerminal::LessThan
        | PrecTerminal::GreaterThan
        | PrecTerminal::LessThanOrEqual
        | PrecTerminal::GreaterThanOrEqual => TableClass::Relational,
        PrecTerminal::Dollar => TableClass::Dollar,
        // Calls are assembled by the driver, never looked up here
        PrecTerminal::Ifj | PrecTerminal::Dot | PrecTerminal::Comma => return None,
    };
    Some(class)
}

use PrecAction::{Accept as A, Equal as Q, Error as E, Reduce as R, Shift as S};

#[rustfmt::skip]
const TABLE: [[PrecAction; 7]; 7] = [
    //           id  (  )  *  +  rel $
    /* id  */   [ E, E, R, R, R, R, R ],
    /* (   */   [ S, S, Q, S, S, S, E ],
    /* )   */   [ E, E, R, R, R, R, R ],
    /* mul */   [ S, S, R, R, R, R, R ],
    /* add */   [ S, S, R, S, R, R, R ],
    /* rel */   [ S, S, R, S, S, E, R ],
    /* $   */   [ S, S, E, S, S, S, A ],
];

/// Action for the topmost stack terminal and the incoming terminal
pub fn precedence(top: PrecTerminal, incoming: PrecTerminal) -> PrecAction {
    match (class_of(top), class_of(incoming)) {
        (Some(row), Some(col)) => TABLE[row as usize][col as usize],
        _ => PrecAction::Error,
    }
}
