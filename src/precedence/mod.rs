//! Operator-precedence expression parsing
//!
//! This module provides the bottom-up half of the parser:
//! - [`symbols`]: terminals, nonterminals and stack symbols
//! - [`table`]: the precedence table
//! - [`stack`]: [`PrecStack`] cells with optional AST payloads, and the
//!   [`PrecStackList`] of nested stacks
//! - [`reduce`]: reduction rules building expression subtrees
//! - [`parser`]: [`ExprParser`], which drives the table over a token slice
//!
//! # Payload ownership
//!
//! Identifier and literal cells carry the AST node built from their token.
//! Reductions move payloads out of the cells into the subtree they build, and
//! a finished stack is popped with [`PrecStack::dispose`], which hands any
//! remaining payload back. Only [`PrecStack::purge`] destroys payloads, and it
//! is used when a parse fails.

pub mod parser;
pub mod reduce;
pub mod stack;
pub mod symbols;
pub mod table;

pub use parser::{parse_expression, ExprParser};
pub use reduce::bin_op_for;
pub use stack::{PrecStack, PrecStackList, PrecStackNode, PurgeCount};
pub use symbols::{PrecStackNonTerminal, PrecStackSymbol, PrecTerminal, StackSymbolType};
pub use table::{precedence, PrecAction};
