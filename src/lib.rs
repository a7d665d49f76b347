//! # Introduction
//!
//! Core data structures of a compiler front end for IFJ24, a small
//! Zig-like language. The crate holds what the parser and the later passes
//! share; lexing, statement parsing and code generation live elsewhere and
//! drive these structures.
//!
//! ## Pipeline
//!
//! ```text
//! Tokens → Precedence parser → AST → Scope resolution → (code generation)
//!                                       ↕
//!                                   Frame stack
//! ```
//!
//! 1. [`token`]: the token interface handed over by the lexer.
//! 2. [`precedence`]: operator-precedence parsing of expressions on a stack of
//!    [`precedence::PrecStack`]s, one per nested call argument.
//! 3. [`ast`]: the tree, its strict constructors and a box-drawing dump.
//! 4. [`frame_stack`]: scope chain of [`symtable::Symtable`]s kept in an
//!    id-indexed arena that outlives the stack discipline.
//! 5. [`semantic`]: resolves every identifier and stamps frame ids into the
//!    tree.
//! 6. [`context`]: one [`context::CompilerContext`] per run, with the
//!    [`error::ErrorWatcher`] and full teardown.
//!
//! Strings throughout are [`dstring::DString`]s. Sizes and naming constants
//! are in [`constants`].

pub mod ast;
pub mod constants;
pub mod context;
pub mod dstring;
pub mod error;
pub mod frame_stack;
pub mod precedence;
pub mod semantic;
pub mod symtable;
pub mod token;

pub use context::CompilerContext;
pub use dstring::DString;
pub use error::{CompileError, ErrorKind, ErrorWatcher, Result};
pub use frame_stack::{FrameId, FrameStack};
pub use token::{Token, TokenKind};
