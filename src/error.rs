//! Error types for the compiler core
//!
//! This module defines [`CompileError`], the error every public operation of the
//! core eventually reports, and [`ErrorKind`], which maps an error onto the exit
//! code class the command-line front end returns.
//!
//! Errors fall into three groups:
//! - internal errors: defects in the compiler itself (double initialization of a
//!   node, a parser invariant violation, failed allocation)
//! - semantic errors: problems in the input program (undefined identifier,
//!   redefinition, literal out of range)
//! - syntax errors raised by the expression parser
//!
//! The first error of a run is recorded by an [`ErrorWatcher`]; everything after
//! it is only logged, since the run is already going to abort.

use thiserror::Error;
use tracing::{debug, warn};

/// Result type alias
pub type Result<T> = std::result::Result<T, CompileError>;

/// Compile error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Defect in the compiler itself; never caused by the input program
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Malformed expression detected by the precedence parser
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    /// Numeric literal that does not fit its target type
    #[error("Literal '{literal}' is out of range")]
    LiteralOutOfRange { literal: String },

    /// Identifier not visible from the current scope
    #[error("Undefined identifier '{name}'")]
    UndefinedIdentifier { name: String },

    /// Identifier already declared in a visible scope
    #[error("Redefinition of '{name}'")]
    Redefinition { name: String },

    /// Type incompatibility
    #[error("Type error: {message}")]
    SemanticType { message: String },

    /// Any other semantic error
    #[error("Semantic error: {message}")]
    SemanticOther { message: String },
}

impl CompileError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    pub fn out_of_range(literal: impl Into<String>) -> Self {
        Self::LiteralOutOfRange {
            literal: literal.into(),
        }
    }

    pub fn undefined(name: impl Into<String>) -> Self {
        Self::UndefinedIdentifier { name: name.into() }
    }

    pub fn redefinition(name: impl Into<String>) -> Self {
        Self::Redefinition { name: name.into() }
    }

    pub fn semantic_type(message: impl Into<String>) -> Self {
        Self::SemanticType {
            message: message.into(),
        }
    }

    pub fn semantic_other(message: impl Into<String>) -> Self {
        Self::SemanticOther {
            message: message.into(),
        }
    }

    /// Exit code class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Internal { .. } => ErrorKind::Internal,
            CompileError::Syntax { .. } => ErrorKind::Syntax,
            CompileError::LiteralOutOfRange { .. } => ErrorKind::SemOther,
            CompileError::UndefinedIdentifier { .. } => ErrorKind::SemUndefined,
            CompileError::Redefinition { .. } => ErrorKind::SemRedefinition,
            CompileError::SemanticType { .. } => ErrorKind::SemType,
            CompileError::SemanticOther { .. } => ErrorKind::SemOther,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, CompileError::Internal { .. })
    }
}

/// Exit code classes reported by the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical = 1,
    Syntax = 2,
    SemUndefined = 3,
    SemRedefinition = 5,
    SemType = 7,
    SemOther = 10,
    Internal = 99,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        self as i32
    }
}

/// Records the first error of a compilation run
///
/// Library functions return errors instead of aborting; whoever drives the
/// passes hands every error to the watcher, which keeps the first one for the
/// exit code and only logs the rest.
#[derive(Debug, Default)]
pub struct ErrorWatcher {
    first: Option<CompileError>,
    suppressed: usize,
}

impl ErrorWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error, returns true if it was the first one
    pub fn record(&mut self, err: CompileError) -> bool {
        if self.first.is_some() {
            self.suppressed += 1;
            debug!(error = %err, "suppressing follow-up error");
            return false;
        }
        warn!(error = %err, code = err.kind().exit_code(), "compilation failed");
        self.first = Some(err);
        true
    }

    pub fn has_error(&self) -> bool {
        self.first.is_some()
    }

    pub fn first(&self) -> Option<&CompileError> {
        self.first.as_ref()
    }

    /// Number of errors reported after the first one
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    /// Process exit code, 0 when no error was recorded
    pub fn exit_code(&self) -> i32 {
        self.first.as_ref().map_or(0, |e| e.kind().exit_code())
    }

    pub fn take(&mut self) -> Option<CompileError> {
        self.suppressed = 0;
        self.first.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_map_to_exit_codes() {
        assert_eq!(CompileError::internal("x").kind().exit_code(), 99);
        assert_eq!(CompileError::syntax("x").kind().exit_code(), 2);
        assert_eq!(CompileError::out_of_range("2147483648").kind().exit_code(), 10);
        assert_eq!(CompileError::undefined("a").kind().exit_code(), 3);
        assert_eq!(CompileError::redefinition("a").kind().exit_code(), 5);
        assert_eq!(CompileError::semantic_type("x").kind().exit_code(), 7);
    }

    #[test]
    fn test_watcher_keeps_first_error() {
        let mut watcher = ErrorWatcher::new();
        assert_eq!(watcher.exit_code(), 0);

        assert!(watcher.record(CompileError::undefined("a")));
        assert!(!watcher.record(CompileError::internal("later")));

        assert!(watcher.has_error());
        assert_eq!(watcher.suppressed(), 1);
        assert_eq!(watcher.exit_code(), 3);
        assert_eq!(watcher.take(), Some(CompileError::undefined("a")));
        assert!(!watcher.has_error());
    }

    #[test]
    fn test_display() {
        let err = CompileError::out_of_range("99999999999");
        assert_eq!(err.to_string(), "Literal '99999999999' is out of range");
    }
}
