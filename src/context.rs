//! State shared by the passes of one compilation
//!
//! Everything the passes need lives in [`CompilerContext`], which is passed
//! around explicitly. Errors go through [`CompilerContext::fail`] and the whole
//! context is released with [`CompilerContext::teardown`].

use crate::ast::{AstTree, ExprNode};
use crate::error::{CompileError, ErrorWatcher, Result};
use crate::frame_stack::FrameStack;
use crate::precedence::{parse_expression, PrecStackList};
use crate::semantic::resolve_program;
use crate::token::Token;
use tracing::debug;

#[derive(Debug, Default)]
pub struct CompilerContext {
    pub tree: AstTree,
    pub frames: FrameStack,
    pub stacks: PrecStackList,
    pub watcher: ErrorWatcher,
}

impl CompilerContext {
    /// Context with an empty program root and the global frame in place
    pub fn new() -> Result<Self> {
        let mut ctx = Self {
            tree: AstTree::new(),
            frames: FrameStack::new(),
            stacks: PrecStackList::create(),
            watcher: ErrorWatcher::new(),
        };
        ctx.tree.init_tree()?;
        ctx.frames.init()?;
        debug!("compiler context ready");
        Ok(ctx)
    }

    /// Record `err`; returns true if it is the first error of the run
    pub fn fail(&mut self, err: CompileError) -> bool {
        self.watcher.record(err)
    }

    /// Parse one expression from the front of `tokens`
    ///
    /// Returns the expression and the number of tokens consumed. A failure is
    /// recorded in the watcher before it is returned.
    pub fn parse_expression(&mut self, tokens: &mut [Token]) -> Result<(Box<ExprNode>, usize)> {
        parse_expression(&mut self.stacks, tokens).map_err(|err| {
            self.fail(err.clone());
            err
        })
    }

    /// Run scope resolution over the program held by the tree
    pub fn resolve(&mut self) -> Result<()> {
        let result = match self.tree.program_node_mut() {
            Some(program) => resolve_program(program, &mut self.frames),
            None => Err(CompileError::internal("AST is not initialized")),
        };
        if let Err(err) = &result {
            self.fail(err.clone());
        }
        result
    }

    /// Process exit code for the run so far
    pub fn exit_code(&self) -> i32 {
        self.watcher.exit_code()
    }

    /// Release the tree, every frame and every precedence stack
    ///
    /// Safe to call more than once. The watcher is kept so the exit code is
    /// still available afterwards.
    pub fn teardown(&mut self) {
        self.tree.destroy_tree();
        self.frames.destroy_all();
        let purged = self.stacks.purge();
        debug!(payloads = purged.payloads, "compiler context torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_stack::FrameStackState;
    use crate::token::TokenKind;

    #[test]
    fn test_new_initializes_everything() {
        let ctx = CompilerContext::new().expect("Context creation failed");
        assert!(ctx.tree.is_initialized());
        assert_eq!(ctx.frames.state(), FrameStackState::Active);
        assert_eq!(ctx.frames.top_id(), Some(0));
        assert_eq!(ctx.stacks.depth(), 0);
        assert_eq!(ctx.exit_code(), 0);
    }

    #[test]
    fn test_fail_keeps_first_error() {
        let mut ctx = CompilerContext::new().expect("Context creation failed");
        assert!(ctx.fail(CompileError::undefined("x")));
        assert!(!ctx.fail(CompileError::syntax("late")));
        assert_eq!(ctx.exit_code(), 3);
    }

    #[test]
    fn test_failed_parse_is_recorded() {
        let mut ctx = CompilerContext::new().expect("Context creation failed");
        let mut tokens = vec![
            Token::new(TokenKind::Plus),
            Token::new(TokenKind::Semicolon),
        ];
        assert!(ctx.parse_expression(&mut tokens).is_err());
        assert_eq!(ctx.exit_code(), 2);
        assert_eq!(ctx.stacks.depth(), 0);
    }

    #[test]
    fn test_teardown_twice() {
        let mut ctx = CompilerContext::new().expect("Context creation failed");
        ctx.teardown();
        assert!(!ctx.tree.is_initialized());
        assert_eq!(ctx.frames.state(), FrameStackState::TornDown);

        ctx.teardown();
        assert!(!ctx.tree.is_initialized());
        assert_eq!(ctx.stacks.depth(), 0);
    }
}
