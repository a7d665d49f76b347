//! Abstract syntax tree
//!
//! This module provides the tree the parser builds and later passes annotate:
//! - [`nodes`]: node structs, payload sum types and sibling chains
//! - [`init`]: strict `init_new_*` constructors
//! - [`literal`]: conversion of literal token text into values
//! - [`printer`]: box-drawing dump
//!
//! # Ownership
//!
//! Every node exclusively owns its children. The only cross reference is the
//! `frame_id` stored on statements and variables, which is a lookup key into
//! the [`crate::frame_stack::FrameStack`] arena, not a pointer.
//!
//! # Generic construction and destruction
//!
//! Call sites that only know a node by its [`AstNodeType`] tag (the precedence
//! stack, error unwinding) go through [`create_node`] and [`destroy_node`]. The
//! tag passed by the caller is checked against the tag the node itself
//! carries; the payload is then released according to the stored tags all the
//! way down. Sibling chains are released iteratively, so arbitrarily long
//! function or statement lists never deepen the call stack.

pub mod init;
pub mod literal;
pub mod nodes;
pub mod printer;

pub use init::*;
pub use literal::{parse_float_literal, parse_int_literal};
pub use nodes::*;
pub use printer::{print_tree, program_to_string};

use crate::error::{CompileError, Result};
use tracing::{debug, trace};

/// Owner of the program root for one compilation
#[derive(Debug, Default)]
pub struct AstTree {
    root: Option<Box<ProgramNode>>,
}

impl AstTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the empty program root
    pub fn init_tree(&mut self) -> Result<()> {
        if self.root.is_some() {
            return Err(CompileError::internal("AST is already initialized"));
        }
        self.root = Some(Box::new(ProgramNode::default()));
        debug!("AST initialized");
        Ok(())
    }

    /// Release the whole tree; safe to call any number of times
    pub fn destroy_tree(&mut self) {
        if let Some(mut root) = self.root.take() {
            let functions = destroy_fun_def_list(root.function_list.take());
            debug!(functions, "AST destroyed");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    pub fn program_node(&self) -> Option<&ProgramNode> {
        self.root.as_deref()
    }

    pub fn program_node_mut(&mut self) -> Option<&mut ProgramNode> {
        self.root.as_deref_mut()
    }
}

/// Allocate an empty node of the given type, `None` for `Undefined`
pub fn create_node(node_type: AstNodeType) -> Option<AstNode> {
    let node = match node_type {
        AstNodeType::Program => AstNode::Program(Box::default()),
        AstNodeType::FunDef => AstNode::FunDef(Box::default()),
        AstNodeType::ArgOrParam => AstNode::ArgOrParam(Box::default()),
        AstNodeType::Statement => AstNode::Statement(Box::default()),
        AstNodeType::FunCall => AstNode::FunCall(Box::default()),
        AstNodeType::If => AstNode::If(Box::default()),
        AstNodeType::While => AstNode::While(Box::default()),
        AstNodeType::Expr => AstNode::Expr(Box::default()),
        AstNodeType::BinOp => AstNode::BinOp(Box::default()),
        AstNodeType::Var | AstNodeType::Literal => {
            AstNode::Var(Box::new(VarNode::new(node_type)))
        }
        AstNodeType::Undefined => return None,
    };
    Some(node)
}

/// Release a node and everything it owns
///
/// A missing node is fine. The caller's tag must agree with the stored one
/// (`Var` and `Literal` are interchangeable since both are [`VarNode`]s); on a
/// mismatch the node is still released and an internal error is reported.
pub fn destroy_node(node_type: AstNodeType, node: Option<AstNode>) -> Result<()> {
    let Some(node) = node else {
        return Ok(());
    };

    let stored = node.node_type();
    let agrees = match node_type {
        AstNodeType::Var | AstNodeType::Literal => {
            matches!(stored, AstNodeType::Var | AstNodeType::Literal)
        }
        AstNodeType::Undefined => false,
        other => other == stored,
    };

    trace!(%node_type, %stored, "destroying node");
    release(node);

    if agrees {
        Ok(())
    } else {
        Err(CompileError::internal(format!(
            "cannot destroy a {} node as {}",
            stored, node_type
        )))
    }
}

fn release(node: AstNode) {
    match node {
        AstNode::Program(mut program) => {
            destroy_fun_def_list(program.function_list.take());
        }
        AstNode::FunDef(fun) => {
            destroy_fun_def_list(Some(fun));
        }
        AstNode::ArgOrParam(arg) => {
            destroy_arg_or_param_list(Some(arg));
        }
        AstNode::Statement(stmt) => {
            destroy_statement_list(Some(stmt));
        }
        other => drop(other),
    }
}

/// Release a chain of function definitions, returning how many were freed
pub fn destroy_fun_def_list(mut list: Option<Box<FunDefNode>>) -> usize {
    let mut freed = 0;
    while let Some(mut node) = list {
        list = node.next.take();
        destroy_arg_or_param_list(node.parameters.take());
        destroy_statement_list(node.body.take());
        freed += 1;
    }
    freed
}

/// Release a chain of arguments or parameters, returning how many were freed
pub fn destroy_arg_or_param_list(mut list: Option<Box<ArgOrParamNode>>) -> usize {
    let mut freed = 0;
    while let Some(mut node) = list {
        list = node.next.take();
        freed += 1;
    }
    freed
}

/// Release a chain of statements, returning how many were freed
pub fn destroy_statement_list(mut list: Option<Box<StatementNode>>) -> usize {
    let mut freed = 0;
    while let Some(mut node) = list {
        list = node.next.take();
        freed += 1;
    }
    freed
}
