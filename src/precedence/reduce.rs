//! Reduction rules
//!
//! ```text
//! E -> id
//! E -> literal
//! E -> ( E )
//! E -> E op E
//! ```
//!
//! The cells between the topmost handle and the top of the stack are the rule
//! body. They are matched against the rules above and replaced by a single
//! `Expression` cell holding the built subtree.

use super::stack::{PrecStack, PrecStackNode};
use super::symbols::{PrecStackNonTerminal, PrecStackSymbol, PrecTerminal};
use crate::ast::{init_new_bin_op_node, AstNode, AstNodeType, BinOpNode, BinOpType, Expr, ExprNode};
use crate::error::{CompileError, Result};
use tracing::trace;

/// Operator a terminal stands for in `E -> E op E`
pub fn bin_op_for(terminal: PrecTerminal) -> Option<BinOpType> {
    let op = match terminal {
        PrecTerminal::Plus => BinOpType::Add,
        PrecTerminal::Minus => BinOpType::Sub,
        PrecTerminal::Multiplication => BinOpType::Mul,
        PrecTerminal::Division => BinOpType::Div,
        PrecTerminal::Identity => BinOpType::Equal,
        PrecTerminal::NotEqual => BinOpType::NotEqual,
        PrecTerminal::LessThan => BinOpType::LessThan,
        PrecTerminal::GreaterThan => BinOpType::GreaterThan,
        PrecTerminal::LessThanOrEqual => BinOpType::LessEqual,
        PrecTerminal::GreaterThanOrEqual => BinOpType::GreaterEqual,
        _ => return None,
    };
    Some(op)
}

impl PrecStack {
    /// Reduce the handle on top of the stack to one `Expression` cell
    pub fn reduce(&mut self) -> Result<()> {
        let handle = self
            .top_handle_index()
            .ok_or_else(|| CompileError::syntax("no handle to reduce"))?;

        let mut body = self.split_off(handle);
        // First cell is the handle itself
        body.remove(0);

        let expr = reduce_body(body)?;
        trace!(expr = ?expr.expr_type(), "reduced");
        self.push_nonterminal(
            PrecStackNonTerminal::Expression,
            AstNodeType::Expr,
            Some(AstNode::Expr(expr)),
        );
        Ok(())
    }
}

fn reduce_body(body: Vec<PrecStackNode>) -> Result<Box<ExprNode>> {
    let shape: Vec<PrecStackSymbol> = body.iter().map(|cell| cell.symbol).collect();
    let mut cells = body.into_iter();

    match shape.as_slice() {
        [PrecStackSymbol::Terminal(t)] if t.is_operand() => {
            let cell = next_cell(&mut cells)?;
            operand(cell)
        }
        [PrecStackSymbol::Terminal(PrecTerminal::LeftBracket), PrecStackSymbol::Expression, PrecStackSymbol::Terminal(PrecTerminal::RightBracket)] =>
        {
            cells.next();
            expression(next_cell(&mut cells)?)
        }
        [PrecStackSymbol::Expression, PrecStackSymbol::Terminal(op), PrecStackSymbol::Expression] => {
            let op = bin_op_for(*op)
                .ok_or_else(|| CompileError::syntax(format!("'{}' is not a binary operator", op)))?;
            let left = expression(next_cell(&mut cells)?)?;
            cells.next();
            let right = expression(next_cell(&mut cells)?)?;

            let mut bin = Box::new(BinOpNode::default());
            init_new_bin_op_node(&mut bin, op, left, right)?;
            Ok(ExprNode::from_expr(Expr::BinaryOp(bin)))
        }
        _ => {
            let text: Vec<String> = shape.iter().map(|s| s.to_string()).collect();
            Err(CompileError::syntax(format!(
                "no rule reduces '{}'",
                text.join(" ")
            )))
        }
    }
}

fn next_cell(cells: &mut impl Iterator<Item = PrecStackNode>) -> Result<PrecStackNode> {
    cells
        .next()
        .ok_or_else(|| CompileError::internal("reduction body ended early"))
}

/// `E -> id` and `E -> literal`
fn operand(cell: PrecStackNode) -> Result<Box<ExprNode>> {
    match cell.node {
        Some(AstNode::Var(var)) if var.is_literal() => Ok(ExprNode::from_expr(Expr::Literal(var))),
        Some(AstNode::Var(var)) => Ok(ExprNode::from_expr(Expr::Variable(var))),
        // Function call assembled by the driver
        Some(AstNode::Expr(expr)) => Ok(expr),
        _ => Err(CompileError::internal(format!(
            "operand {} carries no AST node",
            cell.symbol
        ))),
    }
}

fn expression(cell: PrecStackNode) -> Result<Box<ExprNode>> {
    match cell.node {
        Some(AstNode::Expr(expr)) => Ok(expr),
        _ => Err(CompileError::internal("expression cell without an expression")),
    }
}
