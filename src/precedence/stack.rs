//! Precedence stack and the stack of stacks
//!
//! A cell optionally owns an AST payload. Taking a cell off the stack hands
//! its payload to the caller. Tearing a stack down is explicit either way:
//! [`PrecStack::dispose`] gives every payload still attached back to the
//! caller, [`PrecStack::purge`] destroys them.

use super::symbols::{PrecStackNonTerminal, PrecStackSymbol, PrecTerminal, StackSymbolType};
use crate::ast::{self, init_new_var_node, init_new_var_node_in_base, AstNode, AstNodeType, ExprNode, LiteralType, VarNode};
use crate::error::{CompileError, Result};
use crate::token::Token;
use tracing::{debug, trace, warn};

/// One stack cell
#[derive(Debug)]
pub struct PrecStackNode {
    pub symbol_type: StackSymbolType,
    pub symbol: PrecStackSymbol,
    /// Tag of `node`, `Undefined` when there is none
    pub ast_type: AstNodeType,
    pub node: Option<AstNode>,
}

impl PrecStackNode {
    pub fn is_terminal(&self) -> bool {
        self.symbol_type == StackSymbolType::Terminal
    }

    pub fn is_handle(&self) -> bool {
        self.symbol_type == StackSymbolType::Handle
    }
}

/// Cells and payloads released by a purge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PurgeCount {
    pub cells: usize,
    pub payloads: usize,
}

impl std::ops::AddAssign for PurgeCount {
    fn add_assign(&mut self, other: Self) {
        self.cells += other.cells;
        self.payloads += other.payloads;
    }
}

/// Working stack of one expression
#[derive(Debug, Default)]
pub struct PrecStack {
    cells: Vec<PrecStackNode>,
}

impl PrecStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_terminal(&mut self, symbol: PrecTerminal, ast_type: AstNodeType, node: Option<AstNode>) {
        self.cells.push(PrecStackNode {
            symbol_type: StackSymbolType::Terminal,
            symbol: symbol.into(),
            ast_type,
            node,
        });
    }

    pub fn push_nonterminal(
        &mut self,
        symbol: PrecStackNonTerminal,
        ast_type: AstNodeType,
        node: Option<AstNode>,
    ) {
        self.cells.push(PrecStackNode {
            symbol_type: StackSymbolType::NonTerminal,
            symbol: symbol.into(),
            ast_type,
            node,
        });
    }

    /// Push a terminal together with the AST node its token stands for
    ///
    /// Identifiers become variable nodes and literals become literal nodes;
    /// the token's text is moved into the node. Other terminals carry nothing.
    pub fn push_both_stack_and_ast_node(&mut self, terminal: PrecTerminal, token: &mut Token) -> Result<()> {
        let (node_type, literal_type) = match terminal {
            PrecTerminal::Id => (AstNodeType::Var, LiteralType::NotDefined),
            PrecTerminal::IntLiteral => (AstNodeType::Literal, LiteralType::Int),
            PrecTerminal::FloatLiteral => (AstNodeType::Literal, LiteralType::Float),
            PrecTerminal::StringLiteral => (AstNodeType::Literal, LiteralType::String),
            PrecTerminal::NullLiteral => (AstNodeType::Literal, LiteralType::Null),
            other => {
                self.push_terminal(other, AstNodeType::Undefined, None);
                return Ok(());
            }
        };

        let mut var = VarNode::new(node_type);
        if node_type == AstNodeType::Var {
            let identifier = token
                .take_value()
                .ok_or_else(|| CompileError::internal("identifier token without a name"))?;
            init_new_var_node(&mut var, node_type, Some(identifier), None, literal_type, None)?;
        } else {
            let text = token.take_value();
            init_new_var_node_in_base(&mut var, node_type, None, None, literal_type, text, token.base)?;
        }

        self.push_terminal(terminal, node_type, Some(AstNode::Var(Box::new(var))));
        Ok(())
    }

    /// Insert a handle directly above the topmost terminal
    pub fn push_handle_after_first_terminal(&mut self) -> Result<()> {
        let index = self
            .cells
            .iter()
            .rposition(PrecStackNode::is_terminal)
            .ok_or_else(|| CompileError::internal("no terminal on the precedence stack"))?;
        self.cells.insert(
            index + 1,
            PrecStackNode {
                symbol_type: StackSymbolType::Handle,
                symbol: PrecStackSymbol::Handle,
                ast_type: AstNodeType::Undefined,
                node: None,
            },
        );
        Ok(())
    }

    /// Take the top cell; its payload now belongs to the caller
    pub fn pop(&mut self) -> Option<PrecStackNode> {
        self.cells.pop()
    }

    pub fn top(&self) -> Result<&PrecStackNode> {
        self.cells
            .last()
            .ok_or_else(|| CompileError::internal("top of an empty precedence stack"))
    }

    pub fn top_mut(&mut self) -> Result<&mut PrecStackNode> {
        self.cells
            .last_mut()
            .ok_or_else(|| CompileError::internal("top of an empty precedence stack"))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_id_on_top(&self) -> bool {
        self.cells.last().is_some_and(|cell| {
            cell.is_terminal() && cell.symbol == PrecStackSymbol::Terminal(PrecTerminal::Id)
        })
    }

    /// Nearest terminal below any nonterminals and handles
    pub fn get_top_terminal(&self) -> Result<PrecTerminal> {
        self.cells
            .iter()
            .rev()
            .find(|cell| cell.is_terminal())
            .ok_or_else(|| CompileError::internal("no terminal on the precedence stack"))?
            .symbol
            .to_terminal()
    }

    /// Index of the topmost handle
    pub(super) fn top_handle_index(&self) -> Option<usize> {
        self.cells.iter().rposition(PrecStackNode::is_handle)
    }

    /// Remove and return every cell from `index` up
    pub(super) fn split_off(&mut self, index: usize) -> Vec<PrecStackNode> {
        self.cells.split_off(index)
    }

    /// Take the finished expression off the top
    pub fn get_result(&mut self) -> Result<Box<ExprNode>> {
        let top = self.top()?;
        if top.symbol != PrecStackSymbol::Expression {
            return Err(CompileError::internal(format!(
                "expected an expression on top of the precedence stack, found {}",
                top.symbol
            )));
        }

        let node = self.cells.pop().and_then(|cell| cell.node);
        match node {
            Some(AstNode::Expr(expr)) => Ok(expr),
            Some(other) => {
                let node_type = other.node_type();
                ast::destroy_node(node_type, Some(other))?;
                Err(CompileError::internal(format!(
                    "expression cell holds a {} node",
                    node_type
                )))
            }
            None => Err(CompileError::internal("expression cell without a node")),
        }
    }

    /// Drop every cell and hand back the payloads that were still attached
    pub fn dispose(self) -> Vec<AstNode> {
        self.cells.into_iter().filter_map(|cell| cell.node).collect()
    }

    /// Drop every cell together with its payload
    pub fn purge(&mut self) -> PurgeCount {
        let mut count = PurgeCount::default();
        for cell in self.cells.drain(..) {
            count.cells += 1;
            if cell.node.is_some() {
                count.payloads += 1;
                if let Err(err) = ast::destroy_node(cell.ast_type, cell.node) {
                    warn!(error = %err, "precedence cell tag disagrees with its payload");
                }
            }
        }
        trace!(cells = count.cells, payloads = count.payloads, "precedence stack purged");
        count
    }
}

/// Stack of precedence stacks, one per nested expression context
#[derive(Debug, Default)]
pub struct PrecStackList {
    stacks: Vec<PrecStack>,
}

impl PrecStackList {
    pub fn create() -> Self {
        Self::default()
    }

    /// Open a fresh, empty stack on top
    pub fn push(&mut self) {
        self.stacks.push(PrecStack::new());
        debug!(depth = self.stacks.len(), "precedence stack pushed");
    }

    /// Remove the top stack without touching its payloads
    pub fn pop(&mut self) -> Option<PrecStack> {
        let stack = self.stacks.pop();
        if stack.is_some() {
            debug!(depth = self.stacks.len(), "precedence stack popped");
        }
        stack
    }

    pub fn top_stack(&self) -> Result<&PrecStack> {
        self.stacks
            .last()
            .ok_or_else(|| CompileError::internal("no precedence stack is active"))
    }

    pub fn top_stack_mut(&mut self) -> Result<&mut PrecStack> {
        self.stacks
            .last_mut()
            .ok_or_else(|| CompileError::internal("no precedence stack is active"))
    }

    /// Remove the top stack, destroying everything it still holds
    pub fn purge_current(&mut self) -> PurgeCount {
        match self.stacks.pop() {
            Some(mut stack) => {
                let count = stack.purge();
                debug!(depth = self.stacks.len(), "current precedence stack purged");
                count
            }
            None => PurgeCount::default(),
        }
    }

    /// Remove and destroy every stack
    pub fn purge(&mut self) -> PurgeCount {
        let mut total = PurgeCount::default();
        while let Some(mut stack) = self.stacks.pop() {
            total += stack.purge();
        }
        if total.cells > 0 {
            debug!(cells = total.cells, payloads = total.payloads, "all precedence stacks purged");
        }
        total
    }

    /// Number of open stacks
    pub fn depth(&self) -> usize {
        self.stacks.len()
    }
}
