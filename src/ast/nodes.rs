//! AST node definitions
//!
//! Every node category is its own struct. Categories with several shapes
//! ([`Statement`], [`Expr`], [`LiteralValue`]) are sum types, so a payload can
//! never disagree with its tag. Sibling sequences (functions, parameters,
//! statements) are intrusive singly linked chains through `next`.

use crate::dstring::DString;
use crate::frame_stack::FrameId;
use std::fmt;

/// Node type tags used at the generic seams (`create_node`, `destroy_node`,
/// precedence stack cells)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AstNodeType {
    Program,
    FunDef,
    ArgOrParam,
    Statement,
    FunCall,
    If,
    While,
    Expr,
    BinOp,
    Var,
    Literal,
    #[default]
    Undefined,
}

impl fmt::Display for AstNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AstNodeType::Program => "program",
            AstNodeType::FunDef => "function definition",
            AstNodeType::ArgOrParam => "argument or parameter",
            AstNodeType::Statement => "statement",
            AstNodeType::FunCall => "function call",
            AstNodeType::If => "if",
            AstNodeType::While => "while",
            AstNodeType::Expr => "expression",
            AstNodeType::BinOp => "binary operation",
            AstNodeType::Var => "variable",
            AstNodeType::Literal => "literal",
            AstNodeType::Undefined => "undefined",
        };
        write!(f, "{}", name)
    }
}

/// Declared types of parameters, return values and variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    #[default]
    NotDefined,
    Void,
    Int,
    IntOrNull,
    Float,
    FloatOrNull,
    String,
    StringOrNull,
    Bool,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::NotDefined => "not defined",
            DataType::Void => "void",
            DataType::Int => "i32",
            DataType::IntOrNull => "?i32",
            DataType::Float => "f64",
            DataType::FloatOrNull => "?f64",
            DataType::String => "[]u8",
            DataType::StringOrNull => "?[]u8",
            DataType::Bool => "bool",
        };
        write!(f, "{}", name)
    }
}

/// Kind of literal a [`VarNode`] holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiteralType {
    #[default]
    NotDefined,
    Int,
    Float,
    String,
    Null,
    /// Pseudo literal: the result type of a relational expression
    Bool,
}

/// Materialized literal value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LiteralValue {
    Int(i32),
    Float(f64),
    Str(DString),
    Null,
    Bool,
    #[default]
    Undefined,
}

/// Binary operators, including assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinOpType {
    #[default]
    NotDefined,
    Assignment,
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
}

impl BinOpType {
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinOpType::Equal
                | BinOpType::NotEqual
                | BinOpType::LessThan
                | BinOpType::GreaterThan
                | BinOpType::LessEqual
                | BinOpType::GreaterEqual
        )
    }
}

impl fmt::Display for BinOpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            BinOpType::NotDefined => "?",
            BinOpType::Assignment => "=",
            BinOpType::Add => "+",
            BinOpType::Sub => "-",
            BinOpType::Mul => "*",
            BinOpType::Div => "/",
            BinOpType::Equal => "==",
            BinOpType::NotEqual => "!=",
            BinOpType::LessThan => "<",
            BinOpType::GreaterThan => ">",
            BinOpType::LessEqual => "<=",
            BinOpType::GreaterEqual => ">=",
        };
        write!(f, "{}", op)
    }
}

/// Statement discriminant, derived from the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    NotDefined,
    VarDef,
    Expr,
    FunCall,
    If,
    While,
    Return,
}

/// Expression discriminant, derived from the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprType {
    NotDefined,
    Literal,
    Variable,
    FunCall,
    BinOp,
}

/// Root of the tree
#[derive(Debug, Default)]
pub struct ProgramNode {
    /// Variable bound by `const ifj = @import("ifj24.zig")`
    pub imported_file: Option<Box<VarNode>>,
    pub function_list: Option<Box<FunDefNode>>,
}

/// Function definition, linked to the next one in the program
#[derive(Debug, Default)]
pub struct FunDefNode {
    pub identifier: Option<DString>,
    pub parameters: Option<Box<ArgOrParamNode>>,
    pub return_type: DataType,
    pub body: Option<Box<StatementNode>>,
    pub next: Option<Box<FunDefNode>>,
}

/// Function parameter (declared type, variable as expression) or call argument
#[derive(Debug, Default)]
pub struct ArgOrParamNode {
    pub data_type: DataType,
    pub expression: Option<Box<ExprNode>>,
    pub next: Option<Box<ArgOrParamNode>>,
}

/// Statement payloads
#[derive(Debug)]
pub enum Statement {
    /// `const x = e` / `var x = e`, an assignment whose left side is the new variable
    VarDef(Box<ExprNode>),
    Expr(Box<ExprNode>),
    FunCall(Box<FunCallNode>),
    If(Box<IfNode>),
    While(Box<WhileNode>),
    Return(Option<Box<ExprNode>>),
}

impl Statement {
    pub fn statement_type(&self) -> StatementType {
        match self {
            Statement::VarDef(_) => StatementType::VarDef,
            Statement::Expr(_) => StatementType::Expr,
            Statement::FunCall(_) => StatementType::FunCall,
            Statement::If(_) => StatementType::If,
            Statement::While(_) => StatementType::While,
            Statement::Return(_) => StatementType::Return,
        }
    }
}

/// One statement of a block, linked to the next one
#[derive(Debug, Default)]
pub struct StatementNode {
    /// Frame that was on top when the statement was analyzed
    pub frame_id: Option<FrameId>,
    pub statement: Option<Statement>,
    pub next: Option<Box<StatementNode>>,
}

impl StatementNode {
    pub fn statement_type(&self) -> StatementType {
        self.statement
            .as_ref()
            .map_or(StatementType::NotDefined, Statement::statement_type)
    }
}

/// Call of a user function or a built-in
#[derive(Debug, Default)]
pub struct FunCallNode {
    /// Name without the namespace prefix
    pub identifier: Option<DString>,
    pub is_builtin: bool,
    pub arguments: Option<Box<ArgOrParamNode>>,
}

#[derive(Debug, Default)]
pub struct IfNode {
    pub condition: Option<Box<ExprNode>>,
    /// `|x|` binding of a nullable condition
    pub null_condition: Option<Box<VarNode>>,
    pub then_branch: Option<Box<StatementNode>>,
    pub else_branch: Option<Box<StatementNode>>,
}

#[derive(Debug, Default)]
pub struct WhileNode {
    pub condition: Option<Box<ExprNode>>,
    pub null_condition: Option<Box<VarNode>>,
    pub body: Option<Box<StatementNode>>,
}

/// Expression payloads
#[derive(Debug)]
pub enum Expr {
    Literal(Box<VarNode>),
    Variable(Box<VarNode>),
    FunCall(Box<FunCallNode>),
    BinaryOp(Box<BinOpNode>),
}

impl Expr {
    pub fn expr_type(&self) -> ExprType {
        match self {
            Expr::Literal(_) => ExprType::Literal,
            Expr::Variable(_) => ExprType::Variable,
            Expr::FunCall(_) => ExprType::FunCall,
            Expr::BinaryOp(_) => ExprType::BinOp,
        }
    }
}

#[derive(Debug, Default)]
pub struct ExprNode {
    pub expression: Option<Expr>,
}

impl ExprNode {
    pub fn expr_type(&self) -> ExprType {
        self.expression
            .as_ref()
            .map_or(ExprType::NotDefined, Expr::expr_type)
    }

    /// Wrap an already-built payload
    pub fn from_expr(expr: Expr) -> Box<Self> {
        Box::new(ExprNode {
            expression: Some(expr),
        })
    }
}

#[derive(Debug, Default)]
pub struct BinOpNode {
    pub op: BinOpType,
    pub left: Option<Box<ExprNode>>,
    pub right: Option<Box<ExprNode>>,
}

/// Variable reference or literal
#[derive(Debug, Clone, PartialEq)]
pub struct VarNode {
    /// `Var` or `Literal`
    pub node_type: AstNodeType,
    pub identifier: Option<DString>,
    /// Frame holding the variable, stamped by semantic analysis
    pub frame_id: Option<FrameId>,
    pub literal_type: LiteralType,
    pub value: LiteralValue,
}

impl VarNode {
    pub fn new(node_type: AstNodeType) -> Self {
        VarNode {
            node_type,
            identifier: None,
            frame_id: None,
            literal_type: LiteralType::NotDefined,
            value: LiteralValue::Undefined,
        }
    }

    pub fn is_literal(&self) -> bool {
        self.node_type == AstNodeType::Literal
    }
}

/// Intrusive singly linked sibling chain
pub trait SiblingList: Sized {
    fn next_node(&self) -> Option<&Self>;
    fn next_slot(&mut self) -> &mut Option<Box<Self>>;

    /// This node followed by all its successors
    fn iter(&self) -> SiblingIter<'_, Self> {
        SiblingIter {
            current: Some(self),
        }
    }

    /// Number of nodes from this one to the end of the chain
    fn len(&self) -> usize {
        self.iter().count()
    }

    /// Link `node` after the last node of the chain
    fn append(&mut self, node: Box<Self>) {
        let mut slot = self.next_slot();
        while let Some(current) = slot {
            slot = current.next_slot();
        }
        *slot = Some(node);
    }
}

pub struct SiblingIter<'a, T> {
    current: Option<&'a T>,
}

impl<'a, T: SiblingList> Iterator for SiblingIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.current?;
        self.current = node.next_node();
        Some(node)
    }
}

impl SiblingList for FunDefNode {
    fn next_node(&self) -> Option<&Self> {
        self.next.as_deref()
    }

    fn next_slot(&mut self) -> &mut Option<Box<Self>> {
        &mut self.next
    }
}

impl SiblingList for ArgOrParamNode {
    fn next_node(&self) -> Option<&Self> {
        self.next.as_deref()
    }

    fn next_slot(&mut self) -> &mut Option<Box<Self>> {
        &mut self.next
    }
}

impl SiblingList for StatementNode {
    fn next_node(&self) -> Option<&Self> {
        self.next.as_deref()
    }

    fn next_slot(&mut self) -> &mut Option<Box<Self>> {
        &mut self.next
    }
}

// Chains are unlinked one node at a time; a recursive drop would grow the
// call stack with the length of the chain.

impl Drop for FunDefNode {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

impl Drop for ArgOrParamNode {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

impl Drop for StatementNode {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

/// Any node, as carried across the generic seams
#[derive(Debug)]
pub enum AstNode {
    Program(Box<ProgramNode>),
    FunDef(Box<FunDefNode>),
    ArgOrParam(Box<ArgOrParamNode>),
    Statement(Box<StatementNode>),
    FunCall(Box<FunCallNode>),
    If(Box<IfNode>),
    While(Box<WhileNode>),
    Expr(Box<ExprNode>),
    BinOp(Box<BinOpNode>),
    /// Variable or literal, see [`VarNode::node_type`]
    Var(Box<VarNode>),
}

impl AstNode {
    /// Tag stored in the node itself
    pub fn node_type(&self) -> AstNodeType {
        match self {
            AstNode::Program(_) => AstNodeType::Program,
            AstNode::FunDef(_) => AstNodeType::FunDef,
            AstNode::ArgOrParam(_) => AstNodeType::ArgOrParam,
            AstNode::Statement(_) => AstNodeType::Statement,
            AstNode::FunCall(_) => AstNodeType::FunCall,
            AstNode::If(_) => AstNodeType::If,
            AstNode::While(_) => AstNodeType::While,
            AstNode::Expr(_) => AstNodeType::Expr,
            AstNode::BinOp(_) => AstNodeType::BinOp,
            AstNode::Var(var) => var.node_type,
        }
    }

    pub fn into_expr(self) -> Option<Box<ExprNode>> {
        match self {
            AstNode::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn into_var(self) -> Option<Box<VarNode>> {
        match self {
            AstNode::Var(var) => Some(var),
            _ => None,
        }
    }

    pub fn into_arg_or_param(self) -> Option<Box<ArgOrParamNode>> {
        match self {
            AstNode::ArgOrParam(arg) => Some(arg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement_chain(len: usize) -> Box<StatementNode> {
        let mut head = Box::new(StatementNode::default());
        for _ in 1..len {
            let mut node = Box::new(StatementNode::default());
            node.next = Some(head);
            head = node;
        }
        head
    }

    #[test]
    fn test_append_and_len() {
        let mut head = Box::new(ArgOrParamNode::default());
        for data_type in [DataType::Int, DataType::Float] {
            let mut node = Box::new(ArgOrParamNode::default());
            node.data_type = data_type;
            head.append(node);
        }

        assert_eq!(head.len(), 3);
        let types: Vec<DataType> = head.iter().map(|n| n.data_type).collect();
        assert_eq!(
            types,
            vec![DataType::NotDefined, DataType::Int, DataType::Float]
        );
    }

    #[test]
    fn test_long_chain_drops_without_recursion() {
        let head = statement_chain(200_000);
        assert_eq!(head.len(), 200_000);
        drop(head);
    }

    #[test]
    fn test_stored_tags() {
        let literal = AstNode::Var(Box::new(VarNode::new(AstNodeType::Literal)));
        assert_eq!(literal.node_type(), AstNodeType::Literal);

        let mut stmt = StatementNode::default();
        stmt.statement = Some(Statement::Return(None));
        assert_eq!(stmt.statement_type(), StatementType::Return);
        assert_eq!(ExprNode::default().expr_type(), ExprType::NotDefined);
    }
}
