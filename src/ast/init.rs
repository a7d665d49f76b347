//! Strict constructors for freshly created nodes
//!
//! Each `init_new_*` fills a node returned by `create_node` (or `Default`).
//! A node that already carries any resource is rejected with an internal
//! error and left untouched; initializing a node twice is a bug in the caller.

use super::literal::materialize;
use super::nodes::*;
use crate::constants::INT_CONVERSION_BASE;
use crate::dstring::DString;
use crate::error::{CompileError, Result};
use crate::frame_stack::FrameId;

fn already_initialized(what: &str) -> CompileError {
    CompileError::internal(format!("{} node is already initialized", what))
}

pub fn init_new_fun_def_node(
    node: &mut FunDefNode,
    identifier: DString,
    parameters: Option<Box<ArgOrParamNode>>,
    return_type: DataType,
    body: Option<Box<StatementNode>>,
) -> Result<()> {
    if node.identifier.is_some()
        || node.parameters.is_some()
        || node.return_type != DataType::NotDefined
        || node.body.is_some()
        || node.next.is_some()
    {
        return Err(already_initialized("function definition"));
    }

    node.identifier = Some(identifier);
    node.parameters = parameters;
    node.return_type = return_type;
    node.body = body;
    Ok(())
}

pub fn init_new_arg_or_param_node(
    node: &mut ArgOrParamNode,
    data_type: DataType,
    expression: Box<ExprNode>,
) -> Result<()> {
    if node.expression.is_some() || node.next.is_some() {
        return Err(already_initialized("argument"));
    }

    node.data_type = data_type;
    node.expression = Some(expression);
    Ok(())
}

pub fn init_new_statement_node(
    node: &mut StatementNode,
    frame_id: FrameId,
    statement: Statement,
) -> Result<()> {
    if node.statement.is_some() || node.next.is_some() {
        return Err(already_initialized("statement"));
    }

    node.frame_id = Some(frame_id);
    node.statement = Some(statement);
    Ok(())
}

pub fn init_new_fun_call_node(
    node: &mut FunCallNode,
    identifier: DString,
    is_builtin: bool,
    arguments: Option<Box<ArgOrParamNode>>,
) -> Result<()> {
    if node.identifier.is_some() || node.arguments.is_some() {
        return Err(already_initialized("function call"));
    }

    node.identifier = Some(identifier);
    node.is_builtin = is_builtin;
    node.arguments = arguments;
    Ok(())
}

pub fn init_new_if_node(
    node: &mut IfNode,
    condition: Box<ExprNode>,
    null_condition: Option<Box<VarNode>>,
    then_branch: Option<Box<StatementNode>>,
    else_branch: Option<Box<StatementNode>>,
) -> Result<()> {
    if node.condition.is_some()
        || node.null_condition.is_some()
        || node.then_branch.is_some()
        || node.else_branch.is_some()
    {
        return Err(already_initialized("if"));
    }

    node.condition = Some(condition);
    node.null_condition = null_condition;
    node.then_branch = then_branch;
    node.else_branch = else_branch;
    Ok(())
}

pub fn init_new_while_node(
    node: &mut WhileNode,
    condition: Box<ExprNode>,
    null_condition: Option<Box<VarNode>>,
    body: Option<Box<StatementNode>>,
) -> Result<()> {
    if node.condition.is_some() || node.null_condition.is_some() || node.body.is_some() {
        return Err(already_initialized("while"));
    }

    node.condition = Some(condition);
    node.null_condition = null_condition;
    node.body = body;
    Ok(())
}

pub fn init_new_expr_node(node: &mut ExprNode, expression: Expr) -> Result<()> {
    if node.expression.is_some() {
        return Err(already_initialized("expression"));
    }

    node.expression = Some(expression);
    Ok(())
}

pub fn init_new_bin_op_node(
    node: &mut BinOpNode,
    op: BinOpType,
    left: Box<ExprNode>,
    right: Box<ExprNode>,
) -> Result<()> {
    if node.left.is_some() || node.right.is_some() {
        return Err(already_initialized("binary operation"));
    }

    node.op = op;
    node.left = Some(left);
    node.right = Some(right);
    Ok(())
}

/// Fill a variable or literal node
///
/// `value` is the raw token text. Numeric text is converted (and may fail
/// with an out-of-range error); string text is moved into the node.
pub fn init_new_var_node(
    node: &mut VarNode,
    node_type: AstNodeType,
    identifier: Option<DString>,
    frame_id: Option<FrameId>,
    literal_type: LiteralType,
    value: Option<DString>,
) -> Result<()> {
    init_new_var_node_in_base(
        node,
        node_type,
        identifier,
        frame_id,
        literal_type,
        value,
        INT_CONVERSION_BASE,
    )
}

/// [`init_new_var_node`] for integer text written in `base`
pub fn init_new_var_node_in_base(
    node: &mut VarNode,
    node_type: AstNodeType,
    identifier: Option<DString>,
    frame_id: Option<FrameId>,
    literal_type: LiteralType,
    value: Option<DString>,
    base: u32,
) -> Result<()> {
    if node.identifier.is_some() || node.value != LiteralValue::Undefined {
        return Err(already_initialized("variable"));
    }
    if !matches!(node_type, AstNodeType::Var | AstNodeType::Literal) {
        return Err(CompileError::internal(format!(
            "cannot initialize a variable node as {}",
            node_type
        )));
    }

    let value = materialize(literal_type, value, base)?;

    node.node_type = node_type;
    node.identifier = identifier;
    node.frame_id = frame_id;
    node.literal_type = literal_type;
    node.value = value;
    Ok(())
}
