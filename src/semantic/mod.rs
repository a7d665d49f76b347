//! Scope resolution over a finished AST
//!
//! [`resolve_program`] walks the tree once, replaying the scopes of the
//! program on a [`FrameStack`]:
//! - every function is registered in the global frame first, so calls may
//!   precede definitions
//! - each function body gets a search-stop frame holding its parameters
//! - each `if`/`else` branch and `while` body gets a block frame, which also
//!   holds the `|x|` binding of a nullable condition
//!
//! Along the way every statement is stamped with the frame that was on top,
//! and every variable with the frame that holds it. Code generation later maps
//! these ids back to tables through [`FrameStack::frame`], after the stack has
//! long been unwound.

use crate::ast::{
    ArgOrParamNode, BinOpType, DataType, Expr, ExprNode, FunCallNode, FunDefNode, ProgramNode,
    SiblingList, Statement, StatementNode, VarNode,
};
use crate::constants::DISCARD_IDENTIFIER;
use crate::dstring::DString;
use crate::error::{CompileError, Result};
use crate::frame_stack::builtins::builtin_signature;
use crate::frame_stack::{FrameId, FrameStack};
use crate::symtable::{FunctionData, FunctionParam, SymbolData, SymbolState, SymbolType};
use tracing::debug;

/// Symbol table type for a declared AST type
pub fn symbol_type_of(data_type: DataType) -> SymbolType {
    match data_type {
        DataType::NotDefined => SymbolType::Unknown,
        DataType::Void => SymbolType::Void,
        DataType::Int => SymbolType::Int,
        DataType::IntOrNull => SymbolType::IntOrNull,
        DataType::Float => SymbolType::Double,
        DataType::FloatOrNull => SymbolType::DoubleOrNull,
        DataType::String => SymbolType::String,
        DataType::StringOrNull => SymbolType::StringOrNull,
        DataType::Bool => SymbolType::Bool,
    }
}

/// Resolve every identifier of `program` against `frames`
///
/// `frames` must be initialized with the global frame on top; it is left in
/// the same state on success.
pub fn resolve_program(program: &mut ProgramNode, frames: &mut FrameStack) -> Result<()> {
    let mut resolver = Resolver { frames };
    resolver.register_functions(program.function_list.as_deref())?;

    let mut current = program.function_list.as_deref_mut();
    while let Some(fun) = current {
        resolver.function(fun)?;
        current = fun.next.as_deref_mut();
    }

    debug!(frames = resolver.frames.frame_count(), "program resolved");
    Ok(())
}

/// Variables that were declared but never read, with the frame declaring them
///
/// Frames stay in the arena after they are popped, so this can run after
/// [`resolve_program`] finished. Parameters count as variables.
pub fn unused_variables(frames: &FrameStack) -> Vec<(FrameId, DString)> {
    let mut unused = Vec::new();
    for id in 0..frames.frame_count() {
        if let Some(frame) = frames.frame(id) {
            for key in frame.table.unused_variables() {
                unused.push((id, key.clone()));
            }
        }
    }
    unused
}

struct Resolver<'f> {
    frames: &'f mut FrameStack,
}

impl Resolver<'_> {
    fn register_functions(&mut self, list: Option<&FunDefNode>) -> Result<()> {
        let Some(head) = list else {
            return Ok(());
        };

        for fun in head.iter() {
            let name = name_of(&fun.identifier, "function definition")?;
            let mut data = FunctionData {
                params: Vec::new(),
                return_type: symbol_type_of(fun.return_type),
            };
            if let Some(params) = &fun.parameters {
                for param in params.iter() {
                    data.params.push(FunctionParam {
                        id: param_name(param).cloned(),
                        param_type: symbol_type_of(param.data_type),
                    });
                }
            }

            let name = name.to_string_lossy().into_owned();
            self.frames.add_function(&name, data)?;
        }
        Ok(())
    }

    fn function(&mut self, fun: &mut FunDefNode) -> Result<()> {
        let frame_id = self.frames.push(true)?;
        debug!(function = %identifier_text(&fun.identifier), frame_id, "resolving function");

        let mut param = fun.parameters.as_deref_mut();
        while let Some(node) = param {
            self.parameter(node)?;
            param = node.next.as_deref_mut();
        }

        self.block(fun.body.as_deref_mut())?;
        self.frames.pop()?;
        Ok(())
    }

    fn parameter(&mut self, node: &mut ArgOrParamNode) -> Result<()> {
        let state = SymbolState::Variable(symbol_type_of(node.data_type));
        let var = match node.expression.as_deref_mut().and_then(|e| e.expression.as_mut()) {
            Some(Expr::Variable(var)) => var,
            _ => return Err(CompileError::internal("parameter is not a variable")),
        };
        self.declare(var, state, true)
    }

    fn block(&mut self, list: Option<&mut StatementNode>) -> Result<()> {
        let mut current = list;
        while let Some(stmt) = current {
            self.statement(stmt)?;
            current = stmt.next.as_deref_mut();
        }
        Ok(())
    }

    fn statement(&mut self, stmt: &mut StatementNode) -> Result<()> {
        stmt.frame_id = self.frames.top_id();

        match stmt.statement.as_mut() {
            None => Err(CompileError::internal("statement without a payload")),
            Some(Statement::VarDef(expr)) => self.var_def(expr),
            Some(Statement::Expr(expr)) => self.expression_statement(expr),
            Some(Statement::FunCall(call)) => self.call(call),
            Some(Statement::Return(expr)) => match expr {
                Some(expr) => self.expr(expr),
                None => Ok(()),
            },
            Some(Statement::If(node)) => {
                if let Some(condition) = node.condition.as_deref_mut() {
                    self.expr(condition)?;
                }
                self.frames.push(false)?;
                if let Some(binding) = node.null_condition.as_deref_mut() {
                    self.declare(binding, SymbolState::Variable(SymbolType::Unknown), true)?;
                }
                self.block(node.then_branch.as_deref_mut())?;
                self.frames.pop()?;

                if node.else_branch.is_some() {
                    self.frames.push(false)?;
                    self.block(node.else_branch.as_deref_mut())?;
                    self.frames.pop()?;
                }
                Ok(())
            }
            Some(Statement::While(node)) => {
                if let Some(condition) = node.condition.as_deref_mut() {
                    self.expr(condition)?;
                }
                self.frames.push(false)?;
                if let Some(binding) = node.null_condition.as_deref_mut() {
                    self.declare(binding, SymbolState::Variable(SymbolType::Unknown), true)?;
                }
                self.block(node.body.as_deref_mut())?;
                self.frames.pop()?;
                Ok(())
            }
        }
    }

    /// `const x = e` / `var x = e`: the value is resolved before `x` exists
    fn var_def(&mut self, expr: &mut ExprNode) -> Result<()> {
        let Some(Expr::BinaryOp(bin)) = expr.expression.as_mut() else {
            return Err(CompileError::internal("variable definition is not an assignment"));
        };
        if bin.op != BinOpType::Assignment {
            return Err(CompileError::internal("variable definition is not an assignment"));
        }

        if let Some(value) = bin.right.as_deref_mut() {
            self.expr(value)?;
        }
        match bin.left.as_deref_mut().and_then(|e| e.expression.as_mut()) {
            Some(Expr::Variable(var)) => {
                self.declare(var, SymbolState::Variable(SymbolType::Unknown), false)
            }
            _ => Err(CompileError::internal("variable definition without a target")),
        }
    }

    /// Assignments write their target; everything else is evaluated
    fn expression_statement(&mut self, expr: &mut ExprNode) -> Result<()> {
        let Some(Expr::BinaryOp(bin)) = expr.expression.as_mut() else {
            return self.expr(expr);
        };
        if bin.op != BinOpType::Assignment {
            return self.expr(expr);
        }

        if let Some(value) = bin.right.as_deref_mut() {
            self.expr(value)?;
        }
        match bin.left.as_deref_mut().and_then(|e| e.expression.as_mut()) {
            Some(Expr::Variable(var)) => self.assign(var),
            _ => Err(CompileError::semantic_other("left side of an assignment is not a variable")),
        }
    }

    fn expr(&mut self, expr: &mut ExprNode) -> Result<()> {
        match expr.expression.as_mut() {
            None => Err(CompileError::internal("expression without a payload")),
            Some(Expr::Literal(_)) => Ok(()),
            Some(Expr::Variable(var)) => self.reference(var),
            Some(Expr::FunCall(call)) => self.call(call),
            Some(Expr::BinaryOp(bin)) => {
                if let Some(left) = bin.left.as_deref_mut() {
                    self.expr(left)?;
                }
                if let Some(right) = bin.right.as_deref_mut() {
                    self.expr(right)?;
                }
                Ok(())
            }
        }
    }

    fn call(&mut self, call: &mut FunCallNode) -> Result<()> {
        let name = name_of(&call.identifier, "function call")?;

        if call.is_builtin {
            let name = name.to_string_lossy();
            if builtin_signature(&name).is_none() {
                return Err(CompileError::undefined(format!("ifj.{}", name)));
            }
        } else {
            let item = self.frames.find_item_mut(name)?;
            if !item.is_function() {
                return Err(CompileError::semantic_other(format!(
                    "'{}' is not a function",
                    name
                )));
            }
            item.used = true;
        }

        let mut arg = call.arguments.as_deref_mut();
        while let Some(node) = arg {
            if let Some(expr) = node.expression.as_deref_mut() {
                self.expr(expr)?;
            }
            arg = node.next.as_deref_mut();
        }
        Ok(())
    }

    /// Read of a variable
    fn reference(&mut self, var: &mut VarNode) -> Result<()> {
        let name = name_of(&var.identifier, "variable")?;
        let item = self.frames.find_item_mut(name)?;
        if item.is_function() {
            return Err(CompileError::semantic_other(format!(
                "function '{}' used as a value",
                name
            )));
        }
        item.used = true;
        var.frame_id = self.frames.get_id(name);
        Ok(())
    }

    /// Write of a variable; `_` discards the value
    fn assign(&mut self, var: &mut VarNode) -> Result<()> {
        if DString::compare_with_literal(var.identifier.as_ref(), DISCARD_IDENTIFIER) {
            return Ok(());
        }

        let name = name_of(&var.identifier, "variable")?;
        let item = self.frames.find_item_mut(name)?;
        if !item.is_variable() {
            return Err(CompileError::semantic_other(format!(
                "'{}' cannot be assigned to",
                name
            )));
        }
        item.changed = true;
        var.frame_id = self.frames.get_id(name);
        Ok(())
    }

    fn declare(&mut self, var: &mut VarNode, state: SymbolState, constant: bool) -> Result<()> {
        let name = name_of(&var.identifier, "variable")?;
        self.frames
            .add_item_express(name, state, constant, SymbolData::None)?;
        var.frame_id = self.frames.top_id();
        Ok(())
    }
}

fn name_of<'a>(identifier: &'a Option<DString>, what: &str) -> Result<&'a DString> {
    identifier
        .as_ref()
        .ok_or_else(|| CompileError::internal(format!("{} without an identifier", what)))
}

fn param_name(param: &ArgOrParamNode) -> Option<&DString> {
    match param.expression.as_deref().and_then(|e| e.expression.as_ref()) {
        Some(Expr::Variable(var)) => var.identifier.as_ref(),
        _ => None,
    }
}

fn identifier_text(identifier: &Option<DString>) -> String {
    identifier
        .as_ref()
        .map_or_else(|| "?".to_string(), |name| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstNodeType, BinOpNode, IfNode, LiteralType, LiteralValue};

    fn variable(name: &str) -> Box<ExprNode> {
        let mut var = VarNode::new(AstNodeType::Var);
        var.identifier = Some(DString::from(name));
        ExprNode::from_expr(Expr::Variable(Box::new(var)))
    }

    fn int(n: i32) -> Box<ExprNode> {
        let mut var = VarNode::new(AstNodeType::Literal);
        var.literal_type = LiteralType::Int;
        var.value = LiteralValue::Int(n);
        ExprNode::from_expr(Expr::Literal(Box::new(var)))
    }

    fn assignment(target: &str, value: Box<ExprNode>) -> Box<ExprNode> {
        let mut bin = BinOpNode::default();
        bin.op = BinOpType::Assignment;
        bin.left = Some(variable(target));
        bin.right = Some(value);
        ExprNode::from_expr(Expr::BinaryOp(Box::new(bin)))
    }

    fn statements(list: Vec<Statement>) -> Option<Box<StatementNode>> {
        let mut head: Option<Box<StatementNode>> = None;
        for statement in list.into_iter().rev() {
            let mut node = Box::new(StatementNode::default());
            node.statement = Some(statement);
            node.next = head;
            head = Some(node);
        }
        head
    }

    fn function(name: &str, params: &[&str], body: Vec<Statement>) -> Box<FunDefNode> {
        let mut fun = Box::new(FunDefNode::default());
        fun.identifier = Some(DString::from(name));
        fun.return_type = DataType::Void;
        for param in params.iter().rev() {
            let mut node = Box::new(ArgOrParamNode::default());
            node.data_type = DataType::Int;
            node.expression = Some(variable(param));
            node.next = fun.parameters.take();
            fun.parameters = Some(node);
        }
        fun.body = statements(body);
        fun
    }

    fn program(functions: Vec<Box<FunDefNode>>) -> ProgramNode {
        let mut program = ProgramNode::default();
        for mut fun in functions.into_iter().rev() {
            fun.next = program.function_list.take();
            program.function_list = Some(fun);
        }
        program
    }

    fn active_frames() -> FrameStack {
        let mut frames = FrameStack::new();
        frames.init().expect("Frame stack init failed");
        frames
    }

    fn var_frame(expr: &ExprNode) -> Option<FrameId> {
        match &expr.expression {
            Some(Expr::Variable(var)) => var.frame_id,
            _ => None,
        }
    }

    #[test]
    fn test_stamps_frames() {
        // fn main(a) { var x = a; if (x) { x = 1; } }
        let mut if_node = IfNode::default();
        if_node.condition = Some(variable("x"));
        if_node.then_branch = statements(vec![Statement::Expr(assignment("x", int(1)))]);

        let mut prog = program(vec![function(
            "main",
            &["a"],
            vec![
                Statement::VarDef(assignment("x", variable("a"))),
                Statement::If(Box::new(if_node)),
            ],
        )]);
        let mut frames = active_frames();
        resolve_program(&mut prog, &mut frames).expect("Resolution failed");

        let fun = prog.function_list.as_deref().unwrap();
        let first = fun.body.as_deref().unwrap();
        assert_eq!(first.frame_id, Some(1));

        let Some(Statement::If(if_node)) = &first.next.as_ref().unwrap().statement else {
            panic!("expected an if");
        };
        let then = if_node.then_branch.as_deref().unwrap();
        assert_eq!(then.frame_id, Some(2));
        let Some(Statement::Expr(assign)) = &then.statement else {
            panic!("expected an assignment");
        };
        let Some(Expr::BinaryOp(bin)) = &assign.expression else {
            panic!("expected a binary operation");
        };
        // x lives in the function frame, not in the branch frame
        assert_eq!(var_frame(bin.left.as_deref().unwrap()), Some(1));

        assert_eq!(frames.top_id(), Some(0));
        assert!(frames.frame(1).unwrap().table.find_item("x").unwrap().used);
    }

    #[test]
    fn test_undefined_variable() {
        let mut prog = program(vec![function(
            "main",
            &[],
            vec![Statement::Return(Some(variable("ghost")))],
        )]);
        let err = resolve_program(&mut prog, &mut active_frames()).unwrap_err();
        assert_eq!(err, CompileError::undefined("ghost"));
    }

    #[test]
    fn test_redefinitions() {
        let mut prog = program(vec![function("f", &[], vec![]), function("f", &[], vec![])]);
        let err = resolve_program(&mut prog, &mut active_frames()).unwrap_err();
        assert_eq!(err, CompileError::redefinition("f"));

        // No shadowing of a parameter
        let mut prog = program(vec![function(
            "g",
            &["a"],
            vec![Statement::VarDef(assignment("a", int(1)))],
        )]);
        let err = resolve_program(&mut prog, &mut active_frames()).unwrap_err();
        assert_eq!(err, CompileError::redefinition("a"));
    }

    #[test]
    fn test_calls() {
        let mut call = FunCallNode::default();
        call.identifier = Some(DString::from("helper"));
        let mut write = FunCallNode::default();
        write.identifier = Some(DString::from("write"));
        write.is_builtin = true;

        // main calls helper, which is defined after it
        let mut prog = program(vec![
            function(
                "main",
                &[],
                vec![
                    Statement::FunCall(Box::new(call)),
                    Statement::FunCall(Box::new(write)),
                ],
            ),
            function("helper", &[], vec![]),
        ]);
        let mut frames = active_frames();
        resolve_program(&mut prog, &mut frames).expect("Resolution failed");
        assert!(frames.find_item("helper").unwrap().used);

        let mut bogus = FunCallNode::default();
        bogus.identifier = Some(DString::from("printf"));
        bogus.is_builtin = true;
        let mut prog = program(vec![function(
            "main",
            &[],
            vec![Statement::FunCall(Box::new(bogus))],
        )]);
        let err = resolve_program(&mut prog, &mut active_frames()).unwrap_err();
        assert_eq!(err, CompileError::undefined("ifj.printf"));
    }

    #[test]
    fn test_discard_and_unused() {
        let mut prog = program(vec![function(
            "main",
            &["p"],
            vec![
                Statement::VarDef(assignment("unused", int(1))),
                Statement::Expr(assignment("_", variable("p"))),
            ],
        )]);
        let mut frames = active_frames();
        resolve_program(&mut prog, &mut frames).expect("Resolution failed");

        let unused = unused_variables(&frames);
        assert_eq!(unused, vec![(1, DString::from("unused"))]);
    }

    #[test]
    fn test_null_binding_is_scoped_to_branch() {
        // fn main(a) { if (a) |v| { } return v; }
        let mut if_node = IfNode::default();
        if_node.condition = Some(variable("a"));
        let mut binding = VarNode::new(AstNodeType::Var);
        binding.identifier = Some(DString::from("v"));
        if_node.null_condition = Some(Box::new(binding));

        let mut prog = program(vec![function(
            "main",
            &["a"],
            vec![
                Statement::If(Box::new(if_node)),
                Statement::Return(Some(variable("v"))),
            ],
        )]);
        let err = resolve_program(&mut prog, &mut active_frames()).unwrap_err();
        assert_eq!(err, CompileError::undefined("v"));
    }

    #[test]
    fn test_identifier_text() {
        assert_eq!(identifier_text(&Some(DString::from("main"))), "main");
        assert_eq!(identifier_text(&None), "?");
    }
}
