//! Box-drawing dump of an AST, for diagnostics and tests
//!
//! ```text
//! Program Node
//! └── Function Definition: main
//!     ├── Return Type: void
//!     └── Body
//!         └── Statement [frame 1]: return
//!             └── Binary Operation: +
//!                 ├── Variable: a [frame 1]
//!                 └── Literal: i32 10
//! ```

use super::nodes::*;
use std::fmt::{self, Write};

/// Dump any node and everything it owns
pub fn print_tree<W: Write>(node: &AstNode, out: &mut W) -> fmt::Result {
    let mut printer = Printer { out };
    match node {
        AstNode::Program(n) => printer.program(n),
        AstNode::FunDef(n) => printer.fun_def(n, "", None),
        AstNode::ArgOrParam(n) => printer.arg_list(n, ""),
        AstNode::Statement(n) => printer.statement_list(n, ""),
        AstNode::FunCall(n) => printer.fun_call(n, "", None),
        AstNode::If(n) => printer.if_node(n, "", None),
        AstNode::While(n) => printer.while_node(n, "", None),
        AstNode::Expr(n) => printer.expr(n, "", None),
        AstNode::BinOp(n) => printer.bin_op(n, "", None),
        AstNode::Var(n) => printer.var(n, "", None),
    }
}

/// Dump a whole program into a string
pub fn program_to_string(program: &ProgramNode) -> String {
    let mut out = String::new();
    let mut printer = Printer { out: &mut out };
    // Writing into a String cannot fail
    let _ = printer.program(program);
    out
}

struct Printer<'w, W: Write> {
    out: &'w mut W,
}

impl<W: Write> Printer<'_, W> {
    /// Write one line and return the prefix for its children
    ///
    /// `last` is `None` for the root of the dump.
    fn line(&mut self, prefix: &str, last: Option<bool>, label: &str) -> Result<String, fmt::Error> {
        match last {
            None => {
                writeln!(self.out, "{}", label)?;
                Ok(String::new())
            }
            Some(last) => {
                let connector = if last { "└── " } else { "├── " };
                writeln!(self.out, "{}{}{}", prefix, connector, label)?;
                let indent = if last { "    " } else { "│   " };
                Ok(format!("{}{}", prefix, indent))
            }
        }
    }

    fn program(&mut self, node: &ProgramNode) -> fmt::Result {
        let prefix = self.line("", None, "Program Node")?;
        let has_functions = node.function_list.is_some();

        if let Some(import) = &node.imported_file {
            let child = self.line(&prefix, Some(!has_functions), "Imported File")?;
            self.var(import, &child, Some(true))?;
        }
        if let Some(functions) = &node.function_list {
            let count = functions.len();
            for (i, fun) in functions.iter().enumerate() {
                self.fun_def(fun, &prefix, Some(i + 1 == count))?;
            }
        }
        Ok(())
    }

    fn fun_def(&mut self, node: &FunDefNode, prefix: &str, last: Option<bool>) -> fmt::Result {
        let label = format!("Function Definition: {}", display_name(&node.identifier));
        let prefix = self.line(prefix, last, &label)?;

        let has_body = node.body.is_some();
        let has_params = node.parameters.is_some();
        self.line(
            &prefix,
            Some(!has_params && !has_body),
            &format!("Return Type: {}", node.return_type),
        )?;
        if let Some(params) = &node.parameters {
            let child = self.line(&prefix, Some(!has_body), "Parameters")?;
            self.arg_list(params, &child)?;
        }
        if let Some(body) = &node.body {
            let child = self.line(&prefix, Some(true), "Body")?;
            self.statement_list(body, &child)?;
        }
        Ok(())
    }

    /// Every node of the chain starting at `node`, each as a sibling line
    fn arg_list(&mut self, node: &ArgOrParamNode, prefix: &str) -> fmt::Result {
        let count = node.len();
        for (i, arg) in node.iter().enumerate() {
            let label = match arg.data_type {
                DataType::NotDefined => "Argument".to_string(),
                data_type => format!("Parameter: {}", data_type),
            };
            let child = self.line(prefix, Some(i + 1 == count), &label)?;
            if let Some(expr) = &arg.expression {
                self.expr(expr, &child, Some(true))?;
            }
        }
        Ok(())
    }

    fn statement_list(&mut self, node: &StatementNode, prefix: &str) -> fmt::Result {
        let count = node.len();
        for (i, stmt) in node.iter().enumerate() {
            self.statement(stmt, prefix, Some(i + 1 == count))?;
        }
        Ok(())
    }

    fn statement(&mut self, node: &StatementNode, prefix: &str, last: Option<bool>) -> fmt::Result {
        let frame = match node.frame_id {
            Some(id) => format!(" [frame {}]", id),
            None => String::new(),
        };
        let kind = match node.statement_type() {
            StatementType::NotDefined => "empty",
            StatementType::VarDef => "variable definition",
            StatementType::Expr => "expression",
            StatementType::FunCall => "function call",
            StatementType::If => "if",
            StatementType::While => "while",
            StatementType::Return => "return",
        };
        let prefix = self.line(prefix, last, &format!("Statement{}: {}", frame, kind))?;

        match &node.statement {
            None | Some(Statement::Return(None)) => Ok(()),
            Some(Statement::VarDef(expr))
            | Some(Statement::Expr(expr))
            | Some(Statement::Return(Some(expr))) => self.expr(expr, &prefix, Some(true)),
            Some(Statement::FunCall(call)) => self.fun_call(call, &prefix, Some(true)),
            Some(Statement::If(node)) => self.if_node(node, &prefix, Some(true)),
            Some(Statement::While(node)) => self.while_node(node, &prefix, Some(true)),
        }
    }

    fn fun_call(&mut self, node: &FunCallNode, prefix: &str, last: Option<bool>) -> fmt::Result {
        let namespace = if node.is_builtin { "ifj." } else { "" };
        let label = format!(
            "Function Call: {}{}",
            namespace,
            display_name(&node.identifier)
        );
        let prefix = self.line(prefix, last, &label)?;
        if let Some(args) = &node.arguments {
            self.arg_list(args, &prefix)?;
        }
        Ok(())
    }

    fn if_node(&mut self, node: &IfNode, prefix: &str, last: Option<bool>) -> fmt::Result {
        let prefix = self.line(prefix, last, "If")?;
        let has_else = node.else_branch.is_some();

        if let Some(condition) = &node.condition {
            let child = self.line(&prefix, Some(false), "Condition")?;
            self.expr(condition, &child, Some(true))?;
        }
        if let Some(binding) = &node.null_condition {
            let child = self.line(&prefix, Some(false), "Null Condition")?;
            self.var(binding, &child, Some(true))?;
        }
        let child = self.line(&prefix, Some(!has_else), "Then")?;
        if let Some(branch) = &node.then_branch {
            self.statement_list(branch, &child)?;
        }
        if let Some(branch) = &node.else_branch {
            let child = self.line(&prefix, Some(true), "Else")?;
            self.statement_list(branch, &child)?;
        }
        Ok(())
    }

    fn while_node(&mut self, node: &WhileNode, prefix: &str, last: Option<bool>) -> fmt::Result {
        let prefix = self.line(prefix, last, "While")?;

        if let Some(condition) = &node.condition {
            let child = self.line(&prefix, Some(false), "Condition")?;
            self.expr(condition, &child, Some(true))?;
        }
        if let Some(binding) = &node.null_condition {
            let child = self.line(&prefix, Some(false), "Null Condition")?;
            self.var(binding, &child, Some(true))?;
        }
        let child = self.line(&prefix, Some(true), "Body")?;
        if let Some(body) = &node.body {
            self.statement_list(body, &child)?;
        }
        Ok(())
    }

    fn expr(&mut self, node: &ExprNode, prefix: &str, last: Option<bool>) -> fmt::Result {
        match &node.expression {
            None => self.line(prefix, last, "Expression: (empty)").map(|_| ()),
            Some(Expr::Literal(var)) | Some(Expr::Variable(var)) => self.var(var, prefix, last),
            Some(Expr::FunCall(call)) => self.fun_call(call, prefix, last),
            Some(Expr::BinaryOp(bin)) => self.bin_op(bin, prefix, last),
        }
    }

    fn bin_op(&mut self, node: &BinOpNode, prefix: &str, last: Option<bool>) -> fmt::Result {
        let prefix = self.line(prefix, last, &format!("Binary Operation: {}", node.op))?;
        if let Some(left) = &node.left {
            self.expr(left, &prefix, Some(node.right.is_none()))?;
        }
        if let Some(right) = &node.right {
            self.expr(right, &prefix, Some(true))?;
        }
        Ok(())
    }

    fn var(&mut self, node: &VarNode, prefix: &str, last: Option<bool>) -> fmt::Result {
        let label = if node.is_literal() {
            format!("Literal: {}", describe_literal(node))
        } else {
            let frame = match node.frame_id {
                Some(id) => format!(" [frame {}]", id),
                None => String::new(),
            };
            format!("Variable: {}{}", display_name(&node.identifier), frame)
        };
        self.line(prefix, last, &label).map(|_| ())
    }
}

fn display_name(name: &Option<crate::dstring::DString>) -> String {
    match name {
        Some(name) => name.to_string(),
        None => "(unnamed)".to_string(),
    }
}

fn describe_literal(node: &VarNode) -> String {
    match &node.value {
        LiteralValue::Int(n) => format!("i32 {}", n),
        LiteralValue::Float(x) => format!("f64 {:?}", x),
        LiteralValue::Str(s) => format!("[]u8 \"{}\"", s),
        LiteralValue::Null => "null".to_string(),
        LiteralValue::Bool => "bool".to_string(),
        LiteralValue::Undefined => "undefined".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dstring::DString;
    use pretty_assertions::assert_eq;

    fn variable(name: &str, frame: usize) -> Box<ExprNode> {
        let mut var = VarNode::new(AstNodeType::Var);
        var.identifier = Some(DString::from(name));
        var.frame_id = Some(frame);
        ExprNode::from_expr(Expr::Variable(Box::new(var)))
    }

    fn int(n: i32) -> Box<ExprNode> {
        let mut var = VarNode::new(AstNodeType::Literal);
        var.literal_type = LiteralType::Int;
        var.value = LiteralValue::Int(n);
        ExprNode::from_expr(Expr::Literal(Box::new(var)))
    }

    #[test]
    fn test_program_dump() {
        let mut bin = BinOpNode::default();
        bin.op = BinOpType::Add;
        bin.left = Some(variable("a", 1));
        bin.right = Some(int(10));

        let mut stmt = StatementNode::default();
        stmt.frame_id = Some(1);
        stmt.statement = Some(Statement::Return(Some(ExprNode::from_expr(Expr::BinaryOp(
            Box::new(bin),
        )))));

        let mut fun = FunDefNode::default();
        fun.identifier = Some(DString::from("main"));
        fun.return_type = DataType::Void;
        fun.body = Some(Box::new(stmt));

        let mut program = ProgramNode::default();
        program.function_list = Some(Box::new(fun));

        let expected = "\
Program Node
└── Function Definition: main
    ├── Return Type: void
    └── Body
        └── Statement [frame 1]: return
            └── Binary Operation: +
                ├── Variable: a [frame 1]
                └── Literal: i32 10
";
        assert_eq!(program_to_string(&program), expected);
    }

    #[test]
    fn test_single_node_dump() {
        let mut out = String::new();
        print_tree(&AstNode::Expr(int(7)), &mut out).unwrap();
        assert_eq!(out, "Literal: i32 7\n");
    }
}
