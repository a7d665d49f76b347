// Expression parsing, tree building and scope resolution driven together

use ifj24_core::ast::{
    init_new_bin_op_node, init_new_statement_node, program_to_string, AstNodeType, BinOpNode,
    BinOpType, DataType, Expr, ExprNode, FunDefNode, ArgOrParamNode, Statement, StatementNode,
    VarNode,
};
use ifj24_core::semantic::unused_variables;
use ifj24_core::{CompileError, CompilerContext, DString, Token, TokenKind};

fn tok(kind: TokenKind) -> Token {
    Token::new(kind)
}

fn variable(name: &str) -> Box<ExprNode> {
    let mut var = VarNode::new(AstNodeType::Var);
    var.identifier = Some(DString::from(name));
    ExprNode::from_expr(Expr::Variable(Box::new(var)))
}

fn var_def(name: &str, value: Box<ExprNode>) -> Statement {
    let mut bin = Box::new(BinOpNode::default());
    init_new_bin_op_node(&mut bin, BinOpType::Assignment, variable(name), value)
        .expect("Assignment node init failed");
    Statement::VarDef(ExprNode::from_expr(Expr::BinaryOp(bin)))
}

fn chain(statements: Vec<Statement>) -> Option<Box<StatementNode>> {
    let mut head: Option<Box<StatementNode>> = None;
    for statement in statements.into_iter().rev() {
        let mut node = Box::new(StatementNode::default());
        init_new_statement_node(&mut node, 0, statement).expect("Statement init failed");
        node.next = head;
        head = Some(node);
    }
    head
}

fn main_with_param(body: Vec<Statement>) -> Box<FunDefNode> {
    let mut param = Box::new(ArgOrParamNode::default());
    param.data_type = DataType::Int;
    param.expression = Some(variable("a"));

    let mut fun = Box::new(FunDefNode::default());
    fun.identifier = Some(DString::from("main"));
    fun.return_type = DataType::Void;
    fun.parameters = Some(param);
    fun.body = chain(body);
    fun
}

fn install(ctx: &mut CompilerContext, fun: Box<FunDefNode>) {
    ctx.tree.program_node_mut().expect("Tree not initialized").function_list = Some(fun);
}

/// `const y = a * (a + 2);` followed by `ifj.write(y);`
#[test]
fn test_parse_resolve_and_dump() {
    let mut ctx = CompilerContext::new().expect("Context creation failed");

    let mut value_tokens = vec![
        Token::identifier("a"),
        tok(TokenKind::Multiplication),
        tok(TokenKind::LeftBracket),
        Token::identifier("a"),
        tok(TokenKind::Plus),
        Token::int("2"),
        tok(TokenKind::RightBracket),
        tok(TokenKind::Semicolon),
    ];
    let (value, consumed) = ctx
        .parse_expression(&mut value_tokens)
        .expect("Value expression failed to parse");
    assert_eq!(consumed, 7);

    let mut call_tokens = vec![
        tok(TokenKind::Ifj),
        tok(TokenKind::Dot),
        Token::identifier("write"),
        tok(TokenKind::LeftBracket),
        Token::identifier("y"),
        tok(TokenKind::RightBracket),
        tok(TokenKind::Semicolon),
    ];
    let (call, consumed) = ctx
        .parse_expression(&mut call_tokens)
        .expect("Call expression failed to parse");
    assert_eq!(consumed, 6);
    assert_eq!(ctx.stacks.depth(), 0);

    install(
        &mut ctx,
        main_with_param(vec![var_def("y", value), Statement::Expr(call)]),
    );
    ctx.resolve().expect("Resolution failed");

    let program = ctx.tree.program_node().expect("Tree not initialized");
    let body = program.function_list.as_ref().unwrap().body.as_deref().unwrap();
    assert_eq!(body.frame_id, Some(1));
    assert_eq!(body.next.as_ref().unwrap().frame_id, Some(1));
    assert!(unused_variables(&ctx.frames).is_empty());

    let dump = program_to_string(program);
    assert!(dump.contains("Function Definition: main"));
    assert!(dump.contains("Function Call: ifj.write"));
    assert!(dump.contains("Binary Operation: *"));
    assert!(dump.contains("Variable: y [frame 1]"));

    ctx.teardown();
    assert_eq!(ctx.exit_code(), 0);
}

#[test]
fn test_undefined_identifier_exit_code() {
    let mut ctx = CompilerContext::new().expect("Context creation failed");
    install(&mut ctx, main_with_param(vec![var_def("y", variable("b"))]));

    let err = ctx.resolve().unwrap_err();
    assert_eq!(err, CompileError::undefined("b"));
    assert_eq!(ctx.exit_code(), 3);
    ctx.teardown();
}

#[test]
fn test_redefinition_exit_code() {
    let mut ctx = CompilerContext::new().expect("Context creation failed");
    install(
        &mut ctx,
        main_with_param(vec![var_def("y", variable("a")), var_def("y", variable("a"))]),
    );

    let err = ctx.resolve().unwrap_err();
    assert_eq!(err, CompileError::redefinition("y"));
    assert_eq!(ctx.exit_code(), 5);
}

#[test]
fn test_syntax_error_then_teardown() {
    let mut ctx = CompilerContext::new().expect("Context creation failed");
    let mut tokens = vec![
        Token::identifier("a"),
        tok(TokenKind::Plus),
        tok(TokenKind::LeftBracket),
        Token::identifier("b"),
        tok(TokenKind::Semicolon),
    ];

    assert!(matches!(
        ctx.parse_expression(&mut tokens),
        Err(CompileError::Syntax { .. })
    ));
    assert_eq!(ctx.exit_code(), 2);
    assert_eq!(ctx.stacks.depth(), 0);

    ctx.teardown();
    ctx.teardown();
    assert!(!ctx.tree.is_initialized());
}
