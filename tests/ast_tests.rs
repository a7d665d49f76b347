// Generic node lifecycle and literal conversion through the public API

use ifj24_core::ast::{
    create_node, destroy_node, destroy_statement_list, init_new_var_node, AstNode, AstNodeType,
    AstTree, LiteralType, LiteralValue, StatementNode, VarNode,
};
use ifj24_core::{CompileError, DString, ErrorKind};

const ALL_TYPES: [AstNodeType; 11] = [
    AstNodeType::Program,
    AstNodeType::FunDef,
    AstNodeType::ArgOrParam,
    AstNodeType::Statement,
    AstNodeType::FunCall,
    AstNodeType::If,
    AstNodeType::While,
    AstNodeType::Expr,
    AstNodeType::BinOp,
    AstNodeType::Var,
    AstNodeType::Literal,
];

#[test]
fn test_create_then_destroy_every_type() {
    for node_type in ALL_TYPES {
        let node = create_node(node_type);
        assert!(node.is_some(), "no node created for {}", node_type);
        destroy_node(node_type, node).unwrap();
        destroy_node(node_type, None).unwrap();
    }
    assert!(create_node(AstNodeType::Undefined).is_none());
}

#[test]
fn test_destroy_with_wrong_tag() {
    let node = create_node(AstNodeType::If);
    let err = destroy_node(AstNodeType::While, node).unwrap_err();
    assert!(err.is_internal());

    // Variables and literals share one node type
    let node = create_node(AstNodeType::Literal);
    destroy_node(AstNodeType::Var, node).unwrap();
}

#[test]
fn test_int_literal_bounds() {
    let mut max = VarNode::new(AstNodeType::Literal);
    init_new_var_node(
        &mut max,
        AstNodeType::Literal,
        None,
        None,
        LiteralType::Int,
        Some(DString::from("2147483647")),
    )
    .expect("Node init failed");
    assert_eq!(max.value, LiteralValue::Int(i32::MAX));

    let mut too_big = VarNode::new(AstNodeType::Literal);
    let err = init_new_var_node(
        &mut too_big,
        AstNodeType::Literal,
        None,
        None,
        LiteralType::Int,
        Some(DString::from("2147483648")),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SemOther);
    assert_eq!(too_big.value, LiteralValue::Undefined);

    let mut malformed = VarNode::new(AstNodeType::Literal);
    let err = init_new_var_node(
        &mut malformed,
        AstNodeType::Literal,
        None,
        None,
        LiteralType::Int,
        Some(DString::from("12a")),
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::Internal { .. }));
}

#[test]
fn test_string_literal_moves_text() {
    let mut node = VarNode::new(AstNodeType::Literal);
    let text = DString::from("hello");
    init_new_var_node(
        &mut node,
        AstNodeType::Literal,
        None,
        None,
        LiteralType::String,
        Some(text),
    )
    .expect("Node init failed");
    assert_eq!(node.value, LiteralValue::Str(DString::from("hello")));
}

#[test]
fn test_tree_lifecycle() {
    let mut tree = AstTree::new();
    tree.init_tree().expect("Tree init failed");
    assert!(tree.init_tree().unwrap_err().is_internal());

    let mut program = create_node(AstNodeType::Program);
    if let Some(AstNode::Program(node)) = program.as_mut() {
        assert!(node.function_list.is_none());
    }
    destroy_node(AstNodeType::Program, program).unwrap();

    tree.destroy_tree();
    tree.destroy_tree();
    assert!(!tree.is_initialized());
}

#[test]
fn test_long_statement_list() {
    let mut head: Option<Box<StatementNode>> = None;
    for _ in 0..100_000 {
        let mut node = Box::new(StatementNode::default());
        node.next = head;
        head = Some(node);
    }
    assert_eq!(destroy_statement_list(head), 100_000);
}
