//! Expression parser driving the precedence table
//!
//! The statement parser hands over its token slice at the first token of an
//! expression. [`ExprParser::parse`] consumes tokens until one of them cannot
//! continue the expression (`;`, `{`, `|`, a `,` or an unmatched `)`), leaves
//! that token unconsumed, and returns the built [`ExprNode`].
//!
//! Function calls are assembled here instead of in the table. For `f(a, b)` and
//! `ifj.f(a, b)` an `ArgList` cell is opened on the current stack and every
//! argument is parsed on a fresh nested stack of the [`PrecStackList`]. The
//! finished call is then shifted like an identifier.

use super::stack::PrecStackList;
use super::symbols::{PrecStackNonTerminal, PrecStackSymbol, PrecTerminal};
use super::table::{precedence, PrecAction};
use crate::ast::{
    init_new_arg_or_param_node, init_new_fun_call_node, AstNode, AstNodeType, ArgOrParamNode,
    DataType, Expr, ExprNode, FunCallNode, SiblingList,
};
use crate::error::{CompileError, Result};
use crate::token::{Token, TokenKind};
use tracing::trace;

/// What the current token means to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Incoming {
    Terminal(PrecTerminal),
    /// `id (` or `ifj . id (`
    Call,
}

/// Precedence parser over a token slice
pub struct ExprParser<'t> {
    tokens: &'t mut [Token],
    pos: usize,
}

impl<'t> ExprParser<'t> {
    pub fn new(tokens: &'t mut [Token]) -> Self {
        ExprParser { tokens, pos: 0 }
    }

    /// Start at `pos` instead of the first token
    pub fn at(tokens: &'t mut [Token], pos: usize) -> Self {
        ExprParser { tokens, pos }
    }

    /// Index of the first token not consumed yet
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Parse one expression on a fresh stack of `stacks`
    ///
    /// On failure every stack opened by this call is purged, so no partially
    /// built subtree survives.
    pub fn parse(&mut self, stacks: &mut PrecStackList) -> Result<Box<ExprNode>> {
        stacks.push();
        match self.run(stacks) {
            Ok(expr) => {
                if let Some(stack) = stacks.pop() {
                    let leftover = stack.dispose();
                    if !leftover.is_empty() {
                        return Err(CompileError::internal(format!(
                            "{} AST nodes left on a finished precedence stack",
                            leftover.len()
                        )));
                    }
                }
                Ok(expr)
            }
            Err(err) => {
                let purged = stacks.purge_current();
                trace!(cells = purged.cells, payloads = purged.payloads, "expression abandoned");
                Err(err)
            }
        }
    }

    fn run(&mut self, stacks: &mut PrecStackList) -> Result<Box<ExprNode>> {
        stacks
            .top_stack_mut()?
            .push_terminal(PrecTerminal::Dollar, AstNodeType::Undefined, None);
        let mut depth = 0usize;

        loop {
            let incoming = self.incoming(depth);
            let lookup = match incoming {
                Incoming::Terminal(terminal) => terminal,
                Incoming::Call => PrecTerminal::Id,
            };
            let top = stacks.top_stack()?.get_top_terminal()?;
            let action = precedence(top, lookup);
            trace!(%top, incoming = %lookup, ?action, "precedence step");

            match action {
                PrecAction::Shift => {
                    stacks.top_stack_mut()?.push_handle_after_first_terminal()?;
                    match incoming {
                        Incoming::Call => {
                            let call = self.call(stacks)?;
                            stacks.top_stack_mut()?.push_terminal(
                                PrecTerminal::Id,
                                AstNodeType::Expr,
                                Some(AstNode::Expr(call)),
                            );
                        }
                        Incoming::Terminal(terminal) => {
                            if terminal == PrecTerminal::LeftBracket {
                                depth += 1;
                            }
                            let token = self.current_mut()?;
                            stacks
                                .top_stack_mut()?
                                .push_both_stack_and_ast_node(terminal, token)?;
                            self.pos += 1;
                        }
                    }
                }
                PrecAction::Equal => {
                    stacks.top_stack_mut()?.push_terminal(lookup, AstNodeType::Undefined, None);
                    depth = depth.saturating_sub(1);
                    self.pos += 1;
                }
                PrecAction::Reduce => stacks.top_stack_mut()?.reduce()?,
                PrecAction::Accept => break,
                PrecAction::Error => {
                    return Err(CompileError::syntax(format!(
                        "unexpected {} in expression",
                        self.describe_current()
                    )));
                }
            }
        }

        let stack = stacks.top_stack_mut()?;
        if stack.top()?.symbol != PrecStackSymbol::Expression {
            return Err(CompileError::syntax(format!(
                "expected an expression, found {}",
                self.describe_current()
            )));
        }
        stack.get_result()
    }

    /// Classify the current token, mapping expression terminators to `$`
    fn incoming(&self, depth: usize) -> Incoming {
        let Some(token) = self.tokens.get(self.pos) else {
            return Incoming::Terminal(PrecTerminal::Dollar);
        };

        match token.kind {
            TokenKind::Identifier if self.kind_at(self.pos + 1) == Some(TokenKind::LeftBracket) => {
                Incoming::Call
            }
            TokenKind::Ifj => Incoming::Call,
            TokenKind::RightBracket if depth == 0 => Incoming::Terminal(PrecTerminal::Dollar),
            TokenKind::Comma => Incoming::Terminal(PrecTerminal::Dollar),
            kind => Incoming::Terminal(
                PrecTerminal::from_token_kind(kind).unwrap_or(PrecTerminal::Dollar),
            ),
        }
    }

    /// Parse `id ( args )` or `ifj . id ( args )` starting at the current token
    fn call(&mut self, stacks: &mut PrecStackList) -> Result<Box<ExprNode>> {
        let is_builtin = self.kind_at(self.pos) == Some(TokenKind::Ifj);
        if is_builtin {
            self.pos += 1;
            self.expect(TokenKind::Dot)?;
        }
        let name = {
            let token = self.current_mut()?;
            if token.kind != TokenKind::Identifier {
                return Err(CompileError::syntax(format!(
                    "expected a function name, found {}",
                    token
                )));
            }
            token
                .take_value()
                .ok_or_else(|| CompileError::internal("identifier token without a name"))?
        };
        self.pos += 1;
        self.expect(TokenKind::LeftBracket)?;

        stacks.top_stack_mut()?.push_nonterminal(
            PrecStackNonTerminal::ArgList,
            AstNodeType::ArgOrParam,
            None,
        );

        while self.kind_at(self.pos) != Some(TokenKind::RightBracket) {
            let argument = self.parse(stacks)?;
            let mut arg = Box::new(ArgOrParamNode::default());
            init_new_arg_or_param_node(&mut arg, DataType::NotDefined, argument)?;

            let cell = stacks.top_stack_mut()?.top_mut()?;
            match &mut cell.node {
                Some(AstNode::ArgOrParam(head)) => head.append(arg),
                slot @ None => *slot = Some(AstNode::ArgOrParam(arg)),
                Some(_) => return Err(CompileError::internal("argument list cell holds a foreign node")),
            }

            match self.kind_at(self.pos) {
                Some(TokenKind::Comma) => self.pos += 1,
                Some(TokenKind::RightBracket) => {}
                _ => {
                    return Err(CompileError::syntax(format!(
                        "expected ',' or ')' in argument list, found {}",
                        self.describe_current()
                    )));
                }
            }
        }
        self.pos += 1;

        let arguments = stacks
            .top_stack_mut()?
            .pop()
            .and_then(|cell| cell.node)
            .and_then(AstNode::into_arg_or_param);

        let mut call = Box::new(FunCallNode::default());
        init_new_fun_call_node(&mut call, name, is_builtin, arguments)?;
        Ok(ExprNode::from_expr(Expr::FunCall(call)))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        if self.kind_at(self.pos) != Some(kind) {
            return Err(CompileError::syntax(format!(
                "expected '{}', found {}",
                kind,
                self.describe_current()
            )));
        }
        self.pos += 1;
        Ok(())
    }

    fn kind_at(&self, pos: usize) -> Option<TokenKind> {
        self.tokens.get(pos).map(|token| token.kind)
    }

    fn current_mut(&mut self) -> Result<&mut Token> {
        self.tokens
            .get_mut(self.pos)
            .ok_or_else(|| CompileError::syntax("unexpected end of input in expression"))
    }

    fn describe_current(&self) -> String {
        match self.tokens.get(self.pos) {
            Some(token) => token.to_string(),
            None => "end of input".to_string(),
        }
    }
}

/// Parse the expression at the start of `tokens`, returning it and the number
/// of tokens consumed
pub fn parse_expression(
    stacks: &mut PrecStackList,
    tokens: &mut [Token],
) -> Result<(Box<ExprNode>, usize)> {
    let mut parser = ExprParser::new(tokens);
    let expr = parser.parse(stacks)?;
    Ok((expr, parser.position()))
}
