//! Expression productions.
//!
//! Binary expressions use precedence climbing over an explicit operator
//! stack rather than one recursive function per precedence level, so a
//! 500-operator chain costs two `Vec`s instead of 500 stack frames. The
//! conditional operator is folded into the same loop at its precedence
//! slot; assignment targets are validated as the operator is shifted.

use super::{
    BRACE_RECOVERY, BRACKET_RECOVERY, PAREN_RECOVERY, ParseResult, ParserState, RecoveryError,
};
use crate::ast::arena::NodeId;
use crate::ast::node::{
    BinaryOp, ConstantValue, FunctionType, NodeData, PropertyKind, UnaryOp,
    is_valid_assignment_target,
};
use jscope_common::diagnostics::{Diagnostic, ErrorKind};
use jscope_common::span::Span;
use jscope_scanner::token::TokenKind;

// Conditional `?:` binds between assignment (2) and `||` (4).
const CONDITIONAL_PRECEDENCE: u8 = 3;
const ASSIGNMENT_PRECEDENCE: u8 = 2;

impl ParserState {
    // ========================================================================
    // Entry points
    // ========================================================================

    /// Full expression, comma operator included.
    pub(crate) fn parse_expression(&mut self, no_in: bool) -> ParseResult {
        let start = self.token_start();
        let first = self.parse_assignment_expression(no_in)?;
        if self.token() != TokenKind::CommaToken {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(TokenKind::CommaToken) {
            match self.parse_assignment_expression(no_in) {
                Ok(id) => expressions.push(id),
                Err(err) => {
                    let partial = self.partial_or_error(err, self.token_start());
                    expressions.push(partial);
                    let span = self.finish_span(start);
                    let node = self.node(span, NodeData::Comma { expressions });
                    return Err(RecoveryError {
                        partial: node,
                        token: err.token,
                    });
                }
            }
        }
        let span = self.finish_span(start);
        Ok(self.node(span, NodeData::Comma { expressions }))
    }

    /// Everything from assignment precedence up, no comma.
    pub(crate) fn parse_assignment_expression(&mut self, no_in: bool) -> ParseResult {
        self.parse_binary_expression(ASSIGNMENT_PRECEDENCE, no_in)
    }

    // ========================================================================
    // Precedence climbing
    // ========================================================================

    fn parse_binary_expression(&mut self, min_precedence: u8, no_in: bool) -> ParseResult {
        let mut operands: Vec<NodeId> = Vec::new();
        let mut operators: Vec<BinaryOp> = Vec::new();

        match self.parse_unary_expression(no_in) {
            Ok(id) => operands.push(id),
            Err(err) => return Err(err),
        }

        loop {
            if self.token() == TokenKind::QuestionToken
                && min_precedence <= CONDITIONAL_PRECEDENCE
            {
                // Everything tighter than `?:` belongs to the condition.
                while let Some(&top) = operators.last() {
                    if top.precedence() > CONDITIONAL_PRECEDENCE {
                        self.reduce(&mut operands, &mut operators);
                    } else {
                        break;
                    }
                }
                let condition = match operands.pop() {
                    Some(id) => id,
                    None => break,
                };
                let start = self.arena().span(condition).start;
                self.next_token();
                let when_true = self.parse_branch_operand()?;
                self.parse_expected(TokenKind::ColonToken);
                let when_false = match self.parse_assignment_expression(no_in) {
                    Ok(id) => id,
                    Err(err) => self.partial_or_error(err, self.token_start()),
                };
                let span = self.finish_span(start);
                operands.push(self.node(
                    span,
                    NodeData::Conditional {
                        condition,
                        when_true,
                        when_false,
                    },
                ));
                continue;
            }

            let Some(op) = BinaryOp::from_token(self.token(), no_in) else {
                break;
            };
            if op.precedence() < min_precedence {
                break;
            }

            while let Some(&top) = operators.last() {
                if Self::should_reduce(top, op) {
                    self.reduce(&mut operands, &mut operators);
                } else {
                    break;
                }
            }

            if op.is_assignment() {
                if let Some(&target) = operands.last() {
                    if !is_valid_assignment_target(self.arena(), target) {
                        let span = self.arena().span(target);
                        self.report(Diagnostic::new(
                            ErrorKind::BadAssignmentTarget,
                            span,
                            "invalid assignment target",
                        ));
                    }
                }
            }

            self.next_token();
            operators.push(op);
            match self.parse_unary_expression(no_in) {
                Ok(id) => operands.push(id),
                Err(err) => {
                    let partial = self.partial_or_error(err, self.token_start());
                    operands.push(partial);
                    while !operators.is_empty() {
                        self.reduce(&mut operands, &mut operators);
                    }
                    return Err(RecoveryError {
                        partial: operands.pop().unwrap_or(NodeId::NONE),
                        token: err.token,
                    });
                }
            }
        }

        while !operators.is_empty() {
            self.reduce(&mut operands, &mut operators);
        }
        // The initial operand push guarantees one survivor.
        Ok(operands.pop().unwrap_or(NodeId::NONE))
    }

    /// Shift/reduce decision: reduce on strictly-tighter, and on equal
    /// precedence only for left-associative operators.
    fn should_reduce(top: BinaryOp, incoming: BinaryOp) -> bool {
        top.precedence() > incoming.precedence()
            || (top.precedence() == incoming.precedence() && !incoming.is_right_associative())
    }

    fn reduce(&mut self, operands: &mut Vec<NodeId>, operators: &mut Vec<BinaryOp>) {
        let Some(op) = operators.pop() else { return };
        let Some(right) = operands.pop() else { return };
        let Some(left) = operands.pop() else {
            operands.push(right);
            return;
        };
        let span = self.arena().span(left).combine(self.arena().span(right));
        operands.push(self.node(span, NodeData::Binary { op, left, right }));
    }

    /// The true branch of `?:` may contain assignments and `in` but not a
    /// bare colon, so it parses as an assignment expression with `in`
    /// allowed regardless of the surrounding `no_in` context.
    fn parse_branch_operand(&mut self) -> ParseResult {
        match self.parse_assignment_expression(false) {
            Ok(id) => Ok(id),
            Err(err) => Ok(self.partial_or_error(err, self.token_start())),
        }
    }

    // ========================================================================
    // Unary and postfix
    // ========================================================================

    fn parse_unary_expression(&mut self, no_in: bool) -> ParseResult {
        self.enter_depth()?;
        let result = self.parse_unary_inner(no_in);
        self.leave_depth();
        result
    }

    fn parse_unary_inner(&mut self, no_in: bool) -> ParseResult {
        if let Some(op) = UnaryOp::from_prefix_token(self.token()) {
            let start = self.token_start();
            self.next_token();
            let operand = self.parse_unary_expression(no_in)?;
            if matches!(op, UnaryOp::Increment | UnaryOp::Decrement)
                && !is_valid_assignment_target(self.arena(), operand)
            {
                let span = self.arena().span(operand);
                self.report(Diagnostic::new(
                    ErrorKind::BadAssignmentTarget,
                    span,
                    "invalid increment/decrement target",
                ));
            }
            let span = self.finish_span(start);
            return Ok(self.node(
                span,
                NodeData::Unary {
                    op,
                    operand,
                    postfix: false,
                },
            ));
        }

        let operand = self.parse_left_hand_side_expression()?;

        // Postfix ++/-- never reaches across a line break; that newline is a
        // semicolon insertion point instead.
        if matches!(
            self.token(),
            TokenKind::PlusPlusToken | TokenKind::MinusMinusToken
        ) && !self.has_preceding_line_break()
        {
            let op = if self.token() == TokenKind::PlusPlusToken {
                UnaryOp::Increment
            } else {
                UnaryOp::Decrement
            };
            if !is_valid_assignment_target(self.arena(), operand) {
                let span = self.arena().span(operand);
                self.report(Diagnostic::new(
                    ErrorKind::BadAssignmentTarget,
                    span,
                    "invalid increment/decrement target",
                ));
            }
            self.next_token();
            let start = self.arena().span(operand).start;
            let span = self.finish_span(start);
            return Ok(self.node(
                span,
                NodeData::Unary {
                    op,
                    operand,
                    postfix: true,
                },
            ));
        }

        Ok(operand)
    }

    // ========================================================================
    // Left-hand side: member access, calls, new
    // ========================================================================

    fn parse_left_hand_side_expression(&mut self) -> ParseResult {
        let mut expression = if self.token() == TokenKind::NewKeyword {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        loop {
            expression = match self.token() {
                TokenKind::DotToken => self.parse_member_access(expression)?,
                TokenKind::OpenBracketToken => self.parse_index_access(expression)?,
                TokenKind::OpenParenToken => {
                    let start = self.arena().span(expression).start;
                    let arguments = self.parse_arguments()?;
                    let span = self.finish_span(start);
                    self.node(
                        span,
                        NodeData::Call {
                            function: expression,
                            arguments,
                            in_brackets: false,
                            is_constructor: false,
                        },
                    )
                }
                _ => break,
            };
        }
        Ok(expression)
    }

    /// `new Callee(args)`: the callee takes member suffixes but no call
    /// suffixes, so `new a.b.c()` constructs `a.b.c`.
    fn parse_new_expression(&mut self) -> ParseResult {
        let start = self.token_start();
        self.next_token(); // new
        let mut callee = if self.token() == TokenKind::NewKeyword {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        loop {
            callee = match self.token() {
                TokenKind::DotToken => self.parse_member_access(callee)?,
                TokenKind::OpenBracketToken => self.parse_index_access(callee)?,
                _ => break,
            };
        }
        let arguments = if self.token() == TokenKind::OpenParenToken {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        let span = self.finish_span(start);
        Ok(self.node(
            span,
            NodeData::Call {
                function: callee,
                arguments,
                in_brackets: false,
                is_constructor: true,
            },
        ))
    }

    fn parse_member_access(&mut self, root: NodeId) -> ParseResult {
        let start = self.arena().span(root).start;
        self.next_token(); // dot
        // Keywords are fine as property names: `a.new`, `a.in`.
        if self.token() != TokenKind::Identifier && !self.token().is_keyword() {
            self.error_here(ErrorKind::ExpectedIdentifier, "expected a property name");
            return Err(RecoveryError {
                partial: root,
                token: self.token(),
            });
        }
        let name = self.intern_token_value();
        let name_span = self.token_span();
        self.next_token();
        let span = self.finish_span(start);
        Ok(self.node(
            span,
            NodeData::Member {
                root,
                name,
                name_span,
            },
        ))
    }

    /// `a[b]` is modeled as a bracketed call with one argument, which keeps
    /// dynamic member access distinct from the static `Member` form.
    fn parse_index_access(&mut self, root: NodeId) -> ParseResult {
        let start = self.arena().span(root).start;
        self.next_token(); // [
        let index_start = self.token_start();
        let index = match self.guarded(BRACKET_RECOVERY, |p| p.parse_expression(false)) {
            Ok(id) if id.is_some() => id,
            Ok(_) => self.error_node(Span::new(index_start, 0)),
            Err(err) => {
                let partial = self.partial_or_error(err, index_start);
                let span = self.finish_span(start);
                let node = self.node(
                    span,
                    NodeData::Call {
                        function: root,
                        arguments: vec![partial],
                        in_brackets: true,
                        is_constructor: false,
                    },
                );
                return Err(RecoveryError {
                    partial: node,
                    token: err.token,
                });
            }
        };
        self.parse_expected(TokenKind::CloseBracketToken);
        let span = self.finish_span(start);
        Ok(self.node(
            span,
            NodeData::Call {
                function: root,
                arguments: vec![index],
                in_brackets: true,
                is_constructor: false,
            },
        ))
    }

    fn parse_arguments(&mut self) -> Result<Vec<NodeId>, RecoveryError> {
        self.next_token(); // (
        let mut arguments = Vec::new();
        if self.token() != TokenKind::CloseParenToken {
            loop {
                match self.guarded(PAREN_RECOVERY, |p| p.parse_assignment_expression(false)) {
                    Ok(id) if id.is_some() => arguments.push(id),
                    Ok(_) => {}
                    Err(err) => {
                        if err.partial.is_some() {
                            arguments.push(err.partial);
                        }
                        break;
                    }
                }
                if !self.eat(TokenKind::CommaToken) {
                    break;
                }
            }
        }
        self.parse_expected(TokenKind::CloseParenToken);
        Ok(arguments)
    }

    // ========================================================================
    // Primaries
    // ========================================================================

    fn parse_primary_expression(&mut self) -> ParseResult {
        let span = self.token_span();
        match self.token() {
            TokenKind::Identifier => {
                let name = self.intern_token_value();
                self.next_token();
                Ok(self.node(span, NodeData::Lookup { name }))
            }
            TokenKind::ThisKeyword => {
                self.next_token();
                Ok(self.node(span, NodeData::This))
            }
            TokenKind::TrueKeyword | TokenKind::FalseKeyword => {
                let value = self.token() == TokenKind::TrueKeyword;
                self.next_token();
                Ok(self.node(
                    span,
                    NodeData::Constant {
                        value: ConstantValue::Boolean(value),
                    },
                ))
            }
            TokenKind::NullKeyword => {
                self.next_token();
                Ok(self.node(
                    span,
                    NodeData::Constant {
                        value: ConstantValue::Null,
                    },
                ))
            }
            TokenKind::NumericLiteral => {
                let value = self.token_numeric_value();
                self.next_token();
                Ok(self.node(
                    span,
                    NodeData::Constant {
                        value: ConstantValue::Number(value),
                    },
                ))
            }
            TokenKind::StringLiteral => {
                let value = self.token_text().to_owned();
                self.next_token();
                Ok(self.node(
                    span,
                    NodeData::Constant {
                        value: ConstantValue::String(value),
                    },
                ))
            }
            TokenKind::SlashToken | TokenKind::SlashEqualsToken => {
                // At expression position a slash starts a regex, not division.
                self.rescan_slash_as_regex();
                let pattern = self.token_text().to_owned();
                let flags = self.token_regex_flags().to_owned();
                let span = self.token_span();
                self.next_token();
                Ok(self.node(span, NodeData::RegExpLiteral { pattern, flags }))
            }
            TokenKind::OpenParenToken => {
                let start = self.token_start();
                self.next_token();
                let inner_start = self.token_start();
                let operand = match self.guarded(PAREN_RECOVERY, |p| p.parse_expression(false)) {
                    Ok(id) if id.is_some() => id,
                    Ok(_) => self.error_node(Span::new(inner_start, 0)),
                    Err(err) => self.partial_or_error(err, inner_start),
                };
                self.parse_expected(TokenKind::CloseParenToken);
                let span = self.finish_span(start);
                Ok(self.node(span, NodeData::Grouping { operand }))
            }
            TokenKind::OpenBracketToken => self.parse_array_literal(),
            TokenKind::OpenBraceToken => self.parse_object_literal(),
            TokenKind::FunctionKeyword => self.parse_function(FunctionType::Expression),
            _ => {
                self.error_here(ErrorKind::ExpectedExpression, "expected an expression");
                Err(RecoveryError {
                    partial: NodeId::NONE,
                    token: self.token(),
                })
            }
        }
    }

    fn parse_array_literal(&mut self) -> ParseResult {
        let start = self.token_start();
        self.next_token(); // [
        let mut elements = Vec::new();
        loop {
            if self.token() == TokenKind::CloseBracketToken
                || self.token() == TokenKind::EndOfFileToken
            {
                break;
            }
            if self.token() == TokenKind::CommaToken {
                // Elision: `[1, , 3]` leaves a hole.
                let hole = self.token_span();
                elements.push(self.node(
                    Span::new(hole.start, 0),
                    NodeData::Constant {
                        value: ConstantValue::Missing,
                    },
                ));
                self.next_token();
                continue;
            }
            match self.guarded(BRACKET_RECOVERY, |p| p.parse_assignment_expression(false)) {
                Ok(id) if id.is_some() => elements.push(id),
                Ok(_) => {}
                Err(err) => {
                    if err.partial.is_some() {
                        elements.push(err.partial);
                    }
                    break;
                }
            }
            if !self.eat(TokenKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(TokenKind::CloseBracketToken);
        let span = self.finish_span(start);
        Ok(self.node(span, NodeData::ArrayLiteral { elements }))
    }

    fn parse_object_literal(&mut self) -> ParseResult {
        let start = self.token_start();
        self.next_token(); // {
        let mut properties = Vec::new();
        while self.token() != TokenKind::CloseBraceToken
            && self.token() != TokenKind::EndOfFileToken
        {
            match self.guarded(BRACE_RECOVERY, |p| p.parse_object_property()) {
                Ok(id) if id.is_some() => properties.push(id),
                Ok(_) => {}
                Err(err) => {
                    if err.partial.is_some() {
                        properties.push(err.partial);
                    }
                    break;
                }
            }
            if !self.eat(TokenKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(TokenKind::CloseBraceToken);
        let span = self.finish_span(start);
        Ok(self.node(span, NodeData::ObjectLiteral { properties }))
    }

    fn parse_object_property(&mut self) -> ParseResult {
        let start = self.token_start();

        // `get`/`set` are accessors only when another property name follows;
        // `{ get: 1 }` is a plain property.
        if (self.is_contextual("get") || self.is_contextual("set"))
            && !matches!(
                self.peek(),
                TokenKind::ColonToken | TokenKind::CommaToken | TokenKind::CloseBraceToken
            )
        {
            let kind = if self.is_contextual("get") {
                PropertyKind::Getter
            } else {
                PropertyKind::Setter
            };
            let function_type = if kind == PropertyKind::Getter {
                FunctionType::Getter
            } else {
                FunctionType::Setter
            };
            self.next_token(); // get / set
            let key = self.parse_property_key()?;
            let value = self.parse_function(function_type)?;
            let span = self.finish_span(start);
            return Ok(self.node(
                span,
                NodeData::ObjectLiteralProperty { kind, key, value },
            ));
        }

        let key = self.parse_property_key()?;
        self.parse_expected(TokenKind::ColonToken);
        let value_start = self.token_start();
        let value = match self.parse_assignment_expression(false) {
            Ok(id) => id,
            Err(err) => {
                let partial = self.partial_or_error(err, value_start);
                let span = self.finish_span(start);
                let node = self.node(
                    span,
                    NodeData::ObjectLiteralProperty {
                        kind: PropertyKind::Initializer,
                        key,
                        value: partial,
                    },
                );
                return Err(RecoveryError {
                    partial: node,
                    token: err.token,
                });
            }
        };
        let span = self.finish_span(start);
        Ok(self.node(
            span,
            NodeData::ObjectLiteralProperty {
                kind: PropertyKind::Initializer,
                key,
                value,
            },
        ))
    }

    /// Property keys are not variable references, so identifier keys become
    /// string constants rather than `Lookup` nodes the resolver would chase.
    fn parse_property_key(&mut self) -> ParseResult {
        let span = self.token_span();
        match self.token() {
            kind if kind == TokenKind::Identifier || kind.is_keyword() => {
                let value = self.token_text().to_owned();
                self.next_token();
                Ok(self.node(
                    span,
                    NodeData::Constant {
                        value: ConstantValue::String(value),
                    },
                ))
            }
            TokenKind::StringLiteral => {
                let value = self.token_text().to_owned();
                self.next_token();
                Ok(self.node(
                    span,
                    NodeData::Constant {
                        value: ConstantValue::String(value),
                    },
                ))
            }
            TokenKind::NumericLiteral => {
                let value = self.token_numeric_value();
                self.next_token();
                Ok(self.node(
                    span,
                    NodeData::Constant {
                        value: ConstantValue::Number(value),
                    },
                ))
            }
            _ => {
                self.error_here(ErrorKind::ExpectedIdentifier, "expected a property name");
                Err(RecoveryError {
                    partial: NodeId::NONE,
                    token: self.token(),
                })
            }
        }
    }
}
