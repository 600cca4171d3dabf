//! Statement productions.
//!
//! `top_level` means the statement sits directly in a program or function
//! body; function declarations anywhere else are legal in practice but get
//! flagged, since engines disagreed about them for years.

use super::{
    CASE_RECOVERY, EnclosingBlock, LabelInfo, PAREN_RECOVERY, ParseResult, ParserState,
    RecoveryError, STATEMENT_RECOVERY,
};
use crate::ast::arena::NodeId;
use crate::ast::node::{DeclKind, ForInKind, FunctionType, NodeData, is_valid_assignment_target};
use jscope_common::diagnostics::{Diagnostic, ErrorKind};
use jscope_common::interner::Atom;
use jscope_common::span::Span;
use jscope_scanner::token::TokenKind;

impl ParserState {
    // ========================================================================
    // Dispatch
    // ========================================================================

    pub(crate) fn parse_statement(&mut self, top_level: bool) -> ParseResult {
        self.enter_depth()?;
        let result = self.parse_statement_inner(top_level);
        self.leave_depth();
        result
    }

    fn parse_statement_inner(&mut self, top_level: bool) -> ParseResult {
        match self.token() {
            TokenKind::OpenBraceToken => self.parse_block(),
            TokenKind::VarKeyword => self.parse_variable_statement(DeclKind::Var),
            TokenKind::ConstKeyword => self.parse_variable_statement(DeclKind::Const),
            TokenKind::SemicolonToken => {
                let span = self.token_span();
                self.next_token();
                Ok(self.node(span, NodeData::Empty))
            }
            TokenKind::IfKeyword => self.parse_if(),
            TokenKind::DoKeyword => self.parse_do_while(),
            TokenKind::WhileKeyword => self.parse_while(),
            TokenKind::ForKeyword => self.parse_for(),
            TokenKind::SwitchKeyword => self.parse_switch(),
            TokenKind::TryKeyword => self.parse_try(),
            TokenKind::WithKeyword => self.parse_with(),
            TokenKind::ThrowKeyword => self.parse_throw(),
            TokenKind::ReturnKeyword => self.parse_return(),
            TokenKind::BreakKeyword => self.parse_break_or_continue(true),
            TokenKind::ContinueKeyword => self.parse_break_or_continue(false),
            TokenKind::DebuggerKeyword => {
                let span = self.token_span();
                self.next_token();
                let node = self.node(span, NodeData::Debugger);
                self.expect_semicolon(node)
            }
            TokenKind::FunctionKeyword => self.parse_function_declaration(top_level),
            TokenKind::Identifier => {
                // `let x` begins a declaration only when an identifier
                // follows; `let` alone stays an ordinary expression.
                if self.is_contextual("let") && self.peek() == TokenKind::Identifier {
                    return self.parse_variable_statement(DeclKind::Let);
                }
                if self.peek() == TokenKind::ColonToken {
                    return self.parse_labeled(top_level);
                }
                self.parse_expression_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> ParseResult {
        let expression = self.parse_expression(false)?;
        self.expect_semicolon(expression)
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    pub(crate) fn parse_block(&mut self) -> ParseResult {
        let start = self.token_start();
        self.parse_expected(TokenKind::OpenBraceToken);
        self.block_stack.push(EnclosingBlock::Block);
        let statements = self.parse_statement_list(false);
        self.block_stack.pop();
        self.parse_expected(TokenKind::CloseBraceToken);
        let span = self.finish_span(start);
        Ok(self.node(span, NodeData::Block { statements }))
    }

    /// Statement list up to `}` or end of file. `prologue` enables directive
    /// promotion, which only applies to function bodies here (the program
    /// loop does its own).
    fn parse_statement_list(&mut self, prologue: bool) -> Vec<NodeId> {
        let mut statements = Vec::new();
        let mut in_prologue = prologue;
        while self.token() != TokenKind::CloseBraceToken
            && self.token() != TokenKind::EndOfFileToken
        {
            let before = self.token_start();
            match self.guarded(STATEMENT_RECOVERY, |p| p.parse_statement(false)) {
                Ok(id) => {
                    if id.is_some() {
                        self.maybe_promote_directive(id, &mut in_prologue);
                        statements.push(id);
                    }
                }
                Err(err) => {
                    if err.partial.is_some() {
                        statements.push(err.partial);
                    }
                    if self.token() == TokenKind::EndOfFileToken {
                        break;
                    }
                }
            }
            if self.token_start() == before
                && self.token() != TokenKind::CloseBraceToken
                && self.token() != TokenKind::EndOfFileToken
            {
                self.error_here(ErrorKind::UnexpectedToken, "unexpected token");
                self.next_token();
            }
        }
        statements
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_variable_statement(&mut self, decl_kind: DeclKind) -> ParseResult {
        let start = self.token_start();
        self.next_token(); // var / let / const
        let declarations = self.parse_declarator_list(decl_kind, false)?;
        let span = self.finish_span(start);
        let node = self.node(
            span,
            NodeData::Var {
                decl_kind,
                declarations,
            },
        );
        self.expect_semicolon(node)
    }

    fn parse_declarator_list(
        &mut self,
        decl_kind: DeclKind,
        no_in: bool,
    ) -> Result<Vec<NodeId>, RecoveryError> {
        let mut declarations = Vec::new();
        loop {
            match self.parse_declarator(decl_kind, no_in) {
                Ok(id) => declarations.push(id),
                Err(mut err) => {
                    if err.partial.is_some() {
                        declarations.push(err.partial);
                    }
                    // Hand the list built so far to the statement node.
                    err.partial = NodeId::NONE;
                    let span = declarations
                        .first()
                        .map(|&id| self.arena().span(id))
                        .unwrap_or(Span::new(self.token_start(), 0));
                    let span = self.finish_span(span.start);
                    let node = self.node(
                        span,
                        NodeData::Var {
                            decl_kind,
                            declarations,
                        },
                    );
                    return Err(RecoveryError {
                        partial: node,
                        token: err.token,
                    });
                }
            }
            if !self.eat(TokenKind::CommaToken) {
                break;
            }
        }
        Ok(declarations)
    }

    fn parse_declarator(&mut self, decl_kind: DeclKind, no_in: bool) -> ParseResult {
        let start = self.token_start();
        let (name, name_span) = match self.parse_identifier_name() {
            Some(pair) => pair,
            None => {
                self.error_here(ErrorKind::ExpectedIdentifier, "expected a variable name");
                return Err(RecoveryError {
                    partial: NodeId::NONE,
                    token: self.token(),
                });
            }
        };
        let initializer = if self.eat(TokenKind::EqualsToken) {
            let init_start = self.token_start();
            match self.parse_assignment_expression(no_in) {
                Ok(id) => id,
                Err(err) => {
                    let partial = self.partial_or_error(err, init_start);
                    let span = self.finish_span(start);
                    let node = self.node(
                        span,
                        NodeData::VariableDeclarator {
                            name,
                            name_span,
                            initializer: partial,
                        },
                    );
                    return Err(RecoveryError {
                        partial: node,
                        token: err.token,
                    });
                }
            }
        } else {
            if decl_kind == DeclKind::Const {
                let name_text = self.interner_resolve(name).to_owned();
                self.report(
                    Diagnostic::new(
                        ErrorKind::ExpectedToken,
                        name_span,
                        format!("const '{name_text}' requires an initializer"),
                    ),
                );
            }
            NodeId::NONE
        };
        let span = self.finish_span(start);
        Ok(self.node(
            span,
            NodeData::VariableDeclarator {
                name,
                name_span,
                initializer,
            },
        ))
    }

    fn parse_identifier_name(&mut self) -> Option<(Atom, Span)> {
        if self.token() != TokenKind::Identifier {
            return None;
        }
        let atom = self.intern_token_value();
        let span = self.token_span();
        self.next_token();
        Some((atom, span))
    }

    pub(crate) fn interner_resolve(&self, atom: Atom) -> &str {
        self.interner().resolve(atom)
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn parse_if(&mut self) -> ParseResult {
        let start = self.token_start();
        self.next_token();
        let condition = self.parse_paren_expression()?;
        let then_branch = self.parse_guarded_statement()?;
        let else_branch = if self.eat(TokenKind::ElseKeyword) {
            self.parse_guarded_statement()?
        } else {
            NodeId::NONE
        };
        let span = self.finish_span(start);
        Ok(self.node(
            span,
            NodeData::If {
                condition,
                then_branch,
                else_branch,
            },
        ))
    }

    fn parse_while(&mut self) -> ParseResult {
        let start = self.token_start();
        self.next_token();
        let condition = self.parse_paren_expression()?;
        let body = self.parse_loop_body()?;
        let span = self.finish_span(start);
        Ok(self.node(span, NodeData::While { condition, body }))
    }

    fn parse_do_while(&mut self) -> ParseResult {
        let start = self.token_start();
        self.next_token();
        let body = self.parse_loop_body()?;
        self.parse_expected(TokenKind::WhileKeyword);
        let condition = self.parse_paren_expression()?;
        // The trailing semicolon is always optional after `do..while (..)`.
        self.eat(TokenKind::SemicolonToken);
        let span = self.finish_span(start);
        Ok(self.node(span, NodeData::DoWhile { body, condition }))
    }

    fn parse_for(&mut self) -> ParseResult {
        let start = self.token_start();
        self.next_token();
        self.parse_expected(TokenKind::OpenParenToken);

        // Head: either a declaration or an expression, parsed with `in`
        // suppressed so `for (x in y)` is still decidable afterwards.
        if self.token() == TokenKind::SemicolonToken {
            self.next_token();
            return self.parse_classic_for_tail(start, NodeId::NONE);
        }

        let decl_kind = match self.token() {
            TokenKind::VarKeyword => Some(DeclKind::Var),
            TokenKind::ConstKeyword => Some(DeclKind::Const),
            TokenKind::Identifier
                if self.is_contextual("let") && self.peek() == TokenKind::Identifier =>
            {
                Some(DeclKind::Let)
            }
            _ => None,
        };

        if let Some(decl_kind) = decl_kind {
            let head_start = self.token_start();
            self.next_token();
            let first = self.parse_declarator(decl_kind, true)?;
            if let Some(kind) = self.for_in_kind() {
                self.next_token(); // in / of
                let head_span = self.finish_span(head_start);
                let variable = self.node(
                    head_span,
                    NodeData::Var {
                        decl_kind,
                        declarations: vec![first],
                    },
                );
                return self.parse_for_in_tail(start, kind, variable);
            }
            let mut declarations = vec![first];
            while self.eat(TokenKind::CommaToken) {
                declarations.push(self.parse_declarator(decl_kind, true)?);
            }
            let head_span = self.finish_span(head_start);
            let initializer = self.node(
                head_span,
                NodeData::Var {
                    decl_kind,
                    declarations,
                },
            );
            self.parse_expected(TokenKind::SemicolonToken);
            return self.parse_classic_for_tail(start, initializer);
        }

        let head = self.parse_expression(true)?;
        if let Some(kind) = self.for_in_kind() {
            self.next_token();
            if !is_valid_assignment_target(self.arena(), head) {
                let span = self.arena().span(head);
                self.report(Diagnostic::new(
                    ErrorKind::BadAssignmentTarget,
                    span,
                    "invalid target in for-in head",
                ));
            }
            return self.parse_for_in_tail(start, kind, head);
        }
        self.parse_expected(TokenKind::SemicolonToken);
        self.parse_classic_for_tail(start, head)
    }

    fn for_in_kind(&self) -> Option<ForInKind> {
        if self.token() == TokenKind::InKeyword {
            Some(ForInKind::In)
        } else if self.is_contextual("of") {
            Some(ForInKind::Of)
        } else {
            None
        }
    }

    fn parse_classic_for_tail(&mut self, start: u32, initializer: NodeId) -> ParseResult {
        let condition = if self.token() == TokenKind::SemicolonToken {
            NodeId::NONE
        } else {
            self.parse_expression(false)?
        };
        self.parse_expected(TokenKind::SemicolonToken);
        let incrementer = if self.token() == TokenKind::CloseParenToken {
            NodeId::NONE
        } else {
            self.parse_expression(false)?
        };
        self.parse_expected(TokenKind::CloseParenToken);
        let body = self.parse_loop_body()?;
        let span = self.finish_span(start);
        Ok(self.node(
            span,
            NodeData::For {
                initializer,
                condition,
                incrementer,
                body,
            },
        ))
    }

    fn parse_for_in_tail(&mut self, start: u32, kind: ForInKind, variable: NodeId) -> ParseResult {
        let collection = self.parse_expression(false)?;
        self.parse_expected(TokenKind::CloseParenToken);
        let body = self.parse_loop_body()?;
        let span = self.finish_span(start);
        Ok(self.node(
            span,
            NodeData::ForIn {
                kind,
                variable,
                collection,
                body,
            },
        ))
    }

    fn parse_loop_body(&mut self) -> ParseResult {
        self.block_stack.push(EnclosingBlock::Loop);
        let result = self.guarded(STATEMENT_RECOVERY, |p| p.parse_statement(false));
        self.block_stack.pop();
        result
    }

    /// Nested statement with statement-boundary recovery, so a broken branch
    /// body does not take its parent construct down with it.
    fn parse_guarded_statement(&mut self) -> ParseResult {
        self.guarded(STATEMENT_RECOVERY, |p| p.parse_statement(false))
    }

    fn parse_paren_expression(&mut self) -> ParseResult {
        self.parse_expected(TokenKind::OpenParenToken);
        let start = self.token_start();
        let expression = self.guarded(PAREN_RECOVERY, |p| p.parse_expression(false));
        let expression = match expression {
            Ok(id) if id.is_some() => id,
            Ok(_) => self.error_node(Span::new(start, 0)),
            Err(err) => return Err(err),
        };
        self.parse_expected(TokenKind::CloseParenToken);
        Ok(expression)
    }

    // ========================================================================
    // Switch
    // ========================================================================

    fn parse_switch(&mut self) -> ParseResult {
        let start = self.token_start();
        self.next_token();
        let expression = self.parse_paren_expression()?;
        self.parse_expected(TokenKind::OpenBraceToken);
        self.block_stack.push(EnclosingBlock::Switch);
        let mut cases = Vec::new();
        let mut seen_default = false;
        while self.token() != TokenKind::CloseBraceToken
            && self.token() != TokenKind::EndOfFileToken
        {
            match self.guarded(CASE_RECOVERY, |p| p.parse_switch_case(&mut seen_default)) {
                Ok(id) if id.is_some() => cases.push(id),
                Ok(_) => {}
                Err(_) => break,
            }
        }
        self.block_stack.pop();
        self.parse_expected(TokenKind::CloseBraceToken);
        let span = self.finish_span(start);
        Ok(self.node(span, NodeData::Switch { expression, cases }))
    }

    fn parse_switch_case(&mut self, seen_default: &mut bool) -> ParseResult {
        let start = self.token_start();
        let test = match self.token() {
            TokenKind::CaseKeyword => {
                self.next_token();
                self.parse_expression(false)?
            }
            TokenKind::DefaultKeyword => {
                if *seen_default {
                    self.error_here(ErrorKind::UnexpectedToken, "more than one 'default' clause");
                }
                *seen_default = true;
                self.next_token();
                NodeId::NONE
            }
            _ => {
                self.error_here(ErrorKind::UnexpectedToken, "expected 'case' or 'default'");
                return Err(RecoveryError {
                    partial: NodeId::NONE,
                    token: self.token(),
                });
            }
        };
        self.parse_expected(TokenKind::ColonToken);
        let body_start = self.token_start();
        let mut statements = Vec::new();
        while !matches!(
            self.token(),
            TokenKind::CaseKeyword
                | TokenKind::DefaultKeyword
                | TokenKind::CloseBraceToken
                | TokenKind::EndOfFileToken
        ) {
            let before = self.token_start();
            match self.guarded(STATEMENT_RECOVERY, |p| p.parse_statement(false)) {
                Ok(id) if id.is_some() => statements.push(id),
                Ok(_) => {}
                Err(err) => {
                    if err.partial.is_some() {
                        statements.push(err.partial);
                    }
                }
            }
            if self.token_start() == before
                && !matches!(
                    self.token(),
                    TokenKind::CaseKeyword
                        | TokenKind::DefaultKeyword
                        | TokenKind::CloseBraceToken
                        | TokenKind::EndOfFileToken
                )
            {
                self.error_here(ErrorKind::UnexpectedToken, "unexpected token");
                self.next_token();
            }
        }
        let body_span = self.finish_span(body_start);
        let body = self.node(body_span, NodeData::Block { statements });
        let span = self.finish_span(start);
        Ok(self.node(span, NodeData::SwitchCase { test, body }))
    }

    // ========================================================================
    // Exceptions
    // ========================================================================

    fn parse_try(&mut self) -> ParseResult {
        let start = self.token_start();
        self.next_token();
        let block = self.parse_block()?;
        let mut catch_parameter = NodeId::NONE;
        let mut catch_block = NodeId::NONE;
        if self.eat(TokenKind::CatchKeyword) {
            self.parse_expected(TokenKind::OpenParenToken);
            if let Some((name, name_span)) = self.parse_identifier_name() {
                catch_parameter = self.node(
                    name_span,
                    NodeData::VariableDeclarator {
                        name,
                        name_span,
                        initializer: NodeId::NONE,
                    },
                );
            } else {
                self.error_here(ErrorKind::ExpectedIdentifier, "expected a catch parameter");
            }
            self.parse_expected(TokenKind::CloseParenToken);
            catch_block = self.parse_block()?;
        }
        let finally_block = if self.eat(TokenKind::FinallyKeyword) {
            self.block_stack.push(EnclosingBlock::Finally);
            let block = self.parse_block();
            self.block_stack.pop();
            block?
        } else {
            NodeId::NONE
        };
        if catch_block.is_none() && finally_block.is_none() {
            let span = Span::new(start, 3);
            self.report(Diagnostic::new(
                ErrorKind::NoCatchOrFinally,
                span,
                "'try' requires a 'catch' or 'finally' clause",
            ));
        }
        let span = self.finish_span(start);
        Ok(self.node(
            span,
            NodeData::Try {
                block,
                catch_parameter,
                catch_block,
                finally_block,
            },
        ))
    }

    fn parse_throw(&mut self) -> ParseResult {
        let start = self.token_start();
        self.next_token();
        if self.has_preceding_line_break() {
            // `throw` and its operand must share a line.
            let span = Span::new(self.last_end(), 0);
            self.report(Diagnostic::new(
                ErrorKind::ExpectedExpression,
                span,
                "'throw' requires an expression on the same line",
            ));
            let expression = self.error_node(span);
            let span = self.finish_span(start);
            let node = self.node(span, NodeData::Throw { expression });
            return Ok(node);
        }
        let expression = self.parse_expression(false)?;
        let span = self.finish_span(start);
        let node = self.node(span, NodeData::Throw { expression });
        self.expect_semicolon(node)
    }

    // ========================================================================
    // Jumps and labels
    // ========================================================================

    fn parse_return(&mut self) -> ParseResult {
        let start = self.token_start();
        self.next_token();
        let expression = if matches!(
            self.token(),
            TokenKind::SemicolonToken | TokenKind::CloseBraceToken | TokenKind::EndOfFileToken
        ) || self.has_preceding_line_break()
        {
            NodeId::NONE
        } else {
            self.parse_expression(false)?
        };
        let span = self.finish_span(start);
        let node = self.node(span, NodeData::Return { expression });
        self.expect_semicolon(node)
    }

    fn parse_break_or_continue(&mut self, is_break: bool) -> ParseResult {
        let start = self.token_start();
        let keyword_span = self.token_span();
        self.next_token();
        let label = if self.token() == TokenKind::Identifier && !self.has_preceding_line_break() {
            let atom = self.intern_token_value();
            let label_span = self.token_span();
            self.next_token();
            Some((atom, label_span))
        } else {
            None
        };

        let finally_count = match label {
            Some((atom, label_span)) => match self.labels.get(&atom) {
                Some(info) => self.finallies_above(info.block_depth),
                None => {
                    let name = self.interner_resolve(atom).to_owned();
                    self.report(
                        Diagnostic::new(
                            ErrorKind::LabelNotFound,
                            label_span,
                            format!("label '{name}' is not defined"),
                        )
                        .with_subject(name),
                    );
                    0
                }
            },
            None => {
                let target = self.block_stack.iter().rposition(|&b| {
                    b == EnclosingBlock::Loop || (is_break && b == EnclosingBlock::Switch)
                });
                match target {
                    Some(depth) => self.finallies_above(depth + 1),
                    None => {
                        let (kind, message) = if is_break {
                            (ErrorKind::BadBreak, "'break' outside of a loop or switch")
                        } else {
                            (ErrorKind::BadContinue, "'continue' outside of a loop")
                        };
                        self.report(Diagnostic::new(kind, keyword_span, message));
                        0
                    }
                }
            }
        };

        let label_atom = label.map(|(atom, _)| atom).unwrap_or(Atom::NONE);
        let span = self.finish_span(start);
        let node = if is_break {
            self.node(
                span,
                NodeData::Break {
                    label: label_atom,
                    finally_count,
                },
            )
        } else {
            self.node(
                span,
                NodeData::Continue {
                    label: label_atom,
                    finally_count,
                },
            )
        };
        self.expect_semicolon(node)
    }

    /// Number of `finally` blocks between the top of the block stack and
    /// `depth`, i.e. how many a jump to that depth escapes.
    fn finallies_above(&self, depth: usize) -> u32 {
        self.block_stack[depth..]
            .iter()
            .filter(|&&b| b == EnclosingBlock::Finally)
            .count() as u32
    }

    fn parse_labeled(&mut self, top_level: bool) -> ParseResult {
        let start = self.token_start();
        let label = self.intern_token_value();
        let label_span = self.token_span();
        self.next_token();
        self.next_token(); // colon, checked by the caller's peek

        let duplicate = self.labels.contains_key(&label);
        if duplicate {
            let name = self.interner_resolve(label).to_owned();
            self.report(
                Diagnostic::new(
                    ErrorKind::DuplicateLabel,
                    label_span,
                    format!("label '{name}' is already in use"),
                )
                .with_subject(name),
            );
        } else {
            self.labels.insert(
                label,
                LabelInfo {
                    block_depth: self.block_stack.len(),
                },
            );
        }
        let statement = self.parse_statement(top_level);
        if !duplicate {
            self.labels.remove(&label);
        }
        let statement = statement?;
        let span = self.finish_span(start);
        Ok(self.node(
            span,
            NodeData::Labeled {
                label,
                label_span,
                statement,
            },
        ))
    }

    // ========================================================================
    // with
    // ========================================================================

    fn parse_with(&mut self) -> ParseResult {
        let start = self.token_start();
        let keyword_span = self.token_span();
        self.next_token();
        self.report(Diagnostic::new(
            ErrorKind::WithNotRecommended,
            keyword_span,
            "'with' statements defeat static scoping",
        ));
        let object = self.parse_paren_expression()?;
        let body = self.parse_guarded_statement()?;
        let span = self.finish_span(start);
        Ok(self.node(span, NodeData::With { object, body }))
    }

    // ========================================================================
    // Functions
    // ========================================================================

    fn parse_function_declaration(&mut self, top_level: bool) -> ParseResult {
        if !top_level && !self.strict_mode {
            let span = self.token_span();
            self.report(Diagnostic::new(
                ErrorKind::MisplacedFunctionDeclaration,
                span,
                "function declarations belong at the top level of a program or function body",
            ));
        }
        self.parse_function(FunctionType::Declaration)
    }

    /// `function_type` decides whether a name is required. Getters/setters
    /// arrive with their keyword already consumed and no `function` token.
    pub(crate) fn parse_function(&mut self, function_type: FunctionType) -> ParseResult {
        let start = self.token_start();
        if matches!(
            function_type,
            FunctionType::Declaration | FunctionType::Expression
        ) {
            self.next_token(); // function
        }

        let (name, name_span) = match self.parse_identifier_name() {
            Some((name, span)) => (name, span),
            None => {
                if function_type == FunctionType::Declaration {
                    let span = self.token_span();
                    self.report(Diagnostic::new(
                        ErrorKind::FunctionNameRequired,
                        span,
                        "function declarations require a name",
                    ));
                }
                (Atom::NONE, Span::new(self.token_start(), 0))
            }
        };

        let parameters = self.parse_parameter_list();
        let body = self.parse_function_body()?;

        let span = self.finish_span(start);
        Ok(self.node(
            span,
            NodeData::FunctionObject {
                function_type,
                name,
                name_span,
                parameters,
                body,
            },
        ))
    }

    fn parse_parameter_list(&mut self) -> Vec<NodeId> {
        self.parse_expected(TokenKind::OpenParenToken);
        let mut parameters = Vec::new();
        if self.token() != TokenKind::CloseParenToken {
            loop {
                match self.parse_identifier_name() {
                    Some((name, span)) => {
                        let position = parameters.len() as u32;
                        parameters.push(self.node(
                            span,
                            NodeData::ParameterDeclaration { name, position },
                        ));
                    }
                    None => {
                        self.error_here(ErrorKind::ExpectedIdentifier, "expected a parameter name");
                        break;
                    }
                }
                if !self.eat(TokenKind::CommaToken) {
                    break;
                }
            }
        }
        self.parse_expected(TokenKind::CloseParenToken);
        parameters
    }

    /// Function bodies get fresh label and break/continue contexts, and a
    /// fresh directive prologue. Strict mode is lexical: a body's
    /// `"use strict"` does not leak out.
    fn parse_function_body(&mut self) -> ParseResult {
        let saved_labels = std::mem::take(&mut self.labels);
        let saved_blocks = std::mem::take(&mut self.block_stack);
        let saved_strict = self.strict_mode;

        let start = self.token_start();
        self.parse_expected(TokenKind::OpenBraceToken);
        let statements = self.parse_statement_list(true);
        self.parse_expected(TokenKind::CloseBraceToken);
        let span = self.finish_span(start);
        let body = self.node(span, NodeData::Block { statements });

        self.labels = saved_labels;
        self.block_stack = saved_blocks;
        self.strict_mode = saved_strict;
        Ok(body)
    }
}
