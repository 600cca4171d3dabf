//! Parser state and the error-recovery driver.
//!
//! The parser is a hand-written recursive descent over the scanner's token
//! stream. Statement and expression productions live in sibling files as
//! additional `impl ParserState` blocks:
//! - `statements.rs` - statement forms, functions, labels, break targets
//! - `expressions.rs` - precedence climbing, unary/postfix, primaries
//!
//! Recovery model: a production that cannot continue returns
//! `Err(RecoveryError)` carrying its best-effort partial node. Enclosing
//! productions register token sets on the `no_skip` stack via `guarded`;
//! `recover` skips at most `MAX_SKIPPED_TOKENS` tokens until one of the
//! active sets claims the current token, then either resumes locally or
//! propagates outward. The parser never aborts and always yields a tree.

pub mod expressions;
pub mod statements;

use crate::ast::arena::{AstArena, NodeId};
use crate::ast::node::{ConstantValue, NodeData};
use jscope_common::diagnostics::{Diagnostic, DiagnosticBag, ErrorKind, ErrorSink};
use jscope_common::interner::{Atom, Interner};
use jscope_common::limits::{MAX_PARSE_DEPTH, MAX_SKIPPED_TOKENS};
use jscope_common::span::Span;
use jscope_scanner::scanner::Scanner;
use jscope_scanner::token::TokenKind;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

// ============================================================================
// Recovery plumbing
// ============================================================================

/// A failed production: `partial` is the best tree built so far (possibly
/// `NodeId::NONE`), `token` is the token that stopped it.
#[derive(Clone, Copy, Debug)]
pub struct RecoveryError {
    pub partial: NodeId,
    pub token: TokenKind,
}

pub type ParseResult = Result<NodeId, RecoveryError>;

/// What kind of construct encloses the statement being parsed. Drives
/// `break`/`continue` target validation and `finally_count` bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnclosingBlock {
    Block,
    Loop,
    Switch,
    Finally,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct LabelInfo {
    /// `block_stack` depth at the label, for `finally_count`.
    pub block_depth: usize,
}

// Tokens that reliably begin or delimit a statement. Used as the outermost
// recovery set so a bad statement never swallows the rest of the file.
pub(crate) const STATEMENT_RECOVERY: &[TokenKind] = &[
    TokenKind::SemicolonToken,
    TokenKind::OpenBraceToken,
    TokenKind::CloseBraceToken,
    TokenKind::VarKeyword,
    TokenKind::ConstKeyword,
    TokenKind::IfKeyword,
    TokenKind::ForKeyword,
    TokenKind::WhileKeyword,
    TokenKind::DoKeyword,
    TokenKind::SwitchKeyword,
    TokenKind::TryKeyword,
    TokenKind::ReturnKeyword,
    TokenKind::BreakKeyword,
    TokenKind::ContinueKeyword,
    TokenKind::ThrowKeyword,
    TokenKind::FunctionKeyword,
    TokenKind::DebuggerKeyword,
];

pub(crate) const PAREN_RECOVERY: &[TokenKind] =
    &[TokenKind::CloseParenToken, TokenKind::OpenBraceToken];

pub(crate) const BRACKET_RECOVERY: &[TokenKind] =
    &[TokenKind::CloseBracketToken, TokenKind::CommaToken];

pub(crate) const BRACE_RECOVERY: &[TokenKind] =
    &[TokenKind::CloseBraceToken, TokenKind::CommaToken];

pub(crate) const CASE_RECOVERY: &[TokenKind] = &[
    TokenKind::CaseKeyword,
    TokenKind::DefaultKeyword,
    TokenKind::CloseBraceToken,
];

// ============================================================================
// ParserState
// ============================================================================

/// One parse in flight. Owns the scanner, the arena being built, the string
/// interner, and the diagnostic bag; `into_parts` releases them when done.
pub struct ParserState {
    scanner: Scanner,
    arena: AstArena,
    interner: Interner,
    diagnostics: DiagnosticBag,
    /// Current (lookahead) token kind.
    current: TokenKind,
    /// End offset of the previous token, for trailing-span bookkeeping.
    last_token_end: u32,
    /// Whether a `"use strict"` directive (or the caller) put us in strict
    /// mode. Lexically saved/restored around function bodies.
    pub(crate) strict_mode: bool,
    pub(crate) block_stack: SmallVec<[EnclosingBlock; 16]>,
    pub(crate) labels: FxHashMap<Atom, LabelInfo>,
    /// Active recovery token sets, innermost last.
    no_skip: SmallVec<[&'static [TokenKind]; 16]>,
    depth: u32,
}

impl ParserState {
    pub fn new(source: String, interner: Interner, allow_shebang: bool) -> ParserState {
        let mut state = ParserState {
            scanner: Scanner::new(source, allow_shebang),
            arena: AstArena::new(),
            interner,
            diagnostics: DiagnosticBag::new(),
            current: TokenKind::Unknown,
            last_token_end: 0,
            strict_mode: false,
            block_stack: SmallVec::new(),
            labels: FxHashMap::default(),
            no_skip: SmallVec::new(),
            depth: 0,
        };
        state.current = state.scanner.scan();
        state.pump_scanner_diagnostics();
        state
    }

    pub fn set_strict_mode(&mut self, strict: bool) {
        self.strict_mode = strict;
    }

    /// Release the arena, interner, and diagnostics once parsing is done.
    pub fn into_parts(self) -> (AstArena, Interner, DiagnosticBag) {
        (self.arena, self.interner, self.diagnostics)
    }

    pub fn arena(&self) -> &AstArena {
        &self.arena
    }

    pub fn diagnostics(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    #[inline]
    pub(crate) fn token(&self) -> TokenKind {
        self.current
    }

    pub(crate) fn next_token(&mut self) {
        self.last_token_end = self.scanner.token_end();
        self.current = self.scanner.scan();
        self.pump_scanner_diagnostics();
    }

    fn pump_scanner_diagnostics(&mut self) {
        for diagnostic in self.scanner.take_diagnostics() {
            self.diagnostics.report(diagnostic);
        }
    }

    pub(crate) fn token_start(&self) -> u32 {
        self.scanner.token_start()
    }

    pub(crate) fn token_span(&self) -> Span {
        self.scanner.token_span()
    }

    pub(crate) fn token_text(&self) -> &str {
        self.scanner.token_value()
    }

    pub(crate) fn token_numeric_value(&self) -> f64 {
        self.scanner.token_numeric_value()
    }

    pub(crate) fn token_regex_flags(&self) -> &str {
        self.scanner.token_regex_flags()
    }

    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    /// `let`, `of`, `get`, `set` scan as identifiers; the grammar recognizes
    /// them by text at the positions where they matter.
    pub(crate) fn is_contextual(&self, word: &str) -> bool {
        self.current == TokenKind::Identifier && self.scanner.token_value() == word
    }

    /// Kind of the token after the current one, without consuming anything.
    pub(crate) fn peek(&mut self) -> TokenKind {
        let checkpoint = self.scanner.save_state();
        let kind = self.scanner.scan();
        self.scanner.restore_state(checkpoint);
        kind
    }

    pub(crate) fn rescan_slash_as_regex(&mut self) {
        self.current = self.scanner.rescan_slash_as_regex();
        self.pump_scanner_diagnostics();
    }

    pub(crate) fn intern_token_value(&mut self) -> Atom {
        let text = self.scanner.token_value();
        self.interner.intern(text)
    }

    pub(crate) fn interner(&self) -> &Interner {
        &self.interner
    }

    pub(crate) fn last_end(&self) -> u32 {
        self.last_token_end
    }

    // ------------------------------------------------------------------
    // Node construction
    // ------------------------------------------------------------------

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn finish_span(&self, start: u32) -> Span {
        Span::from_bounds(start, self.last_token_end.max(start))
    }

    /// Allocate a node and claim its children.
    pub(crate) fn node(&mut self, span: Span, data: NodeData) -> NodeId {
        let id = self.arena.alloc(span, data);
        self.arena.claim_children(id);
        id
    }

    /// Placeholder node standing in for something that failed to parse.
    pub(crate) fn error_node(&mut self, span: Span) -> NodeId {
        self.arena.alloc(
            span,
            NodeData::Constant {
                value: ConstantValue::Missing,
            },
        )
    }

    /// Turn a recovery payload into a node, substituting a placeholder when
    /// the failed production had nothing to offer.
    pub(crate) fn partial_or_error(&mut self, err: RecoveryError, start: u32) -> NodeId {
        if err.partial.is_some() {
            err.partial
        } else {
            self.error_node(Span::new(start, 0))
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }

    pub(crate) fn error_here(&mut self, kind: ErrorKind, message: impl Into<String>) {
        let span = self.token_span();
        self.diagnostics.report(Diagnostic::new(kind, span, message));
    }

    // ------------------------------------------------------------------
    // Expect / consume helpers
    // ------------------------------------------------------------------

    /// Consume `kind` if present.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume `kind`, reporting a soft diagnostic if it is missing. Parsing
    /// continues either way; the return value says whether it was there.
    pub(crate) fn parse_expected(&mut self, kind: TokenKind) -> bool {
        if self.current == kind {
            self.next_token();
            return true;
        }
        let span = self.token_span();
        self.report(Diagnostic::new(
            ErrorKind::ExpectedToken,
            span,
            format!("expected '{}'", kind.text()),
        ));
        false
    }

    /// Statement terminator with automatic semicolon insertion. A real `;`
    /// is consumed silently. A `}`/end-of-file/preceding line break inserts
    /// one and leaves a style note. Anything else is a hard error that
    /// surrenders `partial` for recovery.
    pub(crate) fn expect_semicolon(&mut self, partial: NodeId) -> ParseResult {
        if self.current == TokenKind::SemicolonToken {
            self.next_token();
            return Ok(partial);
        }
        if self.current == TokenKind::CloseBraceToken
            || self.current == TokenKind::EndOfFileToken
            || self.has_preceding_line_break()
        {
            let span = Span::new(self.last_token_end, 0);
            self.report(Diagnostic::new(
                ErrorKind::SemicolonInsertion,
                span,
                "missing semicolon",
            ));
            return Ok(partial);
        }
        let span = self.token_span();
        self.report(Diagnostic::new(
            ErrorKind::ExpectedSemicolon,
            span,
            "expected ';' after statement",
        ));
        Err(RecoveryError {
            partial,
            token: self.current,
        })
    }

    // ------------------------------------------------------------------
    // Recovery driver
    // ------------------------------------------------------------------

    /// Run `f` with `set` registered as the local recovery set. On failure,
    /// skip forward until an active set claims the current token; if it is
    /// this production's own set, resume with the partial node, otherwise
    /// propagate so an outer `guarded` can handle it.
    pub(crate) fn guarded<F>(&mut self, set: &'static [TokenKind], f: F) -> ParseResult
    where
        F: FnOnce(&mut ParserState) -> ParseResult,
    {
        self.no_skip.push(set);
        let result = f(self);
        self.no_skip.pop();
        match result {
            Ok(id) => Ok(id),
            Err(err) => self.recover(err, set),
        }
    }

    fn recover(&mut self, err: RecoveryError, set: &'static [TokenKind]) -> ParseResult {
        let mut skipped = 0usize;
        while self.current != TokenKind::EndOfFileToken
            && !self.in_any_active_set(self.current)
            && !set.contains(&self.current)
            && skipped < MAX_SKIPPED_TOKENS
        {
            trace!(token = ?self.current, "skipping during recovery");
            self.next_token();
            skipped += 1;
        }
        if set.contains(&self.current) {
            Ok(err.partial)
        } else {
            Err(RecoveryError {
                partial: err.partial,
                token: self.current,
            })
        }
    }

    fn in_any_active_set(&self, kind: TokenKind) -> bool {
        self.no_skip.iter().any(|set| set.contains(&kind))
    }

    // ------------------------------------------------------------------
    // Depth guard
    // ------------------------------------------------------------------

    /// Bounded nesting. Returns an error payload once the budget is blown so
    /// pathological inputs cannot overflow the stack.
    pub(crate) fn enter_depth(&mut self) -> Result<(), RecoveryError> {
        if self.depth >= MAX_PARSE_DEPTH {
            let span = self.token_span();
            self.report(
                Diagnostic::new(
                    ErrorKind::ParseDepthExceeded,
                    span,
                    "input is nested too deeply",
                )
                .unrecoverable(),
            );
            return Err(RecoveryError {
                partial: NodeId::NONE,
                token: self.current,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave_depth(&mut self) {
        self.depth -= 1;
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// Parse a whole program. Always returns a root `Block`; malformed input
    /// produces partial statements plus diagnostics, never an abort.
    pub fn parse_program(&mut self) -> NodeId {
        let mut statements = Vec::new();
        let mut in_prologue = true;
        while self.current != TokenKind::EndOfFileToken {
            let before = self.token_start();
            let result = self.guarded(STATEMENT_RECOVERY, |p| p.parse_statement(true));
            match result {
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
                    if self.current == TokenKind::EndOfFileToken {
                        let span = Span::new(self.last_token_end, 0);
                        self.report(Diagnostic::new(
                            ErrorKind::UnexpectedEndOfFile,
                            span,
                            "unexpected end of input",
                        ));
                        break;
                    }
                }
            }
            // Guarantee forward progress even when recovery settles on a
            // token no statement can start with.
            if self.token_start() == before && self.current != TokenKind::EndOfFileToken {
                self.error_here(ErrorKind::UnexpectedToken, "unexpected token");
                self.next_token();
            }
        }
        let span = Span::from_bounds(0, self.last_token_end);
        self.node(span, NodeData::Block { statements })
    }

    /// Parse a single expression (expression source mode). Trailing tokens
    /// are reported, not consumed into the tree.
    pub fn parse_expression_entry(&mut self) -> NodeId {
        let start = self.token_start();
        let id = match self.parse_expression(false) {
            Ok(id) => id,
            Err(err) => self.partial_or_error(err, start),
        };
        if self.current != TokenKind::EndOfFileToken {
            self.error_here(ErrorKind::UnexpectedToken, "unexpected token after expression");
        }
        id
    }

    /// Promote a bare leading string-constant statement to a `Directive`
    /// while still inside the prologue; clear the prologue otherwise.
    pub(crate) fn maybe_promote_directive(&mut self, id: NodeId, in_prologue: &mut bool) {
        if !*in_prologue {
            return;
        }
        let value = match &self.arena.node(id).data {
            NodeData::Constant {
                value: ConstantValue::String(s),
            } => s.clone(),
            _ => {
                *in_prologue = false;
                return;
            }
        };
        let use_strict = value == "use strict";
        if use_strict {
            self.strict_mode = true;
        }
        self.arena.node_mut(id).data = NodeData::Directive { value, use_strict };
    }
}
