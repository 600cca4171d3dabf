//! The resolver: four ordered passes over the AST and scope tree.
//!
//! 1. Build the scope tree (one AST walk): create Block/Function/Catch/With
//!    scopes, collapse transparent blocks, record declarations and lookups.
//! 2. Materialize fields: parameters, `arguments`, self-bindings, lexical
//!    names (with duplicate errors), and hoisted `var` names.
//! 3. Resolve every recorded lookup outward through the chain, caching
//!    inner fields and wrapping anything that crosses a `with` scope.
//! 4. Ghosting: synthesize the legacy bindings old engines leaked for catch
//!    parameters and named function expressions, flagging the ambiguous
//!    cases. Runs strictly after 2 and 3, since it compares final fields.
//!
//! Nothing here aborts: every reference ends up bound to some field, even
//! if only an `UndefinedGlobal`, and every problem goes through the sink.

use crate::globals;
use crate::scopes::{
    FieldId, FieldKind, GhostCatch, GhostFunction, LexicalKind, LexicalName, ScopeArena, ScopeId,
    ScopeKind,
};
use jscope_common::diagnostics::{Diagnostic, ErrorKind, ErrorSink};
use jscope_common::interner::{Atom, Interner};
use jscope_common::limits::MAX_SCOPE_WALK;
use jscope_common::span::Span;
use jscope_parser::{AstArena, DeclKind, FunctionType, NodeData, NodeId, Visitor, walk};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::debug;

/// Caller-facing knobs for resolution.
#[derive(Debug, Default)]
pub struct ResolverOptions {
    /// Names resolved as host-provided globals instead of undeclared.
    pub known_globals: FxHashSet<String>,
    /// Legacy Mozilla semantics: `const` hoists like `var` instead of
    /// binding lexically.
    pub mozilla_const: bool,
    /// Force strict mode regardless of directive prologues.
    pub strict_mode: bool,
}

/// The finished product: the scope tree plus a total binding for every
/// `Lookup` node in the AST.
#[derive(Debug)]
pub struct ScopeTree {
    pub arena: ScopeArena,
    pub root: ScopeId,
    bindings: FxHashMap<NodeId, FieldId>,
}

impl ScopeTree {
    pub fn binding(&self, node: NodeId) -> Option<FieldId> {
        self.bindings.get(&node).copied()
    }

    pub fn field_for(&self, node: NodeId) -> Option<&crate::scopes::VariableField> {
        self.binding(node).map(|id| self.arena.field(id))
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}

/// One resolution in flight.
pub struct ResolverState<'a> {
    ast: &'a AstArena,
    interner: &'a mut Interner,
    options: &'a ResolverOptions,
    scopes: ScopeArena,
    bindings: FxHashMap<NodeId, FieldId>,
    root: ScopeId,
}

impl<'a> ResolverState<'a> {
    pub fn new(
        ast: &'a AstArena,
        interner: &'a mut Interner,
        options: &'a ResolverOptions,
    ) -> ResolverState<'a> {
        ResolverState {
            ast,
            interner,
            options,
            scopes: ScopeArena::new(),
            bindings: FxHashMap::default(),
            root: ScopeId(0),
        }
    }

    /// Run all four phases over the program rooted at `root`.
    pub fn resolve(mut self, root: NodeId, sink: &mut dyn ErrorSink) -> ScopeTree {
        let global = self.scopes.alloc_global();
        self.root = global;
        if self.options.strict_mode {
            self.scopes.set_use_strict(global);
        }

        self.build_scopes(root);
        debug!(scopes = self.scopes.scope_count(), "scope tree built");
        self.declare_fields(sink);
        self.resolve_references(sink);
        self.apply_ghosts(sink);
        debug!(
            fields = self.scopes.field_count(),
            bindings = self.bindings.len(),
            "resolution complete"
        );

        ScopeTree {
            arena: self.scopes,
            root: global,
            bindings: self.bindings,
        }
    }

    // ========================================================================
    // Phase 1: scope building
    // ========================================================================

    fn build_scopes(&mut self, root: NodeId) {
        let mut builder = ScopeBuilder {
            scopes: &mut self.scopes,
            current: self.root,
            absorb_next_block: true,
            mozilla_const: self.options.mozilla_const,
        };
        walk(self.ast, root, &mut builder);
    }

    // ========================================================================
    // Phase 2: field declaration
    // ========================================================================

    fn declare_fields(&mut self, sink: &mut dyn ErrorSink) {
        let arguments_atom = self.interner.intern("arguments");
        let live: Vec<ScopeId> = self.scopes.live_scopes().collect();
        for id in live {
            let kind = self.scopes.scope(id).kind;
            if kind == ScopeKind::Function {
                self.declare_function_plumbing(id, arguments_atom);
            }
            if kind == ScopeKind::Catch {
                if let Some((name, span)) = self.scopes.scope(id).catch_parameter {
                    self.scopes
                        .declare_field(id, name, FieldKind::CatchError, span);
                }
            }
            self.declare_lexicals(id, sink);
            self.hoist_vars(id);
        }
    }

    fn declare_function_plumbing(&mut self, id: ScopeId, arguments_atom: Atom) {
        let parameters = self.scopes.scope(id).parameters.clone();
        for (position, (name, span)) in parameters.into_iter().enumerate() {
            // A repeated parameter name silently rebinds to the later slot,
            // matching sloppy-mode behavior.
            let field = self.scopes.declare_field(id, name, FieldKind::Argument, span);
            self.scopes.field_mut(field).argument_position = Some(position as u32);
        }
        if self.scopes.lookup_local(id, arguments_atom).is_none() {
            self.scopes
                .declare_field(id, arguments_atom, FieldKind::Arguments, Span::EMPTY);
        }
        let (self_name, self_span) = {
            let scope = self.scopes.scope(id);
            (scope.self_name, scope.self_name_span)
        };
        if !self_name.is_none() && self.scopes.lookup_local(id, self_name).is_none() {
            // A named function expression can call itself by name even
            // though the name is invisible outside.
            self.scopes
                .declare_field(id, self_name, FieldKind::Local, self_span);
        }
    }

    fn declare_lexicals(&mut self, id: ScopeId, sink: &mut dyn ErrorSink) {
        let lexicals: Vec<LexicalName> = self.scopes.scope(id).lexical_names.clone();
        let owner_kind = if self.scopes.scope(id).kind == ScopeKind::Global {
            FieldKind::Global
        } else {
            FieldKind::Local
        };
        let mut let_const_seen: FxHashSet<Atom> = FxHashSet::default();
        for lexical in lexicals {
            let is_let_const = matches!(lexical.kind, LexicalKind::Let | LexicalKind::Const);
            if is_let_const && !let_const_seen.insert(lexical.name) {
                let name = self.interner.resolve(lexical.name).to_owned();
                sink.report(
                    Diagnostic::new(
                        ErrorKind::DuplicateLexicalDeclaration,
                        lexical.span,
                        format!("'{name}' is already declared in this scope"),
                    )
                    .with_subject(name),
                );
                continue;
            }
            if self.scopes.lookup_local(id, lexical.name).is_none() {
                self.scopes
                    .declare_field(id, lexical.name, owner_kind, lexical.span);
            }
            if self.scopes.scope(id).self_name == lexical.name {
                self.scopes.scope_mut(id).declares_own_name = true;
            }
        }
    }

    /// `var` names hoist to the nearest variable scope, coalescing silently
    /// with whatever is already bound there.
    fn hoist_vars(&mut self, id: ScopeId) {
        let vars: Vec<(Atom, Span)> = self.scopes.scope(id).var_names.clone();
        if vars.is_empty() {
            return;
        }
        let target = self.scopes.variable_scope(id);
        let owner_kind = if self.scopes.scope(target).kind == ScopeKind::Global {
            FieldKind::Global
        } else {
            FieldKind::Local
        };
        for (name, span) in vars {
            if self.scopes.lookup_local(target, name).is_none() {
                self.scopes.declare_field(target, name, owner_kind, span);
            }
            if self.scopes.scope(target).self_name == name {
                self.scopes.scope_mut(target).declares_own_name = true;
            }
        }
    }

    // ========================================================================
    // Phase 3: reference resolution
    // ========================================================================

    fn resolve_references(&mut self, sink: &mut dyn ErrorSink) {
        let live: Vec<ScopeId> = self.scopes.live_scopes().collect();
        for id in live {
            let lookups = self.scopes.scope(id).lookups.clone();
            for node in lookups {
                let name = match self.ast.node(node).data {
                    NodeData::Lookup { name } => name,
                    _ => continue,
                };
                let span = self.ast.span(node);
                let field = self.resolve_reference(id, name, span, sink);
                self.bindings.insert(node, field);
            }
        }
    }

    fn resolve_reference(
        &mut self,
        scope: ScopeId,
        name: Atom,
        span: Span,
        sink: &mut dyn ErrorSink,
    ) -> FieldId {
        let mut chain: SmallVec<[ScopeId; 8]> = SmallVec::new();
        let mut at = scope;
        let mut steps = 0usize;
        let found = loop {
            if let Some(field) = self.scopes.lookup_local(at, name) {
                break field;
            }
            steps += 1;
            match self.scopes.scope(at).parent {
                Some(parent) if steps <= MAX_SCOPE_WALK => {
                    chain.push(at);
                    at = parent;
                }
                _ => break self.resolve_at_global(name, span, sink),
            }
        };
        // Unwind, caching an inner field per intermediate scope so repeat
        // references reuse one alias. Crossing a `with` poisons the kind.
        let mut outer = found;
        for &inner in chain.iter().rev() {
            let kind = if self.scopes.scope(inner).kind == ScopeKind::With {
                FieldKind::WithField
            } else {
                self.scopes.field(outer).kind
            };
            outer = self.scopes.declare_inner_field(inner, name, kind, outer);
        }
        outer
    }

    /// Last stop: built-ins, caller-supplied globals, then a synthesized
    /// `UndefinedGlobal` with a once-per-name diagnostic. The field is
    /// cached in the global name table either way.
    fn resolve_at_global(
        &mut self,
        name: Atom,
        span: Span,
        sink: &mut dyn ErrorSink,
    ) -> FieldId {
        let text = self.interner.resolve(name).to_owned();
        if globals::is_global_property(&text) || globals::is_global_function(&text) {
            return self
                .scopes
                .declare_field(self.root, name, FieldKind::Predefined, Span::EMPTY);
        }
        if self.options.known_globals.contains(&text) {
            return self
                .scopes
                .declare_field(self.root, name, FieldKind::Global, Span::EMPTY);
        }
        let field = self
            .scopes
            .declare_field(self.root, name, FieldKind::UndefinedGlobal, Span::EMPTY);
        sink.report(
            Diagnostic::new(
                ErrorKind::UndeclaredVariable,
                span,
                format!("'{text}' is not declared"),
            )
            .with_subject(text),
        );
        field
    }

    // ========================================================================
    // Phase 4: ghosting
    // ========================================================================

    fn apply_ghosts(&mut self, sink: &mut dyn ErrorSink) {
        let live: Vec<ScopeId> = self.scopes.live_scopes().collect();
        for id in live {
            if !self.scopes.scope(id).kind.is_variable_scope() {
                continue;
            }
            let catches: Vec<GhostCatch> = self.scopes.scope(id).ghost_catches.clone();
            for ghost in catches {
                self.apply_ghost(
                    id,
                    ghost.name,
                    ghost.span,
                    FieldKind::GhostCatch,
                    ErrorKind::AmbiguousCatchVariable,
                    false,
                    sink,
                );
            }
            let functions: Vec<GhostFunction> = self.scopes.scope(id).ghost_functions.clone();
            for ghost in functions {
                // A body that redeclares the function's own name is the
                // other observable legacy/modern divergence.
                let redeclares_self = self.scopes.scope(ghost.function_scope).declares_own_name;
                self.apply_ghost(
                    id,
                    ghost.name,
                    ghost.span,
                    FieldKind::GhostFunction,
                    ErrorKind::AmbiguousNamedFunctionExpression,
                    redeclares_self,
                    sink,
                );
            }
        }
    }

    fn apply_ghost(
        &mut self,
        scope: ScopeId,
        name: Atom,
        span: Span,
        ghost_kind: FieldKind,
        error_kind: ErrorKind,
        forced_ambiguity: bool,
        sink: &mut dyn ErrorSink,
    ) {
        let mut ambiguous = forced_ambiguity;
        match self.scopes.lookup_local(scope, name) {
            None => {
                self.scopes.declare_field(scope, name, ghost_kind, span);
            }
            Some(existing) => {
                let existing = self.scopes.field(existing);
                // Same-kind ghosts coexist; a different binding is only a
                // problem when it resolves through an outer-field chain,
                // which is exactly where old engines picked the other one.
                if existing.kind != ghost_kind && existing.has_outer_chain() {
                    ambiguous = true;
                }
            }
        }
        if ambiguous {
            let text = self.interner.resolve(name).to_owned();
            sink.report(
                Diagnostic::new(
                    error_kind,
                    span,
                    format!("'{text}' resolves differently under legacy scoping"),
                )
                .with_subject(text),
            );
        }
    }
}

// ============================================================================
// Phase 1 walker
// ============================================================================

/// Builds the scope tree. Scope-relevant node kinds are handled manually
/// (returning `false` to stop generic descent); everything else descends
/// generically, which is how lookups deep inside expressions still land on
/// the innermost lexical scope.
struct ScopeBuilder<'r> {
    scopes: &'r mut ScopeArena,
    current: ScopeId,
    /// The next `Block` node attaches to the current scope instead of
    /// opening a new one (function bodies, catch/with bodies, case bodies,
    /// and lexical for-heads share their owner's scope). Only a directly
    /// following block may consume the flag; every setter clears it after
    /// the guarded body walk so a non-block body cannot leak it to an
    /// unrelated later block.
    absorb_next_block: bool,
    mozilla_const: bool,
}

impl ScopeBuilder<'_> {
    fn walk_child(&mut self, arena: &AstArena, id: NodeId) {
        walk(arena, id, self);
    }

    fn in_scope(
        &mut self,
        scope: ScopeId,
        f: impl FnOnce(&mut ScopeBuilder<'_>),
    ) {
        let saved = self.current;
        self.current = scope;
        f(self);
        self.current = saved;
    }

    fn collapse_if_transparent(&mut self, scope: ScopeId) {
        let s = self.scopes.scope(scope);
        if s.kind == ScopeKind::Block && s.lexical_names.is_empty() {
            self.scopes.collapse_into_parent(scope);
        }
    }

    fn record_declaration(&mut self, decl_kind: DeclKind, name: Atom, span: Span) {
        let scope = self.scopes.scope_mut(self.current);
        match decl_kind {
            DeclKind::Var => scope.var_names.push((name, span)),
            DeclKind::Const if self.mozilla_const => scope.var_names.push((name, span)),
            DeclKind::Let => scope.lexical_names.push(LexicalName {
                name,
                kind: LexicalKind::Let,
                span,
            }),
            DeclKind::Const => scope.lexical_names.push(LexicalName {
                name,
                kind: LexicalKind::Const,
                span,
            }),
        }
    }

    fn enter_var(&mut self, arena: &AstArena, decl_kind: DeclKind, declarations: &[NodeId]) {
        for &declarator in declarations {
            if let NodeData::VariableDeclarator {
                name,
                name_span,
                initializer,
            } = arena.node(declarator).data
            {
                if !name.is_none() {
                    self.record_declaration(decl_kind, name, name_span);
                }
                self.walk_child(arena, initializer);
            }
        }
    }

    fn enter_function(&mut self, arena: &AstArena, id: NodeId) {
        let (function_type, name, name_span, parameters, body) = match &arena.node(id).data {
            NodeData::FunctionObject {
                function_type,
                name,
                name_span,
                parameters,
                body,
            } => (*function_type, *name, *name_span, parameters.clone(), *body),
            _ => return,
        };
        let is_declaration = function_type == FunctionType::Declaration;
        if is_declaration && !name.is_none() {
            self.scopes
                .scope_mut(self.current)
                .lexical_names
                .push(LexicalName {
                    name,
                    kind: LexicalKind::Function,
                    span: name_span,
                });
        }

        let scope = self.scopes.alloc_child(self.current, ScopeKind::Function);

        if function_type == FunctionType::Expression && !name.is_none() {
            let s = self.scopes.scope_mut(scope);
            s.self_name = name;
            s.self_name_span = name_span;
            let variable_scope = self.scopes.variable_scope(self.current);
            self.scopes
                .scope_mut(variable_scope)
                .ghost_functions
                .push(GhostFunction {
                    name,
                    span: name_span,
                    function_scope: scope,
                });
        }

        for &parameter in &parameters {
            if let NodeData::ParameterDeclaration { name, .. } = arena.node(parameter).data {
                let span = arena.span(parameter);
                self.scopes.scope_mut(scope).parameters.push((name, span));
            }
        }

        self.in_scope(scope, |builder| {
            builder.absorb_next_block = true;
            builder.walk_child(arena, body);
            builder.absorb_next_block = false;
        });
    }

    fn enter_try(
        &mut self,
        arena: &AstArena,
        block: NodeId,
        catch_parameter: NodeId,
        catch_block: NodeId,
        finally_block: NodeId,
    ) {
        self.walk_child(arena, block);
        if catch_block.is_some() {
            let scope = self.scopes.alloc_child(self.current, ScopeKind::Catch);
            if catch_parameter.is_some() {
                if let NodeData::VariableDeclarator {
                    name, name_span, ..
                } = arena.node(catch_parameter).data
                {
                    self.scopes.scope_mut(scope).catch_parameter = Some((name, name_span));
                    let variable_scope = self.scopes.variable_scope(self.current);
                    self.scopes
                        .scope_mut(variable_scope)
                        .ghost_catches
                        .push(GhostCatch {
                            name,
                            span: name_span,
                        });
                }
            }
            self.in_scope(scope, |builder| {
                builder.absorb_next_block = true;
                builder.walk_child(arena, catch_block);
                builder.absorb_next_block = false;
            });
        }
        self.walk_child(arena, finally_block);
    }

    /// Whether a `for`/`for-in` head node is a lexical declaration needing
    /// an eager head+body scope.
    fn is_lexical_head(&self, arena: &AstArena, head: NodeId) -> bool {
        if head.is_none() {
            return false;
        }
        match arena.node(head).data {
            NodeData::Var { decl_kind, .. } => match decl_kind {
                DeclKind::Let => true,
                DeclKind::Const => !self.mozilla_const,
                DeclKind::Var => false,
            },
            _ => false,
        }
    }

    /// Shared scope for a lexical loop head and its body, so `for (let i ..)`
    /// yields exactly one block scope owning `i`.
    fn enter_lexical_loop(&mut self, arena: &AstArena, head_children: &[NodeId], body: NodeId) {
        let scope = self.scopes.alloc_child(self.current, ScopeKind::Block);
        self.in_scope(scope, |builder| {
            for &child in head_children {
                builder.walk_child(arena, child);
            }
            builder.absorb_next_block = true;
            builder.walk_child(arena, body);
            builder.absorb_next_block = false;
        });
        self.collapse_if_transparent(scope);
    }
}

impl Visitor for ScopeBuilder<'_> {
    fn enter(&mut self, arena: &AstArena, id: NodeId) -> bool {
        match &arena.node(id).data {
            NodeData::Block { statements } => {
                if self.absorb_next_block {
                    self.absorb_next_block = false;
                    let statements = statements.clone();
                    for statement in statements {
                        self.walk_child(arena, statement);
                    }
                } else {
                    let scope = self.scopes.alloc_child(self.current, ScopeKind::Block);
                    let statements = statements.clone();
                    self.in_scope(scope, |builder| {
                        for statement in statements {
                            builder.walk_child(arena, statement);
                        }
                    });
                    self.collapse_if_transparent(scope);
                }
                false
            }
            NodeData::Var {
                decl_kind,
                declarations,
            } => {
                let decl_kind = *decl_kind;
                let declarations = declarations.clone();
                self.enter_var(arena, decl_kind, &declarations);
                false
            }
            NodeData::FunctionObject { .. } => {
                self.enter_function(arena, id);
                false
            }
            NodeData::Try {
                block,
                catch_parameter,
                catch_block,
                finally_block,
            } => {
                let (block, catch_parameter, catch_block, finally_block) =
                    (*block, *catch_parameter, *catch_block, *finally_block);
                self.enter_try(arena, block, catch_parameter, catch_block, finally_block);
                false
            }
            NodeData::With { object, body } => {
                let (object, body) = (*object, *body);
                self.walk_child(arena, object);
                let scope = self.scopes.alloc_child(self.current, ScopeKind::With);
                self.in_scope(scope, |builder| {
                    builder.absorb_next_block = true;
                    builder.walk_child(arena, body);
                    builder.absorb_next_block = false;
                });
                false
            }
            NodeData::Switch { expression, cases } => {
                let (expression, cases) = (*expression, cases.clone());
                self.walk_child(arena, expression);
                // One shared scope for the whole case list.
                let scope = self.scopes.alloc_child(self.current, ScopeKind::Block);
                self.in_scope(scope, |builder| {
                    for case in cases {
                        builder.walk_child(arena, case);
                    }
                });
                self.collapse_if_transparent(scope);
                false
            }
            NodeData::SwitchCase { test, body } => {
                let (test, body) = (*test, *body);
                self.walk_child(arena, test);
                self.absorb_next_block = true;
                self.walk_child(arena, body);
                self.absorb_next_block = false;
                false
            }
            NodeData::For {
                initializer,
                condition,
                incrementer,
                body,
            } => {
                if self.is_lexical_head(arena, *initializer) {
                    let head = [*initializer, *condition, *incrementer];
                    let body = *body;
                    self.enter_lexical_loop(arena, &head, body);
                    false
                } else {
                    true
                }
            }
            NodeData::ForIn {
                variable,
                collection,
                body,
                ..
            } => {
                if self.is_lexical_head(arena, *variable) {
                    let head = [*variable, *collection];
                    let body = *body;
                    self.enter_lexical_loop(arena, &head, body);
                    false
                } else {
                    true
                }
            }
            NodeData::Lookup { .. } => {
                self.scopes.scope_mut(self.current).lookups.push(id);
                true
            }
            NodeData::Directive { use_strict, .. } => {
                if *use_strict {
                    let variable_scope = self.scopes.variable_scope(self.current);
                    self.scopes.set_use_strict(variable_scope);
                }
                true
            }
            _ => true,
        }
    }
}
