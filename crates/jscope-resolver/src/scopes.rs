//! The scope tree and variable field model.
//!
//! Scopes and fields both live in flat arenas addressed by `ScopeId` /
//! `FieldId`. A scope's name table maps identifier atoms to fields in
//! insertion order; a field either owns a binding or aliases one owned by an
//! ancestor scope through its `outer` link (an "inner field", created and
//! cached the first time a nested scope reaches outward for a name).

use indexmap::IndexMap;
use jscope_common::interner::Atom;
use jscope_common::span::Span;
use jscope_parser::NodeId;
use rustc_hash::FxBuildHasher;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FieldId(pub u32);

impl FieldId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
    Catch,
    With,
}

impl ScopeKind {
    /// Whether `var` and `arguments` bind here.
    pub fn is_variable_scope(self) -> bool {
        matches!(self, ScopeKind::Global | ScopeKind::Function)
    }
}

/// What a binding is. `GhostCatch`/`GhostFunction` exist only to model the
/// legacy engines that leaked catch parameters and named-function-expression
/// names into the enclosing variable scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Local,
    Predefined,
    Global,
    Arguments,
    Argument,
    WithField,
    CatchError,
    GhostCatch,
    GhostFunction,
    UndefinedGlobal,
}

/// One binding, or an inner alias of one.
#[derive(Clone, Debug, Serialize)]
pub struct VariableField {
    pub name: Atom,
    pub kind: FieldKind,
    /// Scope whose name table this field sits in.
    pub scope: ScopeId,
    /// For inner fields: the field in an ancestor scope this one aliases.
    pub outer: Option<FieldId>,
    /// For `Argument` fields: ordinal position in the parameter list.
    pub argument_position: Option<u32>,
    /// Declaration site when known.
    pub span: Span,
}

impl VariableField {
    /// Whether this field ultimately resolves to something declared in an
    /// enclosing scope (it is an alias, not an owner).
    pub fn has_outer_chain(&self) -> bool {
        self.outer.is_some()
    }
}

/// Which keyword put a name in a scope's lexical list. Only `let`/`const`
/// participate in duplicate-declaration errors; function declarations
/// coalesce like `var` but still pin the scope open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LexicalKind {
    Let,
    Const,
    Function,
}

#[derive(Clone, Debug)]
pub struct LexicalName {
    pub name: Atom,
    pub kind: LexicalKind,
    pub span: Span,
}

/// A named function expression registered for legacy ghosting, with the
/// function scope it introduced (phase 4 inspects that scope's own
/// declarations).
#[derive(Clone, Copy, Debug)]
pub struct GhostFunction {
    pub name: Atom,
    pub span: Span,
    pub function_scope: ScopeId,
}

#[derive(Clone, Copy, Debug)]
pub struct GhostCatch {
    pub name: Atom,
    pub span: Span,
}

/// One scope. Phase 1 fills the declaration lists and lookups; phase 2
/// materializes `fields`; phases 3 and 4 only add to `fields`.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Name table, insertion-ordered for deterministic output.
    pub fields: IndexMap<Atom, FieldId, FxBuildHasher>,
    /// `var`-declared names recorded here (hoisted to the nearest variable
    /// scope when fields are materialized).
    pub var_names: Vec<(Atom, Span)>,
    pub lexical_names: Vec<LexicalName>,
    /// `Lookup` nodes attached to this scope during the build walk.
    pub lookups: Vec<NodeId>,
    /// Ghost registrations; populated only on variable scopes.
    pub ghost_catches: Vec<GhostCatch>,
    pub ghost_functions: Vec<GhostFunction>,
    /// Formal parameters, for function scopes.
    pub parameters: Vec<(Atom, Span)>,
    /// Catch parameter, for catch scopes.
    pub catch_parameter: Option<(Atom, Span)>,
    /// Name of a named function expression, bound to itself inside.
    pub self_name: Atom,
    pub self_name_span: Span,
    /// A named function expression whose body declares its own name again.
    /// Legacy and modern engines disagree about which binding wins there.
    pub declares_own_name: bool,
    /// True anywhere inside a `with` statement: static binding is unsound.
    pub in_with: bool,
    /// Monotonic: set by a `"use strict"` directive, inherited at creation.
    pub use_strict: bool,
    /// Transparent blocks are collapsed into their parent after the build
    /// walk; a collapsed scope stays in the arena but owns nothing.
    pub collapsed: bool,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Scope {
        Scope {
            kind,
            parent,
            children: Vec::new(),
            fields: IndexMap::default(),
            var_names: Vec::new(),
            lexical_names: Vec::new(),
            lookups: Vec::new(),
            ghost_catches: Vec::new(),
            ghost_functions: Vec::new(),
            parameters: Vec::new(),
            catch_parameter: None,
            self_name: Atom::NONE,
            self_name_span: Span::EMPTY,
            declares_own_name: false,
            in_with: false,
            use_strict: false,
            collapsed: false,
        }
    }
}

/// Flat storage for the scope tree and every field in it.
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    fields: Vec<VariableField>,
}

impl ScopeArena {
    pub fn new() -> ScopeArena {
        ScopeArena::default()
    }

    /// Create the root. There is exactly one Global scope per tree.
    pub fn alloc_global(&mut self) -> ScopeId {
        debug_assert!(self.scopes.is_empty(), "global scope must be the root");
        let id = ScopeId(0);
        self.scopes.push(Scope::new(ScopeKind::Global, None));
        id
    }

    /// Create a child scope, inheriting `in_with` and `use_strict`.
    pub fn alloc_child(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let mut scope = Scope::new(kind, Some(parent));
        {
            let parent_scope = self.scope(parent);
            scope.in_with = parent_scope.in_with || kind == ScopeKind::With;
            scope.use_strict = parent_scope.use_strict;
        }
        self.scopes.push(scope);
        self.scope_mut(parent).children.push(id);
        id
    }

    #[inline]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    #[inline]
    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    #[inline]
    pub fn field(&self, id: FieldId) -> &VariableField {
        &self.fields[id.index()]
    }

    #[inline]
    pub fn field_mut(&mut self, id: FieldId) -> &mut VariableField {
        &mut self.fields[id.index()]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Live (non-collapsed) scopes in creation order.
    pub fn live_scopes(&self) -> impl Iterator<Item = ScopeId> + '_ {
        (0..self.scopes.len() as u32)
            .map(ScopeId)
            .filter(|&id| !self.scope(id).collapsed)
    }

    /// Add a field to `scope`'s name table. Replaces any existing entry for
    /// the name; callers check first when coalescing matters.
    pub fn declare_field(
        &mut self,
        scope: ScopeId,
        name: Atom,
        kind: FieldKind,
        span: Span,
    ) -> FieldId {
        let id = FieldId(self.fields.len() as u32);
        self.fields.push(VariableField {
            name,
            kind,
            scope,
            outer: None,
            argument_position: None,
            span,
        });
        self.scope_mut(scope).fields.insert(name, id);
        id
    }

    /// Inner alias of `outer` in `scope`, cached in the scope's name table.
    /// Never legal at Global, which owns every name it resolves.
    pub fn declare_inner_field(
        &mut self,
        scope: ScopeId,
        name: Atom,
        kind: FieldKind,
        outer: FieldId,
    ) -> FieldId {
        debug_assert!(
            self.scope(scope).parent.is_some(),
            "inner fields cannot be created in the global scope"
        );
        let id = FieldId(self.fields.len() as u32);
        let span = self.field(outer).span;
        self.fields.push(VariableField {
            name,
            kind,
            scope,
            outer: Some(outer),
            argument_position: None,
            span,
        });
        self.scope_mut(scope).fields.insert(name, id);
        id
    }

    pub fn lookup_local(&self, scope: ScopeId, name: Atom) -> Option<FieldId> {
        self.scope(scope).fields.get(&name).copied()
    }

    /// Nearest enclosing variable scope, `scope` included.
    pub fn variable_scope(&self, mut scope: ScopeId) -> ScopeId {
        loop {
            if self.scope(scope).kind.is_variable_scope() {
                return scope;
            }
            match self.scope(scope).parent {
                Some(parent) => scope = parent,
                // The root is Global, a variable scope; unreachable in a
                // well-formed tree.
                None => return scope,
            }
        }
    }

    /// Splice a transparent block into its parent: lookups, pending
    /// declarations, and children move up; the scope is marked collapsed.
    pub fn collapse_into_parent(&mut self, id: ScopeId) {
        let Some(parent) = self.scope(id).parent else {
            return;
        };
        debug_assert!(self.scope(id).lexical_names.is_empty());
        let (lookups, var_names, children) = {
            let scope = self.scope_mut(id);
            scope.collapsed = true;
            (
                std::mem::take(&mut scope.lookups),
                std::mem::take(&mut scope.var_names),
                std::mem::take(&mut scope.children),
            )
        };
        for &child in &children {
            self.scope_mut(child).parent = Some(parent);
        }
        let parent_scope = self.scope_mut(parent);
        parent_scope.lookups.extend(lookups);
        parent_scope.var_names.extend(var_names);
        let position = parent_scope.children.iter().position(|&c| c == id);
        match position {
            Some(at) => {
                parent_scope.children.splice(at..=at, children);
            }
            None => parent_scope.children.extend(children),
        }
    }

    /// Set strict mode on a scope and every already-created descendant.
    pub fn set_use_strict(&mut self, id: ScopeId) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let scope = self.scope_mut(next);
            if scope.use_strict {
                continue;
            }
            scope.use_strict = true;
            pending.extend(scope.children.iter().copied());
        }
    }
}
