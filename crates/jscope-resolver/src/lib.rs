//! Static scope resolution for jscope.
//!
//! Takes a parsed AST and produces a scope tree plus a total binding for
//! every identifier reference, reproducing the legacy scoping quirks
//! (catch-parameter and named-function-expression ghosting, `with`
//! poisoning) that real-world ES5 code depends on.

pub mod globals;
pub mod scopes;
pub mod state;

pub use scopes::{FieldId, FieldKind, Scope, ScopeArena, ScopeId, ScopeKind, VariableField};
pub use state::{ResolverOptions, ResolverState, ScopeTree};
