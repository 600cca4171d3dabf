//! Scope resolution tests: collapse, hoisting, reference resolution,
//! built-ins, and the legacy ghosting rules.

use jscope_common::diagnostics::{DiagnosticBag, ErrorKind};
use jscope_common::interner::Interner;
use jscope_parser::{AstArena, NodeData, NodeId, ParserState, Visitor, walk};
use jscope_resolver::{FieldKind, ResolverOptions, ResolverState, ScopeKind, ScopeTree};

struct Analysis {
    arena: AstArena,
    root: NodeId,
    interner: Interner,
    tree: ScopeTree,
    diagnostics: DiagnosticBag,
}

fn analyze(source: &str) -> Analysis {
    analyze_with(source, ResolverOptions::default())
}

fn analyze_with(source: &str, options: ResolverOptions) -> Analysis {
    let mut parser = ParserState::new(source.to_owned(), Interner::new(), false);
    let root = parser.parse_program();
    let (arena, mut interner, mut diagnostics) = parser.into_parts();
    let tree = ResolverState::new(&arena, &mut interner, &options).resolve(root, &mut diagnostics);
    Analysis {
        arena,
        root,
        interner,
        tree,
        diagnostics,
    }
}

/// All `Lookup` nodes for a given identifier, in source order.
fn find_lookups(analysis: &Analysis, name: &str) -> Vec<NodeId> {
    struct Finder<'a> {
        interner: &'a Interner,
        name: &'a str,
        found: Vec<NodeId>,
    }
    impl Visitor for Finder<'_> {
        fn enter(&mut self, arena: &AstArena, id: NodeId) -> bool {
            if let NodeData::Lookup { name } = arena.node(id).data {
                if self.interner.resolve(name) == self.name {
                    self.found.push(id);
                }
            }
            true
        }
    }
    let mut finder = Finder {
        interner: &analysis.interner,
        name,
        found: Vec::new(),
    };
    walk(&analysis.arena, analysis.root, &mut finder);
    finder.found
}

fn live_scope_count(analysis: &Analysis) -> usize {
    analysis.tree.arena.live_scopes().count()
}

#[test]
fn test_empty_blocks_collapse_into_function_scope() {
    let analysis = analyze("function f() { { } { var x; x; } }");
    assert!(!analysis.diagnostics.has_errors());
    // Global plus the function scope; both inner blocks are transparent.
    assert_eq!(live_scope_count(&analysis), 2);
    let x = find_lookups(&analysis, "x");
    let field = analysis.tree.field_for(x[0]).unwrap();
    assert_eq!(field.kind, FieldKind::Local);
    assert!(field.outer.is_none());
}

#[test]
fn test_let_block_survives() {
    let analysis = analyze("function f() { { let x; x; } }");
    assert!(!analysis.diagnostics.has_errors());
    assert_eq!(live_scope_count(&analysis), 3);
}

#[test]
fn test_undeclared_variable_reported_once() {
    let analysis = analyze("mystery; mystery; f(mystery + mystery);");
    let undeclared = analysis
        .diagnostics
        .iter()
        .filter(|d| d.kind == ErrorKind::UndeclaredVariable && d.subject.as_deref() == Some("mystery"))
        .count();
    assert_eq!(undeclared, 1);
    // Every reference still gets a binding.
    for lookup in find_lookups(&analysis, "mystery") {
        let field = analysis.tree.field_for(lookup).unwrap();
        let mut kind = field.kind;
        let mut outer = field.outer;
        while let Some(next) = outer {
            kind = analysis.tree.arena.field(next).kind;
            outer = analysis.tree.arena.field(next).outer;
        }
        assert_eq!(kind, FieldKind::UndefinedGlobal);
    }
}

#[test]
fn test_for_let_head_and_body_share_one_scope() {
    let analysis = analyze("var obj; for (let i in obj) { i; }");
    assert!(!analysis.diagnostics.has_errors());
    // Global plus exactly one block scope owning `i`.
    assert_eq!(live_scope_count(&analysis), 2);
    let i = find_lookups(&analysis, "i");
    let field = analysis.tree.field_for(i[0]).unwrap();
    assert_eq!(field.kind, FieldKind::Local);
    let owner = analysis.tree.arena.scope(field.scope);
    assert_eq!(owner.kind, ScopeKind::Block);
}

#[test]
fn test_named_function_expression_self_reference() {
    let analysis = analyze("var g = function fact(n) { return n ? n * fact(n - 1) : 1; };");
    assert!(!analysis.diagnostics.has_errors());
    assert_eq!(
        analysis
            .diagnostics
            .count_of(ErrorKind::AmbiguousNamedFunctionExpression),
        0
    );
    let fact = find_lookups(&analysis, "fact");
    let field = analysis.tree.field_for(fact[0]).unwrap();
    assert_eq!(field.kind, FieldKind::Local);
    // The ghost lands on the enclosing variable scope for sibling code.
    let root = analysis.tree.root;
    let ghost_kinds: Vec<FieldKind> = analysis
        .tree
        .arena
        .scope(root)
        .fields
        .values()
        .map(|&f| analysis.tree.arena.field(f).kind)
        .collect();
    assert!(ghost_kinds.contains(&FieldKind::GhostFunction));
}

#[test]
fn test_ambiguous_named_function_expression() {
    let analysis = analyze("(function f() { var f = 1; return f; })();");
    assert_eq!(
        analysis
            .diagnostics
            .count_of(ErrorKind::AmbiguousNamedFunctionExpression),
        1
    );
    // The inner reference resolves to the function's own binding.
    let f = find_lookups(&analysis, "f");
    let field = analysis.tree.field_for(*f.last().unwrap()).unwrap();
    assert_eq!(field.kind, FieldKind::Local);
    assert!(field.outer.is_none());
    let owner = analysis.tree.arena.scope(field.scope);
    assert_eq!(owner.kind, ScopeKind::Function);
}

#[test]
fn test_with_poisons_resolution() {
    let analysis = analyze("var obj; with (obj) { var y = x; }");
    let x = find_lookups(&analysis, "x");
    assert_eq!(x.len(), 1);
    let field = analysis.tree.field_for(x[0]).unwrap();
    assert_eq!(field.kind, FieldKind::WithField);
    // Still reported as undeclared underneath the wrapping.
    assert_eq!(analysis.diagnostics.count_of(ErrorKind::UndeclaredVariable), 1);
}

#[test]
fn test_ghost_catch_binding() {
    let analysis = analyze("try { f(); } catch (err) { err; }");
    let err = find_lookups(&analysis, "err");
    let field = analysis.tree.field_for(err[0]).unwrap();
    assert_eq!(field.kind, FieldKind::CatchError);
    let root = analysis.tree.root;
    let has_ghost = analysis
        .tree
        .arena
        .scope(root)
        .fields
        .values()
        .any(|&f| analysis.tree.arena.field(f).kind == FieldKind::GhostCatch);
    assert!(has_ghost);
    assert_eq!(
        analysis.diagnostics.count_of(ErrorKind::AmbiguousCatchVariable),
        0
    );
}

#[test]
fn test_ambiguous_catch_variable() {
    let analysis = analyze(
        "function h() { var e; function g() { e; try { f(); } catch (e) { } } h(); }",
    );
    assert_eq!(
        analysis.diagnostics.count_of(ErrorKind::AmbiguousCatchVariable),
        1
    );
}

#[test]
fn test_sibling_catch_ghosts_coexist() {
    let analysis = analyze("try { a(); } catch (e) { } try { b(); } catch (e) { }");
    assert_eq!(
        analysis.diagnostics.count_of(ErrorKind::AmbiguousCatchVariable),
        0
    );
}

#[test]
fn test_with_nonblock_body_does_not_swallow_next_block() {
    let analysis = analyze("var o; with (o) o = 1; { let z = 1; } let q = 2; let z = 3;");
    assert_eq!(
        analysis
            .diagnostics
            .count_of(ErrorKind::DuplicateLexicalDeclaration),
        0
    );
    // The standalone block keeps its own scope; `z` inside it never
    // collides with the global `z`.
    let arena = &analysis.tree.arena;
    let blocks = arena
        .live_scopes()
        .filter(|&id| arena.scope(id).kind == ScopeKind::Block)
        .count();
    assert_eq!(blocks, 1);
}

#[test]
fn test_for_let_nonblock_body_keeps_following_block_scoped() {
    let analysis = analyze("var o; for (let i in o) f(i); { let z = 1; } let z = 3;");
    assert_eq!(
        analysis
            .diagnostics
            .count_of(ErrorKind::DuplicateLexicalDeclaration),
        0
    );
    // One scope for the loop head+body, one for the standalone block.
    let arena = &analysis.tree.arena;
    let blocks = arena
        .live_scopes()
        .filter(|&id| arena.scope(id).kind == ScopeKind::Block)
        .count();
    assert_eq!(blocks, 2);
}

#[test]
fn test_duplicate_let_is_an_error() {
    let analysis = analyze("let a = 1; let a = 2;");
    assert_eq!(
        analysis
            .diagnostics
            .count_of(ErrorKind::DuplicateLexicalDeclaration),
        1
    );
}

#[test]
fn test_var_redeclaration_coalesces() {
    let analysis = analyze("var a = 1; var a = 2; a;");
    assert!(!analysis.diagnostics.has_diagnostics());
}

#[test]
fn test_arguments_is_synthesized_in_functions() {
    let analysis = analyze("function f() { return arguments; }");
    assert!(!analysis.diagnostics.has_errors());
    let args = find_lookups(&analysis, "arguments");
    let field = analysis.tree.field_for(args[0]).unwrap();
    assert_eq!(field.kind, FieldKind::Arguments);
}

#[test]
fn test_parameters_carry_positions() {
    let analysis = analyze("function f(a, b) { return b; }");
    let b = find_lookups(&analysis, "b");
    let field = analysis.tree.field_for(b[0]).unwrap();
    assert_eq!(field.kind, FieldKind::Argument);
    assert_eq!(field.argument_position, Some(1));
}

#[test]
fn test_inner_fields_are_cached() {
    let analysis = analyze("function f() { var x; function g() { return x + x; } g(); }");
    assert!(!analysis.diagnostics.has_errors());
    let x = find_lookups(&analysis, "x");
    assert_eq!(x.len(), 2);
    let first = analysis.tree.binding(x[0]).unwrap();
    let second = analysis.tree.binding(x[1]).unwrap();
    // Repeat references in the same inner scope share one alias field.
    assert_eq!(first, second);
    assert!(analysis.tree.arena.field(first).outer.is_some());
}

#[test]
fn test_builtins_resolve_as_predefined() {
    let analysis = analyze("Math.floor(parseInt(s, 10));");
    let math = find_lookups(&analysis, "Math");
    assert_eq!(
        analysis.tree.field_for(math[0]).unwrap().kind,
        FieldKind::Predefined
    );
    let parse_int = find_lookups(&analysis, "parseInt");
    assert_eq!(
        analysis.tree.field_for(parse_int[0]).unwrap().kind,
        FieldKind::Predefined
    );
    // `s` is genuinely unknown.
    assert_eq!(analysis.diagnostics.count_of(ErrorKind::UndeclaredVariable), 1);
}

#[test]
fn test_known_globals_option() {
    let mut options = ResolverOptions::default();
    options.known_globals.insert("window".to_owned());
    let analysis = analyze_with("window.alert(1);", options);
    assert_eq!(analysis.diagnostics.count_of(ErrorKind::UndeclaredVariable), 0);
    let window = find_lookups(&analysis, "window");
    assert_eq!(
        analysis.tree.field_for(window[0]).unwrap().kind,
        FieldKind::Global
    );
}

#[test]
fn test_mozilla_const_hoists_like_var() {
    let options = ResolverOptions {
        mozilla_const: true,
        ..ResolverOptions::default()
    };
    let analysis = analyze_with("const a = 1; { const a = 2; }", options);
    assert_eq!(
        analysis
            .diagnostics
            .count_of(ErrorKind::DuplicateLexicalDeclaration),
        0
    );
    // Both blocks are transparent under var-like const.
    assert_eq!(live_scope_count(&analysis), 1);
}

#[test]
fn test_strict_mode_option_marks_scopes() {
    let options = ResolverOptions {
        strict_mode: true,
        ..ResolverOptions::default()
    };
    let analysis = analyze_with("function f() { }", options);
    for id in analysis.tree.arena.live_scopes().collect::<Vec<_>>() {
        assert!(analysis.tree.arena.scope(id).use_strict);
    }
}

#[test]
fn test_use_strict_directive_marks_scope() {
    let analysis = analyze("\"use strict\";\nvar x; x;");
    let root = analysis.tree.root;
    assert!(analysis.tree.arena.scope(root).use_strict);
    let analysis = analyze("var x = 1;\n\"use strict\";");
    let root = analysis.tree.root;
    assert!(!analysis.tree.arena.scope(root).use_strict);
}

#[test]
fn test_every_lookup_gets_a_binding() {
    let source = "var a; function f(b) { with (c) { try { a(b, d); } catch (e) { e; } } }";
    let analysis = analyze(source);
    struct CountLookups {
        total: usize,
    }
    impl Visitor for CountLookups {
        fn enter(&mut self, arena: &AstArena, id: NodeId) -> bool {
            if matches!(arena.node(id).data, NodeData::Lookup { .. }) {
                self.total += 1;
            }
            true
        }
    }
    let mut counter = CountLookups { total: 0 };
    walk(&analysis.arena, analysis.root, &mut counter);
    assert!(counter.total > 0);
    assert_eq!(analysis.tree.binding_count(), counter.total);
}
