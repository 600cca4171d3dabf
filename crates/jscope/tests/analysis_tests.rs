//! End-to-end tests through the public facade: parse + resolve + the
//! position and diagnostic surfaces an embedder sees.

use jscope::{
    Analysis, AstArena, ErrorKind, FieldKind, NodeData, NodeId, ParserSettings, ScopeKind,
    Severity, SourceMode, Visitor, parse_program,
};

/// Opt-in debug output: `RUST_LOG=debug cargo test -p jscope`.
fn init_logging() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_writer(std::io::stderr)
                .try_init();
        }
    });
}

fn analyze(source: &str) -> Analysis {
    init_logging();
    parse_program(source, &ParserSettings::default())
}

fn lookups_named(analysis: &Analysis, name: &str) -> Vec<NodeId> {
    struct Finder<'a> {
        analysis: &'a Analysis,
        name: &'a str,
        found: Vec<NodeId>,
    }
    impl Visitor for Finder<'_> {
        fn enter(&mut self, arena: &AstArena, id: NodeId) -> bool {
            if let NodeData::Lookup { name } = arena.node(id).data {
                if self.analysis.name(name) == self.name {
                    self.found.push(id);
                }
            }
            true
        }
    }
    let mut finder = Finder {
        analysis,
        name,
        found: Vec::new(),
    };
    analysis.walk(&mut finder);
    finder.found
}

#[test]
fn test_clean_program_has_no_diagnostics() {
    let analysis = analyze("var x = 1;\nfunction f(a) { return a + x; }\nf(2);");
    assert!(!analysis.diagnostics.has_diagnostics());
    assert!(analysis.root.is_some());
}

#[test]
fn test_empty_block_adds_no_scope() {
    let analysis = analyze("function f() { { } }");
    assert_eq!(analysis.scopes.arena.live_scopes().count(), 2);
}

#[test]
fn test_undeclared_reported_once_for_five_references() {
    let analysis = analyze("x; x; x; f(x); var y = x;");
    let reports: Vec<_> = analysis
        .diagnostics
        .by_kind(ErrorKind::UndeclaredVariable)
        .filter(|d| d.subject.as_deref() == Some("x"))
        .collect();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].severity, Severity::Low);
    assert!(reports[0].recoverable);
    assert_eq!(lookups_named(&analysis, "x").len(), 5);
}

#[test]
fn test_directive_prologue_promotion() {
    let analysis = analyze("\"use strict\";\nvar x = 1;");
    assert!(analysis.scopes.arena.scope(analysis.scopes.root).use_strict);

    let analysis = analyze("var x = 1;\n\"use strict\";");
    assert!(!analysis.scopes.arena.scope(analysis.scopes.root).use_strict);
}

#[test]
fn test_for_let_in_creates_one_block_scope() {
    let analysis = analyze("var obj; for (let i in obj) { }");
    let arena = &analysis.scopes.arena;
    let blocks: Vec<_> = arena
        .live_scopes()
        .filter(|&id| arena.scope(id).kind == ScopeKind::Block)
        .collect();
    assert_eq!(blocks.len(), 1);
    assert!(arena.scope(blocks[0]).fields.len() >= 1);
}

#[test]
fn test_ambiguous_named_function_expression_once() {
    let analysis = analyze("(function f() { var f = 1; return f; })();");
    let reports: Vec<_> = analysis
        .diagnostics
        .by_kind(ErrorKind::AmbiguousNamedFunctionExpression)
        .collect();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].severity, Severity::Moderate);
    // The inner reference resolves to the function's own binding.
    let f = lookups_named(&analysis, "f");
    let field = analysis.scopes.field_for(*f.last().unwrap()).unwrap();
    assert_eq!(field.kind, FieldKind::Local);
    assert_eq!(
        analysis.scopes.arena.scope(field.scope).kind,
        ScopeKind::Function
    );
}

#[test]
fn test_malformed_input_terminates_with_tree_and_diagnostics() {
    let analysis = analyze("function f( ( { [ ;");
    assert!(analysis.root.is_some());
    assert!(analysis.diagnostics.has_diagnostics());
}

#[test]
fn test_garbage_inputs_always_yield_a_root() {
    for source in [
        "",
        ";;;;",
        ")))((",
        "var",
        "if (",
        "a ?",
        "#!only a shebang",
        "{ { { { {",
    ] {
        let analysis = analyze(source);
        assert!(analysis.root.is_some(), "no root for {source:?}");
    }
}

#[test]
fn test_with_shadowing_resolves_with_fields() {
    let analysis = analyze("var obj; with (obj) { var y = x; }");
    let x = lookups_named(&analysis, "x");
    assert_eq!(x.len(), 1);
    let field = analysis.scopes.field_for(x[0]).unwrap();
    assert_eq!(field.kind, FieldKind::WithField);
    assert_eq!(
        analysis.diagnostics.count_of(ErrorKind::WithNotRecommended),
        1
    );
}

#[test]
fn test_diagnostic_offsets_resolve_to_lines() {
    let analysis = analyze("var a = 1;\nvar b = mystery;\n");
    let report = analysis
        .diagnostics
        .by_kind(ErrorKind::UndeclaredVariable)
        .next()
        .unwrap();
    let at = analysis.location(report.span.start);
    assert_eq!(at.line, 2);
    assert_eq!(at.column, 9);
    let end = analysis.location(report.span.end());
    assert_eq!(end.line, 2);
}

#[test]
fn test_expression_mode() {
    let settings = ParserSettings {
        source_mode: SourceMode::Expression,
        ..ParserSettings::default()
    };
    let analysis = parse_program("a + b * 2", &settings);
    assert!(matches!(
        analysis.arena.node(analysis.root).data,
        NodeData::Binary { .. }
    ));
    assert_eq!(
        analysis.diagnostics.count_of(ErrorKind::UndeclaredVariable),
        2
    );
}

#[test]
fn test_known_globals_setting() {
    let settings = ParserSettings {
        known_globals: vec!["window".to_owned(), "document".to_owned()],
        ..ParserSettings::default()
    };
    let analysis = parse_program("window.open(document.title);", &settings);
    assert_eq!(
        analysis.diagnostics.count_of(ErrorKind::UndeclaredVariable),
        0
    );
}

#[test]
fn test_forced_strict_mode_setting() {
    let settings = ParserSettings {
        strict_mode: true,
        ..ParserSettings::default()
    };
    // A block-level function declaration is legal in strict mode.
    let analysis = parse_program("if (a) { function g() { } }", &settings);
    assert_eq!(
        analysis
            .diagnostics
            .count_of(ErrorKind::MisplacedFunctionDeclaration),
        0
    );
    assert!(analysis.scopes.arena.scope(analysis.scopes.root).use_strict);

    let analysis = analyze("if (a) { function g() { } }");
    assert_eq!(
        analysis
            .diagnostics
            .count_of(ErrorKind::MisplacedFunctionDeclaration),
        1
    );
}

#[test]
fn test_mozilla_const_setting() {
    let settings = ParserSettings {
        const_statements_mozilla: true,
        ..ParserSettings::default()
    };
    let analysis = parse_program("const a = 1; { const a = 2; }", &settings);
    assert_eq!(
        analysis
            .diagnostics
            .count_of(ErrorKind::DuplicateLexicalDeclaration),
        0
    );

    let analysis = analyze("const a = 1; const a = 2;");
    assert_eq!(
        analysis
            .diagnostics
            .count_of(ErrorKind::DuplicateLexicalDeclaration),
        1
    );
}

#[test]
fn test_shebang_setting() {
    let settings = ParserSettings {
        allow_shebang_line: true,
        ..ParserSettings::default()
    };
    let analysis = parse_program("#!/usr/bin/env node\nvar x = 1;", &settings);
    assert!(!analysis.diagnostics.has_diagnostics());

    let analysis = analyze("#!/usr/bin/env node\nvar x = 1;");
    assert_eq!(
        analysis.diagnostics.count_of(ErrorKind::ShebangNotAllowed),
        1
    );
}

#[test]
fn test_semicolon_insertion_is_style_severity() {
    let analysis = analyze("var a = 1\nvar b = 2\n");
    let inserted: Vec<_> = analysis
        .diagnostics
        .by_kind(ErrorKind::SemicolonInsertion)
        .collect();
    assert_eq!(inserted.len(), 2);
    assert!(inserted.iter().all(|d| d.severity == Severity::Style));
    assert!(!analysis.diagnostics.has_errors());
}

#[test]
fn test_diagnostics_sorted_by_offset() {
    let analysis = analyze("alpha;\nbeta;\ngamma;");
    let starts: Vec<u32> = analysis.diagnostics.iter().map(|d| d.span.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
}

#[test]
fn test_diagnostics_serialize() {
    let analysis = analyze("mystery;");
    let json = serde_json::to_string(analysis.diagnostics.diagnostics()).unwrap();
    assert!(json.contains("\"UndeclaredVariable\""));
    assert!(json.contains("\"severity\":\"low\""));
}

#[test]
fn test_interner_reuse_across_parses() {
    let first = analyze("var shared = 1; shared;");
    assert!(!first.diagnostics.has_diagnostics());
    let second = jscope::parse_with_interner(
        "var shared = 2; shared;",
        &ParserSettings::default(),
        first.into_interner(),
    );
    assert!(!second.diagnostics.has_diagnostics());
}

#[test]
fn test_reused_interner_is_reset_when_over_budget() {
    let mut interner = jscope::Interner::with_capacity_limit(256);
    for i in 0..4096 {
        interner.intern(&format!("generated_{i}"));
    }
    let before = interner.len();
    let analysis = jscope::parse_with_interner(
        "var fresh = 1; fresh;",
        &ParserSettings::default(),
        interner,
    );
    assert!(!analysis.diagnostics.has_diagnostics());
    // The over-budget pool was reset at session start, not carried over.
    assert!(analysis.into_interner().len() < before);
}
