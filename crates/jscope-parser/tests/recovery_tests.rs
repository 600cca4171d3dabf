//! Error-recovery tests: malformed input must terminate, keep as much tree
//! as possible, and report without cascading.

use jscope_common::diagnostics::{DiagnosticBag, ErrorKind};
use jscope_common::interner::Interner;
use jscope_parser::{AstArena, NodeData, NodeId, ParserState};

fn parse(source: &str) -> (AstArena, NodeId, DiagnosticBag) {
    let mut parser = ParserState::new(source.to_owned(), Interner::new(), false);
    let root = parser.parse_program();
    let (arena, _, diagnostics) = parser.into_parts();
    (arena, root, diagnostics)
}

fn statement_count(arena: &AstArena, root: NodeId) -> usize {
    match &arena.node(root).data {
        NodeData::Block { statements } => statements.len(),
        other => panic!("root is not a block: {}", other.kind_name()),
    }
}

#[test]
fn test_missing_semicolon_resumes_at_next_statement() {
    let (arena, root, diagnostics) = parse("var x = 1 var y = 2;");
    assert_eq!(diagnostics.count_of(ErrorKind::ExpectedSemicolon), 1);
    assert_eq!(statement_count(&arena, root), 2);
}

#[test]
fn test_missing_initializer_keeps_declarator() {
    let (arena, root, diagnostics) = parse("var x = ;\nvar y = 2;");
    assert_eq!(diagnostics.count_of(ErrorKind::ExpectedExpression), 1);
    // The broken declaration survives as a partial statement.
    assert!(statement_count(&arena, root) >= 2);
    let first = match &arena.node(root).data {
        NodeData::Block { statements } => statements[0],
        other => panic!("root is not a block: {}", other.kind_name()),
    };
    assert!(matches!(arena.node(first).data, NodeData::Var { .. }));
}

#[test]
fn test_unclosed_function_at_eof() {
    let (arena, root, diagnostics) = parse("function f() { var x = 1;");
    assert!(diagnostics.has_diagnostics());
    assert_eq!(statement_count(&arena, root), 1);
}

#[test]
fn test_bad_assignment_target() {
    let (_, _, diagnostics) = parse("1 = 2;");
    assert_eq!(diagnostics.count_of(ErrorKind::BadAssignmentTarget), 1);
}

#[test]
fn test_bad_increment_target() {
    let (_, _, diagnostics) = parse("f()++;");
    assert_eq!(diagnostics.count_of(ErrorKind::BadAssignmentTarget), 1);
}

#[test]
fn test_bracket_index_is_a_valid_target() {
    let (_, _, diagnostics) = parse("a[0] = 1; (b) = 2; c.d = 3;");
    assert_eq!(diagnostics.count_of(ErrorKind::BadAssignmentTarget), 0);
}

#[test]
fn test_pure_garbage_terminates() {
    let (_, root, diagnostics) = parse("?? ]] ++ :::");
    assert!(root.is_some());
    assert!(diagnostics.has_diagnostics());
}

#[test]
fn test_deep_nesting_is_bounded() {
    let source = "(".repeat(2000);
    let (_, root, diagnostics) = parse(&source);
    assert!(root.is_some());
    assert!(diagnostics.count_of(ErrorKind::ParseDepthExceeded) >= 1);
}

#[test]
fn test_unterminated_string_reported_once() {
    let (_, _, diagnostics) = parse("var s = \"abc");
    assert_eq!(diagnostics.count_of(ErrorKind::UnterminatedString), 1);
}

#[test]
fn test_unterminated_block_comment() {
    let (_, _, diagnostics) = parse("var x = 1; /* never closed");
    assert_eq!(diagnostics.count_of(ErrorKind::UnterminatedComment), 1);
}

#[test]
fn test_broken_condition_keeps_branch_structure() {
    let (arena, root, diagnostics) = parse("if (x ++) { f(); } g();");
    // `x ++` inside the parens is fine; use a genuinely broken condition.
    assert!(diagnostics.len() <= 1);
    assert_eq!(statement_count(&arena, root), 2);
    let (arena, root, diagnostics) = parse("if (x ===) { f(); } g();");
    assert!(diagnostics.has_diagnostics());
    assert_eq!(statement_count(&arena, root), 2);
    let first = match &arena.node(root).data {
        NodeData::Block { statements } => statements[0],
        other => panic!("root is not a block: {}", other.kind_name()),
    };
    assert!(matches!(arena.node(first).data, NodeData::If { .. }));
}

#[test]
fn test_broken_argument_list() {
    let (arena, root, diagnostics) = parse("f(a, , b); g();");
    assert!(diagnostics.has_diagnostics());
    assert_eq!(statement_count(&arena, root), 2);
}

#[test]
fn test_object_literal_recovery() {
    let (arena, root, diagnostics) = parse("var o = { a: 1, : 2, b: 3 }; var p = 4;");
    assert!(diagnostics.has_diagnostics());
    assert_eq!(statement_count(&arena, root), 2);
}

#[test]
fn test_same_position_reports_do_not_cascade() {
    // One bad token position produces one leading report, not a pile-up of
    // equal-or-worse follow-ups at the same offset.
    let (_, _, diagnostics) = parse("var x = = = 1;");
    let at_first_equals = diagnostics
        .iter()
        .filter(|d| d.span.start == 8)
        .count();
    assert!(at_first_equals <= 1);
}

#[test]
fn test_every_parse_yields_a_root_block() {
    for source in ["", ";", "}}}}", "var", "function", "if (", "a.b.", "((((", "case 1:"] {
        let (arena, root, _) = parse(source);
        assert!(matches!(arena.node(root).data, NodeData::Block { .. }));
    }
}
