//! Public entry points for jscope: parse a JavaScript source text, resolve
//! scopes, and hand back a single [`Analysis`] bundle.
//!
//! The embedding collaborator supplies the source and a [`ParserSettings`];
//! everything else (line mapping, interning, diagnostics collection) is
//! handled here. Parsing never fails: malformed input yields a best-effort
//! AST plus diagnostics.
//!
//! ```no_run
//! let analysis = jscope::parse_program("var x = y;", &jscope::ParserSettings::default());
//! for diagnostic in analysis.diagnostics.iter() {
//!     let at = analysis.location(diagnostic.span.start);
//!     println!("{}:{}: {}", at.line, at.column, diagnostic.format_simple());
//! }
//! ```

use jscope_common::diagnostics::DiagnosticBag;
use jscope_common::position::{LineMap, Location, Position};
use jscope_parser::ParserState;
use jscope_resolver::{ResolverOptions, ResolverState};
use once_cell::unsync::OnceCell;
use rustc_hash::FxHashSet;
use tracing::debug;

pub use jscope_common::diagnostics::{Diagnostic, ErrorKind, ErrorSink, Severity};
pub use jscope_common::interner::{Atom, Interner};
pub use jscope_common::span::Span;
pub use jscope_parser::{
    AstArena, BinaryOp, ConstantValue, DeclKind, ForInKind, FunctionType, NodeData, NodeId,
    PropertyKind, UnaryOp, Visitor, walk,
};
pub use jscope_resolver::{FieldId, FieldKind, ScopeId, ScopeKind, ScopeTree, VariableField};

/// Whether the input is a whole program or a single expression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceMode {
    #[default]
    Program,
    Expression,
}

/// Caller-supplied knobs. Plain data; construct with struct update syntax
/// from `Default`.
#[derive(Clone, Debug, Default)]
pub struct ParserSettings {
    pub source_mode: SourceMode,
    /// Force strict mode regardless of directive prologues.
    pub strict_mode: bool,
    /// Skip (rather than report) a leading `#!` line.
    pub allow_shebang_line: bool,
    /// Legacy Mozilla `const`: binds var-like on the variable scope instead
    /// of lexically.
    pub const_statements_mozilla: bool,
    /// Identifiers the host environment defines, resolved as globals
    /// instead of reported undeclared.
    pub known_globals: Vec<String>,
}

/// Everything one parse-and-resolve produces.
pub struct Analysis {
    pub arena: AstArena,
    pub root: NodeId,
    pub scopes: ScopeTree,
    pub diagnostics: DiagnosticBag,
    source: String,
    interner: Interner,
    line_map: OnceCell<LineMap>,
}

impl Analysis {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Resolve an interned identifier back to its text.
    pub fn name(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    /// Pre/post traversal of the whole tree.
    pub fn walk<V: Visitor>(&self, visitor: &mut V) {
        walk(&self.arena, self.root, visitor);
    }

    fn line_map(&self) -> &LineMap {
        self.line_map.get_or_init(|| LineMap::new(&self.source))
    }

    /// Byte offset to 1-based line/column.
    pub fn location(&self, offset: u32) -> Location {
        self.line_map().location(offset)
    }

    /// Byte offset to 0-based line/character (LSP convention).
    pub fn position(&self, offset: u32) -> Position {
        self.line_map().position(offset)
    }

    /// Recover the interner for reuse in a later parse.
    pub fn into_interner(self) -> Interner {
        self.interner
    }
}

/// Parse `source` under `settings` and resolve scopes.
pub fn parse_program(source: &str, settings: &ParserSettings) -> Analysis {
    parse_with_interner(source, settings, Interner::new())
}

/// Like [`parse_program`], reusing an interner from a previous parse. The
/// interner is confined to one parsing session at a time.
pub fn parse_with_interner(
    source: &str,
    settings: &ParserSettings,
    mut interner: Interner,
) -> Analysis {
    // Bounded reuse: an over-budget pool is reset before this parse hands
    // out any atoms.
    interner.begin_session();
    let mut parser = ParserState::new(source.to_owned(), interner, settings.allow_shebang_line);
    if settings.strict_mode {
        parser.set_strict_mode(true);
    }
    let root = match settings.source_mode {
        SourceMode::Program => parser.parse_program(),
        SourceMode::Expression => parser.parse_expression_entry(),
    };
    let (arena, mut interner, mut diagnostics) = parser.into_parts();
    debug!(
        nodes = arena.len(),
        diagnostics = diagnostics.len(),
        "parse finished"
    );

    let options = ResolverOptions {
        known_globals: settings
            .known_globals
            .iter()
            .cloned()
            .collect::<FxHashSet<String>>(),
        mozilla_const: settings.const_statements_mozilla,
        strict_mode: settings.strict_mode,
    };
    let scopes =
        ResolverState::new(&arena, &mut interner, &options).resolve(root, &mut diagnostics);
    diagnostics.sort();

    Analysis {
        arena,
        root,
        scopes,
        diagnostics,
        source: source.to_owned(),
        interner,
        line_map: OnceCell::new(),
    }
}
