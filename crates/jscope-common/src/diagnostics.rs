//! Diagnostic infrastructure.
//!
//! This module provides the closed error catalog and the sink through which
//! the parser and resolver report problems. The core never aborts on user
//! input; everything recoverable is funneled through `ErrorSink` and analysis
//! continues with a best-effort result.
//!
//! # Components
//!
//! - `Severity` - 0 (certain runtime error) through 4 (stylistic)
//! - `ErrorKind` - the closed catalog of reportable conditions
//! - `Diagnostic` - a single report with span, severity, and recoverability
//! - `ErrorSink` - the callback interface an embedder may implement
//! - `DiagnosticBag` - the default collecting sink, with per-parse
//!   de-duplication of undeclared-variable reports

use crate::span::Span;
use serde::Serialize;
use std::fmt;

// =============================================================================
// Severity
// =============================================================================

/// The severity level of a diagnostic. Lower numbers are worse: 0 is a
/// certain runtime error, 4 is purely stylistic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Certain runtime error (severity 0)
    Error = 0,
    /// Probable runtime problem (severity 1)
    High = 1,
    /// Cross-browser or correctness hazard (severity 2)
    Moderate = 2,
    /// Suspicious but legal (severity 3)
    Low = 3,
    /// Stylistic (severity 4)
    Style = 4,
}

impl Severity {
    /// Numeric value 0-4 as surfaced to embedders.
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::High => "high",
            Severity::Moderate => "moderate",
            Severity::Low => "low",
            Severity::Style => "style",
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Error catalog
// =============================================================================

/// The closed catalog of conditions the parser and resolver can report.
///
/// Each kind carries a stable numeric code and a default severity. Codes in
/// the 1xxx range are lexical/syntactic, 2xxx are scope/semantic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    // --- lexical / syntactic ---
    UnexpectedToken,
    ExpectedExpression,
    ExpectedIdentifier,
    ExpectedToken,
    ExpectedSemicolon,
    SemicolonInsertion,
    UnterminatedString,
    UnterminatedComment,
    UnterminatedRegExp,
    BadNumericLiteral,
    OctalLiteralDeprecated,
    BadAssignmentTarget,
    NoCatchOrFinally,
    LabelNotFound,
    DuplicateLabel,
    BadBreak,
    BadContinue,
    MisplacedFunctionDeclaration,
    FunctionNameRequired,
    ParseDepthExceeded,
    ShebangNotAllowed,
    UnexpectedEndOfFile,
    // --- scope / semantic ---
    DuplicateLexicalDeclaration,
    UndeclaredVariable,
    AmbiguousCatchVariable,
    AmbiguousNamedFunctionExpression,
    WithNotRecommended,
}

impl ErrorKind {
    /// Stable numeric code for this kind.
    pub fn code(self) -> u32 {
        match self {
            ErrorKind::UnexpectedToken => 1001,
            ErrorKind::ExpectedExpression => 1002,
            ErrorKind::ExpectedIdentifier => 1003,
            ErrorKind::ExpectedToken => 1004,
            ErrorKind::ExpectedSemicolon => 1005,
            ErrorKind::SemicolonInsertion => 1006,
            ErrorKind::UnterminatedString => 1010,
            ErrorKind::UnterminatedComment => 1011,
            ErrorKind::UnterminatedRegExp => 1012,
            ErrorKind::BadNumericLiteral => 1013,
            ErrorKind::OctalLiteralDeprecated => 1014,
            ErrorKind::BadAssignmentTarget => 1020,
            ErrorKind::NoCatchOrFinally => 1021,
            ErrorKind::LabelNotFound => 1022,
            ErrorKind::DuplicateLabel => 1023,
            ErrorKind::BadBreak => 1024,
            ErrorKind::BadContinue => 1025,
            ErrorKind::MisplacedFunctionDeclaration => 1030,
            ErrorKind::FunctionNameRequired => 1031,
            ErrorKind::ParseDepthExceeded => 1032,
            ErrorKind::ShebangNotAllowed => 1040,
            ErrorKind::UnexpectedEndOfFile => 1041,
            ErrorKind::DuplicateLexicalDeclaration => 2001,
            ErrorKind::UndeclaredVariable => 2002,
            ErrorKind::AmbiguousCatchVariable => 2003,
            ErrorKind::AmbiguousNamedFunctionExpression => 2004,
            ErrorKind::WithNotRecommended => 2005,
        }
    }

    /// Default severity for this kind.
    pub fn severity(self) -> Severity {
        match self {
            ErrorKind::UnexpectedToken
            | ErrorKind::ExpectedExpression
            | ErrorKind::ExpectedIdentifier
            | ErrorKind::ExpectedToken
            | ErrorKind::ExpectedSemicolon
            | ErrorKind::UnterminatedString
            | ErrorKind::UnterminatedComment
            | ErrorKind::UnterminatedRegExp
            | ErrorKind::NoCatchOrFinally
            | ErrorKind::ParseDepthExceeded
            | ErrorKind::UnexpectedEndOfFile
            | ErrorKind::DuplicateLexicalDeclaration => Severity::Error,
            ErrorKind::BadNumericLiteral
            | ErrorKind::BadAssignmentTarget
            | ErrorKind::LabelNotFound
            | ErrorKind::DuplicateLabel
            | ErrorKind::BadBreak
            | ErrorKind::BadContinue
            | ErrorKind::FunctionNameRequired
            | ErrorKind::ShebangNotAllowed => Severity::High,
            ErrorKind::MisplacedFunctionDeclaration
            | ErrorKind::AmbiguousCatchVariable
            | ErrorKind::AmbiguousNamedFunctionExpression => Severity::Moderate,
            ErrorKind::OctalLiteralDeprecated | ErrorKind::UndeclaredVariable => Severity::Low,
            ErrorKind::SemicolonInsertion | ErrorKind::WithNotRecommended => Severity::Style,
        }
    }
}

// =============================================================================
// Diagnostic
// =============================================================================

/// A single diagnostic report.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    /// The catalog entry this report belongs to
    pub kind: ErrorKind,
    /// Source span (0-based byte offsets)
    pub span: Span,
    /// Severity, defaulted from the kind but overridable
    pub severity: Severity,
    /// Whether analysis continued past this condition
    pub recoverable: bool,
    /// Human-readable message
    pub message: String,
    /// The identifier this report is about, when there is one. Used for
    /// per-name de-duplication of undeclared-variable reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, span: Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            kind,
            span,
            severity: kind.severity(),
            recoverable: true,
            message: message.into(),
            subject: None,
        }
    }

    /// Attach the identifier this diagnostic is about.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Diagnostic {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Diagnostic {
        self.severity = severity;
        self
    }

    /// Mark this diagnostic as one analysis could not continue past.
    pub fn unrecoverable(mut self) -> Diagnostic {
        self.recoverable = false;
        self
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    /// Format in a compact fixed form, e.g. `error[JS2002]: 'x' is undeclared`.
    pub fn format_simple(&self) -> String {
        format!("{}[JS{}]: {}", self.severity, self.code(), self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

// =============================================================================
// ErrorSink
// =============================================================================

/// Callback interface through which the parser and resolver deliver
/// diagnostics. The embedding collaborator may render, log, or ignore them.
pub trait ErrorSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

// =============================================================================
// DiagnosticBag
// =============================================================================

/// The default collecting `ErrorSink`.
///
/// The bag owns two pieces of per-parse policy state, created at parse start
/// and discarded with the bag:
/// - undeclared-variable reports are kept at most once per distinct name;
/// - while recovering at one token position, a second report at the same
///   start offset with worse-or-equal severity is suppressed.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
    /// Names already reported as undeclared in this parse
    reported_undeclared: rustc_hash::FxHashSet<String>,
    /// Position and severity of the most recent recoverable report
    last_report: Option<(u32, Severity)>,
    error_count: usize,
}

impl DiagnosticBag {
    pub fn new() -> DiagnosticBag {
        DiagnosticBag::default()
    }

    /// Check if there are any diagnostics.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Check if there are any severity-0 diagnostics.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Diagnostics of one catalog kind, in report order.
    pub fn by_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Number of diagnostics of one catalog kind.
    pub fn count_of(&self, kind: ErrorKind) -> usize {
        self.by_kind(kind).count()
    }

    /// Sort by start offset, then severity.
    pub fn sort(&mut self) {
        self.diagnostics
            .sort_by(|a, b| match a.span.start.cmp(&b.span.start) {
                std::cmp::Ordering::Equal => a.severity.cmp(&b.severity),
                other => other,
            });
    }

    /// Take all diagnostics, leaving the bag empty but keeping the per-parse
    /// de-duplication state.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        std::mem::take(&mut self.diagnostics)
    }

    /// Forward every collected diagnostic into another sink.
    pub fn drain_into(&mut self, sink: &mut dyn ErrorSink) {
        for diagnostic in self.take() {
            sink.report(diagnostic);
        }
    }
}

impl ErrorSink for DiagnosticBag {
    fn report(&mut self, diagnostic: Diagnostic) {
        // Undeclared-variable reports are per-name, once per parse.
        if diagnostic.kind == ErrorKind::UndeclaredVariable {
            if let Some(name) = &diagnostic.subject {
                if !self.reported_undeclared.insert(name.clone()) {
                    return;
                }
            }
        }

        // Same-position suppression while in a degraded recovery state: a
        // worse-or-equal report at the offset we already reported is noise.
        if let Some((start, severity)) = self.last_report {
            if diagnostic.recoverable
                && diagnostic.span.start == start
                && diagnostic.severity >= severity
            {
                return;
            }
        }
        if diagnostic.recoverable {
            self.last_report = Some((diagnostic.span.start, diagnostic.severity));
        }

        if diagnostic.severity.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(kind: ErrorKind, start: u32) -> Diagnostic {
        Diagnostic::new(kind, Span::new(start, 1), "test")
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error < Severity::Style);
        assert_eq!(Severity::Error.value(), 0);
        assert_eq!(Severity::Style.value(), 4);
    }

    #[test]
    fn test_catalog_codes_stable() {
        assert_eq!(ErrorKind::UndeclaredVariable.code(), 2002);
        assert_eq!(ErrorKind::SemicolonInsertion.code(), 1006);
        assert_eq!(
            ErrorKind::SemicolonInsertion.severity(),
            Severity::Style
        );
    }

    #[test]
    fn test_undeclared_dedup_per_name() {
        let mut bag = DiagnosticBag::new();
        for start in [0, 10, 20] {
            bag.report(
                Diagnostic::new(
                    ErrorKind::UndeclaredVariable,
                    Span::new(start, 1),
                    "'x' is undeclared",
                )
                .with_subject("x"),
            );
        }
        bag.report(
            Diagnostic::new(
                ErrorKind::UndeclaredVariable,
                Span::new(30, 1),
                "'y' is undeclared",
            )
            .with_subject("y"),
        );
        assert_eq!(bag.count_of(ErrorKind::UndeclaredVariable), 2);
    }

    #[test]
    fn test_same_position_suppression() {
        let mut bag = DiagnosticBag::new();
        bag.report(diag(ErrorKind::UnexpectedToken, 5));
        // Equal-or-worse severity at the same offset is suppressed.
        bag.report(diag(ErrorKind::SemicolonInsertion, 5));
        assert_eq!(bag.len(), 1);
        // A different offset goes through.
        bag.report(diag(ErrorKind::SemicolonInsertion, 6));
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_sort_and_take() {
        let mut bag = DiagnosticBag::new();
        bag.report(diag(ErrorKind::UnexpectedToken, 9));
        bag.report(diag(ErrorKind::ExpectedExpression, 3));
        bag.sort();
        let all = bag.take();
        assert_eq!(all[0].span.start, 3);
        assert!(bag.is_empty());
    }

    #[test]
    fn test_format_simple() {
        let d = Diagnostic::new(
            ErrorKind::UndeclaredVariable,
            Span::new(0, 1),
            "'q' has not been declared",
        );
        assert_eq!(
            d.format_simple(),
            "low[JS2002]: 'q' has not been declared"
        );
    }
}
