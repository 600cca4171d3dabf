//! Common types and utilities for the jscope JavaScript analyzer.
//!
//! This crate provides foundational types used across all jscope crates:
//! - String interning (`Atom`, `Interner`)
//! - Source spans and their compact encoding (`Span`, `EncodedSpan`, `SpanTable`)
//! - Offset-to-line/column resolution (`LineMap`, `Location`, `Position`)
//! - The diagnostic catalog and sink (`ErrorKind`, `Diagnostic`, `ErrorSink`,
//!   `DiagnosticBag`)
//! - Centralized limits and thresholds

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Span - source location tracking (byte offsets)
pub mod span;
pub use span::{EncodedSpan, Span, SpanTable};

// Position/Location types for line/column source locations
pub mod position;
pub use position::{LineMap, Location, Position};

// Centralized limits and thresholds
pub mod limits;

// Diagnostic catalog, severities, and the error sink
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticBag, ErrorKind, ErrorSink, Severity};
