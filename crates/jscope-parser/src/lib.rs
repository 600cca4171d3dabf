//! Recursive-descent JavaScript parser and AST for the jscope analyzer.
//!
//! This crate provides:
//! - `AstArena`, `NodeId`, `NodeData` - the arena-backed AST node model
//! - `Visitor`, `walk` - pre/post traversal with a skip-subtree signal
//! - `ParserState` - the parser, with token-set-driven error recovery
//!
//! The parser never aborts on malformed input: it resynchronizes at
//! statement/expression boundaries and always yields a best-effort tree plus
//! diagnostics, which is what a live editor needs.

pub mod ast;
pub mod parser;

pub use ast::arena::{AstArena, NodeId};
pub use ast::node::{
    BinaryOp, ConstantValue, DeclKind, ForInKind, FunctionType, NodeData, PropertyKind, UnaryOp,
};
pub use ast::visit::{Visitor, walk};
pub use parser::{ParserState, RecoveryError};
