//! The AST node model: arena storage, node variants, and traversal.

pub mod arena;
pub mod node;
pub mod visit;
