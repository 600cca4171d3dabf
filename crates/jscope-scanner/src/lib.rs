//! JavaScript tokenizer for the jscope analyzer.
//!
//! This crate provides the lexical analysis phase:
//! - `TokenKind` - token types
//! - `TokenFlags` - per-token facts (preceding line break, unterminated, ...)
//! - `Scanner` - the tokenizer state machine, with save/restore for
//!   speculative parsing and an explicit regex rescan for the `/` vs regex
//!   ambiguity

pub mod scanner;
pub mod token;

pub use scanner::{Scanner, ScannerCheckpoint, TokenFlags};
pub use token::TokenKind;
