//! Centralized limits and thresholds.
//!
//! Every bound that guarantees termination or caps recursion lives here so
//! the numbers are auditable in one place.

/// Maximum number of tokens a single recovery episode may skip before giving
/// up and propagating to the next enclosing handler. Guarantees the parser
/// terminates on arbitrarily garbled input.
pub const MAX_SKIPPED_TOKENS: usize = 50;

/// Maximum statement/expression nesting depth the parser will recurse into.
/// Deeper input is reported as an unrecoverable syntax error rather than
/// overflowing the stack.
pub const MAX_PARSE_DEPTH: u32 = 400;

/// Maximum scope-chain length the resolver will walk when resolving a
/// reference. Real scope chains are shallow; hitting this indicates a
/// resolver defect, not bad input.
pub const MAX_SCOPE_WALK: usize = 10_000;
