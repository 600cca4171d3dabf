//! String interner for identifier deduplication.
//!
//! Identifiers are interned into a per-session pool and passed around as u32
//! `Atom` handles. Name comparisons become integer comparisons, and the many
//! repeated identifiers of real-world source ("i", "length", "require", ...)
//! are stored once.
//!
//! The interner may be reused across parses for memory reuse. It is bounded:
//! when the pool grows past its budget, `begin_session` resets it wholesale
//! (atoms are vector indices, so individual entries cannot be evicted without
//! invalidating every outstanding handle). It is not thread-safe and must be
//! confined to one parsing session at a time.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::rc::Rc;

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `Interner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Default capacity budget for cross-parse reuse; see `begin_session`.
const DEFAULT_CAPACITY_LIMIT: usize = 64 * 1024;

const COMMON_STRINGS: &[&str] = &[
    // Keywords
    "break",
    "case",
    "catch",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "false",
    "finally",
    "for",
    "function",
    "get",
    "if",
    "in",
    "instanceof",
    "let",
    "new",
    "null",
    "of",
    "return",
    "set",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    // Common identifiers
    "arguments",
    "i",
    "j",
    "id",
    "name",
    "value",
    "length",
    "key",
    "index",
    "item",
    "data",
    "error",
    "result",
    "options",
    "callback",
    "constructor",
    "prototype",
    "toString",
    "valueOf",
    "hasOwnProperty",
    "Array",
    "Object",
    "String",
    "Number",
    "Boolean",
    "Function",
    "Math",
    "JSON",
    "Date",
    "RegExp",
    "Error",
    "console",
    "log",
    "document",
    "window",
    "global",
    "process",
    "module",
    "exports",
    "require",
    "undefined",
    "NaN",
    "Infinity",
];

/// String interner that deduplicates strings and returns Atom handles.
///
/// # Example
/// ```
/// use jscope_common::interner::Interner;
/// let mut interner = Interner::new();
/// let a1 = interner.intern("hello");
/// let a2 = interner.intern("hello");
/// assert_eq!(a1, a2); // Same atom for same string
/// assert_eq!(interner.resolve(a1), "hello");
/// ```
pub struct Interner {
    /// Map from string to atom index
    map: FxHashMap<Rc<str>, Atom>,
    /// Vector of all interned strings (index 0 is empty string)
    strings: Vec<Rc<str>>,
    /// Reset threshold for cross-parse reuse
    capacity_limit: usize,
}

impl Default for Interner {
    fn default() -> Self {
        Interner::new()
    }
}

impl Interner {
    /// Create a new interner with the empty string pre-interned at index 0
    /// and common JavaScript names pre-interned after it.
    pub fn new() -> Self {
        Interner::with_capacity_limit(DEFAULT_CAPACITY_LIMIT)
    }

    /// Create a new interner with an explicit reset threshold.
    pub fn with_capacity_limit(capacity_limit: usize) -> Self {
        let mut interner = Interner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(1024),
            capacity_limit,
        };
        // Index 0 is reserved for empty/none
        let empty: Rc<str> = Rc::from("");
        interner.strings.push(empty.clone());
        interner.map.insert(empty, Atom::NONE);
        interner.intern_common();
        interner
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let owned: Rc<str> = Rc::from(s);
        self.strings.push(owned.clone());
        self.map.insert(owned, atom);
        atom
    }

    /// Resolve an Atom back to its string value.
    /// Returns empty string if atom is out of bounds (safety for error recovery).
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.strings
            .get(atom.0 as usize)
            .map(|s| s.as_ref())
            .unwrap_or("")
    }

    /// Try to resolve an Atom, returning None if invalid.
    #[inline]
    pub fn try_resolve(&self, atom: Atom) -> Option<&str> {
        self.strings.get(atom.0 as usize).map(|s| s.as_ref())
    }

    /// Get the number of interned strings.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the interner is empty (only has the pre-interned strings).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1 + COMMON_STRINGS.len()
    }

    /// Mark the start of a new parsing session.
    ///
    /// Atoms handed out before this call belong to the previous session and
    /// must not be mixed with the new one once a reset has occurred. The pool
    /// is kept when it is still under budget so repeated parses of similar
    /// source reuse their identifier storage.
    pub fn begin_session(&mut self) {
        if self.strings.len() > self.capacity_limit {
            self.map.clear();
            self.strings.clear();
            let empty: Rc<str> = Rc::from("");
            self.strings.push(empty.clone());
            self.map.insert(empty, Atom::NONE);
            self.intern_common();
        }
    }

    fn intern_common(&mut self) {
        for s in COMMON_STRINGS {
            self.intern(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        let c = interner.intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "foo");
        assert_eq!(interner.resolve(c), "bar");
    }

    #[test]
    fn test_none_atom() {
        let mut interner = Interner::new();
        assert_eq!(interner.intern(""), Atom::NONE);
        assert_eq!(interner.resolve(Atom::NONE), "");
        assert!(Atom::NONE.is_none());
    }

    #[test]
    fn test_common_preinterned() {
        let mut a = Interner::new();
        let mut b = Interner::new();
        // Common strings get stable atoms across fresh interners.
        assert_eq!(a.intern("function"), b.intern("function"));
        assert_eq!(a.intern("arguments"), b.intern("arguments"));
    }

    #[test]
    fn test_session_reset_over_budget() {
        let mut interner = Interner::with_capacity_limit(COMMON_STRINGS.len() + 4);
        for i in 0..16 {
            interner.intern(&format!("ident_{i}"));
        }
        let before = interner.len();
        interner.begin_session();
        assert!(interner.len() < before);
        // Still usable after the reset.
        let atom = interner.intern("fresh");
        assert_eq!(interner.resolve(atom), "fresh");
    }

    #[test]
    fn test_session_keeps_pool_under_budget() {
        let mut interner = Interner::new();
        let atom = interner.intern("stable");
        interner.begin_session();
        assert_eq!(interner.resolve(atom), "stable");
    }
}
