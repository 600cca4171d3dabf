//! Built-in global names consulted when resolution reaches the Global scope
//! without finding a declaration.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

/// Value-like properties of the global object.
pub static GLOBAL_PROPERTIES: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "undefined",
        "NaN",
        "Infinity",
        "globalThis",
        "Math",
        "JSON",
        "Reflect",
    ]
    .into_iter()
    .collect()
});

/// Callable (or constructable) members of the global object.
pub static GLOBAL_FUNCTIONS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "eval",
        "parseInt",
        "parseFloat",
        "isNaN",
        "isFinite",
        "decodeURI",
        "decodeURIComponent",
        "encodeURI",
        "encodeURIComponent",
        "Object",
        "Function",
        "Array",
        "String",
        "Boolean",
        "Number",
        "Date",
        "RegExp",
        "Error",
        "EvalError",
        "RangeError",
        "ReferenceError",
        "SyntaxError",
        "TypeError",
        "URIError",
        "Promise",
        "Map",
        "Set",
        "WeakMap",
        "WeakSet",
        "Symbol",
        "Proxy",
        "ArrayBuffer",
        "DataView",
        "Int8Array",
        "Uint8Array",
        "Uint8ClampedArray",
        "Int16Array",
        "Uint16Array",
        "Int32Array",
        "Uint32Array",
        "Float32Array",
        "Float64Array",
    ]
    .into_iter()
    .collect()
});

pub fn is_global_property(name: &str) -> bool {
    GLOBAL_PROPERTIES.contains(name)
}

pub fn is_global_function(name: &str) -> bool {
    GLOBAL_FUNCTIONS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_membership() {
        assert!(is_global_property("undefined"));
        assert!(is_global_function("parseInt"));
        assert!(!is_global_property("parseInt"));
        assert!(!is_global_function("definitelyNotBuiltIn"));
    }
}
