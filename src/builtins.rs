// File: src/builtins.rs
//
// Host-side helpers behind Arson's builtin functions.
// These are plain Rust functions; the interpreter's native function
// dispatcher converts runtime values and calls into them.

use rand::Rng;

/// Names of every builtin function, installed into each new interpreter.
pub const BUILTIN_NAMES: [&str; 7] = ["fire", "load", "random", "int", "float", "str", "bool"];

/// Random number functions

/// Generate a random integer between min and max (inclusive)
///
/// Callers must ensure `min <= max`.
pub fn random_int(min: i64, max: i64) -> i64 {
    let mut rng = rand::thread_rng();
    rng.gen_range(min..=max)
}

/// Conversion functions

/// Parse an integer literal of any length, ignoring surrounding whitespace.
/// Numbers are floats, so very long literals round like any other float.
pub fn parse_int(text: &str) -> Option<f64> {
    let text = text.trim();
    let digits = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok()
}

/// Parse a float literal, ignoring surrounding whitespace
pub fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Truncate toward zero into an `i64`, rejecting NaN, infinities and
/// anything outside the `i64` range instead of saturating
pub fn truncate(n: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let n = n.trunc();
    if n >= -LIMIT && n < LIMIT {
        Some(n as i64)
    } else {
        None
    }
}

/// Strip a single trailing line ending ("\n" or "\r\n")
pub fn chomp(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}
