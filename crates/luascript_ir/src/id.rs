//! Stable, compact textual identifiers for IR nodes.
//!
//! Identifiers have the form `PREFIX_DIGITS`, where `DIGITS` is a
//! balanced-ternary encoding (`T` = -1, `0`, `1`) of a monotonically
//! increasing counter. Balanced ternary is used (rather than plain decimal
//! or hex) because it is deterministic given generator state and produces
//! stable golden diffs across runs with the same input.

use once_cell::sync::Lazy;
use regex::Regex;

use luascript_diagnostic::CompileError;

/// Node id namespace prefixes.
pub const PREFIX_NODE: &str = "node";
pub const PREFIX_DECL: &str = "decl";
pub const PREFIX_CFG: &str = "cfg";
pub const PREFIX_BB: &str = "bb";
pub const PREFIX_IR: &str = "ir";

static ID_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*_[T01]+$").unwrap());

/// Whether a string matches the `PREFIX_[T01]+` shape invariant.
///
/// This is the only property consumers may rely on — ids are otherwise
/// opaque.
pub fn is_valid_id_shape(id: &str) -> bool {
    ID_SHAPE.is_match(id)
}

/// Balanced-ternary encode a non-negative integer.
///
/// `encode(0) == "0"`. Uses only the digits `T`, `0`, `1` (property P4).
pub fn encode(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n != 0 {
        match n % 3 {
            0 => {
                digits.push('0');
                n /= 3;
            }
            1 => {
                digits.push('1');
                n /= 3;
            }
            2 => {
                digits.push('T');
                n = n / 3 + 1;
            }
            _ => unreachable!("n % 3 is always 0, 1, or 2"),
        }
    }
    digits.iter().rev().collect()
}

/// Decode a balanced-ternary digit string back into an integer.
///
/// Inverse of [`encode`]; `decode(encode(n)) == n` for all non-negative `n`
/// (property P4). Panics if `digits` contains a character outside `T01` —
/// callers should validate shape first via [`is_valid_id_shape`].
pub fn decode(digits: &str) -> u64 {
    let mut n: i64 = 0;
    for c in digits.chars() {
        let d: i64 = match c {
            'T' => -1,
            '0' => 0,
            '1' => 1,
            other => panic!("invalid balanced-ternary digit: {other:?}"),
        };
        n = n * 3 + d;
    }
    // Safety: encode() never produces a string decoding to a negative
    // number for any non-negative input, by construction.
    n.try_into().unwrap_or(0)
}

/// Produces stable, compact textual identifiers for IR nodes.
///
/// Single-threaded, reentrant across compilations: each
/// `Builder` owns a fresh `IdGenerator`, never shared across concurrent
/// compiles.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    counter: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `prefix + "_" + encode(counter)` and advances the counter.
    pub fn next(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}_{}", encode(self.counter));
        self.counter += 1;
        id
    }

    /// Returns what [`Self::next`] would return, without advancing.
    pub fn peek(&self, prefix: &str) -> String {
        format!("{prefix}_{}", encode(self.counter))
    }

    /// Resets the counter to `n`. Rejects negative inputs.
    pub fn reset(&mut self, n: i64) -> Result<(), CompileError> {
        if n < 0 {
            return Err(CompileError::InvalidInput(format!(
                "IdGenerator::reset called with negative counter {n}"
            )));
        }
        self.counter = n as u64;
        Ok(())
    }
}
