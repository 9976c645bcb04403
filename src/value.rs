//! The tagged-variant runtime type that flows through the operand stack.
//!
//! ## Variants
//! - `None` - null argument / cleared slot.
//! - `Uint64` - exact 64-bit unsigned integer literal.
//! - `Double` - IEEE-754 result of arithmetic.
//! - `String` - owned UTF-8, never absent, may be empty.
//! - `Error` - a first-class error operand; see [`crate::error`] for the
//!   distinction between this and the crate's `std::error::Error` type.
//! - `DoubleVector` - an ordered sequence of doubles, only ever produced
//!   upstream (history data) and only ever consumed by aggregation functions.
//!
//! `Value` never needs a manual clear/copy step the way the C union this
//! design is based on does: `Clone` and `Drop` give that for free.

use std::cmp::Ordering;

use crate::suffix;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Uint64(u64),
    Double(f64),
    String(String),
    Error(String),
    DoubleVector(Vec<f64>),
}

/// A coercion target for [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Double,
    Uint64,
    String,
}

impl Value {
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Short type description used inside coercion-failure messages, matching
    /// the reference runtime's `eval_type_desc`.
    pub fn type_desc(&self) -> &'static str {
        match self {
            Value::Double(_) => "a numeric",
            Value::Uint64(_) => "an unsigned integer",
            Value::String(_) => "a string",
            Value::None => "a null",
            Value::Error(_) => "an error",
            Value::DoubleVector(_) => "a vector",
        }
    }

    /// Best-effort text form used only as the fallback branch of [`compare`];
    /// unlike [`convert`] to `Target::String` this never fails.
    fn display_text(&self) -> String {
        match self {
            Value::Uint64(n) => n.to_string(),
            Value::Double(d) => format!("{d}"),
            Value::String(s) => s.clone(),
            Value::None => String::new(),
            Value::Error(msg) => msg.clone(),
            Value::DoubleVector(_) => String::new(),
        }
    }

    /// Numeric reading used by [`compare`]: natively numeric values pass
    /// through, strings attempt suffix-number parsing, everything else opts
    /// out of the numeric branch.
    fn suffixed_numeric(&self) -> Option<f64> {
        match self {
            Value::Uint64(n) => Some(*n as f64),
            Value::Double(d) => Some(*d),
            Value::String(s) => suffix::parse_suffixed_double(s),
            _ => None,
        }
    }
}

/// Converts `value` to `target`, applying the coercion rules in full. Returns
/// `None` on failure; callers attach their own positional/operator-specific
/// message text (see [`crate::error::EvalError`]) since the same failure
/// reads differently from a unary operator, a binary operator, and a
/// function argument.
pub fn convert(value: &Value, target: Target) -> Option<Value> {
    match target {
        Target::Double => match value {
            Value::Uint64(n) => Some(Value::Double(*n as f64)),
            Value::Double(d) => Some(Value::Double(*d)),
            Value::String(s) => suffix::parse_suffixed_double(s)
                .or_else(|| s.trim().parse::<f64>().ok())
                .map(Value::Double),
            _ => None,
        },
        Target::Uint64 => match value {
            Value::Uint64(n) => Some(Value::Uint64(*n)),
            Value::Double(d) => {
                if d.is_finite() && *d >= 0.0 && *d <= u64::MAX as f64 {
                    Some(Value::Uint64(*d as u64))
                } else {
                    None
                }
            }
            Value::String(s) => s.trim().parse::<u64>().ok().map(Value::Uint64),
            _ => None,
        },
        Target::String => match value {
            Value::Uint64(n) => Some(Value::String(n.to_string())),
            Value::Double(d) => Some(Value::String(format!("{d}"))),
            Value::String(s) => Some(Value::String(s.clone())),
            _ => None,
        },
    }
}

/// Total ordering over the full `Value` domain: suffix-aware numeric compare
/// when both sides read as numbers, lexicographic text compare otherwise.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (a.suffixed_numeric(), b.suffixed_numeric()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    a.display_text().cmp(&b.display_text())
}
