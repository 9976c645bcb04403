//! Error kinds and the structured runtime error type for expression evaluation.
//!
//! ## Design
//! - [`EvalErrorKind`] is a compact, `repr(u8)` enumeration of the error
//!   *categories* a failed evaluation can fall into. It exists so callers can
//!   match on error class without parsing `Display` output.
//! - [`EvalError`] is the richer enum actually returned from fallible
//!   operations. Most variants carry a message body plus an optional quoted
//!   source-location substring; [`EvalError::Propagated`] instead wraps the
//!   text of a `Value::Error` operand that escaped the evaluation unabsorbed.
//!
//! ## Display
//! Every variant but [`EvalError::Callback`] renders as `"<body> at
//! \"<location>\""`, or just `<body>` when there is no location to quote.
//! `Callback` renders with a trailing period, matching the one place in the
//! error taxonomy where a host-supplied message is wrapped rather than
//! generated locally.

use std::fmt;

/// Compact enum of error categories, independent of the formatted message.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// Too few operands/arguments were available.
    Arity = 0,
    /// A value could not be coerced to the type an operator or function required.
    Coercion = 1,
    /// Inputs were individually well-typed but jointly invalid (div by zero, empty vector, ...).
    Domain = 2,
    /// The host OS refused a request the evaluator depends on.
    Os = 3,
    /// The token stream or stack was in a shape the driver cannot make sense of.
    Structural = 4,
    /// A `Value::Error` operand propagated out of the evaluation unabsorbed.
    Propagated = 5,
}

impl TryFrom<u8> for EvalErrorKind {
    type Error = ();

    fn try_from(v: u8) -> Result<Self, ()> {
        use EvalErrorKind::*;
        Ok(match v {
            0 => Arity,
            1 => Coercion,
            2 => Domain,
            3 => Os,
            4 => Structural,
            5 => Propagated,
            _ => return Err(()),
        })
    }
}

/// A failed evaluation. Returned from every fallible operation in this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    Arity { body: String, at: Option<String> },
    Coercion { body: String, at: Option<String> },
    Domain { body: String, at: Option<String> },
    Os { body: String, at: Option<String> },
    Structural { body: String, at: Option<String> },
    /// A host callback (common-function or history-function) failed, or no
    /// callback was configured for an unrecognized function name. Both cases
    /// share the same "<message> at \"<location>\"." wire format.
    Callback { message: String, at: String },
    /// An unabsorbed `Value::Error` reached the top of the stack at the end of evaluation.
    Propagated(String),
}

impl EvalError {
    pub fn kind(&self) -> EvalErrorKind {
        match self {
            EvalError::Arity { .. } => EvalErrorKind::Arity,
            EvalError::Coercion { .. } => EvalErrorKind::Coercion,
            EvalError::Domain { .. } => EvalErrorKind::Domain,
            EvalError::Os { .. } => EvalErrorKind::Os,
            EvalError::Structural { .. } => EvalErrorKind::Structural,
            EvalError::Callback { .. } => EvalErrorKind::Structural,
            EvalError::Propagated(_) => EvalErrorKind::Propagated,
        }
    }

    pub fn arity(body: impl Into<String>, at: impl Into<String>) -> Self {
        EvalError::Arity { body: body.into(), at: Some(at.into()) }
    }

    pub fn arity_unlocated(body: impl Into<String>) -> Self {
        EvalError::Arity { body: body.into(), at: None }
    }

    pub fn coercion(body: impl Into<String>, at: impl Into<String>) -> Self {
        EvalError::Coercion { body: body.into(), at: Some(at.into()) }
    }

    pub fn domain(body: impl Into<String>, at: impl Into<String>) -> Self {
        EvalError::Domain { body: body.into(), at: Some(at.into()) }
    }

    pub fn os(body: impl Into<String>, at: impl Into<String>) -> Self {
        EvalError::Os { body: body.into(), at: Some(at.into()) }
    }

    pub fn structural(body: impl Into<String>, at: impl Into<String>) -> Self {
        EvalError::Structural { body: body.into(), at: Some(at.into()) }
    }

    pub fn structural_unlocated(body: impl Into<String>) -> Self {
        EvalError::Structural { body: body.into(), at: None }
    }

    pub fn callback(message: impl Into<String>, at: impl Into<String>) -> Self {
        EvalError::Callback { message: message.into(), at: at.into() }
    }
}

fn fmt_with_location(
    f: &mut fmt::Formatter<'_>,
    body: &str,
    at: &Option<String>,
) -> fmt::Result {
    match at {
        Some(loc) => write!(f, "{body} at \"{loc}\""),
        None => write!(f, "{body}"),
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Arity { body, at } => fmt_with_location(f, body, at),
            EvalError::Coercion { body, at } => fmt_with_location(f, body, at),
            EvalError::Domain { body, at } => fmt_with_location(f, body, at),
            EvalError::Os { body, at } => fmt_with_location(f, body, at),
            EvalError::Structural { body, at } => fmt_with_location(f, body, at),
            EvalError::Callback { message, at } => write!(f, "{message} at \"{at}\"."),
            EvalError::Propagated(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Applies the top-level casing rule: a message starting with a lowercase
/// ASCII letter is prefixed; anything else (including callback messages and
/// the capitalized "Unknown function" structural error) passes through
/// unchanged.
pub fn format_top_level(err: &EvalError) -> String {
    let rendered = err.to_string();
    match rendered.chars().next() {
        Some(c) if c.is_ascii_lowercase() => format!("Cannot evaluate expression: {rendered}"),
        _ => rendered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn located_message_quotes_source() {
        let err = EvalError::coercion("operand is not a numeric value", "1 + \"x\"");
        assert_eq!(err.to_string(), "operand is not a numeric value at \"1 + \"x\"\"");
    }

    #[test]
    fn callback_message_has_trailing_period() {
        let err = EvalError::callback("item not found", "last(/host/key)");
        assert_eq!(err.to_string(), "item not found at \"last(/host/key)\".");
    }

    #[test]
    fn top_level_prefixes_lowercase_only() {
        let lower = EvalError::structural_unlocated("exception must have one argument");
        assert_eq!(
            format_top_level(&lower),
            "Cannot evaluate expression: exception must have one argument"
        );

        let upper = EvalError::callback("Unknown function", "weirdo()");
        assert_eq!(format_top_level(&upper), "Unknown function at \"weirdo()\".");
    }
}
