//! The built-in function library. [`call_builtin`] is the single entry point
//! the driver calls for `FUNCTION` tokens; it performs the argument-error
//! short-circuit common to every built-in (see [`validate_args`]) before
//! handing off to the category module that implements the named function.
//!
//! Functions never see `Error` operands once they start running - that is
//! the point of running [`validate_args`] first - so the category modules
//! below only have to handle well-typed (but possibly wrongly-typed)
//! arguments.

mod bitwise;
mod math;
mod setops;
mod string;
mod time;

use crate::context::Timestamp;
use crate::error::EvalError;
use crate::stack::OperandStack;
use crate::token::Span;
use crate::value::{convert, Target, Value};

/// Maximum output length `repeat` will produce, matching the reference
/// runtime's compile-time ceiling.
pub(crate) const MAX_STRING_LEN: usize = 2_097_152;

/// If any of the top `arity` operands is an `Error`, returns the first one;
/// this becomes the function's result without running the function body at
/// all. Every built-in goes through this before its own argument handling.
fn validate_args(stack: &OperandStack, arity: usize) -> Option<Value> {
    stack.top_n(arity).iter().find(|v| v.is_error()).cloned()
}

fn ordinal(position: usize) -> &'static str {
    match position {
        1 => "first",
        2 => "second",
        3 => "third",
        4 => "fourth",
        _ => "next",
    }
}

pub(crate) fn coerce_str_positional(
    value: &Value,
    position: usize,
    loc: Span,
    expr: &str,
) -> Result<String, EvalError> {
    match convert(value, Target::String) {
        Some(Value::String(s)) => Ok(s),
        _ => Err(EvalError::coercion(
            format!("invalid function {} argument", ordinal(position)),
            loc.quote(expr),
        )),
    }
}

pub(crate) fn coerce_str_generic(value: &Value, loc: Span, expr: &str) -> Result<String, EvalError> {
    match convert(value, Target::String) {
        Some(Value::String(s)) => Ok(s),
        _ => Err(EvalError::coercion("invalid function argument", loc.quote(expr))),
    }
}

pub(crate) fn coerce_uint_generic(value: &Value, loc: Span, expr: &str) -> Result<u64, EvalError> {
    match convert(value, Target::Uint64) {
        Some(Value::Uint64(n)) => Ok(n),
        _ => Err(EvalError::coercion(
            "function argument is not an unsigned integer value",
            loc.quote(expr),
        )),
    }
}

pub(crate) fn coerce_double_math(value: &Value, loc: Span, expr: &str) -> Result<f64, EvalError> {
    match convert(value, Target::Double) {
        Some(Value::Double(d)) => Ok(d),
        _ => Err(EvalError::coercion("function argument is not a numeric value", loc.quote(expr))),
    }
}

fn arity_error(loc: Span, expr: &str) -> EvalError {
    EvalError::arity("invalid number of arguments for function", loc.quote(expr))
}

pub(crate) fn require_arity(arity: usize, expected: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    if arity != expected {
        return Err(arity_error(loc, expr));
    }
    Ok(())
}

pub(crate) fn require_arity_range(
    arity: usize,
    min: usize,
    max: usize,
    loc: Span,
    expr: &str,
) -> Result<(), EvalError> {
    if arity < min || arity > max {
        return Err(arity_error(loc, expr));
    }
    Ok(())
}

/// Dispatches a built-in function by name. Returns `None` when `name` is not
/// one of the ~30 built-ins, so the driver can fall back to the callback
/// bridge.
pub(crate) fn call_builtin(
    name: &str,
    arity: usize,
    stack: &mut OperandStack,
    loc: Span,
    expr: &str,
    ts: Timestamp,
) -> Option<Result<(), EvalError>> {
    if arity > stack.len() {
        return Some(Err(EvalError::arity(
            "not enough arguments for function",
            loc.quote(expr),
        )));
    }

    if let Some(err_value) = validate_args(stack, arity) {
        stack.function_return(arity, err_value);
        return Some(Ok(()));
    }

    let result = match name {
        "min" => math::min(stack, arity, loc, expr),
        "max" => math::max(stack, arity, loc, expr),
        "sum" => math::sum(stack, arity, loc, expr),
        "avg" => math::avg(stack, arity, loc, expr),
        "abs" => math::abs(stack, arity, loc, expr),

        "length" => string::length(stack, arity, loc, expr),
        "bytelength" => string::bytelength(stack, arity, loc, expr),
        "bitlength" => string::bitlength(stack, arity, loc, expr),
        "char" => string::char_fn(stack, arity, loc, expr),
        "ascii" => string::ascii(stack, arity, loc, expr),
        "left" => string::left(stack, arity, loc, expr),
        "right" => string::right(stack, arity, loc, expr),
        "mid" => string::mid(stack, arity, loc, expr),
        "concat" => string::concat(stack, arity, loc, expr),
        "insert" => string::insert(stack, arity, loc, expr),
        "replace" => string::replace(stack, arity, loc, expr),
        "repeat" => string::repeat(stack, arity, loc, expr),
        "ltrim" => string::ltrim(stack, arity, loc, expr),
        "rtrim" => string::rtrim(stack, arity, loc, expr),
        "trim" => string::trim(stack, arity, loc, expr),

        "date" => time::date(stack, arity, loc, expr, ts),
        "time" => time::time_of_day(stack, arity, loc, expr, ts),
        "now" => time::now(stack, arity, loc, expr, ts),
        "dayofweek" => time::dayofweek(stack, arity, loc, expr, ts),
        "dayofmonth" => time::dayofmonth(stack, arity, loc, expr, ts),

        "bitand" => bitwise::bitand(stack, arity, loc, expr),
        "bitor" => bitwise::bitor(stack, arity, loc, expr),
        "bitxor" => bitwise::bitxor(stack, arity, loc, expr),
        "bitlshift" => bitwise::bitlshift(stack, arity, loc, expr),
        "bitrshift" => bitwise::bitrshift(stack, arity, loc, expr),
        "bitnot" => bitwise::bitnot(stack, arity, loc, expr),

        "between" => setops::between(stack, arity, loc, expr),
        "in" => setops::in_fn(stack, arity, loc, expr),

        _ => return None,
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_argument_short_circuits_before_running_the_function() {
        let mut stack = OperandStack::new();
        stack.push(Value::Error("boom".to_string()));
        stack.push(Value::Uint64(2));
        let loc = Span::new(0, 0);
        call_builtin("left", 2, &mut stack, loc, "", Timestamp::default())
            .unwrap()
            .unwrap();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.peek(0), Some(&Value::Error("boom".to_string())));
    }

    #[test]
    fn unknown_name_returns_none() {
        let mut stack = OperandStack::new();
        stack.push(Value::Uint64(1));
        let loc = Span::new(0, 0);
        assert!(call_builtin("frobnicate", 1, &mut stack, loc, "", Timestamp::default()).is_none());
    }
}
