//! The bridge to host-provided functions: whatever `functions::call_builtin`
//! doesn't recognize by name, and every `HistFunction` token regardless of
//! name (history lookups are never built in - they depend on data this crate
//! does not have access to).
//!
//! A C runtime would thread an opaque `void *data` pointer through a
//! function pointer. Here the host just captures whatever state it needs in
//! a closure; [`EvalContext::with_callbacks`](crate::context::EvalContext::with_callbacks)
//! takes that closure directly.

use crate::context::{CallbackFn, Timestamp};
use crate::error::EvalError;
use crate::stack::OperandStack;
use crate::token::Span;
use crate::value::Value;

/// Invokes `cb` with the top `arity` stack values as arguments and folds the
/// result back onto the stack, honoring `process_error`:
/// - success pushes the returned value in place of the arguments.
/// - failure with `process_error == false` propagates as an [`EvalError`].
/// - failure with `process_error == true` becomes a `Value::Error` result,
///   same as a built-in function failing under the same rule.
pub(crate) fn invoke(
    cb: &CallbackFn<'_>,
    name: &str,
    stack: &mut OperandStack,
    arity: usize,
    loc: Span,
    expr: &str,
    ts: Timestamp,
    process_error: bool,
) -> Result<(), EvalError> {
    let args = stack.top_n(arity);
    match cb(name, args, &ts) {
        Ok(value) => {
            stack.function_return(arity, value);
            Ok(())
        }
        Err(message) => {
            if process_error {
                stack.function_return(arity, Value::Error(message));
                Ok(())
            } else {
                Err(EvalError::callback(message, loc.quote(expr)))
            }
        }
    }
}

/// Produces the error for a function name neither `call_builtin` nor a
/// configured callback recognizes.
pub(crate) fn unknown_function(loc: Span, expr: &str) -> EvalError {
    EvalError::callback("Unknown function", loc.quote(expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn successful_callback_replaces_arguments_with_its_result() {
        let mut stack = OperandStack::new();
        stack.push(Value::String("/host/key".to_string()));
        let cb: &CallbackFn = &|_name, _args, _ts| Ok(Value::Double(42.0));
        invoke(cb, "last", &mut stack, 1, loc(), "", Timestamp::default(), false).unwrap();
        assert_eq!(stack.peek(0), Some(&Value::Double(42.0)));
    }

    #[test]
    fn failed_callback_propagates_as_error_without_process_error() {
        let mut stack = OperandStack::new();
        stack.push(Value::String("/host/key".to_string()));
        let cb: &CallbackFn = &|_name, _args, _ts| Err("item not found".to_string());
        let err = invoke(cb, "last", &mut stack, 1, loc(), "last(/host/key)", Timestamp::default(), false)
            .unwrap_err();
        assert_eq!(err.to_string(), "item not found at \"last(/host/key)\".");
    }

    #[test]
    fn failed_callback_becomes_error_value_under_process_error() {
        let mut stack = OperandStack::new();
        stack.push(Value::String("/host/key".to_string()));
        let cb: &CallbackFn = &|_name, _args, _ts| Err("item not found".to_string());
        invoke(cb, "last", &mut stack, 1, loc(), "", Timestamp::default(), true).unwrap();
        assert_eq!(stack.peek(0), Some(&Value::Error("item not found".to_string())));
    }
}
