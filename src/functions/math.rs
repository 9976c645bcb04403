//! Math / aggregation built-ins: `min`, `max`, `sum`, `avg`, `abs`.
//!
//! `min`/`max`/`sum`/`avg` accept either N scalar arguments or exactly one
//! `DoubleVector` argument (non-empty, and only legal at arity 1).

use super::{arity_error, coerce_double_math, require_arity};
use crate::error::EvalError;
use crate::stack::OperandStack;
use crate::token::Span;
use crate::value::Value;

enum MathArgs {
    Scalars(Vec<f64>),
    Vector(Vec<f64>),
}

impl MathArgs {
    fn values(&self) -> &[f64] {
        match self {
            MathArgs::Scalars(v) | MathArgs::Vector(v) => v,
        }
    }
}

fn prepare_math_args(stack: &OperandStack, arity: usize, loc: Span, expr: &str) -> Result<MathArgs, EvalError> {
    if arity == 0 {
        return Err(arity_error(loc, expr));
    }
    let args = stack.top_n(arity);
    if let Some(Value::DoubleVector(v)) = args.first() {
        if arity != 1 {
            return Err(EvalError::domain("too many arguments for function", loc.quote(expr)));
        }
        if v.is_empty() {
            return Err(EvalError::domain("empty vector argument for function", loc.quote(expr)));
        }
        return Ok(MathArgs::Vector(v.clone()));
    }

    let mut scalars = Vec::with_capacity(arity);
    for arg in args {
        scalars.push(coerce_double_math(arg, loc, expr)?);
    }
    Ok(MathArgs::Scalars(scalars))
}

pub(crate) fn min(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    let prepared = prepare_math_args(stack, arity, loc, expr)?;
    let result = prepared.values().iter().copied().fold(f64::INFINITY, f64::min);
    stack.function_return(arity, Value::Double(result));
    Ok(())
}

pub(crate) fn max(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    let prepared = prepare_math_args(stack, arity, loc, expr)?;
    let result = prepared.values().iter().copied().fold(f64::NEG_INFINITY, f64::max);
    stack.function_return(arity, Value::Double(result));
    Ok(())
}

pub(crate) fn sum(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    let prepared = prepare_math_args(stack, arity, loc, expr)?;
    let result: f64 = prepared.values().iter().sum();
    stack.function_return(arity, Value::Double(result));
    Ok(())
}

pub(crate) fn avg(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    let prepared = prepare_math_args(stack, arity, loc, expr)?;
    let values = prepared.values();
    let result: f64 = values.iter().sum::<f64>() / values.len() as f64;
    stack.function_return(arity, Value::Double(result));
    Ok(())
}

pub(crate) fn abs(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 1, loc, expr)?;
    let value = coerce_double_math(&stack.top_n(1)[0], loc, expr)?;
    stack.function_return(arity, Value::Double(value.abs()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn sum_over_scalars() {
        let mut stack = OperandStack::new();
        stack.push(Value::Uint64(1));
        stack.push(Value::Uint64(2));
        stack.push(Value::Uint64(3));
        sum(&mut stack, 3, loc(), "").unwrap();
        assert_eq!(stack.peek(0), Some(&Value::Double(6.0)));
    }

    #[test]
    fn avg_over_vector_divides_by_vector_length() {
        let mut stack = OperandStack::new();
        stack.push(Value::DoubleVector(vec![2.0, 4.0, 6.0]));
        avg(&mut stack, 1, loc(), "").unwrap();
        assert_eq!(stack.peek(0), Some(&Value::Double(4.0)));
    }

    #[test]
    fn empty_vector_is_a_domain_error() {
        let mut stack = OperandStack::new();
        stack.push(Value::DoubleVector(vec![]));
        let err = min(&mut stack, 1, loc(), "").unwrap_err();
        assert!(err.to_string().contains("empty vector argument"));
    }

    #[test]
    fn vector_with_extra_scalar_arguments_is_too_many() {
        let mut stack = OperandStack::new();
        stack.push(Value::DoubleVector(vec![1.0]));
        stack.push(Value::Uint64(2));
        let err = min(&mut stack, 2, loc(), "").unwrap_err();
        assert!(err.to_string().contains("too many arguments"));
    }

    #[test]
    fn abs_requires_exactly_one_argument() {
        let mut stack = OperandStack::new();
        stack.push(Value::Uint64(1));
        stack.push(Value::Uint64(2));
        let err = abs(&mut stack, 2, loc(), "").unwrap_err();
        assert!(err.to_string().contains("invalid number of arguments"));
    }
}
