//! Unary and binary operator handlers. Each is a pure function over
//! [`OperandStack`]: it checks arity, applies the error-propagation and
//! coercion rules, and leaves the stack with a net delta matching the
//! operator's own arity (0 for unary, -1 for binary).

use crate::error::EvalError;
use crate::stack::OperandStack;
use crate::suffix::fuzzy_zero;
use crate::token::{BinaryOp, Span, UnaryOp};
use crate::value::{compare, convert, Target, Value};

pub fn eval_unary(
    op: UnaryOp,
    stack: &mut OperandStack,
    loc: Span,
    expression: &str,
) -> Result<(), EvalError> {
    if stack.is_empty() {
        return Err(EvalError::arity(
            "unary operator requires one operand",
            loc.quote(expression),
        ));
    }

    let top = stack.peek(0).unwrap().clone();
    if top.is_error() {
        // The error is already on top; leave it exactly where it is.
        return Ok(());
    }

    let operand = convert(&top, Target::Double).ok_or_else(|| {
        EvalError::coercion(
            "unary operator operand is not a numeric value",
            loc.quote(expression),
        )
    })?;
    let x = match operand {
        Value::Double(d) => d,
        _ => unreachable!("convert(_, Target::Double) only ever returns Value::Double"),
    };

    let result = match op {
        UnaryOp::Minus => -x,
        UnaryOp::Not => {
            if fuzzy_zero(x) {
                1.0
            } else {
                0.0
            }
        }
    };
    stack.replace_top(Value::Double(result));
    Ok(())
}

/// Attempts the AND/OR error short-circuit: the non-error side determines
/// the result on its own if it is decisive, otherwise the error wins.
/// Returns `None` when the error should win instead.
fn logic_short_circuit(op: BinaryOp, other: &Value) -> Option<f64> {
    let other_double = convert(other, Target::Double)?;
    let x = match other_double {
        Value::Double(d) => d,
        _ => unreachable!(),
    };
    match op {
        BinaryOp::And if fuzzy_zero(x) => Some(0.0),
        BinaryOp::Or if !fuzzy_zero(x) => Some(1.0),
        _ => None,
    }
}

pub fn eval_binary(
    op: BinaryOp,
    stack: &mut OperandStack,
    loc: Span,
    expression: &str,
) -> Result<(), EvalError> {
    if stack.len() < 2 {
        return Err(EvalError::arity(
            "binary operator requires two operands",
            loc.quote(expression),
        ));
    }

    let right = stack.pop()?;
    let left = stack.pop()?;

    if left.is_error() || right.is_error() {
        let (error_side, other_side) = if left.is_error() { (&left, &right) } else { (&right, &left) };

        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            if let Some(result) = logic_short_circuit(op, other_side) {
                stack.push(Value::Double(result));
                return Ok(());
            }
        }

        stack.push(error_side.clone());
        return Ok(());
    }

    if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
        let equal = compare(&left, &right) == std::cmp::Ordering::Equal;
        let is_eq = matches!(op, BinaryOp::Eq);
        stack.push(Value::Double(if equal == is_eq { 1.0 } else { 0.0 }));
        return Ok(());
    }

    let left_double = convert(&left, Target::Double).ok_or_else(|| {
        EvalError::coercion(
            "left operand is not a numeric value for operator",
            loc.quote(expression),
        )
    })?;
    let right_double = convert(&right, Target::Double).ok_or_else(|| {
        EvalError::coercion(
            "right operand is not a numeric value for operator",
            loc.quote(expression),
        )
    })?;
    let (l, r) = match (left_double, right_double) {
        (Value::Double(l), Value::Double(r)) => (l, r),
        _ => unreachable!(),
    };

    let result = match op {
        BinaryOp::Lt => bool_to_f64(l < r),
        BinaryOp::Le => bool_to_f64(l <= r),
        BinaryOp::Gt => bool_to_f64(l > r),
        BinaryOp::Ge => bool_to_f64(l >= r),
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => {
            if fuzzy_zero(r) {
                return Err(EvalError::domain("division by zero", loc.quote(expression)));
            }
            l / r
        }
        BinaryOp::And => bool_to_f64(!fuzzy_zero(l) && !fuzzy_zero(r)),
        BinaryOp::Or => bool_to_f64(!fuzzy_zero(l) || !fuzzy_zero(r)),
        BinaryOp::Eq | BinaryOp::Ne => unreachable!("handled above"),
    };

    stack.push(Value::Double(result));
    Ok(())
}

fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn unary_minus_negates() {
        let mut stack = OperandStack::new();
        stack.push(Value::Uint64(5));
        eval_unary(UnaryOp::Minus, &mut stack, loc(), "").unwrap();
        assert_eq!(stack.peek(0), Some(&Value::Double(-5.0)));
    }

    #[test]
    fn unary_not_is_fuzzy() {
        let mut stack = OperandStack::new();
        stack.push(Value::Double(0.0));
        eval_unary(UnaryOp::Not, &mut stack, loc(), "").unwrap();
        assert_eq!(stack.peek(0), Some(&Value::Double(1.0)));
    }

    #[test]
    fn unary_on_error_is_a_no_op() {
        let mut stack = OperandStack::new();
        stack.push(Value::Error("boom".to_string()));
        eval_unary(UnaryOp::Minus, &mut stack, loc(), "").unwrap();
        assert_eq!(stack.peek(0), Some(&Value::Error("boom".to_string())));
    }

    #[test]
    fn binary_add() {
        let mut stack = OperandStack::new();
        stack.push(Value::Uint64(2));
        stack.push(Value::Uint64(3));
        eval_binary(BinaryOp::Add, &mut stack, loc(), "").unwrap();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.peek(0), Some(&Value::Double(5.0)));
    }

    #[test]
    fn binary_div_by_fuzzy_zero_fails() {
        let mut stack = OperandStack::new();
        stack.push(Value::Uint64(1));
        stack.push(Value::Double(0.0));
        let err = eval_binary(BinaryOp::Div, &mut stack, loc(), "").unwrap_err();
        assert!(err.to_string().contains("division by zero"));
    }

    #[test]
    fn and_short_circuits_on_fuzzy_zero_operand_over_error() {
        let mut stack = OperandStack::new();
        stack.push(Value::Double(0.0));
        stack.push(Value::Error("oops".to_string()));
        eval_binary(BinaryOp::And, &mut stack, loc(), "").unwrap();
        assert_eq!(stack.peek(0), Some(&Value::Double(0.0)));
    }

    #[test]
    fn and_lets_error_win_when_not_decisive() {
        let mut stack = OperandStack::new();
        stack.push(Value::Double(1.0));
        stack.push(Value::Error("oops".to_string()));
        eval_binary(BinaryOp::And, &mut stack, loc(), "").unwrap();
        assert_eq!(stack.peek(0), Some(&Value::Error("oops".to_string())));
    }

    #[test]
    fn eq_is_suffix_aware_without_double_coercion() {
        let mut stack = OperandStack::new();
        stack.push(Value::String("2K".to_string()));
        stack.push(Value::Double(2048.0));
        eval_binary(BinaryOp::Eq, &mut stack, loc(), "").unwrap();
        assert_eq!(stack.peek(0), Some(&Value::Double(1.0)));
    }
}
