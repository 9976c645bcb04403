//! The operand stack. Every operator and function handler interacts with it
//! through this small interface instead of raw index arithmetic: `peek`,
//! `pop`, `push`, and `function_return` for the clear-then-push pattern every
//! built-in uses to produce its result.

use crate::error::EvalError;
use crate::value::Value;

#[derive(Debug, Default)]
pub struct OperandStack {
    values: Vec<Value>,
}

impl OperandStack {
    pub fn new() -> Self {
        OperandStack { values: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Removes and returns the top value. Only ever fails on a stack
    /// invariant violation - every caller is expected to have checked
    /// `len()` against the token's declared arity first.
    pub fn pop(&mut self) -> Result<Value, EvalError> {
        self.values
            .pop()
            .ok_or_else(|| EvalError::structural_unlocated("operand stack underflow"))
    }

    /// Reads the value `offset` slots below the top (`offset == 0` is the
    /// top itself) without removing it.
    pub fn peek(&self, offset: usize) -> Option<&Value> {
        let len = self.values.len();
        if offset >= len {
            return None;
        }
        self.values.get(len - 1 - offset)
    }

    /// Returns the top `n` values in bottom-to-top order, without removing
    /// them. Used by functions to read their arguments before deciding how
    /// to produce a result.
    pub fn top_n(&self, n: usize) -> &[Value] {
        let len = self.values.len();
        &self.values[len - n..]
    }

    /// Clears the top `arity` slots and pushes `result` in their place. This
    /// is the only mechanism by which a function or operator produces its
    /// result; it keeps the net stack delta at `1 - arity` by construction.
    pub fn function_return(&mut self, arity: usize, result: Value) {
        let len = self.values.len();
        self.values.truncate(len - arity);
        self.values.push(result);
    }

    /// Replaces the top value in place, used by unary operators which have a
    /// net stack delta of zero.
    pub fn replace_top(&mut self, value: Value) {
        if let Some(slot) = self.values.last_mut() {
            *slot = value;
        } else {
            self.values.push(value);
        }
    }

    pub fn into_single_result(mut self) -> Result<Value, EvalError> {
        if self.values.len() != 1 {
            return Err(EvalError::structural_unlocated(
                "output stack after expression execution must contain one value",
            ));
        }
        Ok(self.values.pop().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_return_has_net_delta_one_minus_arity() {
        let mut stack = OperandStack::new();
        stack.push(Value::Uint64(1));
        stack.push(Value::Uint64(2));
        stack.push(Value::Uint64(3));
        stack.function_return(3, Value::Double(6.0));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.peek(0), Some(&Value::Double(6.0)));
    }

    #[test]
    fn into_single_result_rejects_anything_but_exactly_one() {
        let mut stack = OperandStack::new();
        stack.push(Value::Uint64(1));
        stack.push(Value::Uint64(2));
        assert!(stack.into_single_result().is_err());
    }
}
