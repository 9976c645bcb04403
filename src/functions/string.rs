//! String built-ins: length/bytelength/bitlength/char/ascii, left/right/mid,
//! concat/insert/replace/repeat, and the trim family.

use super::{
    coerce_str_generic, coerce_str_positional, coerce_uint_generic, require_arity,
    require_arity_range, MAX_STRING_LEN,
};
use crate::error::EvalError;
use crate::stack::OperandStack;
use crate::token::Span;
use crate::value::{convert, Target, Value};

const DEFAULT_WHITESPACE: &str = " \t\r\n";

fn highest_nonzero_byte(n: u64) -> u64 {
    for i in (1..=8u32).rev() {
        let shift = (i - 1) * 8;
        if (n >> shift) & 0xFF != 0 {
            return i as u64;
        }
    }
    0
}

fn highest_set_bit_plus_one(n: u64) -> u64 {
    if n == 0 {
        0
    } else {
        64 - n.leading_zeros() as u64
    }
}

pub(crate) fn length(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 1, loc, expr)?;
    let s = coerce_str_positional(&stack.top_n(1)[0], 1, loc, expr)?;
    stack.function_return(arity, Value::Double(s.chars().count() as f64));
    Ok(())
}

pub(crate) fn bytelength(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 1, loc, expr)?;
    let arg = &stack.top_n(1)[0];
    let result = if let Some(Value::Uint64(n)) = convert(arg, Target::Uint64) {
        highest_nonzero_byte(n) as f64
    } else if convert(arg, Target::Double).is_some() {
        std::mem::size_of::<f64>() as f64
    } else {
        let s = coerce_str_generic(arg, loc, expr)?;
        s.len() as f64
    };
    stack.function_return(arity, Value::Double(result));
    Ok(())
}

pub(crate) fn bitlength(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 1, loc, expr)?;
    let arg = &stack.top_n(1)[0];
    let result = if let Some(Value::Uint64(n)) = convert(arg, Target::Uint64) {
        highest_set_bit_plus_one(n) as f64
    } else if convert(arg, Target::Double).is_some() {
        (std::mem::size_of::<f64>() * 8) as f64
    } else {
        let s = coerce_str_generic(arg, loc, expr)?;
        (s.len() * 8) as f64
    };
    stack.function_return(arity, Value::Double(result));
    Ok(())
}

/// `char(n)`: returns a string holding one Unicode scalar value equal to `n`.
/// For `n <= 127` this matches the reference implementation's single raw
/// byte exactly. For `n in 128..=255` the reference writes one raw
/// non-UTF-8 byte; `Value::String` here is always valid UTF-8 (see
/// `value.rs`), so the same codepoint instead encodes to two UTF-8 bytes -
/// e.g. `bytelength(char(200))` is `2` here against `1` in the reference.
/// A deliberate divergence forced by the UTF-8 invariant, not a bug;
/// documented further in `DESIGN.md`.
pub(crate) fn char_fn(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 1, loc, expr)?;
    let arg = &stack.top_n(1)[0];
    let code = match convert(arg, Target::Uint64) {
        Some(Value::Uint64(n)) if n <= 255 => n,
        _ => return Err(EvalError::coercion("invalid function argument", loc.quote(expr))),
    };
    let ch = code as u8 as char;
    stack.function_return(arity, Value::String(ch.to_string()));
    Ok(())
}

pub(crate) fn ascii(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 1, loc, expr)?;
    let s = coerce_str_generic(&stack.top_n(1)[0], loc, expr)?;
    let first = s
        .chars()
        .next()
        .ok_or_else(|| EvalError::domain("function argument must not be empty", loc.quote(expr)))?;
    stack.function_return(arity, Value::Uint64(first as u64 & 0xFF));
    Ok(())
}

pub(crate) fn left(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 2, loc, expr)?;
    let args = stack.top_n(2);
    let s = coerce_str_positional(&args[0], 1, loc, expr)?;
    let n = coerce_uint_generic(&args[1], loc, expr)?;
    let result: String = s.chars().take(n as usize).collect();
    stack.function_return(arity, Value::String(result));
    Ok(())
}

pub(crate) fn right(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 2, loc, expr)?;
    let args = stack.top_n(2);
    let s = coerce_str_positional(&args[0], 1, loc, expr)?;
    let n = coerce_uint_generic(&args[1], loc, expr)?;
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as u64;
    let result: String = if n < len {
        chars[(len - n) as usize..].iter().collect()
    } else {
        s
    };
    stack.function_return(arity, Value::String(result));
    Ok(())
}

/// `mid(s, start, n)`. Deliberately mirrors a reference-implementation
/// truncation quirk: the bound check compares the character length against
/// `start + n` rather than `start - 1 + n`, so the returned slice can run one
/// character longer than `n` when it reaches the end of `s`.
pub(crate) fn mid(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 3, loc, expr)?;
    let args = stack.top_n(3);
    let s = coerce_str_positional(&args[0], 1, loc, expr)?;
    let start = coerce_uint_generic(&args[1], loc, expr)?;
    let chars: Vec<char> = s.chars().collect();
    let char_len = chars.len() as u64;
    if start == 0 || start > char_len {
        return Err(EvalError::coercion("invalid function second argument", loc.quote(expr)));
    }
    let n = coerce_uint_generic(&args[2], loc, expr)?;

    let begin = (start - 1) as usize;
    let remaining = chars.len() - begin;
    // `start + n` can overflow for an adversarially large `n`; treat an
    // overflowing sum the same as "not less than char_len" (the else
    // branch below), since no finite char_len could ever exceed it anyway.
    let take = match start.checked_add(n) {
        Some(end) if char_len > end => n as usize,
        _ => remaining,
    };
    let result: String = chars[begin..begin + take].iter().collect();
    stack.function_return(arity, Value::String(result));
    Ok(())
}

pub(crate) fn concat(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 2, loc, expr)?;
    let args = stack.top_n(2);
    let a = coerce_str_positional(&args[0], 1, loc, expr)?;
    let b = coerce_str_positional(&args[1], 2, loc, expr)?;
    stack.function_return(arity, Value::String(a + &b));
    Ok(())
}

pub(crate) fn insert(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 4, loc, expr)?;
    let args = stack.top_n(4);
    let s = coerce_str_positional(&args[0], 1, loc, expr)?;
    let start = coerce_uint_generic(&args[1], loc, expr)?;
    let n = coerce_uint_generic(&args[2], loc, expr)?;
    let replacement = coerce_str_positional(&args[3], 4, loc, expr)?;

    let bytes = s.as_bytes();
    let begin = (start.saturating_sub(1) as usize).min(bytes.len());
    let remove = (n as usize).min(bytes.len() - begin);

    let mut out = Vec::with_capacity(bytes.len() - remove + replacement.len());
    out.extend_from_slice(&bytes[..begin]);
    out.extend_from_slice(replacement.as_bytes());
    out.extend_from_slice(&bytes[begin + remove..]);

    stack.function_return(arity, Value::String(String::from_utf8_lossy(&out).into_owned()));
    Ok(())
}

pub(crate) fn replace(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 3, loc, expr)?;
    let args = stack.top_n(3);
    let s = coerce_str_positional(&args[0], 1, loc, expr)?;
    let pattern = coerce_str_positional(&args[1], 2, loc, expr)?;
    let replacement = coerce_str_positional(&args[2], 3, loc, expr)?;

    let result = if pattern.is_empty() {
        s
    } else {
        s.replace(&pattern, &replacement)
    };
    stack.function_return(arity, Value::String(result));
    Ok(())
}

pub(crate) fn repeat(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    require_arity(arity, 2, loc, expr)?;
    let args = stack.top_n(2);
    let s = coerce_str_positional(&args[0], 1, loc, expr)?;
    let n = coerce_uint_generic(&args[1], loc, expr)?;

    let total = (n as u128) * (s.len() as u128);
    if total >= MAX_STRING_LEN as u128 {
        return Err(EvalError::domain(
            format!("maximum allowed string length ({MAX_STRING_LEN}) exceeded: {total}"),
            loc.quote(expr),
        ));
    }

    stack.function_return(arity, Value::String(s.repeat(n as usize)));
    Ok(())
}

fn trim_chars(stack: &OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(String, String), EvalError> {
    require_arity_range(arity, 1, 2, loc, expr)?;
    let args = stack.top_n(arity);
    let s = coerce_str_positional(&args[0], 1, loc, expr)?;
    let chars = if arity == 2 {
        coerce_str_positional(&args[1], 2, loc, expr)?
    } else {
        DEFAULT_WHITESPACE.to_string()
    };
    Ok((s, chars))
}

pub(crate) fn trim(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    let (s, chars) = trim_chars(stack, arity, loc, expr)?;
    let result = s.trim_matches(|c| chars.contains(c)).to_string();
    stack.function_return(arity, Value::String(result));
    Ok(())
}

pub(crate) fn ltrim(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    let (s, chars) = trim_chars(stack, arity, loc, expr)?;
    let result = s.trim_start_matches(|c| chars.contains(c)).to_string();
    stack.function_return(arity, Value::String(result));
    Ok(())
}

pub(crate) fn rtrim(stack: &mut OperandStack, arity: usize, loc: Span, expr: &str) -> Result<(), EvalError> {
    let (s, chars) = trim_chars(stack, arity, loc, expr)?;
    let result = s.trim_end_matches(|c| chars.contains(c)).to_string();
    stack.function_return(arity, Value::String(result));
    Ok(())
}
