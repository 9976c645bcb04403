//! The single-pass dispatcher. [`execute`] walks an [`EvalContext`]'s token
//! stream exactly once, routing each token to the value-push handlers,
//! [`operators`], [`functions::call_builtin`], or the [`callback`] bridge,
//! then enforces the one-value-left stack invariant and formats the
//! top-level error message.

use crate::callback;
use crate::context::{CallbackFn, EvalContext, EvalRules, Timestamp};
use crate::error::{format_top_level, EvalError};
use crate::functions;
use crate::operators;
use crate::stack::OperandStack;
use crate::suffix;
use crate::token::{Span, Token, TokenKind};
use crate::value::{convert, Target, Value};

/// Runs the token stream to completion and returns the formatted top-level
/// message on failure, matching the reference runtime's public entrypoint.
pub fn execute(ctx: &EvalContext) -> Result<Value, String> {
    run(ctx).map_err(|err| format_top_level(&err))
}

/// Same as [`execute`], but returns the structured [`EvalError`] instead of
/// the formatted string, for callers that want to match on [`crate::error::EvalErrorKind`].
pub fn try_execute(ctx: &EvalContext) -> Result<Value, EvalError> {
    run(ctx)
}

/// Convenience entrypoint for callers who want to supply everything in one
/// call instead of going through [`EvalContext`]'s builder directly:
/// expression text, tokens, mode flags, a timestamp, and the two function
/// callbacks.
pub fn execute_ext<'ctx>(
    expression: &'ctx str,
    tokens: Vec<Token>,
    rules: EvalRules,
    ts: Timestamp,
    common_func_cb: &'ctx CallbackFn<'ctx>,
    history_func_cb: &'ctx CallbackFn<'ctx>,
) -> Result<Value, String> {
    let ctx = EvalContext::new(expression, tokens)
        .with_rules(rules)
        .with_timestamp(ts)
        .with_callbacks(common_func_cb, history_func_cb);
    execute(&ctx)
}

fn run(ctx: &EvalContext) -> Result<Value, EvalError> {
    let mut stack = OperandStack::new();
    let expr = ctx.expression;
    let process_error = ctx.process_error();

    for token in &ctx.tokens {
        log::trace!("dispatch token at {}..{}", token.loc.start, token.loc.end);
        match &token.kind {
            TokenKind::Unary(op) => operators::eval_unary(*op, &mut stack, token.loc, expr)?,
            TokenKind::Binary(op) => operators::eval_binary(*op, &mut stack, token.loc, expr)?,
            TokenKind::VarNum => push_var_num(&mut stack, token, expr)?,
            TokenKind::VarStr => push_var_str(&mut stack, token),
            TokenKind::VarMacro | TokenKind::ArgQuery | TokenKind::ArgPeriod => {
                push_bound_value(&mut stack, token, process_error)?
            }
            TokenKind::VarUserMacro => push_user_macro(&mut stack, token, process_error)?,
            TokenKind::ArgNull => stack.push(Value::None),
            TokenKind::FunctionId => push_function_id(&mut stack, token, process_error)?,
            TokenKind::Exception => return eval_exception(&mut stack, token.loc, expr),
            TokenKind::Function { name, arity } => {
                dispatch_function(&mut stack, name, *arity, token.loc, expr, ctx, false)?
            }
            TokenKind::HistFunction { name, arity } => {
                dispatch_function(&mut stack, name, *arity, token.loc, expr, ctx, true)?
            }
            TokenKind::Nop => {}
        }
    }

    let result = stack.into_single_result()?;
    match result {
        Value::Error(msg) => Err(EvalError::Propagated(msg)),
        Value::DoubleVector(_) => Err(EvalError::structural_unlocated(
            "output stack after expression execution must contain one value",
        )),
        other => Ok(other),
    }
}

fn push_var_num(stack: &mut OperandStack, token: &Token, expr: &str) -> Result<(), EvalError> {
    let text = token.text.as_deref().unwrap_or("");
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = text.parse::<u64>() {
            stack.push(Value::Uint64(n));
            return Ok(());
        }
    }
    match suffix::parse_suffixed_double(text) {
        Some(d) => {
            stack.push(Value::Double(d));
            Ok(())
        }
        None => Err(EvalError::coercion(
            "numeric literal could not be parsed",
            token.loc.quote(expr),
        )),
    }
}

/// Drops the `\` prefix of every escape and pushes the resulting string.
fn push_var_str(stack: &mut OperandStack, token: &Token) {
    let text = token.text.as_deref().unwrap_or("");
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    stack.push(Value::String(out));
}

fn push_bound_value(stack: &mut OperandStack, token: &Token, process_error: bool) -> Result<(), EvalError> {
    let value = token.value.clone().unwrap_or(Value::None);
    match value {
        Value::Error(msg) if !process_error => Err(EvalError::Propagated(msg)),
        other => {
            stack.push(other);
            Ok(())
        }
    }
}

/// Like [`push_bound_value`], but a bound `String` first gets a chance at
/// suffix-number promotion before falling back to the plain string.
fn push_user_macro(stack: &mut OperandStack, token: &Token, process_error: bool) -> Result<(), EvalError> {
    let value = token.value.clone().unwrap_or(Value::None);
    match value {
        Value::Error(msg) if !process_error => Err(EvalError::Propagated(msg)),
        Value::String(s) => {
            match suffix::parse_suffixed_double(&s) {
                Some(d) => stack.push(Value::Double(d)),
                None => stack.push(Value::String(s)),
            }
            Ok(())
        }
        other => {
            stack.push(other);
            Ok(())
        }
    }
}

fn push_function_id(stack: &mut OperandStack, token: &Token, process_error: bool) -> Result<(), EvalError> {
    match &token.value {
        Some(Value::Error(msg)) if !process_error => Err(EvalError::Propagated(msg.clone())),
        Some(value) => {
            stack.push(value.clone());
            Ok(())
        }
        None => Err(EvalError::structural_unlocated(
            "trigger history functions must be pre-calculated",
        )),
    }
}

fn eval_exception(stack: &mut OperandStack, loc: Span, expr: &str) -> Result<Value, EvalError> {
    if stack.is_empty() {
        return Err(EvalError::structural_unlocated("exception must have one argument"));
    }
    let top = stack.pop()?;
    let message = match &top {
        Value::Error(msg) => msg.clone(),
        other => match convert(other, Target::String) {
            Some(Value::String(s)) => s,
            _ => {
                return Err(EvalError::coercion(
                    "exception argument is not a string value",
                    loc.quote(expr),
                ))
            }
        },
    };
    Err(EvalError::Propagated(message))
}

fn dispatch_function(
    stack: &mut OperandStack,
    name: &str,
    arity: usize,
    loc: Span,
    expr: &str,
    ctx: &EvalContext,
    is_history: bool,
) -> Result<(), EvalError> {
    if !is_history {
        if let Some(result) = functions::call_builtin(name, arity, stack, loc, expr, ctx.ts) {
            return result;
        }
    }

    if arity > stack.len() {
        return Err(EvalError::arity("not enough arguments for function", loc.quote(expr)));
    }

    let cb = if is_history { ctx.history_func_cb } else { ctx.common_func_cb };
    match cb {
        Some(cb) => {
            log::debug!("invoking callback for function \"{name}\"");
            callback::invoke(cb, name, stack, arity, loc, expr, ctx.ts, ctx.process_error())
        }
        None => Err(callback::unknown_function(loc, expr)),
    }
}
