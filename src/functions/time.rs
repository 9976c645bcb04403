//! Time built-ins: `date`, `time`, `now`, `dayofweek`, `dayofmonth`. All are
//! arity zero and read `ctx.ts` broken down into local time.

use chrono::{Datelike, Local, TimeZone, Timelike};

use super::require_arity;
use crate::context::Timestamp;
use crate::error::EvalError;
use crate::stack::OperandStack;
use crate::token::Span;
use crate::value::Value;

fn local_time(ts: Timestamp, loc: Span, expr: &str) -> Result<chrono::DateTime<Local>, EvalError> {
    Local.timestamp_opt(ts.sec, 0).single().ok_or_else(|| {
        EvalError::os(
            format!("cannot convert time for function: timestamp {} is out of range", ts.sec),
            loc.quote(expr),
        )
    })
}

pub(crate) fn date(
    stack: &mut OperandStack,
    arity: usize,
    loc: Span,
    expr: &str,
    ts: Timestamp,
) -> Result<(), EvalError> {
    require_arity(arity, 0, loc, expr)?;
    let dt = local_time(ts, loc, expr)?;
    let result = format!("{:04}{:02}{:02}", dt.year(), dt.month(), dt.day());
    stack.function_return(arity, Value::String(result));
    Ok(())
}

pub(crate) fn time_of_day(
    stack: &mut OperandStack,
    arity: usize,
    loc: Span,
    expr: &str,
    ts: Timestamp,
) -> Result<(), EvalError> {
    require_arity(arity, 0, loc, expr)?;
    let dt = local_time(ts, loc, expr)?;
    let result = format!("{:02}{:02}{:02}", dt.hour(), dt.minute(), dt.second());
    stack.function_return(arity, Value::String(result));
    Ok(())
}

pub(crate) fn now(
    stack: &mut OperandStack,
    arity: usize,
    loc: Span,
    expr: &str,
    ts: Timestamp,
) -> Result<(), EvalError> {
    require_arity(arity, 0, loc, expr)?;
    stack.function_return(arity, Value::String(ts.sec.to_string()));
    Ok(())
}

pub(crate) fn dayofweek(
    stack: &mut OperandStack,
    arity: usize,
    loc: Span,
    expr: &str,
    ts: Timestamp,
) -> Result<(), EvalError> {
    require_arity(arity, 0, loc, expr)?;
    let dt = local_time(ts, loc, expr)?;
    // Monday=1 .. Sunday=7.
    let result = dt.weekday().number_from_monday().to_string();
    stack.function_return(arity, Value::String(result));
    Ok(())
}

pub(crate) fn dayofmonth(
    stack: &mut OperandStack,
    arity: usize,
    loc: Span,
    expr: &str,
    ts: Timestamp,
) -> Result<(), EvalError> {
    require_arity(arity, 0, loc, expr)?;
    let dt = local_time(ts, loc, expr)?;
    stack.function_return(arity, Value::String(dt.day().to_string()));
    Ok(())
}
