//! Manual smoke-test harness for the evaluator. Not part of the crate's
//! public API.
//!
//! Takes the expression text (for error-message quoting only) as the first
//! argument, followed by one postfix token descriptor per remaining
//! argument:
//!
//!   num:<text>            VAR_NUM
//!   str:<text>            VAR_STR
//!   null                  ARG_NULL
//!   op:<add|sub|mul|div|lt|le|gt|ge|eq|ne|and|or>   binary operator
//!   unary:<minus|not>     unary operator
//!   fn:<name>:<arity>     common function
//!   histfn:<name>:<arity> history function
//!
//! This is a fixture-feeding harness, not an infix expression parser - that
//! remains out of scope for this crate.

use std::env;
use std::process::ExitCode;

use exprvm::{execute, BinaryOp, EvalContext, Span, Token, TokenKind, UnaryOp};

fn parse_token(index: usize, descriptor: &str) -> Result<Token, String> {
    let loc = Span::new(index, index + 1);
    let mut parts = descriptor.splitn(3, ':');
    let kind = parts.next().unwrap_or("");

    match kind {
        "num" => {
            let text = parts.next().ok_or("num: missing literal text")?;
            Ok(Token::new(TokenKind::VarNum, loc).with_text(text))
        }
        "str" => {
            let text = parts.next().ok_or("str: missing literal text")?;
            Ok(Token::new(TokenKind::VarStr, loc).with_text(text))
        }
        "null" => Ok(Token::new(TokenKind::ArgNull, loc)),
        "op" => {
            let name = parts.next().ok_or("op: missing operator name")?;
            let op = match name {
                "add" => BinaryOp::Add,
                "sub" => BinaryOp::Sub,
                "mul" => BinaryOp::Mul,
                "div" => BinaryOp::Div,
                "lt" => BinaryOp::Lt,
                "le" => BinaryOp::Le,
                "gt" => BinaryOp::Gt,
                "ge" => BinaryOp::Ge,
                "eq" => BinaryOp::Eq,
                "ne" => BinaryOp::Ne,
                "and" => BinaryOp::And,
                "or" => BinaryOp::Or,
                other => return Err(format!("unknown binary operator \"{other}\"")),
            };
            Ok(Token::new(TokenKind::Binary(op), loc))
        }
        "unary" => {
            let name = parts.next().ok_or("unary: missing operator name")?;
            let op = match name {
                "minus" => UnaryOp::Minus,
                "not" => UnaryOp::Not,
                other => return Err(format!("unknown unary operator \"{other}\"")),
            };
            Ok(Token::new(TokenKind::Unary(op), loc))
        }
        "fn" | "histfn" => {
            let name = parts.next().ok_or("fn: missing function name")?.to_string();
            let arity: usize = parts
                .next()
                .ok_or("fn: missing arity")?
                .parse()
                .map_err(|_| "fn: arity is not a number".to_string())?;
            let token_kind = if kind == "fn" {
                TokenKind::Function { name, arity }
            } else {
                TokenKind::HistFunction { name, arity }
            };
            Ok(Token::new(token_kind, loc))
        }
        other => Err(format!("unrecognized token descriptor \"{other}\"")),
    }
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let Some(expression) = args.next() else {
        eprintln!("usage: eval <expression-text> <token>...");
        return ExitCode::FAILURE;
    };

    let mut tokens = Vec::new();
    for (index, descriptor) in args.enumerate() {
        match parse_token(index, &descriptor) {
            Ok(token) => tokens.push(token),
            Err(message) => {
                eprintln!("token {index}: {message}");
                return ExitCode::FAILURE;
            }
        }
    }

    let ctx = EvalContext::new(&expression, tokens);
    match execute(&ctx) {
        Ok(value) => {
            println!("{value:?}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
