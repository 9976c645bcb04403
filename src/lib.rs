//! A stack-based evaluator for pre-parsed postfix monitoring expressions.
//!
//! The crate does not parse expression text itself - it consumes a token
//! stream an upstream parser already produced (see [`token`]) and reduces it
//! to a single [`value::Value`] by walking the stream once with [`driver::execute`].
//! Along the way it applies the coercion rules in [`value`], the operator
//! semantics in [`operators`], the built-in function library under
//! [`functions`], and - for names it doesn't recognize - the host callback
//! bridge in [`callback`].

mod callback;
mod context;
mod driver;
mod error;
mod functions;
mod operators;
mod stack;
mod suffix;
mod token;
mod value;

pub use context::{CallbackFn, EvalContext, EvalRules, Timestamp};
pub use driver::{execute, execute_ext, try_execute};
pub use error::{EvalError, EvalErrorKind};
pub use token::{BinaryOp, Span, Token, TokenKind, UnaryOp};
pub use value::{compare, convert, Target, Value};
