//! The context an evaluation runs against: the source text and token stream,
//! evaluation-mode flags, a timestamp for time functions, and optional
//! callbacks for functions this crate does not implement itself.
//!
//! Built through [`EvalContext::new`] plus a handful of `with_*` setters
//! rather than public field construction, so future optional fields don't
//! need a breaking change.

use bitflags::bitflags;

use crate::token::Token;
use crate::value::Value;

bitflags! {
    /// Evaluation-mode flags. Only [`EvalRules::PROCESS_ERROR`] is consulted
    /// today; the type accepts more bits without a breaking change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EvalRules: u8 {
        /// When set, a `Value::Error` reaching an operator or function is
        /// carried as a first-class operand instead of aborting evaluation
        /// immediately.
        const PROCESS_ERROR = 0b0000_0001;
    }
}

/// Wall-clock timestamp used by time functions and passed through to
/// callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp {
    pub sec: i64,
    pub nsec: i64,
}

/// A host-provided function callback. Replaces the reference runtime's
/// `(data_cb, fn_ptr)` pair with ordinary closure capture - there is no
/// separate opaque-pointer parameter because a Rust closure already owns
/// whatever state it needs.
pub type CallbackFn<'ctx> = dyn Fn(&str, &[Value], &Timestamp) -> Result<Value, String> + 'ctx;

pub struct EvalContext<'ctx> {
    pub(crate) expression: &'ctx str,
    pub(crate) tokens: Vec<Token>,
    pub(crate) rules: EvalRules,
    pub(crate) ts: Timestamp,
    pub(crate) common_func_cb: Option<&'ctx CallbackFn<'ctx>>,
    pub(crate) history_func_cb: Option<&'ctx CallbackFn<'ctx>>,
}

impl<'ctx> EvalContext<'ctx> {
    pub fn new(expression: &'ctx str, tokens: Vec<Token>) -> Self {
        EvalContext {
            expression,
            tokens,
            rules: EvalRules::empty(),
            ts: Timestamp::default(),
            common_func_cb: None,
            history_func_cb: None,
        }
    }

    pub fn with_rules(mut self, rules: EvalRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_timestamp(mut self, ts: Timestamp) -> Self {
        self.ts = ts;
        self
    }

    pub fn with_callbacks(
        mut self,
        common_func_cb: &'ctx CallbackFn<'ctx>,
        history_func_cb: &'ctx CallbackFn<'ctx>,
    ) -> Self {
        self.common_func_cb = Some(common_func_cb);
        self.history_func_cb = Some(history_func_cb);
        self
    }

    pub fn process_error(&self) -> bool {
        self.rules.contains(EvalRules::PROCESS_ERROR)
    }
}
