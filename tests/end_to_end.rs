//! End-to-end scenarios driven through the public API rather than any one
//! module's internals.

use exprvm::{execute, execute_ext, BinaryOp, EvalContext, EvalRules, Span, Timestamp, Token, TokenKind, Value};

fn num(text: &str, start: usize, end: usize) -> Token {
    Token::new(TokenKind::VarNum, Span::new(start, end)).with_text(text)
}

#[test]
fn addition_of_two_literals() {
    let tokens = vec![num("2", 0, 1), num("3", 2, 3), Token::new(TokenKind::Binary(BinaryOp::Add), Span::new(4, 5))];
    let ctx = EvalContext::new("2 + 3", tokens);
    assert_eq!(execute(&ctx), Ok(Value::Double(5.0)));
}

#[test]
fn division_by_zero_is_reported() {
    let tokens = vec![num("1", 0, 1), num("0", 4, 5), Token::new(TokenKind::Binary(BinaryOp::Div), Span::new(2, 3))];
    let ctx = EvalContext::new("1 / 0", tokens);
    let err = execute(&ctx).unwrap_err();
    assert!(err.contains("division by zero"));
}

#[test]
fn left_of_a_quoted_string_literal() {
    let tokens = vec![
        Token::new(TokenKind::VarStr, Span::new(0, 5)).with_text("abc"),
        num("2", 6, 7),
        Token::new(TokenKind::Function { name: "left".to_string(), arity: 2 }, Span::new(9, 18)),
    ];
    let ctx = EvalContext::new("left(\"abc\",2)", tokens);
    assert_eq!(execute(&ctx), Ok(Value::String("ab".to_string())));
}

#[test]
fn suffix_promotion_feeds_into_math_function_coercion() {
    let tokens = vec![
        Token::new(TokenKind::VarStr, Span::new(0, 4)).with_text("1K"),
        Token::new(TokenKind::Function { name: "abs".to_string(), arity: 1 }, Span::new(5, 11)),
    ];
    let ctx = EvalContext::new("abs(1K)", tokens);
    assert_eq!(execute(&ctx), Ok(Value::Double(1024.0)));
}

#[test]
fn error_operand_wins_over_and_when_not_absorbed_by_short_circuit() {
    let tokens = vec![
        num("1", 0, 1),
        Token::new(TokenKind::VarMacro, Span::new(2, 10)).with_value(Value::Error("oops".to_string())),
        Token::new(TokenKind::Binary(BinaryOp::And), Span::new(11, 12)),
    ];
    let ctx = EvalContext::new("1 and {$M}", tokens).with_rules(EvalRules::PROCESS_ERROR);
    let err = execute(&ctx).unwrap_err();
    assert!(err.contains("oops"));
}

#[test]
fn error_operand_absorbed_by_and_short_circuit_on_false() {
    let tokens = vec![
        num("0", 0, 1),
        Token::new(TokenKind::VarMacro, Span::new(2, 10)).with_value(Value::Error("oops".to_string())),
        Token::new(TokenKind::Binary(BinaryOp::And), Span::new(11, 12)),
    ];
    let ctx = EvalContext::new("0 and {$M}", tokens).with_rules(EvalRules::PROCESS_ERROR);
    assert_eq!(execute(&ctx), Ok(Value::Double(0.0)));
}

#[test]
fn unrecognized_function_goes_through_the_callback_bridge() {
    let tokens = vec![Token::new(
        TokenKind::Function { name: "last_history_point".to_string(), arity: 0 },
        Span::new(0, 21),
    )];
    let common_cb: &exprvm::CallbackFn = &|name, _args, _ts| {
        assert_eq!(name, "last_history_point");
        Ok(Value::Double(99.5))
    };
    let history_cb: &exprvm::CallbackFn = &|_name, _args, _ts| panic!("common function must not reach history callback");

    let result = execute_ext(
        "last_history_point()",
        tokens,
        EvalRules::empty(),
        Timestamp::default(),
        common_cb,
        history_cb,
    );
    pretty_assertions::assert_eq!(result, Ok(Value::Double(99.5)));
}
