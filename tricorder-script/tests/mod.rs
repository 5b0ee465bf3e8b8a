use std::cell::RefCell;
use std::rc::Rc;

use tricorder_console::{
    ConsoleSession, EvalError, LogSink, ScriptEngine, Style, Value, WATCH_ERROR_SENTINEL,
};
use tricorder_script::Interp;

#[derive(Default)]
struct Recorder {
    records: RefCell<Vec<(String, Style)>>,
}

impl Recorder {
    fn lines(&self) -> Vec<(String, Style)> {
        self.records.borrow().clone()
    }
}

impl LogSink for Recorder {
    fn log(&self, text: &str, style: Style) {
        self.records.borrow_mut().push((text.to_string(), style));
    }
}

fn make_session() -> (ConsoleSession<Interp>, Rc<Recorder>) {
    let log = Rc::new(Recorder::default());
    let session = ConsoleSession::boot(log.clone(), Interp::boot);
    (session, log)
}

fn eval(session: &mut ConsoleSession<Interp>, line: &str) -> Result<Value, EvalError> {
    session.engine_mut().eval(line)
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_arithmetic_and_precedence() {
    let (mut s, _log) = make_session();
    assert_eq!(eval(&mut s, "1 + 2 * 3"), Ok(Value::Num(7.0)));
    assert_eq!(eval(&mut s, "(1 + 2) * 3"), Ok(Value::Num(9.0)));
    assert_eq!(eval(&mut s, "10 / 4"), Ok(Value::Num(2.5)));
    assert_eq!(eval(&mut s, "10 % 4"), Ok(Value::Num(2.0)));
    assert_eq!(eval(&mut s, "-3 + 5"), Ok(Value::Num(2.0)));
}

#[test]
fn test_string_literals_and_concat() {
    let (mut s, _log) = make_session();
    assert_eq!(
        eval(&mut s, r#""foo" + "bar""#),
        Ok(Value::Str("foobar".to_string()))
    );
    assert_eq!(
        eval(&mut s, r#""a\"b\n""#),
        Ok(Value::Str("a\"b\n".to_string()))
    );
}

#[test]
fn test_comparisons() {
    let (mut s, _log) = make_session();
    assert_eq!(eval(&mut s, "1 < 2"), Ok(Value::Bool(true)));
    assert_eq!(eval(&mut s, "2 <= 1"), Ok(Value::Bool(false)));
    assert_eq!(eval(&mut s, r#""a" < "b""#), Ok(Value::Bool(true)));
    assert_eq!(eval(&mut s, "1 == 1"), Ok(Value::Bool(true)));
    assert_eq!(eval(&mut s, r#"1 != "1""#), Ok(Value::Bool(true)));
}

#[test]
fn test_type_errors_carry_both_kinds() {
    let (mut s, _log) = make_session();
    let Err(EvalError::Failed(msg)) = eval(&mut s, r#"1 + "x""#) else {
        panic!("expected failure");
    };
    assert_eq!(msg, "cannot add number and string");

    let Err(EvalError::Failed(msg)) = eval(&mut s, r#"1 < "x""#) else {
        panic!("expected failure");
    };
    assert_eq!(msg, "cannot compare number and string");
}

#[test]
fn test_variables_and_assignment() {
    let (mut s, _log) = make_session();
    assert_eq!(eval(&mut s, "x = 4"), Err(EvalError::NoValue));
    assert_eq!(eval(&mut s, "x * x"), Ok(Value::Num(16.0)));
    assert_eq!(eval(&mut s, "x = x + 1"), Err(EvalError::NoValue));
    assert_eq!(eval(&mut s, "x"), Ok(Value::Num(5.0)));
}

#[test]
fn test_unknown_variable_and_function() {
    let (mut s, _log) = make_session();
    assert_eq!(
        eval(&mut s, "ghost"),
        Err(EvalError::Failed("unknown variable 'ghost'".to_string()))
    );
    assert_eq!(
        eval(&mut s, "ghost()"),
        Err(EvalError::Failed("unknown function 'ghost'".to_string()))
    );
}

#[test]
fn test_parse_errors_are_failures() {
    let (mut s, _log) = make_session();
    assert!(matches!(
        eval(&mut s, "1 +"),
        Err(EvalError::Failed(_))
    ));
    assert!(matches!(
        eval(&mut s, "1 & 2"),
        Err(EvalError::Failed(_))
    ));
}

#[test]
fn test_blank_line_is_benign() {
    let (mut s, _log) = make_session();
    assert_eq!(eval(&mut s, ""), Err(EvalError::NoValue));
    assert_eq!(eval(&mut s, "   "), Err(EvalError::NoValue));
}

#[test]
fn test_prelude_constants_installed() {
    let (mut s, _log) = make_session();
    assert_eq!(
        eval(&mut s, "pi"),
        Ok(Value::Num(std::f64::consts::PI))
    );
    assert_eq!(
        eval(&mut s, "tau / 2"),
        Ok(Value::Num(std::f64::consts::PI))
    );
}

#[test]
fn test_boot_diagnostics_never_reach_the_user() {
    let (_s, log) = make_session();
    assert!(log.lines().is_empty());
}

// ============================================================================
// Console bindings
// ============================================================================

#[test]
fn test_log_builtin_emits_one_normal_record() {
    let (mut s, log) = make_session();
    assert_eq!(
        eval(&mut s, r#"log(1 + 1, "two", nil)"#),
        Err(EvalError::NoValue)
    );
    assert_eq!(
        log.lines(),
        [("2 \"two\" null".to_string(), Style::Normal)]
    );
}

#[test]
fn test_watch_reevaluates_against_live_environment() {
    let (mut s, _log) = make_session();
    eval(&mut s, "x = 1").unwrap_err();
    assert_eq!(
        eval(&mut s, r#"watch("doubled", x * 2)"#),
        Err(EvalError::NoValue)
    );

    let watches = s.watches();
    assert_eq!(watches.borrow_mut().render_frame()[0].text, "2");

    eval(&mut s, "x = 5").unwrap_err();
    assert_eq!(watches.borrow_mut().render_frame()[0].text, "10");
}

#[test]
fn test_watch_on_missing_variable_shows_sentinel() {
    let (mut s, _log) = make_session();
    eval(&mut s, r#"watch("broken", missing + 1)"#).unwrap_err();
    let frame = s.watches().borrow_mut().render_frame();
    assert_eq!(frame[0].name, "broken");
    assert_eq!(frame[0].text, WATCH_ERROR_SENTINEL);
}

#[test]
fn test_duplicate_watch_is_an_evaluation_error() {
    let (mut s, _log) = make_session();
    eval(&mut s, r#"watch("x", 1)"#).unwrap_err();
    assert_eq!(
        eval(&mut s, r#"watch("x", 2)"#),
        Err(EvalError::Failed("watch 'x' already exists".to_string()))
    );
    assert_eq!(s.watches().borrow().len(), 1);
}

#[test]
fn test_unwatch_removes_and_reports_misses() {
    let (mut s, _log) = make_session();
    eval(&mut s, r#"watch("x", 1)"#).unwrap_err();
    assert_eq!(eval(&mut s, r#"unwatch("x")"#), Err(EvalError::NoValue));
    assert!(s.watches().borrow().is_empty());
    assert_eq!(
        eval(&mut s, r#"unwatch("x")"#),
        Err(EvalError::Failed("no watch named 'x'".to_string()))
    );
}

#[test]
fn test_watch_name_must_be_a_string() {
    let (mut s, _log) = make_session();
    assert_eq!(
        eval(&mut s, "watch(1, 2)"),
        Err(EvalError::Failed(
            "watch expects a string name, got number".to_string()
        ))
    );
}

#[test]
fn test_watch_registration_inside_a_watch_faults_that_watch_only() {
    let (mut s, _log) = make_session();
    eval(&mut s, r#"watch("ok", 1)"#).unwrap_err();
    eval(&mut s, r#"watch("sneaky", watch("inner", 2))"#).unwrap_err();

    let frame = s.watches().borrow_mut().render_frame();
    assert_eq!(frame.len(), 2);
    assert_eq!(frame[0].text, "1");
    assert_eq!(frame[1].text, WATCH_ERROR_SENTINEL);
}

// ============================================================================
// Native functions
// ============================================================================

#[test]
fn test_registered_native_is_callable() {
    let (mut s, _log) = make_session();
    s.engine_mut()
        .register_native("answer", Rc::new(|_args| Ok(Value::Num(42.0))));
    assert_eq!(eval(&mut s, "answer()"), Ok(Value::Num(42.0)));
    assert_eq!(eval(&mut s, "answer() + 1"), Ok(Value::Num(43.0)));
}

#[test]
fn test_native_receives_evaluated_arguments() {
    let (mut s, _log) = make_session();
    s.engine_mut().register_native(
        "sum",
        Rc::new(|args| {
            let mut total = 0.0;
            for arg in args {
                match arg {
                    Value::Num(n) => total += n,
                    other => {
                        return Err(EvalError::Failed(format!(
                            "sum expects numbers, got {other:?}"
                        )))
                    }
                }
            }
            Ok(Value::Num(total))
        }),
    );
    assert_eq!(eval(&mut s, "sum(1, 2, 3 * 2)"), Ok(Value::Num(9.0)));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_are_suffixes_over_scope_names() {
    let (mut s, _log) = make_session();
    eval(&mut s, "foo = 1").unwrap_err();
    eval(&mut s, "foobar = 2").unwrap_err();

    let answer = s.engine_mut().completions("1 + fo").unwrap();
    assert_eq!(answer.token_prefix, "fo");
    assert_eq!(answer.candidates, ["o", "obar"]);
}

#[test]
fn test_completions_include_builtins_and_natives() {
    let (mut s, _log) = make_session();
    s.engine_mut()
        .register_native("walk", Rc::new(|_| Ok(Value::Nil)));

    let answer = s.engine_mut().completions("wa").unwrap();
    assert_eq!(answer.candidates, ["lk", "tch"]);
}

#[test]
fn test_no_trailing_token_means_no_completions() {
    let (mut s, _log) = make_session();
    assert!(s.engine_mut().completions("1 + ").is_none());
    assert!(s.engine_mut().completions("").is_none());
}

#[test]
fn test_unmatched_token_returns_empty_candidates() {
    let (mut s, _log) = make_session();
    let answer = s.engine_mut().completions("zzz").unwrap();
    assert!(answer.candidates.is_empty());
}

// ============================================================================
// Through the session
// ============================================================================

#[test]
fn test_session_prints_result_after_echo() {
    let (mut s, log) = make_session();
    s.handle_line("6 * 7");
    assert_eq!(
        log.lines(),
        [
            ("6 * 7".to_string(), Style::Echo),
            ("42".to_string(), Style::Normal),
        ]
    );
}

#[test]
fn test_session_suppresses_assignment_output() {
    let (mut s, log) = make_session();
    s.handle_line("x = 1");
    assert_eq!(log.lines(), [("x = 1".to_string(), Style::Echo)]);
}

#[test]
fn test_session_shows_failure_message() {
    let (mut s, log) = make_session();
    s.handle_line("nope");
    assert_eq!(
        log.lines()[1],
        ("unknown variable 'nope'".to_string(), Style::Error)
    );
}
