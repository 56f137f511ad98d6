//! Tests for the fluent assertion API.

use super::*;
use crate::error::AssertError;
use crate::scope::{multiple, AssertionScope};

#[test]
fn test_is_equal_to_passes_and_returns_value() {
    let value = assert_that(5).is_equal_to(5).assert();
    assert_eq!(value, 5);
}

#[test]
fn test_is_equal_to_failure_message() {
    let error = assert_that(1).is_equal_to(2).check().unwrap_err();
    assert_eq!(
        error.to_string(),
        "Expected value to be equal to 2\nbut found 1\n\nat assert_that(value).is_equal_to(2)"
    );
}

#[test]
#[should_panic(expected = "Expected value to be equal to 2")]
fn test_assert_panics_on_failure() {
    assert_that(1).is_equal_to(2).assert();
}

#[test]
fn test_named_subject_appears_in_message() {
    let error = assert_that(1)
        .named("user.age")
        .is_equal_to(2)
        .check()
        .unwrap_err();
    assert!(error.to_string().starts_with("Expected user.age to"));
    assert!(error
        .to_string()
        .contains("at assert_that(user.age).is_equal_to(2)"));
}

#[test]
fn test_assert_that_macro_captures_expression() {
    let total = 1;
    let error = crate::assert_that!(total + 1).is_equal_to(3).check().unwrap_err();
    assert!(error.to_string().starts_with("Expected total + 1 to"));
}

#[test]
fn test_and_reports_both_expectations_once() {
    let error = assert_that(1)
        .is_equal_to(2)
        .and()
        .is_equal_to(3)
        .check()
        .unwrap_err();
    let message = error.to_string();
    assert!(message.contains("be equal to 2 and be equal to 3"));
    // The single actual value is reported once.
    assert_eq!(message.matches("found 1").count(), 1);
}

#[test]
fn test_or_passes_if_either_side_passes() {
    assert_that(1).is_equal_to(2).or().is_equal_to(1).assert();
    assert_that(1).is_equal_to(1).or().is_equal_to(2).assert();
}

#[test]
fn test_or_failure_joins_with_or() {
    let error = assert_that(1)
        .is_equal_to(2)
        .or()
        .is_equal_to(3)
        .check()
        .unwrap_err();
    assert!(error
        .to_string()
        .contains("be equal to 2 or be equal to 3"));
}

#[test]
fn test_left_associative_connectors() {
    // (1 == 2 AND 1 == 3) OR 1 == 1 passes.
    assert_that(1)
        .is_equal_to(2)
        .and()
        .is_equal_to(3)
        .or()
        .is_equal_to(1)
        .assert();
}

#[test]
fn test_ordering_vocabulary() {
    assert_that(7).is_greater_than(3).and().is_at_most(7).assert();
    assert_that(7).is_between(5, 10).assert();
    assert!(assert_that(7).is_less_than(3).check().is_err());
}

#[test]
fn test_bool_and_option_vocabulary() {
    assert_that(true).is_true().assert();
    assert_that(Some(3)).is_some().assert();

    let none: Option<i32> = None;
    assert_that(none).is_none().assert();

    let error = assert_that(Some(3)).is_none().check().unwrap_err();
    assert!(error.to_string().contains("found Some(3)"));
}

#[test]
fn test_result_vocabulary() {
    let ok: Result<i32, String> = Ok(1);
    let err: Result<i32, String> = Err("nope".to_string());
    assert_that(ok).is_ok().assert();
    assert_that(err).is_err().assert();
}

#[test]
fn test_string_vocabulary() {
    assert_that("hello world")
        .contains("world")
        .and()
        .starts_with("hello")
        .and()
        .ends_with("world")
        .assert();

    assert_that("hello".to_string()).has_length(5).assert();

    let error = assert_that("all good")
        .contains("error")
        .check()
        .unwrap_err();
    assert!(error.to_string().contains("to contain \"error\""));
}

#[test]
fn test_string_matches_regex() {
    assert_that("Success: 42 items")
        .matches(r"Success: \d+ items")
        .assert();
    assert_that("all good").does_not_match(r"error|fail").assert();
}

#[test]
fn test_invalid_regex_is_an_argument_error() {
    let outcome = assert_that("x").matches("[unclosed").check();
    match outcome {
        Err(AssertError::Argument(message)) => assert!(message.contains("invalid regex")),
        other => panic!("expected an argument error, got {other:?}"),
    }
}

#[test]
fn test_satisfies_custom_predicate() {
    assert_that(8).satisfies("a power of two", |n| n & (n - 1) == 0).assert();

    let error = assert_that(6)
        .satisfies("a power of two", |n| n & (n - 1) == 0)
        .check()
        .unwrap_err();
    assert!(error.to_string().contains("satisfy a power of two"));
}

#[test]
fn test_with_message_overrides_reason() {
    let error = assert_that(1)
        .is_equal_to(2)
        .with_message(|actual| format!("counter was stuck at {actual}"))
        .check()
        .unwrap_err();
    assert!(error.to_string().contains("but counter was stuck at 1"));
}

#[test]
fn test_within_tolerance_on_floats() {
    assert_that(9.79_f64).is_equal_to(9.81).within(0.05).assert();
    assert!(assert_that(9.0_f64)
        .is_equal_to(9.81)
        .within(0.05)
        .check()
        .is_err());
}

#[test]
fn test_within_tolerance_on_durations() {
    use std::time::Duration;

    assert_that(Duration::from_millis(1010))
        .is_equal_to(Duration::from_millis(1000))
        .within(Duration::from_millis(20))
        .assert();
}

#[test]
fn test_within_without_equal_is_an_argument_error() {
    let outcome = assert_that(1.0_f64).within(0.5).check();
    assert!(matches!(outcome, Err(AssertError::Argument(_))));
}

#[test]
fn test_sequence_vocabulary() {
    assert_that_seq(vec![1, 2, 3])
        .has_count(3)
        .and()
        .contains(2)
        .and()
        .is_in_order()
        .assert();

    assert_that_seq([1, 2, 3]).does_not_contain(9).assert();

    let empty: Vec<i32> = Vec::new();
    assert_that_seq(empty).is_empty().assert();
}

#[test]
fn test_sequence_failure_message() {
    let error = assert_that_seq(vec![1, 2])
        .has_count(3)
        .check()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Expected value to have 3 items\nbut found 2 items\n\nat assert_that_seq(value).has_count(3)"
    );
}

#[test]
fn test_each_satisfies() {
    assert_that_seq(vec![2, 4, 6])
        .each_satisfies("an even number", |n| n % 2 == 0)
        .assert();
}

#[test]
fn test_delegate_returns_value_conditions() {
    assert_that_fn(|| 2 + 2).returns().is_equal_to(4).assert();
}

#[test]
fn test_delegate_invoked_exactly_once_across_conditions() {
    use std::cell::Cell;
    use std::rc::Rc;

    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    assert_that_fn(move || {
        counter.set(counter.get() + 1);
        10
    })
    .returns()
    .is_greater_than(5)
    .and()
    .is_less_than(20)
    .assert();

    assert_eq!(calls.get(), 1);
}

#[test]
fn test_delegate_panics_vocabulary() {
    assert_that_fn(|| -> i32 { panic!("boom: invalid state") })
        .panics()
        .contains("invalid state")
        .assert();
}

#[test]
fn test_delegate_panics_fails_when_it_completes() {
    let error = assert_that_fn(|| 1).panics().check().unwrap_err();
    assert!(error
        .to_string()
        .contains("but the delegate completed without panicking"));
}

#[test]
fn test_delegate_does_not_panic() {
    assert_that_fn(|| 3).does_not_panic().is_equal_to(3).assert();

    let error = assert_that_fn(|| -> i32 { panic!("oops") })
        .does_not_panic()
        .check()
        .unwrap_err();
    assert!(error.to_string().contains("it panicked with \"oops\""));
}

#[test]
fn test_delegate_succeeds_and_fails() {
    let parse = |input: &'static str| move || input.parse::<i32>();

    assert_that_fn(parse("42")).succeeds().is_equal_to(42).assert();
    assert_that_fn(parse("x")).fails().assert();

    let error = assert_that_fn(parse("x"))
        .succeeds()
        .check()
        .unwrap_err();
    assert!(error.to_string().contains("returned an error"));
}

#[test]
fn test_check_in_collects_into_scope() {
    let mut scope = AssertionScope::new();
    assert_that(1).is_equal_to(2).check_in(&mut scope);
    assert_that(2).is_equal_to(2).check_in(&mut scope);
    assert_that(3).is_equal_to(4).check_in(&mut scope);

    let error = scope.finish().unwrap_err();
    assert_eq!(error.failure_count(), 2);
}

#[test]
fn test_multiple_renders_messages_in_order() {
    let error = multiple(|scope| {
        for (actual, expected) in (1..=5).zip(2..=6) {
            assert_that(actual).is_equal_to(expected).check_in(scope);
        }
    })
    .unwrap_err();

    assert_eq!(error.failure_count(), 5);
    let text = error.to_string();
    let first = text.find("be equal to 2").expect("first failure present");
    let last = text.find("be equal to 6").expect("last failure present");
    assert!(first < last);
    // Messages are separated by a blank line, with no wrapping header.
    assert!(text.starts_with("Expected value to be equal to 2"));
    assert!(text.contains("\n\nExpected value to be equal to 3"));
}
