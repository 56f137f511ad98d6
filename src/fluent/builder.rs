//! Fluent assertion builder for plain values.
//!
//! This module provides the core chain machinery and the entry point for
//! value assertions:
//! - `assert_that()` - Entry point for creating assertions from a value
//! - `assert_that!()` - Same, capturing the caller's expression text
//! - `Assertion` - Chainable conditions with `and()`/`or()` connectors
//!
//! Conditions accumulate lazily; nothing is evaluated until a terminal
//! method runs. `check()` returns `Result<T, AssertError>` (for use with a
//! multiple-assertion scope or `?`), `assert()` panics with the rendered
//! failure message.

use std::fmt;

use crate::capture::Subject;
use crate::condition::{caught_reason, Condition, ConditionOutcome, ConditionTree, Connector};
use crate::error::AssertError;
use crate::message::{preview, render_failure, ExpressionBuilder};
use crate::scope::AssertionScope;

/// Shared chain state behind every builder type: the lazy subject, the
/// condition tree, a pending connector, the rendered expression, and any
/// configuration error collected while building.
pub(crate) struct Chain<T> {
    pub(crate) subject: Subject<T>,
    pub(crate) tree: Option<ConditionTree<T>>,
    pub(crate) pending: Option<Connector>,
    pub(crate) expression: ExpressionBuilder,
    pub(crate) config_error: Option<AssertError>,
}

impl<T> Chain<T> {
    pub(crate) fn new(subject: Subject<T>, expression: ExpressionBuilder) -> Self {
        Self {
            subject,
            tree: None,
            pending: None,
            expression,
            config_error: None,
        }
    }

    pub(crate) fn push_call(&mut self, call: impl Into<String>) {
        self.expression.push(call);
    }

    pub(crate) fn append(&mut self, condition: Condition<T>) {
        self.tree = Some(ConditionTree::append(
            self.tree.take(),
            condition,
            self.pending.take(),
        ));
    }

    pub(crate) fn connector(&mut self, op: Connector) {
        self.push_call(match op {
            Connector::And => "and()",
            Connector::Or => "or()",
        });
        self.pending = Some(op);
    }

    /// Record a configuration error; the first one wins and is returned by
    /// the terminal instead of evaluating anything.
    pub(crate) fn invalid(&mut self, message: impl Into<String>) {
        if self.config_error.is_none() {
            self.config_error = Some(AssertError::Argument(message.into()));
        }
    }

    pub(crate) fn check(mut self) -> Result<T, AssertError> {
        if let Some(error) = self.config_error {
            return Err(error);
        }

        let captured = self.subject.resolve_owned();
        let outcome = match &self.tree {
            Some(tree) => tree.evaluate(&captured),
            None => match captured.error() {
                None => ConditionOutcome::pass("evaluate"),
                Some(_) => ConditionOutcome::fail("evaluate", caught_reason(captured.error())),
            },
        };

        if outcome.passed {
            match captured.into_value() {
                Some(value) => Ok(value),
                None => Err(AssertError::Argument(
                    "assertion passed but no value was captured".to_string(),
                )),
            }
        } else {
            Err(AssertError::failure(render_failure(
                self.expression.subject(),
                &outcome.expectation,
                &outcome.reason,
                &self.expression.call_site(),
            )))
        }
    }
}

/// Render a value for phrases and reasons.
pub(crate) fn shown(value: &impl fmt::Debug) -> String {
    preview(&format!("{value:?}"))
}

/// Create an assertion on a value.
///
/// This is the entry point for the fluent assertion API.
///
/// # Example
///
/// ```rust,ignore
/// use attest::assert_that;
///
/// assert_that(parse("42")).is_equal_to(42).assert();
///
/// let outcome = assert_that(items.len()).is_greater_than(0).check();
/// ```
pub fn assert_that<T>(value: T) -> Assertion<T> {
    Assertion {
        chain: Chain::new(
            Subject::of(value),
            ExpressionBuilder::new("assert_that", "value"),
        ),
        last_expected: None,
    }
}

/// Create an assertion on a value, capturing the source expression for
/// failure messages.
///
/// # Example
///
/// ```rust,ignore
/// attest::assert_that!(user.age).is_at_least(18).assert();
/// // failure text reads: Expected user.age to ...
/// ```
#[macro_export]
macro_rules! assert_that {
    ($subject:expr) => {
        $crate::fluent::assert_that($subject).named(stringify!($subject))
    };
}

/// Chainable assertion over a single value.
///
/// Condition methods accumulate; `and()`/`or()` join them left-associatively
/// (`a.and(b).or(c)` groups as `(a AND b) OR c`). Both sides of a connector
/// are always evaluated so the combined failure message can report every
/// expectation.
pub struct Assertion<T> {
    pub(crate) chain: Chain<T>,
    pub(crate) last_expected: Option<T>,
}

impl<T> Assertion<T> {
    /// Override the subject text used in failure messages. Cosmetic only.
    pub fn named(mut self, subject_expression: &str) -> Self {
        self.chain.expression.set_subject(subject_expression);
        self
    }

    /// Join the next condition with AND. Both conditions are always
    /// evaluated; the chain passes iff both pass.
    pub fn and(mut self) -> Self {
        self.chain.connector(Connector::And);
        self
    }

    /// Join the next condition with OR. Both conditions are always
    /// evaluated; the chain passes iff either passes.
    pub fn or(mut self) -> Self {
        self.chain.connector(Connector::Or);
        self
    }

    pub(crate) fn push(mut self, condition: Condition<T>, call: impl Into<String>) -> Self {
        self.last_expected = None;
        self.chain.push_call(call);
        self.chain.append(condition);
        self
    }

    /// Evaluate the chain. Returns the captured value on a pass, the
    /// rendered failure otherwise.
    pub fn check(self) -> Result<T, AssertError> {
        self.chain.check()
    }

    /// Evaluate the chain, panicking with the rendered failure message if a
    /// condition fails.
    ///
    /// # Panics
    ///
    /// Panics with the templated failure text.
    pub fn assert(self) -> T {
        match self.chain.check() {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    /// Evaluate the chain, recording a failure into `scope` instead of
    /// returning it. The captured value is passed through on a pass.
    pub fn check_in(self, scope: &mut AssertionScope) -> Option<T> {
        scope.check(self.chain.check())
    }
}

impl<T: PartialEq + fmt::Debug + Clone + 'static> Assertion<T> {
    /// Assert the value equals `expected`. Follow with `within()` for a
    /// tolerance-based comparison on numeric and time types.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_that(total).is_equal_to(100).assert();
    /// ```
    pub fn is_equal_to(self, expected: T) -> Self {
        let display = shown(&expected);
        let keep = expected.clone();
        let condition = Condition::on_value(
            format!("be equal to {display}"),
            move |actual: &T| *actual == expected,
            |actual| format!("found {}", shown(actual)),
        );
        let mut this = self.push(condition, format!("is_equal_to({display})"));
        this.last_expected = Some(keep);
        this
    }

    /// Assert the value does not equal `expected`.
    pub fn is_not_equal_to(self, expected: T) -> Self {
        let display = shown(&expected);
        let condition = Condition::on_value(
            format!("not be equal to {display}"),
            move |actual: &T| *actual != expected,
            |actual| format!("found {}", shown(actual)),
        );
        self.push(condition, format!("is_not_equal_to({display})"))
    }
}

impl<T: PartialOrd + fmt::Debug + 'static> Assertion<T> {
    pub fn is_greater_than(self, expected: T) -> Self {
        let display = shown(&expected);
        let condition = Condition::on_value(
            format!("be greater than {display}"),
            move |actual: &T| *actual > expected,
            |actual| format!("found {}", shown(actual)),
        );
        self.push(condition, format!("is_greater_than({display})"))
    }

    pub fn is_less_than(self, expected: T) -> Self {
        let display = shown(&expected);
        let condition = Condition::on_value(
            format!("be less than {display}"),
            move |actual: &T| *actual < expected,
            |actual| format!("found {}", shown(actual)),
        );
        self.push(condition, format!("is_less_than({display})"))
    }

    pub fn is_at_least(self, expected: T) -> Self {
        let display = shown(&expected);
        let condition = Condition::on_value(
            format!("be at least {display}"),
            move |actual: &T| *actual >= expected,
            |actual| format!("found {}", shown(actual)),
        );
        self.push(condition, format!("is_at_least({display})"))
    }

    pub fn is_at_most(self, expected: T) -> Self {
        let display = shown(&expected);
        let condition = Condition::on_value(
            format!("be at most {display}"),
            move |actual: &T| *actual <= expected,
            |actual| format!("found {}", shown(actual)),
        );
        self.push(condition, format!("is_at_most({display})"))
    }

    /// Assert the value lies in the inclusive range `[lower, upper]`.
    pub fn is_between(self, lower: T, upper: T) -> Self {
        let display = format!("{} and {}", shown(&lower), shown(&upper));
        let condition = Condition::on_value(
            format!("be between {display}"),
            move |actual: &T| *actual >= lower && *actual <= upper,
            |actual| format!("found {}", shown(actual)),
        );
        self.push(condition, format!("is_between({display})"))
    }
}

impl Assertion<bool> {
    pub fn is_true(self) -> Self {
        let condition = Condition::on_value(
            "be true",
            |actual: &bool| *actual,
            |_| "found false".to_string(),
        );
        self.push(condition, "is_true()")
    }

    pub fn is_false(self) -> Self {
        let condition = Condition::on_value(
            "be false",
            |actual: &bool| !*actual,
            |_| "found true".to_string(),
        );
        self.push(condition, "is_false()")
    }
}

impl<T: fmt::Debug + 'static> Assertion<Option<T>> {
    pub fn is_none(self) -> Self {
        let condition = Condition::on_value(
            "be None",
            |actual: &Option<T>| actual.is_none(),
            |actual| format!("found {}", shown(actual)),
        );
        self.push(condition, "is_none()")
    }

    pub fn is_some(self) -> Self {
        let condition = Condition::on_value(
            "be Some",
            |actual: &Option<T>| actual.is_some(),
            |_| "found None".to_string(),
        );
        self.push(condition, "is_some()")
    }
}

impl<T: fmt::Debug + 'static, E: fmt::Debug + 'static> Assertion<Result<T, E>> {
    pub fn is_ok(self) -> Self {
        let condition = Condition::on_value(
            "be Ok",
            |actual: &Result<T, E>| actual.is_ok(),
            |actual| format!("found {}", shown(actual)),
        );
        self.push(condition, "is_ok()")
    }

    pub fn is_err(self) -> Self {
        let condition = Condition::on_value(
            "be Err",
            |actual: &Result<T, E>| actual.is_err(),
            |actual| format!("found {}", shown(actual)),
        );
        self.push(condition, "is_err()")
    }
}

impl<T: fmt::Debug + 'static> Assertion<T> {
    /// Assert an arbitrary predicate. `description` completes the phrase
    /// "Expected X to satisfy ...".
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_that(port).satisfies("an ephemeral port", |p| *p >= 49152).assert();
    /// ```
    pub fn satisfies(self, description: &str, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        let condition = Condition::on_value(
            format!("satisfy {description}"),
            predicate,
            |actual| format!("found {}", shown(actual)),
        );
        self.push(condition, format!("satisfies({description:?})"))
    }

    /// Replace the most recent condition's failure reason with a custom
    /// message factory.
    pub fn with_message(mut self, message: impl Fn(&T) -> String + 'static) -> Self {
        if self.chain.tree.is_none() {
            self.chain
                .invalid("with_message() requires a preceding condition");
            return self;
        }
        if let Some(tree) = self.chain.tree.as_mut() {
            tree.last_mut().set_reason(move |captured| match captured.value() {
                Some(value) => message(value),
                None => caught_reason(captured.error()),
            });
        }
        self
    }
}
