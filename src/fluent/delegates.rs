//! Fluent assertion builders for delegates and futures.
//!
//! Routes callable subjects to the capture layer:
//! - `assert_that_fn()` - a zero-argument sync closure
//! - `assert_that_async()` - a zero-argument async closure
//! - `assert_that_future()` - an already-running future
//!
//! Panics thrown by the delegate are captured, never propagated; the
//! `panics()`/`does_not_panic()` family asserts on them, and
//! `succeeds()`/`fails()` unwrap `Result`-returning delegates. Awaiting the
//! user's future inside the capture layer is the only suspension point.

use std::fmt;
use std::future::Future;

use super::builder::{Assertion, Chain};
use crate::capture::{AsyncSubject, CapturedResult, Caught, CaughtKind, Subject};
use crate::condition::{caught_reason, Condition};
use crate::message::ExpressionBuilder;

/// Create an assertion on a zero-argument closure.
///
/// The closure runs lazily, at most once, when the chain is evaluated.
///
/// # Example
///
/// ```rust,ignore
/// use attest::assert_that_fn;
///
/// assert_that_fn(|| risky_parse("x")).panics().contains("invalid").assert();
/// assert_that_fn(|| 2 + 2).returns().is_equal_to(4).assert();
/// ```
pub fn assert_that_fn<R: 'static>(delegate: impl FnOnce() -> R + 'static) -> DelegateAssertion<R> {
    DelegateAssertion {
        chain: Chain::new(
            Subject::from_fn(delegate),
            ExpressionBuilder::new("assert_that_fn", "the delegate"),
        ),
    }
}

/// Builder for assertions on a sync delegate's outcome.
pub struct DelegateAssertion<R> {
    chain: Chain<R>,
}

impl<R: 'static> DelegateAssertion<R> {
    /// Override the subject text used in failure messages. Cosmetic only.
    pub fn named(mut self, subject_expression: &str) -> Self {
        self.chain.expression.set_subject(subject_expression);
        self
    }

    /// Continue with value conditions on the delegate's return value. A
    /// delegate that panics fails whatever condition reads the value.
    pub fn returns(mut self) -> Assertion<R> {
        self.chain.push_call("returns()");
        Assertion {
            chain: self.chain,
            last_expected: None,
        }
    }

    /// Assert the delegate completes without panicking, then continue with
    /// value conditions on its return value.
    pub fn does_not_panic(mut self) -> Assertion<R> {
        self.chain.push_call("does_not_panic()");
        let condition = Condition::raw(
            "complete without panicking",
            |captured: &CapturedResult<R>| match captured.error() {
                None => Ok(()),
                Some(caught) => Err(caught.to_string()),
            },
        );
        self.chain.append(condition);
        Assertion {
            chain: self.chain,
            last_expected: None,
        }
    }

    /// Assert the delegate panics, then continue with string conditions on
    /// the panic message.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_that_fn(|| divide(1, 0)).panics().contains("zero").assert();
    /// ```
    pub fn panics(mut self) -> Assertion<String> {
        self.chain.push_call("panics()");
        panic_message_assertion(self.chain)
    }
}

impl<T: 'static, E: fmt::Debug + 'static> DelegateAssertion<Result<T, E>> {
    /// Assert a `Result`-returning delegate succeeds, then continue with
    /// value conditions on the `Ok` value.
    pub fn succeeds(mut self) -> Assertion<T> {
        self.chain.push_call("succeeds()");
        let Chain {
            subject,
            pending,
            expression,
            config_error,
            ..
        } = self.chain;

        let subject = subject.derive(|outcome| match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(Caught::error(format!(
                "the delegate returned an error: {error:?}"
            ))),
            Err(caught) => Err(caught),
        });

        let mut chain = Chain {
            subject,
            tree: None,
            pending,
            expression,
            config_error,
        };
        chain.append(Condition::raw(
            "succeed",
            |captured: &CapturedResult<T>| match captured.value() {
                Some(_) => Ok(()),
                None => Err(caught_reason(captured.error())),
            },
        ));
        Assertion {
            chain,
            last_expected: None,
        }
    }
}

impl<T: fmt::Debug + 'static, E: 'static> DelegateAssertion<Result<T, E>> {
    /// Assert a `Result`-returning delegate fails, then continue with value
    /// conditions on the error.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_that_fn(|| open_config("missing"))
    ///     .fails()
    ///     .satisfies("a not-found error", |e| e.is_not_found())
    ///     .assert();
    /// ```
    pub fn fails(mut self) -> Assertion<E> {
        self.chain.push_call("fails()");
        let Chain {
            subject,
            pending,
            expression,
            config_error,
            ..
        } = self.chain;

        let subject = subject.derive(|outcome| match outcome {
            Ok(Err(error)) => Ok(error),
            Ok(Ok(value)) => Err(Caught::error(format!(
                "the delegate succeeded with {value:?}"
            ))),
            Err(caught) => Err(caught),
        });

        let mut chain = Chain {
            subject,
            tree: None,
            pending,
            expression,
            config_error,
        };
        chain.append(Condition::raw(
            "return an error",
            |captured: &CapturedResult<E>| match captured.value() {
                Some(_) => Ok(()),
                None => Err(caught_reason(captured.error())),
            },
        ));
        Assertion {
            chain,
            last_expected: None,
        }
    }
}

/// Derive a chain over the panic message and seed it with the baseline
/// "panic happened" condition.
fn panic_message_assertion<R: 'static>(chain: Chain<R>) -> Assertion<String> {
    let Chain {
        subject,
        pending,
        expression,
        config_error,
        ..
    } = chain;

    let subject = subject.derive(|outcome| match outcome {
        Err(caught) if caught.kind() == CaughtKind::Panic => Ok(caught.message().to_string()),
        Err(other) => Err(other),
        Ok(_) => Err(Caught::error("the delegate completed without panicking")),
    });

    let mut chain = Chain {
        subject,
        tree: None,
        pending,
        expression,
        config_error,
    };
    chain.append(Condition::raw(
        "panic",
        |captured: &CapturedResult<String>| match captured.value() {
            Some(_) => Ok(()),
            None => Err(caught_reason(captured.error())),
        },
    ));
    Assertion {
        chain,
        last_expected: None,
    }
}

/// Create an assertion on a zero-argument async closure.
///
/// # Example
///
/// ```rust,ignore
/// use attest::assert_that_async;
///
/// assert_that_async(|| fetch_count())
///     .awaited()
///     .await
///     .is_equal_to(3)
///     .check()?;
/// ```
pub fn assert_that_async<R, F, Fut>(delegate: F) -> AsyncAssertion<R>
where
    R: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    AsyncAssertion {
        subject: AsyncSubject::from_fn(delegate),
        expression: ExpressionBuilder::new("assert_that_async", "the delegate"),
    }
}

/// Create an assertion on an already-running future.
pub fn assert_that_future<R: Send + 'static>(
    future: impl Future<Output = R> + Send + 'static,
) -> AsyncAssertion<R> {
    AsyncAssertion {
        subject: AsyncSubject::from_future(future),
        expression: ExpressionBuilder::new("assert_that_future", "the future"),
    }
}

/// Builder for assertions on an async delegate's outcome. `awaited()`
/// captures the outcome once and hands the chain to the sync vocabulary.
pub struct AsyncAssertion<R> {
    subject: AsyncSubject<R>,
    expression: ExpressionBuilder,
}

impl<R: Send + 'static> AsyncAssertion<R> {
    /// Override the subject text used in failure messages. Cosmetic only.
    pub fn named(mut self, subject_expression: &str) -> Self {
        self.expression.set_subject(subject_expression);
        self
    }

    /// Await the delegate exactly once and continue with value conditions
    /// on the captured outcome.
    pub async fn awaited(mut self) -> Assertion<R> {
        self.expression.push("awaited()");
        let captured = self.subject.resolve_owned().await;
        Assertion {
            chain: Chain::new(Subject::from_captured(captured), self.expression),
            last_expected: None,
        }
    }

    /// Assert the future panics, then continue with string conditions on
    /// the panic message.
    pub async fn panics(mut self) -> Assertion<String> {
        self.expression.push("panics()");
        let captured = self.subject.resolve_owned().await;
        panic_message_assertion(Chain::new(Subject::from_captured(captured), self.expression))
    }
}
