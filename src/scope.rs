//! Multiple-assertion scopes.
//!
//! An [`AssertionScope`] collects assertion failures so a test can report
//! every failure in a block instead of stopping at the first one. The scope
//! is an explicit value: assertions evaluate to `Result`s and the caller
//! feeds failures in via [`check`](AssertionScope::check) or
//! [`record`](AssertionScope::record). Nothing is stored in thread-local or
//! task-local state, so concurrently running test bodies cannot observe each
//! other's scopes, and a chain that suspends across an `await` keeps
//! reporting to the scope value it holds.
//!
//! Panics and other non-assertion errors are never absorbed: the scope only
//! sees [`AssertError`] values handed to it.
//!
//! # Example
//!
//! ```rust,ignore
//! use attest::{assert_that, AssertionScope};
//!
//! let mut scope = AssertionScope::new();
//! assert_that(1).is_equal_to(2).check_in(&mut scope);
//! assert_that("a").is_equal_to("b").check_in(&mut scope);
//! scope.finish()?; // aggregate of both failures
//! ```

use crate::error::AssertError;

#[derive(Default)]
struct Frame {
    failures: Vec<AssertError>,
}

/// Collects assertion failures raised inside a multiple-assertion block.
///
/// Frames form a stack: [`enter`](Self::enter) opens a nested frame and
/// [`exit`](Self::exit) merges it into its parent, so nested blocks flatten
/// into the outermost scope. [`finish`](Self::finish) consumes the scope and
/// resolves the root frame.
#[derive(Default)]
pub struct AssertionScope {
    frames: Vec<Frame>,
}

impl AssertionScope {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Open a nested frame. Failures recorded until the matching
    /// [`exit`](Self::exit) belong to that frame.
    pub fn enter(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Close the innermost nested frame, appending its failures to the
    /// parent frame.
    ///
    /// # Panics
    ///
    /// Panics if no nested frame is open. The root frame is closed by
    /// [`finish`](Self::finish), not `exit`; an unbalanced `exit` is a
    /// programming error in the test.
    pub fn exit(&mut self) {
        if self.frames.len() < 2 {
            panic!("AssertionScope::exit called with no nested frame open");
        }
        let frame = match self.frames.pop() {
            Some(frame) => frame,
            None => unreachable!(),
        };
        match self.frames.last_mut() {
            Some(parent) => parent.failures.extend(frame.failures),
            None => unreachable!(),
        }
    }

    /// Append a failure to the innermost open frame, preserving order.
    /// Aggregates are flattened so nesting always resolves to one flat list.
    pub fn record(&mut self, error: AssertError) {
        let frame = match self.frames.last_mut() {
            Some(frame) => frame,
            None => unreachable!("scope frames are never empty"),
        };
        match error {
            AssertError::Aggregate { failures } => frame.failures.extend(failures),
            other => frame.failures.push(other),
        }
    }

    /// Collect the failure from a checked assertion, passing a successful
    /// value through.
    pub fn check<T>(&mut self, outcome: Result<T, AssertError>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(error) => {
                self.record(error);
                None
            }
        }
    }

    /// Number of failures currently collected across all open frames.
    pub fn failure_count(&self) -> usize {
        self.frames.iter().map(|f| f.failures.len()).sum()
    }

    /// Resolve the scope: no failures is silent, a single failure is
    /// returned unchanged, two or more become an aggregate in declaration
    /// order. Unclosed nested frames are merged down first.
    ///
    /// Consuming `self` makes a double close a compile error.
    pub fn finish(mut self) -> Result<(), AssertError> {
        while self.frames.len() > 1 {
            self.exit();
        }
        let mut failures = match self.frames.pop() {
            Some(frame) => frame.failures,
            None => unreachable!("scope frames are never empty"),
        };
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(AssertError::Aggregate { failures }),
        }
    }
}

/// Run a closure against a fresh scope and resolve it.
///
/// # Example
///
/// ```rust,ignore
/// use attest::{assert_that, multiple};
///
/// multiple(|scope| {
///     for (actual, expected) in [(1, 2), (2, 3)] {
///         assert_that(actual).is_equal_to(expected).check_in(scope);
///     }
/// })?;
/// ```
pub fn multiple(body: impl FnOnce(&mut AssertionScope)) -> Result<(), AssertError> {
    let mut scope = AssertionScope::new();
    body(&mut scope);
    scope.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::fail;

    #[test]
    fn test_empty_scope_is_silent() {
        assert!(AssertionScope::new().finish().is_ok());
    }

    #[test]
    fn test_single_failure_returned_unchanged() {
        let mut scope = AssertionScope::new();
        scope.record(fail("only failure"));
        match scope.finish() {
            Err(AssertError::Failure { message }) => assert_eq!(message, "only failure"),
            other => panic!("expected the single failure back, got {other:?}"),
        }
    }

    #[test]
    fn test_multiple_failures_aggregate_in_order() {
        let mut scope = AssertionScope::new();
        scope.record(fail("first"));
        scope.record(fail("second"));
        scope.record(fail("third"));
        match scope.finish() {
            Err(AssertError::Aggregate { failures }) => {
                let messages: Vec<String> = failures.iter().map(|f| f.to_string()).collect();
                assert_eq!(messages, vec!["first", "second", "third"]);
            }
            other => panic!("expected an aggregate, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_frames_flatten_into_root() {
        let mut scope = AssertionScope::new();
        scope.record(fail("outer"));
        scope.enter();
        scope.record(fail("middle"));
        scope.enter();
        scope.record(fail("inner"));
        scope.exit();
        scope.exit();
        match scope.finish() {
            Err(AssertError::Aggregate { failures }) => {
                assert_eq!(failures.len(), 3);
                assert_eq!(failures[0].to_string(), "outer");
                assert_eq!(failures[2].to_string(), "inner");
            }
            other => panic!("expected a flat aggregate, got {other:?}"),
        }
    }

    #[test]
    fn test_recorded_aggregate_is_flattened() {
        let mut inner = AssertionScope::new();
        inner.record(fail("a"));
        inner.record(fail("b"));
        let inner_error = inner.finish().unwrap_err();

        let mut outer = AssertionScope::new();
        outer.record(fail("before"));
        outer.record(inner_error);
        match outer.finish() {
            Err(AssertError::Aggregate { failures }) => assert_eq!(failures.len(), 3),
            other => panic!("expected a flat aggregate, got {other:?}"),
        }
    }

    #[test]
    fn test_check_passes_values_through() {
        let mut scope = AssertionScope::new();
        assert_eq!(scope.check(Ok(5)), Some(5));
        assert_eq!(scope.check::<i32>(Err(fail("nope"))), None);
        assert_eq!(scope.failure_count(), 1);
    }

    #[test]
    #[should_panic(expected = "no nested frame open")]
    fn test_unbalanced_exit_panics() {
        AssertionScope::new().exit();
    }

    #[test]
    fn test_multiple_helper() {
        let result = multiple(|scope| {
            scope.record(fail("x"));
            scope.record(fail("y"));
        });
        assert_eq!(result.unwrap_err().failure_count(), 2);
    }
}
