//! Error types produced by failing assertions.
//!
//! Only two places surface these as hard failures: the terminal methods of a
//! builder chain (`check`/`assert`) and [`AssertionScope::finish`] at the root
//! of a multiple-assertion block. Everything upstream reports outcomes as
//! values.
//!
//! [`AssertionScope::finish`]: crate::scope::AssertionScope::finish

/// Error raised by a failed or misconfigured assertion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssertError {
    /// A single condition did not hold. The message is the fully rendered
    /// failure text, including the call-site line.
    #[error("{message}")]
    Failure { message: String },

    /// Two or more failures collected by a multiple-assertion scope,
    /// in declaration order.
    #[error("{}", aggregate_text(.failures))]
    Aggregate { failures: Vec<AssertError> },

    /// The assertion itself was configured incorrectly, e.g. an invalid
    /// regex pattern or `within()` with no expected value to refine.
    #[error("invalid assertion: {0}")]
    Argument(String),
}

impl AssertError {
    pub(crate) fn failure(message: impl Into<String>) -> Self {
        AssertError::Failure {
            message: message.into(),
        }
    }

    /// Number of individual failures this error represents.
    pub fn failure_count(&self) -> usize {
        match self {
            AssertError::Aggregate { failures } => failures.len(),
            _ => 1,
        }
    }
}

/// Each collected failure renders its own message; messages are separated by
/// a blank line with no wrapping header.
fn aggregate_text(failures: &[AssertError]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Produce a failure unconditionally, for code paths that should not be
/// reached. Feed it to a scope or return it from a test helper.
///
/// # Example
///
/// ```rust,ignore
/// use attest::{fail, multiple};
///
/// multiple(|scope| {
///     if unexpected {
///         scope.record(fail("reached the unexpected branch"));
///     }
/// })?;
/// ```
pub fn fail(reason: impl Into<String>) -> AssertError {
    AssertError::failure(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_displays_message() {
        let err = AssertError::failure("Expected x to be 2\nbut found 1");
        assert_eq!(err.to_string(), "Expected x to be 2\nbut found 1");
    }

    #[test]
    fn test_aggregate_joins_with_blank_lines() {
        let err = AssertError::Aggregate {
            failures: vec![AssertError::failure("first"), AssertError::failure("second")],
        };
        assert_eq!(err.to_string(), "first\n\nsecond");
        assert_eq!(err.failure_count(), 2);
    }

    #[test]
    fn test_argument_error() {
        let err = AssertError::Argument("bad pattern".to_string());
        assert!(err.to_string().contains("invalid assertion"));
    }
}
