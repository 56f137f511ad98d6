//! Failure message rendering.
//!
//! Failure text follows a fixed template that tests are allowed to assert on
//! literally:
//!
//! ```text
//! Expected <subject> to <expectation>
//! but <reason>
//!
//! at assert_that(<subject>).<chain>
//! ```

/// Maximum rendered length for a value embedded in a failure message.
const VALUE_PREVIEW_LIMIT: usize = 120;

/// Accumulates the textual rendering of an assertion chain for the
/// `at ...` line of a failure message. Purely cosmetic: it never affects
/// pass/fail.
#[derive(Debug, Clone)]
pub struct ExpressionBuilder {
    entry: &'static str,
    subject: String,
    calls: Vec<String>,
}

impl ExpressionBuilder {
    /// `entry` is the facade function the caller used (`assert_that`,
    /// `assert_that_fn`, ...); `subject` is the caller's expression text.
    pub fn new(entry: &'static str, subject: impl Into<String>) -> Self {
        Self {
            entry,
            subject: subject.into(),
            calls: Vec::new(),
        }
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Append one rendered chain call, e.g. `is_equal_to(2)`.
    pub fn push(&mut self, call: impl Into<String>) {
        self.calls.push(call.into());
    }

    /// Render the full call site, e.g. `assert_that(x).is_equal_to(2)`.
    pub fn call_site(&self) -> String {
        let mut site = format!("{}({})", self.entry, self.subject);
        for call in &self.calls {
            site.push('.');
            site.push_str(call);
        }
        site
    }
}

/// Render a failure in the templated format.
pub(crate) fn render_failure(
    subject: &str,
    expectation: &str,
    reason: &str,
    call_site: &str,
) -> String {
    format!("Expected {subject} to {expectation}\nbut {reason}\n\nat {call_site}")
}

/// Truncate a rendered value to a displayable preview.
/// Handles multi-byte UTF-8 characters safely.
pub(crate) fn preview(s: &str) -> String {
    truncate(s, VALUE_PREVIEW_LIMIT)
}

fn truncate(s: &str, max: usize) -> String {
    let char_count = s.chars().count();

    if char_count <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_site_rendering() {
        let mut expr = ExpressionBuilder::new("assert_that", "x");
        expr.push("is_equal_to(2)");
        expr.push("and()");
        expr.push("is_equal_to(3)");
        assert_eq!(
            expr.call_site(),
            "assert_that(x).is_equal_to(2).and().is_equal_to(3)"
        );
    }

    #[test]
    fn test_render_failure_template() {
        let message = render_failure("x", "be equal to 2", "found 1", "assert_that(x).is_equal_to(2)");
        assert_eq!(
            message,
            "Expected x to be equal to 2\nbut found 1\n\nat assert_that(x).is_equal_to(2)"
        );
    }

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world!", 10), "hello w...");
    }

    #[test]
    fn test_truncate_unicode() {
        let result = truncate("日本語ですよね", 6);
        assert_eq!(result, "日本語...");
        assert_eq!(result.chars().count(), 6);
    }
}
