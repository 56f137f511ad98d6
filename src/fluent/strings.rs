//! String vocabulary for value assertions.
//!
//! Available on any `Assertion<S>` where `S: AsRef<str>`, so owned strings
//! and string slices share one set of methods. `matches()` compiles its
//! pattern eagerly; an invalid pattern surfaces as an `Argument` error from
//! the terminal rather than a failed condition.

use regex::Regex;

use super::builder::Assertion;
use crate::condition::Condition;
use crate::message::preview;

fn found(actual: &str) -> String {
    format!("found {:?}", preview(actual))
}

impl<S: AsRef<str> + 'static> Assertion<S> {
    /// Assert the string contains `substring`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_that(log_line).contains("connected").assert();
    /// ```
    pub fn contains(self, substring: impl Into<String>) -> Self {
        let substring = substring.into();
        let display = format!("{substring:?}");
        let condition = Condition::on_value(
            format!("contain {display}"),
            move |actual: &S| actual.as_ref().contains(&substring),
            |actual| found(actual.as_ref()),
        );
        self.push(condition, format!("contains({display})"))
    }

    /// Assert the string does not contain `substring`.
    pub fn does_not_contain(self, substring: impl Into<String>) -> Self {
        let substring = substring.into();
        let display = format!("{substring:?}");
        let condition = Condition::on_value(
            format!("not contain {display}"),
            move |actual: &S| !actual.as_ref().contains(&substring),
            |actual| found(actual.as_ref()),
        );
        self.push(condition, format!("does_not_contain({display})"))
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let display = format!("{prefix:?}");
        let condition = Condition::on_value(
            format!("start with {display}"),
            move |actual: &S| actual.as_ref().starts_with(&prefix),
            |actual| found(actual.as_ref()),
        );
        self.push(condition, format!("starts_with({display})"))
    }

    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        let display = format!("{suffix:?}");
        let condition = Condition::on_value(
            format!("end with {display}"),
            move |actual: &S| actual.as_ref().ends_with(&suffix),
            |actual| found(actual.as_ref()),
        );
        self.push(condition, format!("ends_with({display})"))
    }

    /// Assert the string's character count.
    pub fn has_length(self, expected: usize) -> Self {
        let condition = Condition::on_value(
            format!("have length {expected}"),
            move |actual: &S| actual.as_ref().chars().count() == expected,
            |actual| {
                format!(
                    "found length {} ({})",
                    actual.as_ref().chars().count(),
                    preview(actual.as_ref())
                )
            },
        );
        self.push(condition, format!("has_length({expected})"))
    }

    /// Assert the string matches a regex pattern.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_that(summary).matches(r"\d+ items processed").assert();
    /// ```
    pub fn matches(mut self, pattern: &str) -> Self {
        self.chain.push_call(format!("matches({pattern:?})"));
        match Regex::new(pattern) {
            Ok(re) => {
                let display = format!("{pattern:?}");
                let condition = Condition::on_value(
                    format!("match {display}"),
                    move |actual: &S| re.is_match(actual.as_ref()),
                    |actual| found(actual.as_ref()),
                );
                self.chain.append(condition);
            }
            Err(error) => self
                .chain
                .invalid(format!("invalid regex {pattern:?}: {error}")),
        }
        self.last_expected = None;
        self
    }

    /// Assert the string does not match a regex pattern.
    pub fn does_not_match(mut self, pattern: &str) -> Self {
        self.chain.push_call(format!("does_not_match({pattern:?})"));
        match Regex::new(pattern) {
            Ok(re) => {
                let display = format!("{pattern:?}");
                let condition = Condition::on_value(
                    format!("not match {display}"),
                    move |actual: &S| !re.is_match(actual.as_ref()),
                    |actual| found(actual.as_ref()),
                );
                self.chain.append(condition);
            }
            Err(error) => self
                .chain
                .invalid(format!("invalid regex {pattern:?}: {error}")),
        }
        self.last_expected = None;
        self
    }
}
