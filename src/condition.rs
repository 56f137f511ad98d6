//! Conditions and their AND/OR composition.
//!
//! A [`Condition`] is a single pass/fail check over a captured result with a
//! renderable failure message. Chained conditions form a left-leaning
//! [`ConditionTree`]; both branches of a connector are always evaluated so
//! each can contribute to the combined message, and so side effects in
//! custom conditions are guaranteed to run.
//!
//! Conditions never panic and never raise: they report outcomes. Whether a
//! failing outcome becomes an error is decided by the caller (the builder's
//! terminal methods, or a multiple-assertion scope).

use crate::capture::{CapturedResult, Caught};

/// Connector joining two conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

/// Result of evaluating a condition or a whole tree.
#[derive(Debug, Clone)]
pub struct ConditionOutcome {
    pub passed: bool,
    /// Phrase completing "Expected X to ...".
    pub expectation: String,
    /// Phrase completing "but ..."; empty on a pass.
    pub reason: String,
}

impl ConditionOutcome {
    pub fn pass(expectation: impl Into<String>) -> Self {
        Self {
            passed: true,
            expectation: expectation.into(),
            reason: String::new(),
        }
    }

    pub fn fail(expectation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            expectation: expectation.into(),
            reason: reason.into(),
        }
    }
}

type EvalFn<T> = Box<dyn Fn(&CapturedResult<T>) -> Result<(), String>>;
type ReasonFn<T> = Box<dyn Fn(&CapturedResult<T>) -> String>;

/// A single pass/fail check with a renderable failure message.
pub struct Condition<T> {
    phrase: String,
    eval: EvalFn<T>,
    reason_override: Option<ReasonFn<T>>,
}

impl<T> Condition<T> {
    /// A condition with full access to the captured result, for checks that
    /// care about caught panics as much as values.
    pub fn raw(
        phrase: impl Into<String>,
        eval: impl Fn(&CapturedResult<T>) -> Result<(), String> + 'static,
    ) -> Self {
        Self {
            phrase: phrase.into(),
            eval: Box::new(eval),
            reason_override: None,
        }
    }

    /// A condition over the captured value. A capture that holds a caught
    /// failure instead of a value fails with that failure as the reason.
    pub fn on_value(
        phrase: impl Into<String>,
        test: impl Fn(&T) -> bool + 'static,
        reason: impl Fn(&T) -> String + 'static,
    ) -> Self {
        Self::raw(phrase, move |captured| match captured.value() {
            Some(value) => {
                if test(value) {
                    Ok(())
                } else {
                    Err(reason(value))
                }
            }
            None => Err(caught_reason(captured.error())),
        })
    }

    /// Replace the default failure reason with a caller-supplied message
    /// factory.
    pub fn set_reason(&mut self, reason: impl Fn(&CapturedResult<T>) -> String + 'static) {
        self.reason_override = Some(Box::new(reason));
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn evaluate(&self, captured: &CapturedResult<T>) -> ConditionOutcome {
        match (self.eval)(captured) {
            Ok(()) => ConditionOutcome::pass(self.phrase.clone()),
            Err(default_reason) => {
                let reason = match &self.reason_override {
                    Some(factory) => factory(captured),
                    None => default_reason,
                };
                ConditionOutcome::fail(self.phrase.clone(), reason)
            }
        }
    }
}

/// Render the reason for a capture that holds no value.
pub(crate) fn caught_reason(error: Option<&Caught>) -> String {
    match error {
        Some(caught) => caught.to_string(),
        None => "no result was captured".to_string(),
    }
}

/// Binary tree of conditions built up as a chain appends them.
/// `a.and(b).or(c)` groups as `(a AND b) OR c`.
pub enum ConditionTree<T> {
    Leaf(Condition<T>),
    Group {
        left: Box<ConditionTree<T>>,
        right: Condition<T>,
        op: Connector,
    },
}

impl<T> ConditionTree<T> {
    /// Append a condition to an optional prior tree. With no prior tree the
    /// condition stands alone; with no explicit connector the join defaults
    /// to AND.
    pub fn append(
        tree: Option<ConditionTree<T>>,
        condition: Condition<T>,
        op: Option<Connector>,
    ) -> ConditionTree<T> {
        match tree {
            None => ConditionTree::Leaf(condition),
            Some(prior) => ConditionTree::Group {
                left: Box::new(prior),
                right: condition,
                op: op.unwrap_or(Connector::And),
            },
        }
    }

    /// The most recently appended condition.
    pub fn last_mut(&mut self) -> &mut Condition<T> {
        match self {
            ConditionTree::Leaf(condition) => condition,
            ConditionTree::Group { right, .. } => right,
        }
    }

    pub fn replace_last(&mut self, condition: Condition<T>) {
        *self.last_mut() = condition;
    }

    /// Evaluate the whole tree bottom-up. Both branches of every group are
    /// evaluated unconditionally.
    pub fn evaluate(&self, captured: &CapturedResult<T>) -> ConditionOutcome {
        match self {
            ConditionTree::Leaf(condition) => condition.evaluate(captured),
            ConditionTree::Group { left, right, op } => {
                let left_outcome = left.evaluate(captured);
                let right_outcome = right.evaluate(captured);
                combine(left_outcome, right_outcome, *op)
            }
        }
    }
}

/// AND passes iff both pass; OR passes iff either passes. Expectations are
/// joined with the connector word; the actual value is reported once, from
/// the first failing branch.
fn combine(left: ConditionOutcome, right: ConditionOutcome, op: Connector) -> ConditionOutcome {
    let (passed, word) = match op {
        Connector::And => (left.passed && right.passed, "and"),
        Connector::Or => (left.passed || right.passed, "or"),
    };
    let expectation = format!("{} {} {}", left.expectation, word, right.expectation);

    if passed {
        ConditionOutcome::pass(expectation)
    } else {
        let reason = if !left.passed { left.reason } else { right.reason };
        ConditionOutcome::fail(expectation, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Subject;

    fn equals(expected: i32) -> Condition<i32> {
        Condition::on_value(
            format!("be equal to {expected}"),
            move |actual| *actual == expected,
            |actual| format!("found {actual}"),
        )
    }

    fn capture(value: i32) -> CapturedResult<i32> {
        Subject::of(value).resolve_owned()
    }

    #[test]
    fn test_leaf_pass_and_fail() {
        let captured = capture(2);
        assert!(equals(2).evaluate(&captured).passed);

        let outcome = equals(3).evaluate(&captured);
        assert!(!outcome.passed);
        assert_eq!(outcome.expectation, "be equal to 3");
        assert_eq!(outcome.reason, "found 2");
    }

    #[test]
    fn test_and_requires_both() {
        let tree = ConditionTree::append(
            Some(ConditionTree::Leaf(equals(2))),
            equals(3),
            Some(Connector::And),
        );
        let outcome = tree.evaluate(&capture(1));
        assert!(!outcome.passed);
        assert_eq!(outcome.expectation, "be equal to 2 and be equal to 3");
        assert_eq!(outcome.reason, "found 1");
    }

    #[test]
    fn test_or_passes_if_either_passes() {
        let tree = ConditionTree::append(
            Some(ConditionTree::Leaf(equals(2))),
            equals(1),
            Some(Connector::Or),
        );
        assert!(tree.evaluate(&capture(1)).passed);
    }

    #[test]
    fn test_both_branches_always_evaluated() {
        use std::cell::Cell;
        use std::rc::Rc;

        let evaluations = Rc::new(Cell::new(0));
        let make = |counter: Rc<Cell<i32>>| {
            Condition::on_value(
                "count",
                move |_: &i32| {
                    counter.set(counter.get() + 1);
                    false
                },
                |_| "counted".to_string(),
            )
        };

        let tree = ConditionTree::append(
            Some(ConditionTree::Leaf(make(Rc::clone(&evaluations)))),
            make(Rc::clone(&evaluations)),
            Some(Connector::Or),
        );
        tree.evaluate(&capture(0));
        assert_eq!(evaluations.get(), 2);
    }

    #[test]
    fn test_left_associative_grouping() {
        // (false AND false) OR true => true
        let tree = ConditionTree::append(
            Some(ConditionTree::append(
                Some(ConditionTree::Leaf(equals(8))),
                equals(9),
                Some(Connector::And),
            )),
            equals(1),
            Some(Connector::Or),
        );
        assert!(tree.evaluate(&capture(1)).passed);
    }

    #[test]
    fn test_reason_override() {
        let mut condition = equals(3);
        condition.set_reason(|captured| format!("got {} instead", captured.value().unwrap()));
        let outcome = condition.evaluate(&capture(2));
        assert_eq!(outcome.reason, "got 2 instead");
    }

    #[test]
    fn test_value_condition_fails_on_captured_panic() {
        let captured: CapturedResult<i32> =
            Subject::from_fn(|| panic!("exploded")).resolve_owned();
        let outcome = equals(2).evaluate(&captured);
        assert!(!outcome.passed);
        assert!(outcome.reason.contains("exploded"));
    }
}
