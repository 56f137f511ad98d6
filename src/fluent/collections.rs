//! Fluent assertion builder for sequences.
//!
//! `assert_that_seq()` routes arrays, vectors, and deques to a
//! [`SequenceAssertion`], which carries the collection vocabulary
//! (counts, membership, ordering) and the equivalence entry point with
//! configurable collection ordering.

use std::collections::VecDeque;
use std::fmt;

use super::builder::{shown, Chain};
use super::structural::EquivalenceAssertion;
use crate::capture::Subject;
use crate::condition::{Condition, Connector};
use crate::equivalence::{shape_of, Inspect};
use crate::error::AssertError;
use crate::message::{preview, ExpressionBuilder};
use crate::scope::AssertionScope;

/// A finite, iterable collection of items. The routing trait behind
/// [`assert_that_seq`].
pub trait Collection {
    type Item;

    fn count(&self) -> usize;

    fn items(&self) -> Box<dyn Iterator<Item = &Self::Item> + '_>;
}

impl<T> Collection for Vec<T> {
    type Item = T;

    fn count(&self) -> usize {
        self.len()
    }

    fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }
}

impl<T, const N: usize> Collection for [T; N] {
    type Item = T;

    fn count(&self) -> usize {
        N
    }

    fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }
}

impl<T> Collection for VecDeque<T> {
    type Item = T;

    fn count(&self) -> usize {
        self.len()
    }

    fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }
}

fn found_items<C: Collection>(actual: &C) -> String
where
    C::Item: fmt::Debug,
{
    let rendered: Vec<&C::Item> = actual.items().collect();
    format!("found {}", preview(&format!("{rendered:?}")))
}

/// Create an assertion on a sequence.
///
/// # Example
///
/// ```rust,ignore
/// use attest::assert_that_seq;
///
/// assert_that_seq(vec![1, 2, 3]).has_count(3).contains(2).assert();
/// ```
pub fn assert_that_seq<C: Collection>(collection: C) -> SequenceAssertion<C> {
    SequenceAssertion {
        chain: Chain::new(
            Subject::of(collection),
            ExpressionBuilder::new("assert_that_seq", "value"),
        ),
    }
}

/// Chainable assertion over a sequence of items.
pub struct SequenceAssertion<C> {
    pub(crate) chain: Chain<C>,
}

impl<C: Collection + 'static> SequenceAssertion<C> {
    /// Override the subject text used in failure messages. Cosmetic only.
    pub fn named(mut self, subject_expression: &str) -> Self {
        self.chain.expression.set_subject(subject_expression);
        self
    }

    pub fn and(mut self) -> Self {
        self.chain.connector(Connector::And);
        self
    }

    pub fn or(mut self) -> Self {
        self.chain.connector(Connector::Or);
        self
    }

    fn push(mut self, condition: Condition<C>, call: impl Into<String>) -> Self {
        self.chain.push_call(call);
        self.chain.append(condition);
        self
    }

    /// Assert the sequence holds exactly `expected` items.
    pub fn has_count(self, expected: usize) -> Self {
        let condition = Condition::on_value(
            format!("have {expected} items"),
            move |actual: &C| actual.count() == expected,
            |actual| format!("found {} items", actual.count()),
        );
        self.push(condition, format!("has_count({expected})"))
    }

    pub fn is_empty(self) -> Self {
        let condition = Condition::on_value(
            "be empty",
            |actual: &C| actual.count() == 0,
            |actual| format!("found {} items", actual.count()),
        );
        self.push(condition, "is_empty()")
    }

    pub fn is_not_empty(self) -> Self {
        let condition = Condition::on_value(
            "not be empty",
            |actual: &C| actual.count() > 0,
            |_| "found no items".to_string(),
        );
        self.push(condition, "is_not_empty()")
    }

    /// Assert some item equals `expected`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_that_seq(vec!["a", "b"]).contains("b").assert();
    /// ```
    pub fn contains(self, expected: C::Item) -> Self
    where
        C::Item: PartialEq + fmt::Debug + 'static,
    {
        let display = shown(&expected);
        let condition = Condition::on_value(
            format!("contain {display}"),
            move |actual: &C| actual.items().any(|item| *item == expected),
            |actual| found_items(actual),
        );
        self.push(condition, format!("contains({display})"))
    }

    /// Assert no item equals `expected`.
    pub fn does_not_contain(self, expected: C::Item) -> Self
    where
        C::Item: PartialEq + fmt::Debug + 'static,
    {
        let display = shown(&expected);
        let condition = Condition::on_value(
            format!("not contain {display}"),
            move |actual: &C| actual.items().all(|item| *item != expected),
            |actual| found_items(actual),
        );
        self.push(condition, format!("does_not_contain({display})"))
    }

    /// Assert the items are in non-descending order.
    pub fn is_in_order(self) -> Self
    where
        C::Item: PartialOrd + fmt::Debug,
    {
        let condition = Condition::on_value(
            "be in order",
            |actual: &C| {
                let items: Vec<&C::Item> = actual.items().collect();
                items.windows(2).all(|pair| pair[0] <= pair[1])
            },
            |actual| found_items(actual),
        );
        self.push(condition, "is_in_order()")
    }

    /// Assert every item satisfies a predicate.
    pub fn each_satisfies(
        self,
        description: &str,
        predicate: impl Fn(&C::Item) -> bool + 'static,
    ) -> Self
    where
        C::Item: fmt::Debug,
    {
        let condition = Condition::on_value(
            format!("only hold items that satisfy {description}"),
            move |actual: &C| actual.items().all(|item| predicate(item)),
            |actual| found_items(actual),
        );
        self.push(condition, format!("each_satisfies({description:?})"))
    }

    /// Compare the whole sequence for deep structural equivalence. Combine
    /// with [`with_ordering`](EquivalenceAssertion::with_ordering) to treat
    /// both sides as unordered multisets.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use attest::CollectionOrdering;
    ///
    /// assert_that_seq(vec![1, 2, 3])
    ///     .is_equivalent_to(&[3, 2, 1])
    ///     .with_ordering(CollectionOrdering::Any)
    ///     .assert();
    /// ```
    pub fn is_equivalent_to<E: Inspect + ?Sized>(self, expected: &E) -> EquivalenceAssertion<C>
    where
        C: Inspect,
    {
        EquivalenceAssertion::start(self.chain, shape_of(&expected))
    }

    /// Evaluate the chain. Returns the collection on a pass, the rendered
    /// failure otherwise.
    pub fn check(self) -> Result<C, AssertError> {
        self.chain.check()
    }

    /// Evaluate the chain, panicking with the rendered failure message if a
    /// condition fails.
    ///
    /// # Panics
    ///
    /// Panics with the templated failure text.
    pub fn assert(self) -> C {
        match self.chain.check() {
            Ok(collection) => collection,
            Err(error) => panic!("{error}"),
        }
    }

    /// Evaluate the chain, recording a failure into `scope` instead of
    /// returning it.
    pub fn check_in(self, scope: &mut AssertionScope) -> Option<C> {
        scope.check(self.chain.check())
    }
}
