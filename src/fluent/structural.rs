//! Fluent builder for structural-equivalence assertions.
//!
//! Entered through `is_equivalent_to` on a value or sequence assertion; the
//! configuration methods bind to that comparison, so the equivalence check
//! is the chain's final condition.

use super::builder::{Assertion, Chain};
use crate::capture::CapturedResult;
use crate::condition::{caught_reason, Condition};
use crate::equivalence::{
    compare, shape_of, CollectionOrdering, EquivalenceOptions, EquivalencyKind, Inspect, Shape,
};
use crate::error::AssertError;
use crate::message::preview;
use crate::scope::AssertionScope;

impl<T: Inspect + 'static> Assertion<T> {
    /// Assert deep structural equivalence with `expected`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_that(loaded_profile)
    ///     .is_equivalent_to(&saved_profile)
    ///     .ignoring_member("last_seen")
    ///     .assert();
    /// ```
    pub fn is_equivalent_to<E: Inspect + ?Sized>(self, expected: &E) -> EquivalenceAssertion<T> {
        EquivalenceAssertion::start(self.chain, shape_of(&expected))
    }
}

/// Assertion comparing a value against an expected shape for deep
/// structural equivalence. Configuration methods refine the comparison;
/// the terminals evaluate it.
pub struct EquivalenceAssertion<T> {
    chain: Chain<T>,
    expected: Shape,
    expected_display: String,
    options: EquivalenceOptions,
}

impl<T: Inspect + 'static> EquivalenceAssertion<T> {
    pub(crate) fn start(mut chain: Chain<T>, expected: Shape) -> Self {
        let expected_display = preview(&expected.describe());
        chain.push_call(format!("is_equivalent_to({expected_display})"));
        Self {
            chain,
            expected,
            expected_display,
            options: EquivalenceOptions::new(),
        }
    }

    /// Require only the members present on the expected value; members
    /// unique to the actual value are not a mismatch.
    pub fn with_partial_equivalency(mut self) -> Self {
        self.chain.push_call("with_partial_equivalency()");
        self.options = self.options.kind(EquivalencyKind::Partial);
        self
    }

    /// Skip the member at the given dotted path, e.g. `"address.[0].street"`.
    pub fn ignoring_member(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.chain.push_call(format!("ignoring_member({path:?})"));
        self.options = self.options.ignore_member(path);
        self
    }

    /// Skip every member whose recorded structure name matches.
    pub fn ignoring_type(mut self, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        self.chain
            .push_call(format!("ignoring_type({type_name:?})"));
        self.options = self.options.ignore_type(type_name);
        self
    }

    /// Choose how sequence elements are paired: `Matching` (by index, the
    /// default) or `Any` (unordered multiset).
    pub fn with_ordering(mut self, ordering: CollectionOrdering) -> Self {
        self.chain.push_call(format!("with_ordering({ordering:?})"));
        self.options = self.options.ordering(ordering);
        self
    }

    /// Supply a custom comparer consulted for every pair before the default
    /// rules. Returning `Some(verdict)` settles that pair; `None` falls
    /// through.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use attest::{Scalar, Shape};
    ///
    /// // Compare all numbers with an absolute tolerance.
    /// .using(|a, b| match (a, b) {
    ///     (Shape::Scalar(a), Shape::Scalar(b)) => match (a.as_f64(), b.as_f64()) {
    ///         (Some(a), Some(b)) => Some((a - b).abs() < 0.001),
    ///         _ => None,
    ///     },
    ///     _ => None,
    /// })
    /// ```
    pub fn using(mut self, comparer: impl Fn(&Shape, &Shape) -> Option<bool> + 'static) -> Self {
        self.chain.push_call("using(<comparer>)");
        self.options = self.options.comparer(comparer);
        self
    }

    fn into_chain(self) -> Chain<T> {
        let Self {
            mut chain,
            expected,
            expected_display,
            options,
        } = self;

        let condition = Condition::raw(
            format!("be equivalent to {expected_display}"),
            move |captured: &CapturedResult<T>| match captured.value() {
                Some(value) => {
                    let failures = compare(&shape_of(value), &expected, &options);
                    match failures.first() {
                        None => Ok(()),
                        Some(first) => Err(first.render()),
                    }
                }
                None => Err(caught_reason(captured.error())),
            },
        );
        chain.append(condition);
        chain
    }

    /// Evaluate the comparison. Returns the captured value on a pass, the
    /// rendered failure otherwise.
    pub fn check(self) -> Result<T, AssertError> {
        self.into_chain().check()
    }

    /// Evaluate the comparison, panicking with the rendered failure message
    /// on a mismatch.
    ///
    /// # Panics
    ///
    /// Panics with the templated failure text.
    pub fn assert(self) -> T {
        match self.into_chain().check() {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    /// Evaluate the comparison, recording a failure into `scope` instead of
    /// returning it.
    pub fn check_in(self, scope: &mut AssertionScope) -> Option<T> {
        scope.check(self.into_chain().check())
    }
}
