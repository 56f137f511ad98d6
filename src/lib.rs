//! # attest
//!
//! A fluent assertion library for Rust tests: chainable conditions with
//! AND/OR connectors, deep structural equivalence with cycle safety, and
//! multiple-assertion scopes that report every failure in a block.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use attest::assert_that;
//!
//! #[test]
//! fn test_arithmetic() {
//!     assert_that(2 + 2).is_equal_to(4).assert();
//!     assert_that(2 + 2).is_greater_than(3).and().is_less_than(5).assert();
//! }
//! ```
//!
//! ## Structural Equivalence
//!
//! ```rust,ignore
//! use attest::{assert_that_seq, CollectionOrdering};
//!
//! #[test]
//! fn test_results_ignore_order() {
//!     assert_that_seq(collect_ids())
//!         .is_equivalent_to(&[3, 2, 1])
//!         .with_ordering(CollectionOrdering::Any)
//!         .assert();
//! }
//! ```
//!
//! ## Multiple Assertions
//!
//! ```rust,ignore
//! use attest::{assert_that, multiple};
//!
//! #[test]
//! fn test_every_field() -> Result<(), attest::AssertError> {
//!     multiple(|scope| {
//!         assert_that(user.name).contains("smith").check_in(scope);
//!         assert_that(user.age).is_at_least(18).check_in(scope);
//!     })
//! }
//! ```

pub mod capture;
pub mod condition;
pub mod equivalence;
pub mod error;
pub mod fluent;
pub mod scope;

mod message;

// Capture layer
pub use capture::{AsyncSubject, CapturedResult, Caught, CaughtKind, Subject};

// Condition model
pub use condition::{Condition, ConditionOutcome, ConditionTree, Connector};

// Equivalence engine
pub use equivalence::{
    compare, shape_of, CollectionOrdering, Comparer, ComparisonFailure, EquivalenceOptions,
    EquivalencyKind, Inspect, MemberKind, Recorder, Scalar, Shape,
};

// Errors
pub use error::{fail, AssertError};

// Fluent entry points and builders
pub use fluent::{
    assert_that, assert_that_async, assert_that_fn, assert_that_future, assert_that_seq,
    Assertion, AsyncAssertion, Collection, DelegateAssertion, EquivalenceAssertion,
    SequenceAssertion, Tolerance,
};

// Multiple-assertion scopes
pub use scope::{multiple, AssertionScope};

// Expression rendering (used by builders; public for custom integrations)
pub use message::ExpressionBuilder;
