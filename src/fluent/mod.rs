//! Fluent assertion API.
//!
//! Each input shape routes to the builder that knows its vocabulary:
//! values and strings through [`assert_that`], sequences through
//! [`assert_that_seq`], sync delegates through [`assert_that_fn`], async
//! delegates and futures through [`assert_that_async`] /
//! [`assert_that_future`]. Chains evaluate lazily at a terminal:
//!
//! ```rust,ignore
//! use attest::{assert_that, assert_that_seq};
//!
//! // Panicking terminal, for direct use in #[test] bodies.
//! assert_that(answer).is_equal_to(42).assert();
//!
//! // Non-panicking terminal, for scopes and error plumbing.
//! let result = assert_that_seq(names).has_count(3).check();
//! assert!(result.is_ok());
//! ```

mod builder;
mod collections;
mod delegates;
mod numeric;
mod strings;
mod structural;

pub use builder::{assert_that, Assertion};
pub use collections::{assert_that_seq, Collection, SequenceAssertion};
pub use delegates::{
    assert_that_async, assert_that_fn, assert_that_future, AsyncAssertion, DelegateAssertion,
};
pub use numeric::Tolerance;
pub use structural::EquivalenceAssertion;

#[cfg(test)]
mod tests;
