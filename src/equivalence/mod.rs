//! Deep structural equivalence.
//!
//! This module compares two arbitrary values for structural equality, as
//! opposed to reference or shallow `==` equality:
//! - values describe their structure via the [`Inspect`] trait (no
//!   reflection), producing a [`Shape`] tree with cycle markers,
//! - [`compare`] walks two shapes under [`EquivalenceOptions`] and yields
//!   one [`ComparisonFailure`] per mismatch found along a traversal path.
//!
//! The fluent entry point is `is_equivalent_to` on an assertion builder;
//! `compare`/`shape_of` are exposed for direct use.

mod compare;
mod inspect;

pub use compare::{
    compare, CollectionOrdering, Comparer, ComparisonFailure, EquivalenceOptions, EquivalencyKind,
    MemberKind,
};
pub use inspect::{shape_of, Inspect, Recorder, Scalar, Shape};
