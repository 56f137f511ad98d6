//! Tolerance-based comparison for numeric and time values.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::builder::{shown, Assertion};
use crate::condition::Condition;

/// Types that support an absolute-tolerance equality check via
/// [`Assertion::within`].
pub trait Tolerance: Sized {
    type Delta: fmt::Debug + 'static;

    fn close_to(&self, other: &Self, delta: &Self::Delta) -> bool;
}

impl Tolerance for f64 {
    type Delta = f64;

    fn close_to(&self, other: &Self, delta: &Self::Delta) -> bool {
        (self - other).abs() <= *delta
    }
}

impl Tolerance for f32 {
    type Delta = f32;

    fn close_to(&self, other: &Self, delta: &Self::Delta) -> bool {
        (self - other).abs() <= *delta
    }
}

macro_rules! tolerance_signed {
    ($($ty:ty),*) => {
        $(
            impl Tolerance for $ty {
                type Delta = $ty;

                fn close_to(&self, other: &Self, delta: &Self::Delta) -> bool {
                    self.abs_diff(*other) <= delta.unsigned_abs()
                }
            }
        )*
    };
}

macro_rules! tolerance_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Tolerance for $ty {
                type Delta = $ty;

                fn close_to(&self, other: &Self, delta: &Self::Delta) -> bool {
                    self.abs_diff(*other) <= *delta
                }
            }
        )*
    };
}

tolerance_signed!(i8, i16, i32, i64, isize);
tolerance_unsigned!(u8, u16, u32, u64, usize);

impl Tolerance for Duration {
    type Delta = Duration;

    fn close_to(&self, other: &Self, delta: &Self::Delta) -> bool {
        let difference = if self >= other {
            *self - *other
        } else {
            *other - *self
        };
        difference <= *delta
    }
}

impl Tolerance for DateTime<Utc> {
    type Delta = chrono::Duration;

    fn close_to(&self, other: &Self, delta: &Self::Delta) -> bool {
        let difference = if self >= other {
            *self - *other
        } else {
            *other - *self
        };
        difference <= *delta
    }
}

impl<T: Tolerance + fmt::Debug + Clone + 'static> Assertion<T> {
    /// Relax the preceding `is_equal_to` into an absolute-tolerance
    /// comparison. Calling `within()` without a preceding `is_equal_to` is
    /// an `Argument` error.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_that(measured).is_equal_to(9.81).within(0.05).assert();
    /// ```
    pub fn within(mut self, tolerance: T::Delta) -> Self {
        let call = format!("within({tolerance:?})");
        self.chain.push_call(call);
        match self.last_expected.take() {
            Some(expected) => {
                let phrase = format!(
                    "be equal to {} within {:?}",
                    shown(&expected),
                    tolerance
                );
                let condition = Condition::on_value(
                    phrase,
                    move |actual: &T| actual.close_to(&expected, &tolerance),
                    |actual| format!("found {}", shown(actual)),
                );
                if let Some(tree) = self.chain.tree.as_mut() {
                    tree.replace_last(condition);
                }
            }
            None => self.chain.invalid("within() must follow is_equal_to"),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluent::assert_that;

    #[test]
    fn test_integer_tolerance() {
        assert!(3.close_to(&5, &2));
        assert!(!3.close_to(&6, &2));
        assert!((-3i32).close_to(&-5, &2));
    }

    #[test]
    fn test_datetime_tolerance() {
        let base = Utc::now();
        let close = base + chrono::Duration::milliseconds(300);

        assert_that(close)
            .is_equal_to(base)
            .within(chrono::Duration::seconds(1))
            .assert();

        assert!(assert_that(close)
            .is_equal_to(base)
            .within(chrono::Duration::milliseconds(100))
            .check()
            .is_err());
    }

    #[test]
    fn test_within_survives_connectors() {
        assert_that(10.0_f64)
            .is_equal_to(10.1)
            .within(0.2)
            .and()
            .is_greater_than(9.0)
            .assert();
    }
}
