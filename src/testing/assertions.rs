//! Assertion functions for calculator outputs.
//!
//! Numeric results are compared with a small absolute tolerance so that
//! averages and ratios do not trip over the last bit of a float.

use crate::value::{Calculated, Value};
use std::fmt::Debug;

/// Absolute tolerance used by the float-aware assertions.
pub const EPSILON: f64 = 1e-9;

/// Whether two floats are equal within [`EPSILON`].
#[must_use]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON || (a.is_nan() && b.is_nan())
}

/// Whether two results are equal, comparing numbers within [`EPSILON`].
#[must_use]
pub fn calculated_approx_eq(a: &Calculated, b: &Calculated) -> bool {
    match (a, b) {
        (Calculated::Value(Value::Number(x)), Calculated::Value(Value::Number(y))) => approx_eq(x.0, y.0),
        _ => a == b,
    }
}

/// Assert that two result sequences are equal, position by position.
///
/// # Panics
///
/// Panics if the sequences differ in length, or if any pair differs
/// (numbers beyond [`EPSILON`], anything else by equality).
///
/// # Example
///
/// ```
/// use ironbeam_calc::Calculated;
/// use ironbeam_calc::testing::assert_calculated_eq;
///
/// let actual = vec![Calculated::number(0.1 + 0.2), Calculated::Absent];
/// assert_calculated_eq(&actual, &[Calculated::number(0.3), Calculated::Absent]);
/// ```
pub fn assert_calculated_eq(actual: &[Calculated], expected: &[Calculated]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Result length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            calculated_approx_eq(a, e),
            "Result mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
}

/// Assert that every result is a number and the numbers match `expected`.
///
/// # Panics
///
/// Panics on a length mismatch, a non-numeric result, or a number beyond
/// [`EPSILON`] of its expectation.
pub fn assert_numbers(actual: &[Calculated], expected: &[f64]) {
    let expected: Vec<Calculated> = expected.iter().map(|&n| Calculated::number(n)).collect();
    assert_calculated_eq(actual, &expected);
}

/// Assert that every result satisfies `predicate`.
///
/// # Panics
///
/// Panics naming the first result that fails the predicate.
///
/// # Example
///
/// ```
/// use ironbeam_calc::Calculated;
/// use ironbeam_calc::testing::assert_all;
///
/// assert_all(&[Calculated::Invalid, Calculated::Invalid], Calculated::is_invalid);
/// ```
pub fn assert_all<T: Debug>(collection: &[T], predicate: impl Fn(&T) -> bool) {
    for (i, item) in collection.iter().enumerate() {
        assert!(predicate(item), "Predicate failed at index {i}:\n  Element: {item:?}\n  Collection: {collection:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerant_numbers() {
        assert!(approx_eq(0.1 + 0.2, 0.3));
        assert!(!approx_eq(0.3, 0.31));
        assert!(calculated_approx_eq(&Calculated::Absent, &Calculated::Absent));
        assert!(!calculated_approx_eq(&Calculated::Absent, &Calculated::Invalid));
    }

    #[test]
    #[should_panic(expected = "Result mismatch at index 1")]
    fn reports_first_mismatch() {
        assert_calculated_eq(
            &[Calculated::number(1.0), Calculated::Invalid],
            &[Calculated::number(1.0), Calculated::Absent],
        );
    }
}
