//! Equivalence policies for comparing control and candidate values

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::{BuildHasher, Hash};

/// Compares a control value with a candidate value
pub trait Comparator<T>: Send + Sync {
    /// Returns true if the values are equivalent
    fn compare(&self, control: &T, candidate: &T) -> bool;
}

/// Compares using `==`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComparator;

impl<T: PartialEq> Comparator<T> for DefaultComparator {
    fn compare(&self, control: &T, candidate: &T) -> bool {
        control == candidate
    }
}

/// Wraps a comparison function as a [`Comparator`]
#[derive(Clone, Copy)]
pub struct FnComparator<F>(F);

impl<F> fmt::Debug for FnComparator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnComparator")
    }
}

impl<T, F> Comparator<T> for FnComparator<F>
where
    F: Fn(&T, &T) -> bool + Send + Sync,
{
    fn compare(&self, control: &T, candidate: &T) -> bool {
        (self.0)(control, candidate)
    }
}

/// Create a comparator from a comparison function
pub fn comparator_from_fn<T, F>(f: F) -> FnComparator<F>
where
    F: Fn(&T, &T) -> bool + Send + Sync,
{
    FnComparator(f)
}

/// Numeric comparison within a relative threshold.
///
/// Two zeros match, a single zero never does; otherwise the values match
/// when `|control - candidate| / |control| <= threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentDifference {
    threshold: f64,
}

impl PercentDifference {
    /// `threshold` is a fraction, e.g. `0.1` for ten percent
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn within(&self, control: f64, candidate: f64) -> bool {
        if control == 0.0 && candidate == 0.0 {
            return true;
        }

        if control == 0.0 || candidate == 0.0 {
            return false;
        }

        (control - candidate).abs() / control.abs() <= self.threshold
    }
}

/// Numeric values the percent-difference comparator accepts
pub trait AsF64: Copy {
    fn as_f64(self) -> f64;
}

macro_rules! impl_as_f64 {
    ($($ty:ty),*) => {
        $(
            impl AsF64 for $ty {
                fn as_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_as_f64!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl<T: AsF64> Comparator<T> for PercentDifference {
    fn compare(&self, control: &T, candidate: &T) -> bool {
        self.within(control.as_f64(), candidate.as_f64())
    }
}

/// Set equality: same elements regardless of order
#[derive(Debug, Clone, Copy, Default)]
pub struct SetEquality;

impl<T, S> Comparator<HashSet<T, S>> for SetEquality
where
    T: Eq + Hash,
    S: BuildHasher + Send + Sync,
{
    fn compare(&self, control: &HashSet<T, S>, candidate: &HashSet<T, S>) -> bool {
        control == candidate
    }
}

impl<T: Ord> Comparator<BTreeSet<T>> for SetEquality {
    fn compare(&self, control: &BTreeSet<T>, candidate: &BTreeSet<T>) -> bool {
        control == candidate
    }
}

impl<T: Eq + Hash> Comparator<Vec<T>> for SetEquality {
    fn compare(&self, control: &Vec<T>, candidate: &Vec<T>) -> bool {
        let control: HashSet<&T> = control.iter().collect();
        let candidate: HashSet<&T> = candidate.iter().collect();
        control == candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_equal() {
        assert!(DefaultComparator.compare(&1, &1));
    }

    #[test]
    fn test_default_not_equal() {
        assert!(!DefaultComparator.compare(&1, &2));
    }

    #[test]
    fn test_default_strings() {
        assert!(DefaultComparator.compare(&"hello".to_string(), &"hello".to_string()));
        assert!(!DefaultComparator.compare(&"hello", &"world"));
    }

    #[test]
    fn test_fn_comparator_custom_comparison() {
        let case_insensitive =
            comparator_from_fn(|a: &String, b: &String| a.eq_ignore_ascii_case(b));

        assert!(case_insensitive.compare(&"Hello".to_string(), &"HELLO".to_string()));
        assert!(!case_insensitive.compare(&"Hello".to_string(), &"World".to_string()));
    }

    #[test]
    fn test_percent_within_threshold() {
        let cmp = PercentDifference::new(0.1);
        assert!(cmp.compare(&100.0_f64, &105.0_f64));
    }

    #[test]
    fn test_percent_exact_threshold_is_inclusive() {
        let cmp = PercentDifference::new(0.1);
        assert!(cmp.compare(&100.0_f64, &110.0_f64));
        assert!(cmp.compare(&100i32, &90i32));
    }

    #[test]
    fn test_percent_outside_threshold() {
        let cmp = PercentDifference::new(0.1);
        assert!(!cmp.compare(&100.0_f64, &120.0_f64));
    }

    #[test]
    fn test_percent_both_zero() {
        let cmp = PercentDifference::new(0.1);
        assert!(cmp.compare(&0.0_f64, &0.0_f64));
    }

    #[test]
    fn test_percent_one_zero() {
        let cmp = PercentDifference::new(0.1);
        assert!(!cmp.compare(&0.0_f64, &5.0_f64));
        assert!(!cmp.compare(&5.0_f64, &0.0_f64));
    }

    #[test]
    fn test_percent_integers() {
        let cmp = PercentDifference::new(0.1);
        assert!(cmp.compare(&100i32, &105i32));
        assert!(!cmp.compare(&100u32, &120u32));
    }

    #[test]
    fn test_percent_wide_integers() {
        let cmp = PercentDifference::new(0.1);

        assert!(cmp.compare(&100i64, &105i64));
        assert!(cmp.compare(&100i64, &110i64));
        assert!(!cmp.compare(&100i64, &120i64));
        assert!(cmp.compare(&0i64, &0i64));
        assert!(!cmp.compare(&0i64, &5i64));
        assert!(!cmp.compare(&5i64, &0i64));

        assert!(cmp.compare(&100u64, &105u64));
        assert!(cmp.compare(&100u64, &110u64));
        assert!(!cmp.compare(&100u64, &120u64));
        assert!(!cmp.compare(&0u64, &5u64));

        assert!(cmp.compare(&100usize, &105usize));
        assert!(cmp.compare(&100usize, &110usize));
        assert!(!cmp.compare(&100usize, &120usize));
        assert!(cmp.compare(&0usize, &0usize));
    }

    #[test]
    fn test_percent_negative_control() {
        let cmp = PercentDifference::new(0.1);
        assert!(cmp.compare(&-100.0_f64, &-95.0_f64));
        assert!(!cmp.compare(&-100.0_f64, &100.0_f64));
    }

    #[test]
    fn test_equal_sets() {
        let a: HashSet<i32> = [1, 2, 3].into_iter().collect();
        let b: HashSet<i32> = [3, 2, 1].into_iter().collect();

        assert!(SetEquality.compare(&a, &b));
    }

    #[test]
    fn test_different_sets() {
        let a: BTreeSet<i32> = [1, 2, 3].into_iter().collect();
        let b: BTreeSet<i32> = [1, 2, 4].into_iter().collect();

        assert!(!SetEquality.compare(&a, &b));
    }

    #[test]
    fn test_vec_as_set_ignores_order() {
        assert!(SetEquality.compare(&vec!["a", "b", "c"], &vec!["c", "a", "b"]));
        assert!(!SetEquality.compare(&vec!["a", "b"], &vec!["a", "c"]));
    }
}
