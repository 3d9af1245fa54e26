//! Basic arithmetic combiners: Sum, Count, Min, Max, Product

use super::CombineFn;
use ordered_float::OrderedFloat;

/* ===================== Sum ===================== */

/// Sum of values.
///
/// - Accumulator: `Option<f64>` (`None` until the first input)
/// - Output: `Option<f64>`
#[derive(Clone, Copy, Debug, Default)]
pub struct Sum;

impl CombineFn<f64, Option<f64>, Option<f64>> for Sum {
    fn create(&self) -> Option<f64> {
        None
    }

    fn add_input(&self, acc: &mut Option<f64>, v: f64) {
        *acc = Some(acc.unwrap_or(0.0) + v);
    }

    fn finish(&self, acc: Option<f64>) -> Option<f64> {
        acc
    }
}

/* ===================== Count ===================== */

/// Number of inputs. An empty count is `0`, not missing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl CombineFn<f64, u64, Option<f64>> for Count {
    fn create(&self) -> u64 {
        0
    }

    fn add_input(&self, acc: &mut u64, _v: f64) {
        *acc += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, acc: u64) -> Option<f64> {
        Some(acc as f64)
    }
}

/* ===================== Min ===================== */

/// Minimum value.
///
/// - Accumulator: `Option<OrderedFloat<f64>>`
#[derive(Clone, Copy, Debug, Default)]
pub struct Min;

impl CombineFn<f64, Option<OrderedFloat<f64>>, Option<f64>> for Min {
    fn create(&self) -> Option<OrderedFloat<f64>> {
        None
    }

    fn add_input(&self, acc: &mut Option<OrderedFloat<f64>>, v: f64) {
        let v = OrderedFloat(v);
        match acc {
            Some(cur) => {
                if v < *cur {
                    *cur = v;
                }
            }
            None => *acc = Some(v),
        }
    }

    fn finish(&self, acc: Option<OrderedFloat<f64>>) -> Option<f64> {
        acc.map(|v| v.0)
    }
}

/* ===================== Max ===================== */

/// Maximum value.
#[derive(Clone, Copy, Debug, Default)]
pub struct Max;

impl CombineFn<f64, Option<OrderedFloat<f64>>, Option<f64>> for Max {
    fn create(&self) -> Option<OrderedFloat<f64>> {
        None
    }

    fn add_input(&self, acc: &mut Option<OrderedFloat<f64>>, v: f64) {
        let v = OrderedFloat(v);
        match acc {
            Some(cur) => {
                if v > *cur {
                    *cur = v;
                }
            }
            None => *acc = Some(v),
        }
    }

    fn finish(&self, acc: Option<OrderedFloat<f64>>) -> Option<f64> {
        acc.map(|v| v.0)
    }
}

/* ===================== Product ===================== */

/// Product of values.
#[derive(Clone, Copy, Debug, Default)]
pub struct Product;

impl CombineFn<f64, Option<f64>, Option<f64>> for Product {
    fn create(&self) -> Option<f64> {
        None
    }

    fn add_input(&self, acc: &mut Option<f64>, v: f64) {
        *acc = Some(acc.unwrap_or(1.0) * v);
    }

    fn finish(&self, acc: Option<f64>) -> Option<f64> {
        acc
    }
}
