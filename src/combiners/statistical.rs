//! Statistical combiners: `Average`

use super::CombineFn;

/* ===================== Average ===================== */

/// Arithmetic mean of values.
///
/// - Accumulator: `(sum, count)`
/// - Output: `Option<f64>`
///
/// Empty groups produce `None`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Average;

impl CombineFn<f64, (f64, u64), Option<f64>> for Average {
    fn create(&self) -> (f64, u64) {
        (0.0, 0)
    }

    fn add_input(&self, acc: &mut (f64, u64), v: f64) {
        acc.0 += v;
        acc.1 += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, acc: (f64, u64)) -> Option<f64> {
        if acc.1 == 0 {
            None
        } else {
            Some(acc.0 / (acc.1 as f64))
        }
    }
}
