//! Compounding growth accumulator.

use super::{Formula, Reducible};
use crate::value::Value;

/// Compounds per-period growth rates.
///
/// Each input `g` is accumulated as the factor `g + 1` into a product and the
/// result is reported as `product - 1`, so rates `[0.1, 0.2]` compound to
/// `1.1 * 1.2 - 1 = 0.32`.
///
/// Cells that are null or do not parse as numbers contribute a rate of `0`
/// (a factor of `1`).
#[derive(Clone)]
pub struct Growth {
    inner: Box<dyn Reducible>,
}

impl Growth {
    /// Growth over a product accumulator.
    pub fn compound() -> Self {
        Self { inner: Formula::Product.accumulator() }
    }
}

impl Reducible for Growth {
    fn reset(&mut self) {
        self.inner.reset();
    }

    fn add_value(&mut self, v: f64) {
        self.inner.add_value(v + 1.0);
    }

    fn add(&mut self, v: &Value) {
        self.add_value(v.as_f64_or_zero());
    }

    fn result(&self) -> Option<f64> {
        self.inner.result().map(|p| p - 1.0)
    }

    fn boxed_clone(&self) -> Box<dyn Reducible> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compounds_rates() {
        let mut g = Growth::compound();
        g.add_value(0.1);
        g.add_value(0.2);
        let r = g.result().unwrap();
        assert!((r - 0.32).abs() < 1e-12);
    }

    #[test]
    fn malformed_cells_contribute_nothing() {
        let mut g = Growth::compound();
        g.add(&Value::number(0.5));
        g.add(&Value::text("oops"));
        g.add(&Value::Null);
        assert_eq!(g.result(), Some(0.5));
    }

    #[test]
    fn empty_growth_is_missing() {
        assert_eq!(Growth::compound().result(), None);
    }
}
