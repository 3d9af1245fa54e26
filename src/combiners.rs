//! Reducible aggregates used by the calculators.
//!
//! Every built-in combiner implements [`CombineFn`] over `f64` inputs:
//!
//! - [`Sum`] -- sum of values.
//! - [`Count`] -- number of values.
//! - [`Average`] -- arithmetic mean.
//! - [`Min`] / [`Max`] -- smallest / largest value.
//! - [`Product`] -- product of values.
//!
//! Calculators never drive a `CombineFn` directly. They work with the
//! object-safe [`Reducible`] accumulator, which owns its state and exposes the
//! `reset` / `add_value` / `result` cycle plus a cloning hook so every
//! evaluation gets an independent instance. [`Accumulator`] bridges the two.
//! [`Growth`] is the one transforming accumulator: it feeds `v + 1` into a
//! product and reports `product - 1`.
//!
//! # Example
//! ```
//! use ironbeam_calc::combiners::{Formula, Reducible};
//!
//! let mut avg = Formula::Average.accumulator();
//! for v in [1.0, 2.0, 3.0] {
//!     avg.add_value(v);
//! }
//! assert_eq!(avg.result(), Some(2.0));
//! ```

mod basic;
mod growth;
mod statistical;

pub use basic::{Count, Max, Min, Product, Sum};
pub use growth::Growth;
pub use statistical::Average;

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Combiner contract: build an accumulator, feed it inputs, read the output.
pub trait CombineFn<V, A, O>: Send + Sync + 'static {
    fn create(&self) -> A;
    fn add_input(&self, acc: &mut A, v: V);
    fn finish(&self, acc: A) -> O;
}

/// A resettable accumulator over numeric inputs.
pub trait Reducible: Send + Sync {
    /// Drop everything accumulated so far.
    fn reset(&mut self);

    /// Feed one numeric input.
    fn add_value(&mut self, v: f64);

    /// Feed one cell value. Non-numeric and null cells are skipped.
    fn add(&mut self, v: &Value) {
        if let Some(n) = v.as_f64() {
            self.add_value(n);
        }
    }

    /// Current result, or `None` when nothing usable has been accumulated.
    fn result(&self) -> Option<f64>;

    /// Independent copy carrying the same configuration and state.
    fn boxed_clone(&self) -> Box<dyn Reducible>;
}

impl Clone for Box<dyn Reducible> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Owns a combiner together with its accumulator state.
#[derive(Clone, Debug)]
pub struct Accumulator<C, A> {
    comb: C,
    acc: A,
}

impl<C, A> Accumulator<C, A>
where
    C: CombineFn<f64, A, Option<f64>>,
{
    pub fn new(comb: C) -> Self {
        let acc = comb.create();
        Self { comb, acc }
    }
}

impl<C, A> Reducible for Accumulator<C, A>
where
    C: CombineFn<f64, A, Option<f64>> + Clone,
    A: Clone + Send + Sync + 'static,
{
    fn reset(&mut self) {
        self.acc = self.comb.create();
    }

    fn add_value(&mut self, v: f64) {
        self.comb.add_input(&mut self.acc, v);
    }

    fn result(&self) -> Option<f64> {
        self.comb.finish(self.acc.clone())
    }

    fn boxed_clone(&self) -> Box<dyn Reducible> {
        Box::new(self.clone())
    }
}

/// Selects one of the built-in aggregates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formula {
    #[default]
    Sum,
    Count,
    Average,
    Min,
    Max,
    Product,
}

impl Formula {
    /// Fresh accumulator for this formula.
    pub fn accumulator(self) -> Box<dyn Reducible> {
        match self {
            Self::Sum => Box::new(Accumulator::new(Sum)),
            Self::Count => Box::new(Accumulator::new(Count)),
            Self::Average => Box::new(Accumulator::new(Average)),
            Self::Min => Box::new(Accumulator::new(Min)),
            Self::Max => Box::new(Accumulator::new(Max)),
            Self::Product => Box::new(Accumulator::new(Product)),
        }
    }
}
