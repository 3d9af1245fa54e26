//! # ironbeam-calc
//!
//! A **derived-column calculation engine** for chart series and crosstabs.
//! Given the rows a chart is drawn from, or the cells of a pivot grid, it
//! computes values such as running totals, moving averages, period-over-period
//! change, percent of total and compound growth.
//!
//! ## Key Features
//!
//! - **Six calculator kinds** - moving, running total, compound growth, value-of, change, percent
//! - **Two data shapes** - flat row series and row/column pivot grids, with matching semantics
//! - **Calendar-aware resets** - year/quarter/month/week/day/hour/minute buckets
//! - **Week-aligned period shifts** - previous year/quarter/month keep the week position
//! - **Three-state results** - a value, no value, or "invalid" (do not plot)
//! - **Per-pass caches** - sub-views, dimension routers and group totals keyed by series identity
//! - **Sequential and parallel batch runs** - spread calculators over a Rayon pool
//! - **Serde configuration** - build calculators from JSON
//!
//! ## Quick Start
//!
//! ```
//! use ironbeam_calc::*;
//! use ironbeam_calc::testing::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let series = SeriesBuilder::new()
//!     .dates("date", [(2023, 12, 31), (2024, 1, 1), (2024, 1, 2)])
//!     .measure("sales", [5.0, 7.0, 1.0])
//!     .build()?;
//!
//! let ytd = CalcColumn::new(
//!     "ytd",
//!     "sales",
//!     RunningTotal::new(Formula::Sum).dimension("date").reset(Interval::Year),
//! );
//! let out = Runner::sequential().run_series(&[ytd], &series);
//! assert_numbers(&out[0], &[5.0, 7.0, 8.0]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Series and grids
//!
//! Calculators read data only through two traits. A [`RowSeries`] is an
//! ordered table whose columns are either dimensions (grouping keys) or
//! measures. A [`PivotGrid`] addresses aggregated cells by a row [`Tuple`] and
//! a column [`Tuple`]; shorter tuples address subtotals.
//!
//! Both carry a [`SeriesId`]. Calculators key their caches by it, so a series
//! must take a fresh id whenever its contents change.
//!
//! ### Calculators
//!
//! A [`CalcColumn`] wraps one [`CalcKind`] and implements [`Calculator`]:
//! - [`evaluate_series`](Calculator::evaluate_series) - value for one row
//! - [`evaluate_grid`](Calculator::evaluate_grid) - value for one grid cell
//! - [`complete`](Calculator::complete) - end of a render pass, drop caches
//!
//! ### Results
//!
//! Every evaluation returns a [`Calculated`]: `Value(..)`, `Absent` (missing
//! data) or `Invalid` (not a plottable point: a suppressed total, a window
//! past the data, a comparison before the first date).
//!
//! ### Aggregates
//!
//! Windowed and cumulative calculators accumulate through the object-safe
//! [`Reducible`] trait. [`Formula`] picks a built-in one; any custom
//! `Reducible` can be plugged in with `with_aggregate`.
//!
//! ## Execution Modes
//!
//! [`Runner`] evaluates many calculators over one series or grid:
//! - **Sequential** - one calculator after the other
//! - **Parallel** - calculators spread across a Rayon pool (feature `parallel`, on by default)
//!
//! A single calculator is always driven by one thread for a whole pass.

pub mod calendar;
pub mod column;
pub mod combiners;
pub mod config;
pub mod grid;
pub mod interval;
pub mod router;
pub mod runner;
pub mod series;
pub mod subview;
pub mod testing;
pub mod totals;
pub mod value;

// General re-exports
pub use calendar::{Calendar, Period};
pub use column::{
    CalcColumn, CalcKind, Calculator, Change, Comparison, CompoundGrowth, Moving, Percent, PercentLevel, RunningTotal,
    ValueOf,
};
pub use combiners::{CombineFn, Formula, Growth, Reducible};
pub use config::{CalcConfig, CalcSpec, ConfigError, load_configs, parse_configs};
pub use grid::{Axis, CellAddress, DimensionRef, GridContext, MemGrid, PivotGrid, Tuple};
pub use interval::{Bucket, Interval, TimestampMs};
pub use router::DimensionRouter;
pub use runner::{ExecMode, Runner};
pub use series::{BrushedSeries, ColumnMeta, FilteredSeries, MemSeries, RowSeries, SeriesId};
pub use subview::{Conditions, SubView, SubViewIndex};
pub use totals::{GroupKey, PercentTotalCache};
pub use value::{Calculated, Value};
