//! Calculation columns: derived values computed per row or per grid cell.
//!
//! A [`CalcColumn`] is built once per configured calculator and asked for one
//! value at a time, either for a row of a [`RowSeries`] or for a cell of a
//! [`PivotGrid`](crate::grid::PivotGrid). The calculator kinds form a closed
//! set ([`CalcKind`]):
//!
//! - [`Moving`] -- windowed aggregate over neighbouring rows / group members.
//! - [`RunningTotal`] -- cumulative aggregate with calendar or break-by resets.
//! - [`CompoundGrowth`] -- running total that compounds growth rates.
//! - [`ValueOf`] -- value at the first/last/previous/next/previous-period point.
//! - [`Change`] -- difference (or percent change) against a [`ValueOf`] point.
//! - [`Percent`] -- share of a group or grand total.
//!
//! Evaluation never fails; every call yields a [`Calculated`]. Caches built
//! while evaluating (brush detection, sub-views, routers, percent totals)
//! live for one render pass: they are dropped by [`Calculator::complete`],
//! by the `is_last` row of a series pass, and whenever a different series
//! shows up.
//!
//! # Example
//! ```
//! use ironbeam_calc::*;
//!
//! let series = MemSeries::from_rows(
//!     vec![ColumnMeta::dimension("month"), ColumnMeta::measure("sales")],
//!     vec![
//!         vec![Value::number(1.0), Value::number(1.0)],
//!         vec![Value::number(2.0), Value::number(2.0)],
//!         vec![Value::number(3.0), Value::number(3.0)],
//!     ],
//! )?;
//!
//! let total = CalcColumn::new("cumulative", "sales", RunningTotal::new(Formula::Sum));
//! let out: Vec<_> = (0..3).map(|r| total.evaluate_series(&series, r, r == 0, r == 2)).collect();
//! assert_eq!(out, vec![Calculated::number(1.0), Calculated::number(3.0), Calculated::number(6.0)]);
//! # anyhow::Result::<()>::Ok(())
//! ```

mod moving;
mod percent;
mod running;
mod state;
mod value_of;

pub use moving::Moving;
pub use percent::{Percent, PercentLevel};
pub use running::{CompoundGrowth, RunningTotal};
pub use value_of::{Change, Comparison, ValueOf};

use crate::grid::{CellAddress, DimensionRef, GridContext, ResolvedDimension};
use crate::series::RowSeries;
use crate::value::Calculated;
use log::{trace, warn};
use state::{ColumnState, SeriesCx};
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Shared capability of every calculator kind.
pub trait Calculator: Send + Sync {
    /// Value for `row` of `series`.
    ///
    /// `is_first` marks the first row of a pass over `series` and `is_last`
    /// the final one; per-pass caches are released after the last row.
    fn evaluate_series(&self, series: &dyn RowSeries, row: usize, is_first: bool, is_last: bool) -> Calculated;

    /// Value for one grid cell.
    fn evaluate_grid(&self, ctx: &GridContext<'_>, cell: &CellAddress) -> Calculated;

    /// End of a render pass: drop every cache.
    fn complete(&self);
}

/// The closed set of calculator kinds.
pub enum CalcKind {
    Moving(Moving),
    RunningTotal(RunningTotal),
    CompoundGrowth(CompoundGrowth),
    ValueOf(ValueOf),
    Change(Change),
    Percent(Percent),
}

impl CalcKind {
    /// Whether this kind deliberately reads `cell` even though it is a total.
    fn reads_total(&self, ctx: &GridContext<'_>, cell: &CellAddress) -> bool {
        match self {
            Self::ValueOf(v) => v.anchors_total(ctx, cell),
            Self::Change(c) => c.lookup().anchors_total(ctx, cell),
            _ => false,
        }
    }
}

macro_rules! impl_from_kind {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for CalcKind {
                fn from(v: $variant) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_kind!(Moving, RunningTotal, CompoundGrowth, ValueOf, Change, Percent);

/// One configured calculator together with its per-pass caches.
pub struct CalcColumn {
    name: String,
    field: String,
    kind: CalcKind,
    calc_on_totals: bool,
    state: Mutex<ColumnState>,
    warned: AtomicBool,
}

impl CalcColumn {
    /// Calculator `name` deriving values from measure `field`.
    pub fn new(name: impl Into<String>, field: impl Into<String>, kind: impl Into<CalcKind>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            kind: kind.into(),
            calc_on_totals: false,
            state: Mutex::new(ColumnState::default()),
            warned: AtomicBool::new(false),
        }
    }

    /// Compute on subtotal and grand-total cells instead of marking them invalid.
    #[must_use]
    pub fn calc_on_totals(mut self, yes: bool) -> Self {
        self.calc_on_totals = yes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> &CalcKind {
        &self.kind
    }

    fn lock_state(&self) -> MutexGuard<'_, ColumnState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn diagnostics(&self) -> Diagnostics<'_> {
        Diagnostics { column: &self.name, warned: &self.warned }
    }
}

impl Calculator for CalcColumn {
    fn evaluate_series(&self, series: &dyn RowSeries, row: usize, is_first: bool, is_last: bool) -> Calculated {
        let mut state = self.lock_state();
        if is_first {
            state.begin_pass(series.id());
        }

        let result = match state.active(series, row) {
            None => Calculated::Absent,
            Some((active, row)) => {
                let diag = self.diagnostics();
                let mut cx = SeriesCx { series: active, row, field: &self.field, state: &mut *state, diag };
                match &self.kind {
                    CalcKind::Moving(m) => m.series(&mut cx),
                    CalcKind::RunningTotal(r) => r.series(&mut cx),
                    CalcKind::CompoundGrowth(g) => g.series(&mut cx),
                    CalcKind::ValueOf(v) => v.series(&mut cx),
                    CalcKind::Change(c) => c.series(&mut cx),
                    CalcKind::Percent(p) => p.series(&mut cx),
                }
            }
        };

        if is_last {
            drop(state);
            self.complete();
        }
        result
    }

    fn evaluate_grid(&self, ctx: &GridContext<'_>, cell: &CellAddress) -> Calculated {
        if !self.calc_on_totals && ctx.is_total_cell(cell) && !self.kind.reads_total(ctx, cell) {
            trace!("calculator `{}`: total cell {cell:?} suppressed", self.name);
            return Calculated::Invalid;
        }
        let diag = self.diagnostics();
        match &self.kind {
            CalcKind::Moving(m) => m.grid(ctx, cell, &diag),
            CalcKind::RunningTotal(r) => r.grid(ctx, cell, &diag),
            CalcKind::CompoundGrowth(g) => g.grid(ctx, cell, &diag),
            CalcKind::ValueOf(v) => v.grid(ctx, cell, &diag),
            CalcKind::Change(c) => c.grid(ctx, cell, &diag),
            CalcKind::Percent(p) => p.grid(ctx, cell),
        }
    }

    fn complete(&self) {
        self.lock_state().clear();
        if let CalcKind::Percent(p) = &self.kind {
            p.clear();
        }
        self.warned.store(false, Ordering::Relaxed);
    }
}

/// Reports configuration problems found while evaluating, once per pass.
pub(crate) struct Diagnostics<'c> {
    column: &'c str,
    warned: &'c AtomicBool,
}

impl Diagnostics<'_> {
    pub(crate) fn unresolved(&self, what: &dyn Display) {
        if !self.warned.swap(true, Ordering::Relaxed) {
            warn!("calculator `{}`: {what} is not part of the current layout", self.column);
        }
    }
}

/// Grid dimension a windowed calculator walks along. Without an explicit
/// reference the innermost row dimension is used, then the innermost column.
pub(crate) fn grid_dimension(
    ctx: &GridContext<'_>,
    dim: Option<&DimensionRef>,
    diag: &Diagnostics<'_>,
) -> Option<ResolvedDimension> {
    let resolved = match dim {
        Some(d) => ctx.resolve(d),
        None => ctx
            .resolve(&DimensionRef::InnermostRow)
            .or_else(|| ctx.resolve(&DimensionRef::InnermostColumn)),
    };
    if resolved.is_none() {
        match dim {
            Some(d) => diag.unresolved(&format_args!("dimension {d:?}")),
            None => diag.unresolved(&"an axis dimension"),
        }
    }
    resolved
}
