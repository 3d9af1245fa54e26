//! Running totals and compound growth.

use super::state::SeriesCx;
use super::{Diagnostics, grid_dimension};
use crate::calendar::Calendar;
use crate::combiners::{Formula, Growth, Reducible};
use crate::grid::{CellAddress, DimensionRef, GridContext, Tuple};
use crate::interval::{Bucket, Interval};
use crate::series::{RowSeries, dimension_columns, root_row, root_series};
use crate::subview::Conditions;
use crate::value::Calculated;

/// Cumulative aggregate of the current row and the rows before it.
///
/// Accumulation stops at the first earlier row whose `reset` bucket differs
/// from the current one (e.g. a new year), or whose `break_by` value differs.
pub struct RunningTotal {
    aggregate: Box<dyn Reducible>,
    dimension: Option<DimensionRef>,
    reset: Interval,
    break_by: Option<String>,
    calendar: Calendar,
}

impl RunningTotal {
    pub fn new(formula: Formula) -> Self {
        Self::with_aggregate(formula.accumulator())
    }

    pub fn with_aggregate(aggregate: Box<dyn Reducible>) -> Self {
        Self { aggregate, dimension: None, reset: Interval::None, break_by: None, calendar: Calendar::default() }
    }

    /// Dimension the total runs along; the reset interval is read from it.
    #[must_use]
    pub fn dimension(mut self, dim: impl Into<DimensionRef>) -> Self {
        self.dimension = Some(dim.into());
        self
    }

    #[must_use]
    pub fn reset(mut self, level: Interval) -> Self {
        self.reset = level;
        self
    }

    /// Restart whenever this dimension changes value.
    #[must_use]
    pub fn break_by(mut self, dim: impl Into<String>) -> Self {
        self.break_by = Some(dim.into());
        self
    }

    #[must_use]
    pub fn calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub(crate) fn series(&self, cx: &mut SeriesCx<'_, '_>) -> Calculated {
        self.accumulate_series(cx, self.aggregate.boxed_clone())
    }

    pub(crate) fn grid(&self, ctx: &GridContext<'_>, cell: &CellAddress, diag: &Diagnostics<'_>) -> Calculated {
        self.accumulate_grid(ctx, cell, diag, self.aggregate.boxed_clone())
    }

    fn bucket(&self, series: &dyn RowSeries, col: Option<usize>, row: usize) -> Bucket {
        match col {
            Some(c) => self.reset.bucket(series.get(c, row), &self.calendar),
            None => Bucket::Unbounded,
        }
    }

    fn accumulate_series(&self, cx: &mut SeriesCx<'_, '_>, mut acc: Box<dyn Reducible>) -> Calculated {
        acc.reset();
        let Some(field) = cx.field_column() else {
            return Calculated::Absent;
        };
        let dim = match &self.dimension {
            None => None,
            Some(d) => match d.resolve_in_series(cx.series) {
                Some(name) => Some(name),
                None => {
                    cx.diag.unresolved(&format_args!("dimension {d:?}"));
                    return Calculated::Invalid;
                }
            },
        };

        if let Some(break_by) = &self.break_by {
            return self.across_root(cx, acc, break_by, dim.as_deref());
        }

        let series = cx.series;
        let dim_col = reset_column(series, dim.as_deref());
        let current = self.bucket(series, dim_col, cx.row);

        let mut take = |r: usize| {
            let same = self.bucket(series, dim_col, r) == current;
            if same {
                acc.add(series.get(field, r));
            }
            same
        };
        match dim.as_deref() {
            // Only rows agreeing on every other dimension take part.
            Some(d) => {
                let view = cx.state.view(series, &Conditions::other_dimensions(series, cx.row, &[d]));
                let Some(pos) = view.position_of(cx.row) else {
                    return Calculated::Absent;
                };
                for &r in view.rows()[..=pos].iter().rev() {
                    if !take(r) {
                        break;
                    }
                }
            }
            None => {
                for r in (0..=cx.row).rev() {
                    if !take(r) {
                        break;
                    }
                }
            }
        }
        Calculated::from_f64(acc.result())
    }

    /// Break-by totals ignore sorting and filtering: walk the root series
    /// backwards while the break-by value (and the reset bucket) holds.
    fn across_root(
        &self,
        cx: &SeriesCx<'_, '_>,
        mut acc: Box<dyn Reducible>,
        break_by: &str,
        dim: Option<&str>,
    ) -> Calculated {
        let root = root_series(cx.series);
        let Some(row) = root_row(cx.series, cx.row) else {
            return Calculated::Absent;
        };
        let (Some(field), Some(brk)) = (root.column_index(cx.field), root.column_index(break_by)) else {
            cx.diag.unresolved(&format_args!("break-by dimension `{break_by}`"));
            return Calculated::Invalid;
        };
        let dim_col = reset_column(root, dim);
        let group = root.get(brk, row);
        let current = self.bucket(root, dim_col, row);

        for r in (0..=row).rev() {
            if root.get(brk, r) != group || self.bucket(root, dim_col, r) != current {
                break;
            }
            acc.add(root.get(field, r));
        }
        Calculated::from_f64(acc.result())
    }

    fn accumulate_grid(
        &self,
        ctx: &GridContext<'_>,
        cell: &CellAddress,
        diag: &Diagnostics<'_>,
        mut acc: Box<dyn Reducible>,
    ) -> Calculated {
        acc.reset();
        let Some(dim) = grid_dimension(ctx, self.dimension.as_ref(), diag) else {
            return Calculated::from_value(ctx.value(cell));
        };
        let tuple = cell.tuple(dim.axis);
        let Some(current) = tuple.get(dim.depth) else {
            return Calculated::from_value(ctx.value(cell));
        };

        let grid = ctx.grid();
        let break_depth = match &self.break_by {
            None => None,
            Some(b) => match grid.dimensions(dim.axis).iter().position(|d| d == b) {
                Some(depth) => Some(depth),
                None if grid.dimensions(dim.axis.other()).contains(b) => None,
                None => {
                    diag.unresolved(&format_args!("break-by dimension `{b}`"));
                    return Calculated::Invalid;
                }
            },
        };

        // Walk the axis at the current tuple's depth, so subtotal rows run
        // along their own level. An explicit dimension without a break-by
        // keeps the walk inside the current sibling group.
        let group = (self.dimension.is_some() && break_depth.is_none()).then(|| tuple.prefix(dim.depth));
        let mut walk: Vec<Tuple> = Vec::new();
        for t in grid.tuples(dim.axis) {
            if group.is_some_and(|g| t.prefix(dim.depth) != g) {
                continue;
            }
            let prefix = Tuple::new(t.prefix(tuple.len()).to_vec());
            if walk.last() != Some(&prefix) {
                walk.push(prefix);
            }
        }
        let Some(pos) = walk.iter().position(|t| t == tuple) else {
            return Calculated::from_value(ctx.value(cell));
        };

        let bucket = self.reset.bucket(current, &self.calendar);
        for t in walk[..=pos].iter().rev() {
            if break_depth.is_some_and(|d| t.get(d) != tuple.get(d)) {
                break;
            }
            let same_bucket = t.get(dim.depth).is_some_and(|v| self.reset.bucket(v, &self.calendar) == bucket);
            if !same_bucket {
                break;
            }
            acc.add(&ctx.value(&cell.with_tuple(dim.axis, t.clone())));
        }
        Calculated::from_f64(acc.result())
    }
}

/// Column whose dates decide resets: the running dimension, else the
/// innermost dimension of the series.
fn reset_column(series: &dyn RowSeries, dim: Option<&str>) -> Option<usize> {
    match dim {
        Some(d) => series.column_index(d),
        None => dimension_columns(series).last().copied(),
    }
}

/// Running total of growth rates, compounded: `[0.1, 0.2]` yields `0.32`.
pub struct CompoundGrowth {
    running: RunningTotal,
}

impl CompoundGrowth {
    /// Compound along the traversal described by `running`; its aggregate
    /// is not used.
    pub fn new(running: RunningTotal) -> Self {
        Self { running }
    }

    pub fn running(&self) -> &RunningTotal {
        &self.running
    }

    pub(crate) fn series(&self, cx: &mut SeriesCx<'_, '_>) -> Calculated {
        self.running.accumulate_series(cx, Box::new(Growth::compound()))
    }

    pub(crate) fn grid(&self, ctx: &GridContext<'_>, cell: &CellAddress, diag: &Diagnostics<'_>) -> Calculated {
        self.running.accumulate_grid(ctx, cell, diag, Box::new(Growth::compound()))
    }
}

impl Default for CompoundGrowth {
    fn default() -> Self {
        Self::new(RunningTotal::new(Formula::Product))
    }
}
