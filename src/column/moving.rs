//! Moving (windowed) aggregates.

use super::state::SeriesCx;
use super::{Diagnostics, grid_dimension};
use crate::combiners::{Formula, Reducible};
use crate::grid::{CellAddress, DimensionRef, GridContext};
use crate::subview::Conditions;
use crate::value::Calculated;

/// Aggregate over a window of `previous` members before and `next` members
/// after the current one.
///
/// Without a dimension the window counts rows of the series. With one, it
/// counts positions in the dimension's ordered values, restricted to rows
/// whose other dimensions match the current row.
pub struct Moving {
    aggregate: Box<dyn Reducible>,
    previous: usize,
    next: usize,
    include_current: bool,
    null_if_insufficient: bool,
    dimension: Option<DimensionRef>,
}

impl Moving {
    pub fn new(formula: Formula) -> Self {
        Self::with_aggregate(formula.accumulator())
    }

    /// Window over a custom accumulator; every evaluation works on a clone.
    pub fn with_aggregate(aggregate: Box<dyn Reducible>) -> Self {
        Self {
            aggregate,
            previous: 0,
            next: 0,
            include_current: true,
            null_if_insufficient: false,
            dimension: None,
        }
    }

    #[must_use]
    pub fn previous(mut self, n: usize) -> Self {
        self.previous = n;
        self
    }

    #[must_use]
    pub fn next(mut self, n: usize) -> Self {
        self.next = n;
        self
    }

    #[must_use]
    pub fn include_current(mut self, yes: bool) -> Self {
        self.include_current = yes;
        self
    }

    /// Yield no value when the window runs past either end.
    #[must_use]
    pub fn null_if_insufficient(mut self, yes: bool) -> Self {
        self.null_if_insufficient = yes;
        self
    }

    #[must_use]
    pub fn dimension(mut self, dim: impl Into<DimensionRef>) -> Self {
        self.dimension = Some(dim.into());
        self
    }

    /// Window bounds around position `pos` of `len`, or `None` when the
    /// window is short and short windows yield nothing.
    fn bounds(&self, pos: usize, len: usize) -> Option<(usize, usize)> {
        let reach = pos.saturating_add(self.next);
        let short = pos < self.previous || reach >= len;
        if short && self.null_if_insufficient {
            return None;
        }
        let lo = pos.saturating_sub(self.previous);
        let hi = reach.min(len.saturating_sub(1));
        Some((lo, hi))
    }

    fn fresh(&self) -> Box<dyn Reducible> {
        let mut acc = self.aggregate.boxed_clone();
        acc.reset();
        acc
    }

    pub(crate) fn series(&self, cx: &mut SeriesCx<'_, '_>) -> Calculated {
        let Some(field) = cx.field_column() else {
            return Calculated::Absent;
        };
        match &self.dimension {
            None => self.over_rows(cx, field),
            Some(d) => match d.resolve_in_series(cx.series) {
                Some(dim) => self.over_dimension(cx, field, &dim),
                None => {
                    cx.diag.unresolved(&format_args!("dimension {d:?}"));
                    Calculated::Invalid
                }
            },
        }
    }

    fn over_rows(&self, cx: &SeriesCx<'_, '_>, field: usize) -> Calculated {
        let Some((lo, hi)) = self.bounds(cx.row, cx.series.row_count()) else {
            return Calculated::Absent;
        };
        let mut acc = self.fresh();
        for r in lo..=hi {
            if r != cx.row || self.include_current {
                acc.add(cx.series.get(field, r));
            }
        }
        Calculated::from_f64(acc.result())
    }

    fn over_dimension(&self, cx: &mut SeriesCx<'_, '_>, field: usize, dim: &str) -> Calculated {
        let (Some(router), Some(dim_col)) = (cx.state.router(cx.series, dim), cx.series.column_index(dim)) else {
            return Calculated::Invalid;
        };
        let Some(pos) = router.index_of(cx.series.get(dim_col, cx.row)) else {
            return Calculated::Invalid;
        };
        let Some((lo, hi)) = self.bounds(pos, router.len()) else {
            return Calculated::Absent;
        };

        let conds = Conditions::other_dimensions(cx.series, cx.row, &[dim]);
        let view = cx.state.view(cx.series, &conds);
        let mut acc = self.fresh();
        for &r in view.rows() {
            let Some(i) = router.index_of(cx.series.get(dim_col, r)) else {
                continue;
            };
            if (lo..=hi).contains(&i) && (i != pos || self.include_current) {
                acc.add(cx.series.get(field, r));
            }
        }
        Calculated::from_f64(acc.result())
    }

    pub(crate) fn grid(&self, ctx: &GridContext<'_>, cell: &CellAddress, diag: &Diagnostics<'_>) -> Calculated {
        let Some(dim) = grid_dimension(ctx, self.dimension.as_ref(), diag) else {
            return Calculated::Invalid;
        };
        let tuple = cell.tuple(dim.axis);
        let Some(current) = tuple.get(dim.depth) else {
            return Calculated::Invalid;
        };
        let siblings = ctx.grid().siblings(dim.axis, tuple, dim.depth);
        let Some(pos) = siblings.iter().position(|v| v == current) else {
            return Calculated::Invalid;
        };
        let Some((lo, hi)) = self.bounds(pos, siblings.len()) else {
            return Calculated::Absent;
        };

        let mut acc = self.fresh();
        for (i, v) in siblings.iter().enumerate().take(hi + 1).skip(lo) {
            if i == pos && !self.include_current {
                continue;
            }
            let neighbour = cell.with_tuple(dim.axis, tuple.with(dim.depth, v.clone()));
            acc.add(&ctx.value(&neighbour));
        }
        Calculated::from_f64(acc.result())
    }
}
