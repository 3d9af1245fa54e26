//! Point lookups (value-of) and the change calculator built on them.

use super::state::SeriesCx;
use super::Diagnostics;
use crate::calendar::{Calendar, Period};
use crate::grid::{CellAddress, DimensionRef, GridContext};
use crate::interval::Interval;
use crate::subview::Conditions;
use crate::value::{Calculated, Value};
use serde::{Deserialize, Serialize};

/// Which member of the dimension to read the field at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    First,
    Last,
    Previous,
    Next,
    PreviousYear,
    PreviousQuarter,
    PreviousMonth,
    PreviousWeek,
    /// The label before the current one in a caller-supplied period list.
    PreviousRange,
}

impl Comparison {
    const fn period(self) -> Option<Period> {
        match self {
            Self::PreviousYear => Some(Period::Year),
            Self::PreviousQuarter => Some(Period::Quarter),
            Self::PreviousMonth => Some(Period::Month),
            Self::PreviousWeek => Some(Period::Week),
            _ => None,
        }
    }

    const fn is_static(self) -> bool {
        matches!(self, Self::First | Self::Last)
    }
}

/// The field's value at another member of `dimension`, holding every other
/// dimension at the current row's values.
pub struct ValueOf {
    dimension: DimensionRef,
    comparison: Comparison,
    date_level: Interval,
    periods: Vec<Value>,
    calendar: Calendar,
}

impl ValueOf {
    pub fn new(dimension: impl Into<DimensionRef>, comparison: Comparison) -> Self {
        Self {
            dimension: dimension.into(),
            comparison,
            date_level: Interval::None,
            periods: Vec::new(),
            calendar: Calendar::default(),
        }
    }

    /// Grouping level of the date dimension. At [`Interval::Week`], period
    /// shifts keep the week position instead of the day of month.
    #[must_use]
    pub fn date_level(mut self, level: Interval) -> Self {
        self.date_level = level;
        self
    }

    /// Ordered labels for [`Comparison::PreviousRange`].
    #[must_use]
    pub fn periods(mut self, periods: impl IntoIterator<Item = Value>) -> Self {
        self.periods = periods.into_iter().collect();
        self
    }

    #[must_use]
    pub fn calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Comparison member for date shifts and custom ranges; `None` when the
    /// shift is impossible or lands before `min`.
    fn shifted(&self, current: &Value, min: Option<&Value>) -> Option<Value> {
        if let Some(period) = self.comparison.period() {
            let shifted = self.calendar.previous(current.as_date()?, period, self.date_level == Interval::Week)?;
            if min.and_then(Value::as_date).is_some_and(|m| shifted < m) {
                return None;
            }
            return Some(Value::Date(shifted));
        }
        let label = current.to_string();
        let pos = self.periods.iter().position(|p| p == current || p.to_string() == label)?;
        pos.checked_sub(1).map(|i| self.periods[i].clone())
    }

    /// Comparison value for the current series row.
    pub(crate) fn lookup_series(&self, cx: &mut SeriesCx<'_, '_>) -> Calculated {
        let series = cx.series;
        let Some(dim) = self.dimension.resolve_in_series(series) else {
            cx.diag.unresolved(&format_args!("dimension {:?}", self.dimension));
            return Calculated::Invalid;
        };
        let Some(router) = cx.state.router(series, &dim) else {
            return Calculated::Invalid;
        };
        let current = series.data(&dim, cx.row);
        let target = match self.comparison {
            Comparison::First => router.first().cloned(),
            Comparison::Last => router.last().cloned(),
            Comparison::Previous => router.previous(current).cloned(),
            Comparison::Next => router.next(current).cloned(),
            _ => self.shifted(current, router.first()),
        };
        let Some(target) = target else {
            return Calculated::Invalid;
        };
        let Some(field) = cx.field_column() else {
            return Calculated::Absent;
        };

        let conds = Conditions::other_dimensions(series, cx.row, &[dim.as_str()]).equals(dim.as_str(), target);
        let view = cx.state.view(series, &conds);
        let row = match self.comparison {
            Comparison::Last => view.rows().last(),
            _ => view.rows().first(),
        };
        match row {
            Some(&r) => Calculated::from_value(series.get(field, r).clone()),
            None => Calculated::Absent,
        }
    }

    /// Comparison value for a grid cell.
    pub(crate) fn lookup_grid(&self, ctx: &GridContext<'_>, cell: &CellAddress, diag: &Diagnostics<'_>) -> Calculated {
        let Some(dim) = ctx.resolve(&self.dimension) else {
            diag.unresolved(&format_args!("dimension {:?}", self.dimension));
            return Calculated::Invalid;
        };
        let grid = ctx.grid();
        let tuple = cell.tuple(dim.axis);
        let Some(current) = tuple.get(dim.depth) else {
            return Calculated::Invalid;
        };
        if !self.comparison.is_static() && grid.is_others(current) {
            return Calculated::Invalid;
        }

        let members = || -> Vec<Value> {
            grid.dimension_values(&dim.name).into_iter().filter(|v| !grid.is_others(v)).collect()
        };
        let target = match self.comparison {
            Comparison::First => members().into_iter().next(),
            Comparison::Last => members().pop(),
            Comparison::Previous | Comparison::Next => {
                let siblings = grid.siblings(dim.axis, tuple, dim.depth);
                let pos = siblings.iter().position(|v| v == current);
                let idx = match self.comparison {
                    Comparison::Previous => pos.and_then(|p| p.checked_sub(1)),
                    _ => pos.map(|p| p + 1),
                };
                idx.and_then(|i| siblings.get(i).cloned())
            }
            _ => self.shifted(current, members().iter().min()),
        };
        let Some(target) = target else {
            return Calculated::Invalid;
        };
        let at = cell.with_tuple(dim.axis, tuple.with(dim.depth, target));
        Calculated::from_value(ctx.value(&at))
    }

    /// First/last lookups may be anchored at a total below the comparison
    /// dimension and still read it.
    pub(crate) fn anchors_total(&self, ctx: &GridContext<'_>, cell: &CellAddress) -> bool {
        self.comparison.is_static()
            && ctx.resolve(&self.dimension).is_some_and(|d| cell.tuple(d.axis).len() > d.depth)
    }

    pub(crate) fn series(&self, cx: &mut SeriesCx<'_, '_>) -> Calculated {
        self.lookup_series(cx)
    }

    pub(crate) fn grid(&self, ctx: &GridContext<'_>, cell: &CellAddress, diag: &Diagnostics<'_>) -> Calculated {
        self.lookup_grid(ctx, cell, diag)
    }
}

/// Difference between the current value and a [`ValueOf`] comparison value.
pub struct Change {
    lookup: ValueOf,
    percent: bool,
    missing_as_zero: bool,
    preview: bool,
}

impl Change {
    pub fn new(lookup: ValueOf) -> Self {
        Self { lookup, percent: false, missing_as_zero: true, preview: false }
    }

    /// Report `(val - cval) / cval` instead of `val - cval`.
    #[must_use]
    pub fn percent(mut self, yes: bool) -> Self {
        self.percent = yes;
        self
    }

    /// Count missing values as zero.
    #[must_use]
    pub fn missing_as_zero(mut self, yes: bool) -> Self {
        self.missing_as_zero = yes;
        self
    }

    /// Placeholder data: report `cval` (or `1` in percent mode) instead of the change.
    #[must_use]
    pub fn preview(mut self, yes: bool) -> Self {
        self.preview = yes;
        self
    }

    pub fn lookup(&self) -> &ValueOf {
        &self.lookup
    }

    fn combine(&self, val: &Value, cval: Calculated) -> Calculated {
        let cval = match cval {
            Calculated::Invalid => return Calculated::Invalid,
            Calculated::Absent if self.missing_as_zero => 0.0,
            Calculated::Absent => return Calculated::Absent,
            Calculated::Value(v) => v.as_f64_or_zero(),
        };
        let val = match val {
            Value::Null if self.missing_as_zero => 0.0,
            Value::Null => return Calculated::Absent,
            v => v.as_f64_or_zero(),
        };
        if self.percent && cval == 0.0 {
            return Calculated::Absent;
        }
        if self.preview {
            return Calculated::number(if self.percent { 1.0 } else { cval });
        }
        if self.percent {
            Calculated::number((val - cval) / cval)
        } else {
            Calculated::number(val - cval)
        }
    }

    pub(crate) fn series(&self, cx: &mut SeriesCx<'_, '_>) -> Calculated {
        let cval = self.lookup.lookup_series(cx);
        if cval.is_invalid() || cx.series.column_index(cx.field).is_none() {
            return cval;
        }
        self.combine(cx.series.data(cx.field, cx.row), cval)
    }

    pub(crate) fn grid(&self, ctx: &GridContext<'_>, cell: &CellAddress, diag: &Diagnostics<'_>) -> Calculated {
        let cval = self.lookup.lookup_grid(ctx, cell, diag);
        if cval.is_invalid() {
            return cval;
        }
        if ctx.grid().measures().get(cell.measure).is_none() {
            diag.unresolved(&format_args!("measure #{}", cell.measure));
            return Calculated::Absent;
        }
        self.combine(&ctx.value(cell), cval)
    }
}
