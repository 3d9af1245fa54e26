//! Percent of a group or grand total.

use super::state::SeriesCx;
use crate::grid::{CellAddress, DimensionRef, GridContext};
use crate::series::{dimension_columns, root_series};
use crate::totals::{GroupKey, PercentTotalCache};
use crate::value::Calculated;

/// Which total the current value is divided by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PercentLevel {
    /// Total over the un-filtered root series.
    GrandTotal,
    /// Total over rows sharing every dimension value from the outermost one
    /// down to (and including) this dimension.
    Group(DimensionRef),
}

/// Share of a total. In grid mode the cell is passed through unchanged: the
/// grid already carries the divided value.
pub struct Percent {
    level: PercentLevel,
    totals: PercentTotalCache,
}

impl Percent {
    pub fn new(level: PercentLevel) -> Self {
        Self { level, totals: PercentTotalCache::new() }
    }

    pub fn grand_total() -> Self {
        Self::new(PercentLevel::GrandTotal)
    }

    pub fn of_group(dim: impl Into<DimensionRef>) -> Self {
        Self::new(PercentLevel::Group(dim.into()))
    }

    pub fn level(&self) -> &PercentLevel {
        &self.level
    }

    pub(crate) fn clear(&self) {
        self.totals.clear();
    }

    pub(crate) fn series(&self, cx: &mut SeriesCx<'_, '_>) -> Calculated {
        let series = cx.series;
        let val = series.data(cx.field, cx.row);
        if val.is_null() {
            return Calculated::Absent;
        }
        let Some(val) = val.as_f64() else {
            return Calculated::number(0.0);
        };

        let total = match &self.level {
            PercentLevel::GrandTotal => {
                self.totals.total(root_series(series), cx.field, &[], &GroupKey::GrandTotal)
            }
            PercentLevel::Group(d) => {
                let Some(name) = d.resolve_in_series(series) else {
                    cx.diag.unresolved(&format_args!("dimension {d:?}"));
                    return Calculated::Absent;
                };
                let dims = dimension_columns(series);
                let Some(depth) = dims.iter().position(|&c| series.header(c) == name) else {
                    cx.diag.unresolved(&format_args!("dimension `{name}`"));
                    return Calculated::Absent;
                };
                let chain = &dims[..=depth];
                let columns: Vec<String> = chain.iter().map(|&c| series.header(c).to_string()).collect();
                let group = GroupKey::Values(chain.iter().map(|&c| series.get(c, cx.row).clone()).collect());
                self.totals.total(series, cx.field, &columns, &group)
            }
        };

        match total {
            Some(t) if t != 0.0 => Calculated::number(val / t),
            _ => Calculated::Absent,
        }
    }

    pub(crate) fn grid(&self, ctx: &GridContext<'_>, cell: &CellAddress) -> Calculated {
        Calculated::from_value(ctx.value(cell))
    }
}
