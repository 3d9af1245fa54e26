//! Per-column caches and the evaluation context handed to series algorithms.

use super::Diagnostics;
use crate::router::DimensionRouter;
use crate::series::{RowSeries, SeriesId};
use crate::subview::{Conditions, SubView, SubViewIndex};
use log::{debug, trace};
use std::collections::HashMap;
use std::sync::Arc;

/// Whether a series turned out to be a brush overlay.
#[derive(Clone, Copy, Debug)]
struct BrushState {
    series: SeriesId,
    brushed: bool,
}

/// Caches owned by one calculator column; guarded by the column's mutex.
#[derive(Debug, Default)]
pub(crate) struct ColumnState {
    pass: Option<SeriesId>,
    brush: Option<BrushState>,
    views: SubViewIndex,
    routers: HashMap<(SeriesId, String), Arc<DimensionRouter>>,
}

impl ColumnState {
    /// Start a pass over `series`, dropping caches left by another series.
    pub(crate) fn begin_pass(&mut self, series: SeriesId) {
        if self.pass.is_some_and(|p| p != series) {
            debug!("calculator state: new pass over {series:?}, dropping {} routers", self.routers.len());
            self.clear();
        }
        self.pass = Some(series);
    }

    /// Partition and local row that `row` of `series` must be evaluated in.
    ///
    /// Plain series evaluate in place. Brush overlays evaluate each row inside
    /// the partition it came from; rows past both partitions have no value.
    pub(crate) fn active<'s>(
        &mut self,
        series: &'s dyn RowSeries,
        row: usize,
    ) -> Option<(&'s dyn RowSeries, usize)> {
        let brushed = match self.brush {
            Some(b) if b.series == series.id() => b.brushed,
            _ => {
                let brushed = series.brush().is_some();
                trace!("calculator state: series {:?} brushed = {brushed}", series.id());
                self.brush = Some(BrushState { series: series.id(), brushed });
                brushed
            }
        };
        if !brushed {
            return (row < series.row_count()).then_some((series, row));
        }
        series.brush()?.locate(row)
    }

    /// Router over `column` of `series`, built once per series version.
    pub(crate) fn router(&mut self, series: &dyn RowSeries, column: &str) -> Option<Arc<DimensionRouter>> {
        let key = (series.id(), column.to_string());
        if let Some(r) = self.routers.get(&key) {
            return Some(Arc::clone(r));
        }
        let router = Arc::new(DimensionRouter::build(series, column)?);
        debug!("calculator state: router over `{column}` with {} values", router.len());
        self.routers.insert(key, Arc::clone(&router));
        Some(router)
    }

    pub(crate) fn view(&mut self, base: &dyn RowSeries, conds: &Conditions) -> Arc<SubView> {
        self.views.view(base, conds)
    }

    pub(crate) fn clear(&mut self) {
        self.pass = None;
        self.brush = None;
        self.views.clear();
        self.routers.clear();
    }
}

/// Everything a series algorithm needs to evaluate one row.
pub(crate) struct SeriesCx<'s, 'c> {
    /// The partition being evaluated (the whole series unless brushed).
    pub series: &'s dyn RowSeries,
    pub row: usize,
    pub field: &'c str,
    pub state: &'c mut ColumnState,
    pub diag: Diagnostics<'c>,
}

impl SeriesCx<'_, '_> {
    pub(crate) fn field_column(&self) -> Option<usize> {
        let col = self.series.column_index(self.field);
        if col.is_none() {
            self.diag.unresolved(&format_args!("field `{}`", self.field));
        }
        col
    }
}
