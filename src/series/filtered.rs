//! Derived series: a sorted or sub-set projection of a parent.

use super::{RowSeries, SeriesId};
use crate::value::{NULL, Value};
use std::cmp::Ordering;
use std::sync::Arc;

/// Rows of a parent series, selected and ordered by an index mapping.
pub struct FilteredSeries {
    id: SeriesId,
    parent: Arc<dyn RowSeries>,
    rows: Vec<usize>,
}

impl FilteredSeries {
    /// Project `rows` (parent row indices, in the order they should appear).
    pub fn new(parent: Arc<dyn RowSeries>, rows: Vec<usize>) -> Self {
        Self { id: SeriesId::next(), parent, rows }
    }

    /// Keep parent rows for which `keep(parent, row)` holds.
    pub fn filter<F>(parent: Arc<dyn RowSeries>, keep: F) -> Self
    where
        F: Fn(&dyn RowSeries, usize) -> bool,
    {
        let rows = (0..parent.row_count()).filter(|&r| keep(parent.as_ref(), r)).collect();
        Self::new(parent, rows)
    }

    /// All parent rows, stably sorted by the named columns.
    pub fn sorted(parent: Arc<dyn RowSeries>, columns: &[&str]) -> Self {
        let keys: Vec<usize> = columns.iter().filter_map(|n| parent.column_index(n)).collect();
        let mut rows: Vec<usize> = (0..parent.row_count()).collect();
        rows.sort_by(|&a, &b| {
            keys.iter()
                .map(|&k| parent.get(k, a).cmp(parent.get(k, b)))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        Self::new(parent, rows)
    }
}

impl RowSeries for FilteredSeries {
    fn id(&self) -> SeriesId {
        self.id
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.parent.column_count()
    }

    fn header(&self, col: usize) -> &str {
        self.parent.header(col)
    }

    fn is_measure(&self, col: usize) -> bool {
        self.parent.is_measure(col)
    }

    fn get(&self, col: usize, row: usize) -> &Value {
        match self.rows.get(row) {
            Some(&r) => self.parent.get(col, r),
            None => &NULL,
        }
    }

    fn parent(&self) -> Option<&dyn RowSeries> {
        Some(self.parent.as_ref())
    }

    fn parent_row(&self, row: usize) -> Option<usize> {
        self.rows.get(row).copied()
    }
}
