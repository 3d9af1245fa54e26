//! Row series: the flat, dimension-sorted data a chart is drawn from.
//!
//! Calculators only see a series through the [`RowSeries`] trait. A series
//! can be:
//!
//! - a plain table ([`MemSeries`]),
//! - a derived projection of a parent series (sorted or sub-set, see
//!   [`FilteredSeries`]); derived series expose their parent so a row can be
//!   walked back to the root of the filter chain,
//! - a brush overlay ([`BrushedSeries`]) that stacks a "brushed" partition on
//!   top of the "all data" partition.
//!
//! Every series carries a [`SeriesId`]. Calculators key their caches by it, so
//! a series must take a fresh id whenever its contents change.

mod brush;
mod filtered;
mod memory;

pub use brush::BrushedSeries;
pub use filtered::FilteredSeries;
pub use memory::{ColumnMeta, MemSeries};

use crate::value::{NULL, Value};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SERIES_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of one version of a series.
///
/// Ids are small, `Copy` and hashable, handed out from a process-wide
/// counter so two series never share one by accident.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct SeriesId(u64);

impl SeriesId {
    /// Allocate a new, never before used id.
    pub fn next() -> Self {
        Self(NEXT_SERIES_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Return the underlying numeric value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Read-only access to an ordered sequence of rows.
pub trait RowSeries: Send + Sync {
    fn id(&self) -> SeriesId;

    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    /// Name of column `col`.
    fn header(&self, col: usize) -> &str;

    /// Whether column `col` holds an aggregated measure (as opposed to a dimension).
    fn is_measure(&self, col: usize) -> bool;

    /// Cell at (`col`, `row`); out-of-range lookups read as null.
    fn get(&self, col: usize, row: usize) -> &Value;

    fn column_index(&self, name: &str) -> Option<usize> {
        (0..self.column_count()).find(|&c| self.header(c) == name)
    }

    /// Cell by column name; unknown columns read as null.
    fn data(&self, name: &str, row: usize) -> &Value {
        match self.column_index(name) {
            Some(col) => self.get(col, row),
            None => &NULL,
        }
    }

    /// Brush partitions when this series is a brush overlay.
    fn brush(&self) -> Option<BrushSplit<'_>> {
        None
    }

    /// Series this one was derived from.
    fn parent(&self) -> Option<&dyn RowSeries> {
        None
    }

    /// Row of [`parent`](RowSeries::parent) that `row` was derived from.
    fn parent_row(&self, _row: usize) -> Option<usize> {
        None
    }
}

/// The two halves of a brush overlay.
///
/// Rows `0..brushed.row_count()` of the overlay come from `brushed`; the rows
/// after them come from `all`.
#[derive(Clone, Copy)]
pub struct BrushSplit<'a> {
    pub brushed: &'a dyn RowSeries,
    pub all: &'a dyn RowSeries,
}

impl<'a> BrushSplit<'a> {
    /// Partition holding overlay row `row`, and the row's index inside it.
    pub fn locate(&self, row: usize) -> Option<(&'a dyn RowSeries, usize)> {
        let split = self.brushed.row_count();
        if row < split {
            Some((self.brushed, row))
        } else if row - split < self.all.row_count() {
            Some((self.all, row - split))
        } else {
            None
        }
    }
}

/// Walk the filter chain up to the un-filtered root series.
pub fn root_series(series: &dyn RowSeries) -> &dyn RowSeries {
    let mut cur = series;
    while let Some(parent) = cur.parent() {
        cur = parent;
    }
    cur
}

/// Map `row` of `series` to the matching row of [`root_series`].
pub fn root_row(series: &dyn RowSeries, row: usize) -> Option<usize> {
    let mut cur = series;
    let mut row = row;
    while let Some(parent) = cur.parent() {
        row = cur.parent_row(row)?;
        cur = parent;
    }
    Some(row)
}

/// Indices of the dimension (non-measure) columns, in header order.
pub fn dimension_columns(series: &dyn RowSeries) -> Vec<usize> {
    (0..series.column_count()).filter(|&c| !series.is_measure(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn table() -> MemSeries {
        MemSeries::from_rows(
            vec![ColumnMeta::dimension("k"), ColumnMeta::measure("v")],
            vec![
                vec![Value::text("a"), Value::number(1.0)],
                vec![Value::text("b"), Value::number(2.0)],
                vec![Value::text("c"), Value::number(3.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(SeriesId::next(), SeriesId::next());
    }

    #[test]
    fn lookups_by_name_and_out_of_range() {
        let t = table();
        assert_eq!(t.data("v", 1), &Value::number(2.0));
        assert!(t.data("missing", 0).is_null());
        assert!(t.get(1, 99).is_null());
        assert_eq!(dimension_columns(&t), vec![0]);
    }

    #[test]
    fn filter_chain_walks_back_to_root() {
        let root: Arc<dyn RowSeries> = Arc::new(table());
        let odd = Arc::new(FilteredSeries::new(Arc::clone(&root), vec![0, 2]));
        let last = FilteredSeries::new(odd, vec![1]);

        assert_eq!(last.data("k", 0), &Value::text("c"));
        assert_eq!(root_row(&last, 0), Some(2));
        assert_eq!(root_series(&last).id(), root.id());
    }

    #[test]
    fn brush_split_locates_rows() {
        let brushed: Arc<dyn RowSeries> = Arc::new(table());
        let all: Arc<dyn RowSeries> = Arc::new(table());
        let overlay = BrushedSeries::new(Arc::clone(&brushed), Arc::clone(&all));
        let split = overlay.brush().unwrap();

        let (part, row) = split.locate(1).unwrap();
        assert_eq!((part.id(), row), (brushed.id(), 1));
        let (part, row) = split.locate(4).unwrap();
        assert_eq!((part.id(), row), (all.id(), 1));
        assert!(split.locate(6).is_none());
        assert_eq!(overlay.data("k", 3), &Value::text("a"));
    }
}
