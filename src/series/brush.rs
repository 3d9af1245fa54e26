//! Brush overlay: brushed rows stacked on top of the full data.

use super::{BrushSplit, RowSeries, SeriesId};
use crate::value::{NULL, Value};
use std::sync::Arc;

/// A series made of two partitions sharing one column layout.
///
/// Rows `0..brushed.row_count()` read from the brushed partition, the
/// remaining rows from the all-data partition.
pub struct BrushedSeries {
    id: SeriesId,
    brushed: Arc<dyn RowSeries>,
    all: Arc<dyn RowSeries>,
}

impl BrushedSeries {
    pub fn new(brushed: Arc<dyn RowSeries>, all: Arc<dyn RowSeries>) -> Self {
        Self { id: SeriesId::next(), brushed, all }
    }
}

impl RowSeries for BrushedSeries {
    fn id(&self) -> SeriesId {
        self.id
    }

    fn row_count(&self) -> usize {
        self.brushed.row_count() + self.all.row_count()
    }

    fn column_count(&self) -> usize {
        self.all.column_count()
    }

    fn header(&self, col: usize) -> &str {
        self.all.header(col)
    }

    fn is_measure(&self, col: usize) -> bool {
        self.all.is_measure(col)
    }

    fn get(&self, col: usize, row: usize) -> &Value {
        match self.brush().and_then(|b| b.locate(row)) {
            Some((part, r)) => part.get(col, r),
            None => &NULL,
        }
    }

    fn brush(&self) -> Option<BrushSplit<'_>> {
        Some(BrushSplit { brushed: self.brushed.as_ref(), all: self.all.as_ref() })
    }
}
