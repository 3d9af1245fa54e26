//! Ordered-index lookup over the distinct values of one dimension column.

use crate::series::RowSeries;
use crate::value::Value;
use std::collections::HashMap;

/// Distinct non-null values of a dimension in canonical (sorted) order.
#[derive(Clone, Debug, Default)]
pub struct DimensionRouter {
    column: String,
    values: Vec<Value>,
    positions: HashMap<Value, usize>,
}

impl DimensionRouter {
    /// Scan `series` once and index the distinct values of `column`.
    ///
    /// Returns `None` when the series has no such column.
    pub fn build(series: &dyn RowSeries, column: &str) -> Option<Self> {
        let col = series.column_index(column)?;
        let mut values: Vec<Value> = (0..series.row_count())
            .map(|r| series.get(col, r))
            .filter(|v| !v.is_null())
            .cloned()
            .collect();
        values.sort();
        values.dedup();
        Some(Self::from_values(column, values))
    }

    /// Index an already ordered list of distinct values.
    pub fn from_values(column: impl Into<String>, values: Vec<Value>) -> Self {
        let positions = values.iter().enumerate().map(|(i, v)| (v.clone(), i)).collect();
        Self { column: column.into(), values, positions }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn index_of(&self, v: &Value) -> Option<usize> {
        self.positions.get(v).copied()
    }

    pub fn value_at(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn first(&self) -> Option<&Value> {
        self.values.first()
    }

    pub fn last(&self) -> Option<&Value> {
        self.values.last()
    }

    pub fn previous(&self, v: &Value) -> Option<&Value> {
        let idx = self.index_of(v)?;
        idx.checked_sub(1).and_then(|i| self.values.get(i))
    }

    pub fn next(&self, v: &Value) -> Option<&Value> {
        let idx = self.index_of(v)?;
        self.values.get(idx + 1)
    }

    /// Every value ordered before `v` (empty when `v` is unknown).
    pub fn all_previous(&self, v: &Value) -> &[Value] {
        match self.index_of(v) {
            Some(idx) => &self.values[..idx],
            None => &[],
        }
    }
}
