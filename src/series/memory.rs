//! In-memory row table.

use super::{RowSeries, SeriesId};
use crate::value::{NULL, Value};
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Name and role of one column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub measure: bool,
}

impl ColumnMeta {
    pub fn dimension(name: impl Into<String>) -> Self {
        Self { name: name.into(), measure: false }
    }

    pub fn measure(name: impl Into<String>) -> Self {
        Self { name: name.into(), measure: true }
    }
}

/// A row-major table held in memory.
///
/// Any mutation assigns a new [`SeriesId`], which is what invalidates
/// calculator caches built against the previous contents.
#[derive(Clone, Debug)]
pub struct MemSeries {
    id: SeriesId,
    columns: Vec<ColumnMeta>,
    rows: Vec<Vec<Value>>,
}

impl MemSeries {
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        Self { id: SeriesId::next(), columns, rows: Vec::new() }
    }

    /// Build a table and fill it, rejecting rows of the wrong width.
    pub fn from_rows(columns: Vec<ColumnMeta>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut s = Self::new(columns);
        for row in rows {
            s.push_row(row)?;
        }
        Ok(s)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        ensure!(
            row.len() == self.columns.len(),
            "row has {} cells but the series has {} columns",
            row.len(),
            self.columns.len()
        );
        self.rows.push(row);
        self.id = SeriesId::next();
        Ok(())
    }

    /// Stable sort by the named columns, outermost first. Unknown names are ignored.
    pub fn sort_by(&mut self, columns: &[&str]) {
        let keys: Vec<usize> = columns.iter().filter_map(|n| self.column_index(n)).collect();
        self.rows.sort_by(|a, b| {
            keys.iter()
                .map(|&k| a[k].cmp(&b[k]))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        self.id = SeriesId::next();
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }
}

impl RowSeries for MemSeries {
    fn id(&self) -> SeriesId {
        self.id
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn header(&self, col: usize) -> &str {
        self.columns.get(col).map_or("", |c| c.name.as_str())
    }

    fn is_measure(&self, col: usize) -> bool {
        self.columns.get(col).is_some_and(|c| c.measure)
    }

    fn get(&self, col: usize, row: usize) -> &Value {
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&NULL)
    }
}
