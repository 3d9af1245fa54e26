//! Builders for assembling test series column by column.

use crate::series::{ColumnMeta, MemSeries};
use crate::value::Value;
use anyhow::{Result, ensure};

/// A fluent builder for [`MemSeries`].
///
/// Columns are added whole; every column must end up with the same length.
///
/// # Example
///
/// ```
/// use ironbeam_calc::Value;
/// use ironbeam_calc::series::RowSeries;
/// use ironbeam_calc::testing::SeriesBuilder;
///
/// let s = SeriesBuilder::new()
///     .dimension("region", ["east", "west"])
///     .measure("sales", [10.0, 20.0])
///     .build()
///     .unwrap();
///
/// assert_eq!(s.row_count(), 2);
/// assert_eq!(s.data("region", 1), &Value::text("west"));
/// ```
#[derive(Default)]
pub struct SeriesBuilder {
    columns: Vec<(ColumnMeta, Vec<Value>)>,
}

impl SeriesBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dimension (grouping) column.
    #[must_use]
    pub fn dimension<V: Into<Value>>(mut self, name: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.columns.push((ColumnMeta::dimension(name), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Add a measure (aggregated) column.
    #[must_use]
    pub fn measure<V: Into<Value>>(mut self, name: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.columns.push((ColumnMeta::measure(name), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Add a date dimension from `(year, month, day)` triples.
    #[must_use]
    pub fn dates(mut self, name: &str, days: impl IntoIterator<Item = (i32, u32, u32)>) -> Self {
        let values = days.into_iter().map(|(y, m, d)| Value::ymd(y, m, d)).collect();
        self.columns.push((ColumnMeta::dimension(name), values));
        self
    }

    /// Number of columns added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Build the series.
    ///
    /// # Errors
    ///
    /// Fails when the columns do not all have the same length.
    pub fn build(self) -> Result<MemSeries> {
        let rows = self.columns.first().map_or(0, |(_, v)| v.len());
        for (meta, values) in &self.columns {
            ensure!(
                values.len() == rows,
                "column `{}` has {} values, expected {rows}",
                meta.name,
                values.len()
            );
        }
        let (metas, mut cols): (Vec<ColumnMeta>, Vec<std::vec::IntoIter<Value>>) =
            self.columns.into_iter().map(|(m, v)| (m, v.into_iter())).unzip();
        let data = (0..rows).map(|_| cols.iter_mut().map(|c| c.next().unwrap_or_default()).collect()).collect();
        MemSeries::from_rows(metas, data)
    }
}
