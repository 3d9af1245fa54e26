//! In-memory pivot grid aggregated from a row series.

use super::{Axis, PivotGrid, Tuple};
use crate::combiners::{Formula, Reducible};
use crate::series::{RowSeries, SeriesId};
use crate::value::Value;
use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashMap};

type Cells = HashMap<Tuple, HashMap<Tuple, Vec<Value>>>;

/// Crosstab with every subtotal and grand-total cell precomputed.
pub struct MemGrid {
    id: SeriesId,
    row_dims: Vec<String>,
    col_dims: Vec<String>,
    measures: Vec<String>,
    row_tuples: Vec<Tuple>,
    col_tuples: Vec<Tuple>,
    cells: Cells,
    others: BTreeSet<Value>,
}

impl MemGrid {
    /// Group `series` by `rows` x `cols` and aggregate each `(measure, formula)`.
    ///
    /// Every prefix of each row/column key is aggregated too, so subtotal and
    /// grand-total tuples can be looked up like any other cell.
    pub fn build(
        series: &dyn RowSeries,
        rows: &[&str],
        cols: &[&str],
        measures: &[(&str, Formula)],
    ) -> Result<Self> {
        let index = |name: &str| {
            series.column_index(name).with_context(|| format!("series has no column named `{name}`"))
        };
        let row_idx = rows.iter().map(|&n| index(n)).collect::<Result<Vec<_>>>()?;
        let col_idx = cols.iter().map(|&n| index(n)).collect::<Result<Vec<_>>>()?;
        let measure_idx = measures.iter().map(|&(n, _)| index(n)).collect::<Result<Vec<_>>>()?;

        let mut accs: HashMap<(Tuple, Tuple), Vec<Box<dyn Reducible>>> = HashMap::new();
        let mut row_leaves = BTreeSet::new();
        let mut col_leaves = BTreeSet::new();

        for r in 0..series.row_count() {
            let rk: Vec<Value> = row_idx.iter().map(|&c| series.get(c, r).clone()).collect();
            let ck: Vec<Value> = col_idx.iter().map(|&c| series.get(c, r).clone()).collect();
            for i in 0..=rk.len() {
                for j in 0..=ck.len() {
                    let key = (Tuple::new(rk[..i].to_vec()), Tuple::new(ck[..j].to_vec()));
                    let cell = accs
                        .entry(key)
                        .or_insert_with(|| measures.iter().map(|(_, f)| f.accumulator()).collect());
                    for (acc, &m) in cell.iter_mut().zip(&measure_idx) {
                        acc.add(series.get(m, r));
                    }
                }
            }
            row_leaves.insert(Tuple::new(rk));
            col_leaves.insert(Tuple::new(ck));
        }

        let mut cells: Cells = HashMap::new();
        for ((rt, ct), cell) in accs {
            let values = cell.iter().map(|a| a.result().into()).collect();
            cells.entry(rt).or_default().insert(ct, values);
        }

        Ok(Self {
            id: SeriesId::next(),
            row_dims: rows.iter().map(|s| (*s).to_string()).collect(),
            col_dims: cols.iter().map(|s| (*s).to_string()).collect(),
            measures: measures.iter().map(|(n, _)| (*n).to_string()).collect(),
            row_tuples: row_leaves.into_iter().collect(),
            col_tuples: col_leaves.into_iter().collect(),
            cells,
            others: BTreeSet::new(),
        })
    }

    /// Mark `v` as the overflow ("others") bucket.
    #[must_use]
    pub fn with_others(mut self, v: Value) -> Self {
        self.others.insert(v);
        self
    }
}

impl PivotGrid for MemGrid {
    fn id(&self) -> SeriesId {
        self.id
    }

    fn dimensions(&self, axis: Axis) -> &[String] {
        match axis {
            Axis::Row => &self.row_dims,
            Axis::Column => &self.col_dims,
        }
    }

    fn measures(&self) -> &[String] {
        &self.measures
    }

    fn value(&self, row: &Tuple, col: &Tuple, measure: usize) -> Value {
        self.cells
            .get(row)
            .and_then(|c| c.get(col))
            .and_then(|m| m.get(measure))
            .cloned()
            .unwrap_or_default()
    }

    fn tuples(&self, axis: Axis) -> &[Tuple] {
        match axis {
            Axis::Row => &self.row_tuples,
            Axis::Column => &self.col_tuples,
        }
    }

    fn is_others(&self, v: &Value) -> bool {
        self.others.contains(v)
    }
}
