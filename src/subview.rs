//! Condition-filtered sub-views of a base series, with a per-base cache.
//!
//! A [`SubView`] stores only the base row indices, in base order, matching a
//! set of [`Conditions`]. The [`SubViewIndex`] remembers the identity of the
//! last base series it saw and throws every cached view away as soon as a
//! different base shows up.

use crate::series::{RowSeries, SeriesId, dimension_columns};
use crate::value::Value;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Column -> required value map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Conditions {
    terms: BTreeMap<String, Value>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn equals(mut self, column: impl Into<String>, value: Value) -> Self {
        self.terms.insert(column.into(), value);
        self
    }

    /// Pin every dimension column except those in `skip` to its value at `row`.
    pub fn other_dimensions(series: &dyn RowSeries, row: usize, skip: &[&str]) -> Self {
        let mut conds = Self::new();
        for col in dimension_columns(series) {
            let name = series.header(col);
            if !skip.contains(&name) {
                conds = conds.equals(name, series.get(col, row).clone());
            }
        }
        conds
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.terms.get(column)
    }
}

/// Base rows matching some [`Conditions`].
#[derive(Debug)]
pub struct SubView {
    id: SeriesId,
    base: SeriesId,
    rows: Vec<usize>,
}

impl SubView {
    pub fn build(base: &dyn RowSeries, conds: &Conditions) -> Self {
        let cols: Vec<(Option<usize>, &Value)> =
            conds.terms.iter().map(|(name, v)| (base.column_index(name), v)).collect();

        let rows: Vec<usize> = (0..base.row_count())
            .filter(|&r| {
                cols.iter().all(|(col, want)| match col {
                    Some(c) => base.get(*c, r) == *want,
                    None => want.is_null(),
                })
            })
            .collect();

        Self { id: SeriesId::next(), base: base.id(), rows }
    }

    pub fn id(&self) -> SeriesId {
        self.id
    }

    pub fn base_id(&self) -> SeriesId {
        self.base
    }

    /// Matching base rows, in view order.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// View position of base row `base_row`.
    pub fn position_of(&self, base_row: usize) -> Option<usize> {
        self.rows.binary_search(&base_row).ok()
    }
}

/// Cache of sub-views over the most recently seen base series.
#[derive(Debug, Default)]
pub struct SubViewIndex {
    base: Option<SeriesId>,
    views: HashMap<Conditions, Arc<SubView>>,
}

impl SubViewIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sub-view of `base` matching `conds`, built on first request.
    pub fn view(&mut self, base: &dyn RowSeries, conds: &Conditions) -> Arc<SubView> {
        if self.base != Some(base.id()) {
            if !self.views.is_empty() {
                debug!("sub-view index: base changed to {:?}, dropping {} views", base.id(), self.views.len());
            }
            self.views.clear();
            self.base = Some(base.id());
        }
        if let Some(v) = self.views.get(conds) {
            return Arc::clone(v);
        }
        let view = Arc::new(SubView::build(base, conds));
        debug!("sub-view index: built view {:?} with {} rows", view.id(), view.len());
        self.views.insert(conds.clone(), Arc::clone(&view));
        view
    }

    pub fn clear(&mut self) {
        self.views.clear();
        self.base = None;
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{ColumnMeta, MemSeries};

    fn sales() -> MemSeries {
        MemSeries::from_rows(
            vec![ColumnMeta::dimension("region"), ColumnMeta::dimension("month"), ColumnMeta::measure("sales")],
            vec![
                vec![Value::text("east"), Value::number(2.0), Value::number(10.0)],
                vec![Value::text("west"), Value::number(1.0), Value::number(20.0)],
                vec![Value::text("east"), Value::number(1.0), Value::number(30.0)],
                vec![Value::text("west"), Value::number(2.0), Value::number(40.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn filters_in_base_order() {
        let s = sales();
        let conds = Conditions::new().equals("region", Value::text("east"));
        let view = SubView::build(&s, &conds);
        assert_eq!(view.rows(), &[0, 2]);
        assert_eq!(view.position_of(2), Some(1));
        assert_eq!(view.position_of(1), None);
    }

    #[test]
    fn other_dimensions_pins_everything_but_skipped() {
        let s = sales();
        let conds = Conditions::other_dimensions(&s, 0, &["month"]);
        assert_eq!(conds.get("region"), Some(&Value::text("east")));
        assert!(conds.get("month").is_none());
        assert!(conds.get("sales").is_none());
    }

    #[test]
    fn unknown_columns_only_match_null() {
        let s = sales();
        let none = SubView::build(&s, &Conditions::new().equals("nope", Value::number(1.0)));
        assert!(none.is_empty());
    }

    #[test]
    fn index_caches_until_base_changes() {
        let s = sales();
        let mut idx = SubViewIndex::new();
        let conds = Conditions::new().equals("region", Value::text("west"));
        let a = idx.view(&s, &conds);
        let b = idx.view(&s, &conds);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(idx.len(), 1);

        let other = sales();
        let c = idx.view(&other, &conds);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.base_id(), other.id());
        assert_eq!(idx.len(), 1);
    }
}
