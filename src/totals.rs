//! Group totals for percent-of-total calculators.
//!
//! [`PercentTotalCache`] computes the totals of one field for every group of
//! a base series in a single linear pass, the first time that series is asked
//! about. Later lookups against the same series are hash lookups. Seeing a
//! different base series drops everything.
//!
//! The check-then-fill sequence runs under one lock owned by the cache, so
//! two threads asking the same cache never fill it twice.

use crate::series::{RowSeries, SeriesId};
use crate::value::Value;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Which rows a total covers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Every row of the series.
    GrandTotal,
    /// Rows whose group columns hold these values, outermost first.
    Values(Vec<Value>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TotalKey {
    field: String,
    group: GroupKey,
    series: SeriesId,
}

#[derive(Default)]
struct Inner {
    base: Option<SeriesId>,
    /// (field, group columns) combinations already summed for `base`.
    filled: HashSet<(String, Vec<String>)>,
    totals: HashMap<TotalKey, f64>,
}

impl Inner {
    fn fill(&mut self, base: &dyn RowSeries, field: &str, group_columns: &[String]) {
        let Some(field_col) = base.column_index(field) else {
            return;
        };
        let cols: Vec<Option<usize>> = group_columns.iter().map(|c| base.column_index(c)).collect();
        let before = self.totals.len();

        for r in 0..base.row_count() {
            let Some(v) = base.get(field_col, r).as_f64() else {
                continue;
            };
            let group = if cols.is_empty() {
                GroupKey::GrandTotal
            } else {
                GroupKey::Values(
                    cols.iter()
                        .map(|c| c.map_or(Value::Null, |c| base.get(c, r).clone()))
                        .collect(),
                )
            };
            let key = TotalKey { field: field.to_string(), group, series: base.id() };
            *self.totals.entry(key).or_insert(0.0) += v;
        }
        debug!(
            "percent totals: summed `{field}` by {group_columns:?} over {} rows into {} groups",
            base.row_count(),
            self.totals.len() - before
        );
    }
}

/// Per-calculator cache of group totals, keyed by field, group and series.
#[derive(Default)]
pub struct PercentTotalCache {
    inner: Mutex<Inner>,
}

impl PercentTotalCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sum of `field` over the rows of `base` in `group`, where groups are
    /// formed by `group_columns` (empty for the grand total).
    ///
    /// `None` when no row of the group holds a number.
    pub fn total(&self, base: &dyn RowSeries, field: &str, group_columns: &[String], group: &GroupKey) -> Option<f64> {
        let mut inner = self.lock();
        if inner.base != Some(base.id()) {
            if inner.base.is_some() {
                debug!("percent totals: base changed to {:?}, dropping {} totals", base.id(), inner.totals.len());
            }
            inner.filled.clear();
            inner.totals.clear();
            inner.base = Some(base.id());
        }

        let filled = (field.to_string(), group_columns.to_vec());
        if !inner.filled.contains(&filled) {
            inner.fill(base, field, group_columns);
            inner.filled.insert(filled);
        }

        let key = TotalKey { field: field.to_string(), group: group.clone(), series: base.id() };
        inner.totals.get(&key).copied()
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.base = None;
        inner.filled.clear();
        inner.totals.clear();
    }

    /// Number of cached totals.
    pub fn len(&self) -> usize {
        self.lock().totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{ColumnMeta, MemSeries};

    fn sales() -> MemSeries {
        MemSeries::from_rows(
            vec![ColumnMeta::dimension("region"), ColumnMeta::measure("sales")],
            vec![
                vec![Value::text("east"), Value::number(1.0)],
                vec![Value::text("east"), Value::number(3.0)],
                vec![Value::text("west"), Value::text("n/a")],
                vec![Value::text("west"), Value::number(6.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn grand_and_group_totals() {
        let s = sales();
        let cache = PercentTotalCache::new();
        assert_eq!(cache.total(&s, "sales", &[], &GroupKey::GrandTotal), Some(10.0));

        let by_region = ["region".to_string()];
        let east = GroupKey::Values(vec![Value::text("east")]);
        let west = GroupKey::Values(vec![Value::text("west")]);
        assert_eq!(cache.total(&s, "sales", &by_region, &east), Some(4.0));
        assert_eq!(cache.total(&s, "sales", &by_region, &west), Some(6.0));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn new_base_drops_old_totals() {
        let a = sales();
        let b = sales();
        let cache = PercentTotalCache::new();
        cache.total(&a, "sales", &[], &GroupKey::GrandTotal);
        cache.total(&b, "sales", &[], &GroupKey::GrandTotal);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn unknown_field_has_no_total() {
        let s = sales();
        let cache = PercentTotalCache::new();
        assert_eq!(cache.total(&s, "nope", &[], &GroupKey::GrandTotal), None);
    }
}
