//! Pivot grids (crosstabs) addressed by row/column tuples.
//!
//! A [`Tuple`] lists the group values of one axis from the outermost
//! dimension inwards. A tuple shorter than the axis depth addresses a
//! subtotal; an empty tuple on an axis with dimensions addresses the grand
//! total.
//!
//! Calculators read grids only through [`PivotGrid`]. Dimension references
//! may name a dimension literally or point at "whatever is innermost on the
//! row/column axis"; [`GridContext`] resolves them against the grid's current
//! layout once per evaluation context.

mod memory;

pub use memory::MemGrid;

use crate::series::{RowSeries, SeriesId, dimension_columns};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

/// One of the two grid axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    pub const fn other(self) -> Self {
        match self {
            Self::Row => Self::Column,
            Self::Column => Self::Row,
        }
    }
}

/// Group values along one axis, outermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tuple(Vec<Value>);

impl Tuple {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// The grand-total tuple.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, depth: usize) -> Option<&Value> {
        self.0.get(depth)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Copy of this tuple with the value at `depth` replaced.
    #[must_use]
    pub fn with(&self, depth: usize, value: Value) -> Self {
        let mut values = self.0.clone();
        if let Some(slot) = values.get_mut(depth) {
            *slot = value;
        }
        Self(values)
    }

    /// The first `depth` values.
    pub fn prefix(&self, depth: usize) -> &[Value] {
        &self.0[..depth.min(self.0.len())]
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A grid cell: row tuple, column tuple and measure index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: Tuple,
    pub col: Tuple,
    pub measure: usize,
}

impl CellAddress {
    pub fn new(row: impl Into<Tuple>, col: impl Into<Tuple>, measure: usize) -> Self {
        Self { row: row.into(), col: col.into(), measure }
    }

    pub fn tuple(&self, axis: Axis) -> &Tuple {
        match axis {
            Axis::Row => &self.row,
            Axis::Column => &self.col,
        }
    }

    /// Copy of this address with the tuple on `axis` replaced.
    #[must_use]
    pub fn with_tuple(&self, axis: Axis, tuple: Tuple) -> Self {
        let mut cell = self.clone();
        match axis {
            Axis::Row => cell.row = tuple,
            Axis::Column => cell.col = tuple,
        }
        cell
    }
}

/// Read-only access to an aggregated crosstab.
pub trait PivotGrid: Send + Sync {
    fn id(&self) -> SeriesId;

    /// Dimension names of `axis`, outermost first.
    fn dimensions(&self, axis: Axis) -> &[String];

    /// Measure names, indexed by [`CellAddress::measure`].
    fn measures(&self) -> &[String];

    /// Aggregated value of a cell (subtotal and grand-total tuples included).
    fn value(&self, row: &Tuple, col: &Tuple, measure: usize) -> Value;

    /// Full-depth tuples of `axis` in display order.
    fn tuples(&self, axis: Axis) -> &[Tuple];

    /// Ordered values at `depth` among the tuples sharing `tuple`'s prefix above `depth`.
    fn siblings(&self, axis: Axis, tuple: &Tuple, depth: usize) -> Vec<Value> {
        let prefix = tuple.prefix(depth);
        let mut out: Vec<Value> = Vec::new();
        for t in self.tuples(axis) {
            if t.prefix(depth) != prefix {
                continue;
            }
            if let Some(v) = t.get(depth) {
                if !out.contains(v) {
                    out.push(v.clone());
                }
            }
        }
        out
    }

    /// Every value of `dimension` across the grid, in order of first
    /// appearance along the axis.
    fn dimension_values(&self, dimension: &str) -> Vec<Value> {
        for axis in [Axis::Row, Axis::Column] {
            if let Some(depth) = self.dimensions(axis).iter().position(|d| d == dimension) {
                let mut out: Vec<Value> = Vec::new();
                for v in self.tuples(axis).iter().filter_map(|t| t.get(depth)) {
                    if !out.contains(v) {
                        out.push(v.clone());
                    }
                }
                return out;
            }
        }
        Vec::new()
    }

    /// Whether `v` is the overflow ("others") bucket.
    fn is_others(&self, _v: &Value) -> bool {
        false
    }

    fn is_total(&self, axis: Axis, tuple: &Tuple) -> bool {
        tuple.len() < self.dimensions(axis).len()
    }

    fn is_grand_total(&self, axis: Axis, tuple: &Tuple) -> bool {
        tuple.is_empty() && !self.dimensions(axis).is_empty()
    }
}

/// A dimension named directly or relative to the grid's axis layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionRef {
    Literal(String),
    InnermostRow,
    InnermostColumn,
}

/// Where a [`DimensionRef`] landed in a concrete grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDimension {
    pub axis: Axis,
    pub depth: usize,
    pub name: String,
}

impl DimensionRef {
    pub fn literal(name: impl Into<String>) -> Self {
        Self::Literal(name.into())
    }

    /// Locate the dimension in `grid`'s current layout.
    pub fn resolve(&self, grid: &dyn PivotGrid) -> Option<ResolvedDimension> {
        let innermost = |axis: Axis| {
            let dims = grid.dimensions(axis);
            dims.last().map(|name| ResolvedDimension { axis, depth: dims.len() - 1, name: name.clone() })
        };
        match self {
            Self::InnermostRow => innermost(Axis::Row),
            Self::InnermostColumn => innermost(Axis::Column),
            Self::Literal(name) => [Axis::Row, Axis::Column].into_iter().find_map(|axis| {
                grid.dimensions(axis)
                    .iter()
                    .position(|d| d == name)
                    .map(|depth| ResolvedDimension { axis, depth, name: name.clone() })
            }),
        }
    }

    /// Column name in a row series. Innermost references pick the series'
    /// last dimension column.
    pub fn resolve_in_series(&self, series: &dyn RowSeries) -> Option<String> {
        match self {
            Self::Literal(name) => series.column_index(name).map(|_| name.clone()),
            Self::InnermostRow | Self::InnermostColumn => {
                dimension_columns(series).last().map(|&c| series.header(c).to_string())
            }
        }
    }
}

impl From<&str> for DimensionRef {
    fn from(name: &str) -> Self {
        Self::literal(name)
    }
}

/// A grid plus per-evaluation memo of resolved dimension references.
pub struct GridContext<'a> {
    grid: &'a dyn PivotGrid,
    resolved: RefCell<HashMap<DimensionRef, Option<ResolvedDimension>>>,
}

impl<'a> GridContext<'a> {
    pub fn new(grid: &'a dyn PivotGrid) -> Self {
        Self { grid, resolved: RefCell::new(HashMap::new()) }
    }

    pub fn grid(&self) -> &'a dyn PivotGrid {
        self.grid
    }

    pub fn resolve(&self, dim: &DimensionRef) -> Option<ResolvedDimension> {
        self.resolved
            .borrow_mut()
            .entry(dim.clone())
            .or_insert_with(|| dim.resolve(self.grid))
            .clone()
    }

    pub fn value(&self, cell: &CellAddress) -> Value {
        self.grid.value(&cell.row, &cell.col, cell.measure)
    }

    /// Whether either tuple of `cell` is a subtotal or grand total.
    pub fn is_total_cell(&self, cell: &CellAddress) -> bool {
        self.grid.is_total(Axis::Row, &cell.row) || self.grid.is_total(Axis::Column, &cell.col)
    }
}
