//! Batch evaluation of many calculators over one series or grid.
//!
//! Each calculator is driven by exactly one thread from its first row to its
//! `complete()` call. In parallel mode the *calculators* are spread over the
//! rayon pool; the rows of one calculator are never split.

use crate::column::Calculator;
use crate::grid::{CellAddress, GridContext, PivotGrid};
use crate::series::RowSeries;
use crate::value::Calculated;
use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    Sequential,
    /// Spread calculators across the rayon pool. `threads` sizes the global
    /// pool the first time it is built.
    #[cfg(feature = "parallel")]
    Parallel { threads: Option<usize> },
}

pub struct Runner {
    pub mode: ExecMode,
}

impl Default for Runner {
    fn default() -> Self {
        #[cfg(feature = "parallel")]
        {
            Self { mode: ExecMode::Parallel { threads: Some(num_cpus::get().max(1)) } }
        }
        #[cfg(not(feature = "parallel"))]
        {
            Self { mode: ExecMode::Sequential }
        }
    }
}

impl Runner {
    pub fn sequential() -> Self {
        Self { mode: ExecMode::Sequential }
    }

    /// Evaluate every calculator over every row of `series`.
    ///
    /// Returns one result vector per calculator, in the order given.
    pub fn run_series<C: Calculator>(&self, columns: &[C], series: &dyn RowSeries) -> Vec<Vec<Calculated>> {
        debug!("runner: {} calculators over {} rows ({:?})", columns.len(), series.row_count(), self.mode);
        self.map_columns(columns, |c| evaluate_series(c, series))
    }

    /// Evaluate every calculator at each of `cells`.
    pub fn run_grid<C: Calculator>(
        &self,
        columns: &[C],
        grid: &dyn PivotGrid,
        cells: &[CellAddress],
    ) -> Vec<Vec<Calculated>> {
        debug!("runner: {} calculators over {} cells ({:?})", columns.len(), cells.len(), self.mode);
        self.map_columns(columns, |c| evaluate_grid(c, grid, cells))
    }

    fn map_columns<C, F>(&self, columns: &[C], f: F) -> Vec<Vec<Calculated>>
    where
        C: Calculator,
        F: Fn(&C) -> Vec<Calculated> + Send + Sync,
    {
        match self.mode {
            ExecMode::Sequential => columns.iter().map(f).collect(),
            #[cfg(feature = "parallel")]
            ExecMode::Parallel { threads } => {
                if let Some(t) = threads {
                    // ok() to ignore "already built" on repeated calls
                    rayon::ThreadPoolBuilder::new().num_threads(t).build_global().ok();
                }
                columns.par_iter().map(f).collect()
            }
        }
    }
}

/// One full pass of `column` over `series`.
pub fn evaluate_series<C: Calculator + ?Sized>(column: &C, series: &dyn RowSeries) -> Vec<Calculated> {
    let n = series.row_count();
    let out = (0..n).map(|r| column.evaluate_series(series, r, r == 0, r + 1 == n)).collect();
    column.complete();
    out
}

/// One pass of `column` over `cells` of `grid`.
pub fn evaluate_grid<C: Calculator + ?Sized>(column: &C, grid: &dyn PivotGrid, cells: &[CellAddress]) -> Vec<Calculated> {
    let ctx = GridContext::new(grid);
    let out = cells.iter().map(|cell| column.evaluate_grid(&ctx, cell)).collect();
    column.complete();
    out
}
