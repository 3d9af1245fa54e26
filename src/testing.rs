//! Testing utilities for calculator columns.
//!
//! This module provides helpers for end-users writing tests against their own
//! calculator configurations. It includes:
//!
//! - **Assertions**: compare calculator outputs with float tolerance
//! - **Series builders**: assemble row series column by column
//! - **Fixtures**: small ready-made datasets (monthly, regional, yearly)
//!
//! # Quick Start
//!
//! ```
//! use ironbeam_calc::*;
//! use ironbeam_calc::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let series = SeriesBuilder::new()
//!     .dimension("month", [1, 2, 3, 4])
//!     .measure("sales", [1.0, 2.0, 3.0, 4.0])
//!     .build()?;
//!
//! let avg = CalcColumn::new("avg", "sales", Moving::new(Formula::Average).previous(1).next(1));
//! let out = Runner::sequential().run_series(&[avg], &series);
//! assert_numbers(&out[0], &[1.5, 2.0, 3.0, 3.5]);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
