//! Pre-built series for common calculator scenarios.
//!
//! Every fixture is sorted by its dimensions, the way a chart hands rows to
//! its calculators.

use super::builders::SeriesBuilder;
use crate::series::MemSeries;
use anyhow::Result;

/// Six months of 2024 sales: `month` (first day of each month) and
/// `sales` = 10, 20, ..., 60.
///
/// # Example
///
/// ```
/// use ironbeam_calc::series::RowSeries;
/// use ironbeam_calc::testing::monthly_sales;
///
/// let s = monthly_sales().unwrap();
/// assert_eq!(s.row_count(), 6);
/// ```
pub fn monthly_sales() -> Result<MemSeries> {
    SeriesBuilder::new()
        .dates("month", (1..=6).map(|m| (2024, m, 1)))
        .measure("sales", [10.0, 20.0, 30.0, 40.0, 50.0, 60.0])
        .build()
}

/// Two regions over the first quarter of 2024.
///
/// | region | month      | sales |
/// |--------|------------|-------|
/// | east   | 2024-01-01 | 1     |
/// | east   | 2024-02-01 | 2     |
/// | east   | 2024-03-01 | 3     |
/// | west   | 2024-01-01 | 10    |
/// | west   | 2024-02-01 | 20    |
/// | west   | 2024-03-01 | 30    |
pub fn regional_sales() -> Result<MemSeries> {
    let months = [(2024, 1, 1), (2024, 2, 1), (2024, 3, 1)];
    SeriesBuilder::new()
        .dimension("region", ["east", "east", "east", "west", "west", "west"])
        .dates("month", months.into_iter().chain(months))
        .measure("sales", [1.0, 2.0, 3.0, 10.0, 20.0, 30.0])
        .build()
}

/// One row per year from 2020 to 2023: `date` (January 1st) and
/// `sales` = 100, 150, 120, 180.
pub fn yearly_dates() -> Result<MemSeries> {
    SeriesBuilder::new()
        .dates("date", (2020..=2023).map(|y| (y, 1, 1)))
        .measure("sales", [100.0, 150.0, 120.0, 180.0])
        .build()
}
