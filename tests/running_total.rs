use anyhow::Result;
use ironbeam_calc::runner::evaluate_series;
use ironbeam_calc::testing::*;
use ironbeam_calc::*;
use std::sync::Arc;

#[test]
fn cumulative_sum() -> Result<()> {
    let s = SeriesBuilder::new()
        .dimension("k", ["a", "b", "c"])
        .measure("v", [1.0, 2.0, 3.0])
        .build()?;
    let total = CalcColumn::new("total", "v", RunningTotal::new(Formula::Sum));
    assert_numbers(&evaluate_series(&total, &s), &[1.0, 3.0, 6.0]);
    Ok(())
}

#[test]
fn year_reset_restarts_at_new_year() -> Result<()> {
    let s = SeriesBuilder::new()
        .dates("date", [(2023, 12, 31), (2024, 1, 1)])
        .measure("v", [5.0, 7.0])
        .build()?;

    let reset = CalcColumn::new("ytd", "v", RunningTotal::new(Formula::Sum).dimension("date").reset(Interval::Year));
    assert_numbers(&evaluate_series(&reset, &s), &[5.0, 7.0]);

    let plain = CalcColumn::new("all", "v", RunningTotal::new(Formula::Sum).dimension("date"));
    assert_numbers(&evaluate_series(&plain, &s), &[5.0, 12.0]);
    Ok(())
}

#[test]
fn month_reset() -> Result<()> {
    let s = SeriesBuilder::new()
        .dates("date", [(2024, 1, 30), (2024, 1, 31), (2024, 2, 1), (2024, 2, 2)])
        .measure("v", [1.0, 2.0, 3.0, 4.0])
        .build()?;
    let mtd = CalcColumn::new("mtd", "v", RunningTotal::new(Formula::Sum).dimension("date").reset(Interval::Month));
    assert_numbers(&evaluate_series(&mtd, &s), &[1.0, 3.0, 3.0, 7.0]);
    Ok(())
}

#[test]
fn reset_without_dimension_uses_innermost_date() -> Result<()> {
    let s = SeriesBuilder::new()
        .dates("date", [(2023, 12, 30), (2023, 12, 31), (2024, 1, 1)])
        .measure("v", [1.0, 2.0, 3.0])
        .build()?;
    let ytd = CalcColumn::new("ytd", "v", RunningTotal::new(Formula::Sum).reset(Interval::Year));
    assert_numbers(&evaluate_series(&ytd, &s), &[1.0, 3.0, 3.0]);
    Ok(())
}

#[test]
fn running_along_a_dimension_keeps_groups_apart() -> Result<()> {
    let s = regional_sales()?;
    let by_month = CalcColumn::new("total", "sales", RunningTotal::new(Formula::Sum).dimension("month"));
    assert_numbers(&evaluate_series(&by_month, &s), &[1.0, 3.0, 6.0, 10.0, 30.0, 60.0]);

    let whole = CalcColumn::new("total", "sales", RunningTotal::new(Formula::Sum));
    assert_numbers(&evaluate_series(&whole, &s), &[1.0, 3.0, 6.0, 16.0, 36.0, 66.0]);
    Ok(())
}

#[test]
fn break_by_follows_the_root_series() -> Result<()> {
    let root: Arc<dyn RowSeries> = Arc::new(regional_sales()?);
    let total = CalcColumn::new("total", "sales", RunningTotal::new(Formula::Sum).break_by("region"));
    assert_numbers(&evaluate_series(&total, root.as_ref()), &[1.0, 3.0, 6.0, 10.0, 30.0, 60.0]);

    // Re-sorting by month interleaves the regions; the totals still follow
    // each row's position in the root series.
    let by_month = FilteredSeries::sorted(Arc::clone(&root), &["month"]);
    assert_numbers(&evaluate_series(&total, &by_month), &[1.0, 10.0, 3.0, 30.0, 6.0, 60.0]);
    Ok(())
}

#[test]
fn unknown_break_by_is_invalid() -> Result<()> {
    let s = regional_sales()?;
    let total = CalcColumn::new("total", "sales", RunningTotal::new(Formula::Sum).break_by("nope"));
    assert_all(&evaluate_series(&total, &s), Calculated::is_invalid);
    Ok(())
}

#[test]
fn compound_growth() -> Result<()> {
    let s = SeriesBuilder::new()
        .dimension("period", [1, 2])
        .measure("rate", [0.1, 0.2])
        .build()?;
    let growth = CalcColumn::new("growth", "rate", CompoundGrowth::default());
    assert_numbers(&evaluate_series(&growth, &s), &[0.1, 0.32]);
    Ok(())
}

#[test]
fn compound_growth_treats_malformed_rates_as_zero() -> Result<()> {
    let s = SeriesBuilder::new()
        .dimension("period", [1, 2, 3, 4])
        .measure("rate", [Value::number(0.1), Value::text("n/a"), Value::Null, Value::number(0.2)])
        .build()?;
    let growth = CalcColumn::new("growth", "rate", CompoundGrowth::default());
    assert_numbers(&evaluate_series(&growth, &s), &[0.1, 0.1, 0.1, 0.32]);
    Ok(())
}

#[test]
fn compound_growth_resets_with_its_running_total() -> Result<()> {
    let s = SeriesBuilder::new()
        .dates("date", [(2023, 11, 1), (2023, 12, 1), (2024, 1, 1)])
        .measure("rate", [0.5, 0.5, 0.1])
        .build()?;
    let growth = CalcColumn::new(
        "growth",
        "rate",
        CompoundGrowth::new(RunningTotal::new(Formula::Sum).dimension("date").reset(Interval::Year)),
    );
    assert_numbers(&evaluate_series(&growth, &s), &[0.5, 1.25, 0.1]);
    Ok(())
}
