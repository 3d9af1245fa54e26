use anyhow::Result;
use ironbeam_calc::runner::{evaluate_grid, evaluate_series};
use ironbeam_calc::testing::*;
use ironbeam_calc::*;

fn month(m: u32) -> Value {
    Value::ymd(2024, m, 1)
}

/// Region x month on the row axis, nothing on columns.
fn by_region() -> Result<MemGrid> {
    MemGrid::build(&regional_sales()?, &["region", "month"], &[], &[("sales", Formula::Sum)])
}

fn leaves() -> Vec<CellAddress> {
    ["east", "west"]
        .into_iter()
        .flat_map(|r| (1..=3).map(move |m| CellAddress::new(vec![Value::text(r), month(m)], Tuple::empty(), 0)))
        .collect()
}

fn region_total(r: &str) -> CellAddress {
    CellAddress::new(vec![Value::text(r)], Tuple::empty(), 0)
}

#[test]
fn moving_window_over_siblings() -> Result<()> {
    let g = by_region()?;
    let sum = CalcColumn::new("sum", "sales", Moving::new(Formula::Sum).previous(1));
    assert_numbers(&evaluate_grid(&sum, &g, &leaves()), &[1.0, 3.0, 5.0, 10.0, 30.0, 50.0]);
    Ok(())
}

#[test]
fn totals_are_suppressed_unless_enabled() -> Result<()> {
    let g = by_region()?;
    let cells = [region_total("east"), region_total("west")];

    let sum = CalcColumn::new("sum", "sales", Moving::new(Formula::Sum).previous(1));
    assert_all(&evaluate_grid(&sum, &g, &cells), Calculated::is_invalid);

    let running = CalcColumn::new("total", "sales", RunningTotal::new(Formula::Sum).dimension("region"))
        .calc_on_totals(true);
    assert_numbers(&evaluate_grid(&running, &g, &cells), &[6.0, 66.0]);
    Ok(())
}

#[test]
fn running_total_across_the_axis() -> Result<()> {
    let g = by_region()?;
    let total = CalcColumn::new("total", "sales", RunningTotal::new(Formula::Sum));
    assert_numbers(&evaluate_grid(&total, &g, &leaves()), &[1.0, 3.0, 6.0, 16.0, 36.0, 66.0]);

    let by_group = CalcColumn::new("total", "sales", RunningTotal::new(Formula::Sum).break_by("region"));
    assert_numbers(&evaluate_grid(&by_group, &g, &leaves()), &[1.0, 3.0, 6.0, 10.0, 30.0, 60.0]);
    Ok(())
}

#[test]
fn compound_growth_along_the_axis() -> Result<()> {
    let s = SeriesBuilder::new()
        .dimension("period", [1, 2, 3])
        .measure("rate", [0.1, 0.2, 0.5])
        .build()?;
    let g = MemGrid::build(&s, &["period"], &[], &[("rate", Formula::Sum)])?;
    let cells: Vec<CellAddress> =
        (1..=3).map(|p| CellAddress::new(vec![Value::from(p)], Tuple::empty(), 0)).collect();
    let growth = CalcColumn::new("growth", "rate", CompoundGrowth::default());
    assert_numbers(&evaluate_grid(&growth, &g, &cells), &[0.1, 0.32, 0.98]);
    Ok(())
}

#[test]
fn previous_stays_inside_the_group() -> Result<()> {
    let g = by_region()?;
    let prev = CalcColumn::new("prev", "sales", ValueOf::new("month", Comparison::Previous));
    let out = evaluate_grid(&prev, &g, &leaves());
    assert_calculated_eq(
        &out,
        &[
            Calculated::Invalid,
            Calculated::number(1.0),
            Calculated::number(2.0),
            Calculated::Invalid,
            Calculated::number(10.0),
            Calculated::number(20.0),
        ],
    );
    Ok(())
}

#[test]
fn first_reads_through_a_column_total() -> Result<()> {
    let g = MemGrid::build(&regional_sales()?, &["month"], &["region"], &[("sales", Formula::Sum)])?;
    let first = CalcColumn::new("first", "sales", ValueOf::new("month", Comparison::First));

    // The column grand total sits below the month level, so it can be read.
    let anchored = CellAddress::new(vec![month(3)], Tuple::empty(), 0);
    assert_eq!(evaluate_grid(&first, &g, &[anchored]), vec![Calculated::number(11.0)]);

    // The row grand total has no month to anchor on.
    let above = CellAddress::new(Tuple::empty(), vec![Value::text("west")], 0);
    assert_eq!(evaluate_grid(&first, &g, &[above]), vec![Calculated::Invalid]);

    // Dynamic comparisons never read totals.
    let prev = CalcColumn::new("prev", "sales", ValueOf::new("month", Comparison::Previous));
    let total = CellAddress::new(vec![month(3)], Tuple::empty(), 0);
    assert_eq!(evaluate_grid(&prev, &g, &[total]), vec![Calculated::Invalid]);
    Ok(())
}

#[test]
fn change_against_the_previous_month() -> Result<()> {
    let g = by_region()?;
    let mom = CalcColumn::new("mom", "sales", Change::new(ValueOf::new("month", Comparison::PreviousMonth)));
    let out = evaluate_grid(&mom, &g, &leaves());
    assert_eq!(out[0], Calculated::Invalid);
    assert_numbers(&out[1..3], &[1.0, 1.0]);
    assert_eq!(out[3], Calculated::Invalid);
    assert_numbers(&out[4..], &[10.0, 10.0]);
    Ok(())
}

#[test]
fn percent_passes_the_cell_through() -> Result<()> {
    let g = by_region()?;
    let pct = CalcColumn::new("pct", "sales", Percent::grand_total());
    assert_numbers(&evaluate_grid(&pct, &g, &leaves()), &[1.0, 2.0, 3.0, 10.0, 20.0, 30.0]);
    Ok(())
}

#[test]
fn others_bucket_has_no_dynamic_comparison() -> Result<()> {
    let g = by_region()?.with_others(Value::text("west"));
    let cells = [
        CellAddress::new(vec![Value::text("east"), month(1)], Tuple::empty(), 0),
        CellAddress::new(vec![Value::text("west"), month(1)], Tuple::empty(), 0),
    ];
    let next = CalcColumn::new("next", "sales", ValueOf::new("region", Comparison::Next));
    let out = evaluate_grid(&next, &g, &cells);
    assert_calculated_eq(&out, &[Calculated::number(10.0), Calculated::Invalid]);
    Ok(())
}

#[test]
fn unresolved_dimension_is_invalid() -> Result<()> {
    let g = by_region()?;
    let sum = CalcColumn::new("sum", "sales", Moving::new(Formula::Sum).previous(1).dimension("nope"));
    assert_all(&evaluate_grid(&sum, &g, &leaves()), Calculated::is_invalid);

    let prev = CalcColumn::new("prev", "sales", ValueOf::new("nope", Comparison::Previous));
    assert_all(&evaluate_grid(&prev, &g, &leaves()), Calculated::is_invalid);
    Ok(())
}

#[test]
fn running_total_along_a_dimension_matches_series_mode() -> Result<()> {
    let s = regional_sales()?;
    let g = by_region()?;
    let make = || CalcColumn::new("total", "sales", RunningTotal::new(Formula::Sum).dimension("month"));

    let series = evaluate_series(&make(), &s);
    let grid = evaluate_grid(&make(), &g, &leaves());
    assert_numbers(&grid, &[1.0, 3.0, 6.0, 10.0, 30.0, 60.0]);
    assert_calculated_eq(&grid, &series);
    Ok(())
}

#[test]
fn running_total_resets_at_the_year_boundary() -> Result<()> {
    let s = SeriesBuilder::new()
        .dates("date", [(2023, 12, 1), (2024, 1, 1), (2024, 2, 1)])
        .measure("sales", [5.0, 7.0, 1.0])
        .build()?;
    let g = MemGrid::build(&s, &["date"], &[], &[("sales", Formula::Sum)])?;
    let cells: Vec<CellAddress> = [(2023, 12), (2024, 1), (2024, 2)]
        .into_iter()
        .map(|(y, m)| CellAddress::new(vec![Value::ymd(y, m, 1)], Tuple::empty(), 0))
        .collect();
    let ytd = CalcColumn::new("ytd", "sales", RunningTotal::new(Formula::Sum).dimension("date").reset(Interval::Year));
    assert_numbers(&evaluate_grid(&ytd, &g, &cells), &[5.0, 7.0, 8.0]);
    Ok(())
}

#[test]
fn break_by_on_the_other_axis_is_ignored() -> Result<()> {
    let g = MemGrid::build(&regional_sales()?, &["month"], &["region"], &[("sales", Formula::Sum)])?;
    let cells: Vec<CellAddress> = ["east", "west"]
        .into_iter()
        .flat_map(|r| (1..=3).map(move |m| CellAddress::new(vec![month(m)], vec![Value::text(r)], 0)))
        .collect();
    let with_break = CalcColumn::new(
        "total",
        "sales",
        RunningTotal::new(Formula::Sum).dimension("month").break_by("region"),
    );
    let without = CalcColumn::new("total", "sales", RunningTotal::new(Formula::Sum).dimension("month"));

    let out = evaluate_grid(&with_break, &g, &cells);
    assert_numbers(&out, &[1.0, 3.0, 6.0, 10.0, 30.0, 60.0]);
    assert_calculated_eq(&out, &evaluate_grid(&without, &g, &cells));
    Ok(())
}

#[test]
fn change_on_a_missing_measure_has_no_value() -> Result<()> {
    let g = by_region()?;
    let cells: Vec<CellAddress> = leaves().into_iter().map(|c| CellAddress { measure: 3, ..c }).collect();
    let mom = CalcColumn::new("mom", "sales", Change::new(ValueOf::new("month", Comparison::Previous)));
    let out = evaluate_grid(&mom, &g, &cells);
    assert_eq!(out[0], Calculated::Invalid);
    assert_eq!(out[1], Calculated::Absent);
    assert_eq!(out[3], Calculated::Invalid);
    assert_eq!(out[5], Calculated::Absent);
    Ok(())
}
