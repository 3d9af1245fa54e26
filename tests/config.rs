use anyhow::Result;
use ironbeam_calc::runner::evaluate_series;
use ironbeam_calc::testing::*;
use ironbeam_calc::*;
use std::io::Write;

#[test]
fn parsed_calculators_evaluate() -> Result<()> {
    let columns = parse_configs(
        r#"[
            {"name": "total", "field": "sales", "kind": "running_total",
             "dimension": {"literal": "month"}},
            {"name": "prev", "field": "sales", "kind": "value_of",
             "dimension": {"literal": "month"}, "comparison": "previous"},
            {"name": "share", "field": "sales", "kind": "percent", "of": {"literal": "region"}}
        ]"#,
    )?;
    let s = regional_sales()?;
    let out = Runner::sequential().run_series(&columns, &s);
    assert_numbers(&out[0], &[1.0, 3.0, 6.0, 10.0, 30.0, 60.0]);
    assert_eq!(out[1][0], Calculated::Invalid);
    assert_numbers(&out[1][1..3], &[1.0, 2.0]);
    assert_numbers(&out[2][..1], &[1.0 / 6.0]);
    Ok(())
}

#[test]
fn defaults_fill_missing_settings() -> Result<()> {
    let cfg: CalcConfig = serde_json::from_str(r#"{"name": "avg", "field": "v", "kind": "moving", "previous": 2}"#)?;
    let CalcSpec::Moving(m) = &cfg.spec else {
        anyhow::bail!("expected a moving spec, got {:?}", cfg.spec);
    };
    assert_eq!(m.formula, Formula::Sum);
    assert!(m.include_current);
    assert!(!m.null_if_insufficient);
    assert!(!cfg.calc_on_totals);

    let change: CalcConfig = serde_json::from_str(
        r#"{"name": "yoy", "field": "v", "kind": "change",
            "dimension": "innermost_row", "comparison": "previous_year"}"#,
    )?;
    let CalcSpec::Change(c) = &change.spec else {
        anyhow::bail!("expected a change spec, got {:?}", change.spec);
    };
    assert!(c.missing_as_zero);
    assert!(!c.percent);
    assert_eq!(c.lookup.dimension, DimensionRef::InnermostRow);
    Ok(())
}

#[test]
fn build_carries_kind_and_flags() -> Result<()> {
    let columns = parse_configs(
        r#"[{"name": "g", "field": "rate", "kind": "compound_growth", "calc_on_totals": true}]"#,
    )?;
    assert!(matches!(columns[0].kind(), CalcKind::CompoundGrowth(_)));
    assert_eq!(columns[0].field(), "rate");
    Ok(())
}

#[test]
fn validation_errors() {
    let cases = [
        (r#"[{"name": "a", "field": " ", "kind": "percent"}]"#, "does not name a field"),
        (
            r#"[{"name": "b", "field": "v", "kind": "moving", "include_current": false}]"#,
            "moving window covers no rows",
        ),
        (
            r#"[{"name": "c", "field": "v", "kind": "value_of",
                 "dimension": {"literal": "season"}, "comparison": "previous_range"}]"#,
            "needs a list of periods",
        ),
        (
            r#"[{"name": "d", "field": "v", "kind": "running_total", "reset": "year", "break_by": "region"}]"#,
            "needs a dimension",
        ),
    ];
    for (json, expected) in cases {
        let Err(err) = parse_configs(json) else {
            panic!("{json} should not build");
        };
        assert!(err.to_string().contains(expected), "{err} does not mention {expected:?}");
    }
}

#[test]
fn malformed_json_is_reported() {
    let err = parse_configs(r#"[{"name": "x", "field": "v", "kind": "sideways"}]"#);
    assert!(matches!(err, Err(ConfigError::Json(_))));
}

#[test]
fn custom_range_from_config() -> Result<()> {
    let columns = parse_configs(
        r#"[{"name": "prev", "field": "sales", "kind": "value_of", "dimension": {"literal": "season"},
             "comparison": "previous_range", "periods": ["spring", "summer", "fall"]}]"#,
    )?;
    let s = SeriesBuilder::new()
        .dimension("season", ["spring", "summer", "fall"])
        .measure("sales", [1.0, 2.0, 3.0])
        .build()?;
    let out = evaluate_series(&columns[0], &s);
    assert_calculated_eq(&out, &[Calculated::Invalid, Calculated::number(1.0), Calculated::number(2.0)]);
    Ok(())
}

#[test]
fn load_from_file() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, r#"[{{"name": "pct", "field": "sales", "kind": "percent"}}]"#)?;
    let columns = load_configs(file.path())?;
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].name(), "pct");
    Ok(())
}

#[test]
fn missing_file_names_the_path() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("absent.json");
    let Err(err) = load_configs(&path) else {
        anyhow::bail!("loading a missing file succeeded");
    };
    assert!(format!("{err:#}").contains("absent.json"));
    Ok(())
}
