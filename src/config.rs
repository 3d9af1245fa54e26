//! Serializable calculator configuration.
//!
//! A [`CalcConfig`] names the calculator, the measure it reads and a
//! [`CalcSpec`] tagged by `kind`. [`CalcConfig::build`] validates it and
//! produces a ready [`CalcColumn`].
//!
//! ```
//! use ironbeam_calc::config::parse_configs;
//!
//! let columns = parse_configs(r#"[
//!     {"name": "avg3", "field": "sales", "kind": "moving", "formula": "average", "previous": 1, "next": 1},
//!     {"name": "ytd", "field": "sales", "kind": "running_total",
//!      "dimension": {"literal": "date"}, "reset": "year"}
//! ]"#)?;
//! assert_eq!(columns.len(), 2);
//! assert_eq!(columns[1].name(), "ytd");
//! # Ok::<(), ironbeam_calc::config::ConfigError>(())
//! ```

use crate::calendar::Calendar;
use crate::column::{
    CalcColumn, CalcKind, Change, Comparison, CompoundGrowth, Moving, Percent, PercentLevel, RunningTotal, ValueOf,
};
use crate::combiners::Formula;
use crate::grid::DimensionRef;
use crate::interval::Interval;
use crate::value::Value;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Why a configuration cannot become a calculator.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("calculator `{0}` does not name a field")]
    EmptyField(String),
    #[error("calculator `{0}`: moving window covers no rows")]
    EmptyWindow(String),
    #[error("calculator `{0}`: previous_range comparison needs a list of periods")]
    MissingCustomPeriods(String),
    #[error("calculator `{0}`: break_by with a date reset needs a dimension")]
    ResetWithBreakBy(String),
    #[error("invalid calculator configuration: {0}")]
    Json(#[from] serde_json::Error),
}

const fn yes() -> bool {
    true
}

/// One configured calculator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalcConfig {
    pub name: String,
    pub field: String,
    #[serde(default)]
    pub calc_on_totals: bool,
    #[serde(default)]
    pub calendar: Calendar,
    #[serde(flatten)]
    pub spec: CalcSpec,
}

/// Kind-specific settings, tagged by `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalcSpec {
    Moving(MovingSpec),
    RunningTotal(RunningSpec),
    CompoundGrowth(RunningSpec),
    ValueOf(ValueOfSpec),
    Change(ChangeSpec),
    Percent(PercentSpec),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovingSpec {
    #[serde(default)]
    pub formula: Formula,
    #[serde(default)]
    pub previous: usize,
    #[serde(default)]
    pub next: usize,
    #[serde(default = "yes")]
    pub include_current: bool,
    #[serde(default)]
    pub null_if_insufficient: bool,
    #[serde(default)]
    pub dimension: Option<DimensionRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunningSpec {
    #[serde(default)]
    pub formula: Formula,
    #[serde(default)]
    pub dimension: Option<DimensionRef>,
    #[serde(default)]
    pub reset: Interval,
    #[serde(default)]
    pub break_by: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueOfSpec {
    pub dimension: DimensionRef,
    pub comparison: Comparison,
    /// Grouping level of the date dimension.
    #[serde(default)]
    pub date_level: Interval,
    /// Ordered period labels for `previous_range`.
    #[serde(default)]
    pub periods: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeSpec {
    #[serde(flatten)]
    pub lookup: ValueOfSpec,
    #[serde(default)]
    pub percent: bool,
    #[serde(default = "yes")]
    pub missing_as_zero: bool,
    #[serde(default)]
    pub preview: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentSpec {
    /// Sub-group dimension; the grand total when absent.
    #[serde(default)]
    pub of: Option<DimensionRef>,
}

impl CalcConfig {
    pub fn new(name: impl Into<String>, field: impl Into<String>, spec: CalcSpec) -> Self {
        Self { name: name.into(), field: field.into(), calc_on_totals: false, calendar: Calendar::default(), spec }
    }

    /// Validate and turn into a calculator.
    pub fn build(&self) -> Result<CalcColumn, ConfigError> {
        let err = || self.name.clone();
        if self.field.trim().is_empty() {
            return Err(ConfigError::EmptyField(err()));
        }

        let kind: CalcKind = match &self.spec {
            CalcSpec::Moving(m) => {
                if m.previous == 0 && m.next == 0 && !m.include_current {
                    return Err(ConfigError::EmptyWindow(err()));
                }
                let mut moving = Moving::new(m.formula)
                    .previous(m.previous)
                    .next(m.next)
                    .include_current(m.include_current)
                    .null_if_insufficient(m.null_if_insufficient);
                if let Some(d) = &m.dimension {
                    moving = moving.dimension(d.clone());
                }
                moving.into()
            }
            CalcSpec::RunningTotal(r) => self.running(r)?.into(),
            CalcSpec::CompoundGrowth(r) => CompoundGrowth::new(self.running(r)?).into(),
            CalcSpec::ValueOf(v) => self.value_of(v)?.into(),
            CalcSpec::Change(c) => Change::new(self.value_of(&c.lookup)?)
                .percent(c.percent)
                .missing_as_zero(c.missing_as_zero)
                .preview(c.preview)
                .into(),
            CalcSpec::Percent(p) => {
                let level = p.of.clone().map_or(PercentLevel::GrandTotal, PercentLevel::Group);
                Percent::new(level).into()
            }
        };

        Ok(CalcColumn::new(&self.name, &self.field, kind).calc_on_totals(self.calc_on_totals))
    }

    fn running(&self, r: &RunningSpec) -> Result<RunningTotal, ConfigError> {
        if r.break_by.is_some() && r.reset != Interval::None && r.dimension.is_none() {
            return Err(ConfigError::ResetWithBreakBy(self.name.clone()));
        }
        let mut running = RunningTotal::new(r.formula).reset(r.reset).calendar(self.calendar);
        if let Some(d) = &r.dimension {
            running = running.dimension(d.clone());
        }
        if let Some(b) = &r.break_by {
            running = running.break_by(b.clone());
        }
        Ok(running)
    }

    fn value_of(&self, v: &ValueOfSpec) -> Result<ValueOf, ConfigError> {
        if v.comparison == Comparison::PreviousRange && v.periods.is_empty() {
            return Err(ConfigError::MissingCustomPeriods(self.name.clone()));
        }
        Ok(ValueOf::new(v.dimension.clone(), v.comparison)
            .date_level(v.date_level)
            .periods(v.periods.iter().map(|p| Value::text(p.as_str())))
            .calendar(self.calendar))
    }
}

/// Parse a JSON array of configurations and build every calculator.
pub fn parse_configs(json: &str) -> Result<Vec<CalcColumn>, ConfigError> {
    let configs: Vec<CalcConfig> = serde_json::from_str(json)?;
    configs.iter().map(CalcConfig::build).collect()
}

/// Read and build the calculators listed in a JSON file.
pub fn load_configs(path: impl AsRef<Path>) -> anyhow::Result<Vec<CalcColumn>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_configs(&text).with_context(|| format!("build calculators from {}", path.display()))
}
