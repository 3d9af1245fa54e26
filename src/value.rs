//! Cell values and the three-state calculation result.
//!
//! [`Value`] is what a row series or pivot grid hands out for a single cell.
//! It is totally ordered (nulls first, then booleans, numbers, text and dates)
//! so it can key hash maps and sort dimension members deterministically.
//!
//! [`Calculated`] is what every calculator hands back. It separates legitimate
//! missing data ([`Calculated::Absent`]) from "do not plot this point"
//! ([`Calculated::Invalid`]), so an invalid cell can never be mistaken for a
//! numeric zero.

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(OrderedFloat<f64>),
    Text(String),
    Date(NaiveDateTime),
}

/// Shared null used when a lookup falls outside a series.
pub(crate) static NULL: Value = Value::Null;

impl Value {
    #[inline]
    pub fn number(n: f64) -> Self {
        Self::Number(OrderedFloat(n))
    }

    #[inline]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Midnight of the given calendar day, or `Null` when the date does not exist.
    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map_or(Self::Null, Self::Date)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric reading of the value.
    ///
    /// Numbers are returned as-is and text is parsed; everything else
    /// (including unparsable text) yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n.0),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Numeric reading where anything non-numeric counts as zero.
    #[inline]
    pub fn as_f64_or_zero(&self) -> f64 {
        self.as_f64().unwrap_or(0.0)
    }

    #[inline]
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::number(n)
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", n.0),
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{d}"),
        }
    }
}

/// Outcome of evaluating a calculator for one row or one grid cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Calculated {
    /// A concrete value.
    Value(Value),
    /// Legitimately missing data.
    Absent,
    /// The cell must not be treated as a plotted or comparable value.
    Invalid,
}

impl Calculated {
    #[inline]
    pub fn number(n: f64) -> Self {
        Self::Value(Value::number(n))
    }

    /// Wrap a cell value, mapping `Null` to [`Calculated::Absent`].
    pub fn from_value(v: Value) -> Self {
        if v.is_null() { Self::Absent } else { Self::Value(v) }
    }

    /// Wrap an optional aggregate result.
    pub fn from_f64(v: Option<f64>) -> Self {
        v.map_or(Self::Absent, Self::number)
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value().and_then(Value::as_f64)
    }
}

impl fmt::Display for Calculated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Absent => f.write_str("<absent>"),
            Self::Invalid => f.write_str("<invalid>"),
        }
    }
}
