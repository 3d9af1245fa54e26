//! Calendar arithmetic for period-over-period comparisons.
//!
//! All functions are pure. Week numbering is parameterised by a [`Calendar`]
//! (first day of week and the minimal number of days the first week of a
//! period must contain), so the same code serves US-style and ISO-style week
//! counting without any shared mutable state.
//!
//! Shifting a date to "the same point in the previous year/quarter/month" has
//! two flavours:
//!
//! - **plain**: subtract 12/3/1 months, clamping to the end of shorter months.
//! - **week-aligned**: used when the comparison dimension is grouped by week.
//!   The date keeps its *week number* within the year (or week-of-quarter /
//!   week-of-month) and its offset inside the week, so week buckets line up
//!   across period seams instead of drifting by a naive day offset.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// Week-numbering rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Calendar {
    pub first_day_of_week: Weekday,
    /// Days of a period the first week must contain to count as week 1 (1..=7).
    pub minimal_days_in_first_week: u8,
}

impl Default for Calendar {
    /// Sunday-first weeks; the week containing January 1st is week 1.
    fn default() -> Self {
        Self { first_day_of_week: Weekday::Sun, minimal_days_in_first_week: 1 }
    }
}

/// Coarse period used for previous-period shifts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Year,
    Quarter,
    Month,
    Week,
}

impl Period {
    /// Length of the period in months (weeks are not month-based).
    pub const fn months(self) -> u32 {
        match self {
            Self::Year => 12,
            Self::Quarter => 3,
            Self::Month => 1,
            Self::Week => 0,
        }
    }
}

/// January 1st of `year`; years outside chrono's range saturate.
fn year_start(year: i32) -> NaiveDate {
    NaiveDate::from_yo_opt(year, 1).unwrap_or(if year < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    let month = (date.month0() / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

/// Subtract whole months, clamping the day to the end of shorter months.
pub fn shift_months(dt: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    dt.checked_sub_months(Months::new(months))
}

impl Calendar {
    /// ISO-8601 rules: Monday-first, week 1 holds at least four days.
    pub const fn iso() -> Self {
        Self { first_day_of_week: Weekday::Mon, minimal_days_in_first_week: 4 }
    }

    fn min_days(&self) -> i64 {
        i64::from(self.minimal_days_in_first_week.clamp(1, 7))
    }

    /// First day of the week containing `date`.
    pub fn week_start(&self, date: NaiveDate) -> NaiveDate {
        let offset = (7 + date.weekday().num_days_from_monday()
            - self.first_day_of_week.num_days_from_monday())
            % 7;
        date - Duration::days(i64::from(offset))
    }

    /// First day of week 1 of the period beginning at `period_start`.
    fn first_week_start(&self, period_start: NaiveDate) -> NaiveDate {
        let ws = self.week_start(period_start);
        let days_inside = 7 - (period_start - ws).num_days();
        if days_inside >= self.min_days() { ws } else { ws + Duration::weeks(1) }
    }

    /// `(week_year, week)` of a date. Late-December dates may belong to
    /// week 1 of the following year and early-January dates to the last week
    /// of the previous one.
    pub fn week_of_year(&self, date: NaiveDate) -> (i32, u32) {
        let year = date.year();
        if date >= self.first_week_start(year_start(year + 1)) {
            return (year + 1, 1);
        }
        let this = self.first_week_start(year_start(year));
        if date < this {
            let prev = self.first_week_start(year_start(year - 1));
            return (year - 1, weeks_between(prev, date) + 1);
        }
        (year, weeks_between(this, date) + 1)
    }

    pub fn weeks_in_year(&self, year: i32) -> u32 {
        weeks_between(
            self.first_week_start(year_start(year)),
            self.first_week_start(year_start(year + 1)),
        )
    }

    /// Week number of `date` inside the period starting at `period_start`.
    /// Days before the period's first full week are in week 0.
    pub fn week_of_period(&self, date: NaiveDate, period_start: NaiveDate) -> u32 {
        let first = self.first_week_start(period_start);
        if date < first { 0 } else { weeks_between(first, date) + 1 }
    }

    /// Same point in the previous `period`.
    ///
    /// With `week_aligned`, year/quarter/month shifts keep the week number and
    /// the day-in-week instead of subtracting months. Weeks always step back
    /// seven days.
    pub fn previous(&self, dt: NaiveDateTime, period: Period, week_aligned: bool) -> Option<NaiveDateTime> {
        match period {
            Period::Week => dt.checked_sub_signed(Duration::weeks(1)),
            _ if !week_aligned => shift_months(dt, period.months()),
            Period::Year => self.previous_year_by_week(dt),
            Period::Quarter | Period::Month => self.previous_period_by_week(dt, period),
        }
    }

    fn previous_year_by_week(&self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = dt.date();
        let offset = (date - self.week_start(date)).num_days();
        let (_, week) = self.week_of_year(date);

        let target_year = if date.month() == 12 && week == 1 {
            // already counted in next year's first week
            date.year()
        } else if date.month() == 1 && week >= 52 {
            // still inside the previous year's last week
            date.year() - 2
        } else {
            date.year() - 1
        };

        let week = week.min(self.weeks_in_year(target_year)).max(1);
        let start = self
            .first_week_start(year_start(target_year))
            .checked_add_signed(Duration::weeks(i64::from(week - 1)))?;
        Some(start.checked_add_signed(Duration::days(offset))?.and_time(dt.time()))
    }

    fn previous_period_by_week(&self, dt: NaiveDateTime, period: Period) -> Option<NaiveDateTime> {
        let date = dt.date();
        let offset = (date - self.week_start(date)).num_days();
        let start = match period {
            Period::Quarter => quarter_start(date),
            _ => month_start(date),
        };
        let week = self.week_of_period(date, start);

        let prev_start = start.checked_sub_months(Months::new(period.months()))?;
        let prev_last_week = self.week_start(start.pred_opt()?);
        let anchor = if week == 0 {
            // leading partial week maps onto the previous period's leading week
            self.week_start(prev_start)
        } else {
            self.first_week_start(prev_start)
                .checked_add_signed(Duration::weeks(i64::from(week - 1)))?
        };
        let anchor = anchor.min(prev_last_week);
        Some(anchor.checked_add_signed(Duration::days(offset))?.and_time(dt.time()))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn weeks_between(from: NaiveDate, to: NaiveDate) -> u32 {
    ((to - from).num_days().max(0) / 7) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dt(y: i32, m: u32, day: u32) -> NaiveDateTime {
        d(y, m, day).and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn week_start_respects_first_day() {
        // 2024-01-03 is a Wednesday
        assert_eq!(Calendar::default().week_start(d(2024, 1, 3)), d(2023, 12, 31));
        assert_eq!(Calendar::iso().week_start(d(2024, 1, 3)), d(2024, 1, 1));
    }

    #[test]
    fn iso_week_numbers_match_known_dates() {
        let iso = Calendar::iso();
        assert_eq!(iso.week_of_year(d(2024, 1, 1)), (2024, 1));
        assert_eq!(iso.week_of_year(d(2021, 1, 3)), (2020, 53));
        assert_eq!(iso.week_of_year(d(2024, 12, 30)), (2025, 1));
        assert_eq!(iso.weeks_in_year(2020), 53);
        assert_eq!(iso.weeks_in_year(2023), 52);
    }

    #[test]
    fn us_week_one_contains_january_first() {
        let us = Calendar::default();
        assert_eq!(us.week_of_year(d(2023, 1, 1)), (2023, 1));
        // Jan 1st 2023 is a Sunday, so Saturday 2022-12-31 closes the last 2022 week
        assert_eq!(us.week_of_year(d(2022, 12, 31)).0, 2022);
        // 2024-12-29 (Sunday) starts the week containing Jan 1st 2025
        assert_eq!(us.week_of_year(d(2024, 12, 29)), (2025, 1));
    }

    #[test]
    fn plain_shifts_clamp_month_ends() {
        let cal = Calendar::default();
        assert_eq!(cal.previous(dt(2024, 3, 31), Period::Month, false), Some(dt(2024, 2, 29)));
        assert_eq!(cal.previous(dt(2024, 5, 31), Period::Quarter, false), Some(dt(2024, 2, 29)));
        assert_eq!(cal.previous(dt(2024, 2, 29), Period::Year, false), Some(dt(2023, 2, 28)));
        assert_eq!(cal.previous(dt(2024, 1, 3), Period::Week, false), Some(dt(2023, 12, 27)));
        assert_eq!(cal.previous(dt(2024, 1, 3), Period::Week, true), Some(dt(2023, 12, 27)));
    }

    #[test]
    fn week_aligned_year_keeps_week_number() {
        let iso = Calendar::iso();
        // Monday of ISO week 10 of 2024 -> Monday of ISO week 10 of 2023
        let shifted = iso.previous(dt(2024, 3, 4), Period::Year, true).unwrap();
        assert_eq!(shifted, dt(2023, 3, 6));
        assert_eq!(iso.week_of_year(shifted.date()), (2023, 10));
    }

    #[test]
    fn week_aligned_year_december_in_first_week() {
        let iso = Calendar::iso();
        // 2024-12-30 is ISO week 1 of 2025; previous year's week 1 is 2024-01-01
        let shifted = iso.previous(dt(2024, 12, 30), Period::Year, true).unwrap();
        assert_eq!(shifted, dt(2024, 1, 1));
    }

    #[test]
    fn week_aligned_year_january_in_last_week() {
        let iso = Calendar::iso();
        // 2021-01-03 (Sunday) is ISO week 53 of 2020; 2019 has only 52 weeks
        let shifted = iso.previous(dt(2021, 1, 3), Period::Year, true).unwrap();
        assert_eq!(iso.week_of_year(shifted.date()), (2019, 52));
        assert_eq!(shifted, dt(2019, 12, 29));
    }

    #[test]
    fn week_aligned_month_keeps_week_of_month() {
        let us = Calendar::default();
        // 2024-03-10 (Sunday) starts week 3 of March 2024 (Mar 1 is a Friday).
        // February 2024 starts Thursday; its week 3 starts Sunday Feb 11.
        let shifted = us.previous(dt(2024, 3, 10), Period::Month, true).unwrap();
        assert_eq!(shifted, dt(2024, 2, 11));
    }

    #[test]
    fn week_aligned_month_clamps_to_last_week() {
        let us = Calendar::default();
        // 2024-03-31 (Sunday) is week 6 of March; February 2024 has five week starts,
        // the last being Sunday Feb 25.
        let shifted = us.previous(dt(2024, 3, 31), Period::Month, true).unwrap();
        assert_eq!(shifted, dt(2024, 2, 25));
    }

    #[test]
    fn week_aligned_quarter_and_leading_partial_week() {
        let iso = Calendar::iso();
        // Q2 2024 starts Monday April 1st: week 2 starts April 8.
        // Q1 2024 starts Monday Jan 1st: week 2 starts Jan 8.
        assert_eq!(iso.previous(dt(2024, 4, 8), Period::Quarter, true), Some(dt(2024, 1, 8)));

        // Sept 2024 starts on a Sunday, so its ISO first week starts Sept 2 and
        // Sunday Sept 1st is in week 0; it maps onto August's leading week.
        assert_eq!(iso.week_of_period(d(2024, 9, 1), d(2024, 9, 1)), 0);
        let shifted = iso.previous(dt(2024, 9, 1), Period::Month, true).unwrap();
        assert_eq!(shifted, dt(2024, 8, 4));
    }
}
