// src/core/window.rs - Time Window Resolution
//! Civil-day time windows in a fixed UTC+5:30 offset.
//!
//! Every listing and analytics query is scoped by a window resolved here.
//! Date-only inputs are interpreted as civil days in IST (UTC+5:30),
//! regardless of the host timezone, and resolution is pure: the same inputs
//! and `now` instant always produce the same window.
//!
//! Windows are half-open `[start, end)` instant pairs in UTC.

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, Utc};
use serde::Deserialize;
use std::str::FromStr;

use crate::{Error, Result};

/// The fixed civil timezone: UTC+5:30.
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// The IST offset as a chrono timezone.
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).expect("UTC+5:30 is a valid offset")
}

/// Period tag for period-based windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(Error::Validation(format!("unknown period: {s}"))),
        }
    }
}

/// Caller-supplied window selector, straight from query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowParams {
    pub date: Option<NaiveDate>,
    pub period: Option<Period>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// A half-open `[start, end)` instant pair scoping a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Midnight of `date` in IST, as a UTC instant.
fn civil_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
    naive
        .and_local_timezone(ist())
        .single()
        .expect("fixed offsets are unambiguous")
        .with_timezone(&Utc)
}

impl TimeWindow {
    /// The window covering exactly one civil day.
    pub fn civil_day(date: NaiveDate) -> Result<Self> {
        let next = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| Error::Validation(format!("date out of range: {date}")))?;
        Ok(Self {
            start: civil_midnight(date),
            end: civil_midnight(next),
        })
    }

    /// The current civil day in IST, derived from `now`.
    pub fn today(now: DateTime<Utc>) -> Self {
        let date = now.with_timezone(&ist()).date_naive();
        // A valid civil day never fails to extend by one day within range.
        Self::civil_day(date).expect("current date is in range")
    }

    /// A window starting at `date` and spanning one day, week, or calendar
    /// month. Month arithmetic rolls over year boundaries (December + one
    /// month lands in January of the next year).
    pub fn from_period(date: NaiveDate, period: Period) -> Result<Self> {
        let end_date = match period {
            Period::Day => date.checked_add_days(Days::new(1)),
            Period::Week => date.checked_add_days(Days::new(7)),
            Period::Month => date.checked_add_months(Months::new(1)),
        }
        .ok_or_else(|| Error::Validation(format!("date out of range: {date}")))?;

        Ok(Self {
            start: civil_midnight(date),
            end: civil_midnight(end_date),
        })
    }

    /// An explicit date range; the `to` day is included in full.
    pub fn from_range(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if to < from {
            return Err(Error::Validation(format!(
                "invalid range: {to} is before {from}"
            )));
        }
        let end_date = to
            .checked_add_days(Days::new(1))
            .ok_or_else(|| Error::Validation(format!("date out of range: {to}")))?;
        Ok(Self {
            start: civil_midnight(from),
            end: civil_midnight(end_date),
        })
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Result<Self> {
        let first = date
            .with_day(1)
            .expect("the first of the month always exists");
        Self::from_period(first, Period::Month)
    }

    /// Resolve caller parameters into a concrete window.
    ///
    /// Precedence: explicit `from`/`to` pair, then `date` + `period`, then
    /// bare `date` (a single civil day), then the current civil day.
    pub fn resolve(params: &WindowParams, now: DateTime<Utc>) -> Result<Self> {
        match (params.from, params.to) {
            (Some(from), Some(to)) => return Self::from_range(from, to),
            (Some(_), None) | (None, Some(_)) => {
                return Err(Error::Validation(
                    "from and to must be supplied together".to_string(),
                ))
            }
            (None, None) => {}
        }

        match (params.date, params.period) {
            (Some(date), Some(period)) => Self::from_period(date, period),
            (Some(date), None) => Self::civil_day(date),
            (None, Some(period)) => {
                let today = now.with_timezone(&ist()).date_naive();
                Self::from_period(today, period)
            }
            (None, None) => Ok(Self::today(now)),
        }
    }

    /// Whether an instant falls inside this window.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_civil_day_is_ist_midnight_to_midnight() {
        let w = TimeWindow::civil_day(date("2024-06-15")).unwrap();
        // 2024-06-15 00:00 IST == 2024-06-14 18:30 UTC
        assert_eq!(w.start, Utc.with_ymd_and_hms(2024, 6, 14, 18, 30, 0).unwrap());
        assert_eq!(w.end, Utc.with_ymd_and_hms(2024, 6, 15, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_month_window_spans_one_calendar_month() {
        let w = TimeWindow::from_period(date("2024-02-01"), Period::Month).unwrap();
        let expected_end = TimeWindow::civil_day(date("2024-03-01")).unwrap().start;
        assert_eq!(w.end, expected_end);
    }

    #[test]
    fn test_month_window_rolls_over_year_boundary() {
        let w = TimeWindow::from_period(date("2023-12-15"), Period::Month).unwrap();
        let expected_end = TimeWindow::civil_day(date("2024-01-15")).unwrap().start;
        assert_eq!(w.end, expected_end);
    }

    #[test]
    fn test_week_window() {
        let w = TimeWindow::from_period(date("2024-06-10"), Period::Week).unwrap();
        let expected_end = TimeWindow::civil_day(date("2024-06-17")).unwrap().start;
        assert_eq!(w.end, expected_end);
    }

    #[test]
    fn test_range_includes_to_day() {
        let w = TimeWindow::from_range(date("2024-06-01"), date("2024-06-03")).unwrap();
        let late_on_to_day = Utc.with_ymd_and_hms(2024, 6, 3, 17, 0, 0).unwrap(); // 22:30 IST
        assert!(w.contains(late_on_to_day));

        let next_day = Utc.with_ymd_and_hms(2024, 6, 3, 18, 30, 0).unwrap(); // 00:00 IST Jun 4
        assert!(!w.contains(next_day));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = TimeWindow::from_range(date("2024-06-03"), date("2024-06-01"));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_default_resolves_to_current_ist_day() {
        // 2024-06-14 20:00 UTC is already 2024-06-15 01:30 in IST.
        let now = Utc.with_ymd_and_hms(2024, 6, 14, 20, 0, 0).unwrap();
        let w = TimeWindow::resolve(&WindowParams::default(), now).unwrap();
        assert_eq!(w, TimeWindow::civil_day(date("2024-06-15")).unwrap());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2024, 6, 14, 20, 0, 0).unwrap();
        let params = WindowParams {
            date: Some(date("2024-02-01")),
            period: Some(Period::Month),
            ..Default::default()
        };
        let a = TimeWindow::resolve(&params, now).unwrap();
        let b = TimeWindow::resolve(&params, now).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_range_takes_precedence_over_date() {
        let now = Utc::now();
        let params = WindowParams {
            date: Some(date("2024-01-01")),
            from: Some(date("2024-06-01")),
            to: Some(date("2024-06-02")),
            ..Default::default()
        };
        let w = TimeWindow::resolve(&params, now).unwrap();
        assert_eq!(w.start, TimeWindow::civil_day(date("2024-06-01")).unwrap().start);
    }

    #[test]
    fn test_month_of_mid_month_date() {
        let w = TimeWindow::month_of(date("2024-02-17")).unwrap();
        assert_eq!(w.start, TimeWindow::civil_day(date("2024-02-01")).unwrap().start);
        assert_eq!(w.end, TimeWindow::civil_day(date("2024-03-01")).unwrap().start);
    }
}
