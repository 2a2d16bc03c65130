//! Calendar boundaries in UTC.
//!
//! Windows are half-open `[start, end)`. Weeks start on Sunday for boundary
//! calculation, while [`iso_week_number`] follows ISO-8601 (Monday start, week
//! containing the year's first Thursday). Both conventions are used: the first
//! decides which records fall in "this week", the second sizes month series.

use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc, Weekday};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// A half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(AnalyticsError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// The calendar date of the last instant inside the window.
    pub fn last_day(&self) -> NaiveDate {
        (self.end - chrono::Duration::nanoseconds(1)).date_naive()
    }
}

pub fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn date_error(what: &str, date: NaiveDate) -> AnalyticsError {
    AnalyticsError::DateError(format!("{} out of range for {}", what, date))
}

pub fn first_of_month(date: NaiveDate) -> Result<NaiveDate> {
    date.with_day(1).ok_or_else(|| date_error("first of month", date))
}

pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| date_error("month arithmetic", date))
}

pub fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| date_error("day arithmetic", date))
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> Result<NaiveDate> {
    let back = date.weekday().num_days_from_sunday() as u64;
    date.checked_sub_days(Days::new(back))
        .ok_or_else(|| date_error("week start", date))
}

pub fn quarter_of(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

/// Start date of the period containing `date`.
pub fn period_start(period: Period, date: NaiveDate) -> Result<NaiveDate> {
    match period {
        Period::Day => Ok(date),
        Period::Week => week_start(date),
        Period::Month => first_of_month(date),
        Period::Quarter => {
            let first_month = (quarter_of(date) - 1) * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), first_month, 1)
                .ok_or_else(|| date_error("quarter start", date))
        }
        Period::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)
            .ok_or_else(|| date_error("year start", date)),
    }
}

/// The `[start, end)` boundaries of the period containing `now`.
pub fn period_window(period: Period, now: DateTime<Utc>) -> Result<Window> {
    let start = period_start(period, now.date_naive())?;
    let end = match period {
        Period::Day => add_days(start, 1)?,
        Period::Week => add_days(start, 7)?,
        Period::Month => add_months(start, 1)?,
        Period::Quarter => add_months(start, 3)?,
        Period::Year => add_months(start, 12)?,
    };
    Window::new(midnight(start), midnight(end))
}

/// ISO-8601 week of the year (1..=53).
pub fn iso_week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Number of distinct ISO weeks touched by the inclusive date range.
///
/// Within one ISO year this is `iso_week(last) - iso_week(first) + 1`; across a
/// year boundary it wraps by the number of weeks in the starting ISO year.
pub fn iso_week_span(first: NaiveDate, last: NaiveDate) -> Result<u32> {
    if last < first {
        return Err(AnalyticsError::InvalidWindow {
            start: midnight(first),
            end: midnight(last),
        });
    }
    let monday = |d: NaiveDate| d - Days::new(d.weekday().num_days_from_monday() as u64);
    let weeks = (monday(last) - monday(first)).num_days() / 7;
    Ok(weeks as u32 + 1)
}

/// Zero-based week offset of `date` from `month_start`, counted in whole 7-day steps.
pub fn week_of_month_offset(date: NaiveDate, month_start: NaiveDate) -> u32 {
    ((date - month_start).num_days().max(0) / 7) as u32
}

pub fn month_abbreviation(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        _ => "Dec",
    }
}

/// Sunday-first ordering used by week series.
pub const WEEK_DAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}
