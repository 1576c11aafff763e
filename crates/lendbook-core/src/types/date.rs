//! Calendar date type for schedules and collections.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

/// A calendar date with no time-of-day component.
///
/// This is a newtype wrapper around `chrono::NaiveDate`. Overdue checks
/// compare `Date` values directly, so time-of-day never leaks into them.
///
/// # Example
///
/// ```rust
/// use lendbook_core::types::Date;
///
/// let date = Date::from_ymd(2025, 6, 15).unwrap();
/// let next = date.add_months(7).unwrap();
/// assert_eq!(next.year(), 2026);
/// assert_eq!(next.month(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a new date from year, month, and day.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> LedgerResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| {
                LedgerError::validation(format!("invalid date {year}-{month:02}-{day:02}"))
            })
    }

    /// Creates a date from an ISO 8601 string (YYYY-MM-DD).
    pub fn parse(s: &str) -> LedgerResult<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|_| LedgerError::validation(format!("cannot parse date: {s}")))
    }

    /// Returns today's date in local time.
    #[must_use]
    pub fn today() -> Self {
        Date(chrono::Local::now().date_naive())
    }

    /// Returns the year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Adds a number of days to the date.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Date(self.0 + chrono::Duration::days(days))
    }

    /// Adds a number of calendar months to the date.
    ///
    /// If the resulting day would be invalid (e.g., Jan 31 + 1 month),
    /// it rolls back to the last valid day of the month.
    pub fn add_months(&self, months: i32) -> LedgerResult<Self> {
        let total_months = self.year() * 12 + self.month() as i32 - 1 + months;
        let new_year = total_months.div_euclid(12);
        let new_month = (total_months.rem_euclid(12) + 1) as u32;

        let new_day = self.day().min(days_in_month(new_year, new_month));

        Self::from_ymd(new_year, new_month, new_day)
    }

    /// Calculates the number of calendar days from `self` to `other`.
    #[must_use]
    pub fn days_between(&self, other: &Date) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Returns the underlying `NaiveDate`.
    #[must_use]
    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for Date {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl From<Date> for NaiveDate {
    fn from(date: Date) -> Self {
        date.0
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_creation() {
        let date = Date::from_ymd(2025, 6, 15).unwrap();
        assert_eq!(date.year(), 2025);
        assert_eq!(date.month(), 6);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_invalid_date() {
        assert!(Date::from_ymd(2025, 2, 30).is_err());
        assert!(Date::from_ymd(2025, 13, 1).is_err());
    }

    #[test]
    fn test_parse_and_display() {
        let date: Date = "2024-03-09".parse().unwrap();
        assert_eq!(date.to_string(), "2024-03-09");
        assert!(Date::parse("09/03/2024").is_err());
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        let jan31 = Date::from_ymd(2024, 1, 31).unwrap();
        assert_eq!(jan31.add_months(1).unwrap(), Date::from_ymd(2024, 2, 29).unwrap());
        assert_eq!(jan31.add_months(2).unwrap(), Date::from_ymd(2024, 3, 31).unwrap());
        assert_eq!(jan31.add_months(13).unwrap(), Date::from_ymd(2025, 2, 28).unwrap());
    }

    #[test]
    fn test_add_months_crosses_year() {
        let nov = Date::from_ymd(2024, 11, 15).unwrap();
        assert_eq!(nov.add_months(3).unwrap(), Date::from_ymd(2025, 2, 15).unwrap());
        assert_eq!(nov.add_months(-11).unwrap(), Date::from_ymd(2023, 12, 15).unwrap());
    }

    #[test]
    fn test_days_between() {
        let a = Date::from_ymd(2024, 2, 27).unwrap();
        let b = Date::from_ymd(2024, 3, 2).unwrap();
        assert_eq!(a.days_between(&b), 4);
        assert_eq!(b.days_between(&a), -4);
        assert_eq!(a.add_days(4), b);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn add_months_never_overshoots_the_day(
                year in 1990i32..2100,
                month in 1u32..=12,
                day in 1u32..=31,
                months in 0i32..240,
            ) {
                prop_assume!(Date::from_ymd(year, month, day).is_ok());
                let start = Date::from_ymd(year, month, day).unwrap();
                let shifted = start.add_months(months).unwrap();

                prop_assert!(shifted.day() <= start.day());
                let elapsed = (shifted.year() - start.year()) * 12
                    + shifted.month() as i32
                    - start.month() as i32;
                prop_assert_eq!(elapsed, months);
            }
        }
    }
}
