//! Relative time windows ("this month", "last week") resolved against a reference date
//!
//! The reference date is the latest transaction date in the dataset rather than
//! wall-clock today, so an older dataset still answers "this month" relative to
//! its own most recent activity.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// An inclusive date interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days covered, counting both ends
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// True when the range spans exactly one calendar month
    pub fn is_whole_month(&self) -> bool {
        self.start.day() == 1 && month_range(self.start.year(), self.start.month()) == Some(*self)
    }

    /// The window immediately before this one
    ///
    /// Whole months step back one calendar month; anything else steps back by
    /// its own length.
    pub fn previous_period(&self) -> DateRange {
        if self.is_whole_month() {
            return previous_month_range(self.start);
        }
        let end = self.start - Duration::days(1);
        let start = end - Duration::days(self.days() - 1);
        DateRange::new(start, end)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// First and last day of a calendar month
///
/// The last day is the first of the following month minus one day, which
/// keeps leap-year February exact.
pub fn month_range(year: i32, month: u32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(DateRange::new(start, next.pred_opt()?))
}

/// The calendar month containing `date`
pub fn current_month_range(date: NaiveDate) -> DateRange {
    month_range(date.year(), date.month()).unwrap_or(DateRange::new(date, date))
}

/// The calendar month before the one containing `date`
pub fn previous_month_range(date: NaiveDate) -> DateRange {
    let (year, month) = if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    };
    month_range(year, month).unwrap_or(DateRange::new(date, date))
}

/// Monday-to-Sunday week containing `date`
pub fn week_range(date: NaiveDate) -> DateRange {
    let start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    DateRange::new(start, start + Duration::days(6))
}

/// Resolve the first recognised time phrase in a question
///
/// Phrases are checked in the order "last month", "this month", "this week",
/// "last week". Returns `None` when the question has no time filter.
pub fn resolve_time_window(question: &str, reference: NaiveDate) -> Option<DateRange> {
    let q = question.to_lowercase();

    if q.contains("last month") {
        return Some(previous_month_range(reference));
    }
    if q.contains("this month") {
        return Some(current_month_range(reference));
    }
    if q.contains("this week") {
        return Some(week_range(reference));
    }
    if q.contains("last week") {
        let this_week = week_range(reference);
        return Some(DateRange::new(
            this_week.start - Duration::days(7),
            this_week.end - Duration::days(7),
        ));
    }
    None
}

/// Wall-clock today (UTC)
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Latest transaction date, or today when there are no transactions
pub fn reference_date(transactions: &[Transaction]) -> NaiveDate {
    transactions
        .iter()
        .map(|t| t.date)
        .max()
        .unwrap_or_else(today)
}
