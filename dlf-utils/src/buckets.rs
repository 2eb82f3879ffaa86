//! Bucket key functions for aggregation.
//!
//! Every key type orders chronologically, so sorting keys sorts buckets.

use crate::periods::{first_of_month, sunday_on_or_before};
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};

/// Start of the hour containing `ts`.
pub fn hour_floor(ts: &NaiveDateTime) -> NaiveDateTime {
    let trimmed = TimeDelta::minutes(ts.minute() as i64)
        + TimeDelta::seconds(ts.second() as i64)
        + TimeDelta::nanoseconds(ts.nanosecond() as i64);
    *ts - trimmed
}

/// Calendar day of `ts`.
pub fn calendar_day(ts: &NaiveDateTime) -> NaiveDate {
    ts.date()
}

/// Sunday that starts the week containing `ts`.
pub fn week_start(ts: &NaiveDateTime) -> NaiveDate {
    sunday_on_or_before(ts.date())
}

/// Monday that starts the ISO week containing `ts`.
pub fn iso_week_start(ts: &NaiveDateTime) -> NaiveDate {
    let date = ts.date();
    date - TimeDelta::days(date.weekday().num_days_from_monday() as i64)
}

/// First day of the month containing `ts`.
pub fn month_start(ts: &NaiveDateTime) -> NaiveDate {
    first_of_month(ts.date())
}

/// Label for a day in a week view, e.g. "Mon 15/01".
pub fn weekly_label(date: &NaiveDate) -> String {
    date.format("%a %d/%m").to_string()
}

/// Label for a day in a month view, e.g. "15/01".
pub fn monthly_label(date: &NaiveDate) -> String {
    date.format("%d/%m").to_string()
}
