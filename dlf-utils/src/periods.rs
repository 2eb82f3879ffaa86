//! View periods: the span of wall-clock time a resolution covers.
//!
//! Day views cover one calendar day, week views the Sunday-start week that
//! contains the selected date, month views the calendar month.

use crate::date_range::DateRange;
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

/// An inclusive span of local timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// First instant of a calendar day.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Last whole second of a calendar day (23:59:59).
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + TimeDelta::days(1) - TimeDelta::seconds(1)
}

/// Sunday on or before `date`.
pub fn sunday_on_or_before(date: NaiveDate) -> NaiveDate {
    date - TimeDelta::days(date.weekday().num_days_from_sunday() as i64)
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

impl Period {
    /// Build a period, returning `None` when `end` precedes `start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Period> {
        (start <= end).then_some(Period { start, end })
    }

    /// 00:00:00 through 23:59:59 of `date`.
    pub fn day(date: NaiveDate) -> Period {
        Period {
            start: start_of_day(date),
            end: end_of_day(date),
        }
    }

    /// The Sunday-start week containing `date`.
    pub fn week_of(date: NaiveDate) -> Period {
        let sunday = sunday_on_or_before(date);
        Period {
            start: start_of_day(sunday),
            end: end_of_day(sunday + TimeDelta::days(6)),
        }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Period {
        Period {
            start: start_of_day(first_of_month(date)),
            end: end_of_day(last_of_month(date)),
        }
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        self.start <= *ts && *ts <= self.end
    }

    /// Every calendar day touched by the period.
    pub fn days(&self) -> DateRange {
        DateRange(self.start.date(), self.end.date())
    }

    /// The same period moved `days` days into the past.
    pub fn shifted_back_days(&self, days: i64) -> Period {
        let delta = TimeDelta::days(days);
        Period {
            start: self.start - delta,
            end: self.end - delta,
        }
    }

    /// The same period moved `months` calendar months into the past.
    ///
    /// Days past the end of a shorter month clamp to its last day, so the
    /// month of March 1..=31 maps onto February 1..=28 (or 29).
    pub fn shifted_back_months(&self, months: u32) -> Period {
        let shift = |ts: NaiveDateTime| {
            ts.date()
                .checked_sub_months(Months::new(months))
                .map(|d| d.and_time(ts.time()))
                .unwrap_or(ts)
        };
        Period {
            start: shift(self.start),
            end: shift(self.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_period_spans_whole_day() {
        let period = Period::day(date(2024, 1, 15));
        assert_eq!(period.start, date(2024, 1, 15).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(period.end, date(2024, 1, 15).and_hms_opt(23, 59, 59).unwrap());
        assert_eq!(period.days().num_days(), 1);
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-01-17 is a Wednesday
        let period = Period::week_of(date(2024, 1, 17));
        assert_eq!(period.start.date(), date(2024, 1, 14));
        assert_eq!(period.end.date(), date(2024, 1, 20));
        assert_eq!(period.days().num_days(), 7);

        // A Sunday is its own week start
        let sunday = Period::week_of(date(2024, 1, 14));
        assert_eq!(sunday.start.date(), date(2024, 1, 14));
    }

    #[test]
    fn month_period_handles_leap_february() {
        let period = Period::month_of(date(2024, 2, 10));
        assert_eq!(period.start.date(), date(2024, 2, 1));
        assert_eq!(period.end.date(), date(2024, 2, 29));
        assert_eq!(period.days().num_days(), 29);

        let december = Period::month_of(date(2023, 12, 31));
        assert_eq!(december.end.date(), date(2023, 12, 31));
    }

    #[test]
    fn previous_month_clamps_to_month_end() {
        let march = Period::month_of(date(2024, 3, 5));
        let previous = march.shifted_back_months(1);
        assert_eq!(previous.start.date(), date(2024, 2, 1));
        assert_eq!(previous.end.date(), date(2024, 2, 29));
        assert_eq!(previous.end.time(), march.end.time());
    }

    #[test]
    fn previous_week_is_seven_days_back() {
        let week = Period::week_of(date(2024, 1, 17));
        let previous = week.shifted_back_days(7);
        assert_eq!(previous.start.date(), date(2024, 1, 7));
        assert_eq!(previous.end.date(), date(2024, 1, 13));
    }

    #[test]
    fn new_rejects_inverted_bounds() {
        let a = date(2024, 1, 2).and_hms_opt(0, 0, 0).unwrap();
        let b = date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        assert!(Period::new(a, b).is_none());
        assert!(Period::new(b, a).is_some());
    }
}
