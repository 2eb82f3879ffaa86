use chrono::{NaiveDate, TimeDelta};
use std::mem::replace;

/// A date range iterator that yields each calendar day from the start date
/// through the end date (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    /// Number of days the range will yield.
    pub fn num_days(&self) -> usize {
        let days = (self.1 - self.0).num_days() + 1;
        days.max(0) as usize
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0 + TimeDelta::days(1);
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DateRange;
    use chrono::NaiveDate;

    #[test]
    fn test_date_range_iteration() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let range = DateRange(start, end);
        assert_eq!(range.num_days(), 7);
        let dates: Vec<NaiveDate> = range.collect();
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], start);
        assert_eq!(dates[6], end);
    }

    #[test]
    fn test_date_range_crosses_month() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let dates: Vec<NaiveDate> = DateRange(start, end).collect();
        // 2024 is a leap year
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_date_range_empty() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let range = DateRange(start, end);
        assert_eq!(range.num_days(), 0);
        assert_eq!(range.count(), 0);
    }
}
