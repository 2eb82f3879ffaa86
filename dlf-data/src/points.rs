//! Typed output points, one shape per view resolution.
//!
//! All points are plain data and serialise to JSON for a chart or table.

use crate::aggregation::AveragedSample;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use dlf_sldc::channel::ChannelLoads;
use dlf_sldc::sample::LoadSample;
use dlf_utils::dates::{format_date, time_of_day_key};
use serde::Serialize;

/// A point that can be joined against another series by a string key.
pub trait TimeKeyed {
    /// Join key shared by points that describe the same slot.
    fn time_key(&self) -> String;
    /// Start of the slot the point describes.
    fn time(&self) -> NaiveDateTime;
    fn total_load(&self) -> f64;
}

/// One slot of the densified series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiveMinutePoint {
    pub time: NaiveDateTime,
    pub total_load: f64,
    pub channel_loads: ChannelLoads,
}

impl From<LoadSample> for FiveMinutePoint {
    fn from(sample: LoadSample) -> Self {
        FiveMinutePoint {
            time: sample.timestamp,
            total_load: sample.total_load,
            channel_loads: sample.channel_loads,
        }
    }
}

/// One hour, either the on-the-hour sample or the hour's average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub hour: NaiveDateTime,
    pub total_load: f64,
    pub channel_loads: ChannelLoads,
    pub sample_count: usize,
}

impl From<LoadSample> for HourlyPoint {
    fn from(sample: LoadSample) -> Self {
        HourlyPoint {
            hour: sample.timestamp,
            total_load: sample.total_load,
            channel_loads: sample.channel_loads,
            sample_count: 1,
        }
    }
}

impl From<AveragedSample<NaiveDateTime>> for HourlyPoint {
    fn from(averaged: AveragedSample<NaiveDateTime>) -> Self {
        HourlyPoint {
            hour: averaged.key,
            total_load: averaged.total_load,
            channel_loads: averaged.channel_loads,
            sample_count: averaged.sample_count,
        }
    }
}

/// One calendar day's average in a week or month view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregatePoint {
    pub date: NaiveDate,
    /// Display label, "Mon 15/01" in week views and "15/01" in month views
    pub label: String,
    pub total_load: f64,
    pub channel_loads: ChannelLoads,
    pub sample_count: usize,
}

impl DailyAggregatePoint {
    pub fn from_averaged(averaged: AveragedSample<NaiveDate>, label: String) -> Self {
        DailyAggregatePoint {
            date: averaged.key,
            label,
            total_load: averaged.total_load,
            channel_loads: averaged.channel_loads,
            sample_count: averaged.sample_count,
        }
    }
}

/// A predicted value alongside the actual one for the same slot, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedPoint {
    pub time: NaiveDateTime,
    pub key: String,
    pub predicted_load: f64,
    pub actual_load: Option<f64>,
}

impl TimeKeyed for FiveMinutePoint {
    fn time_key(&self) -> String {
        time_of_day_key(&self.time)
    }
    fn time(&self) -> NaiveDateTime {
        self.time
    }
    fn total_load(&self) -> f64 {
        self.total_load
    }
}

impl TimeKeyed for HourlyPoint {
    fn time_key(&self) -> String {
        time_of_day_key(&self.hour)
    }
    fn time(&self) -> NaiveDateTime {
        self.hour
    }
    fn total_load(&self) -> f64 {
        self.total_load
    }
}

impl TimeKeyed for DailyAggregatePoint {
    fn time_key(&self) -> String {
        format_date(&self.date)
    }
    fn time(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
    }
    fn total_load(&self) -> f64 {
        self.total_load
    }
}

/// The result of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "resolution", content = "points", rename_all = "snake_case")]
pub enum SeriesOutput {
    FiveMinute(Vec<FiveMinutePoint>),
    Hourly(Vec<HourlyPoint>),
    Daily(Vec<DailyAggregatePoint>),
    Merged(Vec<MergedPoint>),
}

impl SeriesOutput {
    pub fn len(&self) -> usize {
        match self {
            SeriesOutput::FiveMinute(points) => points.len(),
            SeriesOutput::Hourly(points) => points.len(),
            SeriesOutput::Daily(points) => points.len(),
            SeriesOutput::Merged(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Headline load per point; the predicted value for merged series.
    pub fn total_loads(&self) -> Vec<f64> {
        match self {
            SeriesOutput::FiveMinute(points) => points.iter().map(|p| p.total_load).collect(),
            SeriesOutput::Hourly(points) => points.iter().map(|p| p.total_load).collect(),
            SeriesOutput::Daily(points) => points.iter().map(|p| p.total_load).collect(),
            SeriesOutput::Merged(points) => points.iter().map(|p| p.predicted_load).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_per_point_type() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let ts = day.and_hms_opt(9, 5, 0).unwrap();
        let five: FiveMinutePoint = LoadSample::total_only(ts, 1.0).into();
        assert_eq!(five.time_key(), "09:05");
        let hourly: HourlyPoint = LoadSample::total_only(ts, 1.0).into();
        assert_eq!(hourly.sample_count, 1);
        let daily = DailyAggregatePoint {
            date: day,
            label: "Mon 15/01".to_string(),
            total_load: 1.0,
            channel_loads: ChannelLoads::default(),
            sample_count: 3,
        };
        assert_eq!(daily.time_key(), "2024-01-15");
        assert_eq!(daily.time(), day.and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn output_serialises_with_resolution_tag() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let output = SeriesOutput::Merged(vec![MergedPoint {
            time: ts,
            key: "09:00".to_string(),
            predicted_load: 10.0,
            actual_load: None,
        }]);
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["resolution"], "merged");
        assert_eq!(json["points"][0]["time"], "2024-01-15T09:00:00");
        assert!(json["points"][0]["actual_load"].is_null());
        assert_eq!(output.total_loads(), vec![10.0]);
    }
}
