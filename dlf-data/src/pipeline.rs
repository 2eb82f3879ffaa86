//! Resolution-driven orchestration of parsing, densifying and aggregation.
//!
//! A [`SeriesPipeline`] holds nothing but its [`PipelineConfig`]; every call
//! takes its input by reference and returns freshly built points.

use crate::aggregation::{Aggregator, AveragedSample};
use crate::error::PipelineError;
use crate::interpolation::{Interpolator, DEFAULT_STEP_MINUTES};
use crate::merge::{merge_series, merge_series_by_timestamp};
use crate::points::{DailyAggregatePoint, FiveMinutePoint, HourlyPoint, SeriesOutput};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use dlf_sldc::row::{RawRow, RowParser};
use dlf_sldc::sample::{LoadSample, Sequence};
use dlf_utils::buckets::{calendar_day, hour_floor, monthly_label, weekly_label};
use dlf_utils::periods::Period;
use log::{debug, info};
use std::fmt;
use std::str::FromStr;

/// Time granularity of a returned series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    FiveMinute,
    Hourly,
    Weekly,
    Monthly,
}

impl Resolution {
    pub const ALL: [Resolution; 4] = [
        Resolution::FiveMinute,
        Resolution::Hourly,
        Resolution::Weekly,
        Resolution::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::FiveMinute => "5min",
            Resolution::Hourly => "hourly",
            Resolution::Weekly => "weekly",
            Resolution::Monthly => "monthly",
        }
    }

    /// Whether the view yields one averaged point per calendar day.
    pub fn is_daily(&self) -> bool {
        matches!(self, Resolution::Weekly | Resolution::Monthly)
    }

    /// The view period containing `date`.
    pub fn period_for(&self, date: NaiveDate) -> Period {
        match self {
            Resolution::FiveMinute | Resolution::Hourly => Period::day(date),
            Resolution::Weekly => Period::week_of(date),
            Resolution::Monthly => Period::month_of(date),
        }
    }

    /// The comparison period preceding `period`.
    pub fn previous_period(&self, period: &Period) -> Period {
        match self {
            Resolution::FiveMinute | Resolution::Hourly => period.shifted_back_days(1),
            Resolution::Weekly => period.shifted_back_days(7),
            Resolution::Monthly => {
                Period::month_of(period.shifted_back_months(1).start.date())
            }
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "5min" | "5-min" | "fiveminute" | "five_minute" => Ok(Resolution::FiveMinute),
            "hourly" | "hour" => Ok(Resolution::Hourly),
            "weekly" | "week" => Ok(Resolution::Weekly),
            "monthly" | "month" => Ok(Resolution::Monthly),
            _ => Err(PipelineError::InvalidResolution(s.to_string())),
        }
    }
}

/// How hourly points are derived from the densified series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HourlyMode {
    /// Keep the on-the-hour samples only
    #[default]
    Filter,
    /// Average every sample in the hour
    Aggregate,
}

impl FromStr for HourlyMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filter" => Ok(HourlyMode::Filter),
            "aggregate" | "average" => Ok(HourlyMode::Aggregate),
            _ => Err(PipelineError::InvalidHourlyMode(s.to_string())),
        }
    }
}

/// Per-invocation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Cadence of the densified series, in minutes
    pub step_minutes: i64,
    pub hourly_mode: HourlyMode,
    /// Clamp interpolated and averaged values at 0 MW
    pub floor_at_zero: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            step_minutes: DEFAULT_STEP_MINUTES,
            hourly_mode: HourlyMode::default(),
            floor_at_zero: false,
        }
    }
}

/// Raw rows fetched for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRows {
    pub date: NaiveDate,
    pub rows: Vec<RawRow>,
}

/// Build a period from explicit bounds.
pub fn checked_period(start: NaiveDateTime, end: NaiveDateTime) -> Result<Period, PipelineError> {
    Period::new(start, end).ok_or(PipelineError::InvalidRange { start, end })
}

/// One calendar day's parsed samples.
///
/// A `24:00` row lands on the next date; it still shapes the day's last
/// hour when densifying but never counts towards the next day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySamples {
    pub date: NaiveDate,
    pub samples: Sequence,
}

/// Parse one day's rows into an ordered sequence.
pub fn parse_day(day: &DayRows) -> DaySamples {
    let parsed = RowParser::new(day.date).parse_rows(&day.rows);
    debug!(
        "{}: {} samples from {} rows",
        day.date,
        parsed.samples.len(),
        day.rows.len()
    );
    DaySamples {
        date: day.date,
        samples: Sequence::from_unordered(parsed.samples),
    }
}

/// Concatenate per-day sequences into one ordered sequence.
pub fn join_days(days: &[DaySamples]) -> Sequence {
    days.iter()
        .flat_map(|day| day.samples.iter().copied())
        .collect()
}

fn spans_days(period: &Period) -> bool {
    period.start.date() != period.end.date()
}

fn to_daily_points(
    averaged: Vec<AveragedSample<NaiveDate>>,
    label: fn(&NaiveDate) -> String,
) -> Vec<DailyAggregatePoint> {
    averaged
        .into_iter()
        .map(|averaged| {
            let text = label(&averaged.key);
            DailyAggregatePoint::from_averaged(averaged, text)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesPipeline {
    config: PipelineConfig,
    interpolator: Interpolator,
    aggregator: Aggregator,
}

impl SeriesPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let interpolator = Interpolator::new(config.step_minutes)?.floor_at_zero(config.floor_at_zero);
        let aggregator = Aggregator::new().floor_at_zero(config.floor_at_zero);
        Ok(SeriesPipeline {
            config,
            interpolator,
            aggregator,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn densify_within(&self, samples: &[LoadSample], period: &Period) -> Vec<LoadSample> {
        self.interpolator
            .densify(samples)
            .into_iter()
            .filter(|s| period.contains(&s.timestamp))
            .collect()
    }

    /// The densified series restricted to `period`.
    pub fn five_minute(&self, samples: &Sequence, period: &Period) -> Vec<FiveMinutePoint> {
        self.densify_within(samples, period)
            .into_iter()
            .map(FiveMinutePoint::from)
            .collect()
    }

    /// On-the-hour samples of the densified series.
    pub fn hourly_by_filter(&self, samples: &Sequence, period: &Period) -> Vec<HourlyPoint> {
        self.densify_within(samples, period)
            .into_iter()
            .filter(|s| s.timestamp.minute() == 0)
            .map(HourlyPoint::from)
            .collect()
    }

    /// Hour-bucket averages of the densified series.
    pub fn hourly_by_aggregate(&self, samples: &Sequence, period: &Period) -> Vec<HourlyPoint> {
        let dense = self.densify_within(samples, period);
        self.aggregator
            .aggregate(&dense, hour_floor)
            .into_iter()
            .map(HourlyPoint::from)
            .collect()
    }

    /// Hourly points in the configured [`HourlyMode`].
    pub fn hourly(&self, samples: &Sequence, period: &Period) -> Vec<HourlyPoint> {
        match self.config.hourly_mode {
            HourlyMode::Filter => self.hourly_by_filter(samples, period),
            HourlyMode::Aggregate => self.hourly_by_aggregate(samples, period),
        }
    }

    /// Densify each day on its own, keeping only samples dated that day.
    fn densify_days(&self, days: &[DaySamples]) -> Vec<LoadSample> {
        days.iter()
            .flat_map(|day| {
                self.interpolator
                    .densify(&day.samples)
                    .into_iter()
                    .filter(move |s| calendar_day(&s.timestamp) == day.date)
            })
            .collect()
    }

    /// One averaged point per calendar day of `period`, data or not.
    ///
    /// Each day is densified on its own so a missing day is never filled in
    /// from its neighbours; it averages to 0 with a `sample_count` of 0.
    pub fn daily(
        &self,
        days: &[DaySamples],
        period: &Period,
        label: fn(&NaiveDate) -> String,
    ) -> Vec<DailyAggregatePoint> {
        let samples = self.densify_days(days);
        to_daily_points(
            self.aggregator
                .aggregate_expected(&samples, period.days(), calendar_day),
            label,
        )
    }

    /// Daily points for the days that have samples only.
    fn daily_present(
        &self,
        samples: Vec<LoadSample>,
        period: &Period,
        label: fn(&NaiveDate) -> String,
    ) -> Vec<DailyAggregatePoint> {
        let samples: Vec<LoadSample> = samples
            .into_iter()
            .filter(|s| period.contains(&s.timestamp))
            .collect();
        to_daily_points(self.aggregator.aggregate(&samples, calendar_day), label)
    }

    /// Shape per-day actual data on its own, without merging.
    pub fn shape(&self, resolution: Resolution, period: &Period, days: &[DaySamples]) -> SeriesOutput {
        match resolution {
            Resolution::FiveMinute => SeriesOutput::FiveMinute(self.five_minute(&join_days(days), period)),
            Resolution::Hourly => SeriesOutput::Hourly(self.hourly(&join_days(days), period)),
            Resolution::Weekly => SeriesOutput::Daily(self.daily(days, period, weekly_label)),
            Resolution::Monthly => SeriesOutput::Daily(self.daily(days, period, monthly_label)),
        }
    }

    /// Shape one continuous series, such as predictions, without merging.
    ///
    /// Week and month views still get one point per day of `period`.
    pub fn shape_continuous(
        &self,
        resolution: Resolution,
        period: &Period,
        samples: &Sequence,
    ) -> SeriesOutput {
        let daily = |label: fn(&NaiveDate) -> String| {
            let dense = self.interpolator.densify(samples);
            to_daily_points(
                self.aggregator
                    .aggregate_expected(&dense, period.days(), calendar_day),
                label,
            )
        };
        match resolution {
            Resolution::FiveMinute => SeriesOutput::FiveMinute(self.five_minute(samples, period)),
            Resolution::Hourly => SeriesOutput::Hourly(self.hourly(samples, period)),
            Resolution::Weekly => SeriesOutput::Daily(daily(weekly_label)),
            Resolution::Monthly => SeriesOutput::Daily(daily(monthly_label)),
        }
    }

    /// Resolve actual data, merged against a predicted series when given.
    ///
    /// Predictions are shaped at the same resolution and drive the merged
    /// timeline. Five-minute and hourly points join on time of day within a
    /// single day, and on the full timestamp when `period` spans several
    /// days. In week and month views only days with actual samples can match.
    pub fn resolve(
        &self,
        resolution: Resolution,
        period: &Period,
        actual_days: &[DaySamples],
        predicted: Option<&Sequence>,
    ) -> SeriesOutput {
        let Some(predicted) = predicted else {
            let output = self.shape(resolution, period, actual_days);
            info!("Resolved {} {} points", output.len(), resolution);
            return output;
        };
        let multi_day = spans_days(period);
        let merged = match resolution {
            Resolution::FiveMinute => {
                let predicted = self.five_minute(predicted, period);
                let actual = self.five_minute(&join_days(actual_days), period);
                if multi_day {
                    merge_series_by_timestamp(&predicted, &actual)
                } else {
                    merge_series(&predicted, &actual)
                }
            }
            Resolution::Hourly => {
                let predicted = self.hourly(predicted, period);
                let actual = self.hourly(&join_days(actual_days), period);
                if multi_day {
                    merge_series_by_timestamp(&predicted, &actual)
                } else {
                    merge_series(&predicted, &actual)
                }
            }
            Resolution::Weekly => merge_series(
                &self.daily_present(self.interpolator.densify(predicted), period, weekly_label),
                &self.daily_present(self.densify_days(actual_days), period, weekly_label),
            ),
            Resolution::Monthly => merge_series(
                &self.daily_present(self.interpolator.densify(predicted), period, monthly_label),
                &self.daily_present(self.densify_days(actual_days), period, monthly_label),
            ),
        };
        info!("Resolved {} merged {} points", merged.len(), resolution);
        SeriesOutput::Merged(merged)
    }

    /// [`SeriesPipeline::resolve`] starting from raw rows.
    pub fn resolve_rows(
        &self,
        resolution: Resolution,
        period: &Period,
        days: &[DayRows],
        predicted: Option<&Sequence>,
    ) -> SeriesOutput {
        let actual: Vec<DaySamples> = days.iter().map(parse_day).collect();
        self.resolve(resolution, period, &actual, predicted)
    }
}
