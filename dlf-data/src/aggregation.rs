//! Bucketed averages over load samples.
//!
//! The aggregator knows nothing about hours, days or months: callers pass a
//! key function (see [`dlf_utils::buckets`]). Keys must order
//! chronologically; output is always sorted by key, whatever order the
//! samples arrived in.

use crate::round_load;
use chrono::NaiveDateTime;
use dlf_sldc::channel::ChannelLoads;
use dlf_sldc::sample::{LoadSample, VALUE_COUNT};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Samples that share a bucket key.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<K> {
    pub key: K,
    pub samples: Vec<LoadSample>,
}

/// Per-bucket mean of every numeric field, rounded to whole MW.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AveragedSample<K> {
    pub key: K,
    pub total_load: f64,
    pub channel_loads: ChannelLoads,
    /// Number of samples folded into the average; 0 for a pre-populated
    /// bucket that received no data.
    pub sample_count: usize,
}

/// Arithmetic mean of each field, or `None` for no samples.
pub fn mean_values(samples: &[LoadSample]) -> Option<[f64; VALUE_COUNT]> {
    if samples.is_empty() {
        return None;
    }
    let mut sums = [0.0; VALUE_COUNT];
    for sample in samples {
        for (sum, value) in sums.iter_mut().zip(sample.values()) {
            *sum += value;
        }
    }
    let count = samples.len() as f64;
    Some(sums.map(|sum| sum / count))
}

impl<K: Clone> Bucket<K> {
    /// Average this bucket; an empty bucket averages to 0 on every field.
    pub fn average(&self, floor_at_zero: bool) -> AveragedSample<K> {
        let values = mean_values(&self.samples)
            .map(|means| means.map(|m| round_load(m, floor_at_zero)))
            .unwrap_or([0.0; VALUE_COUNT]);
        let [total, a, b, c, d, e] = values;
        AveragedSample {
            key: self.key.clone(),
            total_load: total,
            channel_loads: ChannelLoads::from_values([a, b, c, d, e]),
            sample_count: self.samples.len(),
        }
    }
}

/// Group samples by key, ascending by key.
pub fn group_into_buckets<K, F>(samples: &[LoadSample], bucket_key: F) -> Vec<Bucket<K>>
where
    K: Ord,
    F: Fn(&NaiveDateTime) -> K,
{
    let mut grouped: BTreeMap<K, Vec<LoadSample>> = BTreeMap::new();
    for sample in samples {
        grouped
            .entry(bucket_key(&sample.timestamp))
            .or_default()
            .push(*sample);
    }
    grouped
        .into_iter()
        .map(|(key, samples)| Bucket { key, samples })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Aggregator {
    floor_at_zero: bool,
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator::default()
    }

    /// Clamp averages at 0 MW.
    pub fn floor_at_zero(mut self, floor_at_zero: bool) -> Self {
        self.floor_at_zero = floor_at_zero;
        self
    }

    /// One averaged sample per bucket that received data.
    pub fn aggregate<K, F>(&self, samples: &[LoadSample], bucket_key: F) -> Vec<AveragedSample<K>>
    where
        K: Ord + Clone,
        F: Fn(&NaiveDateTime) -> K,
    {
        group_into_buckets(samples, bucket_key)
            .iter()
            .map(|bucket| bucket.average(self.floor_at_zero))
            .collect()
    }

    /// One averaged sample per expected key, data or not.
    ///
    /// Buckets are pre-populated empty, so keys without samples average to 0.
    /// Samples whose key is not expected are left out.
    pub fn aggregate_expected<K, F, I>(
        &self,
        samples: &[LoadSample],
        expected: I,
        bucket_key: F,
    ) -> Vec<AveragedSample<K>>
    where
        K: Ord + Clone,
        F: Fn(&NaiveDateTime) -> K,
        I: IntoIterator<Item = K>,
    {
        let mut grouped: BTreeMap<K, Vec<LoadSample>> =
            expected.into_iter().map(|key| (key, Vec::new())).collect();
        let mut outside = 0usize;
        for sample in samples {
            match grouped.get_mut(&bucket_key(&sample.timestamp)) {
                Some(bucket) => bucket.push(*sample),
                None => outside += 1,
            }
        }
        if outside > 0 {
            debug!("{} samples fell outside the expected buckets", outside);
        }
        grouped
            .into_iter()
            .map(|(key, samples)| Bucket { key, samples }.average(self.floor_at_zero))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use dlf_utils::buckets::{calendar_day, hour_floor, month_start};
    use dlf_utils::date_range::DateRange;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn sample(d: u32, h: u32, m: u32, load: f64) -> LoadSample {
        LoadSample::total_only(at(d, h, m), load)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn hourly_buckets_average_and_round() {
        let samples = [
            sample(15, 10, 0, 100.0),
            sample(15, 10, 5, 101.0),
            sample(15, 11, 0, 200.0),
        ];
        let averaged = Aggregator::new().aggregate(&samples, hour_floor);
        assert_eq!(averaged.len(), 2);
        assert_eq!(averaged[0].key, at(15, 10, 0));
        // 100.5 rounds half away from zero
        assert_eq!(averaged[0].total_load, 101.0);
        assert_eq!(averaged[0].sample_count, 2);
        assert_eq!(averaged[1].total_load, 200.0);
    }

    #[test]
    fn output_is_chronological_regardless_of_input_order() {
        let samples = [
            sample(17, 9, 0, 3.0),
            sample(15, 9, 0, 1.0),
            sample(16, 9, 0, 2.0),
        ];
        let averaged = Aggregator::new().aggregate(&samples, calendar_day);
        let keys: Vec<_> = averaged.iter().map(|a| a.key).collect();
        assert_eq!(keys, vec![date(15), date(16), date(17)]);
    }

    #[test]
    fn week_with_three_days_of_data_has_seven_rows() {
        let samples = [
            sample(14, 0, 0, 100.0),
            sample(14, 12, 0, 200.0),
            sample(16, 0, 0, 300.0),
            sample(20, 0, 0, 400.0),
        ];
        let week = DateRange(date(14), date(20));
        let averaged = Aggregator::new().aggregate_expected(&samples, week, calendar_day);
        assert_eq!(averaged.len(), 7);
        assert_eq!(averaged[0].total_load, 150.0);
        assert_eq!(averaged[2].total_load, 300.0);
        assert_eq!(averaged[6].total_load, 400.0);
        let empty: Vec<_> = averaged.iter().filter(|a| a.sample_count == 0).collect();
        assert_eq!(empty.len(), 4);
        assert!(empty
            .iter()
            .all(|a| a.total_load == 0.0 && a.channel_loads == ChannelLoads::default()));
    }

    #[test]
    fn unexpected_keys_are_left_out() {
        let samples = [sample(13, 0, 0, 999.0), sample(14, 0, 0, 10.0)];
        let averaged =
            Aggregator::new().aggregate_expected(&samples, [date(14)], calendar_day);
        assert_eq!(averaged.len(), 1);
        assert_eq!(averaged[0].total_load, 10.0);
    }

    #[test]
    fn empty_input_is_empty_output() {
        let averaged = Aggregator::new().aggregate(&[], month_start);
        assert!(averaged.is_empty());
    }

    #[test]
    fn channels_are_averaged_independently() {
        let mut a = sample(15, 10, 0, 10.0);
        a.channel_loads.ndmc = 3.0;
        let mut b = sample(15, 10, 5, 20.0);
        b.channel_loads.ndmc = 4.0;
        let averaged = Aggregator::new().aggregate(&[a, b], hour_floor);
        assert_eq!(averaged[0].total_load, 15.0);
        assert_eq!(averaged[0].channel_loads.ndmc, 4.0);
        assert_eq!(averaged[0].channel_loads.brpl, 0.0);
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert!(mean_values(&[]).is_none());
        let means = mean_values(&[sample(15, 0, 0, 1.0), sample(15, 0, 5, 2.0)]).unwrap();
        assert_eq!(means[0], 1.5);
    }
}
