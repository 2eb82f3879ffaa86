use crate::channel::ChannelLoads;
use chrono::NaiveDateTime;
use log::warn;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use thiserror::Error;

/// Number of numeric fields carried by a sample: the total plus five channels.
pub const VALUE_COUNT: usize = 6;

/// One load observation at a wall-clock minute in the grid's local time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadSample {
    pub timestamp: NaiveDateTime,
    /// Total Delhi load in MW
    pub total_load: f64,
    pub channel_loads: ChannelLoads,
}

impl LoadSample {
    pub fn new(timestamp: NaiveDateTime, total_load: f64, channel_loads: ChannelLoads) -> Self {
        LoadSample {
            timestamp,
            total_load,
            channel_loads,
        }
    }

    /// A sample carrying only a total, e.g. one predicted point.
    pub fn total_only(timestamp: NaiveDateTime, total_load: f64) -> Self {
        LoadSample::new(timestamp, total_load, ChannelLoads::default())
    }

    /// All numeric fields, total first, then channels in column order.
    pub fn values(&self) -> [f64; VALUE_COUNT] {
        let [a, b, c, d, e] = self.channel_loads.values();
        [self.total_load, a, b, c, d, e]
    }

    /// Inverse of [`LoadSample::values`].
    pub fn from_values(timestamp: NaiveDateTime, values: [f64; VALUE_COUNT]) -> Self {
        let [total, a, b, c, d, e] = values;
        LoadSample::new(timestamp, total, ChannelLoads::from_values([a, b, c, d, e]))
    }
}

/// A sequence whose timestamps are not strictly increasing.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("timestamps not strictly increasing at index {index}: {found} follows {previous}")]
pub struct SequenceError {
    pub index: usize,
    pub previous: NaiveDateTime,
    pub found: NaiveDateTime,
}

/// Samples in strictly increasing timestamp order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Sequence(Vec<LoadSample>);

impl Sequence {
    pub fn new() -> Self {
        Sequence(Vec::new())
    }

    /// Accept samples that are already strictly increasing.
    pub fn try_from_ordered(samples: Vec<LoadSample>) -> Result<Self, SequenceError> {
        for (index, pair) in samples.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SequenceError {
                    index: index + 1,
                    previous: pair[0].timestamp,
                    found: pair[1].timestamp,
                });
            }
        }
        Ok(Sequence(samples))
    }

    /// Sort by timestamp and drop repeated timestamps, keeping the first
    /// sample seen for each.
    pub fn from_unordered(mut samples: Vec<LoadSample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        let before = samples.len();
        samples.dedup_by_key(|s| s.timestamp);
        let dropped = before - samples.len();
        if dropped > 0 {
            warn!("Dropped {} samples with duplicate timestamps", dropped);
        }
        Sequence(samples)
    }

    pub fn into_inner(self) -> Vec<LoadSample> {
        self.0
    }
}

impl Deref for Sequence {
    type Target = [LoadSample];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<LoadSample> for Sequence {
    fn from_iter<T: IntoIterator<Item = LoadSample>>(iter: T) -> Self {
        Sequence::from_unordered(iter.into_iter().collect())
    }
}

impl IntoIterator for Sequence {
    type Item = LoadSample;
    type IntoIter = std::vec::IntoIter<LoadSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a LoadSample;
    type IntoIter = std::slice::Iter<'a, LoadSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
