//! Linear interpolation onto a fixed minute cadence.

use crate::error::PipelineError;
use crate::round_load;
use chrono::TimeDelta;
use dlf_sldc::sample::{LoadSample, VALUE_COUNT};

/// Default cadence of the densified series.
pub const DEFAULT_STEP_MINUTES: i64 = 5;

/// Fills the gaps between coarse samples with evenly spaced synthetic ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interpolator {
    step_minutes: i64,
    floor_at_zero: bool,
}

impl Default for Interpolator {
    fn default() -> Self {
        Interpolator {
            step_minutes: DEFAULT_STEP_MINUTES,
            floor_at_zero: false,
        }
    }
}

impl Interpolator {
    pub fn new(step_minutes: i64) -> Result<Self, PipelineError> {
        if step_minutes <= 0 {
            return Err(PipelineError::InvalidStep(step_minutes));
        }
        Ok(Interpolator {
            step_minutes,
            floor_at_zero: false,
        })
    }

    /// Clamp synthetic values at 0 MW.
    pub fn floor_at_zero(mut self, floor_at_zero: bool) -> Self {
        self.floor_at_zero = floor_at_zero;
        self
    }

    pub fn step_minutes(&self) -> i64 {
        self.step_minutes
    }

    /// Synthetic samples strictly between `start` and `end`.
    ///
    /// With `n` whole steps between the two, yields the `n - 1` samples at
    /// `start + j * step`; each field is `start + (end - start) * j / n`,
    /// rounded half away from zero. When the gap is not a whole number of
    /// steps the last synthetic sample falls short of `end - step`.
    pub fn interpolate_pair(&self, start: &LoadSample, end: &LoadSample) -> Vec<LoadSample> {
        let steps = (end.timestamp - start.timestamp).num_minutes() / self.step_minutes;
        if steps < 2 {
            return Vec::new();
        }
        let from = start.values();
        let to = end.values();
        let mut result = Vec::with_capacity((steps - 1) as usize);
        for j in 1..steps {
            let ratio = j as f64 / steps as f64;
            let timestamp = start.timestamp + TimeDelta::minutes(j * self.step_minutes);
            let mut values = [0.0; VALUE_COUNT];
            for (i, value) in values.iter_mut().enumerate() {
                *value = round_load(from[i] + (to[i] - from[i]) * ratio, self.floor_at_zero);
            }
            result.push(LoadSample::from_values(timestamp, values));
        }
        result
    }

    /// Densify a sorted series.
    ///
    /// Original samples are emitted untouched; the final sample appears once.
    /// Fewer than two samples come back unchanged. Unsorted input is the
    /// caller's bug: no synthetic samples are produced for backwards pairs.
    pub fn densify(&self, samples: &[LoadSample]) -> Vec<LoadSample> {
        if samples.len() < 2 {
            return samples.to_vec();
        }
        let mut result = Vec::with_capacity(samples.len());
        for pair in samples.windows(2) {
            let (start, end) = (&pair[0], &pair[1]);
            result.push(*start);
            result.extend(self.interpolate_pair(start, end));
        }
        if let Some(last) = samples.last() {
            result.push(*last);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use dlf_sldc::channel::ChannelLoads;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn sample(h: u32, m: u32, load: f64) -> LoadSample {
        LoadSample::total_only(at(h, m), load)
    }

    #[test]
    fn hour_gap_becomes_twelve_steps() {
        let input = [sample(10, 0, 100.0), sample(11, 0, 200.0)];
        let output = Interpolator::default().densify(&input);
        assert_eq!(output.len(), 13);
        assert_eq!(output[0].timestamp, at(10, 0));
        assert_eq!(output[11].timestamp, at(10, 55));
        assert_eq!(output[12].timestamp, at(11, 0));
        assert_eq!(output[6].timestamp, at(10, 30));
        assert_eq!(output[6].total_load, 150.0);
    }

    #[test]
    fn output_is_strictly_increasing() {
        let input = [
            sample(0, 0, 3000.0),
            sample(1, 0, 2900.0),
            sample(1, 20, 2950.0),
            sample(3, 0, 2800.0),
            sample(3, 7, 2810.0),
        ];
        let output = Interpolator::default().densify(&input);
        assert!(output.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn endpoints_are_not_rounded() {
        let input = [sample(10, 0, 100.4), sample(10, 30, 200.6)];
        let output = Interpolator::default().densify(&input);
        assert_eq!(output.first().unwrap().total_load, 100.4);
        assert_eq!(output.last().unwrap().total_load, 200.6);
        // interior points are whole MW
        for point in &output[1..output.len() - 1] {
            assert_eq!(point.total_load, point.total_load.round());
        }
    }

    #[test]
    fn every_channel_is_interpolated() {
        let a = LoadSample::new(
            at(14, 0),
            100.0,
            ChannelLoads::from_values([10.0, 20.0, 30.0, 40.0, 50.0]),
        );
        let b = LoadSample::new(
            at(14, 10),
            200.0,
            ChannelLoads::from_values([20.0, 20.0, 10.0, 41.0, 0.0]),
        );
        let output = Interpolator::default().densify(&[a, b]);
        assert_eq!(output.len(), 3);
        let mid = output[1];
        assert_eq!(mid.timestamp, at(14, 5));
        assert_eq!(mid.total_load, 150.0);
        // 40.5 rounds half away from zero
        assert_eq!(mid.channel_loads.values(), [15.0, 20.0, 20.0, 41.0, 25.0]);
    }

    #[test]
    fn uneven_gap_keeps_best_effort_alignment() {
        // 17 minutes is 3 whole steps: synthetic points at +5 and +10 only
        let input = [sample(10, 0, 0.0), sample(10, 17, 30.0)];
        let output = Interpolator::default().densify(&input);
        let times: Vec<_> = output.iter().map(|s| s.timestamp).collect();
        assert_eq!(times, vec![at(10, 0), at(10, 5), at(10, 10), at(10, 17)]);
        assert_eq!(output[1].total_load, 10.0);
        assert_eq!(output[2].total_load, 20.0);
    }

    #[test]
    fn short_inputs_come_back_unchanged() {
        let interpolator = Interpolator::default();
        assert!(interpolator.densify(&[]).is_empty());
        let single = [sample(10, 0, 5.0)];
        assert_eq!(interpolator.densify(&single), single.to_vec());
        // already at cadence: nothing to add
        let dense = [sample(10, 0, 5.0), sample(10, 5, 6.0)];
        assert_eq!(interpolator.densify(&dense), dense.to_vec());
    }

    #[test]
    fn input_is_left_untouched() {
        let input = vec![sample(10, 0, 100.0), sample(11, 0, 200.0)];
        let copy = input.clone();
        let _ = Interpolator::default().densify(&input);
        assert_eq!(input, copy);
    }

    #[test]
    fn custom_step_and_invalid_step() {
        let interpolator = Interpolator::new(15).unwrap();
        let output = interpolator.densify(&[sample(10, 0, 0.0), sample(11, 0, 40.0)]);
        assert_eq!(output.len(), 5);
        assert_eq!(output[2].total_load, 20.0);
        assert!(matches!(
            Interpolator::new(0),
            Err(PipelineError::InvalidStep(0))
        ));
    }

    #[test]
    fn floor_clamps_negative_interpolation() {
        // negative predictions can reach the interpolator
        let input = [sample(10, 0, -20.0), sample(10, 10, 10.0)];
        let plain = Interpolator::default().densify(&input);
        assert_eq!(plain[1].total_load, -5.0);
        let floored = Interpolator::default().floor_at_zero(true).densify(&input);
        assert_eq!(floored[1].total_load, 0.0);
    }
}
