//! Headline figures for a resolved series.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StatValue {
    pub value: f64,
    /// Percent change against the previous period, one decimal place
    pub change: Option<f64>,
}

/// Current, peak and average load of one series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LoadStats {
    pub current: StatValue,
    pub peak: StatValue,
    pub average: StatValue,
}

/// Percent change from `previous` to `current`, rounded to one decimal.
/// A previous value of 0 yields 0.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    ((current - previous) / previous * 1000.0).round() / 10.0
}

struct Summary {
    current: f64,
    peak: f64,
    average: f64,
}

fn summarise(loads: &[f64]) -> Option<Summary> {
    let current = *loads.last()?;
    let peak = loads.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let average = (loads.iter().sum::<f64>() / loads.len() as f64).round();
    Some(Summary {
        current,
        peak,
        average,
    })
}

/// Compute stats for `current`, with changes when a previous series is given.
///
/// An empty series gives all zeros. The average never carries a change.
pub fn compute_stats(current: &[f64], previous: Option<&[f64]>) -> LoadStats {
    let Some(now) = summarise(current) else {
        return LoadStats::default();
    };
    let before = previous.and_then(summarise);
    let change = |pick: fn(&Summary) -> f64| {
        previous.map(|_| {
            before
                .as_ref()
                .map_or(0.0, |b| percent_change(pick(&now), pick(b)))
        })
    };
    LoadStats {
        current: StatValue {
            value: now.current,
            change: change(|s| s.current),
        },
        peak: StatValue {
            value: now.peak,
            change: change(|s| s.peak),
        },
        average: StatValue {
            value: now.average,
            change: None,
        },
    }
}
