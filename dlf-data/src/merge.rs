//! Left join of a predicted series against actual data.

use crate::points::{MergedPoint, TimeKeyed};
use dlf_utils::dates::format_backend_timestamp;
use log::debug;
use std::collections::HashMap;

fn merge_with<P, A, KP, KA>(predicted: &[P], actual: &[A], predicted_key: KP, actual_key: KA) -> Vec<MergedPoint>
where
    P: TimeKeyed,
    A: TimeKeyed,
    KP: Fn(&P) -> String,
    KA: Fn(&A) -> String,
{
    let by_key: HashMap<String, f64> = actual
        .iter()
        .map(|point| (actual_key(point), point.total_load()))
        .collect();

    let merged: Vec<MergedPoint> = predicted
        .iter()
        .map(|point| {
            let key = predicted_key(point);
            MergedPoint {
                time: point.time(),
                actual_load: by_key.get(&key).copied(),
                predicted_load: point.total_load(),
                key,
            }
        })
        .collect();

    let matched = merged.iter().filter(|p| p.actual_load.is_some()).count();
    debug!(
        "Merged {} predicted points, {} with actual data",
        merged.len(),
        matched
    );
    merged
}

/// Attach the actual total load to every predicted point sharing its key.
///
/// Output follows the predicted series one-to-one. Predicted points without a
/// matching actual point get `actual_load: None`; actual points without a
/// predicted counterpart are dropped. When the actual series repeats a key,
/// the later point wins.
pub fn merge_series<P, A>(predicted: &[P], actual: &[A]) -> Vec<MergedPoint>
where
    P: TimeKeyed,
    A: TimeKeyed,
{
    merge_with(predicted, actual, P::time_key, A::time_key)
}

/// [`merge_series`] keyed on the full timestamp, for windows spanning
/// several days where a time of day repeats.
pub fn merge_series_by_timestamp<P, A>(predicted: &[P], actual: &[A]) -> Vec<MergedPoint>
where
    P: TimeKeyed,
    A: TimeKeyed,
{
    merge_with(
        predicted,
        actual,
        |p: &P| format_backend_timestamp(&p.time()),
        |a: &A| format_backend_timestamp(&a.time()),
    )
}
