//! Data processing for grid load series.
//!
//! This crate turns parsed [`LoadSample`](dlf_sldc::sample::LoadSample)s into
//! the uniform series a dashboard charts: densified to a fixed cadence,
//! rolled up into hourly or daily averages, and joined against predictions.
//! Everything here is synchronous and allocation-only except [`fetch`], which
//! awaits the external sources in order.

pub mod aggregation;
pub mod error;
pub mod fetch;
pub mod interpolation;
pub mod merge;
pub mod pipeline;
pub mod points;
pub mod stats;

/// Round half away from zero, optionally clamping at 0 MW.
pub(crate) fn round_load(value: f64, floor_at_zero: bool) -> f64 {
    let rounded = value.round();
    if floor_at_zero {
        rounded.max(0.0)
    } else {
        rounded
    }
}
