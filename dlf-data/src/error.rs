use dlf_sldc::error::SldcError;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors surfaced by a pipeline invocation.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Resolution name not recognised; raised before anything is fetched
    #[error("invalid resolution {0:?} (expected 5min, hourly, weekly or monthly)")]
    InvalidResolution(String),

    #[error("invalid hourly mode {0:?} (expected filter or aggregate)")]
    InvalidHourlyMode(String),

    #[error("interpolation step must be positive, got {0} minutes")]
    InvalidStep(i64),

    #[error("range end {end} precedes start {start}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// The raw load source failed
    #[error("load data fetch failed: {0}")]
    Source(#[source] SldcError),

    /// The prediction service failed or reported failure
    #[error("prediction fetch failed: {0}")]
    Prediction(#[source] SldcError),
}
