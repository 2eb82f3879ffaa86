//! Seams to the two external collaborators: the raw row source and the
//! prediction service.

use crate::error::Result;
use crate::prediction::{PredictionPoint, PredictionRequest};
use crate::row::RawRow;
use chrono::NaiveDate;

/// Delivers the raw load rows recorded for one calendar day.
///
/// An empty vector means "no data for that day" and is not an error.
#[allow(async_fn_in_trait)]
pub trait LoadSource {
    async fn fetch_rows(&self, date: NaiveDate) -> Result<Vec<RawRow>>;
}

/// Predicts total load over a time window.
///
/// Implementations must check the service's own success flag and report a
/// failure envelope as an error, not just transport failures.
#[allow(async_fn_in_trait)]
pub trait PredictionSource {
    async fn fetch_predictions(&self, request: &PredictionRequest) -> Result<Vec<PredictionPoint>>;
}
