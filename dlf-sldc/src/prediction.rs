//! Request and response shapes of the load prediction service.

use crate::error::{Result, SldcError};
use crate::sample::{LoadSample, Sequence};
use chrono::{NaiveDateTime, Timelike};
use dlf_utils::dates::{format_backend_timestamp, parse_timestamp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Message used when the service reports failure without saying why.
pub const DEFAULT_PREDICTION_ERROR: &str = "Failed to get predictions";

fn serialize_backend_timestamp<S: Serializer>(
    ts: &NaiveDateTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_backend_timestamp(ts))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<NaiveDateTime, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(serde::de::Error::custom)
}

/// Prediction window, serialised as local timestamps without a zone suffix:
/// `{"startDateTime": "2024-01-15T00:00:00", "endDateTime": "2024-01-15T23:59:59"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    #[serde(serialize_with = "serialize_backend_timestamp")]
    pub start_date_time: NaiveDateTime,
    #[serde(serialize_with = "serialize_backend_timestamp")]
    pub end_date_time: NaiveDateTime,
}

impl PredictionRequest {
    pub fn new(start_date_time: NaiveDateTime, end_date_time: NaiveDateTime) -> Self {
        PredictionRequest {
            start_date_time,
            end_date_time,
        }
    }
}

/// One predicted total load value.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PredictionPoint {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl PredictionPoint {
    /// The point as a total-only sample at minute resolution.
    pub fn to_sample(&self) -> LoadSample {
        let timestamp = self
            .timestamp
            .with_second(0)
            .and_then(|ts| ts.with_nanosecond(0))
            .unwrap_or(self.timestamp);
        LoadSample::total_only(timestamp, self.value)
    }
}

/// Convert predicted points into an ordered sequence.
pub fn points_to_sequence(points: &[PredictionPoint]) -> Sequence {
    points.iter().map(PredictionPoint::to_sample).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PredictionTimeRange {
    pub start: String,
    pub end: String,
}

/// Descriptive extras sent along with predictions; not used for shaping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PredictionMetadata {
    pub number_of_predictions: Option<usize>,
    #[serde(default)]
    pub features_used: Vec<String>,
    pub time_range: Option<PredictionTimeRange>,
}

/// Body returned by `POST /predict`, for success and failure alike.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PredictionEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub predictions: Vec<PredictionPoint>,
    pub error: Option<String>,
    pub metadata: Option<PredictionMetadata>,
}

impl PredictionEnvelope {
    pub fn from_json(body: &str) -> Result<PredictionEnvelope> {
        Ok(serde_json::from_str(body)?)
    }

    /// The predictions, provided the envelope's own success flag is set.
    pub fn into_points(self) -> Result<Vec<PredictionPoint>> {
        if self.success {
            Ok(self.predictions)
        } else {
            Err(SldcError::PredictionFailed(
                self.error
                    .unwrap_or_else(|| DEFAULT_PREDICTION_ERROR.to_string()),
            ))
        }
    }
}
