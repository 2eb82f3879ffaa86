//! Awaiting the external collaborators and feeding the pipeline.
//!
//! Calls here are sequential; callers that want the current and previous
//! periods at once can join two of them. Nothing is retried at this layer.

use crate::error::PipelineError;
use crate::pipeline::{parse_day, DayRows, DaySamples, Resolution, SeriesPipeline};
use crate::points::SeriesOutput;
use dlf_sldc::error::SldcError;
use dlf_sldc::prediction::{points_to_sequence, PredictionRequest};
use dlf_sldc::sample::Sequence;
use dlf_sldc::source::{LoadSource, PredictionSource};
use dlf_utils::periods::Period;
use log::{info, warn};

/// Fetch the raw rows of every calendar day in `period`, oldest first.
pub async fn fetch_days<S: LoadSource>(
    source: &S,
    period: &Period,
) -> Result<Vec<DayRows>, SldcError> {
    let mut days = Vec::with_capacity(period.days().num_days());
    for date in period.days() {
        let rows = source.fetch_rows(date).await?;
        days.push(DayRows { date, rows });
    }
    Ok(days)
}

/// Ask the prediction service for `period` and order the answer.
pub async fn fetch_predicted<P: PredictionSource>(
    source: &P,
    period: &Period,
) -> Result<Sequence, SldcError> {
    let request = PredictionRequest::new(period.start, period.end);
    let points = source.fetch_predictions(&request).await?;
    Ok(points_to_sequence(&points))
}

impl SeriesPipeline {
    async fn actual_days<S: LoadSource>(
        &self,
        source: &S,
        period: &Period,
    ) -> Result<Vec<DaySamples>, PipelineError> {
        let days = fetch_days(source, period)
            .await
            .map_err(PipelineError::Source)?;
        Ok(days.iter().map(parse_day).collect())
    }

    /// Actual load for `period` at `resolution`.
    pub async fn fetch_actual<S: LoadSource>(
        &self,
        source: &S,
        resolution: Resolution,
        period: &Period,
    ) -> Result<SeriesOutput, PipelineError> {
        let days = self.actual_days(source, period).await?;
        Ok(self.resolve(resolution, period, &days, None))
    }

    /// Predicted load for `period`, shaped like an actual series.
    pub async fn fetch_predicted_only<P: PredictionSource>(
        &self,
        predictions: &P,
        resolution: Resolution,
        period: &Period,
    ) -> Result<SeriesOutput, PipelineError> {
        let predicted = fetch_predicted(predictions, period)
            .await
            .map_err(PipelineError::Prediction)?;
        Ok(self.shape_continuous(resolution, period, &predicted))
    }

    /// Predictions merged with actual data; either failure is an error.
    ///
    /// Predictions are fetched first. If they fail, actual data is never
    /// requested and nothing is merged.
    pub async fn fetch_merged<S: LoadSource, P: PredictionSource>(
        &self,
        source: &S,
        predictions: &P,
        resolution: Resolution,
        period: &Period,
    ) -> Result<SeriesOutput, PipelineError> {
        let predicted = fetch_predicted(predictions, period)
            .await
            .map_err(PipelineError::Prediction)?;
        let days = self.actual_days(source, period).await?;
        Ok(self.resolve(resolution, period, &days, Some(&predicted)))
    }

    /// Like [`SeriesPipeline::fetch_merged`], but an actual-data failure
    /// yields the predictions with no actual values instead of an error.
    pub async fn fetch_merged_degraded<S: LoadSource, P: PredictionSource>(
        &self,
        source: &S,
        predictions: &P,
        resolution: Resolution,
        period: &Period,
    ) -> Result<SeriesOutput, PipelineError> {
        let predicted = fetch_predicted(predictions, period)
            .await
            .map_err(PipelineError::Prediction)?;
        let days = match self.actual_days(source, period).await {
            Ok(days) => days,
            Err(e) => {
                warn!("Continuing with predictions only: {}", e);
                Vec::new()
            }
        };
        info!("Merging {} predictions for {}", predicted.len(), resolution);
        Ok(self.resolve(resolution, period, &days, Some(&predicted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineConfig;
    use chrono::{NaiveDate, NaiveDateTime};
    use dlf_sldc::error::Result;
    use dlf_sldc::prediction::PredictionPoint;
    use dlf_sldc::row::RawRow;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, m, 0).unwrap()
    }

    #[derive(Default)]
    struct FakeLoads {
        days: HashMap<NaiveDate, Vec<RawRow>>,
        fail: bool,
        requested: RefCell<Vec<NaiveDate>>,
    }

    impl FakeLoads {
        fn with_day(mut self, d: u32, rows: &[(&str, &str)]) -> Self {
            let rows = rows.iter().map(|(t, l)| RawRow::new([*t, *l])).collect();
            self.days.insert(date(d), rows);
            self
        }
    }

    impl LoadSource for FakeLoads {
        async fn fetch_rows(&self, date: NaiveDate) -> Result<Vec<RawRow>> {
            self.requested.borrow_mut().push(date);
            if self.fail {
                return Err(SldcError::BadStatus {
                    status: 503,
                    body: "Service Unavailable".to_string(),
                });
            }
            Ok(self.days.get(&date).cloned().unwrap_or_default())
        }
    }

    struct FakePredictions {
        points: Vec<PredictionPoint>,
        error: Option<String>,
        calls: Cell<usize>,
    }

    impl FakePredictions {
        fn returning(points: &[(NaiveDateTime, f64)]) -> Self {
            FakePredictions {
                points: points
                    .iter()
                    .map(|&(timestamp, value)| PredictionPoint { timestamp, value })
                    .collect(),
                error: None,
                calls: Cell::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            FakePredictions {
                points: Vec::new(),
                error: Some(message.to_string()),
                calls: Cell::new(0),
            }
        }
    }

    impl PredictionSource for FakePredictions {
        async fn fetch_predictions(&self, _request: &PredictionRequest) -> Result<Vec<PredictionPoint>> {
            self.calls.set(self.calls.get() + 1);
            match &self.error {
                Some(message) => Err(SldcError::PredictionFailed(message.clone())),
                None => Ok(self.points.clone()),
            }
        }
    }

    fn pipeline() -> SeriesPipeline {
        SeriesPipeline::new(PipelineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn fetches_each_day_of_a_week_in_order() {
        let source = FakeLoads::default().with_day(16, &[("10:00", "100")]);
        let week = Resolution::Weekly.period_for(date(16));
        let days = fetch_days(&source, &week).await.unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(*source.requested.borrow(), (14..=20).map(date).collect::<Vec<_>>());
        assert_eq!(days[2].rows.len(), 1);
    }

    #[tokio::test]
    async fn actual_five_minute_series() {
        let source = FakeLoads::default().with_day(15, &[("14:00", "100"), ("15:00", "140")]);
        let output = pipeline()
            .fetch_actual(&source, Resolution::FiveMinute, &Period::day(date(15)))
            .await
            .unwrap();
        assert_eq!(output.len(), 13);
    }

    #[tokio::test]
    async fn empty_day_is_empty_series_not_error() {
        let source = FakeLoads::default();
        let output = pipeline()
            .fetch_actual(&source, Resolution::Hourly, &Period::day(date(15)))
            .await
            .unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn strict_merge() {
        let source = FakeLoads::default().with_day(15, &[("09:00", "2990"), ("09:10", "2980")]);
        let predictions =
            FakePredictions::returning(&[(at(15, 9, 0), 3000.0), (at(15, 9, 5), 3010.0)]);
        let output = pipeline()
            .fetch_merged(&source, &predictions, Resolution::FiveMinute, &Period::day(date(15)))
            .await
            .unwrap();
        let SeriesOutput::Merged(points) = output else {
            panic!("expected merged output");
        };
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].actual_load, Some(2990.0));
        assert_eq!(points[1].actual_load, Some(2985.0));
    }

    #[tokio::test]
    async fn prediction_failure_stops_before_actual_fetch() {
        let source = FakeLoads::default().with_day(15, &[("09:00", "1")]);
        let predictions = FakePredictions::failing("Model not loaded properly");
        let err = pipeline()
            .fetch_merged_degraded(&source, &predictions, Resolution::Hourly, &Period::day(date(15)))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Prediction(SldcError::PredictionFailed(_))));
        assert!(source.requested.borrow().is_empty());
        assert_eq!(predictions.calls.get(), 1);
    }

    #[tokio::test]
    async fn actual_failure_strict_vs_degraded() {
        let source = FakeLoads {
            fail: true,
            ..FakeLoads::default()
        };
        let predictions = FakePredictions::returning(&[(at(15, 10, 0), 1.0), (at(15, 11, 0), 2.0)]);
        let day = Period::day(date(15));

        let err = pipeline()
            .fetch_merged(&source, &predictions, Resolution::Hourly, &day)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Source(SldcError::BadStatus { status: 503, .. })));

        let output = pipeline()
            .fetch_merged_degraded(&source, &predictions, Resolution::Hourly, &day)
            .await
            .unwrap();
        let SeriesOutput::Merged(points) = output else {
            panic!("expected merged output");
        };
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.actual_load.is_none()));
    }

    #[tokio::test]
    async fn predictions_alone_are_shaped() {
        let predictions = FakePredictions::returning(&[(at(15, 10, 0), 100.0), (at(15, 11, 0), 200.0)]);
        let output = pipeline()
            .fetch_predicted_only(&predictions, Resolution::FiveMinute, &Period::day(date(15)))
            .await
            .unwrap();
        assert_eq!(output.len(), 13);
    }
}
