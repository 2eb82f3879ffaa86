//! Predictions, optionally merged with actual load data.

use crate::output::emit;
use crate::source::{data_source, http_client};
use crate::{OutputArgs, SeriesArgs};
use dlf_data::pipeline::{checked_period, SeriesPipeline};
use dlf_sldc::client::PredictionClient;
use dlf_utils::dates::parse_timestamp;
use dlf_utils::periods::Period;
use log::info;

/// Forecast-specific flags.
#[derive(Debug, Clone)]
pub struct ForecastOptions {
    pub prediction_url: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub degraded: bool,
    pub predictions_only: bool,
}

impl ForecastOptions {
    /// The explicit `--start`/`--end` window, if both were given.
    pub fn custom_period(&self) -> anyhow::Result<Option<Period>> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => {
                let period = checked_period(parse_timestamp(start)?, parse_timestamp(end)?)?;
                Ok(Some(period))
            }
            _ => Ok(None),
        }
    }
}

pub async fn run_forecast(
    series: &SeriesArgs,
    output: &OutputArgs,
    options: &ForecastOptions,
) -> anyhow::Result<()> {
    let (resolution, config, date) = series.resolve()?;
    let pipeline = SeriesPipeline::new(config)?;
    let period = match options.custom_period()? {
        Some(period) => period,
        None => resolution.period_for(date),
    };
    info!(
        "Forecasting {} load for {} .. {}",
        resolution, period.start, period.end
    );

    let predictions = PredictionClient::new(http_client()?, &options.prediction_url);
    let resolved = if options.predictions_only {
        pipeline
            .fetch_predicted_only(&predictions, resolution, &period)
            .await?
    } else {
        let source = data_source(series)?;
        if options.degraded {
            pipeline
                .fetch_merged_degraded(&source, &predictions, resolution, &period)
                .await?
        } else {
            pipeline
                .fetch_merged(&source, &predictions, resolution, &period)
                .await?
        }
    };
    emit(&resolved, &period, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(start: Option<&str>, end: Option<&str>) -> ForecastOptions {
        ForecastOptions {
            prediction_url: "http://localhost:5000".to_string(),
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            degraded: false,
            predictions_only: false,
        }
    }

    #[test]
    fn custom_window() {
        let period = options(Some("2024-01-15T06:00:00"), Some("2024-01-15T18:00:00"))
            .custom_period()
            .unwrap()
            .unwrap();
        assert_eq!(period.start.to_string(), "2024-01-15 06:00:00");
        assert!(options(None, None).custom_period().unwrap().is_none());
    }

    #[test]
    fn reversed_window_is_rejected() {
        let result = options(Some("2024-01-15T18:00:00"), Some("2024-01-15T06:00:00")).custom_period();
        assert!(result.is_err());
    }
}
