//! Resolve actual load data for one view period.

use crate::output::emit;
use crate::source::data_source;
use crate::{OutputArgs, SeriesArgs};
use dlf_data::pipeline::SeriesPipeline;
use log::info;

/// Fetch and resolve the view period containing `--date`, or the period
/// before it with `previous`.
pub async fn run_load(series: &SeriesArgs, output: &OutputArgs, previous: bool) -> anyhow::Result<()> {
    let (resolution, config, date) = series.resolve()?;
    let pipeline = SeriesPipeline::new(config)?;
    let mut period = resolution.period_for(date);
    if previous {
        period = resolution.previous_period(&period);
    }
    info!(
        "Resolving {} load for {} .. {}",
        resolution, period.start, period.end
    );

    let source = data_source(series)?;
    let resolved = pipeline.fetch_actual(&source, resolution, &period).await?;
    emit(&resolved, &period, output)
}
