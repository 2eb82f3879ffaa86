//! Headline load figures for a view period against the one before it.

use crate::source::data_source;
use crate::SeriesArgs;
use dlf_data::pipeline::{Resolution, SeriesPipeline};
use dlf_data::stats::{compute_stats, LoadStats, StatValue};
use dlf_utils::periods::Period;
use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct StatsReport {
    resolution: String,
    period_start: String,
    period_end: String,
    points: usize,
    stats: LoadStats,
}

fn format_stat(title: &str, stat: &StatValue) -> String {
    match stat.change {
        Some(change) => format!("{:<14} {:>8} MW ({:+.1}%)", title, stat.value, change),
        None => format!("{:<14} {:>8} MW", title, stat.value),
    }
}

fn render(stats: &LoadStats) -> String {
    [
        format_stat("Current Load", &stats.current),
        format_stat("Peak Load", &stats.peak),
        format_stat("Average Load", &stats.average),
    ]
    .join("\n")
}

fn report(resolution: Resolution, period: &Period, points: usize, stats: LoadStats) -> StatsReport {
    StatsReport {
        resolution: resolution.to_string(),
        period_start: period.start.to_string(),
        period_end: period.end.to_string(),
        points,
        stats,
    }
}

/// Resolve the current and previous periods concurrently and summarise.
///
/// A failed previous period only drops the change figures.
pub async fn run_stats(series: &SeriesArgs, json: bool) -> anyhow::Result<()> {
    let (resolution, config, date) = series.resolve()?;
    let pipeline = SeriesPipeline::new(config)?;
    let period = resolution.period_for(date);
    let previous_period = resolution.previous_period(&period);
    let source = data_source(series)?;

    let (current, previous) = tokio::join!(
        pipeline.fetch_actual(&source, resolution, &period),
        pipeline.fetch_actual(&source, resolution, &previous_period),
    );
    let current = current?;
    let previous = match previous {
        Ok(previous) => Some(previous.total_loads()),
        Err(e) => {
            warn!("Previous period unavailable: {}", e);
            None
        }
    };
    info!("Summarising {} {} points", current.len(), resolution);

    let stats = compute_stats(&current.total_loads(), previous.as_deref());
    if json {
        let report = report(resolution, &period, current.len(), stats);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if current.is_empty() {
        println!("{}", crate::output::no_data_notice(&period));
    } else {
        println!("{}", render(&stats));
    }
    Ok(())
}
