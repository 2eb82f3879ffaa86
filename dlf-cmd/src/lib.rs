//! Command implementations for DLF CLI.
//!
//! Provides subcommands for resolving Delhi load data at a chosen
//! resolution, comparing it against forecasts, and summarising it.

use clap::{Args, Subcommand};
use dlf_data::pipeline::{HourlyMode, PipelineConfig, Resolution};
use dlf_utils::dates::parse_date;

pub mod forecast;
pub mod load;
pub mod output;
pub mod source;
pub mod stats;

/// Options shared by every command that resolves a series.
#[derive(Args, Debug, Clone)]
pub struct SeriesArgs {
    /// Day to show, YYYY-MM-DD (defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,

    /// View resolution: 5min, hourly, weekly or monthly
    #[arg(short, long, default_value = "5min")]
    pub resolution: String,

    /// How hourly points are built: filter (on-the-hour samples) or aggregate (hour averages)
    #[arg(long, default_value = "filter")]
    pub hourly_mode: String,

    /// Interpolation step in minutes
    #[arg(long, default_value_t = 5)]
    pub step_minutes: i64,

    /// Clamp interpolated and averaged values at 0 MW
    #[arg(long)]
    pub floor_at_zero: bool,

    /// Read raw rows from a CSV or JSON export instead of the SLDC site
    #[arg(short, long)]
    pub input: Option<String>,

    /// Base URL of the SLDC load page
    #[arg(long, env = "DLF_SLDC_URL", default_value = dlf_sldc::client::SLDC_LOAD_URL)]
    pub sldc_url: String,
}

impl SeriesArgs {
    /// Parse the textual options; fails before anything is fetched.
    pub fn resolve(&self) -> anyhow::Result<(Resolution, PipelineConfig, chrono::NaiveDate)> {
        let resolution: Resolution = self.resolution.parse()?;
        let hourly_mode: HourlyMode = self.hourly_mode.parse()?;
        let config = PipelineConfig {
            step_minutes: self.step_minutes,
            hourly_mode,
            floor_at_zero: self.floor_at_zero,
        };
        let date = match &self.date {
            Some(date) => parse_date(date)?,
            None => chrono::Local::now().naive_local().date(),
        };
        Ok((resolution, config, date))
    }
}

/// Where a command writes its series.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output path (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write JSON instead of CSV
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve actual load data for a day, week or month
    Load {
        #[command(flatten)]
        series: SeriesArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Resolve the previous period instead of the current one
        #[arg(long)]
        previous: bool,
    },

    /// Fetch predictions and merge them with actual load data
    Forecast {
        #[command(flatten)]
        series: SeriesArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Base URL of the prediction service
        #[arg(long, env = "DLF_PREDICTION_URL", default_value = dlf_sldc::client::DEFAULT_PREDICTION_URL)]
        prediction_url: String,

        /// Custom window start (YYYY-MM-DDTHH:MM:SS); overrides --date
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// Custom window end (YYYY-MM-DDTHH:MM:SS)
        #[arg(long, requires = "start")]
        end: Option<String>,

        /// Keep the predictions when actual data cannot be fetched
        #[arg(long)]
        degraded: bool,

        /// Skip actual data and output the predicted series alone
        #[arg(long, conflicts_with = "degraded")]
        predictions_only: bool,
    },

    /// Current, peak and average load with changes against the previous period
    Stats {
        #[command(flatten)]
        series: SeriesArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Load {
            series,
            output,
            previous,
        } => load::run_load(&series, &output, previous).await,
        Command::Forecast {
            series,
            output,
            prediction_url,
            start,
            end,
            degraded,
            predictions_only,
        } => {
            let options = forecast::ForecastOptions {
                prediction_url,
                start,
                end,
                degraded,
                predictions_only,
            };
            forecast::run_forecast(&series, &output, &options).await
        }
        Command::Stats { series, json } => stats::run_stats(&series, json).await,
    }
}
