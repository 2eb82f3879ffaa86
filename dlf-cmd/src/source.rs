//! Picking the raw row source for a command.

use crate::SeriesArgs;
use chrono::NaiveDate;
use dlf_sldc::client::SldcClient;
use dlf_sldc::error::Result;
use dlf_sldc::file_source::FileSource;
use dlf_sldc::row::RawRow;
use dlf_sldc::source::LoadSource;
use log::info;
use std::time::Duration;

/// Either a local export file or the live SLDC site.
pub enum DataSource {
    File(FileSource),
    Sldc(SldcClient),
}

impl LoadSource for DataSource {
    async fn fetch_rows(&self, date: NaiveDate) -> Result<Vec<RawRow>> {
        match self {
            DataSource::File(source) => source.fetch_rows(date).await,
            DataSource::Sldc(client) => client.fetch_rows(date).await,
        }
    }
}

pub fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()?)
}

/// The export file named by `--input`, or the SLDC site otherwise.
pub fn data_source(args: &SeriesArgs) -> anyhow::Result<DataSource> {
    match &args.input {
        Some(path) => {
            info!("Reading load rows from {}", path);
            Ok(DataSource::File(FileSource::from_path(path)?))
        }
        None => Ok(DataSource::Sldc(SldcClient::with_base_url(
            http_client()?,
            &args.sldc_url,
        ))),
    }
}
