//! HTTP clients for the SLDC load page and the prediction service.

use crate::error::{Result, SldcError};
use crate::html::extract_load_rows;
use crate::prediction::{PredictionEnvelope, PredictionPoint, PredictionRequest};
use crate::row::RawRow;
use crate::source::{LoadSource, PredictionSource};
use chrono::NaiveDate;
use dlf_utils::dates::format_sldc_date;
use log::{info, warn};
use reqwest::{header, Client};
use std::time::Duration;

/// Public load page of the Delhi State Load Dispatch Centre.
pub const SLDC_LOAD_URL: &str = "https://www.delhisldc.org/Loaddata.aspx";

/// Default location of the prediction service.
pub const DEFAULT_PREDICTION_URL: &str = "http://localhost:5000";

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Scrapes the SLDC load table for a given day.
#[derive(Debug, Clone)]
pub struct SldcClient {
    client: Client,
    base_url: String,
    max_tries: u32,
}

impl SldcClient {
    pub fn new(client: Client) -> Self {
        SldcClient::with_base_url(client, SLDC_LOAD_URL)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        SldcClient {
            client,
            base_url: base_url.to_string(),
            max_tries: 3,
        }
    }

    /// Attempts per page before giving up; at least one.
    pub fn max_tries(mut self, max_tries: u32) -> Self {
        self.max_tries = max_tries.max(1);
        self
    }

    async fn fetch_page_once(&self, date: NaiveDate) -> Result<String> {
        let url = format!("{}?mode={}", self.base_url, format_sldc_date(&date));
        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SldcError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// Fetch the raw page for `date`, retrying with exponential backoff.
    pub async fn fetch_page(&self, date: NaiveDate) -> Result<String> {
        let mut sleep_millis: u64 = 1000;
        let mut attempt = 1;
        loop {
            match self.fetch_page_once(date).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.max_tries => {
                    warn!(
                        "Attempt {}/{}: load page for {} failed: {}",
                        attempt, self.max_tries, date, e
                    );
                    info!("Sleeping for {} milliseconds before retry", sleep_millis);
                    tokio::time::sleep(Duration::from_millis(sleep_millis)).await;
                    sleep_millis *= 2;
                    attempt += 1;
                }
                Err(e) => {
                    warn!("All attempts failed for {}", date);
                    return Err(e);
                }
            }
        }
    }
}

impl LoadSource for SldcClient {
    async fn fetch_rows(&self, date: NaiveDate) -> Result<Vec<RawRow>> {
        info!("Fetching SLDC load data for {}", format_sldc_date(&date));
        let page = self.fetch_page(date).await?;
        let rows = extract_load_rows(&page)?;
        info!("Found {} table rows for {}", rows.len(), date);
        Ok(rows)
    }
}

/// Client for the `POST /predict` endpoint.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: Client,
    base_url: String,
}

impl PredictionClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        PredictionClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl PredictionSource for PredictionClient {
    async fn fetch_predictions(&self, request: &PredictionRequest) -> Result<Vec<PredictionPoint>> {
        let url = format!("{}/predict", self.base_url);
        info!(
            "Requesting predictions {} .. {}",
            request.start_date_time, request.end_date_time
        );
        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("Prediction service answered {}: {}", status, body);
            return Err(SldcError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }
        let points = PredictionEnvelope::from_json(&body)?.into_points()?;
        info!("Received {} predictions", points.len());
        Ok(points)
    }
}
