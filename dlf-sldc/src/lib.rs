//! Core types and data sources for Delhi grid load series.
//!
//! Raw rows come from the SLDC load page (scraped HTML table), CSV exports
//! or JSON API items. [`row::RowParser`] turns them into validated
//! [`sample::LoadSample`]s; the prediction service is reached through
//! [`source::PredictionSource`].

pub mod channel;
#[cfg(feature = "api")]
pub mod client;
pub mod error;
pub mod file_source;
pub mod html;
pub mod prediction;
pub mod row;
pub mod sample;
pub mod source;
