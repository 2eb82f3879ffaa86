//! Offline raw-row source backed by an exported file.
//!
//! Two layouts are read:
//!
//! - CSV with a header row and columns `date,time,total,brpl,bypl,ndpl,ndmc,mes`,
//!   dates as `YYYY-MM-DD`;
//! - JSON mapping each `YYYY-MM-DD` date to an array of API items, e.g.
//!   `{"2024-01-15": [{"time": "14:00", "load": 100, "brpl": 40}]}`.

use crate::error::{Result, SldcError};
use crate::row::RawRow;
use crate::source::LoadSource;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use dlf_utils::dates::parse_date;
use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Raw rows grouped by calendar day, in file order within each day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSource {
    rows_by_date: BTreeMap<NaiveDate, Vec<RawRow>>,
}

impl FileSource {
    /// Parse CSV text. Records whose date column does not parse are skipped.
    pub fn parse_csv(csv_object: &str) -> Result<FileSource> {
        let mut rows_by_date: BTreeMap<NaiveDate, Vec<RawRow>> = BTreeMap::new();
        let mut skipped = 0usize;
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_object.as_bytes());
        for result in rdr.records() {
            let record = result?;
            let date = match record.get(0).and_then(|d| parse_date(d).ok()) {
                Some(d) => d,
                None => {
                    skipped += 1;
                    continue;
                }
            };
            let row = RawRow::new(record.iter().skip(1));
            rows_by_date.entry(date).or_default().push(row);
        }
        if skipped > 0 {
            warn!("Skipped {} CSV records without a valid date", skipped);
        }
        Ok(FileSource { rows_by_date })
    }

    /// Parse a JSON object of dated item arrays. Keys that are not dates
    /// are skipped; any other shape is an error.
    pub fn parse_json(json_object: &str) -> Result<FileSource> {
        let value: Value = serde_json::from_str(json_object)?;
        let Value::Object(days) = value else {
            return Err(SldcError::InvalidFormat(
                "expected an object keyed by date".to_string(),
            ));
        };
        let mut rows_by_date = BTreeMap::new();
        for (key, items) in &days {
            let Ok(date) = parse_date(key) else {
                warn!("Skipping JSON key {:?}: not a date", key);
                continue;
            };
            let Value::Array(items) = items else {
                return Err(SldcError::InvalidFormat(format!(
                    "expected an array of items for {}",
                    key
                )));
            };
            rows_by_date.insert(date, items.iter().map(RawRow::from_json_item).collect());
        }
        Ok(FileSource { rows_by_date })
    }

    /// Read a file, as JSON when its extension is `json` and CSV otherwise.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<FileSource> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let source = if is_json {
            FileSource::parse_json(&body)?
        } else {
            FileSource::parse_csv(&body)?
        };
        info!(
            "Loaded {} days of raw rows from {}",
            source.rows_by_date.len(),
            path.display()
        );
        Ok(source)
    }

    /// Days present in the export, ascending.
    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.rows_by_date.keys()
    }
}

impl LoadSource for FileSource {
    async fn fetch_rows(&self, date: NaiveDate) -> Result<Vec<RawRow>> {
        Ok(self.rows_by_date.get(&date).cloned().unwrap_or_default())
    }
}
