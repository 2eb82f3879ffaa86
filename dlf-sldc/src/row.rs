//! Raw rows and the parser that validates them into [`LoadSample`]s.
//!
//! A row is structurally invalid (rejected) when it lacks a usable time field
//! or a load column. A channel value that is missing or not a number is not a
//! rejection: it reads as 0 MW.

use crate::channel::{Channel, ChannelLoads};
use crate::sample::LoadSample;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use csv::StringRecord;
use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;

/// A row needs its time field plus the total load column.
pub const MIN_ROW_FIELDS: usize = 2;

/// Columns in a full SLDC load table row: time, total, five channels.
pub const SLDC_ROW_FIELDS: usize = 7;

/// One unvalidated source record: the time field followed by load columns
/// (total, then channels in [`Channel::ALL`] order).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRow {
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RawRow {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a row from a JSON API item such as
    /// `{"time": "14:05", "load": 4100, "brpl": "1650.2", ...}`.
    ///
    /// The time may be under `time` or `timestamp`; numbers and numeric
    /// strings are both accepted, absent fields become empty cells.
    pub fn from_json_item(item: &Value) -> RawRow {
        fn cell(value: Option<&Value>) -> String {
            match value {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            }
        }
        let time = cell(item.get("time").or_else(|| item.get("timestamp")));
        let mut cells = Vec::with_capacity(SLDC_ROW_FIELDS);
        cells.push(time);
        cells.push(cell(item.get("load")));
        for channel in Channel::ALL {
            cells.push(cell(item.get(channel.key())));
        }
        RawRow { cells }
    }

    pub fn time_field(&self) -> Option<&str> {
        self.cells.first().map(String::as_str)
    }
}

impl From<&StringRecord> for RawRow {
    fn from(record: &StringRecord) -> Self {
        RawRow::new(record.iter())
    }
}

impl From<StringRecord> for RawRow {
    fn from(record: StringRecord) -> Self {
        RawRow::from(&record)
    }
}

/// Why a row was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("row has {found} fields, need at least 2")]
    TooFewFields { found: usize },

    #[error("unparseable time field: {0:?}")]
    UnparseableTime(String),
}

/// Outcome of parsing a batch of rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedRows {
    pub samples: Vec<LoadSample>,
    pub rejected: usize,
}

/// Parses raw rows belonging to one calendar day.
///
/// The date anchors `HH:MM` time fields; rows carrying a full timestamp keep
/// their own date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowParser {
    date: NaiveDate,
}

impl RowParser {
    pub fn new(date: NaiveDate) -> Self {
        RowParser { date }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn parse(&self, row: &RawRow) -> Result<LoadSample, Rejected> {
        if row.cells.len() < MIN_ROW_FIELDS {
            return Err(Rejected::TooFewFields {
                found: row.cells.len(),
            });
        }
        let time_field = row.cells[0].as_str();
        let timestamp = parse_time_field(self.date, time_field)
            .ok_or_else(|| Rejected::UnparseableTime(time_field.to_string()))?;

        let value_at = |i: usize| row.cells.get(i).map_or(0.0, |s| parse_load_value(s));
        let total_load = value_at(1);
        let mut channel_loads = ChannelLoads::default();
        for (offset, channel) in Channel::ALL.into_iter().enumerate() {
            channel_loads.set(channel, value_at(2 + offset));
        }
        Ok(LoadSample::new(timestamp, total_load, channel_loads))
    }

    /// Parse every row, keeping valid samples and counting rejects.
    pub fn parse_rows<'a, I>(&self, rows: I) -> ParsedRows
    where
        I: IntoIterator<Item = &'a RawRow>,
    {
        let mut parsed = ParsedRows::default();
        for row in rows {
            match self.parse(row) {
                Ok(sample) => parsed.samples.push(sample),
                Err(reason) => {
                    debug!("Dropping row {:?}: {}", row.cells, reason);
                    parsed.rejected += 1;
                }
            }
        }
        if parsed.rejected > 0 {
            warn!(
                "Dropped {} of {} rows for {}",
                parsed.rejected,
                parsed.rejected + parsed.samples.len(),
                self.date
            );
        }
        parsed
    }
}

/// Read a load cell leniently: thousands separators are ignored, anything
/// that is not a finite non-negative number reads as 0.
pub fn parse_load_value(cell: &str) -> f64 {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// Resolve a time field against `date`.
///
/// A field starting with two digits, a colon and two digits is a time of day;
/// `24:00` is midnight at the end of `date`. Anything else must be a full
/// timestamp. Seconds are truncated to minute resolution.
pub fn parse_time_field(date: NaiveDate, field: &str) -> Option<NaiveDateTime> {
    let field = field.trim();
    if has_clock_prefix(field) {
        let hours: u32 = field[0..2].parse().ok()?;
        let minutes: u32 = field[3..5].parse().ok()?;
        if hours == 24 && minutes == 0 {
            return date.succ_opt().map(|d| d.and_time(NaiveTime::MIN));
        }
        return NaiveTime::from_hms_opt(hours, minutes, 0).map(|t| date.and_time(t));
    }
    dlf_utils::dates::parse_timestamp(field)
        .ok()
        .and_then(|ts| ts.with_second(0))
        .and_then(|ts| ts.with_nanosecond(0))
}

fn has_clock_prefix(field: &str) -> bool {
    let bytes = field.as_bytes();
    bytes.len() >= 5
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2] == b':'
        && bytes[3].is_ascii_digit()
        && bytes[4].is_ascii_digit()
}
