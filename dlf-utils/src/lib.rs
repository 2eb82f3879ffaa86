//! Shared utility functions for DLF crates.

pub mod buckets;
pub mod date_range;
pub mod periods;

/// Date and timestamp formatting helpers
pub mod dates {
    use chrono::{NaiveDate, NaiveDateTime};

    /// Local timestamp format understood by the prediction service: "YYYY-MM-DDTHH:mm:ss"
    pub const BACKEND_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    /// Date format used in the SLDC load page query string: "dd/MM/yyyy"
    pub const SLDC_DATE_FORMAT: &str = "%d/%m/%Y";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
    }

    /// Format a date for the SLDC `Loaddata.aspx?mode=` parameter.
    pub fn format_sldc_date(date: &NaiveDate) -> String {
        date.format(SLDC_DATE_FORMAT).to_string()
    }

    /// Format a timestamp without any timezone suffix, e.g. "2024-01-15T00:00:00".
    pub fn format_backend_timestamp(ts: &NaiveDateTime) -> String {
        ts.format(BACKEND_TIMESTAMP_FORMAT).to_string()
    }

    /// Parse a timezone-naive timestamp.
    ///
    /// Accepts the backend format with optional fractional seconds as well as
    /// space-separated and seconds-less variants.
    pub fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
        const FORMATS: [&str; 5] = [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M",
            "%Y%m%d %H%M",
        ];
        let s = s.trim();
        for fmt in FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(ts);
            }
        }
        anyhow::bail!("unrecognised timestamp: {s}")
    }

    /// Canonical time-of-day key, "HH:MM".
    pub fn time_of_day_key(ts: &NaiveDateTime) -> String {
        ts.format("%H:%M").to_string()
    }

}
