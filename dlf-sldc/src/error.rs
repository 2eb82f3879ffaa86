/// Error types for SLDC and prediction sources
use thiserror::Error;

/// Failure reported by an upstream collaborator (load page, CSV export,
/// prediction service).
#[derive(Error, Debug)]
pub enum SldcError {
    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream request failed with status {status}: {body}")]
    BadStatus { status: u16, body: String },

    /// The load page did not contain a recognisable load table
    #[error("Could not find load data table")]
    TableNotFound,

    /// The prediction service answered but did not report success
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to parse JSON data
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Failed to read a local source
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

/// Type alias for Results using SldcError
pub type Result<T> = std::result::Result<T, SldcError>;
