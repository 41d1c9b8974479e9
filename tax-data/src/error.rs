use tax_core::ConfigError;
use thiserror::Error;

/// Errors that can occur when loading external tax-year data.
#[derive(Debug, Error)]
pub enum SnapshotLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error(transparent)]
    Integrity(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for SnapshotLoaderError {
    fn from(err: csv::Error) -> Self {
        SnapshotLoaderError::CsvParse(err.to_string())
    }
}

impl From<serde_json::Error> for SnapshotLoaderError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            SnapshotLoaderError::Io(err.into())
        } else {
            SnapshotLoaderError::JsonParse(err.to_string())
        }
    }
}
