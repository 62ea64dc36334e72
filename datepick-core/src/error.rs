//! Error types for datepick.

use thiserror::Error;

/// Errors that can occur at the edges of the picker (config, parsing).
///
/// The selection engine itself never surfaces these to its host.
#[derive(Error, Debug)]
pub enum PickerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for datepick operations.
pub type PickerResult<T> = Result<T, PickerError>;
