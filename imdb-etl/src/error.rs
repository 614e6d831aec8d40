//! Error types for imdb-etl
//!
//! Propagation policy:
//! - `Io` and `Schema` during the base load are fatal to the session.
//! - `InputParse` is recovered at the prompt by asking again.
//! - `InvalidParameter` aborts only the current flow.

use thiserror::Error;

/// ETL error type
#[derive(Debug, Error)]
pub enum EtlError {
    /// Unreadable/unwritable path
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Required column absent or undecodable tabular data
    #[error("Schema error: {0}")]
    Schema(String),

    /// Out-of-range percent or non-existent type selection
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Operator typed something structurally invalid
    #[error("Invalid input: {0}")]
    InputParse(String),

    /// Dataset download failed
    #[error("Download failed: {0}")]
    Download(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Illegal state machine transition
    #[error("Internal error: {0}")]
    Internal(String),

    /// imdb-common error
    #[error(transparent)]
    Common(imdb_common::Error),
}

impl From<imdb_common::Error> for EtlError {
    fn from(err: imdb_common::Error) -> Self {
        match err {
            imdb_common::Error::Io(io) => EtlError::Io(io),
            other => EtlError::Common(other),
        }
    }
}

impl From<csv::Error> for EtlError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => EtlError::Io(io),
                other => EtlError::Schema(format!("{:?}", other)),
            }
        } else {
            EtlError::Schema(err.to_string())
        }
    }
}

impl From<reqwest::Error> for EtlError {
    fn from(err: reqwest::Error) -> Self {
        EtlError::Download(err.to_string())
    }
}

/// Result type for ETL operations
pub type EtlResult<T> = Result<T, EtlError>;
