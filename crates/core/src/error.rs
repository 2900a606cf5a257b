//! Unified error types for the keigo site core.
//!
//! Message prefixes double as stable error codes for MCP clients.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the keigo site core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty namespace).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The storage substrate is disabled or inaccessible.
    #[error("STORAGE_UNAVAILABLE: {0}")]
    StorageUnavailable(String),

    /// A write would exceed the substrate's byte quota.
    #[error("QUOTA_EXCEEDED: {requested} bytes requested, limit is {limit}")]
    QuotaExceeded { requested: usize, limit: usize },

    /// A stored entry could not be decoded.
    #[error("CORRUPT_ENTRY: {0}")]
    CorruptEntry(String),

    /// SQLite operation failed.
    #[error("STORAGE_ERROR: {0}")]
    Database(rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORAGE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// The favorites list reached its configured cap.
    #[error("FAVORITES_FULL: limit of {0} reached")]
    FavoritesFull(usize),

    /// No experiment with the given name is configured.
    #[error("UNKNOWN_EXPERIMENT: {0}")]
    UnknownExperiment(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// HTTP error response.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// The document index could not be parsed.
    #[error("INDEX_PARSE: {0}")]
    IndexParse(String),

    /// No index source is configured, or none could be read.
    #[error("INDEX_UNAVAILABLE: {0}")]
    IndexUnavailable(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err)
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::StorageUnavailable(msg) => (-32001, msg.clone()),
            Error::QuotaExceeded { .. } => (-32001, err.to_string()),
            Error::CorruptEntry(msg) => (-32002, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::FavoritesFull(_) => (-32003, err.to_string()),
            Error::UnknownExperiment(name) => (-32602, format!("unknown experiment: {name}")),
            Error::InvalidUrl(msg) => (-32004, msg.clone()),
            Error::FetchTimeout(msg) => (-32005, msg.clone()),
            Error::FetchTooLarge(msg) => (-32006, msg.clone()),
            Error::HttpError(msg) => (-32007, msg.clone()),
            Error::IndexParse(msg) => (-32008, msg.clone()),
            Error::IndexUnavailable(msg) => (-32009, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
