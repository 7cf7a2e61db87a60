//! Common error types for yubin

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for yubin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the parser, merger and store
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error outside persisted shard reads
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Row shape does not match either registry schema
    #[error("Invalid row: expected 13 or 15 fields, got {0}")]
    InvalidRow(usize),

    /// Prefecture text outside the closed set of 47 prefectures
    #[error("Unknown prefecture: {0}")]
    UnknownPrefecture(String),

    /// Zip code is not 7 ASCII digits
    #[error("Invalid zip code: {0:?}")]
    InvalidZipCode(String),

    /// Range expression has no parsable trailing numeral
    #[error("Malformed range: {head}〜{tail}")]
    MalformedRange { head: String, tail: String },

    /// Existing shard file could not be decoded; the shard must not be overwritten
    #[error("Persisted shard is corrupt: {path}: {source}")]
    PersistedStateCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
