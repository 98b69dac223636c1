//! Error types for the data pipeline.

use std::io;

use ctrhash_core::HashingError;
use thiserror::Error;

/// A hashing error tied to the record that caused it.
#[derive(Debug, Error)]
#[error("record {line}: {error}")]
pub struct RecordError {
    /// 1-based position of the record in its source.
    pub line: u64,
    /// The underlying error.
    #[source]
    pub error: HashingError,
}

impl RecordError {
    /// Creates a new record error.
    pub fn new(line: u64, error: HashingError) -> Self {
        Self { line, error }
    }
}

/// Errors raised while reading, hashing or writing records.
#[derive(Debug, Error)]
pub enum DataError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A single record was rejected.
    #[error("{0}")]
    Record(#[from] RecordError),

    /// The run cannot proceed (bad configuration or broken invariant).
    #[error("Hashing error: {0}")]
    Hashing(#[from] HashingError),

    /// Failed to encode an output vector.
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DataError {
    /// Returns `true` if the error only concerns one record.
    pub fn is_record_error(&self) -> bool {
        matches!(self, Self::Record(_))
    }
}

/// A specialized Result type for data pipeline operations.
pub type Result<T> = std::result::Result<T, DataError>;
