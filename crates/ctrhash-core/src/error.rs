//! Error types for the ctrhash core library.
//!
//! Errors fall into two scopes. Record-scoped errors ([`HashingError::FormatError`])
//! reject a single record and must not affect its siblings. Everything else is
//! run-scoped: a bad configuration or a broken internal invariant means no record
//! can be processed meaningfully.

use thiserror::Error;

/// The main error type for ctrhash-core operations.
#[derive(Debug, Error)]
pub enum HashingError {
    /// A raw record could not be split into a label and features, or its label
    /// token is not a number.
    #[error("Format error: {message}")]
    FormatError {
        /// A description of what is wrong with the record.
        message: String,
    },

    /// The hashing configuration is unusable (e.g. a non-positive bucket count).
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// A description of the configuration problem.
        message: String,
    },

    /// A bucket index fell outside the vector dimension.
    #[error("Invalid state: bucket {bucket} is outside [0, {num_buckets})")]
    InvalidState {
        /// The offending bucket index.
        bucket: usize,
        /// The declared vector dimension.
        num_buckets: usize,
    },

    /// I/O failure while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HashingError {
    /// Shorthand for a [`HashingError::FormatError`].
    pub fn format(message: impl Into<String>) -> Self {
        Self::FormatError {
            message: message.into(),
        }
    }

    /// Shorthand for a [`HashingError::InvalidConfiguration`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Returns `true` if the error only concerns the record being processed.
    ///
    /// Batch drivers use this to decide between rejecting a single record and
    /// aborting the whole run.
    pub fn is_record_error(&self) -> bool {
        matches!(self, Self::FormatError { .. })
    }
}

/// A specialized Result type for ctrhash-core operations.
pub type Result<T> = std::result::Result<T, HashingError>;
