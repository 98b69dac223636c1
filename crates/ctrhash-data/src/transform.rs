//! Record transforms.
//!
//! A [`RecordTransform`] turns one raw record into an output value, or rejects
//! it with a [`RecordError`]. Transforms are shared across worker threads, so
//! they must be `Send + Sync` and must not keep per-record state.
//!
//! # Example
//!
//! ```
//! use ctrhash_core::HashingConfig;
//! use ctrhash_data::{HashingTransform, RawRecord, RecordTransform};
//!
//! let transform = HashingTransform::new(HashingConfig::new(4).unwrap());
//! let vector = transform.apply(&RawRecord::new(1, "1.0,0,1,1,0")).unwrap();
//! assert_eq!(vector.total_mass(), 4.0);
//!
//! let err = transform.apply(&RawRecord::new(2, "")).unwrap_err();
//! assert_eq!(err.line, 2);
//! ```

use ctrhash_core::{FeatureHasher, HashingConfig, LabeledSparseVector};

use crate::dataset::RawRecord;
use crate::error::RecordError;

/// A per-record transform.
pub trait RecordTransform: Send + Sync {
    /// The value produced for an accepted record.
    type Output: Send;

    /// Applies the transform to a record.
    ///
    /// # Arguments
    ///
    /// * `record` - The raw record to transform
    fn apply(&self, record: &RawRecord) -> Result<Self::Output, RecordError>;

    /// Returns the name of this transform for logging.
    fn name(&self) -> &str {
        "RecordTransform"
    }
}

/// Hashes raw records into labeled sparse vectors.
#[derive(Debug, Clone)]
pub struct HashingTransform {
    hasher: FeatureHasher,
}

impl HashingTransform {
    /// Creates a hashing transform for a configuration.
    pub fn new(config: HashingConfig) -> Self {
        Self::from_hasher(FeatureHasher::new(config))
    }

    /// Wraps an existing feature hasher (e.g. one with a mapping observer).
    pub fn from_hasher(hasher: FeatureHasher) -> Self {
        Self { hasher }
    }

    /// Returns the underlying feature hasher.
    pub fn hasher(&self) -> &FeatureHasher {
        &self.hasher
    }

    /// Returns the output dimension.
    pub fn num_buckets(&self) -> usize {
        self.hasher.num_buckets()
    }
}

impl RecordTransform for HashingTransform {
    type Output = LabeledSparseVector;

    fn apply(&self, record: &RawRecord) -> Result<LabeledSparseVector, RecordError> {
        self.hasher
            .transform(record.text())
            .map_err(|error| RecordError::new(record.line(), error))
    }

    fn name(&self) -> &str {
        "HashingTransform"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctrhash_core::HashingError;

    #[test]
    fn test_hashing_transform() {
        let transform = HashingTransform::new(HashingConfig::new(4).unwrap());
        assert_eq!(transform.name(), "HashingTransform");
        assert_eq!(transform.num_buckets(), 4);

        let vector = transform.apply(&RawRecord::new(1, "1.0,0,1,1,0")).unwrap();
        assert_eq!(vector.indices(), vec![0, 2, 3]);
        assert_eq!(vector.values(), vec![1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_rejection_carries_line() {
        let transform = HashingTransform::new(HashingConfig::new(4).unwrap());
        let err = transform.apply(&RawRecord::new(42, "yes,a,b")).unwrap_err();
        assert_eq!(err.line, 42);
        assert!(matches!(err.error, HashingError::FormatError { .. }));
    }

    #[test]
    fn test_from_hasher_keeps_configuration() {
        let hasher = FeatureHasher::with_num_buckets(128).unwrap();
        let transform = HashingTransform::from_hasher(hasher);
        assert_eq!(transform.hasher().num_buckets(), 128);
    }
}
