//! The per-record hashing transform.
//!
//! [`FeatureHasher`] runs the four stages on one raw record:
//! parse, hash each pair, aggregate bucket counts, assemble the labeled vector.
//! It holds no per-record state and is `Send + Sync`, so one instance can be
//! shared by any number of threads.
//!
//! # Example
//!
//! ```
//! use ctrhash_core::{FeatureHasher, HashingConfig};
//!
//! let hasher = FeatureHasher::new(HashingConfig::new(4).unwrap());
//! let vector = hasher.transform("1.0,0,1,1,0").unwrap();
//!
//! assert_eq!(vector.label(), 1.0);
//! assert_eq!(vector.dimension(), 4);
//! assert_eq!(vector.indices(), vec![0, 2, 3]);
//! assert_eq!(vector.values(), vec![1.0, 2.0, 1.0]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::aggregate::aggregate_observed;
use crate::config::HashingConfig;
use crate::error::Result;
use crate::hasher::PairHasher;
use crate::observe::{MappingObserver, NoopObserver};
use crate::record::parse_record;
use crate::vector::{assemble, LabeledSparseVector};

/// Converts raw CSV records into labeled sparse vectors.
#[derive(Clone)]
pub struct FeatureHasher {
    config: HashingConfig,
    hasher: PairHasher,
    observer: Arc<dyn MappingObserver>,
}

impl FeatureHasher {
    /// Creates a feature hasher for a validated configuration.
    pub fn new(config: HashingConfig) -> Self {
        Self {
            config,
            hasher: PairHasher::new(&config),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Creates a feature hasher from a bare bucket count.
    ///
    /// # Errors
    ///
    /// Returns `HashingError::InvalidConfiguration` if `num_buckets` is zero.
    pub fn with_num_buckets(num_buckets: usize) -> Result<Self> {
        Ok(Self::new(HashingConfig::new(num_buckets)?))
    }

    /// Installs a mapping observer.
    pub fn with_observer(self, observer: impl MappingObserver + 'static) -> Self {
        self.with_shared_observer(Arc::new(observer))
    }

    /// Installs a mapping observer that is shared with the caller.
    pub fn with_shared_observer(mut self, observer: Arc<dyn MappingObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &HashingConfig {
        &self.config
    }

    /// Returns the bucket count (output dimension).
    #[inline]
    pub fn num_buckets(&self) -> usize {
        self.config.num_buckets()
    }

    /// Returns the underlying pair hasher.
    #[inline]
    pub fn pair_hasher(&self) -> &PairHasher {
        &self.hasher
    }

    /// Transforms one raw record into a labeled sparse vector.
    ///
    /// # Errors
    ///
    /// Returns `HashingError::FormatError` for a record without a numeric
    /// label. `HashingError::InvalidState` signals a broken internal invariant.
    pub fn transform(&self, raw: &str) -> Result<LabeledSparseVector> {
        let record = parse_record(raw)?;
        let entries = aggregate_observed(record.pairs(), &self.hasher, self.observer.as_ref());
        assemble(record.label(), entries, self.num_buckets())
    }
}

impl fmt::Debug for FeatureHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureHasher")
            .field("num_buckets", &self.num_buckets())
            .finish_non_exhaustive()
    }
}
