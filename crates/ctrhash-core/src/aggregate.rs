//! Per-record bucket aggregation.
//!
//! Hashing many pairs into few buckets produces collisions. Colliding
//! pairs are not merged or dropped: each pair adds `1.0` to its bucket, so the
//! total mass of a [`SparseBucketMap`] always equals the number of pairs that
//! went into it, even when two pairs share the same feature key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::HashingConfig;
use crate::error::Result;
use crate::hasher::{BucketIndex, PairHasher};
use crate::observe::{MappingObserver, NoopObserver};
use crate::record::FeaturePair;

/// Sparse mapping from bucket index to pair count.
///
/// Only buckets with a positive count are stored. Entries iterate in ascending
/// bucket order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparseBucketMap {
    counts: BTreeMap<BucketIndex, f64>,
}

impl SparseBucketMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to the count of `bucket`.
    #[inline]
    pub fn increment(&mut self, bucket: BucketIndex) {
        *self.counts.entry(bucket).or_insert(0.0) += 1.0;
    }

    /// Returns the count for `bucket` (zero when absent).
    #[inline]
    pub fn get(&self, bucket: BucketIndex) -> f64 {
        self.counts.get(&bucket).copied().unwrap_or(0.0)
    }

    /// Returns the number of non-empty buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` if no bucket has been incremented.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates over `(bucket, count)` in ascending bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (BucketIndex, f64)> + '_ {
        self.counts.iter().map(|(&bucket, &count)| (bucket, count))
    }

    /// Returns the largest occupied bucket, if any.
    pub fn max_bucket(&self) -> Option<BucketIndex> {
        self.counts.keys().next_back().copied()
    }

    /// Returns the sum of all counts.
    pub fn total_mass(&self) -> f64 {
        self.counts.values().sum()
    }

    /// Consumes the map and returns the underlying ordered map.
    pub fn into_inner(self) -> BTreeMap<BucketIndex, f64> {
        self.counts
    }
}

impl FromIterator<BucketIndex> for SparseBucketMap {
    fn from_iter<I: IntoIterator<Item = BucketIndex>>(buckets: I) -> Self {
        let mut map = Self::new();
        for bucket in buckets {
            map.increment(bucket);
        }
        map
    }
}

/// Aggregates pairs into a fresh bucket map, reporting each mapping to
/// `observer` in pair order.
pub fn aggregate_observed<'a, I>(
    pairs: I,
    hasher: &PairHasher,
    observer: &dyn MappingObserver,
) -> SparseBucketMap
where
    I: IntoIterator<Item = FeaturePair<'a>>,
{
    let mut map = SparseBucketMap::new();
    for pair in pairs {
        let mapping = hasher.hash_with_key(pair.index, pair.value);
        observer.on_mapping(&mapping);
        map.increment(mapping.bucket);
    }
    map
}

/// Aggregates pairs into a fresh bucket map.
pub fn aggregate<'a, I>(pairs: I, hasher: &PairHasher) -> SparseBucketMap
where
    I: IntoIterator<Item = FeaturePair<'a>>,
{
    aggregate_observed(pairs, hasher, &NoopObserver)
}

/// Aggregates `(index, value)` pairs for an unvalidated bucket count.
///
/// # Errors
///
/// Returns `HashingError::InvalidConfiguration` if `num_buckets` is zero.
pub fn aggregate_pairs(pairs: &[(usize, &str)], num_buckets: usize) -> Result<SparseBucketMap> {
    let hasher = PairHasher::new(&HashingConfig::new(num_buckets)?);
    Ok(aggregate(
        pairs
            .iter()
            .map(|&(index, value)| FeaturePair::new(index, value)),
        &hasher,
    ))
}
