//! Feature hashing for click-through-rate records.
//!
//! This crate turns comma-separated CTR records into fixed-dimension labeled
//! sparse vectors using the hashing trick. Each record goes through four
//! stages:
//!
//! - **Parse** ([`record`]): split the record into a label token and ordered
//!   feature values.
//! - **Hash** ([`hasher`]): derive a feature key (`value` followed by the
//!   feature index) for every value and hash it into one of `num_buckets`
//!   buckets with MD5.
//! - **Aggregate** ([`aggregate`]): count how many pairs landed in each bucket.
//! - **Assemble** ([`vector`]): parse the label and wrap the counts into a
//!   [`LabeledSparseVector`].
//!
//! The transform is pure. Records are independent of each other and one
//! [`FeatureHasher`] can be shared across threads.
//!
//! # Example
//!
//! ```
//! use ctrhash_core::{FeatureHasher, HashingConfig, HashingError};
//!
//! let config = HashingConfig::new(4).unwrap();
//! let hasher = FeatureHasher::new(config);
//!
//! let vector = hasher.transform("1.0,0,1,1,0").unwrap();
//! assert_eq!(vector.label(), 1.0);
//! assert_eq!(vector.total_mass(), 4.0);
//!
//! // Malformed records are rejected one at a time.
//! assert!(matches!(
//!     hasher.transform("click,0,1"),
//!     Err(HashingError::FormatError { .. })
//! ));
//! ```
//!
//! # Modules
//!
//! - [`config`]: The validated bucket-count configuration.
//! - [`record`]: Raw record parsing.
//! - [`hasher`]: Feature keys and bucket hashing.
//! - [`aggregate`]: Per-record bucket counts.
//! - [`vector`]: The labeled sparse vector output.
//! - [`observe`]: Hooks for inspecting feature mappings.
//! - [`error`]: Error types for the library.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod feature_hasher;
pub mod hasher;
pub mod observe;
pub mod record;
pub mod vector;

// Re-export commonly used types at the crate root for convenience
pub use aggregate::{aggregate, aggregate_observed, aggregate_pairs, SparseBucketMap};
pub use config::HashingConfig;
pub use error::{HashingError, Result};
pub use feature_hasher::FeatureHasher;
pub use hasher::{bucket_for, feature_key, key_digest, BucketIndex, HashedPair, PairHasher};
pub use observe::{MappingObserver, MappingRecorder, NoopObserver, TracingObserver};
pub use record::{parse_record, FeaturePair, ParsedRecord};
pub use vector::{assemble, parse_label, LabeledSparseVector};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_reexports() {
        let config = HashingConfig::new(16).unwrap();
        let pair_hasher = PairHasher::new(&config);
        let record = parse_record("0,a,b").unwrap();

        let entries = aggregate(record.pairs(), &pair_hasher);
        let vector = assemble(record.label(), entries, config.num_buckets()).unwrap();
        assert_eq!(vector.total_mass(), 2.0);

        let _err: Result<()> = Ok(());
    }

    #[test]
    fn test_stages_match_feature_hasher() {
        // Running the stages by hand gives the same vector as the transform.
        let raw = "1,05db9164,38a947a1,,e5ba7672";
        let config = HashingConfig::new(1 << 10).unwrap();
        let pair_hasher = PairHasher::new(&config);

        let record = parse_record(raw).unwrap();
        let mut entries = SparseBucketMap::new();
        for pair in record.pairs() {
            let bucket = bucket_for(pair.index, pair.value, config.num_buckets()).unwrap();
            assert_eq!(bucket, pair_hasher.hash_pair(pair));
            entries.increment(bucket);
        }
        let by_hand = assemble(record.label(), entries, config.num_buckets()).unwrap();

        assert_eq!(FeatureHasher::new(config).transform(raw).unwrap(), by_hand);
    }
}
