//! Feature key derivation and bucket hashing.
//!
//! Every (index, value) pair is turned into a feature key and hashed into one of
//! `num_buckets` buckets.
//!
//! # Bucket Encoding
//!
//! - Feature key: the value followed by the decimal index (`"abc"` at index 3
//!   is `"abc3"`, never `"3abc"`).
//! - Digest: MD5 of the key's UTF-8 bytes.
//! - Bucket: the 16 digest bytes read as a big-endian unsigned 128-bit integer,
//!   modulo `num_buckets`.
//!
//! The encoding is fixed. Vectors hashed with any other key order, digest or
//! byte order are incompatible with weights trained on this one.

use crate::config::HashingConfig;
use crate::error::{HashingError, Result};
use crate::record::FeaturePair;

/// Index of a bucket, always in `[0, num_buckets)`.
pub type BucketIndex = usize;

/// Size of the feature key digest in bytes.
pub const DIGEST_BYTES: usize = 16;

/// Builds the feature key for a pair: `value` followed by the decimal `index`.
///
/// # Examples
///
/// ```
/// use ctrhash_core::hasher::feature_key;
///
/// assert_eq!(feature_key(3, "abc"), "abc3");
/// assert_eq!(feature_key(3, ""), "3");
/// ```
#[inline]
pub fn feature_key(index: usize, value: &str) -> String {
    format!("{value}{index}")
}

/// Returns the MD5 digest of a feature key as a big-endian unsigned integer.
///
/// # Examples
///
/// ```
/// use ctrhash_core::hasher::key_digest;
///
/// assert_eq!(key_digest("abc"), 0x900150983cd24fb0d6963f7d28e17f72);
/// ```
#[inline]
pub fn key_digest(key: &str) -> u128 {
    let digest: [u8; DIGEST_BYTES] = md5::compute(key.as_bytes()).0;
    u128::from_be_bytes(digest)
}

/// Reduces a digest to a bucket index. `num_buckets` must be non-zero.
#[inline]
fn reduce(digest: u128, num_buckets: usize) -> BucketIndex {
    // The remainder is below num_buckets, so it always fits back into usize.
    (digest % num_buckets as u128) as BucketIndex
}

/// Hashes a feature key into a bucket.
///
/// # Errors
///
/// Returns `HashingError::InvalidConfiguration` if `num_buckets` is zero.
pub fn bucket_of_key(key: &str, num_buckets: usize) -> Result<BucketIndex> {
    if num_buckets == 0 {
        return Err(HashingError::config("num_buckets must be positive, got 0"));
    }
    Ok(reduce(key_digest(key), num_buckets))
}

/// Hashes a single (index, value) pair into a bucket.
///
/// # Arguments
///
/// * `index` - The 0-based feature position.
/// * `value` - The raw feature token.
/// * `num_buckets` - The number of buckets (must be positive).
///
/// # Errors
///
/// Returns `HashingError::InvalidConfiguration` if `num_buckets` is zero.
///
/// # Examples
///
/// ```
/// use ctrhash_core::hasher::bucket_for;
///
/// let bucket = bucket_for(0, "0", 4).unwrap();
/// assert_eq!(bucket, 3);
/// assert!(bucket_for(0, "0", 0).is_err());
/// ```
pub fn bucket_for(index: usize, value: &str, num_buckets: usize) -> Result<BucketIndex> {
    bucket_of_key(&feature_key(index, value), num_buckets)
}

/// A pair together with the key it was hashed from.
///
/// Produced by [`PairHasher::hash_with_key`] for inspection; carries exactly the
/// bucket that [`PairHasher::hash`] returns for the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashedPair {
    /// 0-based feature position.
    pub index: usize,
    /// The derived feature key.
    pub key: String,
    /// The bucket the key hashed to.
    pub bucket: BucketIndex,
}

/// Hashes feature pairs for a fixed, validated bucket count.
///
/// A `PairHasher` can only be built from a [`HashingConfig`], so its bucket
/// count is always positive and hashing itself cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairHasher {
    num_buckets: usize,
}

impl PairHasher {
    /// Creates a hasher for the configured bucket count.
    pub fn new(config: &HashingConfig) -> Self {
        Self {
            num_buckets: config.num_buckets(),
        }
    }

    /// Returns the bucket count.
    #[inline]
    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    /// Hashes an (index, value) pair into a bucket.
    #[inline]
    pub fn hash(&self, index: usize, value: &str) -> BucketIndex {
        reduce(key_digest(&feature_key(index, value)), self.num_buckets)
    }

    /// Hashes a [`FeaturePair`] into a bucket.
    #[inline]
    pub fn hash_pair(&self, pair: FeaturePair<'_>) -> BucketIndex {
        self.hash(pair.index, pair.value)
    }

    /// Hashes a pair and also returns the feature key it was derived from.
    pub fn hash_with_key(&self, index: usize, value: &str) -> HashedPair {
        let key = feature_key(index, value);
        let bucket = reduce(key_digest(&key), self.num_buckets);
        HashedPair { index, key, bucket }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher(num_buckets: usize) -> PairHasher {
        PairHasher::new(&HashingConfig::new(num_buckets).unwrap())
    }

    #[test]
    fn test_feature_key_order() {
        assert_eq!(feature_key(3, "abc"), "abc3");
        assert_ne!(feature_key(3, "abc"), "3abc");
        assert_eq!(feature_key(12, "0"), "012");
    }

    #[test]
    fn test_key_digest_is_big_endian() {
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(key_digest(""), 0xd41d8cd98f00b204e9800998ecf8427e);
        assert_eq!(key_digest("00"), 0xb4b147bc522828731f1a016bfa72c073);
    }

    #[test]
    fn test_known_buckets() {
        let h = hasher(4);
        assert_eq!(h.hash(0, "0"), 3);
        assert_eq!(h.hash(1, "1"), 2);
        assert_eq!(h.hash(2, "1"), 0);
        assert_eq!(h.hash(3, "0"), 2);

        let h = hasher(1000);
        assert_eq!(h.hash(0, "0"), 179);
        assert_eq!(h.hash(1, "1"), 650);
        assert_eq!(h.hash(2, "1"), 112);
        assert_eq!(h.hash(3, "0"), 742);
    }

    #[test]
    fn test_key_order_changes_bucket() {
        // "abc3" and "3abc" land in different buckets at num_buckets = 4.
        assert_eq!(bucket_of_key("abc3", 4).unwrap(), 2);
        assert_eq!(bucket_of_key("3abc", 4).unwrap(), 1);
        assert_eq!(hasher(4).hash(3, "abc"), 2);
    }

    #[test]
    fn test_bucket_for_matches_hasher() {
        let h = hasher(32768);
        for (index, value) in [(0, "a"), (7, ""), (39, "68fd1e64"), (2, "\u{e9}t\u{e9}")] {
            assert_eq!(bucket_for(index, value, 32768).unwrap(), h.hash(index, value));
        }
    }

    #[test]
    fn test_zero_buckets_rejected() {
        assert!(matches!(
            bucket_for(0, "a", 0),
            Err(HashingError::InvalidConfiguration { .. })
        ));
        assert!(bucket_of_key("a0", 0).is_err());
    }

    #[test]
    fn test_single_bucket() {
        let h = hasher(1);
        assert_eq!(h.hash(0, "anything"), 0);
        assert_eq!(h.hash(99, ""), 0);
    }

    #[test]
    fn test_hash_with_key_agrees_with_hash() {
        let h = hasher(4);
        let hashed = h.hash_with_key(3, "abc");
        assert_eq!(hashed.key, "abc3");
        assert_eq!(hashed.index, 3);
        assert_eq!(hashed.bucket, h.hash(3, "abc"));
        assert_eq!(h.hash_pair(FeaturePair::new(3, "abc")), hashed.bucket);
    }

    #[test]
    fn test_large_bucket_counts_stay_in_range() {
        let h = hasher(usize::MAX);
        let bucket = h.hash(0, "0");
        assert_eq!(bucket as u128, key_digest("00") % usize::MAX as u128);
    }
}
