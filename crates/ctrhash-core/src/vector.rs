//! Labeled sparse vectors, the output of the hashing transform.

use serde::Serialize;

use crate::aggregate::SparseBucketMap;
use crate::error::{HashingError, Result};
use crate::hasher::BucketIndex;

/// A label paired with a fixed-dimension sparse vector of bucket counts.
///
/// Instances are only created through [`assemble`], which guarantees that every
/// entry lies in `[0, dimension)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledSparseVector {
    label: f64,
    dimension: usize,
    entries: SparseBucketMap,
}

impl LabeledSparseVector {
    /// Returns the label.
    #[inline]
    pub fn label(&self) -> f64 {
        self.label
    }

    /// Returns the vector dimension (the bucket count of the run).
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the non-zero entries.
    #[inline]
    pub fn entries(&self) -> &SparseBucketMap {
        &self.entries
    }

    /// Returns the number of non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Returns the value at `bucket` (zero when absent).
    #[inline]
    pub fn get(&self, bucket: BucketIndex) -> f64 {
        self.entries.get(bucket)
    }

    /// Returns the occupied bucket indices in ascending order.
    pub fn indices(&self) -> Vec<BucketIndex> {
        self.entries.iter().map(|(bucket, _)| bucket).collect()
    }

    /// Returns the values matching [`indices`](Self::indices).
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, count)| count).collect()
    }

    /// Returns the sum of all entry values.
    pub fn total_mass(&self) -> f64 {
        self.entries.total_mass()
    }

    /// Expands the vector into a dense `Vec` of length `dimension`.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dimension];
        for (bucket, count) in self.entries.iter() {
            dense[bucket] = count;
        }
        dense
    }
}

/// Parses a label token as a floating-point number.
///
/// Surrounding whitespace is ignored. Any finite or non-finite numeric value is
/// accepted; labels are not restricted to `0.0`/`1.0`.
///
/// # Errors
///
/// Returns `HashingError::FormatError` if the token is not a number.
pub fn parse_label(token: &str) -> Result<f64> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|_| HashingError::format(format!("label {token:?} is not a number")))
}

/// Wraps a label token and a bucket map into a [`LabeledSparseVector`].
///
/// # Arguments
///
/// * `label_token` - The unparsed label field of the record.
/// * `entries` - The record's bucket counts.
/// * `num_buckets` - The declared vector dimension.
///
/// # Errors
///
/// Returns `HashingError::FormatError` if the label is not a number, and
/// `HashingError::InvalidState` if any bucket lies outside `[0, num_buckets)`.
pub fn assemble(
    label_token: &str,
    entries: SparseBucketMap,
    num_buckets: usize,
) -> Result<LabeledSparseVector> {
    let label = parse_label(label_token)?;

    if let Some(bucket) = entries.max_bucket() {
        if bucket >= num_buckets {
            return Err(HashingError::InvalidState {
                bucket,
                num_buckets,
            });
        }
    }

    Ok(LabeledSparseVector {
        label,
        dimension: num_buckets,
        entries,
    })
}
