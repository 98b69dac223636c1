//! Batching support for record datasets.
//!
//! This module provides the [`BatchedDataset`] wrapper that groups records into
//! batches so they can be hashed in parallel.
//!
//! Record errors coming from the source (such as a non-UTF-8 line) travel with
//! the batch as rejected records. A fatal source error ends the batch early:
//! the records read so far are still delivered, and the error is yielded on the
//! next call.
//!
//! # Example
//!
//! ```
//! use ctrhash_data::{Dataset, VecDataset};
//!
//! let dataset = VecDataset::from_strs(&["1,a", "0,b", "1,c", "0,d", "1,e"]);
//! let sizes: Vec<_> = dataset.batch(2).iter().map(|b| b.unwrap().len()).collect();
//! assert_eq!(sizes, vec![2, 2, 1]);
//! ```

use crate::dataset::RawRecord;
use crate::error::{DataError, RecordError, Result};

/// One item of a batch: a readable record, or an item the source rejected.
pub type BatchItem = std::result::Result<RawRecord, RecordError>;

/// A batch of raw records, in source order.
///
/// Items the source already rejected keep their position among the readable
/// records.
#[derive(Debug, Default)]
pub struct RecordBatch {
    items: Vec<BatchItem>,
}

impl RecordBatch {
    /// Creates a batch from records.
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            items: records.into_iter().map(Ok).collect(),
        }
    }

    /// Creates an empty batch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of items (records plus rejections) in this batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if this batch contains nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns every item in source order.
    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    /// Iterates over the readable records.
    pub fn records(&self) -> impl Iterator<Item = &RawRecord> + '_ {
        self.items.iter().filter_map(|item| item.as_ref().ok())
    }

    /// Iterates over the records rejected while reading.
    pub fn rejected(&self) -> impl Iterator<Item = &RecordError> + '_ {
        self.items.iter().filter_map(|item| item.as_ref().err())
    }

    /// Consumes the batch, returning its items in source order.
    pub fn into_items(self) -> Vec<BatchItem> {
        self.items
    }

    fn push(&mut self, record: RawRecord) {
        self.items.push(Ok(record));
    }

    fn reject(&mut self, error: RecordError) {
        self.items.push(Err(error));
    }
}

impl FromIterator<RawRecord> for RecordBatch {
    fn from_iter<I: IntoIterator<Item = RawRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A dataset wrapper that groups records into batches.
///
/// # Type Parameters
///
/// * `I` - The underlying iterator type
pub struct BatchedDataset<I> {
    inner: I,
    batch_size: usize,
}

impl<I> BatchedDataset<I>
where
    I: Iterator<Item = Result<RawRecord>>,
{
    /// Creates a new batched dataset.
    ///
    /// # Arguments
    ///
    /// * `inner` - The underlying iterator of records
    /// * `batch_size` - The number of records per batch (at least 1)
    pub fn new(inner: I, batch_size: usize) -> Self {
        Self {
            inner,
            batch_size: batch_size.max(1),
        }
    }

    /// Returns the configured batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns an iterator over batches.
    pub fn iter(self) -> BatchIterator<I> {
        BatchIterator {
            inner: self.inner,
            batch_size: self.batch_size,
            pending_error: None,
        }
    }
}

/// Iterator that yields batches of records.
pub struct BatchIterator<I> {
    inner: I,
    batch_size: usize,
    pending_error: Option<DataError>,
}

impl<I> Iterator for BatchIterator<I>
where
    I: Iterator<Item = Result<RawRecord>>,
{
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(error) = self.pending_error.take() {
            return Some(Err(error));
        }

        let mut batch = RecordBatch::empty();
        while batch.len() < self.batch_size {
            match self.inner.next() {
                Some(Ok(record)) => batch.push(record),
                Some(Err(DataError::Record(error))) => batch.reject(error),
                Some(Err(error)) => {
                    if batch.is_empty() {
                        return Some(Err(error));
                    }
                    self.pending_error = Some(error);
                    break;
                }
                None => break,
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(Ok(batch))
        }
    }
}
