//! Parallel batch hashing.
//!
//! [`hash_records`] maps a slice of records through a transform on the rayon
//! thread pool, keeping input order. [`HashPipeline`] drives a whole dataset:
//! it batches records, hashes each batch in parallel, writes accepted vectors
//! to a [`VectorSink`] in source order and applies an [`ErrorPolicy`] to
//! rejected records.
//!
//! Record errors never affect sibling records. Run-scoped errors (I/O, a
//! broken invariant) stop the run.
//!
//! # Example
//!
//! ```
//! use ctrhash_core::{HashingConfig, LabeledSparseVector};
//! use ctrhash_data::{HashPipeline, HashingTransform, VecDataset};
//!
//! let dataset = VecDataset::from_strs(&["1.0,0,1,1,0", "oops,1", "0,a,b"]);
//! let pipeline = HashPipeline::new(HashingTransform::new(HashingConfig::new(4).unwrap()));
//!
//! let mut vectors: Vec<LabeledSparseVector> = Vec::new();
//! let summary = pipeline.run(dataset, &mut vectors).unwrap();
//!
//! assert_eq!(summary.vectors, 2);
//! assert_eq!(summary.rejected, 1);
//! assert_eq!(summary.failures[0].line, 2);
//! ```

use ctrhash_core::{FeatureHasher, LabeledSparseVector};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::dataset::{Dataset, RawRecord};
use crate::error::{DataError, RecordError, Result};
use crate::output::VectorSink;
use crate::transform::RecordTransform;

/// Default number of records hashed per parallel batch.
pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// Default number of record failures kept in a [`RunSummary`].
pub const DEFAULT_MAX_REPORTED_FAILURES: usize = 100;

/// What to do when a record is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Log the failure, keep it in the summary and continue.
    #[default]
    Skip,
    /// Stop the run at the first rejected record.
    FailFast,
}

/// Applies a transform to every record in parallel, preserving order.
pub fn hash_records<T>(
    records: &[RawRecord],
    transform: &T,
) -> Vec<std::result::Result<T::Output, RecordError>>
where
    T: RecordTransform,
{
    records.par_iter().map(|record| transform.apply(record)).collect()
}

/// Hashes raw record texts in parallel, numbering them from 1.
///
/// # Example
///
/// ```
/// use ctrhash_core::FeatureHasher;
/// use ctrhash_data::hash_texts;
///
/// let hasher = FeatureHasher::with_num_buckets(4).unwrap();
/// let results = hash_texts(&["1.0,0,1,1,0", ""], &hasher);
/// assert!(results[0].is_ok());
/// assert_eq!(results[1].as_ref().unwrap_err().line, 2);
/// ```
pub fn hash_texts<S>(
    texts: &[S],
    hasher: &FeatureHasher,
) -> Vec<std::result::Result<LabeledSparseVector, RecordError>>
where
    S: AsRef<str> + Sync,
{
    texts
        .par_iter()
        .enumerate()
        .map(|(i, text)| {
            hasher
                .transform(text.as_ref())
                .map_err(|error| RecordError::new(i as u64 + 1, error))
        })
        .collect()
}

/// Counters and failures from a pipeline run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Items read from the source, accepted or not.
    pub records: u64,
    /// Vectors written to the sink.
    pub vectors: u64,
    /// Records rejected.
    pub rejected: u64,
    /// The first rejected records, up to the configured limit.
    pub failures: Vec<RecordError>,
}

/// Drives a dataset through a transform into a sink.
#[derive(Debug, Clone)]
pub struct HashPipeline<T> {
    transform: T,
    batch_size: usize,
    policy: ErrorPolicy,
    max_reported_failures: usize,
}

impl<T> HashPipeline<T>
where
    T: RecordTransform<Output = LabeledSparseVector>,
{
    /// Creates a pipeline with default batch size and the skip policy.
    pub fn new(transform: T) -> Self {
        Self {
            transform,
            batch_size: DEFAULT_BATCH_SIZE,
            policy: ErrorPolicy::Skip,
            max_reported_failures: DEFAULT_MAX_REPORTED_FAILURES,
        }
    }

    /// Sets the number of records hashed per parallel batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Sets the policy for rejected records.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets how many failures are kept in the summary.
    pub fn with_max_reported_failures(mut self, max: usize) -> Self {
        self.max_reported_failures = max;
        self
    }

    /// Returns the transform.
    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the error policy.
    pub fn error_policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Runs the pipeline over `dataset`, writing vectors to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, on a run-scoped hashing error, or on
    /// the first rejected record under [`ErrorPolicy::FailFast`].
    pub fn run<D, S>(&self, dataset: D, sink: &mut S) -> Result<RunSummary>
    where
        D: Dataset,
        S: VectorSink + ?Sized,
    {
        let mut summary = RunSummary::default();

        for (batch_index, batch) in dataset.batch(self.batch_size).iter().enumerate() {
            let items = batch?.into_items();
            debug!(
                batch = batch_index,
                items = items.len(),
                transform = self.transform.name(),
                "hashing batch"
            );

            let transform = &self.transform;
            let results: Vec<_> = items
                .into_par_iter()
                .map(|item| {
                    item.and_then(|record| {
                        transform.apply(&record).map(|vector| (record.line(), vector))
                    })
                })
                .collect();

            for result in results {
                summary.records += 1;
                match result {
                    Ok((line, vector)) => {
                        sink.write_vector(line, &vector)?;
                        summary.vectors += 1;
                    }
                    Err(failure) if failure.error.is_record_error() => {
                        self.reject(&mut summary, failure)?;
                    }
                    Err(failure) => return Err(DataError::Hashing(failure.error)),
                }
            }
        }

        sink.flush()?;
        info!(
            records = summary.records,
            vectors = summary.vectors,
            rejected = summary.rejected,
            "hashing finished"
        );
        Ok(summary)
    }

    fn reject(&self, summary: &mut RunSummary, failure: RecordError) -> Result<()> {
        summary.rejected += 1;
        warn!(line = failure.line, error = %failure.error, "rejected record");

        if self.policy == ErrorPolicy::FailFast {
            return Err(DataError::Record(failure));
        }
        if summary.failures.len() < self.max_reported_failures {
            summary.failures.push(failure);
        }
        Ok(())
    }
}
