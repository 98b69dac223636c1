//! Record datasets, parallel batch hashing and vector output for ctrhash.
//!
//! This crate moves raw CTR records through the hashing transform from
//! `ctrhash-core` at scale. It includes line-oriented record sources, batching,
//! a rayon-backed batch hasher and LibSVM / JSON Lines writers.
//!
//! # Overview
//!
//! The core abstraction is the [`Dataset`] trait, a uniform interface over
//! record sources. Datasets can be chained and then handed to a
//! [`HashPipeline`]:
//!
//! ```
//! use ctrhash_core::HashingConfig;
//! use ctrhash_data::{Dataset, HashPipeline, HashingTransform, OutputFormat, VecDataset, VectorWriter};
//!
//! let dataset = VecDataset::from_strs(&["label,c1,c2", "1,a,b", "0,c,"]).skip(1);
//! let pipeline = HashPipeline::new(HashingTransform::new(HashingConfig::new(16).unwrap()));
//!
//! let mut writer = VectorWriter::new(Vec::new(), OutputFormat::LibSvm);
//! let summary = pipeline.run(dataset, &mut writer).unwrap();
//! assert_eq!(summary.vectors, 2);
//! ```
//!
//! # Modules
//!
//! - [`dataset`] - The [`Dataset`] trait, in-memory and line-based sources
//! - [`batch`] - Batching utilities
//! - [`transform`] - The [`RecordTransform`] trait and the hashing transform
//! - [`pipeline`] - Parallel batch hashing and error policies
//! - [`output`] - LibSVM and JSON Lines writers
//! - [`error`] - Error types for the crate

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod dataset;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod transform;

// Re-export main types for convenience
pub use batch::{BatchIterator, BatchedDataset, RecordBatch};
pub use dataset::{
    Dataset, FilteredDataset, IterDataset, LineDataset, LineIterator, RawRecord, VecDataset,
};
pub use error::{DataError, RecordError, Result};
pub use output::{to_json_line, to_libsvm_line, OutputFormat, VectorSink, VectorWriter};
pub use pipeline::{
    hash_records, hash_texts, ErrorPolicy, HashPipeline, RunSummary, DEFAULT_BATCH_SIZE,
    DEFAULT_MAX_REPORTED_FAILURES,
};
pub use transform::{HashingTransform, RecordTransform};

/// Prelude module for convenient imports.
///
/// ```
/// use ctrhash_data::prelude::*;
///
/// let dataset = VecDataset::from_strs(&["1,a"]);
/// assert_eq!(dataset.count(), 1);
/// ```
pub mod prelude {
    pub use crate::dataset::{Dataset, LineDataset, RawRecord, VecDataset};
    pub use crate::output::{OutputFormat, VectorSink, VectorWriter};
    pub use crate::pipeline::{ErrorPolicy, HashPipeline};
    pub use crate::transform::{HashingTransform, RecordTransform};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use ctrhash_core::HashingConfig;
    use std::io::Cursor;

    #[test]
    fn test_full_pipeline_from_reader() {
        let input = "label,i1,c1\n1,5,68fd1e64\n0,,80e26c9b\nnot-a-label,1,2\n1,3,\n";
        let dataset = LineDataset::from_reader(Cursor::new(input)).skip(1);
        let pipeline = HashPipeline::new(HashingTransform::new(HashingConfig::new(1 << 10).unwrap()))
            .with_batch_size(2);

        let mut writer = VectorWriter::new(Vec::new(), OutputFormat::JsonLines);
        let summary = pipeline.run(dataset, &mut writer).unwrap();

        assert_eq!(summary.records, 4);
        assert_eq!(summary.vectors, 3);
        assert_eq!(summary.failures[0].line, 4);

        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let labels: Vec<f64> = out
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["label"].as_f64().unwrap())
            .collect();
        assert_eq!(labels, vec![1.0, 0.0, 1.0]);
    }
}
