//! Inspect Command Implementation
//!
//! Hashes one record and prints where each of its features lands.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use ctrhash_core::{FeatureHasher, HashingConfig, MappingRecorder};
use ctrhash_data::to_libsvm_line;

/// Show the feature-to-bucket mapping of a single record
///
/// Prints one line per feature (index, key, bucket), then the assembled
/// vector in LibSVM form.
///
/// # Example
///
/// ```bash
/// ctrhash inspect --num-buckets 4 "1.0,0,1,1,0"
/// ```
#[derive(Args, Debug, Clone)]
pub struct InspectCommand {
    /// Number of hash buckets (output dimension)
    #[arg(long, short = 'n', env = "CTRHASH_NUM_BUCKETS", allow_negative_numbers = true)]
    pub num_buckets: i64,

    /// The record: a label followed by comma-separated feature values
    #[arg(allow_hyphen_values = true)]
    pub record: String,
}

impl InspectCommand {
    /// Execute the inspect command, writing to stdout
    pub fn run(&self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_report(&mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Writes the mapping report for the record to `out`.
    ///
    /// Mappings computed before a rejection are still written.
    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<()> {
        let config = HashingConfig::from_signed(self.num_buckets).context("Invalid --num-buckets")?;
        let recorder = Arc::new(MappingRecorder::new());
        let hasher = FeatureHasher::new(config).with_shared_observer(recorder.clone());

        let result = hasher.transform(&self.record);

        for mapping in recorder.take() {
            writeln!(
                out,
                "feature {}\tkey {:?}\tbucket {}",
                mapping.index, mapping.key, mapping.bucket
            )?;
        }

        let vector = result.context("Record rejected")?;
        writeln!(
            out,
            "label {} dimension {} nnz {}",
            vector.label(),
            vector.dimension(),
            vector.nnz()
        )?;
        writeln!(out, "{}", to_libsvm_line(&vector))?;
        Ok(())
    }
}
